use crate::{
    data::{
        DataType, grade::Grade, module::Module, registration::Registration, student::Student,
    },
    error::GradebookResult,
    fixtures,
    listing::prefix_matches,
    maud_conveniences::{BUTTON, INPUT, card, subtitle, success_banner, title},
    routes::sse::SseEvent,
    state::GradebookState,
    stats::Counts,
};
use axum::extract::{Query, State};
use maud::{Markup, html};
use serde::Deserialize;

async fn fetch_counts(state: &GradebookState) -> GradebookResult<Counts> {
    let api = state.api();
    let (students, modules, grades, registrations) = tokio::try_join!(
        Student::get_all(api),
        Module::get_all(api),
        Grade::get_all(api),
        Registration::get_all(api),
    )?;

    Ok(Counts::new(&students, &modules, &grades, &registrations))
}

/// `out_of_band` is for responses that refresh the tiles alongside their own content.
fn render_counts(counts: Counts, out_of_band: bool) -> Markup {
    let tiles = [
        ("Students", counts.students, "/students"),
        ("Modules", counts.modules, "/modules"),
        ("Grades", counts.grades, "/grades"),
        ("Registrations", counts.registrations, "/registrations"),
        ("Unregistered Students", counts.unregistered_students, "/students"),
    ];

    html! {
        div id="counts" hx-swap-oob=[out_of_band.then_some("true")] class="grid grid-cols-2 md:grid-cols-5 gap-4" {
            @for (name, count, href) in tiles {
                a href=(href) class="block rounded-lg shadow-md p-4 text-center bg-gray-700 hover:bg-gray-600" {
                    p class="text-3xl font-bold" {(count)}
                    p class="text-gray-300" {(name)}
                }
            }
        }
    }
}

pub async fn get_index_route(State(state): State<GradebookState>) -> GradebookResult<Markup> {
    let counts = fetch_counts(&state).await?;

    Ok(state.render(card(html! {
        (title("Student Grade Management"))
        (render_counts(counts, false))

        div {
            (subtitle("Search"))
            input type="search" name="q" placeholder="Search students and modules..." class=(INPUT)
                hx-get="/internal/search" hx-trigger="input changed delay:300ms, search" hx-target="#search_results";
            div id="search_results" class="mt-2" {}
        }

        div class="flex flex-row items-center space-x-4" {
            button class=(BUTTON) hx-post="/internal/seed" hx-target="#seed_status" {
                "Load sample data"
            }
            div id="seed_status" {}
        }
    })))
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SearchQuery {
    q: String,
}

pub async fn internal_get_search(
    State(state): State<GradebookState>,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> GradebookResult<Markup> {
    let q = q.trim();
    if q.is_empty() {
        return Ok(html! {});
    }

    let api = state.api();
    let (students, modules) = tokio::try_join!(Student::get_all(api), Module::get_all(api))?;

    let students: Vec<_> = students
        .iter()
        .filter(|s| prefix_matches(q, [s.first_name.as_str(), s.last_name.as_str()]))
        .collect();
    let modules: Vec<_> = modules
        .iter()
        .filter(|m| prefix_matches(q, [m.name.as_str()]))
        .collect();

    Ok(html! {
        ul class="bg-gray-700 rounded divide-y divide-gray-600" {
            @for student in &students {
                li {
                    a href={"/student/" (student.id)} class="block p-2 hover:bg-gray-600" {
                        (student) " " span class="text-gray-400" { "(Student ID: " (student.id) ")" }
                    }
                }
            }
            @for module in &modules {
                li {
                    a href={"/module/" (module.code)} class="block p-2 hover:bg-gray-600" {
                        (module.name) " " span class="text-gray-400" { "(Module Code: " (module.code) ")" }
                    }
                }
            }
            @if students.is_empty() && modules.is_empty() {
                li class="p-2 text-gray-400" { "No matches" }
            }
        }
    })
}

pub async fn internal_post_seed(State(state): State<GradebookState>) -> GradebookResult<Markup> {
    fixtures::seed(state.api()).await?;

    for event in [
        SseEvent::CrudStudent,
        SseEvent::CrudModule,
        SseEvent::CrudRegistration,
        SseEvent::CrudGrade,
    ] {
        state.send_sse_event(event);
    }

    let counts = fetch_counts(&state).await?;
    Ok(html! {
        (success_banner("Sample data added"))
        (render_counts(counts, true))
    })
}
