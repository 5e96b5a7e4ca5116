use crate::{
    data::{
        DataType,
        grade::{AddGradeForm, Grade, GradeColumn, MAX_SCORE, NewGrade},
        student::Student,
    },
    error::GradebookResult,
    listing::{ListingQuery, filter_and_sort},
    maud_conveniences::{
        BUTTON, INPUT, card, filter_box, form_element, form_submit_button, sort_inputs,
        sortable_table, success_banner, title,
    },
    routes::sse::SseEvent,
    state::GradebookState,
};
use axum::{
    Form,
    extract::{Query, State},
};
use maud::{Markup, html};
use serde::Deserialize;

const FRAGMENT: &str = "/internal/grades";
const TARGET: &str = "#all_grades";
const CONTROLS: &str = "#grade_controls";

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct GradeFormQuery {
    student_id: Option<i64>,
    module_code: Option<String>,
}

pub async fn get_grades(
    State(state): State<GradebookState>,
    Query(GradeFormQuery { student_id, .. }): Query<GradeFormQuery>,
) -> Markup {
    // linking here from a student page opens the form with them chosen
    let form_url = student_id.map(|id| format!("/internal/grades/new?student_id={id}"));

    state.render(html! {
        (card(html! {
            div class="flex flex-row items-center justify-between" {
                (title("Grades"))
                button class=(BUTTON) hx-get="/internal/grades/new" hx-target="#in_focus" {
                    "Add or Update Grade"
                }
            }
            @match form_url {
                Some(form_url) => {
                    div id="in_focus" hx-get=(form_url) hx-trigger="load" {}
                }
                None => {
                    div id="in_focus" {}
                }
            }
            div id="grade_controls" {
                (filter_box(FRAGMENT, TARGET, CONTROLS, ""))
                div id="all_grades" hx-get=(FRAGMENT) hx-trigger="load, sse:crud_grade" hx-include=(CONTROLS) {}
            }
        }))
    })
}

pub async fn internal_get_grades(
    State(state): State<GradebookState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> GradebookResult<Markup> {
    let query = ListingQuery::from_pairs(pairs);
    let sort = query.sort_state(GradeColumn::Student);

    let grades = Grade::get_all(state.api()).await?;
    let rows = filter_and_sort(&grades, &query.filter, sort)
        .into_iter()
        .map(|grade| {
            [
                html! { a href={"/student/" (grade.student.id)} class="underline" {(grade.student)} },
                html! { a href={"/module/" (grade.module.code)} class="underline" {(grade.module.code) " " (grade.module.name)} },
                score_cell(grade),
            ]
        })
        .collect();

    Ok(html! {
        (sort_inputs(sort))
        (sortable_table(
            FRAGMENT,
            TARGET,
            CONTROLS,
            sort,
            [
                Some(GradeColumn::Student),
                Some(GradeColumn::Module),
                Some(GradeColumn::Score),
            ],
            rows,
        ))
    })
}

pub async fn internal_get_add_grade_form(
    State(state): State<GradebookState>,
    Query(query): Query<GradeFormQuery>,
) -> GradebookResult<Markup> {
    let students = Student::get_all(state.api()).await?;
    let chosen = query
        .student_id
        .filter(|id| students.iter().any(|s| s.id == *id))
        .or_else(|| students.first().map(|s| s.id));

    let module_options = match chosen {
        Some(student_id) => {
            render_module_options(&state, student_id, query.module_code.as_deref()).await?
        }
        None => html! { p class="text-gray-400" { "Add a student first." } },
    };

    Ok(html! {
        (title("Add or Update Grade"))

        form id="grade_form" hx-put="/internal/grades/new" hx-trigger="submit" hx-target="#in_focus" class="p-4" {
            (form_element("student_id", "Student", html! {
                select id="student_id" name="student_id" class=(INPUT)
                    hx-get="/internal/grades/module_options" hx-target="#module_options" hx-include="#grade_form" {
                    @for student in &students {
                        option value=(student.id) selected[Some(student.id) == chosen] {
                            (student) " (" (student.id) ")"
                        }
                    }
                }
            }))
            div id="module_options" {
                (module_options)
            }
        }
    })
}

/// Opens the grade form for one (student, module) pair in the page's `#in_focus` slot.
pub fn grade_action_button(student_id: i64, module_code: &str, existing: Option<&Grade>) -> Markup {
    html! {
        button class=(BUTTON)
            hx-get={"/internal/grades/new?student_id=" (student_id) "&module_code=" (module_code)}
            hx-target="#in_focus" {
            @if existing.is_some() { "Edit Grade" } @else { "Add Grade" }
        }
    }
}

/// The score, linking to the grade's own page when the API gave it an id.
pub fn score_cell(grade: &Grade) -> Markup {
    let class = grade.is_fail().then_some("text-red-400 font-bold");
    html! {
        @match grade.id {
            Some(id) => {
                a href={"/grade/" (id)} class=[class] { span class="underline" {(grade.score)} }
            }
            None => {
                span class=[class] {(grade.score)}
            }
        }
    }
}

pub async fn internal_get_module_options(
    State(state): State<GradebookState>,
    Query(query): Query<GradeFormQuery>,
) -> GradebookResult<Markup> {
    match query.student_id {
        Some(student_id) => {
            render_module_options(&state, student_id, query.module_code.as_deref()).await
        }
        None => Ok(html! { p class="text-gray-400" { "Choose a student first." } }),
    }
}

/// Only modules the student is registered for can be graded. If the chosen pair already has a
/// grade the form says it will be updated.
async fn render_module_options(
    state: &GradebookState,
    student_id: i64,
    module_code: Option<&str>,
) -> GradebookResult<Markup> {
    let api = state.api();
    let (modules, grades) = tokio::try_join!(
        Student::modules(student_id, api),
        Student::grades(student_id, api)
    )?;

    let Some(chosen) = module_code
        .and_then(|code| modules.iter().find(|m| m.code == code))
        .or_else(|| modules.first())
    else {
        return Ok(html! { p class="text-gray-400" { "This student isn't registered for any modules." } });
    };
    let existing = Grade::for_pair(&grades, student_id, &chosen.code);

    Ok(html! {
        (form_element("module_code", "Module", html! {
            select id="module_code" name="module_code" class=(INPUT)
                hx-get="/internal/grades/module_options" hx-target="#module_options" hx-include="#grade_form" {
                @for module in &modules {
                    option value=(module.code) selected[module.code == chosen.code] {
                        (module.code) " " (module.name)
                    }
                }
            }
        }))
        (form_element("score", "Score", html! {
            input type="number" id="score" name="score" min="0" max=(MAX_SCORE) required
                value=[existing.map(|g| g.score)] class=(INPUT);
        }))
        @match existing {
            Some(grade) => {
                p class="text-gray-400 mb-2" { "Current grade: " (grade.score) }
                (form_submit_button(Some("Update Grade")))
            }
            None => {
                (form_submit_button(Some("Add Grade")))
            }
        }
    })
}

pub async fn internal_put_new_grade(
    State(state): State<GradebookState>,
    Form(form): Form<AddGradeForm>,
) -> GradebookResult<Markup> {
    let grade = NewGrade::try_from(form)?;
    let message = format!(
        "Saved a score of {} for student {} in {}",
        grade.score, grade.student.id, grade.module.code
    );

    Grade::insert(grade, state.api()).await?;
    state.send_sse_event(SseEvent::CrudGrade);

    Ok(success_banner(message))
}
