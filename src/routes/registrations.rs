use crate::{
    data::{
        DataType,
        module::Module,
        registration::{AddRegistrationForm, NewRegistration, Registration, RegistrationColumn},
        student::Student,
    },
    error::{CompulsoryModuleForStudentSnafu, GradebookResult, NotRegisteredSnafu},
    listing::{ListingQuery, filter_and_sort, paginate},
    maud_conveniences::{
        BUTTON, DELETE_BUTTON, INPUT, card, filter_box, form_element, form_submit_button,
        pagination_controls, sort_inputs, sortable_table, success_banner, title,
    },
    routes::sse::SseEvent,
    state::GradebookState,
};
use axum::{
    Form,
    extract::{Path, Query, State},
};
use maud::{Markup, html};
use snafu::{OptionExt, ensure};

const FRAGMENT: &str = "/internal/registrations";
const TARGET: &str = "#all_registrations";
const CONTROLS: &str = "#registration_controls";

pub async fn get_registrations(State(state): State<GradebookState>) -> Markup {
    state.render(html! {
        (card(html! {
            div class="flex flex-row items-center justify-between" {
                (title("Registrations"))
                button class=(BUTTON) hx-get="/internal/registrations/new" hx-target="#in_focus" {
                    "Add New Registration"
                }
            }
            div id="in_focus" {}
            div id="registration_controls" {
                (filter_box(FRAGMENT, TARGET, CONTROLS, ""))
                div id="all_registrations" hx-get=(FRAGMENT) hx-trigger="load, sse:crud_registration" hx-include=(CONTROLS) {}
            }
        }))
    })
}

pub async fn internal_get_registrations(
    State(state): State<GradebookState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> GradebookResult<Markup> {
    let query = ListingQuery::from_pairs(pairs);
    let sort = query.sort_state(RegistrationColumn::Student);

    let registrations = Registration::get_all(state.api()).await?;
    let shown = filter_and_sort(&registrations, &query.filter, sort);
    let (on_page, page) = paginate(&shown, query.page, query.rows_per_page);

    let rows = on_page
        .iter()
        .map(|registration| {
            let student = &registration.student;
            let module = &registration.module;
            [
                html! { a href={"/student/" (student.id)} class="underline" {(student) " (" (student.id) ")"} },
                html! { a href={"/module/" (module.code)} class="underline" {(module.name) " (" (module.code) ")"} },
                html! {
                    button class=(DELETE_BUTTON) hx-delete={"/registrations/" (student.id) "/" (module.code)} hx-confirm="Delete this registration?" hx-target="#in_focus" {
                        "Delete"
                    }
                },
            ]
        })
        .collect();

    Ok(html! {
        (sort_inputs(sort))
        input type="hidden" name="page" value=(page.index);
        (sortable_table(
            FRAGMENT,
            TARGET,
            CONTROLS,
            sort,
            [Some(RegistrationColumn::Student), Some(RegistrationColumn::Module), None],
            rows,
        ))
        (pagination_controls(FRAGMENT, TARGET, CONTROLS, page))
    })
}

pub async fn internal_get_add_registration_form(
    State(state): State<GradebookState>,
) -> GradebookResult<Markup> {
    let api = state.api();
    let (students, modules) = tokio::try_join!(Student::get_all(api), Module::get_all(api))?;

    Ok(html! {
        (title("Add New Registration"))

        form hx-put="/internal/registrations/new" hx-trigger="submit" hx-target="#in_focus" class="p-4" {
            (form_element("student_id", "Student", html! {
                select id="student_id" name="student_id" class=(INPUT) {
                    @for student in &students {
                        option value=(student.id) { (student) " (" (student.id) ")" }
                    }
                }
            }))
            (form_element("module_code", "Module", html! {
                select id="module_code" name="module_code" class=(INPUT) {
                    @for module in &modules {
                        option value=(module.code) { (module.code) " " (module.name) }
                    }
                }
            }))
            (form_submit_button(Some("Register")))
        }
    })
}

pub async fn internal_put_new_registration(
    State(state): State<GradebookState>,
    Form(form): Form<AddRegistrationForm>,
) -> GradebookResult<Markup> {
    let registration = NewRegistration::from(form);
    let message = format!(
        "Registered student {} for {}",
        registration.student.id, registration.module.code
    );

    Registration::insert(registration, state.api()).await?;
    state.send_sse_event(SseEvent::CrudRegistration);

    Ok(success_banner(message))
}

pub async fn delete_registration(
    State(state): State<GradebookState>,
    Path((id, code)): Path<(i64, String)>,
) -> GradebookResult<Markup> {
    let api = state.api();
    let registration = Registration::get_by_id((id, code.clone()), api)
        .await?
        .context(NotRegisteredSnafu {
            id,
            code: code.as_str(),
        })?;
    ensure!(
        !registration.module.mnc,
        CompulsoryModuleForStudentSnafu {
            code: code.as_str()
        }
    );

    Registration::remove(id, &code, api).await?;
    state.send_sse_event(SseEvent::CrudRegistration);

    Ok(html! {})
}
