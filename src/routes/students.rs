use crate::{
    data::{
        DataType,
        student::{AddStudentForm, Student, StudentColumn},
    },
    error::GradebookResult,
    listing::{ListingQuery, filter_and_sort},
    maud_conveniences::{
        BUTTON, DELETE_BUTTON, INPUT, card, filter_box, form_element, form_submit_button,
        simple_form_element, sort_inputs, sortable_table, success_banner, title,
    },
    routes::{AfterDelete, sse::SseEvent},
    state::GradebookState,
};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use maud::{Markup, html};

const FRAGMENT: &str = "/internal/students";
const TARGET: &str = "#all_students";
const CONTROLS: &str = "#student_controls";

pub async fn get_students(State(state): State<GradebookState>) -> Markup {
    state.render(html! {
        (card(html! {
            div class="flex flex-row items-center justify-between" {
                (title("Students"))
                button class=(BUTTON) hx-get="/internal/students/new" hx-target="#in_focus" {
                    "Add New Student"
                }
            }
            div id="in_focus" {}
            div id="student_controls" {
                (filter_box(FRAGMENT, TARGET, CONTROLS, ""))
                div id="all_students" hx-get=(FRAGMENT) hx-trigger="load, sse:crud_student" hx-include=(CONTROLS) {}
            }
        }))
    })
}

pub async fn internal_get_students(
    State(state): State<GradebookState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> GradebookResult<Markup> {
    let query = ListingQuery::from_pairs(pairs);
    let sort = query.sort_state(StudentColumn::Id);

    let students = Student::get_all(state.api()).await?;
    let shown = filter_and_sort(&students, &query.filter, sort);

    let rows = shown
        .into_iter()
        .map(|student| {
            [
                html! { a href={"/student/" (student.id)} class="underline" {(student.id)} },
                html! {(student.first_name)},
                html! {(student.last_name)},
                html! {(student.username)},
                html! {(student.email)},
                html! {
                    button class=(DELETE_BUTTON) hx-delete={"/students/" (student.id)} hx-confirm={"Delete " (student) "?"} hx-target="#in_focus" {
                        "Delete"
                    }
                },
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
                Some(StudentColumn::Id),
                Some(StudentColumn::FirstName),
                Some(StudentColumn::LastName),
                Some(StudentColumn::Username),
                Some(StudentColumn::Email),
                None,
            ],
            rows,
        ))
    })
}

/// The add form, or the edit form for `existing`. A student keeps the id they were created with.
pub fn student_form(existing: Option<&Student>) -> Markup {
    let (heading, action, button) = match existing {
        Some(student) => (
            "Edit Student",
            format!("/internal/student/{}/edit", student.id),
            "Save Changes",
        ),
        None => (
            "Add New Student",
            "/internal/students/new".to_string(),
            "Add Student",
        ),
    };

    html! {
        (title(heading))

        form hx-put=(action) hx-trigger="submit" hx-target="#in_focus" class="p-4" {
            @match existing {
                Some(student) => {
                    (form_element("id", "Student ID", html! {
                        input type="number" id="id" name="id" value=(student.id) readonly class={(INPUT) " opacity-60"};
                    }))
                }
                None => {
                    (simple_form_element("id", "Student ID", true, Some("number"), None))
                }
            }
            (simple_form_element("username", "Username", true, None, existing.map(|s| s.username.as_str())))
            (simple_form_element("email", "Email", true, Some("email"), existing.map(|s| s.email.as_str())))
            (simple_form_element("first_name", "First Name", true, None, existing.map(|s| s.first_name.as_str())))
            (simple_form_element("last_name", "Last Name", true, None, existing.map(|s| s.last_name.as_str())))
            (form_submit_button(Some(button)))
        }
    }
}

pub async fn internal_get_add_student_form() -> Markup {
    student_form(None)
}

pub async fn internal_put_new_student(
    State(state): State<GradebookState>,
    Form(form): Form<AddStudentForm>,
) -> GradebookResult<Markup> {
    let student = Student::try_from(form)?;
    let name = student.full_name();

    Student::insert(student, state.api()).await?;
    state.send_sse_event(SseEvent::CrudStudent);

    Ok(success_banner(format!("Added {name}")))
}

pub async fn delete_student(
    State(state): State<GradebookState>,
    Path(id): Path<i64>,
    Query(after): Query<AfterDelete>,
) -> GradebookResult<impl IntoResponse> {
    Student::remove(id, state.api()).await?;
    state.send_sse_event(SseEvent::CrudStudent);

    Ok(after.respond("/students"))
}
