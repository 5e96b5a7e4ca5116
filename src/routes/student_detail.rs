use crate::{
    api::ApiClient,
    data::{
        DataType,
        grade::Grade,
        module::Module,
        registration::Registration,
        student::{AddStudentForm, Student},
    },
    error::{
        CompulsoryModuleForStudentSnafu, GradebookResult, MissingStudentSnafu, NotRegisteredSnafu,
    },
    maud_conveniences::{
        BUTTON, DELETE_BUTTON, LINK_BUTTON, card, render_table, success_banner, title,
    },
    routes::{
        grades::{grade_action_button, score_cell},
        sse::SseEvent,
        students::student_form,
    },
    state::GradebookState,
    stats::{average, display_average},
};
use axum::{
    Form,
    extract::{Path, State},
};
use maud::{Markup, html};
use snafu::{OptionExt, ensure};

async fn fetch_student(
    id: i64,
    api: &ApiClient,
) -> GradebookResult<(Student, Vec<Grade>, Vec<Module>)> {
    let student = Student::get_by_id(id, api)
        .await?
        .context(MissingStudentSnafu { id })?;
    let (grades, modules) = tokio::try_join!(Student::grades(id, api), Student::modules(id, api))?;

    Ok((student, grades, modules))
}

pub async fn get_student(
    State(state): State<GradebookState>,
    Path(id): Path<i64>,
) -> GradebookResult<Markup> {
    let (student, grades, modules) = fetch_student(id, state.api()).await?;

    Ok(state.render(html! {
        div id="in_focus" class="max-w-4xl w-full" {}
        (student_sections(&student, &grades, &modules, false))
    }))
}

/// The whole page below the form slot. Grade and registration changes make it re-fetch this page
/// and swap itself back in.
fn student_sections(
    student: &Student,
    grades: &[Grade],
    modules: &[Module],
    out_of_band: bool,
) -> Markup {
    let id = student.id;
    let student_average = average(grades.iter().map(|g| g.score));

    html! {
        div id="student_sections" class="max-w-4xl w-full"
            hx-swap-oob=[out_of_band.then_some("true")]
            hx-get={"/student/" (id)}
            hx-trigger="sse:crud_grade, sse:crud_registration"
            hx-select="#student_sections"
            hx-swap="outerHTML" {
            (card(html! {
                div class="flex flex-row items-center justify-between" {
                    (title(student))
                    div class="flex flex-row space-x-2" {
                        button class=(LINK_BUTTON) hx-get={"/internal/student/" (id) "/edit"} hx-target="#in_focus" { "Edit Profile" }
                        a href={"/grades?student_id=" (id)} class=(LINK_BUTTON) { "Add Grade" }
                        a href={"/student/" (id) "/register"} class=(BUTTON) { "Register Modules" }
                        button class=(DELETE_BUTTON) hx-delete={"/students/" (id) "?from_detail=true"} hx-confirm={"Delete " (student) "?"} {
                            "Delete"
                        }
                    }
                }
                dl class="grid grid-cols-2 gap-2" {
                    dt class="text-gray-400" { "Student ID" } dd {(student.id)}
                    dt class="text-gray-400" { "Username" } dd {(student.username)}
                    dt class="text-gray-400" { "Email" } dd {(student.email)}
                    dt class="text-gray-400" { "Average Grade" } dd {(display_average(student_average))}
                }
            }))
            (card(render_grades(grades)))
            (card(html! {
                div id="student_modules" {
                    (render_student_modules(id, modules, grades))
                }
            }))
        }
    }
}

fn render_grades(grades: &[Grade]) -> Markup {
    render_table(
        "Grades",
        ["Module Code", "Module Name", "Score"],
        grades
            .iter()
            .map(|grade| {
                [
                    html! { a href={"/module/" (grade.module.code)} class="underline" {(grade.module.code)} },
                    html! {(grade.module.name)},
                    score_cell(grade),
                ]
            })
            .collect(),
    )
}

fn render_student_modules(id: i64, modules: &[Module], grades: &[Grade]) -> Markup {
    let rows = modules
        .iter()
        .map(|module| {
            let grade = Grade::for_pair(grades, id, &module.code);
            [
                html! { a href={"/module/" (module.code)} class="underline" {(module.code)} },
                html! {(module.name)},
                html! {(module.mandatory_label())},
                html! {
                    @match grade {
                        Some(grade) => {(grade.score)}
                        None => { span class="text-gray-400" { "-" } }
                    }
                },
                html! {
                    div class="flex flex-row space-x-2" {
                        (grade_action_button(id, &module.code, grade))
                        button class=(DELETE_BUTTON) hx-delete={"/student/" (id) "/modules/" (module.code)} hx-target="#student_modules" {
                            "Unregister"
                        }
                    }
                },
            ]
        })
        .collect();

    render_table(
        "Registered Modules",
        ["Module Code", "Module Name", "Mandatory", "Grade", ""],
        rows,
    )
}

pub async fn internal_get_edit_student_form(
    State(state): State<GradebookState>,
    Path(id): Path<i64>,
) -> GradebookResult<Markup> {
    let student = Student::get_by_id(id, state.api())
        .await?
        .context(MissingStudentSnafu { id })?;

    Ok(student_form(Some(&student)))
}

/// Saving re-posts the whole student, which the API treats as an update.
pub async fn internal_put_edit_student(
    State(state): State<GradebookState>,
    Path(id): Path<i64>,
    Form(form): Form<AddStudentForm>,
) -> GradebookResult<Markup> {
    let api = state.api();
    Student::get_by_id(id, api)
        .await?
        .context(MissingStudentSnafu { id })?;

    // the path decides who gets saved
    let student = Student::try_from(AddStudentForm {
        id: id.to_string(),
        ..form
    })?;
    let name = student.full_name();

    Student::insert(student, api).await?;
    state.send_sse_event(SseEvent::CrudStudent);

    let (student, grades, modules) = fetch_student(id, api).await?;
    Ok(html! {
        (success_banner(format!("Saved {name}")))
        (student_sections(&student, &grades, &modules, true))
    })
}

pub async fn delete_student_module(
    State(state): State<GradebookState>,
    Path((id, code)): Path<(i64, String)>,
) -> GradebookResult<Markup> {
    let api = state.api();
    let modules = Student::modules(id, api).await?;

    let module = modules
        .iter()
        .find(|m| m.code == code)
        .context(NotRegisteredSnafu {
            id,
            code: code.as_str(),
        })?;
    ensure!(
        !module.mnc,
        CompulsoryModuleForStudentSnafu {
            code: code.as_str()
        }
    );

    Registration::remove(id, &code, api).await?;
    state.send_sse_event(SseEvent::CrudRegistration);

    let (modules, grades) = tokio::try_join!(Student::modules(id, api), Student::grades(id, api))?;
    Ok(render_student_modules(id, &modules, &grades))
}
