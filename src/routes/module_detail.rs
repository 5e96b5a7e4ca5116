use crate::{
    api::ApiClient,
    data::{
        DataType,
        grade::Grade,
        module::{AddModuleForm, Module},
        registration::Registration,
        student::Student,
    },
    error::{
        CompulsoryModuleForModuleSnafu, GradebookResult, MissingModuleSnafu, NotRegisteredSnafu,
    },
    maud_conveniences::{
        BUTTON, DELETE_BUTTON, LINK_BUTTON, card, render_table, success_banner, title,
    },
    routes::{
        grades::{grade_action_button, score_cell},
        modules::module_form,
        sse::SseEvent,
    },
    state::GradebookState,
    stats::{average, display_average, is_failing_average},
};
use axum::{
    Form,
    extract::{Path, State},
};
use maud::{Markup, html};
use snafu::{OptionExt, ensure};

async fn fetch_module(
    code: &str,
    api: &ApiClient,
) -> GradebookResult<(Module, Vec<Grade>, Vec<Student>)> {
    let module = Module::get_by_id(code.to_string(), api)
        .await?
        .context(MissingModuleSnafu { code })?;
    let (grades, students) =
        tokio::try_join!(Module::grades(code, api), Module::students(code, api))?;

    Ok((module, grades, students))
}

pub async fn get_module(
    State(state): State<GradebookState>,
    Path(code): Path<String>,
) -> GradebookResult<Markup> {
    let (module, grades, students) = fetch_module(&code, state.api()).await?;

    Ok(state.render(html! {
        div id="in_focus" class="max-w-4xl w-full" {}
        (module_sections(&module, &grades, &students, false))
    }))
}

fn module_sections(
    module: &Module,
    grades: &[Grade],
    students: &[Student],
    out_of_band: bool,
) -> Markup {
    let module_average = average(grades.iter().map(|g| g.score));
    let failing = is_failing_average(module_average);

    let grade_rows = grades
        .iter()
        .map(|grade| {
            [
                html! { a href={"/student/" (grade.student.id)} class="underline" {(grade.student.id)} },
                html! {(grade.student)},
                score_cell(grade),
            ]
        })
        .collect();

    html! {
        div id="module_sections" class="max-w-4xl w-full"
            hx-swap-oob=[out_of_band.then_some("true")]
            hx-get={"/module/" (module.code)}
            hx-trigger="sse:crud_grade, sse:crud_registration"
            hx-select="#module_sections"
            hx-swap="outerHTML" {
            (card(html! {
                div class="flex flex-row items-center justify-between" {
                    (title(&module.name))
                    div class="flex flex-row space-x-2" {
                        button class=(LINK_BUTTON) hx-get={"/internal/module/" (module.code) "/edit"} hx-target="#in_focus" { "Edit Module" }
                        a href={"/module/" (module.code) "/register"} class=(BUTTON) { "Register Students" }
                        button class=(DELETE_BUTTON) hx-delete={"/modules/" (module.code) "?from_detail=true"} hx-confirm={"Delete " (module.name) "? This cannot be undone."} {
                            "Delete"
                        }
                    }
                }
                dl class="grid grid-cols-2 gap-2" {
                    dt class="text-gray-400" { "Module Code" } dd {(module.code)}
                    dt class="text-gray-400" { "Mandatory" } dd {(module.mandatory_label())}
                    dt class="text-gray-400" { "Average Grade" }
                    dd class=[failing.then_some("text-red-400 font-bold")] {
                        (display_average(module_average))
                        @if failing {
                            " (failing)"
                        }
                    }
                }
            }))
            (card(render_table("Grades", ["Student ID", "Name", "Score"], grade_rows)))
            (card(html! {
                div id="module_students" {
                    (render_module_students(&module.code, students, grades))
                }
            }))
        }
    }
}

fn render_module_students(code: &str, students: &[Student], grades: &[Grade]) -> Markup {
    let rows = students
        .iter()
        .map(|student| {
            let grade = Grade::for_pair(grades, student.id, code);
            [
                html! { a href={"/student/" (student.id)} class="underline" {(student.id)} },
                html! {(student)},
                html! {(student.email)},
                html! {
                    @match grade {
                        Some(grade) => {(grade.score)}
                        None => { span class="text-gray-400" { "-" } }
                    }
                },
                html! {
                    div class="flex flex-row space-x-2" {
                        (grade_action_button(student.id, code, grade))
                        button class=(DELETE_BUTTON) hx-delete={"/module/" (code) "/students/" (student.id)} hx-target="#module_students" {
                            "Unregister"
                        }
                    }
                },
            ]
        })
        .collect();

    render_table(
        "Registered Students",
        ["Student ID", "Name", "Email", "Grade", ""],
        rows,
    )
}

pub async fn internal_get_edit_module_form(
    State(state): State<GradebookState>,
    Path(code): Path<String>,
) -> GradebookResult<Markup> {
    let module = Module::get_by_id(code.clone(), state.api())
        .await?
        .context(MissingModuleSnafu { code: code.as_str() })?;

    Ok(module_form(Some(&module)))
}

/// Re-posts the module. Making it mandatory registers everyone, same as creating it would.
pub async fn internal_put_edit_module(
    State(state): State<GradebookState>,
    Path(code): Path<String>,
    Form(form): Form<AddModuleForm>,
) -> GradebookResult<Markup> {
    let api = state.api();
    Module::get_by_id(code.clone(), api)
        .await?
        .context(MissingModuleSnafu { code: code.as_str() })?;

    let module = Module::try_from(AddModuleForm {
        code: code.clone(),
        ..form
    })?;
    let name = module.name.clone();
    let registers_everyone = module.mnc;

    Module::insert(module, api).await?;
    state.send_sse_event(SseEvent::CrudModule);
    if registers_everyone {
        state.send_sse_event(SseEvent::CrudRegistration);
    }

    let (module, grades, students) = fetch_module(&code, api).await?;
    Ok(html! {
        (success_banner(format!("Saved {name}")))
        (module_sections(&module, &grades, &students, true))
    })
}

pub async fn delete_module_student(
    State(state): State<GradebookState>,
    Path((code, id)): Path<(String, i64)>,
) -> GradebookResult<Markup> {
    let api = state.api();
    let module = Module::get_by_id(code.clone(), api)
        .await?
        .context(MissingModuleSnafu { code: code.as_str() })?;
    ensure!(
        !module.mnc,
        CompulsoryModuleForModuleSnafu {
            code: code.as_str()
        }
    );

    let students = Module::students(&code, api).await?;
    ensure!(
        students.iter().any(|s| s.id == id),
        NotRegisteredSnafu {
            id,
            code: code.as_str()
        }
    );

    Registration::remove(id, &code, api).await?;
    state.send_sse_event(SseEvent::CrudRegistration);

    let (students, grades) =
        tokio::try_join!(Module::students(&code, api), Module::grades(&code, api))?;
    Ok(render_module_students(&code, &students, &grades))
}
