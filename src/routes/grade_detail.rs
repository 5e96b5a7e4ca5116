use crate::{
    data::{DataType, grade::Grade},
    error::{GradebookResult, MissingGradeSnafu},
    maud_conveniences::{LINK_BUTTON, card, title},
    routes::grades::grade_action_button,
    state::GradebookState,
};
use axum::extract::{Path, State};
use maud::{Markup, html};
use snafu::OptionExt;

pub async fn get_grade(
    State(state): State<GradebookState>,
    Path(id): Path<i64>,
) -> GradebookResult<Markup> {
    let grade = Grade::get_by_id(id, state.api())
        .await?
        .context(MissingGradeSnafu { id })?;

    Ok(state.render(html! {
        div id="in_focus" class="max-w-4xl w-full" {}
        div id="grade_sections" class="max-w-4xl w-full"
            hx-get={"/grade/" (id)}
            hx-trigger="sse:crud_grade"
            hx-select="#grade_sections"
            hx-swap="outerHTML" {
            (card(html! {
                div class="flex flex-row items-center justify-between" {
                    (title(html! { "Grade " (id) }))
                    div class="flex flex-row space-x-2" {
                        (grade_action_button(grade.student.id, &grade.module.code, Some(&grade)))
                        a href="/grades" class=(LINK_BUTTON) { "All Grades" }
                    }
                }
                dl class="grid grid-cols-2 gap-2" {
                    dt class="text-gray-400" { "Score" }
                    dd class=[grade.is_fail().then_some("text-red-400 font-bold")] {
                        (grade.score)
                        @if grade.is_fail() { " (fail)" } @else { " (pass)" }
                    }
                    dt class="text-gray-400" { "Student" }
                    dd {
                        a href={"/student/" (grade.student.id)} class="underline" {
                            (grade.student) " (" (grade.student.id) ")"
                        }
                    }
                    dt class="text-gray-400" { "Module" }
                    dd {
                        a href={"/module/" (grade.module.code)} class="underline" {
                            (grade.module.name) " (" (grade.module.code) ")"
                        }
                    }
                }
            }))
        }
    }))
}
