use crate::{
    data::{
        DataType,
        module::{AddModuleForm, Module, ModuleColumn},
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

const FRAGMENT: &str = "/internal/modules";
const TARGET: &str = "#all_modules";
const CONTROLS: &str = "#module_controls";

pub async fn get_modules(State(state): State<GradebookState>) -> Markup {
    state.render(html! {
        (card(html! {
            div class="flex flex-row items-center justify-between" {
                (title("Modules"))
                button class=(BUTTON) hx-get="/internal/modules/new" hx-target="#in_focus" {
                    "Add New Module"
                }
            }
            div id="in_focus" {}
            div id="module_controls" {
                (filter_box(FRAGMENT, TARGET, CONTROLS, ""))
                div id="all_modules" hx-get=(FRAGMENT) hx-trigger="load, sse:crud_module" hx-include=(CONTROLS) {}
            }
        }))
    })
}

pub async fn internal_get_modules(
    State(state): State<GradebookState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> GradebookResult<Markup> {
    let query = ListingQuery::from_pairs(pairs);
    let sort = query.sort_state(ModuleColumn::Code);

    let modules = Module::get_all(state.api()).await?;
    let rows = filter_and_sort(&modules, &query.filter, sort)
        .into_iter()
        .map(|module| {
            [
                html! { a href={"/module/" (module.code)} class="underline" {(module.code)} },
                html! {(module.name)},
                html! {(module.mandatory_label())},
                html! {
                    button class=(DELETE_BUTTON) hx-delete={"/modules/" (module.code)} hx-confirm={"Delete " (module.name) "?"} hx-target="#in_focus" {
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
                Some(ModuleColumn::Code),
                Some(ModuleColumn::Name),
                Some(ModuleColumn::Mandatory),
                None,
            ],
            rows,
        ))
    })
}

/// The add form, or the edit form for `existing`, whose code stays fixed.
pub fn module_form(existing: Option<&Module>) -> Markup {
    let (heading, action, button) = match existing {
        Some(module) => (
            "Edit Module",
            format!("/internal/module/{}/edit", module.code),
            "Save Changes",
        ),
        None => (
            "Add New Module",
            "/internal/modules/new".to_string(),
            "Add Module",
        ),
    };

    html! {
        (title(heading))

        form hx-put=(action) hx-trigger="submit" hx-target="#in_focus" class="p-4" {
            @match existing {
                Some(module) => {
                    (form_element("code", "Module Code", html! {
                        input type="text" id="code" name="code" value=(module.code) readonly class={(INPUT) " opacity-60"};
                    }))
                }
                None => {
                    (simple_form_element("code", "Module Code", true, None, None))
                }
            }
            (simple_form_element("name", "Module Name", true, None, existing.map(|m| m.name.as_str())))

            div class="mb-4 flex items-center" {
                input type="checkbox" name="mnc" id="mnc" class="mr-2 leading-tight" checked[existing.is_some_and(|m| m.mnc)];
                label for="mnc" class="text-gray-300 cursor-pointer" {"Mandatory?"}
            }

            (form_submit_button(Some(button)))
        }
    }
}

pub async fn internal_get_add_module_form() -> Markup {
    module_form(None)
}

pub async fn internal_put_new_module(
    State(state): State<GradebookState>,
    Form(form): Form<AddModuleForm>,
) -> GradebookResult<Markup> {
    let module = Module::try_from(form)?;
    let name = module.name.clone();

    // the API registers every student for a new mandatory module
    let registers_everyone = module.mnc;
    Module::insert(module, state.api()).await?;

    state.send_sse_event(SseEvent::CrudModule);
    if registers_everyone {
        state.send_sse_event(SseEvent::CrudRegistration);
    }

    Ok(success_banner(format!("Added {name}")))
}

pub async fn delete_module(
    State(state): State<GradebookState>,
    Path(code): Path<String>,
    Query(after): Query<AfterDelete>,
) -> GradebookResult<impl IntoResponse> {
    info!(?code, "removing module");
    Module::remove(&code, state.api()).await?;
    state.send_sse_event(SseEvent::CrudModule);

    Ok(after.respond("/modules"))
}
