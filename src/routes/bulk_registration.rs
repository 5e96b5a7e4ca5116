use crate::{
    bulk::{BulkOutcome, BulkSelection, parse_keys, submit_registrations},
    data::{
        DataType,
        module::{Module, ModuleColumn},
        registration::NewRegistration,
        student::{Student, StudentColumn},
    },
    error::{GradebookResult, MissingModuleSnafu, MissingStudentSnafu},
    listing::{ListingQuery, filter_and_sort},
    maud_conveniences::{
        LINK_BUTTON, card, error_banner, filter_box, form_submit_button, sort_inputs,
        sortable_table, success_banner, title,
    },
    routes::sse::SseEvent,
    state::GradebookState,
};
use axum::{
    Form,
    extract::{Path, Query, State},
};
use maud::{Markup, html};
use snafu::OptionExt;
use std::{collections::BTreeSet, fmt::Display};

const TARGET: &str = "#bulk_candidates";
const CONTROLS: &str = "#bulk_form";

fn checkbox<K: Ord + Clone + Display>(selection: &BulkSelection<K>, key: &K) -> Markup {
    html! {
        input type="checkbox" name="selected" value=(key) class="leading-tight"
            checked[selection.is_selected(key)]
            disabled[selection.is_locked(key)];
    }
}

/// Selected rows that the filter hides still have to reach the next request.
fn carried_selections<K: Ord + Clone + Display>(
    selection: &BulkSelection<K>,
    visible: &BTreeSet<K>,
) -> Markup {
    html! {
        @for key in selection.selected() {
            @if !selection.is_locked(key) && !visible.contains(key) {
                input type="hidden" name="selected" value=(key);
            }
        }
    }
}

fn bulk_page(heading: Markup, fragment_url: &str, back: &str) -> Markup {
    html! {
        (title(heading))
        p class="text-gray-400" { "Already registered rows are locked in." }

        form id="bulk_form" hx-post=(back.to_string() + "/register") hx-target="#bulk_result" hx-trigger="submit" {
            (filter_box(fragment_url, TARGET, CONTROLS, ""))
            div id="bulk_candidates" hx-get=(fragment_url) hx-trigger="load, sse:crud_registration" hx-include=(CONTROLS) {}
            div class="mt-4" {
                (form_submit_button(Some("Register Selected")))
            }
        }
        div id="bulk_result" {}
        a href=(back) class=(LINK_BUTTON) { "Back" }
    }
}

fn render_outcome(outcome: &BulkOutcome) -> Markup {
    html! {
        @if let Some(error) = &outcome.last_error {
            (error_banner(error))
        }
        @if outcome.attempted == 0 {
            (success_banner("Nothing selected"))
        } @else {
            (success_banner(format!(
                "{} of {} registrations submitted",
                outcome.succeeded, outcome.attempted
            )))
        }
    }
}

pub async fn get_student_register(
    State(state): State<GradebookState>,
    Path(id): Path<i64>,
) -> GradebookResult<Markup> {
    let student = Student::get_by_id(id, state.api())
        .await?
        .context(MissingStudentSnafu { id })?;

    Ok(state.render(card(bulk_page(
        html! { "Register " (student) " for Modules" },
        &format!("/internal/student/{id}/register"),
        &format!("/student/{id}"),
    ))))
}

pub async fn internal_get_student_register(
    State(state): State<GradebookState>,
    Path(id): Path<i64>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> GradebookResult<Markup> {
    let query = ListingQuery::from_pairs(pairs);
    let sort = query.sort_state(ModuleColumn::Code);
    let fragment_url = format!("/internal/student/{id}/register");

    let api = state.api();
    let (linked, modules) = tokio::try_join!(Student::modules(id, api), Module::get_all(api))?;
    let selection = BulkSelection::with_posted(
        linked.into_iter().map(|m| m.code),
        query.selected.iter().cloned(),
    );

    let shown = filter_and_sort(&modules, &query.filter, sort);
    let visible: BTreeSet<String> = shown.iter().map(|m| m.code.clone()).collect();
    let rows = shown
        .into_iter()
        .map(|module| {
            [
                checkbox(&selection, &module.code),
                html! {(module.code)},
                html! {(module.name)},
                html! {(module.mandatory_label())},
            ]
        })
        .collect();

    Ok(html! {
        (sort_inputs(sort))
        (carried_selections(&selection, &visible))
        (sortable_table(
            &fragment_url,
            TARGET,
            CONTROLS,
            sort,
            [
                None,
                Some(ModuleColumn::Code),
                Some(ModuleColumn::Name),
                Some(ModuleColumn::Mandatory),
            ],
            rows,
        ))
        p class="text-gray-400 mt-2" {
            @if selection.is_empty() {
                "Nothing selected"
            } @else {
                (selection.len()) " selected"
            }
        }
    })
}

pub async fn post_student_register(
    State(state): State<GradebookState>,
    Path(id): Path<i64>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> GradebookResult<Markup> {
    let query = ListingQuery::from_pairs(pairs);
    let api = state.api();

    let linked = Student::modules(id, api).await?;
    let selection = BulkSelection::with_posted(
        linked.into_iter().map(|m| m.code),
        query.selected,
    );

    let outcome = submit_registrations(
        selection
            .selected()
            .map(|code| NewRegistration::new(id, code.as_str())),
        api,
    )
    .await;
    state.send_sse_event(SseEvent::CrudRegistration);

    Ok(render_outcome(&outcome))
}

pub async fn get_module_register(
    State(state): State<GradebookState>,
    Path(code): Path<String>,
) -> GradebookResult<Markup> {
    let module = Module::get_by_id(code.clone(), state.api())
        .await?
        .context(MissingModuleSnafu { code: code.as_str() })?;

    Ok(state.render(card(bulk_page(
        html! { "Register Students for " (module.name) },
        &format!("/internal/module/{code}/register"),
        &format!("/module/{code}"),
    ))))
}

pub async fn internal_get_module_register(
    State(state): State<GradebookState>,
    Path(code): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> GradebookResult<Markup> {
    let query = ListingQuery::from_pairs(pairs);
    let sort = query.sort_state(StudentColumn::Id);
    let fragment_url = format!("/internal/module/{code}/register");

    let api = state.api();
    let (linked, students) = tokio::try_join!(Module::students(&code, api), Student::get_all(api))?;
    let selection = BulkSelection::with_posted(
        linked.into_iter().map(|s| s.id),
        parse_keys::<i64>(&query.selected),
    );

    let shown = filter_and_sort(&students, &query.filter, sort);
    let visible: BTreeSet<i64> = shown.iter().map(|s| s.id).collect();
    let rows = shown
        .into_iter()
        .map(|student| {
            [
                checkbox(&selection, &student.id),
                html! {(student.id)},
                html! {(student.first_name)},
                html! {(student.last_name)},
                html! {(student.email)},
            ]
        })
        .collect();

    Ok(html! {
        (sort_inputs(sort))
        (carried_selections(&selection, &visible))
        (sortable_table(
            &fragment_url,
            TARGET,
            CONTROLS,
            sort,
            [
                None,
                Some(StudentColumn::Id),
                Some(StudentColumn::FirstName),
                Some(StudentColumn::LastName),
                Some(StudentColumn::Email),
            ],
            rows,
        ))
        p class="text-gray-400 mt-2" {
            @if selection.is_empty() {
                "Nothing selected"
            } @else {
                (selection.len()) " selected"
            }
        }
    })
}

pub async fn post_module_register(
    State(state): State<GradebookState>,
    Path(code): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> GradebookResult<Markup> {
    let query = ListingQuery::from_pairs(pairs);
    let api = state.api();

    let linked = Module::students(&code, api).await?;
    let selection = BulkSelection::with_posted(
        linked.into_iter().map(|s| s.id),
        parse_keys::<i64>(&query.selected),
    );

    let outcome = submit_registrations(
        selection
            .selected()
            .map(|&id| NewRegistration::new(id, code.as_str())),
        api,
    )
    .await;
    state.send_sse_event(SseEvent::CrudRegistration);

    Ok(render_outcome(&outcome))
}
