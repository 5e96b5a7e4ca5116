use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

pub mod bulk_registration;
pub mod grade_detail;
pub mod grades;
pub mod index;
pub mod insights;
pub mod module_detail;
pub mod modules;
pub mod registrations;
pub mod sse;
pub mod student_detail;
pub mod students;

/// Tells a delete handler whether the button lived on the detail page of the thing being deleted.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct AfterDelete {
    from_detail: bool,
}

impl AfterDelete {
    /// Detail pages go back to their list, since there's nothing left to show. Lists re-fetch
    /// through SSE, so they just get an empty fragment.
    pub fn respond(&self, list_page: &'static str) -> Response {
        if self.from_detail {
            ([("HX-Redirect", list_page)], Html("")).into_response()
        } else {
            Html("").into_response()
        }
    }
}
