use crate::state::GradebookState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;

/// Sent after a mutation so any open list of that kind re-fetches itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseEvent {
    CrudStudent,
    CrudModule,
    CrudGrade,
    CrudRegistration,
}

impl SseEvent {
    pub const fn name(self) -> &'static str {
        match self {
            Self::CrudStudent => "crud_student",
            Self::CrudModule => "crud_module",
            Self::CrudGrade => "crud_grade",
            Self::CrudRegistration => "crud_registration",
        }
    }
}

pub async fn sse_feed(
    State(state): State<GradebookState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.subscribe_to_sse_feed()).filter_map(|msg| async move {
        match msg {
            Ok(event) => Some(Ok(Event::default().event(event.name()).data(event.name()))),
            Err(e) => {
                warn!(?e, "SSE subscriber fell behind");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
