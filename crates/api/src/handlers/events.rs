//! The global notification stream: every bus event, pushed to each
//! connected session over SSE.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast;

use kontor_events::OfficeEvent;

use crate::error::AppResult;
use crate::sse::{self, StreamAuthQuery};
use crate::state::AppState;

/// GET /api/v1/events/stream?token=...
///
/// Long-lived per-session feed of [`OfficeEvent`]s (new mail, lock
/// changes, moves, batch lifecycle, maintenance). Clients use it for
/// cross-tab refreshes; every payload is advisory and can be re-fetched
/// from the REST surface.
pub async fn stream_events(
    State(state): State<AppState>,
    Query(query): Query<StreamAuthQuery>,
) -> AppResult<impl IntoResponse> {
    let user = sse::authenticate_stream(&state, &query.token)?;
    tracing::debug!(user_id = user.user_id, "Notification stream opened");

    let receiver = state.event_bus.subscribe();
    let frames = bus_events(receiver).map(|event| {
        Ok::<_, Infallible>(
            Event::default()
                .event(event.event_type.clone())
                .json_data(&event)
                .expect("OfficeEvent is always serialisable"),
        )
    });

    Ok(Sse::new(frames).keep_alive(sse::keep_alive()))
}

/// Adapt the bus subscription into a stream; ends when the bus closes
/// at shutdown. Lagged gaps only cost notifications, which clients
/// recover by re-fetching lists.
fn bus_events(receiver: broadcast::Receiver<OfficeEvent>) -> impl Stream<Item = OfficeEvent> {
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((event, receiver)),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}
