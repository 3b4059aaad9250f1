//! Handlers for the `/emails/analysis` family: start an AI batch,
//! poll its status, and observe it over SSE.
//!
//! The stream opens with a counter snapshot (`start` for a job that
//! has not progressed yet, `reconnect` otherwise) so observers always
//! REPLACE their counters instead of accumulating deltas across
//! resubscriptions.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::Sse;
use axum::response::IntoResponse;
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast;

use kontor_core::batch::{BatchProgress, BatchStreamEvent};
use kontor_db::models::batch::BatchJob;
use kontor_db::models::status::BatchStatus;
use kontor_db::repositories::{BatchRepo, EmailRepo};

use crate::background;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::sse::{self, StreamAuthQuery};
use crate::state::AppState;

/// Descriptor for "nothing has ever run".
const IDLE: BatchProgress = BatchProgress {
    total: 0,
    processed: 0,
    failed: 0,
    is_processing: false,
};

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

/// POST /api/v1/emails/analysis
///
/// Start a batch over all unanalyzed emails and return its descriptor
/// immediately (202). Idempotent: when a batch is already active its
/// descriptor is returned (200) and no second job is started. With an
/// empty queue no job is created at all.
pub async fn start_analysis(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    if let Some(active) = BatchRepo::find_active(&state.pool).await? {
        tracing::info!(job_id = active.id, "Batch already active, returning descriptor");
        return Ok((StatusCode::OK, Json(DataResponse { data: active.progress() })));
    }

    let queued = EmailRepo::count_unanalyzed(&state.pool).await?;
    if queued == 0 {
        return Ok((StatusCode::OK, Json(DataResponse { data: IDLE })));
    }

    let job = BatchRepo::create(&state.pool, queued).await?;
    // Open the hub channel before the engine runs so observers never
    // race the first event.
    state.progress_hub.open(job.id).await;
    background::batch::spawn(state.clone(), job.id);

    tracing::info!(job_id = job.id, total = queued, by = auth.user_id, "Batch started");
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: job.progress() })))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/v1/emails/analysis/status
///
/// Lightweight descriptor poll: the active batch if one is running,
/// otherwise the most recent batch, otherwise an idle descriptor. This
/// is the endpoint observers fall back to when the stream cannot be
/// reestablished.
pub async fn analysis_status(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let descriptor = match BatchRepo::find_active(&state.pool).await? {
        Some(job) => job.progress(),
        None => BatchRepo::find_latest(&state.pool)
            .await?
            .map(|job| job.progress())
            .unwrap_or(IDLE),
    };
    Ok(Json(DataResponse { data: descriptor }))
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

/// GET /api/v1/emails/analysis/stream?token=...
///
/// SSE feed of batch events. For a running job: a `start`/`reconnect`
/// snapshot followed by live events until the terminal event closes the
/// channel. For a finished (or never-run) job: a single terminal
/// snapshot so late subscribers still converge.
pub async fn stream_analysis(
    State(state): State<AppState>,
    Query(query): Query<StreamAuthQuery>,
) -> AppResult<impl IntoResponse> {
    let _user = sse::authenticate_stream(&state, &query.token)?;

    let stream: stream::BoxStream<'static, BatchStreamEvent> =
        match BatchRepo::find_active(&state.pool).await? {
            Some(job) => {
                // Subscribe first, snapshot second: events arriving in
                // between are buffered, and counters are replaced, not
                // added, so an older buffered event cannot corrupt state.
                let receiver = state.progress_hub.subscribe(job.id).await;
                let job = BatchRepo::find_by_id(&state.pool, job.id).await?.unwrap_or(job);

                match receiver {
                    Some(receiver) => stream::once(async move { snapshot_event(&job) })
                        .chain(live_events(receiver))
                        .boxed(),
                    // The job finished between the two queries; serve
                    // its terminal snapshot.
                    None => stream::once(async move { terminal_event(&job) }).boxed(),
                }
            }
            None => {
                let latest = BatchRepo::find_latest(&state.pool).await?;
                stream::once(async move {
                    match latest {
                        Some(job) => terminal_event(&job),
                        None => BatchStreamEvent::Start {
                            total: 0,
                            processed: 0,
                            failed: 0,
                        },
                    }
                })
                .boxed()
            }
        };

    let frames = stream.map(|event| Ok::<_, Infallible>(sse::batch_event(&event)));
    Ok(Sse::new(frames).keep_alive(sse::keep_alive()))
}

/// Counter snapshot for a running job: `start` before any progress,
/// `reconnect` after.
fn snapshot_event(job: &BatchJob) -> BatchStreamEvent {
    if job.processed == 0 {
        BatchStreamEvent::Start {
            total: job.total,
            processed: job.processed,
            failed: job.failed,
        }
    } else {
        BatchStreamEvent::Reconnect {
            total: job.total,
            processed: job.processed,
            failed: job.failed,
        }
    }
}

/// Terminal snapshot for a finished job.
fn terminal_event(job: &BatchJob) -> BatchStreamEvent {
    if job.status_id == BatchStatus::Failed.id() {
        BatchStreamEvent::FatalError {
            message: job
                .error_message
                .clone()
                .unwrap_or_else(|| "Batch aborted".into()),
        }
    } else {
        BatchStreamEvent::Complete {
            total: job.total,
            processed: job.processed,
            failed: job.failed,
        }
    }
}

/// Adapt a broadcast receiver into a stream that ends when the hub
/// closes the channel. Lagged gaps are skipped: the next event carries
/// full counters, so nothing is lost but intermediate activity lines.
fn live_events(
    receiver: broadcast::Receiver<BatchStreamEvent>,
) -> impl Stream<Item = BatchStreamEvent> {
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((event, receiver)),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "SSE subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}
