//! The AI analysis batch engine.
//!
//! Runs as a spawned task per started batch. The database row is the
//! authoritative progress record; the progress hub only mirrors it to
//! SSE observers. Once started, a batch runs to `complete` or
//! `fatal-error`; there is no cancellation, observers can only stop
//! watching.
//!
//! Failure semantics: a per-item AI failure is tallied and processing
//! continues; credential/configuration failures abort the whole batch.

use serde_json::json;

use kontor_core::batch::{BatchStreamEvent, StepPhase};
use kontor_core::event_names;
use kontor_core::types::DbId;
use kontor_db::models::email::{Email, EmailAnalysis};
use kontor_db::repositories::{AiUsageRepo, BatchRepo, EmailRepo};
use kontor_events::OfficeEvent;

use crate::state::AppState;

/// Spawn the engine for a freshly created batch job.
///
/// The caller must have opened the progress hub channel for `job_id`
/// before spawning, so observers never race the first event.
pub fn spawn(state: AppState, job_id: DbId) {
    tokio::spawn(run(state, job_id));
}

async fn run(state: AppState, job_id: DbId) {
    // Claim transitions Pending -> Running atomically; losing the claim
    // means another engine instance owns the job.
    let job = match BatchRepo::claim(&state.pool, job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            tracing::warn!(job_id, "Batch already claimed elsewhere, engine exiting");
            return;
        }
        Err(e) => {
            tracing::error!(job_id, error = %e, "Failed to claim batch");
            return;
        }
    };

    tracing::info!(job_id, total = job.total, "Batch engine started");
    state.event_bus.publish(
        OfficeEvent::new(event_names::BATCH_STARTED)
            .with_source("batch_job", job_id)
            .with_payload(json!({ "total": job.total })),
    );

    let emails = match EmailRepo::list_unanalyzed(&state.pool).await {
        Ok(emails) => emails,
        Err(e) => {
            abort_fatal(&state, job_id, &format!("Failed to load batch queue: {e}")).await;
            return;
        }
    };

    let total = job.total;
    let mut processed: i64 = 0;
    let mut failed: i64 = 0;

    for email in emails {
        state
            .progress_hub
            .publish(
                job_id,
                BatchStreamEvent::Step {
                    email_id: email.id,
                    phase: StepPhase::Thinking,
                    detail: None,
                },
            )
            .await;

        let record = match state.ai.triage(&email.subject, &email.body_text).await {
            Ok(outcome) => {
                record_usage(&state, email.id, &outcome).await;
                match store_analysis(&state, &email, &outcome).await {
                    Ok(updated) => {
                        processed += 1;
                        publish_step(&state, job_id, email.id, StepPhase::Done, None).await;
                        updated
                    }
                    Err(message) => {
                        processed += 1;
                        failed += 1;
                        publish_item_error(&state, job_id, email.id, &message).await;
                        None
                    }
                }
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(job_id, email_id = email.id, error = %e, "Fatal batch error");
                abort_fatal(&state, job_id, &e.to_string()).await;
                return;
            }
            Err(e) => {
                // Per-item failure: tally it and keep going.
                processed += 1;
                failed += 1;
                publish_item_error(&state, job_id, email.id, &e.to_string()).await;
                None
            }
        };

        if let Err(e) = BatchRepo::update_progress(&state.pool, job_id, processed, failed).await {
            tracing::warn!(job_id, error = %e, "Failed to persist batch counters");
        }

        state
            .progress_hub
            .publish(
                job_id,
                BatchStreamEvent::Progress {
                    total,
                    processed,
                    failed,
                    record: record.map(|email| json!(email)),
                },
            )
            .await;
    }

    if let Err(e) = BatchRepo::complete(&state.pool, job_id, processed, failed).await {
        tracing::error!(job_id, error = %e, "Failed to mark batch completed");
    }

    state
        .progress_hub
        .publish(
            job_id,
            BatchStreamEvent::Complete {
                total,
                processed,
                failed,
            },
        )
        .await;
    state.progress_hub.close(job_id).await;

    state.event_bus.publish(
        OfficeEvent::new(event_names::BATCH_COMPLETED)
            .with_source("batch_job", job_id)
            .with_payload(json!({ "total": total, "processed": processed, "failed": failed })),
    );

    tracing::info!(job_id, processed, failed, "Batch engine finished");
}

/// Persist the triage result; returns the updated email for the
/// progress event's record merge.
async fn store_analysis(
    state: &AppState,
    email: &Email,
    outcome: &kontor_ai::TriageOutcome,
) -> Result<Option<Email>, String> {
    let analysis = EmailAnalysis {
        category: outcome.triage.category.clone(),
        summary: outcome.triage.summary.clone(),
        suggested_reply: outcome.triage.suggested_reply.clone(),
    };
    EmailRepo::apply_analysis(&state.pool, email.id, &analysis)
        .await
        .map_err(|e| format!("Failed to store analysis: {e}"))
}

/// Record token usage; accounting failures never fail the item.
async fn record_usage(state: &AppState, email_id: DbId, outcome: &kontor_ai::TriageOutcome) {
    if let Err(e) = AiUsageRepo::record(
        &state.pool,
        state.ai.model(),
        "triage",
        outcome.usage.prompt_tokens,
        outcome.usage.completion_tokens,
        Some(email_id),
    )
    .await
    {
        tracing::warn!(email_id, error = %e, "Failed to record AI usage");
    }
}

async fn publish_step(
    state: &AppState,
    job_id: DbId,
    email_id: DbId,
    phase: StepPhase,
    detail: Option<String>,
) {
    state
        .progress_hub
        .publish(
            job_id,
            BatchStreamEvent::Step {
                email_id,
                phase,
                detail,
            },
        )
        .await;
}

async fn publish_item_error(state: &AppState, job_id: DbId, email_id: DbId, message: &str) {
    tracing::warn!(job_id, email_id, error = %message, "Batch item failed");
    publish_step(
        state,
        job_id,
        email_id,
        StepPhase::Error,
        Some(message.to_string()),
    )
    .await;
    state
        .progress_hub
        .publish(
            job_id,
            BatchStreamEvent::Error {
                email_id,
                message: message.to_string(),
            },
        )
        .await;
}

/// Terminal failure path: persist, notify observers, close the channel.
async fn abort_fatal(state: &AppState, job_id: DbId, message: &str) {
    if let Err(e) = BatchRepo::fail(&state.pool, job_id, message).await {
        tracing::error!(job_id, error = %e, "Failed to mark batch failed");
    }

    state
        .progress_hub
        .publish(
            job_id,
            BatchStreamEvent::FatalError {
                message: message.to_string(),
            },
        )
        .await;
    state.progress_hub.close(job_id).await;

    state.event_bus.publish(
        OfficeEvent::new(event_names::BATCH_FAILED)
            .with_source("batch_job", job_id)
            .with_payload(json!({ "message": message })),
    );
}
