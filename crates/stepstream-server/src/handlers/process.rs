//! Server-Sent Events endpoints that run a job and stream its progress.
//!
//! Each request starts one job. The job runs on its own task and pushes
//! events through an [`EventEmitter`]; the response body reads the other end
//! of that channel. When the client goes away the body is dropped, the
//! channel closes and the job is abandoned.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::Instrument;

use stepstream_engine::{EventEmitter, JobId, OutboundMessage, Scenario};

use crate::error::AppResult;
use crate::state::AppState;

/// Nominal run.
///
/// GET /api/process
pub async fn run_process(State(state): State<AppState>) -> AppResult<Response> {
    stream_scenario(&state, Scenario::Nominal)
}

/// Canned-failure run: step 1 succeeds, step 2 fails.
///
/// GET /api/process-with-error
pub async fn run_process_with_error(State(state): State<AppState>) -> AppResult<Response> {
    stream_scenario(&state, Scenario::CannedFailure)
}

fn stream_scenario(state: &AppState, scenario: Scenario) -> AppResult<Response> {
    let step_set = scenario.step_set()?;
    let sequencer = state.sequencer_for(&step_set);
    let (emitter, rx) = EventEmitter::channel(state.config.event_buffer());

    let job_id = JobId::new();
    let span = tracing::info_span!("job_stream", %job_id, %scenario);

    tokio::spawn(
        async move {
            tracing::info!(steps = step_set.len(), "SSE job stream opened");
            let report = emitter.forward(sequencer.run_job(job_id, step_set)).await;
            tracing::info!(
                forwarded = report.forwarded,
                disconnected = report.disconnected,
                "SSE job stream closed"
            );
        }
        .instrument(span),
    );

    let events = ReceiverStream::new(rx).map(|message| Ok::<_, Infallible>(to_sse_event(message)));

    Ok(Sse::new(events)
        .keep_alive(KeepAlive::new().interval(state.config.keep_alive_interval()))
        .into_response())
}

fn to_sse_event(message: OutboundMessage) -> Event {
    Event::default().event(message.event).data(message.data)
}
