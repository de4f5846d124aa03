//! Event emitter: forwards a job's events onto an outbound channel.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::EngineResult;
use crate::event::JobEvent;
use crate::sequencer::JobStream;

/// Label attached to every outbound message.
pub const MESSAGE_LABEL: &str = "message";

/// One message for the transport: a label and a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub event: &'static str,
    pub data: String,
}

impl OutboundMessage {
    pub fn from_event(event: &JobEvent) -> EngineResult<Self> {
        Ok(Self {
            event: MESSAGE_LABEL,
            data: serde_json::to_string(event)?,
        })
    }
}

/// Summary of one forwarding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Messages accepted by the outbound channel.
    pub forwarded: usize,
    /// Terminal event, if one was forwarded.
    pub terminal: Option<JobEvent>,
    /// Consumer went away before the terminal event.
    pub disconnected: bool,
}

/// Forwards job events onto an outbound channel and closes it once.
pub struct EventEmitter {
    tx: mpsc::Sender<OutboundMessage>,
}

impl EventEmitter {
    pub fn new(tx: mpsc::Sender<OutboundMessage>) -> Self {
        Self { tx }
    }

    /// Create an emitter together with the receiving half for the transport.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Forward `events` until the terminal event or until the consumer
    /// disconnects.
    ///
    /// Consumes the emitter, so the channel closes when this returns. The
    /// event stream is dropped on return as well, which cancels any step
    /// still in flight.
    pub async fn forward(self, mut events: JobStream) -> EmitReport {
        let mut report = EmitReport::default();

        loop {
            let next = tokio::select! {
                biased;
                _ = self.tx.closed() => {
                    report.disconnected = true;
                    break;
                }
                next = events.next() => next,
            };

            let Some(event) = next else {
                tracing::warn!(
                    forwarded = report.forwarded,
                    "Event stream ended without a terminal event"
                );
                break;
            };

            let (message, event) = match OutboundMessage::from_event(&event) {
                Ok(message) => (message, event),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        event_type = event.type_name(),
                        "Failed to serialize job event"
                    );
                    let fallback = JobEvent::unexpected(&e);
                    match OutboundMessage::from_event(&fallback) {
                        Ok(message) => (message, fallback),
                        Err(_) => break,
                    }
                }
            };

            if self.tx.send(message).await.is_err() {
                report.disconnected = true;
                break;
            }
            report.forwarded += 1;

            if event.is_terminal() {
                report.terminal = Some(event);
                break;
            }
        }

        if report.disconnected {
            tracing::info!(forwarded = report.forwarded, "Consumer disconnected, abandoning job");
        } else {
            tracing::debug!(
                forwarded = report.forwarded,
                terminal = report.terminal.as_ref().map(JobEvent::type_name),
                "Outbound channel closed"
            );
        }

        report
    }

    /// Run [`EventEmitter::forward`] on its own task.
    pub fn spawn(self, events: JobStream) -> JoinHandle<EmitReport> {
        tokio::spawn(self.forward(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::StepStatus;
    use crate::executor::{SimulatedExecutor, StepExecutor, StepOutcome};
    use crate::scenario::Scenario;
    use crate::sequencer::JobSequencer;
    use crate::step::Step;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn job(scenario: Scenario) -> JobStream {
        let set = scenario.step_set().unwrap();
        JobSequencer::new(SimulatedExecutor::for_step_set(&set)).run(set)
    }

    async fn drain(mut rx: mpsc::Receiver<OutboundMessage>) -> Vec<OutboundMessage> {
        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }
        messages
    }

    #[tokio::test(start_paused = true)]
    async fn test_forwards_every_event_then_closes() {
        let (emitter, rx) = EventEmitter::channel(4);
        let handle = emitter.spawn(job(Scenario::Nominal));

        let messages = drain(rx).await;
        let report = handle.await.unwrap();

        assert_eq!(messages.len(), 9);
        assert!(messages.iter().all(|m| m.event == MESSAGE_LABEL));
        assert_eq!(
            messages[0].data,
            r#"{"type":"step_update","step_id":1,"status":"processing"}"#
        );
        assert_eq!(
            messages[8].data,
            r#"{"type":"process_complete","message":"all steps completed successfully"}"#
        );
        assert_eq!(report.forwarded, 9);
        assert_eq!(report.terminal, Some(JobEvent::complete()));
        assert!(!report.disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_run_closes_after_error() {
        let (emitter, rx) = EventEmitter::channel(16);
        let report = emitter.forward(job(Scenario::CannedFailure)).await;

        let events: Vec<JobEvent> = drain(rx)
            .await
            .iter()
            .map(|m| serde_json::from_str(&m.data).unwrap())
            .collect();

        assert_eq!(events.len(), 5);
        assert_eq!(events[3], JobEvent::step_update(2, StepStatus::Failed));
        assert_eq!(events[4].type_name(), "error");
        assert_eq!(report.terminal, Some(JobEvent::step_failed("Process Data")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_abandons_job() {
        let (emitter, mut rx) = EventEmitter::channel(1);
        let handle = emitter.spawn(job(Scenario::Nominal));

        let first = rx.recv().await.unwrap();
        assert!(first.data.contains("\"processing\""));
        drop(rx);

        let report = tokio::time::timeout(Duration::from_secs(60), handle)
            .await
            .expect("emitter should stop after disconnect")
            .unwrap();

        assert!(report.disconnected);
        assert!(report.terminal.is_none());
        assert!(report.forwarded < 9);
    }

    /// Sleeps for the step duration and counts how many steps started and
    /// how many ran to completion.
    #[derive(Clone, Default)]
    struct CountingExecutor {
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StepExecutor for CountingExecutor {
        async fn execute(&self, step: &Step) -> EngineResult<StepOutcome> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(step.duration).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(StepOutcome::Success)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_cancels_in_flight_step() {
        let executor = CountingExecutor::default();
        let set = Scenario::Nominal.step_set().unwrap();
        let events = JobSequencer::new(executor.clone())
            .with_pacing(Duration::from_millis(100))
            .run(set);

        let (emitter, mut rx) = EventEmitter::channel(1);
        let handle = emitter.spawn(events);

        rx.recv().await.unwrap();
        // Step 1 takes 1s; leave the client connected only part-way through.
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(executor.started.load(Ordering::SeqCst), 1);
        drop(rx);

        let report = handle.await.unwrap();
        assert!(report.disconnected);
        assert_eq!(report.forwarded, 1);

        // Long past the point where every step would have finished.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(executor.started.load(Ordering::SeqCst), 1);
        assert_eq!(executor.finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_closed_channel_before_start() {
        let (emitter, rx) = EventEmitter::channel(1);
        drop(rx);

        let report = emitter.forward(job(Scenario::Nominal)).await;
        assert_eq!(report.forwarded, 0);
        assert!(report.disconnected);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let (emitter, _rx) = EventEmitter::channel(0);
        assert_eq!(emitter.tx.max_capacity(), 1);
    }
}
