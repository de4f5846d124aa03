//! Job sequencer.
//!
//! Drives a step set through a [`StepExecutor`] and yields one [`JobEvent`]
//! per state change. The returned stream is lazy: nothing runs until it is
//! polled, and dropping it abandons the job at its current suspension point.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{FutureExt, Stream};

use crate::error::EngineError;
use crate::event::JobEvent;
use crate::executor::{StepExecutor, StepOutcome};
use crate::job::{JobId, JobPhase, StepRun};
use crate::scenario::Scenario;
use crate::step::{Step, StepSet};

/// Delay between announcing a step and starting its work.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Finite, non-restartable sequence of events for one job.
pub type JobStream = Pin<Box<dyn Stream<Item = JobEvent> + Send>>;

/// Runs step sets one step at a time.
pub struct JobSequencer<E> {
    executor: Arc<E>,
    pacing: Duration,
}

impl<E> Clone for JobSequencer<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            pacing: self.pacing,
        }
    }
}

impl<E: StepExecutor + 'static> JobSequencer<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor: Arc::new(executor),
            pacing: DEFAULT_PACING,
        }
    }

    /// Override the pacing delay. Zero skips the suspension entirely.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Start a job over `step_set`.
    ///
    /// Per step the stream yields `processing` then `completed` or `failed`.
    /// The last item is always terminal: `process_complete` when every step
    /// succeeded, otherwise a single `error`.
    pub fn run(&self, step_set: StepSet) -> JobStream {
        self.run_job(JobId::new(), step_set)
    }

    /// Like [`JobSequencer::run`], logging under a caller-chosen job id.
    pub fn run_job(&self, job_id: JobId, step_set: StepSet) -> JobStream {
        let executor = Arc::clone(&self.executor);
        let pacing = self.pacing;
        let mut job = JobTracker::new(job_id, step_set.scenario());

        Box::pin(async_stream::stream! {
            job.transition(JobPhase::Running);

            for step in step_set.steps() {
                let mut run = StepRun::new(step.id);

                match run.start() {
                    Ok(status) => yield JobEvent::step_update(step.id, status),
                    Err(e) => {
                        yield job.fault(e);
                        return;
                    }
                }

                if !pacing.is_zero() {
                    tokio::time::sleep(pacing).await;
                }

                let outcome = match execute_guarded(executor.as_ref(), step).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        yield job.fault(e);
                        return;
                    }
                };

                match outcome {
                    StepOutcome::Success => match run.complete() {
                        Ok(status) => {
                            tracing::debug!(job_id = %job.id, step_id = step.id, "Step completed");
                            yield JobEvent::step_update(step.id, status);
                        }
                        Err(e) => {
                            yield job.fault(e);
                            return;
                        }
                    },
                    StepOutcome::Failure => match run.fail() {
                        Ok(status) => {
                            tracing::warn!(
                                job_id = %job.id,
                                step_id = step.id,
                                step = %step.name,
                                "Step failed, halting job"
                            );
                            yield JobEvent::step_update(step.id, status);
                            job.transition(JobPhase::Failed);
                            yield JobEvent::step_failed(&step.name);
                            return;
                        }
                        Err(e) => {
                            yield job.fault(e);
                            return;
                        }
                    },
                }
            }

            job.transition(JobPhase::Succeeded);
            yield JobEvent::complete();
        })
    }
}

/// Run the executor, turning a panic into an execution fault.
async fn execute_guarded<E: StepExecutor + ?Sized>(
    executor: &E,
    step: &Step,
) -> Result<StepOutcome, EngineError> {
    match AssertUnwindSafe(executor.execute(step)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(EngineError::Panicked {
            step_id: step.id,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Phase bookkeeping and logging for one job.
struct JobTracker {
    id: JobId,
    scenario: Scenario,
    phase: JobPhase,
}

impl JobTracker {
    fn new(id: JobId, scenario: Scenario) -> Self {
        Self {
            id,
            scenario,
            phase: JobPhase::Idle,
        }
    }

    fn transition(&mut self, next: JobPhase) {
        debug_assert!(!self.phase.is_terminal(), "job already finished");
        self.phase = next;
        if next.is_terminal() {
            tracing::info!(
                job_id = %self.id,
                scenario = %self.scenario,
                phase = %next,
                "Job finished"
            );
        } else {
            tracing::info!(
                job_id = %self.id,
                scenario = %self.scenario,
                phase = %next,
                "Job started"
            );
        }
    }

    fn fault(&mut self, error: EngineError) -> JobEvent {
        tracing::error!(job_id = %self.id, error = %error, "Unexpected fault while driving job");
        self.transition(JobPhase::Errored);
        JobEvent::unexpected(error)
    }
}
