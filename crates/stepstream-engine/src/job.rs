//! Per-job runtime state: job phase and step runs.
//!
//! Nothing here outlives the stream that owns it.

use std::fmt;

use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::event::StepStatus;
use crate::step::StepId;

/// Log correlation id for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// High-level job phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Sequence created but not polled yet.
    Idle,
    /// Steps are being driven.
    Running,
    /// Every step completed.
    Succeeded,
    /// A step reported failure.
    Failed,
    /// An unexpected fault ended the job.
    Errored,
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Errored)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

/// Status of one step run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRunStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl StepRunStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for StepRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime status record for one step within one job.
///
/// Transitions: pending -> processing -> (completed | failed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRun {
    step_id: StepId,
    status: StepRunStatus,
}

impl StepRun {
    pub fn new(step_id: StepId) -> Self {
        Self {
            step_id,
            status: StepRunStatus::Pending,
        }
    }

    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    pub fn status(&self) -> StepRunStatus {
        self.status
    }

    /// Move to processing. Returns the status to publish.
    pub fn start(&mut self) -> EngineResult<StepStatus> {
        self.transition(StepRunStatus::Pending, StepRunStatus::Processing)?;
        Ok(StepStatus::Processing)
    }

    pub fn complete(&mut self) -> EngineResult<StepStatus> {
        self.transition(StepRunStatus::Processing, StepRunStatus::Completed)?;
        Ok(StepStatus::Completed)
    }

    pub fn fail(&mut self) -> EngineResult<StepStatus> {
        self.transition(StepRunStatus::Processing, StepRunStatus::Failed)?;
        Ok(StepStatus::Failed)
    }

    fn transition(&mut self, expected: StepRunStatus, next: StepRunStatus) -> EngineResult<()> {
        if self.status != expected {
            return Err(EngineError::InvalidTransition {
                step_id: self.step_id,
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_run_success_path() {
        let mut run = StepRun::new(1);
        assert_eq!(run.status(), StepRunStatus::Pending);
        assert_eq!(run.start().unwrap(), StepStatus::Processing);
        assert_eq!(run.complete().unwrap(), StepStatus::Completed);
        assert_eq!(run.status(), StepRunStatus::Completed);
    }

    #[test]
    fn test_step_run_failure_path() {
        let mut run = StepRun::new(2);
        run.start().unwrap();
        assert_eq!(run.fail().unwrap(), StepStatus::Failed);
        assert_eq!(run.status(), StepRunStatus::Failed);
    }

    #[test]
    fn test_step_run_rejects_skipping_processing() {
        let mut run = StepRun::new(3);
        let err = run.complete().unwrap_err();
        assert_eq!(err.to_string(), "step 3 cannot move from pending to completed");
        assert_eq!(run.status(), StepRunStatus::Pending);
    }

    #[test]
    fn test_step_run_cannot_restart() {
        let mut run = StepRun::new(4);
        run.start().unwrap();
        run.complete().unwrap();
        assert!(run.start().is_err());
        assert!(run.fail().is_err());
    }

    #[test]
    fn test_job_phase_terminal() {
        assert!(!JobPhase::Idle.is_terminal());
        assert!(!JobPhase::Running.is_terminal());
        assert!(JobPhase::Succeeded.is_terminal());
        assert!(JobPhase::Failed.is_terminal());
        assert!(JobPhase::Errored.is_terminal());
        assert_eq!(JobPhase::Errored.to_string(), "errored");
    }

    #[test]
    fn test_job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }
}
