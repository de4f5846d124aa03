//! Wire-level job events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::step::StepId;

/// Status carried by a `step_update` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A single state change pushed to the consumer.
///
/// Serialized as one JSON object tagged by `type`:
/// `{"type":"step_update","step_id":1,"status":"processing"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    StepUpdate { step_id: StepId, status: StepStatus },
    Error { message: String },
    ProcessComplete { message: String },
}

impl JobEvent {
    pub const COMPLETE_MESSAGE: &'static str = "all steps completed successfully";

    pub fn step_update(step_id: StepId, status: StepStatus) -> Self {
        Self::StepUpdate { step_id, status }
    }

    pub fn step_failed(step_name: &str) -> Self {
        Self::Error {
            message: format!("process failed at step: {step_name}"),
        }
    }

    pub fn unexpected(description: impl fmt::Display) -> Self {
        Self::Error {
            message: format!("unexpected error: {description}"),
        }
    }

    pub fn complete() -> Self {
        Self::ProcessComplete {
            message: Self::COMPLETE_MESSAGE.to_string(),
        }
    }

    /// `error` and `process_complete` end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::ProcessComplete { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::StepUpdate { .. } => "step_update",
            Self::Error { .. } => "error",
            Self::ProcessComplete { .. } => "process_complete",
        }
    }
}
