//! Engine error types.

use thiserror::Error;

use crate::step::StepId;

/// Errors raised inside the engine.
///
/// A step that finishes with a negative outcome is not an error; it is
/// reported as [`crate::StepOutcome::Failure`]. These variants cover faults
/// the sequencer converts into a terminal `error` event.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Step set definition is invalid.
    #[error("invalid step set: {0}")]
    InvalidStepSet(String),

    /// A step run was asked to make a transition its state machine forbids.
    #[error("step {step_id} cannot move from {from} to {to}")]
    InvalidTransition {
        step_id: StepId,
        from: &'static str,
        to: &'static str,
    },

    /// Step work raised a fault that is not a modeled failure.
    #[error("step {step_id} execution fault: {message}")]
    Execution { step_id: StepId, message: String },

    /// Step work panicked.
    #[error("step {step_id} panicked: {message}")]
    Panicked { step_id: StepId, message: String },

    /// Event could not be serialized for the outbound channel.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Build an execution fault for a step.
    pub fn execution(step_id: StepId, message: impl Into<String>) -> Self {
        EngineError::Execution {
            step_id,
            message: message.into(),
        }
    }
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
