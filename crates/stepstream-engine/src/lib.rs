//! Stepstream engine
//!
//! Runs an ordered set of steps and turns every state change into a
//! [`JobEvent`] a client can watch live.
//!
//! This crate provides:
//! - Step definitions and validated step sets
//! - The canned `nominal` and `canned-failure` scenarios
//! - A step executor trait with a simulated implementation
//! - The job sequencer, a lazy stream of job events
//! - An emitter that forwards events onto an outbound channel
//!
//! ## Example
//!
//! ```ignore
//! use stepstream_engine::{EventEmitter, JobSequencer, Scenario, SimulatedExecutor};
//!
//! let step_set = Scenario::Nominal.step_set()?;
//! let sequencer = JobSequencer::new(SimulatedExecutor::for_step_set(&step_set));
//! let (emitter, rx) = EventEmitter::channel(16);
//! emitter.spawn(sequencer.run(step_set));
//! // hand `rx` to the transport
//! ```

pub mod emitter;
pub mod error;
pub mod event;
pub mod executor;
pub mod job;
pub mod scenario;
pub mod sequencer;
pub mod step;

pub use emitter::{EmitReport, EventEmitter, OutboundMessage, MESSAGE_LABEL};
pub use error::{EngineError, EngineResult};
pub use event::{JobEvent, StepStatus};
pub use executor::{SimulatedExecutor, StepExecutor, StepOutcome};
pub use job::{JobId, JobPhase, StepRun, StepRunStatus};
pub use scenario::Scenario;
pub use sequencer::{JobSequencer, JobStream, DEFAULT_PACING};
pub use step::{Step, StepId, StepSet};
