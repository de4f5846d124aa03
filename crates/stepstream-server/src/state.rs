//! Application state for the stepstream server.
//!
//! Holds only read-only configuration. Jobs never share state; each stream
//! builds its own sequencer from these settings.

use std::sync::Arc;

use stepstream_engine::{JobSequencer, SimulatedExecutor, StepSet};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Build a sequencer configured for `step_set`.
    pub fn sequencer_for(&self, step_set: &StepSet) -> JobSequencer<SimulatedExecutor> {
        let executor = SimulatedExecutor::for_step_set(step_set)
            .with_time_scale(self.config.step_time_scale);
        JobSequencer::new(executor).with_pacing(self.config.step_pacing())
    }
}
