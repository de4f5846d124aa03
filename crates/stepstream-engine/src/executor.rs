//! Step execution.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::step::{Step, StepId, StepSet};

/// Result of running one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    Failure,
}

/// Performs the work for one step.
///
/// An expected negative result is `Ok(StepOutcome::Failure)`. `Err` is
/// reserved for faults the step does not model; the sequencer reports those
/// as unexpected errors.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, step: &Step) -> EngineResult<StepOutcome>;
}

/// Executor that sleeps for the step duration instead of doing work.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    time_scale: f64,
    forced_failures: HashSet<StepId>,
}

impl SimulatedExecutor {
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            forced_failures: HashSet::new(),
        }
    }

    /// Executor that fails exactly the steps the step set flags.
    pub fn for_step_set(step_set: &StepSet) -> Self {
        Self {
            time_scale: 1.0,
            forced_failures: step_set.forced_failures().clone(),
        }
    }

    /// Multiply every simulated duration. Negative or non-finite scales
    /// collapse to zero.
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = if time_scale.is_finite() && time_scale > 0.0 {
            time_scale
        } else {
            0.0
        };
        self
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Scaled duration, saturating at `Duration::MAX` when the product
    /// does not fit.
    fn simulated_duration(&self, step: &Step) -> Duration {
        Duration::try_from_secs_f64(step.duration.as_secs_f64() * self.time_scale)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StepExecutor for SimulatedExecutor {
    async fn execute(&self, step: &Step) -> EngineResult<StepOutcome> {
        let duration = self.simulated_duration(step);
        tracing::debug!(
            step_id = step.id,
            step = %step.name,
            duration_ms = duration.as_millis() as u64,
            "Simulating step work"
        );

        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }

        if self.forced_failures.contains(&step.id) {
            Ok(StepOutcome::Failure)
        } else {
            Ok(StepOutcome::Success)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_executor_sleeps_for_duration() {
        let executor = SimulatedExecutor::new();
        let step = Step::new(1, "Validate Input", Duration::from_secs(2));

        let started = Instant::now();
        let outcome = executor.execute(&step).await.unwrap();

        assert_eq!(outcome, StepOutcome::Success);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_scale_shortens_work() {
        let executor = SimulatedExecutor::new().with_time_scale(0.5);
        let step = Step::new(1, "Process Data", Duration::from_secs(4));

        let started = Instant::now();
        executor.execute(&step).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[test]
    fn test_invalid_time_scale_collapses_to_zero() {
        assert_eq!(SimulatedExecutor::new().with_time_scale(-1.0).time_scale(), 0.0);
        assert_eq!(SimulatedExecutor::new().with_time_scale(f64::NAN).time_scale(), 0.0);
    }

    #[test]
    fn test_huge_time_scale_saturates() {
        let executor = SimulatedExecutor::new().with_time_scale(1e20);
        let step = Step::new(1, "Process Data", Duration::from_secs(3));
        assert_eq!(executor.simulated_duration(&step), Duration::MAX);

        let executor = SimulatedExecutor::new().with_time_scale(f64::MAX);
        assert_eq!(executor.simulated_duration(&step), Duration::MAX);
    }

    #[tokio::test]
    async fn test_forced_failure_from_step_set() {
        let set = Scenario::CannedFailure.step_set().unwrap();
        let executor = SimulatedExecutor::for_step_set(&set).with_time_scale(0.0);

        let first = tokio_test::assert_ok!(executor.execute(&set.steps()[0]).await);
        let second = tokio_test::assert_ok!(executor.execute(&set.steps()[1]).await);
        assert_eq!(first, StepOutcome::Success);
        assert_eq!(second, StepOutcome::Failure);
    }
}
