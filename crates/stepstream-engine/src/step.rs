//! Step definitions and ordered step sets.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};
use crate::scenario::Scenario;

/// Identifier of a step within its step set. Also its execution position.
pub type StepId = u32;

/// A named unit of work with a fixed position in the execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: StepId,
    pub name: String,
    /// Simulated execution time.
    pub duration: Duration,
}

impl Step {
    pub fn new(id: StepId, name: impl Into<String>, duration: Duration) -> Self {
        Self {
            id,
            name: name.into(),
            duration,
        }
    }
}

/// Ordered, validated list of steps for one scenario.
///
/// Ids are unique and strictly ascending, so iteration order is execution
/// order. A step set may flag steps whose simulated work always fails.
#[derive(Debug, Clone)]
pub struct StepSet {
    scenario: Scenario,
    steps: Vec<Step>,
    forced_failures: HashSet<StepId>,
}

impl StepSet {
    /// Build a step set, rejecting empty, duplicate or out-of-order ids.
    pub fn new(scenario: Scenario, steps: Vec<Step>) -> EngineResult<Self> {
        if steps.is_empty() {
            return Err(EngineError::InvalidStepSet(
                "a step set needs at least one step".to_string(),
            ));
        }

        for pair in steps.windows(2) {
            if pair[1].id <= pair[0].id {
                return Err(EngineError::InvalidStepSet(format!(
                    "step ids must be unique and ascending, found {} after {}",
                    pair[1].id, pair[0].id
                )));
            }
        }

        Ok(Self {
            scenario,
            steps,
            forced_failures: HashSet::new(),
        })
    }

    /// Mark a step whose simulated work always fails.
    pub fn with_forced_failure(mut self, step_id: StepId) -> EngineResult<Self> {
        if !self.steps.iter().any(|s| s.id == step_id) {
            return Err(EngineError::InvalidStepSet(format!(
                "cannot force failure of unknown step {step_id}"
            )));
        }
        self.forced_failures.insert(step_id);
        Ok(self)
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the step is flagged to fail.
    pub fn is_forced_failure(&self, step_id: StepId) -> bool {
        self.forced_failures.contains(&step_id)
    }

    pub fn forced_failures(&self) -> &HashSet<StepId> {
        &self.forced_failures
    }
}

impl<'a> IntoIterator for &'a StepSet {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
