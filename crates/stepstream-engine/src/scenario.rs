//! Fixed demonstration scenarios.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::step::{Step, StepSet};

/// Which canned step set a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Four steps, every one succeeds.
    Nominal,
    /// Two steps, the second always fails.
    CannedFailure,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Nominal, Scenario::CannedFailure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::CannedFailure => "canned-failure",
        }
    }

    /// Build the step set for this scenario.
    pub fn step_set(&self) -> EngineResult<StepSet> {
        match self {
            Self::Nominal => StepSet::new(
                *self,
                vec![
                    Step::new(1, "Validate Input", Duration::from_secs(1)),
                    Step::new(2, "Process Data", Duration::from_secs(3)),
                    Step::new(3, "Save to Database", Duration::from_secs(2)),
                    Step::new(4, "Send Notification", Duration::from_secs(1)),
                ],
            ),
            Self::CannedFailure => StepSet::new(
                *self,
                vec![
                    Step::new(1, "Validate Input", Duration::from_secs(1)),
                    Step::new(2, "Process Data", Duration::from_secs(1)),
                ],
            )?
            .with_forced_failure(2),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nominal" => Ok(Self::Nominal),
            "canned-failure" | "canned_failure" | "failure" => Ok(Self::CannedFailure),
            other => Err(EngineError::InvalidStepSet(format!(
                "unknown scenario '{other}'"
            ))),
        }
    }
}
