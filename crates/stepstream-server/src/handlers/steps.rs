//! Step definition listing.
//!
//! Lets a client draw its stepper before opening the event stream.

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use stepstream_engine::{Scenario, Step, StepId};

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct StepsParams {
    /// `nominal` (default) or `canned-failure`
    pub scenario: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StepView {
    pub id: StepId,
    pub name: String,
    pub duration_ms: u64,
}

impl From<&Step> for StepView {
    fn from(step: &Step) -> Self {
        Self {
            id: step.id,
            name: step.name.clone(),
            duration_ms: step.duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepsResponse {
    pub scenario: Scenario,
    pub steps: Vec<StepView>,
}

/// `GET /api/steps?scenario=nominal`
pub async fn list_steps(Query(params): Query<StepsParams>) -> AppResult<Json<StepsResponse>> {
    let scenario = match params.scenario.as_deref() {
        None | Some("") => Scenario::Nominal,
        Some(raw) => raw
            .parse::<Scenario>()
            .map_err(|_| AppError::BadRequest(format!("unknown scenario '{raw}'")))?,
    };

    let step_set = scenario.step_set()?;

    Ok(Json(StepsResponse {
        scenario,
        steps: step_set.steps().iter().map(StepView::from).collect(),
    }))
}
