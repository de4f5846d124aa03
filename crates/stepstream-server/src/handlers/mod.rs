//! HTTP handlers for the stepstream API.

pub mod health;
pub mod process;
pub mod steps;

pub use health::{api_health, health_check};
pub use process::{run_process, run_process_with_error};
pub use steps::list_steps;
