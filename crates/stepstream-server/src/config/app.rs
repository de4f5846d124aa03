//! Application configuration for the stepstream server.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// Environment variables are prefixed with `STEPSTREAM_`:
/// - `STEPSTREAM_HOST`: Server bind address (default: "0.0.0.0")
/// - `STEPSTREAM_PORT`: Server port (default: 8000)
/// - `STEPSTREAM_CORS_ALLOWED_ORIGINS`: Comma-separated origins (default: "http://localhost:5173")
/// - `STEPSTREAM_STEP_PACING_MS`: Delay between announcing and running a step (default: 500)
/// - `STEPSTREAM_STEP_TIME_SCALE`: Multiplier for simulated step durations (default: 1.0)
/// - `STEPSTREAM_KEEP_ALIVE_SECS`: SSE keep-alive interval (default: 15)
/// - `STEPSTREAM_EVENT_BUFFER`: Outbound channel capacity per job (default: 16)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to open event streams
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Pacing delay before each step's work, in milliseconds
    #[serde(default = "default_step_pacing_ms")]
    pub step_pacing_ms: u64,

    /// Simulated duration multiplier, 0 runs steps instantly
    #[serde(default = "default_step_time_scale")]
    pub step_time_scale: f64,

    /// SSE keep-alive interval in seconds
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Outbound event buffer per job
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_step_pacing_ms() -> u64 {
    500
}

fn default_step_time_scale() -> f64 {
    1.0
}

fn default_keep_alive_secs() -> u64 {
    15
}

fn default_event_buffer() -> usize {
    16
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `STEPSTREAM_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("STEPSTREAM_").from_env::<AppConfig>()
    }

    /// Get the server bind address as a string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn step_pacing(&self) -> Duration {
        Duration::from_millis(self.step_pacing_ms)
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.max(1))
    }

    pub fn event_buffer(&self) -> usize {
        self.event_buffer.max(1)
    }

    /// Configuration that runs jobs without any simulated delay.
    pub fn instant() -> Self {
        Self {
            step_pacing_ms: 0,
            step_time_scale: 0.0,
            ..Self::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: default_cors_allowed_origins(),
            step_pacing_ms: default_step_pacing_ms(),
            step_time_scale: default_step_time_scale(),
            keep_alive_secs: default_keep_alive_secs(),
            event_buffer: default_event_buffer(),
        }
    }
}
