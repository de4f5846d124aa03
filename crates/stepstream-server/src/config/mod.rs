//! Configuration module for the stepstream server.
//!
//! Configuration is read from environment variables using the `envy`
//! crate for type-safe parsing.

mod app;

pub use app::AppConfig;
