//! Telemetry - structured logging setup
//!
//! Installs a `tracing-subscriber` registry with an env filter and a console
//! or JSON formatter.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_telemetry};
