//! Observability setup for WebCoach: structured logging and optional
//! OpenTelemetry trace export.

pub mod tracing_setup;
