//! Observability setup for threadbot: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
