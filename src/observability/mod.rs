//! Observability: structured logging and triage metrics

pub mod logging;
pub mod metrics;

pub use logging::{init_default_logging, init_logging, parse_level, LogFormat};
pub use metrics::{metrics, MetricsSnapshot, TriageMetrics};

// Span macros for structured logging
pub use logging::{apply_span, triage_span};
