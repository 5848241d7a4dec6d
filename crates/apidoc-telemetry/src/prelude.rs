//! Prelude module - commonly used types for convenient import.
//!
//! Use `use apidoc_telemetry::prelude::*;` to import all essential types.

// Errors
pub use crate::{TelemetryError, TelemetryResult};

// Logging configuration
pub use crate::{LogConfig, LogFormat, LogTarget, setup_logging};

// Request context
pub use crate::{RequestContext, RequestGuard};
