//! Apidoc Telemetry - Logging and request tracing for the documentation gateway.
//!
//! This crate provides:
//! - Configurable logging setup (pretty, compact, JSON or full output)
//! - Stdout, stderr or daily-rotated file targets
//! - A per-request context carrying a correlation id and a tracing span
//!
//! # Example
//!
//! ```rust,no_run
//! use apidoc_telemetry::{LogConfig, LogFormat, RequestContext, setup_logging};
//!
//! # fn main() -> Result<(), apidoc_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("apidoc_gateway=debug");
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new("GET", "/apps");
//! let span = ctx.span();
//! let _entered = span.enter();
//! tracing::info!("Handling request");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::{RequestContext, RequestGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
