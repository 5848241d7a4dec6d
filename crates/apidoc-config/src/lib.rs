//! Layered configuration for the apidoc gateway.
//!
//! # Usage
//!
//! ```rust,no_run
//! use apidoc_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("Listening on {}", resolved.config.server.bind_address());
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit file** (`apidoc serve --config FILE`)
//! 2. **User** (`~/.apidoc/config.toml`)
//! 3. **System** (`/etc/apidoc/config.toml`)
//! 4. **Environment variables** (`APIDOC_*`, `APP_SECRET`, `PORT`), fallback only
//! 5. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate depends on no other apidoc crate. The gateway and CLI turn
//! config sections into domain types at startup.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered merging with source tracking.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::LoadOptions;
pub use merge::ConfigLayer;
pub use show::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any file is malformed or the merged
    /// configuration is invalid.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(&LoadOptions {
            explicit: explicit.map(std::path::Path::to_path_buf),
            ..LoadOptions::default()
        })
    }

    /// Load a single file over the defaults, ignoring other layers and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
