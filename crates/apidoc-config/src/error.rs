use std::io;
use thiserror::Error;

/// Errors raised while loading or validating gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// Path of the unreadable file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A config file (or the merged tree) is not valid TOML for [`crate::Config`].
    #[error("Failed to parse config at {path}: {source}")]
    ParseError {
        /// Path of the file, or `<merged config>`.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A config file exceeds the size limit.
    #[error("Config file at {path} is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge {
        /// Path of the file.
        path: String,
        /// Its size in bytes.
        size: u64,
        /// The limit in bytes.
        limit: u64,
    },

    /// A field holds a value the gateway cannot run with.
    #[error("Invalid value for '{field}': {message}")]
    ValidationError {
        /// Dotted path of the field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// No home directory to look for the user config in.
    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
