//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Shortest accepted HMAC secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

const SUPPORTED_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a merged configuration.
///
/// # Errors
///
/// Returns the first invalid field found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_auth(config)?;
    validate_store(config)?;
    validate_users(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_auth(config: &Config) -> ConfigResult<()> {
    let auth = &config.auth;

    if auth.secret.is_empty() {
        return Err(invalid(
            "auth.secret",
            "no signing secret configured; set auth.secret, APIDOC_AUTH_SECRET or APP_SECRET",
        ));
    }
    if auth.secret.len() < MIN_SECRET_LENGTH {
        return Err(invalid(
            "auth.secret",
            format!("secret must be at least {MIN_SECRET_LENGTH} bytes"),
        ));
    }
    if !SUPPORTED_ALGORITHMS.contains(&auth.algorithm.as_str()) {
        return Err(invalid(
            "auth.algorithm",
            format!(
                "unsupported algorithm '{}'; expected one of: {}",
                auth.algorithm,
                SUPPORTED_ALGORITHMS.join(", ")
            ),
        ));
    }
    if auth.max_age_secs == 0 {
        return Err(invalid("auth.max_age_secs", "max_age_secs must be positive"));
    }
    if !(8..=64).contains(&auth.nonce_length) {
        return Err(invalid(
            "auth.nonce_length",
            "nonce_length must be between 8 and 64",
        ));
    }
    Ok(())
}

fn validate_store(config: &Config) -> ConfigResult<()> {
    let store = &config.store;

    if store.url.trim().is_empty() {
        return Err(invalid("store.url", "store url must not be empty"));
    }
    if store.url.contains("://") {
        return Err(invalid(
            "store.url",
            "store url must not include a scheme; use store.secure for https",
        ));
    }
    if !(1..=300).contains(&store.timeout_secs) {
        return Err(invalid(
            "store.timeout_secs",
            "timeout_secs must be between 1 and 300",
        ));
    }
    Ok(())
}

fn validate_users(config: &Config) -> ConfigResult<()> {
    if !(6..=64).contains(&config.users.registration_code_length) {
        return Err(invalid(
            "users.registration_code_length",
            "registration_code_length must be between 6 and 64",
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    if !LOG_LEVELS.contains(&logging.level.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown level '{}'; expected one of: {}",
                logging.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }
    if !LOG_FORMATS.contains(&logging.format.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: {}",
                logging.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }
    Ok(())
}
