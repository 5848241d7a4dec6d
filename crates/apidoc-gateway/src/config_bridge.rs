//! Bridge from `apidoc_config::Config` sections to runtime types.
//!
//! Configuration stays plain data; everything here runs once at startup and
//! produces the immutable values shared by request handlers.

use std::time::Duration;

use apidoc_capabilities::{Authorizer, TokenCodec, TokenSettings};
use apidoc_config::{AuthSection, LoggingSection, StoreSection};
use apidoc_crypto::{SigningAlgorithm, SigningKey};
use apidoc_store::ElasticsearchConfig;
use apidoc_telemetry::{LogConfig, LogFormat};

use crate::error::{GatewayError, GatewayResult};

/// Build token settings from the `[auth]` section.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the algorithm is unknown or the secret is
/// not a usable key.
pub fn token_settings(auth: &AuthSection) -> GatewayResult<TokenSettings> {
    let algorithm: SigningAlgorithm = auth.algorithm.parse()?;
    let key = SigningKey::from_secret(auth.secret.as_bytes())?;

    Ok(
        TokenSettings::new(key, algorithm, Duration::from_secs(auth.max_age_secs))
            .with_nonce_length(auth.nonce_length)
            .with_clock_tolerance(Duration::from_secs(auth.clock_tolerance_secs)),
    )
}

/// Build the request authorizer from the `[auth]` section.
///
/// # Errors
///
/// Same as [`token_settings`].
pub fn authorizer(auth: &AuthSection) -> GatewayResult<Authorizer> {
    Ok(Authorizer::new(TokenCodec::new(token_settings(auth)?)))
}

/// Connection settings for the document store.
#[must_use]
pub fn elasticsearch_config(store: &StoreSection) -> ElasticsearchConfig {
    ElasticsearchConfig {
        url: store.url.clone(),
        secure: store.secure,
        key: store.key.clone(),
        secret: store.secret.clone(),
        timeout: Duration::from_secs(store.timeout_secs),
    }
}

/// Logging setup from the `[logging]` section.
///
/// # Errors
///
/// Returns [`GatewayError::Config`] for an unknown log format.
pub fn log_config(logging: &LoggingSection) -> GatewayResult<LogConfig> {
    let format: LogFormat = logging
        .format
        .parse()
        .map_err(|e: apidoc_telemetry::TelemetryError| GatewayError::Config(e.to_string()))?;

    Ok(logging
        .directives
        .iter()
        .fold(LogConfig::new(&logging.level).with_format(format), |config, directive| {
            config.with_directive(directive)
        }))
}
