//! Configuration struct definitions.
//!
//! Every section implements `Default` with the same values as the embedded
//! `defaults.toml`, so a partial file deserializes cleanly.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

const REDACTED: &str = "***";

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener.
    pub server: ServerSection,
    /// Browser client settings (CORS).
    pub client: ClientSection,
    /// Access token policy.
    pub auth: AuthSection,
    /// Document store connection.
    pub store: StoreSection,
    /// User registration.
    pub users: UsersSection,
    /// Logging.
    pub logging: LoggingSection,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

impl ServerSection {
    /// `host:port` for binding.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Browser client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    /// Allowed CORS origin, or `*` for any.
    pub origin: String,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            origin: "*".to_owned(),
        }
    }
}

/// Access token policy.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// HMAC secret. Never printed or serialized.
    pub secret: String,
    /// Signing algorithm (`HS256`, `HS384` or `HS512`).
    pub algorithm: String,
    /// Token lifetime in seconds.
    pub max_age_secs: u64,
    /// Length of the per-token nonce.
    pub nonce_length: usize,
    /// Allowed clock skew in seconds.
    pub clock_tolerance_secs: u64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: "HS512".to_owned(),
            max_age_secs: 43_200,
            nonce_length: 10,
            clock_tolerance_secs: 0,
        }
    }
}

impl std::fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSection")
            .field("has_secret", &!self.secret.is_empty())
            .field("algorithm", &self.algorithm)
            .field("max_age_secs", &self.max_age_secs)
            .field("nonce_length", &self.nonce_length)
            .field("clock_tolerance_secs", &self.clock_tolerance_secs)
            .finish()
    }
}

impl Serialize for AuthSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AuthSection", 5)?;
        state.serialize_field("secret", REDACTED)?;
        state.serialize_field("algorithm", &self.algorithm)?;
        state.serialize_field("max_age_secs", &self.max_age_secs)?;
        state.serialize_field("nonce_length", &self.nonce_length)?;
        state.serialize_field("clock_tolerance_secs", &self.clock_tolerance_secs)?;
        state.end()
    }
}

/// Document store connection.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// `host[:port][/path]` of the Elasticsearch endpoint, without scheme.
    pub url: String,
    /// Use `https`.
    pub secure: bool,
    /// Basic-auth user.
    pub key: Option<String>,
    /// Basic-auth password.
    pub secret: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: "localhost:9200".to_owned(),
            secure: false,
            key: None,
            secret: None,
            timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for StoreSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSection")
            .field("url", &self.url)
            .field("secure", &self.secure)
            .field("has_key", &self.key.is_some())
            .field("has_secret", &self.secret.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Serialize for StoreSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StoreSection", 5)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("secure", &self.secure)?;
        state.serialize_field("key", &self.key.as_ref().map(|_| REDACTED))?;
        state.serialize_field("secret", &self.secret.as_ref().map(|_| REDACTED))?;
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.end()
    }
}

/// User registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersSection {
    /// Length of generated registration codes.
    pub registration_code_length: usize,
}

impl Default for UsersSection {
    fn default() -> Self {
        Self {
            registration_code_length: 21,
        }
    }
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Base level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Output format (`pretty`, `compact`, `json`, `full`).
    pub format: String,
    /// Per-target overrides such as `apidoc_store=debug`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
