//! Grant sets carried inside access tokens.
//!
//! On the wire a grant set is either the literal string `"superuser"` or an
//! array of scope strings. Decoding is lenient: unparsable entries are
//! dropped and any other shape decodes to no capabilities, so a bad grant
//! can only ever reduce access.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::CapabilityResult;
use crate::scope::Capability;

const SUPERUSER: &str = "superuser";

/// The set of capabilities a principal holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantSet {
    /// Unrestricted access.
    Superuser,
    /// Exactly these capabilities.
    Capabilities(Vec<Capability>),
}

impl GrantSet {
    /// An empty grant set.
    #[must_use]
    pub fn none() -> Self {
        Self::Capabilities(Vec::new())
    }

    /// Build from scope strings, skipping any that do not parse.
    pub fn from_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let capabilities = scopes
            .into_iter()
            .filter_map(|scope| {
                let scope = scope.as_ref();
                match Capability::parse(scope) {
                    Ok(cap) => Some(cap),
                    Err(e) => {
                        debug!(scope, error = %e, "Dropping unparsable grant");
                        None
                    },
                }
            })
            .collect();
        Self::Capabilities(capabilities)
    }

    /// Build from scope strings, failing on the first that does not parse.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CapabilityError::MalformedScope`] for an invalid scope.
    pub fn try_from_scopes<I, S>(scopes: I) -> CapabilityResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let capabilities = scopes
            .into_iter()
            .map(|scope| Capability::parse(scope.as_ref()))
            .collect::<CapabilityResult<Vec<_>>>()?;
        Ok(Self::Capabilities(capabilities))
    }

    /// Decode a grant value leniently.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) if s == SUPERUSER => Self::Superuser,
            Value::Array(items) => Self::from_scopes(items.iter().filter_map(Value::as_str)),
            other => {
                debug!(grant = %other, "Grant is neither superuser nor a scope list");
                Self::none()
            },
        }
    }

    /// Whether this is the superuser grant.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        matches!(self, Self::Superuser)
    }

    /// The explicit capabilities held. Empty for superuser.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        match self {
            Self::Superuser => &[],
            Self::Capabilities(caps) => caps,
        }
    }

    /// Whether this grant set satisfies `required`.
    #[must_use]
    pub fn permits(&self, required: &Capability) -> bool {
        crate::matcher::satisfies(self, required)
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Superuser => Value::String(SUPERUSER.to_string()),
            Self::Capabilities(caps) => {
                Value::Array(caps.iter().map(|c| Value::String(c.to_string())).collect())
            },
        }
    }
}

impl Default for GrantSet {
    fn default() -> Self {
        Self::none()
    }
}

impl Serialize for GrantSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GrantSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}
