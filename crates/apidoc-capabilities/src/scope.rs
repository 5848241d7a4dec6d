//! Scope grammar.
//!
//! Scopes are flat, colon-separated capability literals:
//! - `read:apps` - an action on a resource type
//! - `read:app:app1` - one bound parameter
//! - `read:doc:app1:guide` - two bound parameters
//!
//! Resources use `[a-z._-]+`, parameters `[a-zA-Z0-9_-]+`. Nothing else parses.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CapabilityError, CapabilityResult};

/// Maximum number of parameter slots in a capability.
pub const MAX_PARAMS: usize = 2;

/// What a capability allows on its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read access.
    Read,
    /// Write access.
    Write,
}

impl Action {
    /// Keyword used in scope text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            other => Err(malformed(
                other,
                "action must be 'read' or 'write'".to_string(),
            )),
        }
    }
}

/// A structured permission descriptor.
///
/// Always well-formed: the only ways to build one are [`Capability::parse`]
/// and [`Capability::new`], both of which validate every segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    action: Action,
    resource: String,
    params: Vec<String>,
}

impl Capability {
    /// Build a capability from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::MalformedScope`] if the resource or any
    /// parameter is outside its alphabet, or more than [`MAX_PARAMS`]
    /// parameters are given.
    pub fn new<I, P>(action: Action, resource: impl Into<String>, params: I) -> CapabilityResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let resource = resource.into();
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        let capability = Self {
            action,
            resource,
            params,
        };

        if capability.params.len() > MAX_PARAMS {
            return Err(malformed(
                &capability.to_string(),
                format!("at most {MAX_PARAMS} parameters are allowed"),
            ));
        }
        if !is_resource(&capability.resource) {
            return Err(malformed(
                &capability.to_string(),
                format!("resource '{}' must match [a-z._-]+", capability.resource),
            ));
        }
        if let Some(bad) = capability.params.iter().find(|p| !is_param(p)) {
            return Err(malformed(
                &capability.to_string(),
                format!("parameter '{bad}' must match [a-zA-Z0-9_-]+"),
            ));
        }

        Ok(capability)
    }

    /// Parse a scope string.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::MalformedScope`] for wrong arity, disallowed
    /// characters, empty segments or an unknown action keyword.
    pub fn parse(text: &str) -> CapabilityResult<Self> {
        let mut segments = text.split(':');
        // `split` always yields at least one segment.
        let action = segments.next().unwrap_or_default();
        let Some(resource) = segments.next() else {
            return Err(malformed(text, "expected action:resource".to_string()));
        };
        let params: Vec<&str> = segments.collect();
        if params.len() > MAX_PARAMS {
            return Err(malformed(
                text,
                format!("at most {MAX_PARAMS} parameters are allowed"),
            ));
        }

        let action: Action = action
            .parse()
            .map_err(|_| malformed(text, "action must be 'read' or 'write'".to_string()))?;

        Self::new(action, resource, params).map_err(|e| match e {
            CapabilityError::MalformedScope { reason, .. } => malformed(text, reason),
            other => other,
        })
    }

    /// The granted action.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// The resource type name.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Parameter slots in order.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Number of parameter slots.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.action, self.resource)?;
        for param in &self.params {
            write!(f, ":{param}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Capability {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn malformed(scope: &str, reason: String) -> CapabilityError {
    CapabilityError::MalformedScope {
        scope: scope.to_string(),
        reason,
    }
}

fn is_resource(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || matches!(b, b'.' | b'_' | b'-'))
}

pub(crate) fn is_param(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-'))
}
