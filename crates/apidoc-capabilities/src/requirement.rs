//! Route requirements.
//!
//! A requirement looks like a scope, except that its parameter slots are
//! placeholder names (`read:doc:appId:docId`) bound to request path
//! parameters at check time.

use std::collections::HashMap;

use crate::error::{CapabilityError, CapabilityResult};
use crate::scope::{Capability, is_param};

/// Path parameters captured by the router, keyed by placeholder name.
pub type PathParams = HashMap<String, String>;

/// The capability a route demands, with unresolved parameter slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteRequirement {
    template: Capability,
}

impl RouteRequirement {
    /// Parse a requirement template.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::MalformedScope`] if the template does not
    /// follow the scope grammar.
    pub fn parse(text: &str) -> CapabilityResult<Self> {
        Ok(Self {
            template: Capability::parse(text)?,
        })
    }

    /// Placeholder names in slot order.
    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        self.template.params()
    }

    /// The template itself, with placeholder names in the parameter slots.
    #[must_use]
    pub fn as_capability(&self) -> &Capability {
        &self.template
    }

    /// Substitute each placeholder with the same-named path parameter.
    ///
    /// # Errors
    ///
    /// - [`CapabilityError::UnresolvedParameter`] if a placeholder has no
    ///   matching path parameter.
    /// - [`CapabilityError::InvalidParameterValue`] if the bound value is
    ///   outside the parameter alphabet.
    pub fn resolve(&self, params: &PathParams) -> CapabilityResult<Capability> {
        let mut values = Vec::with_capacity(self.placeholders().len());
        for placeholder in self.placeholders() {
            let value = params
                .get(placeholder)
                .ok_or_else(|| CapabilityError::UnresolvedParameter {
                    placeholder: placeholder.clone(),
                    requirement: self.to_string(),
                })?;
            if !is_param(value) {
                return Err(CapabilityError::InvalidParameterValue {
                    placeholder: placeholder.clone(),
                });
            }
            values.push(value.clone());
        }

        Capability::new(
            self.template.action(),
            self.template.resource(),
            values,
        )
    }

    /// Check that every placeholder is captured by `path_template`.
    ///
    /// Templates use `{name}` or `{*name}` captures, so a mismatch surfaces
    /// when the router is built rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::UnresolvedParameter`] for the first
    /// placeholder the path does not capture.
    pub fn check_route(&self, path_template: &str) -> CapabilityResult<()> {
        let captured: Vec<&str> = path_template
            .split('/')
            .filter_map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .map(|name| name.trim_start_matches('*'))
            })
            .collect();

        match self
            .placeholders()
            .iter()
            .find(|p| !captured.contains(&p.as_str()))
        {
            Some(missing) => Err(CapabilityError::UnresolvedParameter {
                placeholder: missing.clone(),
                requirement: self.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for RouteRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.template.fmt(f)
    }
}

impl std::str::FromStr for RouteRequirement {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
