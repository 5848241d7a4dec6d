//! Capability matching.
//!
//! A grant satisfies a requirement only when action, resource, arity and
//! every parameter value are identical. There is no wildcard and no
//! prefix matching; a broader grant does not imply a narrower one.

use crate::grant::GrantSet;
use crate::scope::Capability;

/// Whether `grant` covers `required`.
#[must_use]
pub fn matches(grant: &Capability, required: &Capability) -> bool {
    grant.action() == required.action()
        && grant.resource() == required.resource()
        && grant.params() == required.params()
}

/// Whether any grant in `grants` covers `required`.
///
/// A superuser grant set satisfies every requirement.
#[must_use]
pub fn satisfies(grants: &GrantSet, required: &Capability) -> bool {
    match grants {
        GrantSet::Superuser => true,
        GrantSet::Capabilities(capabilities) => {
            capabilities.iter().any(|grant| matches(grant, required))
        },
    }
}
