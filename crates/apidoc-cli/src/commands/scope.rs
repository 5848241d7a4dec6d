//! Scope command: evaluate grants against a requirement without a server.

use apidoc_capabilities::{GrantSet, PathParams, RouteRequirement};

use crate::theme::Theme;

fn parse_params(bindings: &[String]) -> anyhow::Result<PathParams> {
    bindings
        .iter()
        .map(|binding| {
            binding
                .split_once('=')
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .ok_or_else(|| anyhow::anyhow!("parameter '{binding}' is not name=value"))
        })
        .collect()
}

/// Resolve `require` with `params` and report whether `grants` permit it.
/// Returns an error when the scope is not granted.
pub(crate) fn check(grants: &[String], require: &str, params: &[String]) -> anyhow::Result<()> {
    let grants = GrantSet::try_from_scopes(grants)?;
    let requirement = RouteRequirement::parse(require)?;
    let required = requirement.resolve(&parse_params(params)?)?;

    if grants.permits(&required) {
        println!("{}", Theme::success(&format!("granted: {required}")));
        Ok(())
    } else {
        println!("{}", Theme::error(&format!("denied: {required}")));
        println!("{}", Theme::info("No grant covers the required scope"));
        anyhow::bail!("scope not granted")
    }
}
