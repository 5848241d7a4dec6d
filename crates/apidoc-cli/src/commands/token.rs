//! Token command: issue and inspect access tokens offline.

use std::path::Path;

use apidoc_capabilities::{GrantSet, TokenCodec};
use apidoc_gateway::config_bridge;

use super::load_config;
use crate::theme::Theme;

fn codec(config_path: Option<&Path>) -> anyhow::Result<TokenCodec> {
    let config = load_config(config_path)?;
    Ok(TokenCodec::new(config_bridge::token_settings(&config.auth)?))
}

fn describe(grants: &GrantSet) -> String {
    if grants.is_superuser() {
        return "superuser".to_owned();
    }
    let scopes: Vec<String> = grants.capabilities().iter().map(ToString::to_string).collect();
    if scopes.is_empty() {
        "(none)".to_owned()
    } else {
        scopes.join(" ")
    }
}

/// Issue a token for `user` and print it.
pub(crate) fn issue(
    config_path: Option<&Path>,
    user: &str,
    superuser: bool,
    scopes: &[String],
) -> anyhow::Result<()> {
    let grants = if superuser {
        GrantSet::Superuser
    } else {
        GrantSet::try_from_scopes(scopes)?
    };
    let issued = codec(config_path)?.issue(user, grants)?;

    eprintln!("{}", Theme::header("Access token"));
    eprintln!("{}", Theme::kv("Subject", &issued.claims.user));
    eprintln!("{}", Theme::kv("Scope", &describe(&issued.claims.scope)));
    eprintln!("{}", Theme::kv("Expires", &Theme::timestamp(issued.claims.exp)));
    println!("{}", issued.token);
    Ok(())
}

/// Verify `token` against the configured secret and print its claims.
pub(crate) fn inspect(config_path: Option<&Path>, token: &str) -> anyhow::Result<()> {
    match codec(config_path)?.verify(token.trim()) {
        Ok(verified) => {
            println!("{}", Theme::success("Token is valid"));
            println!("{}", Theme::kv("Subject", &verified.subject));
            println!("{}", Theme::kv("Scope", &describe(&verified.grants)));
            println!("{}", Theme::kv("Issued", &Theme::timestamp(verified.issued_at)));
            println!("{}", Theme::kv("Expires", &Theme::timestamp(verified.expires_at)));
            println!("{}", Theme::kv("Nonce", &verified.nonce));
            Ok(())
        },
        Err(failure) => {
            println!("{}", Theme::error(&format!("Token rejected: {failure}")));
            anyhow::bail!("token verification failed")
        },
    }
}
