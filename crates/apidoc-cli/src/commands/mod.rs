//! Subcommand implementations.

pub(crate) mod config;
pub(crate) mod password;
pub(crate) mod scope;
pub(crate) mod serve;
pub(crate) mod token;

use std::path::Path;

use apidoc_config::Config;

/// Load the layered configuration, honouring an explicit file.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Ok(Config::load(path)?.config)
}
