//! Config command: show the resolved configuration.

use std::path::Path;

use apidoc_config::Config;

/// Print the resolved configuration annotated with each value's source.
pub(crate) fn show(config_path: Option<&Path>) -> anyhow::Result<()> {
    let resolved = Config::load(config_path)?;
    let rendered = resolved
        .to_annotated_toml()
        .map_err(|_| anyhow::anyhow!("failed to render configuration"))?;
    print!("{rendered}");
    Ok(())
}
