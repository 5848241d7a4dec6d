//! Source-annotated display for `config show`.

use std::fmt::{self, Write as _};

use crate::merge::{ConfigLayer, FieldSources};
use crate::types::Config;

/// A resolved configuration together with where each value came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path to the layer that set it.
    pub field_sources: FieldSources,
    /// Config files that were loaded, in precedence order.
    pub loaded_files: Vec<String>,
}

impl ResolvedConfig {
    /// Which layer set `field` (e.g. `auth.secret`).
    #[must_use]
    pub fn source_of(&self, field: &str) -> Option<&ConfigLayer> {
        self.field_sources.get(field)
    }

    /// Render as TOML, each value annotated with its source layer.
    /// Secrets are redacted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_annotated_toml(&self) -> Result<String, fmt::Error> {
        let body = toml::to_string_pretty(&self.config).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved apidoc configuration\n");
        if self.loaded_files.is_empty() {
            output.push_str("# No config files loaded\n");
        } else {
            output.push_str("# Loaded files (in precedence order):\n");
            for path in &self.loaded_files {
                writeln!(output, "#   {path}")?;
            }
        }
        output.push('\n');

        let mut section = String::new();
        for line in body.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                name.clone_into(&mut section);
            }

            let annotation = trimmed
                .split_once('=')
                .filter(|_| !trimmed.starts_with('#'))
                .and_then(|(key, _)| {
                    let key = key.trim();
                    let path = if section.is_empty() {
                        key.to_owned()
                    } else {
                        format!("{section}.{key}")
                    };
                    self.field_sources.get(&path)
                });

            match annotation {
                Some(layer) => writeln!(output, "{line}  # [{layer}]")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }
}
