//! Layered merging with per-field source tracking.

use std::collections::HashMap;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in `defaults.toml`.
    Defaults,
    /// `/etc/apidoc/config.toml`.
    System,
    /// `~/.apidoc/config.toml`.
    User,
    /// A file named on the command line.
    File(String),
    /// Environment variable fallback.
    Environment,
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::File(path) => write!(f, "file {path}"),
            Self::Environment => write!(f, "env"),
        }
    }
}

/// Dotted field path to the layer that last set it.
pub type FieldSources = HashMap<String, ConfigLayer>;

/// Merge `overlay` into `base`, recording `layer` for every leaf it sets.
///
/// Tables merge per key; scalars and arrays replace.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join(prefix, key);
                match base_table.get_mut(key) {
                    Some(base_val) if base_val.is_table() && overlay_val.is_table() => {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    },
                    Some(base_val) => {
                        *base_val = overlay_val.clone();
                        record_leaves(overlay_val, &path, layer, sources);
                    },
                    None => {
                        base_table.insert(key.clone(), overlay_val.clone());
                        record_leaves(overlay_val, &path, layer, sources);
                    },
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            record_leaves(overlay, prefix, layer, sources);
        },
    }
}

/// Record every leaf under `val` as coming from `layer`.
pub fn record_leaves(val: &toml::Value, prefix: &str, layer: &ConfigLayer, sources: &mut FieldSources) {
    match val {
        toml::Value::Table(table) => {
            for (key, child) in table {
                record_leaves(child, &join(prefix, key), layer, sources);
            }
        },
        _ => {
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}
