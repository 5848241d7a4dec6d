//! Config file discovery and layered loading.
//!
//! Implements `Config::load()`:
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge `/etc/apidoc/config.toml` (system)
//! 3. Merge `~/.apidoc/config.toml` (user)
//! 4. Merge the explicit `--config` file, if any (it must exist)
//! 5. Apply env var fallbacks for fields no file set
//! 6. Resolve `${VAR}` references
//! 7. Deserialize and validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars, resolve_env_references};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Where to look for config files.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// A file that must exist and takes precedence over system and user files.
    pub explicit: Option<PathBuf>,
    /// Use this directory instead of `~/.apidoc` for the user layer.
    pub home_override: Option<PathBuf>,
    /// Skip `/etc/apidoc/config.toml`.
    pub skip_system: bool,
}

/// Load configuration from files and the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable, malformed or too
/// large, or the merged configuration fails validation.
pub fn load(options: &LoadOptions) -> ConfigResult<ResolvedConfig> {
    load_with_env(options, &collect_env_vars())
}

/// [`load`] with an explicit environment snapshot.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    options: &LoadOptions,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    let mut layers: Vec<(PathBuf, ConfigLayer, bool)> = Vec::new();
    if !options.skip_system {
        layers.push((
            PathBuf::from("/etc/apidoc/config.toml"),
            ConfigLayer::System,
            false,
        ));
    }
    let user_dir = match &options.home_override {
        Some(dir) => dir.clone(),
        None => home_directory()?.join(".apidoc"),
    };
    layers.push((user_dir.join("config.toml"), ConfigLayer::User, false));
    if let Some(path) = &options.explicit {
        layers.push((
            path.clone(),
            ConfigLayer::File(path.display().to_string()),
            true,
        ));
    }

    for (path, layer, required) in layers {
        let overlay = if required {
            Some(read_file(&path)?)
        } else {
            try_load_file(&path)?
        };
        if let Some(overlay) = overlay {
            deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
            loaded_files.push(path.display().to_string());
            info!(path = %path.display(), layer = %layer, "loaded config");
        }
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    resolve_env_references(&mut merged, env_vars);
    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a single file on top of the defaults, without layering or env.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let overlay = read_file(path)?;
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut sources = FieldSources::new();
    deep_merge_tracking(
        &mut merged,
        &overlay,
        "",
        &ConfigLayer::File(path.display().to_string()),
        &mut sources,
    );

    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Read and parse a file, returning `None` if it does not exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    match read_file(path) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::TooLarge {
            path: path.display().to_string(),
            size,
            limit: MAX_CONFIG_FILE_SIZE,
        });
    }

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
