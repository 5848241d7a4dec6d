//! Environment variable fallbacks and `${VAR}` reference resolution.
//!
//! Environment variables are a fallback, not an override: they only fill
//! fields that no config file set. Values coming from the embedded defaults
//! still yield to the environment.

use std::collections::HashMap;
use std::fmt::Write as _;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// Supported variables, in precedence order. When two map to the same
/// field, the first one present wins.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "APIDOC_AUTH_SECRET",
        field_path: "auth.secret",
    },
    EnvMapping {
        var_name: "APP_SECRET",
        field_path: "auth.secret",
    },
    EnvMapping {
        var_name: "APIDOC_AUTH_ALGORITHM",
        field_path: "auth.algorithm",
    },
    EnvMapping {
        var_name: "APIDOC_AUTH_MAX_AGE_SECS",
        field_path: "auth.max_age_secs",
    },
    EnvMapping {
        var_name: "APIDOC_HOST",
        field_path: "server.host",
    },
    EnvMapping {
        var_name: "APIDOC_PORT",
        field_path: "server.port",
    },
    EnvMapping {
        var_name: "PORT",
        field_path: "server.port",
    },
    EnvMapping {
        var_name: "APIDOC_CLIENT_ORIGIN",
        field_path: "client.origin",
    },
    EnvMapping {
        var_name: "APIDOC_STORE_URL",
        field_path: "store.url",
    },
    EnvMapping {
        var_name: "APIDOC_STORE_SECURE",
        field_path: "store.secure",
    },
    EnvMapping {
        var_name: "APIDOC_STORE_KEY",
        field_path: "store.key",
    },
    EnvMapping {
        var_name: "APIDOC_STORE_SECRET",
        field_path: "store.secret",
    },
    EnvMapping {
        var_name: "APIDOC_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "APIDOC_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Apply environment fallbacks to fields not set by any config file.
///
/// Returns the number of variables applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let settable = matches!(
            sources.get(mapping.field_path),
            None | Some(ConfigLayer::Defaults)
        );
        if !settable {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name).filter(|v| !v.is_empty()) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );
            set_field(merged, mapping.field_path, coerce(mapping.field_path, val));
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Replace `${VAR}` references in every string value of the tree.
///
/// Unknown variables are left as written.
pub fn resolve_env_references<S: ::std::hash::BuildHasher>(
    val: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) {
    match val {
        toml::Value::String(s) => *s = resolve_string_refs(s, env_vars),
        toml::Value::Table(table) => {
            for (_, child) in table.iter_mut() {
                resolve_env_references(child, env_vars);
            }
        },
        toml::Value::Array(arr) => {
            for child in arr.iter_mut() {
                resolve_env_references(child, env_vars);
            }
        },
        _ => {},
    }
}

fn resolve_string_refs<S: ::std::hash::BuildHasher>(
    input: &str,
    env_vars: &HashMap<String, String, S>,
) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        let (before, after) = rest.split_at(start);
        result.push_str(before);
        let body = after.strip_prefix("${").unwrap_or(after);

        match body.find('}') {
            Some(end) => {
                let (name, tail) = body.split_at(end);
                match env_vars.get(name).filter(|_| !name.is_empty()) {
                    Some(value) => result.push_str(value),
                    None => {
                        debug!(var = name, "unresolved env var reference in config");
                        let _ = write!(result, "${{{name}}}");
                    },
                }
                rest = tail.strip_prefix('}').unwrap_or(tail);
            },
            None => {
                result.push_str(after);
                rest = "";
            },
        }
    }

    result.push_str(rest);
    result
}

fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}

fn coerce(path: &str, val: &str) -> toml::Value {
    if matches!(
        path,
        "auth.max_age_secs" | "server.port" | "store.timeout_secs"
    ) && let Ok(i) = val.parse::<i64>()
    {
        return toml::Value::Integer(i);
    }

    if path == "store.secure"
        && let Ok(b) = val.parse::<bool>()
    {
        return toml::Value::Boolean(b);
    }

    toml::Value::String(val.to_owned())
}

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::record_leaves;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn defaults() -> (toml::Value, FieldSources) {
        let val: toml::Value =
            toml::from_str("[auth]\nsecret = \"\"\n[server]\nport = 8080\n").unwrap();
        let mut sources = FieldSources::new();
        record_leaves(&val, "", &ConfigLayer::Defaults, &mut sources);
        (val, sources)
    }

    #[test]
    fn test_env_fills_defaults() {
        let (mut val, mut sources) = defaults();
        let applied = apply_env_fallbacks(
            &mut val,
            &mut sources,
            &env(&[("APP_SECRET", "from-env"), ("PORT", "9000")]),
        );

        assert_eq!(applied, 2);
        assert_eq!(val["auth"]["secret"].as_str(), Some("from-env"));
        assert_eq!(val["server"]["port"].as_integer(), Some(9000));
        assert_eq!(sources.get("auth.secret"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn test_env_does_not_override_files() {
        let (mut val, mut sources) = defaults();
        sources.insert("auth.secret".to_owned(), ConfigLayer::User);
        apply_env_fallbacks(&mut val, &mut sources, &env(&[("APP_SECRET", "from-env")]));
        assert_eq!(val["auth"]["secret"].as_str(), Some(""));
    }

    #[test]
    fn test_first_mapping_wins() {
        let (mut val, mut sources) = defaults();
        apply_env_fallbacks(
            &mut val,
            &mut sources,
            &env(&[("APP_SECRET", "legacy"), ("APIDOC_AUTH_SECRET", "preferred")]),
        );
        assert_eq!(val["auth"]["secret"].as_str(), Some("preferred"));
    }

    #[test]
    fn test_creates_missing_sections() {
        let mut val = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();
        apply_env_fallbacks(
            &mut val,
            &mut sources,
            &env(&[("APIDOC_STORE_SECURE", "true"), ("APIDOC_STORE_URL", "es:9200")]),
        );
        assert_eq!(val["store"]["secure"].as_bool(), Some(true));
        assert_eq!(val["store"]["url"].as_str(), Some("es:9200"));
    }

    #[test]
    fn test_unparsable_number_stays_string() {
        assert_eq!(
            coerce("server.port", "eighty"),
            toml::Value::String("eighty".to_owned())
        );
    }

    #[test]
    fn test_resolve_references() {
        let vars = env(&[("ES_HOST", "search.internal"), ("ES_PORT", "9243")]);
        assert_eq!(
            resolve_string_refs("${ES_HOST}:${ES_PORT}/x", &vars),
            "search.internal:9243/x"
        );
        assert_eq!(resolve_string_refs("${MISSING}", &vars), "${MISSING}");
        assert_eq!(resolve_string_refs("no refs", &vars), "no refs");
        assert_eq!(resolve_string_refs("broken ${ES_HOST", &vars), "broken ${ES_HOST");
        assert_eq!(resolve_string_refs("$ {x}", &vars), "$ {x}");
    }

    #[test]
    fn test_resolve_in_tree() {
        let mut val: toml::Value =
            toml::from_str("[store]\nurl = \"${ES}\"\n[logging]\ndirectives = [\"${D}\"]\n")
                .unwrap();
        resolve_env_references(&mut val, &env(&[("ES", "es:1"), ("D", "x=debug")]));
        assert_eq!(val["store"]["url"].as_str(), Some("es:1"));
        assert_eq!(val["logging"]["directives"][0].as_str(), Some("x=debug"));
    }
}
