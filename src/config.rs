use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SqlreindentError;
use crate::mode::Mode;

const CONFIG_FILE: &str = "sqlreindent.toml";

const KNOWN_KEYS: [&str; 6] = [
    "indent",
    "newline",
    "whitespace",
    "padding",
    "exclude",
    "methods",
];

/// Load configuration from a `sqlreindent.toml` file.
/// Searches parent directories of the inputs if no config path is given.
pub fn load_config(files: &[PathBuf], config_path: Option<&Path>) -> Result<Mode, SqlreindentError> {
    let mut mode = Mode::default();

    let config_file = match config_path {
        Some(path) => {
            if path.exists() {
                Some(path.to_path_buf())
            } else {
                return Err(SqlreindentError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }
        None => find_config_file(files),
    };

    if let Some(path) = config_file {
        tracing::debug!(path = %path.display(), "loading configuration");
        let raw = load_config_from_path(&path)?;
        apply_config(&mut mode, &raw)?;
    }

    Ok(mode)
}

/// Search for a config file in the parent directories of the given files.
fn find_config_file(files: &[PathBuf]) -> Option<PathBuf> {
    get_common_parents(files)
        .into_iter()
        .map(|parent| parent.join(CONFIG_FILE))
        .find(|config| config.exists())
}

/// Get the parent directories of the given paths, ordered from most
/// specific to least specific.
fn get_common_parents(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut parents = Vec::new();

    for file in files {
        let parent = if file.is_dir() {
            file.clone()
        } else {
            file.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };

        // Walk up to root
        let mut current = Some(parent.as_path());
        while let Some(dir) = current {
            let dir_buf = dir.to_path_buf();
            if !parents.contains(&dir_buf) {
                parents.push(dir_buf);
            }
            current = dir.parent();
        }
    }

    parents
}

/// Load and parse a TOML config file.
fn load_config_from_path(path: &Path) -> Result<HashMap<String, toml::Value>, SqlreindentError> {
    let content = std::fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)?;
    Ok(table
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect())
}

fn string_value(
    config: &HashMap<String, toml::Value>,
    key: &str,
) -> Result<Option<String>, SqlreindentError> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SqlreindentError::Config(format!(
            "Expected a string for {}",
            key
        ))),
    }
}

fn string_list(
    config: &HashMap<String, toml::Value>,
    key: &str,
) -> Result<Option<Vec<String>>, SqlreindentError> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };
    let invalid = || SqlreindentError::Config(format!("Expected a list of strings for {}", key));
    let toml::Value::Array(arr) = value else {
        return Err(invalid());
    };
    arr.iter()
        .map(|v| v.as_str().map(String::from).ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Apply configuration values to a Mode.
fn apply_config(mode: &mut Mode, config: &HashMap<String, toml::Value>) -> Result<(), SqlreindentError> {
    // Validate no unknown keys
    for key in config.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            return Err(SqlreindentError::Config(format!(
                "Unknown config option: {}",
                key
            )));
        }
    }

    if let Some(indent) = string_value(config, "indent")? {
        mode.options.indent = indent;
    }
    if let Some(newline) = string_value(config, "newline")? {
        mode.options.newline = newline;
    }
    if let Some(whitespace) = string_value(config, "whitespace")? {
        mode.options.whitespace = whitespace;
    }
    if let Some(padding) = string_value(config, "padding")? {
        mode.options.padding = padding;
    }
    if let Some(exclude) = string_list(config, "exclude")? {
        mode.exclude = exclude;
    }
    if let Some(methods) = string_list(config, "methods")? {
        if methods.is_empty() {
            return Err(SqlreindentError::Config(
                "methods must name at least one method".to_string(),
            ));
        }
        mode.methods = methods;
    }

    Ok(())
}
