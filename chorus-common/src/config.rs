//! Configuration loading helpers
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback, supplied by the caller)

use crate::{Error, Result};
use std::path::PathBuf;

/// Locate the CHORUS config file for the platform
///
/// Linux tries `~/.config/chorus/config.toml` then
/// `/etc/chorus/config.toml`; other platforms use the OS config
/// directory.
pub fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        if let Some(path) = dirs::config_dir().map(|d| d.join("chorus").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/chorus/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    dirs::config_dir()
        .map(|d| d.join("chorus").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Load the TOML config file as a generic value, if one exists
pub fn load_config_table() -> Option<toml::Value> {
    let path = config_file_path().ok()?;
    let content = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Resolve one string setting following the priority order
///
/// `cli_arg` wins, then the named environment variable, then the named
/// top-level key of the TOML config file. Returns `None` if no source
/// provides a value; the caller applies its compiled default.
pub fn resolve_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config_file_key: &str,
) -> Option<String> {
    if let Some(value) = cli_arg {
        return Some(value.to_string());
    }

    if let Ok(value) = std::env::var(env_var_name) {
        return Some(value);
    }

    load_config_table()?
        .get(config_file_key)
        .and_then(|v| match v {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_wins() {
        let resolved = resolve_setting(Some("5750"), "CHORUS_TEST_UNSET", "port");
        assert_eq!(resolved, Some("5750".to_string()));
    }

    #[test]
    fn test_env_var_beats_file() {
        std::env::set_var("CHORUS_TEST_PORT_SETTING", "6001");
        let resolved = resolve_setting(None, "CHORUS_TEST_PORT_SETTING", "port");
        assert_eq!(resolved, Some("6001".to_string()));
        std::env::remove_var("CHORUS_TEST_PORT_SETTING");
    }
}
