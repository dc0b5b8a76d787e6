//! chorus-sc configuration
//!
//! Settings resolve CLI > env > TOML file > compiled default, using
//! the shared resolution helpers. The clap layer already folds CLI and
//! env together; the TOML file fills whatever is left.

use chorus_common::config::resolve_setting;

use crate::error::{Error, Result};

/// Default HTTP port for the session coordinator
pub const DEFAULT_PORT: u16 = 5750;

/// Default empty-roster teardown grace period, in seconds
pub const DEFAULT_TEARDOWN_GRACE_SECS: u64 = 300;

/// Default per-session event channel capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Session coordinator configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub teardown_grace_secs: u64,
    pub event_capacity: usize,
    /// Base URL of the catalog service; None selects the offline
    /// fixture catalog
    pub catalog_base_url: Option<String>,
}

impl Config {
    /// Resolve configuration from pre-parsed CLI/env values plus the
    /// TOML config file
    pub fn resolve(
        port: Option<u16>,
        teardown_grace_secs: Option<u64>,
        catalog_base_url: Option<String>,
    ) -> Result<Self> {
        let port = match port {
            Some(p) => p,
            None => resolve_setting(None, "CHORUS_SC_PORT", "port")
                .map(|s| {
                    s.parse::<u16>()
                        .map_err(|_| Error::Config(format!("invalid port: {}", s)))
                })
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
        };

        let teardown_grace_secs = match teardown_grace_secs {
            Some(g) => g,
            None => resolve_setting(None, "CHORUS_SC_TEARDOWN_GRACE", "teardown_grace_secs")
                .map(|s| {
                    s.parse::<u64>()
                        .map_err(|_| Error::Config(format!("invalid grace period: {}", s)))
                })
                .transpose()?
                .unwrap_or(DEFAULT_TEARDOWN_GRACE_SECS),
        };

        let catalog_base_url = catalog_base_url
            .or_else(|| resolve_setting(None, "CHORUS_CATALOG_URL", "catalog_base_url"));

        Ok(Self {
            port,
            teardown_grace_secs,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            catalog_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_values_win() {
        let config = Config::resolve(Some(6000), Some(10), None).unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.teardown_grace_secs, 10);
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = Config::resolve(None, Some(10), None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
    }
}
