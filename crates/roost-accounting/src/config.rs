//! # Roost Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ROOST_DB_PATH=/srv/roost/roost.db                                  │
//! │     ROOST_DB_MAX_CONNECTIONS=5                                         │
//! │     ROOST_REPORT_DIR=/srv/roost/reports                                │
//! │     ROOST_MISMATCH_TOLERANCE_CENTS=0                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/roost/roost.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.roost.roost/roost.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/roost/roost.db"
//! max_connections = 5
//!
//! [reports]
//! output_dir = "/srv/roost/reports"
//!
//! [accounting]
//! # 0 compares evaluated and declared city tax to the cent
//! mismatch_tolerance_cents = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use roost_core::Money;
use roost_db::DbConfig;

use crate::error::ConfigError;

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Created on first use.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "roost", "roost")
        .map(|dirs| dirs.data_dir().join("roost.db"))
        .unwrap_or_else(|| PathBuf::from("roost.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Report Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Directory receiving declaration CSV files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            output_dir: default_output_dir(),
        }
    }
}

// =============================================================================
// Accounting Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingSettings {
    /// Largest difference between evaluated and declared city tax, in cents,
    /// that is not reported as a mismatch.
    #[serde(default)]
    pub mismatch_tolerance_cents: i64,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Roost configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoostConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub reports: ReportSettings,

    #[serde(default)]
    pub accounting: AccountingSettings,
}

impl RoostConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (roost.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> Result<(), ConfigError> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml()?)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Renders the configuration in the file format `load` reads.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.accounting.mismatch_tolerance_cents < 0 {
            return Err(ConfigError::Invalid(
                "accounting.mismatch_tolerance_cents must not be negative".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `ROOST_*` overrides read through `lookup`. Unparsable numbers
    /// are logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ROOST_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("ROOST_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid ROOST_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(dir) = lookup("ROOST_REPORT_DIR") {
            debug!(dir = %dir, "Overriding report directory from environment");
            self.reports.output_dir = PathBuf::from(dir);
        }

        if let Some(cents) = lookup("ROOST_MISMATCH_TOLERANCE_CENTS") {
            match cents.parse::<i64>() {
                Ok(c) => self.accounting.mismatch_tolerance_cents = c,
                Err(_) => warn!(value = %cents, "Ignoring invalid ROOST_MISMATCH_TOLERANCE_CENTS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "roost", "roost")
            .map(|dirs| dirs.config_dir().join("roost.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Pool configuration for [`roost_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    pub fn mismatch_tolerance(&self) -> Money {
        Money::from_cents(self.accounting.mismatch_tolerance_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = RoostConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.reports.output_dir, PathBuf::from("reports"));
        assert!(config.mismatch_tolerance().is_zero());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: RoostConfig = toml::from_str(
            r#"
            [accounting]
            mismatch_tolerance_cents = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.accounting.mismatch_tolerance_cents, 2);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.reports, ReportSettings::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RoostConfig::default();

        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.database.max_connections = 1;
        config.accounting.mismatch_tolerance_cents = -1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ROOST_DB_PATH", "/tmp/override.db"),
            ("ROOST_DB_MAX_CONNECTIONS", "not-a-number"),
            ("ROOST_REPORT_DIR", "/tmp/reports"),
            ("ROOST_MISMATCH_TOLERANCE_CENTS", "5"),
        ]);

        let mut config = RoostConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/override.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.reports.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.mismatch_tolerance(), Money::from_cents(5));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("roost.toml");

        let mut config = RoostConfig::default();
        config.database.path = dir.path().join("roost.db");
        config.accounting.mismatch_tolerance_cents = 1;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[accounting]"));

        let loaded: RoostConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roost.toml");
        std::fs::write(&path, "[database\npath = 1").unwrap();

        assert!(matches!(RoostConfig::load(Some(path)), Err(ConfigError::Parse(_))));
    }
}
