//! Runtime configuration, read from environment variables.
//!
//!   SWIFT_DB_PATH   - SQLite database file (default: swift_codes.db)
//!   SWIFT_DATA_FILE - CSV or .xlsx workbook loaded at startup when the
//!                     database is empty (default: data/swift_codes.csv)
//!   SWIFT_BIND_ADDR - HTTP listen address (default: 0.0.0.0:8080)

use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "swift_codes.db";
pub const DEFAULT_DATA_FILE: &str = "data/swift_codes.csv";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub data_file: PathBuf,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            db_path: get("SWIFT_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            data_file: get("SWIFT_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            bind_addr: get("SWIFT_BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SWIFT_DB_PATH", "/tmp/swift.db"),
            ("SWIFT_DATA_FILE", "/srv/codes.csv"),
            ("SWIFT_BIND_ADDR", "127.0.0.1:9000"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/swift.db"));
        assert_eq!(config.data_file, PathBuf::from("/srv/codes.csv"));
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = Config::from_lookup(|k| (k == "SWIFT_BIND_ADDR").then(|| "  ".to_string()));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }
}
