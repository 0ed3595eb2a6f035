use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_DATABASE: &str = "geodata";
pub const DEFAULT_USER: &str = "ro";

/// Runtime configuration, read once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            user: DEFAULT_USER.to_string(),
            debug: false,
        }
    }
}

impl Config {
    /// Read `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER` and `DEBUG` from the
    /// process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("DB_PORT '{raw}': {e}")))?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("DB_HOST").unwrap_or(defaults.host),
            port,
            database: lookup("DB_NAME").unwrap_or(defaults.database),
            user: lookup("DB_USER").unwrap_or(defaults.user),
            debug: lookup("DEBUG")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.debug),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::from_lookup(env(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.port, 3306);
        assert_eq!(cfg.database, "geodata");
        assert_eq!(cfg.user, "ro");
    }

    #[test]
    fn overrides_and_debug_flag() {
        let cfg = Config::from_lookup(env(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "5432"),
            ("DB_NAME", "census"),
            ("DB_USER", "loader"),
            ("DEBUG", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(cfg.host, "db.internal");
        assert_eq!(cfg.port, 5432);
        assert_eq!(cfg.database, "census");
        assert_eq!(cfg.user, "loader");
        assert!(cfg.debug);

        let cfg = Config::from_lookup(env(&[("DEBUG", "1")])).unwrap();
        assert!(!cfg.debug);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = Config::from_lookup(env(&[("DB_PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
