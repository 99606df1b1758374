use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and an optional `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// `None` when unset or too short; a random key is generated instead.
    pub session_key: Option<Vec<u8>>,
    pub session_secure: bool,
    pub login_max_attempts: usize,
    pub login_window: Duration,
}

/// Minimum session key length accepted by the cookie layer.
pub const MIN_SESSION_KEY_LEN: usize = 64;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let session_key = match lookup("SESSION_KEY") {
            Some(val) if val.len() >= MIN_SESSION_KEY_LEN => Some(val.into_bytes()),
            Some(val) => {
                log::warn!(
                    "SESSION_KEY too short ({} bytes, need {}+), generating random key",
                    val.len(),
                    MIN_SESSION_KEY_LEN
                );
                None
            }
            None => {
                log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
                None
            }
        };

        Ok(Config {
            bind: lookup("PRISM_BIND").unwrap_or_else(|| "127.0.0.1:3000".to_string()),
            database_url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 8)?,
            session_key,
            session_secure: parse(&lookup, "SESSION_SECURE", false)?,
            login_max_attempts: parse(&lookup, "LOGIN_MAX_ATTEMPTS", 5)?,
            login_window: Duration::from_secs(parse(&lookup, "LOGIN_WINDOW_SECS", 900)?),
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:3000");
        assert!(cfg.database_url.is_none());
        assert!(cfg.session_key.is_none());
        assert_eq!(cfg.login_max_attempts, 5);
        assert_eq!(cfg.login_window, Duration::from_secs(900));
    }

    #[test]
    fn short_session_key_is_discarded() {
        let cfg = config(&[("SESSION_KEY", "short")]).unwrap();
        assert!(cfg.session_key.is_none());
        let long = "k".repeat(64);
        let cfg = config(&[("SESSION_KEY", long.as_str())]).unwrap();
        assert_eq!(cfg.session_key.map(|k| k.len()), Some(64));
    }

    #[test]
    fn malformed_number_is_an_error() {
        let err = config(&[("LOGIN_MAX_ATTEMPTS", "five")]).unwrap_err();
        assert!(err.to_string().contains("LOGIN_MAX_ATTEMPTS"));
    }

    #[test]
    fn overrides_are_read() {
        let cfg = config(&[
            ("PRISM_BIND", "0.0.0.0:8080"),
            ("DATABASE_URL", "postgres://localhost/prism"),
            ("SESSION_SECURE", "true"),
        ])
        .unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/prism"));
        assert!(cfg.session_secure);
    }
}
