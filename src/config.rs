//! Server configuration from environment variables.

use std::time::Duration;

/// Web server settings. Every value has a default; bad values fall back with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// HOST (default 0.0.0.0, reachable on a VPS).
    pub host: String,
    /// PORT (default 8080).
    pub port: u16,
    /// INACTIVITY_HOURS: tournaments untouched this long are removed.
    pub inactivity_timeout: Duration,
    /// CLEANUP_INTERVAL_MINUTES
    pub cleanup_interval: Duration,
    /// DEFAULT_ROUNDS: rounds requested when a create request leaves it out.
    pub default_rounds: u32,
    /// EVENT_POLL_SECONDS: how long an event poll waits before returning empty.
    pub event_poll_timeout: Duration,
    /// Buffered events per subscriber before old ones are dropped.
    pub event_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            inactivity_timeout: Duration::from_secs(12 * 3600),
            cleanup_interval: Duration::from_secs(30 * 60),
            default_rounds: 5,
            event_poll_timeout: Duration::from_secs(25),
            event_capacity: 256,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map instead of the process env).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |key: &str| -> Option<u64> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("Ignoring {}={:?}: not a number", key, raw);
                    None
                }
            }
        };
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse("PORT")
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(defaults.port),
            inactivity_timeout: parse("INACTIVITY_HOURS")
                .map(|h| Duration::from_secs(h * 3600))
                .unwrap_or(defaults.inactivity_timeout),
            cleanup_interval: parse("CLEANUP_INTERVAL_MINUTES")
                .filter(|&m| m > 0)
                .map(|m| Duration::from_secs(m * 60))
                .unwrap_or(defaults.cleanup_interval),
            default_rounds: parse("DEFAULT_ROUNDS")
                .and_then(|r| u32::try_from(r).ok())
                .unwrap_or(defaults.default_rounds),
            event_poll_timeout: parse("EVENT_POLL_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.event_poll_timeout),
            event_capacity: defaults.event_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn falls_back_on_bad_values() {
        let env: HashMap<&str, &str> = [("PORT", "not-a-port"), ("DEFAULT_ROUNDS", "7")]
            .into_iter()
            .collect();
        let cfg = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.default_rounds, 7);
        assert_eq!(cfg.host, "0.0.0.0");
    }
}
