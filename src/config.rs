//! Process-wide configuration, read once from the environment at startup

use crate::error::ConfigError;
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::state::store::DEFAULT_IDLE_TTL;
use std::fmt;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub port: u16,
    /// No timeout when unset
    pub request_timeout: Option<Duration>,
    pub temperature: Option<f32>,
    /// Sessions idle longer than this are evicted
    pub session_ttl: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("temperature", &self.temperature)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl Config {
    /// Load from the process environment (after `.env`, if the caller loaded it)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("GEMINI_API_KEY")
            .or_else(|| non_blank("API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let model = non_blank("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url =
            non_blank("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let port = match (non_blank("PORT"), non_blank("API_PORT")) {
            (Some(value), _) => parse_value::<u16>("PORT", &value)?,
            (None, Some(value)) => parse_value::<u16>("API_PORT", &value)?,
            (None, None) => DEFAULT_PORT,
        };

        let request_timeout = non_blank("STRATEGY_TIMEOUT_SECS")
            .map(|value| parse_secs("STRATEGY_TIMEOUT_SECS", value))
            .transpose()?;

        let session_ttl = non_blank("SESSION_IDLE_TTL_SECS")
            .map(|value| parse_secs("SESSION_IDLE_TTL_SECS", value))
            .transpose()?
            .unwrap_or(DEFAULT_IDLE_TTL);

        let temperature = match non_blank("GEMINI_TEMPERATURE") {
            Some(value) => {
                let t = parse_value::<f32>("GEMINI_TEMPERATURE", &value)?;
                if !(0.0..=2.0).contains(&t) {
                    return Err(ConfigError::Invalid {
                        key: "GEMINI_TEMPERATURE",
                        value,
                    });
                }
                Some(t)
            }
            None => None,
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            port,
            request_timeout,
            temperature,
            session_ttl,
        })
    }
}

/// Whole seconds, zero rejected
fn parse_secs(key: &'static str, value: String) -> Result<Duration, ConfigError> {
    match parse_value::<u64>(key, &value)? {
        0 => Err(ConfigError::Invalid { key, value }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("GEMINI_API_KEY", "abc")]).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.port, 8080);
        assert!(config.request_timeout.is_none());
        assert!(config.temperature.is_none());
        assert_eq!(config.session_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingApiKey)));
        assert!(matches!(
            load(&[("GEMINI_API_KEY", "   ")]),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_fallback_keys() {
        let config = load(&[("API_KEY", "legacy"), ("API_PORT", "9000")]).unwrap();
        assert_eq!(config.api_key, "legacy");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("GEMINI_API_KEY", "abc"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("PORT", "3000"),
            ("STRATEGY_TIMEOUT_SECS", "45"),
            ("GEMINI_TEMPERATURE", "0.4"),
            ("SESSION_IDLE_TTL_SECS", "600"),
        ])
        .unwrap();

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(45)));
        assert_eq!(config.temperature, Some(0.4));
        assert_eq!(config.session_ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("STRATEGY_TIMEOUT_SECS", "0"),
            ("STRATEGY_TIMEOUT_SECS", "-1"),
            ("GEMINI_TEMPERATURE", "3.5"),
            ("SESSION_IDLE_TTL_SECS", "0"),
            ("SESSION_IDLE_TTL_SECS", "soon"),
        ] {
            let result = load(&[("GEMINI_API_KEY", "abc"), (key, value)]);
            match result {
                Err(ConfigError::Invalid { key: k, .. }) => assert_eq!(k, key),
                other => panic!("expected invalid {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = load(&[("GEMINI_API_KEY", "AIzaSy-secret-key")]).unwrap();
        let printed = format!("{:?}", config);

        assert!(!printed.contains("AIzaSy-secret-key"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("gemini-2.5-flash"));
    }
}
