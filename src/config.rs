use super::client::{DEFAULT_ATTEMPTS, DEFAULT_BACKOFF_BASE};
use super::error::{Error, Result};
use super::query::Validation;

use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Public key of the API. Heavily rate limited, but good enough to try things out.
pub const DEMO_KEY: &str = "DEMO_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.nasa.gov";

pub const DEFAULT_USER_AGENT: &str = concat!("nasapi/", env!("CARGO_PKG_VERSION"));

pub const API_KEY_VAR: &str = "NASA_API_KEY";
pub const BASE_URL_VAR: &str = "NASA_BASE_URL";
pub const USER_AGENT_VAR: &str = "NASA_USER_AGENT";
pub const MAX_ATTEMPTS_VAR: &str = "NASA_MAX_ATTEMPTS";
pub const STRICT_QUERIES_VAR: &str = "NASA_STRICT_QUERIES";

/// Settings used to build a [`Client`](crate::client::Client).
///
/// ```
/// # use nasapi::config::Config;
/// # use nasapi::query::Validation;
/// let config = Config::default()
///     .api_key("MY_KEY")
///     .max_attempts(3)
///     .validation(Validation::Strict);
///
/// assert_eq!(config.base_url, "https://api.nasa.gov");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub user_agent: String,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub validation: Validation,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::from(DEMO_KEY),
            base_url: String::from(DEFAULT_BASE_URL),
            user_agent: String::from(DEFAULT_USER_AGENT),
            max_attempts: DEFAULT_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
            validation: Validation::Permissive,
        }
    }
}

impl Config {
    /// Reads the configuration from the environment, after loading `.env` if there is one.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `NASA_API_KEY` | `DEMO_KEY` |
    /// | `NASA_BASE_URL` | `https://api.nasa.gov` |
    /// | `NASA_USER_AGENT` | `nasapi/<version>` |
    /// | `NASA_MAX_ATTEMPTS` | `5` |
    /// | `NASA_STRICT_QUERIES` | `false` |
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let strict: bool = parse_var(&lookup, STRICT_QUERIES_VAR)?.unwrap_or(false);

        Ok(Config {
            api_key: lookup(API_KEY_VAR).unwrap_or(defaults.api_key),
            base_url: lookup(BASE_URL_VAR).unwrap_or(defaults.base_url),
            user_agent: lookup(USER_AGENT_VAR).unwrap_or(defaults.user_agent),
            max_attempts: match parse_var::<u32, _>(&lookup, MAX_ATTEMPTS_VAR)? {
                Some(0) => {
                    return Err(Error::Config(format!(
                        "{} must be at least 1",
                        MAX_ATTEMPTS_VAR
                    )))
                }
                Some(n) => n,
                None => defaults.max_attempts,
            },
            backoff_base: defaults.backoff_base,
            validation: if strict {
                Validation::Strict
            } else {
                Validation::Permissive
            },
        })
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Base of the exponential backoff between attempts.
    pub fn backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("invalid {}: {:?}", name, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
        assert_eq!(Config::default().api_key, "DEMO_KEY");
        assert_eq!(Config::default().max_attempts, 5);
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_VAR, "abc"),
            (BASE_URL_VAR, "http://127.0.0.1:1234"),
            (MAX_ATTEMPTS_VAR, " 2 "),
            (STRICT_QUERIES_VAR, "true"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "abc");
        assert_eq!(config.base_url, "http://127.0.0.1:1234");
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.validation, Validation::Strict);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn malformed_variables_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[(MAX_ATTEMPTS_VAR, "many")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(MAX_ATTEMPTS_VAR, "0")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(STRICT_QUERIES_VAR, "yes please")])),
            Err(Error::Config(_))
        ));
    }
}
