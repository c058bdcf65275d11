use super::error::{Error, Result};
use super::route::Route;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Name of the query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";

/// Parameters of one request, by name.
///
/// ```
/// # use nasapi::query::Options;
/// let options = Options::new()
///     .set("date", "2021-06-01")
///     .set("hd", true)
///     .set_opt("count", None::<u32>);
///
/// assert_eq!(options.get("hd"), Some("true"));
/// assert_eq!(options.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(BTreeMap<String, String>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` only when `value` is `Some`.
    pub fn set_opt<K: Into<String>, V: ToString>(self, key: K, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn insert<K: Into<String>, V: ToString>(&mut self, key: K, value: V) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flattens a serializable query struct into options. `null` fields are skipped and lists are
    /// joined with commas.
    pub fn from_query<T: Serialize>(query: &T) -> Result<Self> {
        match serde_json::to_value(query)? {
            JsonValue::Object(fields) => Ok(fields
                .into_iter()
                .filter_map(|(k, v)| query_value(v).map(|v| (k, v)))
                .collect()),
            JsonValue::Null => Ok(Options::new()),
            other => Err(Error::Resource(format!(
                "a query must serialize to a map, not {}",
                other
            ))),
        }
    }
}

fn query_value(v: JsonValue) -> Option<String> {
    match v {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s),
        JsonValue::Array(items) => Some(
            items
                .into_iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Options(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

/// What to do with parameters a route doesn't accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Drop them silently.
    #[default]
    Permissive,
    /// Fail with [`Error::InvalidQuery`].
    Strict,
}

/// The path and query of a request, ready to be appended to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    pub path: String,
    pub query: Options,
}

impl ValidatedQuery {
    pub fn to_url(&self, base_url: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), self.path))
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", base_url, e)))?;

        url.query_pairs_mut().extend_pairs(self.query.iter());

        Ok(url)
    }
}

/// Filters request options down to what a route accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryValidator {
    mode: Validation,
}

impl QueryValidator {
    pub fn new(mode: Validation) -> Self {
        QueryValidator { mode }
    }

    pub fn mode(&self) -> Validation {
        self.mode
    }

    /// Keeps the options `route` accepts in its query string. Options naming a placeholder of the
    /// path template are consumed by the path and never reported. A caller-supplied `api_key` is
    /// always dropped.
    pub fn filter(&self, route: &Route, options: &Options) -> Result<Options> {
        let mut kept = Options::new();
        let mut unsupported = Vec::new();

        for (key, value) in options.iter() {
            if route.permits(key) {
                kept.insert(key, value);
            } else if key == API_KEY_PARAM || route.placeholders().any(|p| p == key) {
                continue;
            } else {
                unsupported.push(key.to_string());
            }
        }

        if !unsupported.is_empty() {
            match self.mode {
                Validation::Strict => {
                    return Err(Error::InvalidQuery {
                        route: route.name.to_string(),
                        keys: unsupported,
                    })
                }
                Validation::Permissive => {
                    debug!(route = route.name, ?unsupported, "dropping unsupported query parameters")
                }
            }
        }

        Ok(kept)
    }

    /// Renders the path of `route` and its filtered query, with `api_key` injected.
    pub fn validate(&self, route: &Route, options: &Options, api_key: &str) -> Result<ValidatedQuery> {
        let path = route.render_path(options)?;
        let mut query = self.filter(route, options)?;
        query.insert(API_KEY_PARAM, api_key);

        Ok(ValidatedQuery { path, query })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route;

    fn noisy_options() -> Options {
        Options::new()
            .set("date", "2021-06-01")
            .set("hd", true)
            .set("startDate", "2021-01-01")
            .set("rover", "curiosity")
            .set("bogus", 1)
            .set(API_KEY_PARAM, "stolen")
    }

    #[test]
    fn output_is_a_subset_of_the_whitelist() {
        let validator = QueryValidator::default();

        for route in Route::all() {
            let validated = validator
                .filter(route, &noisy_options())
                .unwrap();

            assert!(validated.keys().all(|k| route.permits(k)), "{}", route.name);
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let validator = QueryValidator::default();
        let route = Route::lookup(route::APOD).unwrap();

        let once = validator.validate(route, &noisy_options(), "KEY").unwrap();
        let twice = validator.validate(route, &once.query, "KEY").unwrap();

        assert_eq!(once, twice);
        assert_eq!(
            once.query.keys().collect::<Vec<_>>(),
            vec!["api_key", "date", "hd"]
        );
        assert_eq!(once.query.get(API_KEY_PARAM), Some("KEY"));
    }

    #[test]
    fn strict_mode_rejects_unknown_keys() {
        let validator = QueryValidator::new(Validation::Strict);
        let route = Route::lookup(route::MARS_PHOTOS).unwrap();

        // placeholders and api_key are never "unknown"
        assert!(validator
            .filter(route, &Options::new().set("rover", "spirit").set(API_KEY_PARAM, "x"))
            .is_ok());

        match validator.filter(route, &noisy_options()) {
            Err(Error::InvalidQuery { route, mut keys }) => {
                keys.sort();
                assert_eq!(route, "mars-photos");
                assert_eq!(keys, vec!["bogus", "date", "hd", "startDate"]);
            }
            other => panic!("expected InvalidQuery, got {:?}", other),
        }
    }

    #[test]
    fn url_building() {
        let validator = QueryValidator::default();
        let route = Route::lookup(route::MARS_PHOTOS).unwrap();
        let options = Options::new().set("rover", "curiosity").set("sol", 1000);

        let url = validator
            .validate(route, &options, "DEMO_KEY")
            .unwrap()
            .to_url("https://api.nasa.gov/")
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.nasa.gov/mars-photos/api/v1/rovers/curiosity/photos?api_key=DEMO_KEY&sol=1000"
        );
    }

    #[test]
    fn from_query_flattens_fields() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Q {
            start_date: Option<&'static str>,
            end_date: Option<&'static str>,
            most_accurate_only: bool,
            speed: u32,
            tags: Vec<&'static str>,
        }

        let options = Options::from_query(&Q {
            start_date: Some("2021-01-01"),
            end_date: None,
            most_accurate_only: true,
            speed: 500,
            tags: vec!["a", "b"],
        })
        .unwrap();

        assert_eq!(options.get("startDate"), Some("2021-01-01"));
        assert!(!options.contains_key("endDate"));
        assert_eq!(options.get("mostAccurateOnly"), Some("true"));
        assert_eq!(options.get("speed"), Some("500"));
        assert_eq!(options.get("tags"), Some("a,b"));
    }
}
