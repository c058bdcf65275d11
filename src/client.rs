mod backoff;
mod dispatch;
mod rate_limit;
mod transport;

pub use backoff::{RetryPolicy, DEFAULT_ATTEMPTS, DEFAULT_BACKOFF_BASE};
pub use dispatch::Dispatcher;
pub use rate_limit::{RateLimitStatus, RateLimitTracker, LIMIT_HEADER, REMAINING_HEADER};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportFuture};

use super::config::{Config, DEFAULT_USER_AGENT};
use super::error::{Error, Result};
use super::query::{Options, QueryValidator, Validation};
use super::resource::FromPayload;

/// Client struct.
///
/// Every request goes through the same [`Dispatcher`]: the API key is injected, unsupported
/// parameters are filtered out, transient failures are retried and the quota reported by the API
/// is remembered per route.
#[derive(Debug)]
pub struct Client {
    dispatcher: Dispatcher,
}

impl Client {
    /// Create a new client querying `base_url` (usually `https://api.nasa.gov`) with `api_key`.
    ///
    /// ```no_run
    /// # use nasapi::client::Client;
    /// # fn main() -> nasapi::error::Result<()> {
    /// let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
    /// # Ok(()) }
    /// ```
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::from_config(&Config::default().base_url(base_url).api_key(api_key))
    }

    /// Create a new client from a [`Config`], building its own connection pool.
    pub fn from_config(config: &Config) -> Result<Self> {
        check_api_key(&config.api_key)?;
        check_base_url(&config.base_url)?;

        let transport = ReqwestTransport::new(&config.user_agent)?;

        Ok(Client {
            dispatcher: Dispatcher::new(&config.base_url, &config.api_key, Box::new(transport))
                .with_retry_policy(RetryPolicy::new(config.max_attempts, config.backoff_base))
                .with_validator(QueryValidator::new(config.validation)),
        })
    }

    /// Create a new client sharing a connection pool with the rest of the application.
    ///
    /// The pool is used as is: set a User-Agent on it if the application doesn't already.
    pub fn with_http_client(base_url: &str, api_key: &str, client: reqwest::Client) -> Result<Self> {
        Self::with_transport(base_url, api_key, ReqwestTransport::with_client(client))
    }

    /// Create a new client sending its requests through `transport`.
    pub fn with_transport<T>(base_url: &str, api_key: &str, transport: T) -> Result<Self>
    where
        T: Transport + 'static,
    {
        check_api_key(api_key)?;
        check_base_url(base_url)?;

        Ok(Client {
            dispatcher: Dispatcher::new(base_url, api_key, Box::new(transport)),
        })
    }

    /// Change how many times and how patiently requests are attempted.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.dispatcher = self.dispatcher.with_retry_policy(policy);
        self
    }

    /// Change what happens to parameters a route doesn't accept.
    pub fn validation(mut self, validation: Validation) -> Self {
        self.dispatcher = self
            .dispatcher
            .with_validator(QueryValidator::new(validation));
        self
    }

    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    pub fn api_key(&self) -> &str {
        self.dispatcher.api_key()
    }

    /// Use another API key for the following requests. Quotas already recorded are kept.
    pub fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        check_api_key(api_key)?;
        self.dispatcher.set_api_key(api_key);
        Ok(())
    }

    /// The quota last reported for `route`, if it was queried already.
    pub fn rate_limit(&self, route: &str) -> Option<RateLimitStatus> {
        self.dispatcher.rate_limits().status(route)
    }

    pub fn rate_limits(&self) -> &RateLimitTracker {
        self.dispatcher.rate_limits()
    }

    /// Performs a request to the route named `route` and maps the response into `R`.
    ///
    /// This is what every endpoint method uses. It's useful on its own to get the raw JSON of a
    /// response, or to pass parameters the typed methods don't know about.
    ///
    /// ```no_run
    /// # use nasapi::client::Client;
    /// # use nasapi::query::Options;
    /// # #[tokio::main]
    /// # async fn main() -> nasapi::error::Result<()> {
    /// let client = Client::new("https://api.nasa.gov", "DEMO_KEY")?;
    ///
    /// let raw: serde_json::Value = client
    ///     .request("apod", &Options::new().set("date", "2021-06-01"))
    ///     .await?;
    ///
    /// println!("{}", raw["title"]);
    /// # Ok(()) }
    /// ```
    pub async fn request<R: FromPayload>(&self, route: &str, options: &Options) -> Result<R> {
        self.dispatcher.request(route, options).await
    }

    /// Downloads the media at `url`, such as the image of an APOD entry.
    #[cfg(feature = "media")]
    pub async fn fetch_media(&self, url: &str) -> Result<Vec<u8>> {
        let url = url::Url::parse(url).map_err(|e| Error::Resource(format!("invalid media URL {:?}: {}", url, e)))?;

        Ok(self.dispatcher.fetch(&url).await?.body)
    }

    /// Downloads the media at `url`. Needs the `media` feature.
    #[cfg(not(feature = "media"))]
    pub async fn fetch_media(&self, _url: &str) -> Result<Vec<u8>> {
        Err(Error::MissingDependency("media"))
    }
}

fn check_api_key(api_key: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(Error::CannotCreateClient(String::from(
            "API key mustn't be empty",
        )));
    }

    Ok(())
}

fn check_base_url(base_url: &str) -> Result<()> {
    url::Url::parse(base_url)
        .map(|_| ())
        .map_err(|e| Error::CannotCreateClient(format!("invalid base URL {:?}: {}", base_url, e)))
}

impl Default for Client {
    /// A client using [`Config::default`], with the public `DEMO_KEY`.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend can't be initialized, like [`reqwest::Client::new`]. Use
    /// [`Client::from_config`] to get that failure as an error instead.
    fn default() -> Self {
        let transport = ReqwestTransport::with_client(default_http_client());
        let config = Config::default();

        Client {
            dispatcher: Dispatcher::new(&config.base_url, &config.api_key, Box::new(transport)),
        }
    }
}

fn default_http_client() -> reqwest::Client {
    use reqwest::header::{self, HeaderMap, HeaderValue};

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route;
    use mockito::{mock, Matcher};
    use serde_json::Value as JsonValue;

    #[test]
    fn client_new() {
        Client::new("https://api.nasa.gov", "DEMO_KEY").unwrap();
    }

    #[test]
    fn client_new_requires_non_empty_api_key() {
        assert!(matches!(
            Client::new("https://api.nasa.gov", ""),
            Err(Error::CannotCreateClient(_))
        ));
    }

    #[test]
    fn client_new_requires_a_valid_base_url() {
        assert!(matches!(
            Client::new("api.nasa.gov", "DEMO_KEY"),
            Err(Error::CannotCreateClient(_))
        ));
    }

    #[test]
    fn from_config_requires_non_empty_user_agent() {
        assert!(matches!(
            Client::from_config(&Config::default().user_agent("")),
            Err(Error::CannotCreateClient(_))
        ));
    }

    #[test]
    fn client_default() {
        let client = Client::default();

        assert_eq!(client.base_url(), "https://api.nasa.gov");
        assert_eq!(client.api_key(), "DEMO_KEY");
        assert!(!format!("{:?}", client).contains("DEMO_KEY"));
    }

    #[test]
    fn set_api_key() {
        let mut client = Client::default();
        assert_eq!(client.api_key(), "DEMO_KEY");

        client.set_api_key("OTHER").unwrap();
        assert_eq!(client.api_key(), "OTHER");
        assert!(client.set_api_key(" ").is_err());
        assert_eq!(client.api_key(), "OTHER");
    }

    #[tokio::test]
    async fn request_injects_the_api_key_and_records_the_quota() {
        let client = Client::new(&mockito::server_url(), "CLIENT_REQUEST").unwrap();

        let _m = mock(
            "GET",
            Matcher::Exact(String::from(
                "/DONKI/CME?api_key=CLIENT_REQUEST&startDate=2021-06-01",
            )),
        )
        .with_header("X-RateLimit-Limit", "1000")
        .with_header("X-RateLimit-Remaining", "999")
        .with_body("[]")
        .create();

        let options = Options::new()
            .set("startDate", "2021-06-01")
            .set("api_key", "SOMEONE_ELSE")
            .set("unknown", "dropped");

        let body: JsonValue = client.request(route::CME, &options).await.unwrap();

        assert_eq!(body, JsonValue::Array(vec![]));
        assert_eq!(
            client.rate_limit(route::CME),
            Some(RateLimitStatus {
                limit: 1000,
                remaining: 999
            })
        );
        assert!(client.rate_limits().window_started(route::CME).is_some());
        assert_eq!(client.rate_limit(route::GST), None);
    }

    #[tokio::test]
    async fn strict_validation_sends_nothing() {
        let client = Client::new(&mockito::server_url(), "CLIENT_STRICT")
            .unwrap()
            .validation(Validation::Strict);

        assert!(matches!(
            client
                .request::<JsonValue>(route::CME, &Options::new().set("bogus", 1))
                .await,
            Err(Error::InvalidQuery { .. })
        ));
    }

    #[cfg(feature = "media")]
    #[tokio::test]
    async fn fetch_media() {
        let client = Client::new(&mockito::server_url(), "CLIENT_MEDIA").unwrap();

        let _m = mock("GET", "/apod/image/2106/picture.jpg")
            .with_header("Content-Type", "image/jpeg")
            .with_body([0xff, 0xd8, 0xff, 0xe0])
            .create();

        let bytes = client
            .fetch_media(&format!("{}/apod/image/2106/picture.jpg", mockito::server_url()))
            .await
            .unwrap();

        assert_eq!(bytes, vec![0xff, 0xd8, 0xff, 0xe0]);
    }

    #[cfg(not(feature = "media"))]
    #[tokio::test]
    async fn fetch_media_needs_the_feature() {
        assert!(matches!(
            Client::default().fetch_media("https://apod.nasa.gov/x.jpg").await,
            Err(Error::MissingDependency("media"))
        ));
    }
}
