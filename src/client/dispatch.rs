use super::backoff::{sleep, RetryPolicy};
use super::rate_limit::{RateLimitStatus, RateLimitTracker};
use super::transport::{RawResponse, Transport};
use crate::error::{Error, Result};
use crate::query::{Options, QueryValidator};
use crate::resource::{FromPayload, Payload, ResponseMeta};
use crate::route::Route;

use derivative::Derivative;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Runs requests end to end: route lookup, quota check, URL building, retries and response
/// mapping.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Dispatcher {
    base_url: String,
    #[derivative(Debug = "ignore")]
    api_key: String,
    validator: QueryValidator,
    retry: RetryPolicy,
    rate_limits: RateLimitTracker,
    #[derivative(Debug = "ignore")]
    transport: Box<dyn Transport>,
}

impl Dispatcher {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Dispatcher {
            base_url: base_url.into(),
            api_key: api_key.into(),
            validator: QueryValidator::default(),
            retry: RetryPolicy::default(),
            rate_limits: RateLimitTracker::new(),
            transport,
        }
    }

    pub fn with_validator(mut self, validator: QueryValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn validator(&self) -> QueryValidator {
        self.validator
    }

    pub fn rate_limits(&self) -> &RateLimitTracker {
        &self.rate_limits
    }

    /// The full URL `route` would be queried with, `api_key` included.
    pub fn url_for(&self, route: &Route, options: &Options) -> Result<Url> {
        self.validator
            .validate(route, options, &self.api_key)?
            .to_url(&self.base_url)
    }

    /// Performs a request to the route named `name` and maps its response into `R`.
    ///
    /// Fails without sending anything if the route is unknown, if its last known quota is
    /// exhausted or if the options are invalid. Transient transport failures and server errors
    /// are retried with exponential backoff; other failures are returned right away.
    #[instrument(skip(self, options), fields(route = %name))]
    pub async fn request<R: FromPayload>(&self, name: &str, options: &Options) -> Result<R> {
        let route = Route::lookup(name).ok_or_else(|| Error::UnknownRoute(name.to_string()))?;

        if self.rate_limits.is_exhausted(route.name) {
            warn!("quota exhausted, request not sent");
            return Err(Error::RateLimitExceeded(route.name.to_string()));
        }

        let url = self.url_for(route, options)?;
        debug!(path = url.path(), query = ?url.query(), "built request URL");

        let attempts = self.retry.attempts();
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = self.retry.delay(attempt);
                warn!(attempt, ?delay, "retrying request");
                sleep(delay).await;
            }

            let last = attempt + 1 >= attempts;

            match self.transport.get(&url).await {
                Ok(response) if response.status.is_success() => {
                    return self.complete(route, &url, response);
                }
                Ok(response) => {
                    let code = response.status.as_u16();

                    if last || !is_retryable(response.status) {
                        error!(code, attempt, "request failed");
                        return Err(Error::Http(code, api_message(&response.body)));
                    }

                    warn!(code, attempt, "request failed");
                }
                Err(e) => {
                    if last || !e.is_transient() {
                        error!(error = %e, attempt, "request failed");
                        return Err(e.into());
                    }

                    warn!(error = %e, attempt, "request failed");
                }
            }

            attempt += 1;
        }
    }

    fn complete<R: FromPayload>(
        &self,
        route: &'static Route,
        url: &Url,
        response: RawResponse,
    ) -> Result<R> {
        let data = if response.body.iter().all(u8::is_ascii_whitespace) {
            JsonValue::Null
        } else {
            serde_json::from_slice(&response.body)?
        };

        if let Some(status) = RateLimitStatus::from_headers(&response.headers) {
            self.rate_limits.record(route.name, status);
        }

        R::from_payload(Payload {
            data,
            meta: ResponseMeta {
                code: response.status.as_u16(),
                query_url: url.to_string(),
                route: route.name,
            },
        })
    }

    /// Downloads `url` as is, in a single attempt.
    pub async fn fetch(&self, url: &Url) -> Result<RawResponse> {
        let response = self.transport.get(url).await?;

        if response.status.is_success() {
            Ok(response)
        } else {
            Err(Error::Http(
                response.status.as_u16(),
                api_message(&response.body),
            ))
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Extracts the error message of an API error body, if there is one.
fn api_message(body: &[u8]) -> Option<String> {
    let v: JsonValue = serde_json::from_slice(body).ok()?;

    [
        &v["error"]["message"],
        &v["msg"],
        &v["error_message"],
        &v["error"],
    ]
    .iter()
    .find_map(|m| m.as_str())
    .map(String::from)
}
