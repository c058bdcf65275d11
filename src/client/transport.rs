use crate::error::{Error, Result, TransportError};

#[cfg(not(target_family = "wasm"))]
use futures::future::BoxFuture;
#[cfg(target_family = "wasm")]
use futures::future::LocalBoxFuture;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use url::Url;

/// A complete HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        RawResponse {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// Future returned by [`Transport::get`].
#[cfg(not(target_family = "wasm"))]
pub type TransportFuture<'a> = BoxFuture<'a, std::result::Result<RawResponse, TransportError>>;

/// Future returned by [`Transport::get`]. Browser futures aren't `Send`.
#[cfg(target_family = "wasm")]
pub type TransportFuture<'a> = LocalBoxFuture<'a, std::result::Result<RawResponse, TransportError>>;

/// Sends GET requests on behalf of the dispatcher.
///
/// The response must be complete when the future resolves: a dropped future must not leave
/// anything half-read behind.
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, url: &'a Url) -> TransportFuture<'a>;
}

/// [`Transport`] backed by a `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a connection pool sending `user_agent` with every request.
    pub fn new(user_agent: impl AsRef<[u8]>) -> Result<Self> {
        if user_agent.as_ref() == b"" {
            return Err(Error::CannotCreateClient(String::from(
                "User Agent mustn't be empty",
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_bytes(user_agent.as_ref())
                .map_err(|e| Error::CannotCreateClient(format!("Invalid header value: {}", e)))?,
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        match reqwest::Client::builder().default_headers(headers).build() {
            Ok(c) => Ok(ReqwestTransport { client: c }),
            Err(e) => Err(Error::CannotCreateClient(format!("{:?}", e))),
        }
    }

    /// Uses a connection pool owned by the caller.
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Transport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a Url) -> TransportFuture<'a> {
        Box::pin(async move {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;

            Ok(RawResponse::new(status, headers, body.to_vec()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_new() {
        ReqwestTransport::new(b"nasapi/unit_test").unwrap();
    }

    #[test]
    fn transport_new_requires_non_empty_user_agent() {
        assert!(matches!(
            ReqwestTransport::new(b""),
            Err(Error::CannotCreateClient(_))
        ));
    }
}
