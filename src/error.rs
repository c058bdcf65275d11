use std::fmt;

use itertools::Itertools;
use thiserror::Error;

/// Result type for `nasapi`, using [`Error`].
pub type Result<T> = ::std::result::Result<T, Error>;

/// Enum for `nasapi` errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The route name isn't part of the route table.
    #[error("unknown route {0:?}")]
    UnknownRoute(String),

    /// Strict validation found query parameters the route doesn't accept.
    #[error("route {route} doesn't support the parameters: {}", join_keys(.keys))]
    InvalidQuery { route: String, keys: Vec<String> },

    /// A placeholder of the route's path template didn't get a value.
    #[error("route {route} requires the `{name}` parameter")]
    MissingParameter { route: String, name: String },

    /// A date argument isn't a valid `YYYY-MM-DD` date.
    #[error("invalid date {0:?}: dates must be formatted as YYYY-MM-DD")]
    InvalidDate(String),

    /// The last known quota for the route is exhausted. No request was sent.
    #[error("rate limit exhausted for route {0}, try again later")]
    RateLimitExceeded(String),

    /// An HTTP error has occurred. The first value is the status code, the second is the reason
    /// given by the API, if available.
    #[error("HTTP error {0}{}", http_reason(.0, .1))]
    Http(u16, Option<String>),

    /// The request couldn't be sent or its response couldn't be received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body isn't valid JSON.
    #[error("couldn't parse the response body: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The response body is JSON but doesn't have the shape the route produces.
    #[error("unexpected response: {0}")]
    Resource(String),

    /// An optional capability was used without the cargo feature providing it.
    #[error("the `{0}` feature is required to use this function")]
    MissingDependency(&'static str),

    /// The client couldn't be created. Contains a description of the error.
    #[error("couldn't create client: {0}")]
    CannotCreateClient(String),

    /// The configuration is invalid. Contains a description of the error.
    #[error("invalid configuration: {0}")]
    Config(String),
}

fn join_keys(keys: &[String]) -> String {
    keys.iter().join(", ")
}

fn http_reason(code: &u16, reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {}", reason),
        // Give em a generic reason
        None => match *code {
            400 => String::from(" Bad Request: The query parameters were rejected"),
            403 => String::from(" Forbidden: The API key is missing or invalid"),
            404 => String::from(" Not Found"),
            429 => String::from(" Too Many Requests: The hourly rate limit of the API key was exceeded"),
            500 => String::from(" Internal Server Error: Some unknown error occurred on the server"),
            502 => String::from(" Bad Gateway: The API gateway received an invalid response"),
            503 => String::from(" Service Unavailable: The service is temporarily unavailable"),
            504 => String::from(" Gateway Timeout: The upstream service didn't answer in time"),
            _ => String::new(),
        },
    }
}

/// Broad category of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection was reset, aborted or closed mid-exchange.
    ConnectionReset,
    /// No connection could be established.
    Connect,
    /// The exchange timed out.
    Timeout,
    /// Anything else (invalid request, TLS, body decoding, ...).
    Other,
}

/// Failure below the HTTP layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport error ({kind:?}): {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl fmt::Display) -> Self {
        TransportError {
            kind,
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Whether sending the same request again may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self.kind, TransportErrorKind::Other)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if io_error_kind(&e).map_or(false, |k| {
            matches!(
                k,
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            )
        }) {
            TransportErrorKind::ConnectionReset
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };

        TransportError::new(kind, e)
    }
}

fn io_error_kind(e: &(dyn std::error::Error + 'static)) -> Option<std::io::ErrorKind> {
    let mut source = e.source();

    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = err.source();
    }

    None
}
