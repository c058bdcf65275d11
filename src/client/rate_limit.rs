use reqwest::header::HeaderMap;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;
use web_time::Instant;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// The quota last reported by the API for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Requests allowed per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
}

impl RateLimitStatus {
    /// Reads `X-RateLimit-Limit` and `X-RateLimit-Remaining`. Returns `None` if either is absent
    /// or isn't an integer.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| -> Option<u64> { headers.get(name)?.to_str().ok()?.trim().parse().ok() };

        Some(RateLimitStatus {
            limit: read(LIMIT_HEADER)?,
            remaining: read(REMAINING_HEADER)?,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    status: RateLimitStatus,
    window_started: Option<Instant>,
}

/// Last known quota of every route queried so far.
///
/// The lock is never held across an `.await`; updates are single writes made once a response was
/// fully received, so a cancelled request never leaves a half-written entry.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    routes: Mutex<HashMap<String, Entry>>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // Entries are plain values; a panic elsewhere can't leave one torn.
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrites the status of `route`.
    pub fn record(&self, route: &str, status: RateLimitStatus) {
        debug!(
            route,
            limit = status.limit,
            remaining = status.remaining,
            "rate limit observed"
        );

        let now = Instant::now();
        let mut routes = self.lock();
        let previous = routes.get(route).and_then(|e| e.window_started);

        // The first request of a window leaves `limit - 1` requests.
        let window_started = if status.limit.checked_sub(status.remaining) == Some(1) {
            Some(now)
        } else {
            previous
        };

        routes.insert(
            route.to_string(),
            Entry {
                status,
                window_started,
            },
        );
    }

    /// The last status recorded for `route`, or `None` if it was never queried.
    pub fn status(&self, route: &str) -> Option<RateLimitStatus> {
        self.lock().get(route).map(|e| e.status)
    }

    /// Whether the last status recorded for `route` has no request left.
    pub fn is_exhausted(&self, route: &str) -> bool {
        self.status(route).map_or(false, |s| s.is_exhausted())
    }

    /// When the first request of the current quota window of `route` was observed, if it was.
    pub fn window_started(&self, route: &str) -> Option<Instant> {
        self.lock().get(route).and_then(|e| e.window_started)
    }

    /// Forgets everything recorded for `route`.
    pub fn reset(&self, route: &str) {
        self.lock().remove(route);
    }
}
