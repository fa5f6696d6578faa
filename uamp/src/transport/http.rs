/*!
 * HTTP transport for delivering hits to the collection endpoint.
 *
 * Uses `ureq` — a pure-Rust blocking HTTP client with no async runtime.
 * A hit is a single small form POST, so blocking the caller is fine.
 *
 * Design decisions:
 * - **Best-effort delivery** — `post` logs failures with `tracing::warn!`
 *   and never propagates them. Analytics must never crash the host
 *   application. `try_post` is there for callers who want the error.
 * - **Single attempt** — no retries, no queueing.
 */

use std::time::Duration;

use tracing::{debug, warn};
use ureq::Agent;
use url::Url;

use crate::error::TransportError;
use crate::hit::Hit;
use crate::protocol::constants::{COLLECT_URL, DEFAULT_CONNECT_TIMEOUT};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/**
 * Transport configuration. `Default` targets the public collector.
 */
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Collection URL hits are POSTed to.
    pub endpoint: String,

    /// Upper bound on establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            endpoint: COLLECT_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/**
 * Thin wrapper around `ureq::Agent` that POSTs built hits.
 *
 * The endpoint is fixed at construction. A `Transport` holds no per-hit
 * state and can be shared by reference between threads.
 */
pub struct Transport {
    agent: Agent,
    endpoint: String,
}

impl Transport {
    /**
     * Creates a transport from `options`.
     *
     * Non-2xx responses are inspected by `try_post` rather than surfaced
     * as ureq errors.
     *
     * # Errors
     * `TransportError::Endpoint` if the endpoint is not an absolute
     * `http`/`https` URL.
     */
    pub fn new(options: TransportOptions) -> Result<Self, TransportError> {
        let url = Url::parse(&options.endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::Scheme(url.scheme().to_string()));
        }

        let agent: Agent = Agent::config_builder()
            .timeout_connect(Some(options.connect_timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            endpoint: options.endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /**
     * Builds `hit` and POSTs it once.
     *
     * The payload is the request body and `hit.user_agent()` the
     * `User-Agent` header.
     *
     * # Returns
     * The HTTP status on a 2xx response.
     *
     * # Errors
     * - `TransportError::Hit` if the hit fails to build (nothing is sent).
     * - `TransportError::Request` if no response was received.
     * - `TransportError::Status` for any status outside 2xx.
     */
    pub fn try_post(&self, hit: &Hit) -> Result<u16, TransportError> {
        let payload = hit.build()?;

        debug!(endpoint = %self.endpoint, bytes = payload.len(), "posting hit");

        let response = self
            .agent
            .post(&self.endpoint)
            .header("User-Agent", hit.user_agent())
            .header("Content-Type", FORM_CONTENT_TYPE)
            .send(payload.as_str())?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "<unreadable body>".into());
            return Err(TransportError::Status { status, body });
        }

        Ok(status)
    }

    /**
     * Fire-and-forget delivery: like `try_post`, but every failure is
     * downgraded to a `tracing::warn!` and swallowed.
     */
    pub fn post(&self, hit: &Hit) {
        match self.try_post(hit) {
            Ok(status) => debug!(status, "hit delivered"),
            Err(TransportError::Status { status, body }) => {
                warn!(status, body = %body, "POST of hit failed with HTTP code `{status}`");
            }
            Err(err) => warn!(error = %err, "failed to deliver hit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_target_collector() {
        let options = TransportOptions::default();
        assert_eq!(options.endpoint, "http://www.google-analytics.com/collect");
        assert_eq!(options.connect_timeout, Duration::from_secs(2));

        let transport = Transport::new(options).expect("default endpoint is valid");
        assert_eq!(transport.endpoint(), COLLECT_URL);
    }

    #[test]
    fn test_rejects_invalid_endpoints() {
        let relative = TransportOptions {
            endpoint: "/collect".into(),
            ..Default::default()
        };
        assert!(matches!(
            Transport::new(relative),
            Err(TransportError::Endpoint(_))
        ));

        let ftp = TransportOptions {
            endpoint: "ftp://example.com/collect".into(),
            ..Default::default()
        };
        assert!(matches!(Transport::new(ftp), Err(TransportError::Scheme(s)) if s == "ftp"));
    }

    #[test]
    fn test_unbuildable_hit_is_not_sent() {
        let transport = Transport::new(TransportOptions {
            // Nothing listens here; a request would fail with `Request`.
            endpoint: "http://127.0.0.1:9/collect".into(),
            ..Default::default()
        })
        .unwrap();

        let hit = Hit::new([("tid", "UA-1-1")]);
        assert!(matches!(
            transport.try_post(&hit),
            Err(TransportError::Hit(_))
        ));
    }
}
