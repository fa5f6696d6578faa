/*!
 * uamp — Universal Analytics Measurement Protocol v1 client.
 *
 * Builds validated analytics hits and POSTs them to the collection
 * endpoint, one payload at a time.
 *
 * # Quick start
 *
 * ```ignore
 * use serde_json::json;
 *
 * let hit = uamp::Hit::new([
 *     ("tid", json!("UA-XXXX-Y")),
 *     ("cid", json!(uamp::client_id::generate())),
 *     ("t", json!("event")),
 *     ("ec", json!("video")),
 *     ("ea", json!("play")),
 *     ("ev", json!(300)),
 * ]);
 *
 * uamp::post(&hit); // failures are logged, never returned
 * ```
 *
 * # Module structure
 *
 * - `protocol/` — what we send: field schema, value validators, constants
 * - `hit` — the hit builder and its payload
 * - `environment` — injectable clock and request context
 * - `transport/` — how we deliver: blocking HTTP POST
 * - `error` — `HitError`, `TransportError`
 */

mod environment;
mod error;
mod hit;
mod protocol;
mod transport;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use environment::{
    CgiEnvironment, Clock, FixedClock, RequestContext, StaticContext, SystemClock, USER_AGENT_ENV,
};
pub use error::{HitError, TransportError};
pub use hit::{Hit, HitOptions, Payload};
pub use protocol::client_id;
pub use protocol::constants::{
    COLLECT_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_USER_AGENT, PROTOCOL_VERSION,
};
pub use protocol::schema::{
    is_custom_key, lookup, FieldSpec, Group, HitType, Kind, Rule, ALWAYS_REQUIRED, SCHEMA,
};
pub use protocol::value::ParamValue;
pub use transport::{Transport, TransportOptions};

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/**
 * Posts a hit to the public collector with default transport options.
 *
 * The transport lives only for this call. Every failure, including a hit
 * that does not build, is logged with `tracing::warn!` and swallowed.
 */
pub fn post(hit: &Hit) {
    match Transport::new(TransportOptions::default()) {
        Ok(transport) => transport.post(hit),
        Err(err) => tracing::warn!(error = %err, "failed to create transport"),
    }
}
