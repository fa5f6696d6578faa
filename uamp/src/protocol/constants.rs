/**
 * Protocol-wide constants.
 *
 * These values identify the Measurement Protocol version and the collection
 * endpoint every hit is delivered to.
 */
use std::time::Duration;

/// Measurement Protocol version. Prepended as `v=1` to every payload and
/// only changes on backwards-incompatible protocol revisions.
pub const PROTOCOL_VERSION: u8 = 1;

/// The collection endpoint hits are POSTed to.
pub const COLLECT_URL: &str = "http://www.google-analytics.com/collect";

/// User agent used when neither the caller nor the request context supplies one.
/// Derived at compile time from the `uamp` package version in `Cargo.toml`.
pub const DEFAULT_USER_AGENT: &str = concat!("uamp-rust/", env!("CARGO_PKG_VERSION"));

/// Connect timeout applied by `Transport` unless overridden.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
