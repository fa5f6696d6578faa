/**
 * Transport layer — HTTP delivery of built hits.
 *
 * - `http` — ureq-based blocking POST to the collection endpoint
 */

pub mod http;

pub use http::{Transport, TransportOptions};
