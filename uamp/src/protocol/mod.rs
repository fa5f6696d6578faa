/*!
 * Protocol layer — field schema, parameter values, and constants.
 *
 * Everything related to *what* we send to the collection endpoint:
 * - `constants` — PROTOCOL_VERSION, COLLECT_URL, defaults
 * - `schema` — the closed table of known parameters and their groups
 * - `value` — typed parameter values and the per-type validators
 * - `client_id` — random client identifiers for the `cid` parameter
 */

pub mod client_id;
pub mod constants;
pub mod schema;
pub mod value;
