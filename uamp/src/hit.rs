/**
 * The hit builder — accumulates and validates the parameters of one
 * analytics event and renders them into a Measurement Protocol payload.
 *
 * Lifecycle:
 * 1. `Hit::new(params)` / `Hit::with_options(params, options)` creates a hit
 *    from an initial mapping. Invalid entries are logged and skipped, unknown
 *    keys are dropped.
 * 2. `Hit::set()` and the numbered custom dimension/metric setters mutate the
 *    hit; these return the validation error to the caller instead.
 * 3. `Hit::build()` checks the required parameters and renders the payload.
 *
 * Values are stored in a slot per `SCHEMA` row, so building is a walk over
 * the table in wire order with no sorting involved.
 */
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use tracing::{trace, warn};
use url::form_urlencoded;

use crate::environment::{CgiEnvironment, Clock, RequestContext, SystemClock};
use crate::error::HitError;
use crate::protocol::constants::{DEFAULT_USER_AGENT, PROTOCOL_VERSION};
use crate::protocol::schema::{self, HitType, ALWAYS_REQUIRED, SCHEMA};
use crate::protocol::value::{self, ParamValue};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/**
 * Construction options for a `Hit`.
 *
 * # Example
 * ```ignore
 * let hit = uamp::Hit::with_options(params, uamp::HitOptions {
 *     user_agent: Some("Mozilla/5.0 (X11; Linux x86_64)".into()),
 *     ..Default::default()
 * });
 * ```
 */
pub struct HitOptions {
    /// Explicit user agent. When `None`, `context` is asked, then
    /// `DEFAULT_USER_AGENT` is used.
    pub user_agent: Option<String>,

    /// Explicit capture time. When `None`, `clock` is asked.
    pub timestamp: Option<DateTime<Utc>>,

    pub clock: Arc<dyn Clock>,
    pub context: Arc<dyn RequestContext>,
}

impl Default for HitOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            timestamp: None,
            clock: Arc::new(SystemClock),
            context: Arc::new(CgiEnvironment),
        }
    }
}

// ---------------------------------------------------------------------------
// Hit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// One slot per `SCHEMA` row, same order.
    values: Vec<Option<ParamValue>>,

    /// Custom dimensions/metrics in first-set order.
    custom: Vec<(String, String)>,

    user_agent: String,
    timestamp: DateTime<Utc>,
}

impl Default for Hit {
    fn default() -> Self {
        Self::blank(HitOptions::default())
    }
}

impl Hit {
    /**
     * Creates a hit from an initial parameter mapping using the default
     * collaborators (system clock, CGI user agent).
     *
     * # Example
     * ```ignore
     * let hit = Hit::new([("tid", "UA-1-1"), ("cid", "abc"), ("t", "pageview")]);
     * assert_eq!(hit.build()?, "v=1&tid=UA-1-1&cid=abc&t=pageview");
     * ```
     */
    pub fn new<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Self::with_options(params, HitOptions::default())
    }

    /**
     * Creates a hit from an initial parameter mapping.
     *
     * Entries that fail validation are logged with `tracing::warn!` and
     * skipped; use `assign_all` on a default hit to get them back instead.
     */
    pub fn with_options<I, K, V>(params: I, options: HitOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut hit = Self::blank(options);

        for err in hit.assign_all(params) {
            warn!(key = err.key(), error = %err, "skipping invalid hit parameter");
        }

        hit
    }

    fn blank(options: HitOptions) -> Self {
        let user_agent = options
            .user_agent
            .or_else(|| options.context.user_agent())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let timestamp = options
            .timestamp
            .unwrap_or_else(|| options.clock.now())
            .trunc_subsecs(6);

        Self {
            values: vec![None; SCHEMA.len()],
            custom: Vec::new(),
            user_agent,
            timestamp,
        }
    }

    /**
     * Assigns every entry of `params`, continuing past failures.
     *
     * Returns the errors of the entries that were rejected; the hit keeps
     * whatever value those keys had before.
     */
    pub fn assign_all<I, K, V>(&mut self, params: I) -> Vec<HitError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        params
            .into_iter()
            .filter_map(|(key, value)| self.set(key.as_ref(), value).err())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /**
     * Sets one parameter.
     *
     * - Schema keys are validated against their kind and rule; a rejected
     *   value returns `HitError::Validation` and leaves the hit unchanged.
     * - Custom dimension/metric keys (`cd1`..`cm999`) take any scalar.
     * - Any other key is ignored and `Ok` is returned.
     */
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<&mut Self, HitError> {
        let value = value.into();

        if let Some((index, spec)) = schema::lookup(key) {
            match value::validate(spec, &value) {
                Ok(Some(stored)) => self.values[index] = Some(stored),
                Ok(None) => trace!(key = spec.key, "skipping negative value"),
                Err(reason) => return Err(HitError::validation(spec.key, reason)),
            }
        } else if schema::is_custom_key(key) {
            let text =
                value::free_text(&value).map_err(|reason| HitError::validation(key, reason))?;
            self.put_custom(key.to_string(), text);
        } else {
            trace!(key, "ignoring unknown hit parameter");
        }

        Ok(self)
    }

    /// Sets custom dimension `cd<index>`. The value must be non-empty text.
    pub fn set_custom_dimension(
        &mut self,
        index: u32,
        value: impl Into<Value>,
    ) -> Result<&mut Self, HitError> {
        self.set_numbered("cd", index, value.into())
    }

    /// Sets custom metric `cm<index>`. The value must be non-empty text.
    pub fn set_custom_metric(
        &mut self,
        index: u32,
        value: impl Into<Value>,
    ) -> Result<&mut Self, HitError> {
        self.set_numbered("cm", index, value.into())
    }

    /*
     * The index is held to the same 1-3 digit pattern the bulk path matches,
     * so `set_custom_dimension(1234, ..)` is rejected rather than producing a
     * key that `set("cd1234", ..)` would have dropped.
     */
    fn set_numbered(
        &mut self,
        prefix: &str,
        index: u32,
        value: Value,
    ) -> Result<&mut Self, HitError> {
        let key = format!("{prefix}{index}");

        if !schema::is_custom_key(&key) {
            return Err(HitError::validation(
                key,
                format!(
                    "custom dimension/metric index must have at most {} digits",
                    schema::CUSTOM_INDEX_MAX_DIGITS
                ),
            ));
        }

        let text = value::text(&value).map_err(|reason| HitError::validation(&key, reason))?;
        self.put_custom(key, text);

        Ok(self)
    }

    fn put_custom(&mut self, key: String, text: String) {
        match self.custom.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = text,
            None => self.custom.push((key, text)),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Wire rendering of a stored parameter, e.g. `get("aip") == Some("1")`.
    pub fn get(&self, key: &str) -> Option<String> {
        match schema::lookup(key) {
            Some((index, _)) => self.values[index].as_ref().map(ToString::to_string),
            None => self
                .custom
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
        }
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn hit_type(&self) -> Option<HitType> {
        self.get("t").and_then(|t| t.parse().ok())
    }

    /// User agent the transport sends this hit with.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// When the hit was captured.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Custom dimensions and metrics in first-set order.
    pub fn custom(&self) -> impl Iterator<Item = (&str, &str)> {
        self.custom.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /**
     * Collects the set parameters in wire order and checks the required
     * ones.
     *
     * # Errors
     * `HitError::MissingRequired` when `tid`, `cid` or `t` is absent, and
     * `HitError::MissingRequiredForType` when the hit type needs a key that
     * is absent (`ti` for transactions, `ti` + `in` for items, `sn` + `sa` +
     * `st` for social interactions).
     */
    pub fn payload(&self) -> Result<Payload, HitError> {
        for key in ALWAYS_REQUIRED {
            if !self.is_set(key) {
                return Err(HitError::MissingRequired { key });
            }
        }

        if let Some(hit_type) = self.hit_type() {
            for &key in hit_type.required_keys() {
                if !self.is_set(key) {
                    return Err(HitError::MissingRequiredForType { key, hit_type });
                }
            }
        }

        let mut pairs: Vec<(String, String)> = SCHEMA
            .iter()
            .zip(&self.values)
            .filter_map(|(spec, value)| {
                value
                    .as_ref()
                    .map(|value| (spec.key.to_string(), value.to_string()))
            })
            .collect();
        pairs.extend(self.custom.iter().cloned());

        Ok(Payload { pairs })
    }

    /// Renders the URL-encoded payload string, e.g.
    /// `v=1&tid=UA-1-1&cid=abc&t=pageview`.
    pub fn build(&self) -> Result<String, HitError> {
        Ok(self.payload()?.to_string())
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/**
 * A built hit: the ordered key/value pairs of the payload, before encoding.
 * `Display` renders the wire form with the protocol version in front.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pairs: Vec<(String, String)>,
}

impl Payload {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .append_pair("v", &PROTOCOL_VERSION.to_string())
            .extend_pairs(&self.pairs)
            .finish();
        f.write_str(&encoded)
    }
}
