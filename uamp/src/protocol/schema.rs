/**
 * The closed parameter schema.
 *
 * Every parameter the builder knows about is described by one `FieldSpec`
 * row in `SCHEMA`. The table order is the wire order: rows are grouped by
 * `Group` (in `Group::ALL` order) and, inside a group, listed in the order
 * the collector documents them.
 *
 * Custom dimensions and metrics are the only open-ended keys; they are not
 * in the table and are recognized by `is_custom_key` instead.
 */
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/**
 * Semantic parameter groups. Grouping only decides payload ordering.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    General,
    Visitor,
    Session,
    TrafficSources,
    System,
    Hit,
    ContentInformation,
    AppTracking,
    EventTracking,
    ECommerce,
    SocialInteractions,
    Timing,
    Exceptions,
    CustomDimensionsMetrics,
}

impl Group {
    /// All groups in payload order.
    pub const ALL: [Group; 14] = [
        Group::General,
        Group::Visitor,
        Group::Session,
        Group::TrafficSources,
        Group::System,
        Group::Hit,
        Group::ContentInformation,
        Group::AppTracking,
        Group::EventTracking,
        Group::ECommerce,
        Group::SocialInteractions,
        Group::Timing,
        Group::Exceptions,
        Group::CustomDimensionsMetrics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::General => "general",
            Group::Visitor => "visitor",
            Group::Session => "session",
            Group::TrafficSources => "traffic_sources",
            Group::System => "system",
            Group::Hit => "hit",
            Group::ContentInformation => "content_information",
            Group::AppTracking => "app_tracking",
            Group::EventTracking => "event_tracking",
            Group::ECommerce => "e_commerce",
            Group::SocialInteractions => "social_interactions",
            Group::Timing => "timing",
            Group::Exceptions => "exceptions",
            Group::CustomDimensionsMetrics => "custom_dimensions_metrics",
        }
    }
}

// ---------------------------------------------------------------------------
// Field descriptors
// ---------------------------------------------------------------------------

/// Declared value type of a field. Each kind has one generic validator in
/// `protocol::value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Boolean,
    Integer,
    Currency,
}

/// Field-specific rule applied on top of the kind's validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    None,
    /// Value must name one of the `HitType` variants.
    HitType,
    /// Value must be `start` or `end`.
    SessionControl,
    /// Negative numbers are skipped without error.
    NonNegative,
}

/**
 * One row of the schema table.
 */
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire key, e.g. `"tid"`.
    pub key: &'static str,

    /// Human-readable parameter name, used in error messages and docs.
    pub name: &'static str,

    pub group: Group,
    pub kind: Kind,
    pub rule: Rule,
}

const fn field(key: &'static str, name: &'static str, group: Group, kind: Kind) -> FieldSpec {
    FieldSpec {
        key,
        name,
        group,
        kind,
        rule: Rule::None,
    }
}

const fn ruled(
    key: &'static str,
    name: &'static str,
    group: Group,
    kind: Kind,
    rule: Rule,
) -> FieldSpec {
    FieldSpec {
        key,
        name,
        group,
        kind,
        rule,
    }
}

use Group as G;
use Kind as K;

/// Every known parameter, in payload order.
pub static SCHEMA: &[FieldSpec] = &[
    field("tid", "Tracking ID", G::General, K::Text),
    field("aip", "Anonymize IP", G::General, K::Boolean),
    ruled("qt", "Queue Time", G::General, K::Integer, Rule::NonNegative),
    field("z", "Cache Buster", G::General, K::Text),
    field("cid", "Client ID", G::Visitor, K::Text),
    ruled("sc", "Session Control", G::Session, K::Text, Rule::SessionControl),
    field("dr", "Document Referrer", G::TrafficSources, K::Text),
    field("cn", "Campaign Name", G::TrafficSources, K::Text),
    field("cs", "Campaign Source", G::TrafficSources, K::Text),
    field("cm", "Campaign Medium", G::TrafficSources, K::Text),
    field("ck", "Campaign Keyword", G::TrafficSources, K::Text),
    field("cc", "Campaign Content", G::TrafficSources, K::Text),
    field("ci", "Campaign ID", G::TrafficSources, K::Text),
    field("gclid", "Google AdWords ID", G::TrafficSources, K::Text),
    field("dclid", "Google Display Ads ID", G::TrafficSources, K::Text),
    field("sr", "Screen Resolution", G::System, K::Text),
    field("vp", "Viewport Size", G::System, K::Text),
    field("de", "Document Encoding", G::System, K::Text),
    field("sd", "Screen Colors", G::System, K::Text),
    field("ul", "User Language", G::System, K::Text),
    field("je", "Java Enabled", G::System, K::Boolean),
    field("fl", "Flash Version", G::System, K::Text),
    ruled("t", "Hit Type", G::Hit, K::Text, Rule::HitType),
    field("ni", "Non-Interaction Hit", G::Hit, K::Boolean),
    field("dl", "Document Location URL", G::ContentInformation, K::Text),
    field("dh", "Document Host Name", G::ContentInformation, K::Text),
    field("dp", "Document Path", G::ContentInformation, K::Text),
    field("dt", "Document Title", G::ContentInformation, K::Text),
    field("cd", "Content Description", G::ContentInformation, K::Text),
    field("an", "Application Name", G::AppTracking, K::Text),
    field("av", "Application Version", G::AppTracking, K::Text),
    field("ec", "Event Category", G::EventTracking, K::Text),
    field("ea", "Event Action", G::EventTracking, K::Text),
    field("el", "Event Label", G::EventTracking, K::Text),
    field("ev", "Event Value", G::EventTracking, K::Integer),
    field("ti", "Transaction ID", G::ECommerce, K::Text),
    field("ta", "Transaction Affiliation", G::ECommerce, K::Text),
    field("tr", "Transaction Revenue", G::ECommerce, K::Currency),
    field("ts", "Transaction Shipping", G::ECommerce, K::Currency),
    field("tt", "Transaction Tax", G::ECommerce, K::Currency),
    field("in", "Item Name", G::ECommerce, K::Text),
    field("ip", "Item Price", G::ECommerce, K::Currency),
    field("iq", "Item Quantity", G::ECommerce, K::Integer),
    field("ic", "Item Code", G::ECommerce, K::Text),
    field("iv", "Item Category", G::ECommerce, K::Text),
    field("cu", "Currency Code", G::ECommerce, K::Text),
    field("sn", "Social Network", G::SocialInteractions, K::Text),
    field("sa", "Social Action", G::SocialInteractions, K::Text),
    field("st", "Social Action Target", G::SocialInteractions, K::Text),
    field("utc", "User Timing Category", G::Timing, K::Text),
    field("utv", "User Timing Variable Name", G::Timing, K::Text),
    field("utt", "User Timing Time", G::Timing, K::Integer),
    field("utl", "User Timing Label", G::Timing, K::Text),
    field("plt", "Page Load Time", G::Timing, K::Integer),
    field("dns", "DNS Time", G::Timing, K::Integer),
    field("pdt", "Page Download Time", G::Timing, K::Integer),
    field("rrt", "Redirect Response Time", G::Timing, K::Integer),
    field("tcp", "TCP Connect Time", G::Timing, K::Integer),
    field("srt", "Server Response Time", G::Timing, K::Integer),
    field("exd", "Exception Description", G::Exceptions, K::Text),
    field("exf", "Is Exception Fatal", G::Exceptions, K::Boolean),
];

/// Keys every hit must carry.
pub const ALWAYS_REQUIRED: [&str; 3] = ["tid", "cid", "t"];

/**
 * Looks up a schema row by key, returning its position in `SCHEMA` too.
 *
 * Matching is ASCII-case-insensitive, so `"TID"` and `"tid"` are the same
 * parameter.
 */
pub fn lookup(key: &str) -> Option<(usize, &'static FieldSpec)> {
    SCHEMA
        .iter()
        .enumerate()
        .find(|(_, spec)| spec.key.eq_ignore_ascii_case(key))
}

/// Maximum number of digits in a custom dimension/metric index.
pub const CUSTOM_INDEX_MAX_DIGITS: usize = 3;

/**
 * Returns `true` for custom dimension/metric keys: `cd` or `cm` followed by
 * one to three ASCII digits (`cd1`, `cm42`, `cd200`). Case-sensitive.
 */
pub fn is_custom_key(key: &str) -> bool {
    let digits = match key.strip_prefix("cd").or_else(|| key.strip_prefix("cm")) {
        Some(rest) => rest,
        None => return false,
    };

    (1..=CUSTOM_INDEX_MAX_DIGITS).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// HitType
// ---------------------------------------------------------------------------

/**
 * The accepted values of the `t` parameter.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitType {
    Pageview,
    Appview,
    Event,
    Transaction,
    Item,
    Social,
    Exception,
    Timing,
}

impl HitType {
    pub const ALL: [HitType; 8] = [
        HitType::Pageview,
        HitType::Appview,
        HitType::Event,
        HitType::Transaction,
        HitType::Item,
        HitType::Social,
        HitType::Exception,
        HitType::Timing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HitType::Pageview => "pageview",
            HitType::Appview => "appview",
            HitType::Event => "event",
            HitType::Transaction => "transaction",
            HitType::Item => "item",
            HitType::Social => "social",
            HitType::Exception => "exception",
            HitType::Timing => "timing",
        }
    }

    /// Keys required in addition to `ALWAYS_REQUIRED` for this hit type.
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            HitType::Transaction => &["ti"],
            HitType::Item => &["ti", "in"],
            HitType::Social => &["sn", "sa", "st"],
            _ => &[],
        }
    }
}

impl fmt::Display for HitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HitType {
    type Err = String;

    /// Exact, case-sensitive match against the protocol names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HitType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = HitType::ALL.iter().map(HitType::as_str).collect();
                format!("hit type must be one of: {}", names.join(", "))
            })
    }
}
