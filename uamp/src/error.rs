/**
 * Error types.
 *
 * `HitError` covers everything that can go wrong while assembling a hit;
 * `TransportError` covers delivery. Where an error is downgraded to a log
 * line instead of being returned is decided by the caller: the bulk
 * constructor of `Hit` and `Transport::post` are the only places that do so.
 */
use thiserror::Error;

use crate::protocol::schema::HitType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HitError {
    /// A value failed its type or field-specific rule and was not stored.
    #[error("invalid value for parameter `{key}`: {reason}")]
    Validation { key: String, reason: String },

    /// A parameter every hit needs (`tid`, `cid`, `t`) is not set.
    #[error("missing required parameter: `{key}`")]
    MissingRequired { key: &'static str },

    /// A parameter the current hit type needs is not set.
    #[error("missing required parameter: `{key}` for type `{hit_type}`")]
    MissingRequiredForType {
        key: &'static str,
        hit_type: HitType,
    },
}

impl HitError {
    pub(crate) fn validation(key: impl Into<String>, reason: impl Into<String>) -> Self {
        HitError::Validation {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The parameter key this error is about.
    pub fn key(&self) -> &str {
        match self {
            HitError::Validation { key, .. } => key.as_str(),
            HitError::MissingRequired { key }
            | HitError::MissingRequiredForType { key, .. } => *key,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured endpoint is not a valid absolute URL.
    #[error("invalid collection endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The configured endpoint is not `http` or `https`.
    #[error("unsupported collection endpoint scheme `{0}`")]
    Scheme(String),

    /// The hit could not be turned into a payload; nothing was sent.
    #[error(transparent)]
    Hit(#[from] HitError),

    /// The request never produced an HTTP response (DNS, connect, I/O).
    #[error("failed to send hit: {0}")]
    Request(#[from] ureq::Error),

    /// The collector answered outside the 2xx range.
    #[error("POST of hit failed with HTTP code `{status}`")]
    Status { status: u16, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_key() {
        let err = HitError::MissingRequired { key: "cid" };
        assert_eq!(err.to_string(), "missing required parameter: `cid`");
        assert_eq!(err.key(), "cid");

        let err = HitError::MissingRequiredForType {
            key: "ti",
            hit_type: HitType::Transaction,
        };
        assert_eq!(
            err.to_string(),
            "missing required parameter: `ti` for type `transaction`"
        );

        let err = HitError::validation("sc", "session control must be either `start` or `end`");
        assert_eq!(err.key(), "sc");
        assert!(err.to_string().starts_with("invalid value for parameter `sc`"));
    }

    #[test]
    fn test_transport_error_wraps_hit_error() {
        let err: TransportError = HitError::MissingRequired { key: "tid" }.into();
        assert!(matches!(err, TransportError::Hit(HitError::MissingRequired { key: "tid" })));
        assert_eq!(err.to_string(), "missing required parameter: `tid`");
    }
}
