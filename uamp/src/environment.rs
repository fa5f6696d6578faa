/**
 * Collaborators a `Hit` reads its defaults from.
 *
 * - `Clock` supplies the capture timestamp.
 * - `RequestContext` supplies the user agent of the request being tracked.
 *
 * Both are traits so tests and embedding servers can inject their own;
 * `SystemClock` and `CgiEnvironment` are the defaults.
 */
use chrono::{DateTime, SubsecRound, Utc};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to microseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// RequestContext
// ---------------------------------------------------------------------------

pub trait RequestContext: Send + Sync {
    /// User agent of the inbound request, if one is known.
    fn user_agent(&self) -> Option<String>;
}

/// Environment variable CGI servers use to pass the inbound user agent.
pub const USER_AGENT_ENV: &str = "HTTP_USER_AGENT";

/**
 * Reads the user agent from the CGI `HTTP_USER_AGENT` environment variable.
 * Blank values count as absent.
 */
#[derive(Debug, Default, Clone, Copy)]
pub struct CgiEnvironment;

impl RequestContext for CgiEnvironment {
    fn user_agent(&self) -> Option<String> {
        std::env::var(USER_AGENT_ENV)
            .ok()
            .filter(|ua| !ua.trim().is_empty())
    }
}

/// A request context with a known user agent (or none).
#[derive(Debug, Default, Clone)]
pub struct StaticContext {
    pub user_agent: Option<String>,
}

impl StaticContext {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
        }
    }
}

impl RequestContext for StaticContext {
    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn test_system_clock_has_microsecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2014, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }

    /** Only test touching `HTTP_USER_AGENT`, so the set/remove sequence cannot race. */
    #[test]
    fn test_cgi_environment_reads_user_agent() {
        std::env::set_var(USER_AGENT_ENV, "Mozilla/5.0 (CGI)");
        assert_eq!(
            CgiEnvironment.user_agent().as_deref(),
            Some("Mozilla/5.0 (CGI)")
        );

        std::env::set_var(USER_AGENT_ENV, "   ");
        assert_eq!(CgiEnvironment.user_agent(), None);

        std::env::remove_var(USER_AGENT_ENV);
        assert_eq!(CgiEnvironment.user_agent(), None);
    }

    #[test]
    fn test_static_context() {
        assert_eq!(
            StaticContext::new("Mozilla/5.0").user_agent().as_deref(),
            Some("Mozilla/5.0")
        );
        assert_eq!(StaticContext::default().user_agent(), None);
    }
}
