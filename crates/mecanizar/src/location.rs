//! Page-location assertions.
//!
//! A generated method can carry an expected location; before acting it
//! checks the delegate's current path+query against it. What happens on a
//! mismatch is an injectable strategy ([`MismatchHandler`]): the default
//! [`HardFail`] aborts the call, specializations may log and continue.

use crate::result::{Error, MacroResult};
use regex::Regex;
use std::fmt;

/// Expected page location: an exact path+query, or a pattern over it.
#[derive(Debug, Clone)]
pub enum LocationAssertion {
    /// The current location must equal this string exactly
    Exact(String),
    /// The current location must match this pattern
    Matches(Regex),
}

impl LocationAssertion {
    /// Assert an exact path+query.
    #[must_use]
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    /// Assert a pattern over the path+query.
    ///
    /// Fails with [`Error::Config`] if the pattern does not compile.
    pub fn matches(pattern: &str) -> MacroResult<Self> {
        Regex::new(pattern).map(Self::Matches).map_err(|e| Error::Config {
            message: format!("bad assertLocation pattern [{pattern}]: {e}"),
        })
    }

    /// An empty assertion is invalid and fails the precondition check.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Exact(s) => s.is_empty(),
            Self::Matches(re) => re.as_str().is_empty(),
        }
    }

    /// Whether `url` satisfies the assertion.
    #[must_use]
    pub fn check(&self, url: &str) -> bool {
        match self {
            Self::Exact(s) => s == url,
            Self::Matches(re) => re.is_match(url),
        }
    }
}

impl fmt::Display for LocationAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => f.write_str(s),
            Self::Matches(re) => f.write_str(re.as_str()),
        }
    }
}

impl From<&str> for LocationAssertion {
    fn from(path: &str) -> Self {
        Self::Exact(path.to_string())
    }
}

impl From<String> for LocationAssertion {
    fn from(path: String) -> Self {
        Self::Exact(path)
    }
}

impl From<Regex> for LocationAssertion {
    fn from(pattern: Regex) -> Self {
        Self::Matches(pattern)
    }
}

/// Strategy invoked when a location assertion does not match.
pub trait MismatchHandler: Send + Sync {
    /// Handle a failed location assertion. Returning `Err` aborts the
    /// in-progress generated-method call.
    fn on_mismatch(&self, assertion: &LocationAssertion, url: &str) -> MacroResult<()>;
}

/// Default policy: a mismatch fails the in-progress call.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardFail;

impl MismatchHandler for HardFail {
    fn on_mismatch(&self, assertion: &LocationAssertion, url: &str) -> MacroResult<()> {
        Err(Error::LocationMismatch {
            assertion: assertion.to_string(),
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod assertion_tests {
        use super::*;

        #[test]
        fn test_exact_requires_equality() {
            let assertion = LocationAssertion::exact("/account");
            assert!(assertion.check("/account"));
            assert!(!assertion.check("/account?tab=1"));
        }

        #[test]
        fn test_pattern_matches_path() {
            let assertion = LocationAssertion::matches(r"^/users/\d+$").unwrap();
            assert!(assertion.check("/users/42"));
            assert!(!assertion.check("/users/abc"));
        }

        #[test]
        fn test_bad_pattern_is_config_error() {
            let err = LocationAssertion::matches("[unclosed").unwrap_err();
            assert!(matches!(err, Error::Config { .. }));
            assert!(err.to_string().contains("[unclosed"));
        }

        #[test]
        fn test_empty_assertions() {
            assert!(LocationAssertion::exact("").is_empty());
            assert!(!LocationAssertion::exact("/").is_empty());
            assert!(LocationAssertion::matches("").unwrap().is_empty());
        }

        #[test]
        fn test_from_str_is_exact() {
            let assertion = LocationAssertion::from("/login");
            assert!(matches!(assertion, LocationAssertion::Exact(_)));
        }
    }

    mod handler_tests {
        use super::*;

        #[test]
        fn test_hard_fail_reports_both_values() {
            let err = HardFail
                .on_mismatch(&LocationAssertion::exact("/want"), "/got")
                .unwrap_err();
            match err {
                Error::LocationMismatch { assertion, url } => {
                    assert_eq!(assertion, "/want");
                    assert_eq!(url, "/got");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        struct Ignore;

        impl MismatchHandler for Ignore {
            fn on_mismatch(&self, _: &LocationAssertion, _: &str) -> MacroResult<()> {
                Ok(())
            }
        }

        #[test]
        fn test_handler_can_downgrade_a_mismatch() {
            assert!(Ignore
                .on_mismatch(&LocationAssertion::exact("/want"), "/got")
                .is_ok());
        }
    }
}
