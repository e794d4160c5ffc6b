//! Error types for the cacheplex library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned by fallible constructors when a tunable is out
//!   of range (e.g. an LFU aging interval of zero).
//! - [`InvariantError`]: Returned by `check_invariants` when an engine's
//!   internal bookkeeping disagrees with itself. Seeing one is a bug in this
//!   crate, not a condition callers are expected to recover from.
//!
//! A missing key is never an error, and neither is a capacity of zero: such an
//! engine simply retains nothing.
//!
//! ## Example Usage
//!
//! ```
//! use cacheplex::error::ConfigError;
//! use cacheplex::policy::lfu::{AgingTrigger, LfuCache, LfuConfig};
//!
//! let ok: Result<LfuCache<u64, u64>, ConfigError> =
//!     LfuCache::try_with_config(100, LfuConfig::default());
//! assert!(ok.is_ok());
//!
//! let config = LfuConfig {
//!     aging: AgingTrigger::Operations { interval: 0 },
//!     ..LfuConfig::default()
//! };
//! let err = LfuCache::<u64, u64>::try_with_config(100, config).unwrap_err();
//! assert!(err.to_string().contains("interval"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when a cache tunable is invalid.
///
/// Produced by [`LfuCache::try_with_config`](crate::policy::lfu::LfuCache::try_with_config)
/// and [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Shorthand for a parameter that must be strictly positive.
    pub(crate) fn must_be_positive(param: &str) -> Self {
        Self(format!("{param} must be > 0"))
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an engine's internal structures are inconsistent.
///
/// Carries a description of the first invariant found broken, e.g.
/// `"T1 + B1 (12) exceeds capacity (10)"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

/// Returns an [`InvariantError`] built from a format string unless `cond` holds.
macro_rules! ensure_invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::InvariantError::new(format!($($arg)+)));
        }
    };
}
pub(crate) use ensure_invariant;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
