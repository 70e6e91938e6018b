//! Error types for the cache.
//!
//! Only construction can fail. A lookup that finds nothing is reported as
//! `None`, never as an error.
//!
//! ```
//! use forgetting_cache::{BoundedEvictionCache, CacheError, EvictionPolicy};
//!
//! let err = BoundedEvictionCache::<u32>::new(0, EvictionPolicy::Recency).unwrap_err();
//! assert!(matches!(err, CacheError::InvalidArgument(_)));
//! ```

use core::fmt;

/// Error returned by fallible cache constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// A construction parameter is out of range. Carries a description of
    /// which parameter failed validation.
    InvalidArgument(&'static str),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
impl std::error::Error for CacheError {}
