//! Error type for cache construction.
//!
//! Only configuration problems are errors. Ordinary steady-state outcomes
//! such as a denied admission, a lookup miss or a refused removal are reported
//! through `Option` and `bool` return values instead.

use thiserror::Error;

/// Errors reported when building or re-initializing a cache.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The configuration cannot produce a working cache.
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
