//! Configuration for the multi-tenant cache.
//!
//! # Examples
//!
//! ```
//! use pincache::config::SharedPinnedLfuConfig;
//! use pincache::SharedPinnedLfuCache;
//!
//! let config = SharedPinnedLfuConfig {
//!     tenants: vec![("journal", 64), ("index", 256)],
//! };
//! let cache: SharedPinnedLfuCache<&str, u64, Vec<u8>> =
//!     SharedPinnedLfuCache::init(config, None).unwrap();
//! assert_eq!(cache.capacity(), 320);
//! ```

extern crate alloc;

use crate::error::{Error, Result};
use alloc::vec::Vec;
use core::fmt;

/// Configuration for a [`SharedPinnedLfuCache`](crate::SharedPinnedLfuCache).
///
/// # Fields
///
/// - `tenants`: one `(tag, capacity)` pair per tenant. Tags must be unique
///   and every capacity must be greater than zero.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedPinnedLfuConfig<T> {
    /// Tenant tags with their starting capacities
    pub tenants: Vec<(T, usize)>,
}

impl<T: PartialEq> SharedPinnedLfuConfig<T> {
    /// Checks that every tenant can be built and that no tag repeats.
    pub fn validate(&self) -> Result<()> {
        if self.tenants.is_empty() {
            return Err(Error::InvalidConfig("at least one tenant is required"));
        }
        for (i, (tag, capacity)) in self.tenants.iter().enumerate() {
            if *capacity == 0 {
                return Err(Error::InvalidConfig("capacity must be greater than zero"));
            }
            if self.tenants[..i].iter().any(|(other, _)| other == tag) {
                return Err(Error::InvalidConfig("tenant tags must be unique"));
            }
        }
        Ok(())
    }

    /// Sum of the tenant capacities.
    pub fn total_capacity(&self) -> usize {
        self.tenants.iter().map(|(_, capacity)| capacity).sum()
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedPinnedLfuConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPinnedLfuConfig")
            .field("tenants", &self.tenants)
            .finish()
    }
}
