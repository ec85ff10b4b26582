//! Configuration for the pinned LFU cache.
//!
//! # Examples
//!
//! ```
//! use pincache::config::PinnedLfuConfig;
//! use pincache::PinnedLfuCache;
//!
//! let config = PinnedLfuConfig { capacity: 1024 };
//! let cache: PinnedLfuCache<u64, [u8; 16]> = PinnedLfuCache::init(config, None).unwrap();
//! assert_eq!(cache.capacity(), 1024);
//! ```

use crate::error::{Error, Result};
use core::fmt;

/// Configuration for a [`PinnedLfuCache`](crate::PinnedLfuCache).
///
/// # Fields
///
/// - `capacity`: Maximum number of resident entries. Must be greater than
///   zero. The live capacity can later move away from this starting value
///   through [`erase`](crate::PinnedLfuCache::erase) and
///   [`install`](crate::PinnedLfuCache::install).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PinnedLfuConfig {
    /// Maximum number of key-value pairs the cache can hold
    pub capacity: usize,
}

impl PinnedLfuConfig {
    /// Checks that the configuration can produce a working cache.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be greater than zero"));
        }
        Ok(())
    }
}

impl fmt::Debug for PinnedLfuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedLfuConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}
