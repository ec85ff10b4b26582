#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Lifecycle of an Entry
//!
//! ```text
//!             insert(k, false)
//!   absent ─────────────────────▶ unpinned
//!     │                            │    ▲
//!     │     insert/lookup(k, true) │    │ release() of the last pin
//!     │                            ▼    │
//!     └──── insert(k, true) ─────▶ pinned
//!
//!   unpinned ──── eviction on admission, or erase() ────▶ absent
//! ```
//!
//! ## Quick Reference
//!
//! | Operation | Effect on frequency | Effect on pins | Capacity |
//! |-----------|---------------------|----------------|----------|
//! | [`insert`](PinnedLfuCache::insert) miss | starts at 1 | +1 if `pin` | unchanged |
//! | [`insert`](PinnedLfuCache::insert) / [`lookup`](PinnedLfuCache::lookup) hit | +1 | +1 if `pin` | unchanged |
//! | [`release`](PinnedLfuCache::release) | +1 | -1 | unchanged |
//! | [`erase`](PinnedLfuCache::erase) | n/a | must be 0 | -1 |
//! | [`install`](PinnedLfuCache::install) | starts at 1 | 0 | +1 |
//!
//! ## Checkpointing
//!
//! ```rust
//! use pincache::config::PinnedLfuConfig;
//! use pincache::PinnedLfuCache;
//!
//! let mut cache: PinnedLfuCache<u32, String> = PinnedLfuCache::new(8).unwrap();
//! for block in [3, 1, 4] {
//!     let h = cache.insert(block, true).unwrap();
//!     *cache.value_mut(h).unwrap() = format!("block {}", block);
//!     cache.release(h);
//! }
//!
//! let snapshot = cache.checkpoint();
//! let restored: PinnedLfuCache<u32, String> =
//!     PinnedLfuCache::recover(PinnedLfuConfig { capacity: 8 }, None, snapshot).unwrap();
//! assert_eq!(restored.len(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`lfu`]: The pinned LFU engine
//! - [`handle`]: Handles returned by admission and lookup
//! - [`hash`]: Integer hash strategies
//! - [`config`]: Configuration structures
//! - [`error`]: Error type
//! - [`metrics`]: Metrics collection
//! - [`shared`]: Multi-tenant cache with capacity moving between tenants
//! - [`concurrent`]: Sharded thread-safe wrapper (requires `concurrent` feature)

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", feature = "concurrent", not(feature = "hashbrown")))]
extern crate std;

/// Generational slot arena backing every resident entry.
pub(crate) mod slab;

/// Index-linked intrusive list over the slab.
pub(crate) mod list;

/// Resident entry record.
pub(crate) mod entry;

/// Frequency-ordered buckets of unpinned entries.
pub(crate) mod ledger;

/// Handles to resident entries.
pub mod handle;

/// Hash strategies for integer keys.
pub mod hash;

/// Cache configuration structures.
pub mod config;

/// Error type returned by constructors.
pub mod error;

/// Least Frequently Used cache with pinning.
///
/// Evicts the least frequently used unpinned entry when an admission needs
/// room, and never evicts a pinned entry.
pub mod lfu;

/// Cache metrics system.
pub mod metrics;

/// Several tenants, one engine each, over a shared key space.
pub mod shared;

/// Concurrent cache implementations.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use error::{Error, Result};
pub use handle::Handle;
pub use lfu::PinnedLfuCache;
pub use shared::{SharedPinnedLfuCache, TenantHandle};
pub use slab::SlotId;

#[cfg(feature = "concurrent")]
pub use concurrent::{ConcurrentPinnedLfuCache, ShardHandle};
