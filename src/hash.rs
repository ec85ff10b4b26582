//! Hash strategies for integer-keyed caches.
//!
//! The cache is generic over any [`BuildHasher`]; the default is hashbrown's
//! randomized hasher. Block caches are usually keyed by small integers (block
//! or page numbers), where a single-round integer mixer is both cheaper and
//! good enough. This module provides four such strategies:
//!
//! | Builder | Mixer | Use when |
//! |---------|-------|----------|
//! | [`CrcState`] | CRC-32 seeded with `0x537` | general integer and string keys |
//! | [`IdentityState`] | none | keys are already uniformly distributed |
//! | [`MurmurState`] | MurmurHash3 `fmix32` | general integer keys |
//! | [`XxState`] | xxHash32 avalanche | general integer keys |
//!
//! Integer writes are folded to 32 bits and mixed. Any other write (strings,
//! byte slices) is run through CRC-32 first, so composite keys still work,
//! just without the fast path.
//!
//! The 32-bit result sits in the low half of the finished hash, and a
//! Fibonacci-multiplied copy fills the high half: hashbrown picks buckets from
//! the low bits and its 7-bit control tag from the top bits, and both need to
//! vary.
//!
//! ```
//! use pincache::hash::MurmurState;
//! use pincache::config::PinnedLfuConfig;
//! use pincache::PinnedLfuCache;
//!
//! let config = PinnedLfuConfig { capacity: 128 };
//! let mut cache: PinnedLfuCache<u32, u32, MurmurState> =
//!     PinnedLfuCache::init(config, Some(MurmurState::default())).unwrap();
//! assert!(cache.insert(7, false).is_some());
//! ```

use core::fmt;
use core::hash::{BuildHasher, Hasher};
use core::marker::PhantomData;

use crc32fast::Hasher as Crc32;

const CRC_SEED: u32 = 0x537;
const FIBONACCI: u32 = 0x9e37_79b9;

/// A 32-bit integer mixing function.
pub trait Mix {
    /// Maps `x` to its hash.
    fn mix(x: u32) -> u32;
}

/// CRC-32 of the little-endian bytes, seeded with `0x537`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc;

/// Identity mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

/// MurmurHash3 32-bit finalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur;

/// xxHash32 avalanche step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xx;

impl Mix for Crc {
    #[inline]
    fn mix(x: u32) -> u32 {
        let mut crc = Crc32::new_with_initial(CRC_SEED);
        crc.update(&x.to_le_bytes());
        crc.finalize()
    }
}

impl Mix for Identity {
    #[inline]
    fn mix(x: u32) -> u32 {
        x
    }
}

impl Mix for Murmur {
    #[inline]
    fn mix(mut x: u32) -> u32 {
        x ^= x >> 16;
        x = x.wrapping_mul(0x85eb_ca6b);
        x ^= x >> 13;
        x = x.wrapping_mul(0xc2b2_ae35);
        x ^= x >> 16;
        x
    }
}

impl Mix for Xx {
    #[inline]
    fn mix(mut x: u32) -> u32 {
        x ^= x >> 15;
        x = x.wrapping_mul(0x85eb_ca77);
        x ^= x >> 13;
        x = x.wrapping_mul(0xc2b2_ae3d);
        x ^= x >> 16;
        x
    }
}

/// [`Hasher`] applying the mixer `M` to integer writes.
pub struct MixHasher<M> {
    state: u64,
    _mix: PhantomData<fn() -> M>,
}

impl<M: Mix> MixHasher<M> {
    #[inline]
    fn absorb(&mut self, x: u32) {
        self.state = self.state.rotate_left(5) ^ u64::from(M::mix(x));
    }

    #[inline]
    fn folded(&self) -> u32 {
        (self.state ^ (self.state >> 32)) as u32
    }
}

impl<M: Mix> Hasher for MixHasher<M> {
    #[inline]
    fn finish(&self) -> u64 {
        let h = self.folded();
        (u64::from(h.wrapping_mul(FIBONACCI)) << 32) | u64::from(h)
    }

    fn write(&mut self, bytes: &[u8]) {
        let mut crc = Crc32::new_with_initial(self.folded() ^ CRC_SEED);
        crc.update(bytes);
        self.absorb(crc.finalize());
    }

    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.absorb(u32::from(i));
    }

    #[inline]
    fn write_u16(&mut self, i: u16) {
        self.absorb(u32::from(i));
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.absorb(i);
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.absorb((i ^ (i >> 32)) as u32);
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.write_u64(i as u64);
    }

    #[inline]
    fn write_i32(&mut self, i: i32) {
        self.absorb(i as u32);
    }

    #[inline]
    fn write_i64(&mut self, i: i64) {
        self.write_u64(i as u64);
    }
}

impl<M> fmt::Debug for MixHasher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixHasher")
            .field("state", &self.state)
            .finish()
    }
}

/// [`BuildHasher`] producing [`MixHasher`]s. Stateless and deterministic.
pub struct MixState<M> {
    _mix: PhantomData<fn() -> M>,
}

impl<M> Default for MixState<M> {
    fn default() -> Self {
        MixState { _mix: PhantomData }
    }
}

impl<M> Clone for MixState<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for MixState<M> {}

impl<M> fmt::Debug for MixState<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MixState")
    }
}

impl<M: Mix> BuildHasher for MixState<M> {
    type Hasher = MixHasher<M>;

    #[inline]
    fn build_hasher(&self) -> MixHasher<M> {
        MixHasher {
            state: 0,
            _mix: PhantomData,
        }
    }
}

/// CRC-32 (IEEE polynomial) hashing for integer and string keys.
pub type CrcState = MixState<Crc>;

/// Identity hashing for pre-distributed integer keys.
pub type IdentityState = MixState<Identity>;

/// MurmurHash3 finalizer hashing.
pub type MurmurState = MixState<Murmur>;

/// xxHash32 avalanche hashing.
pub type XxState = MixState<Xx>;
