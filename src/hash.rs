//! Reduced hashing: a small, deterministic hash folded down to a chosen bit width.
//!
//! The table only needs a hash to pick a bucket, so it does not need a keyed or
//! DoS-resistant hash function. Instead it uses 64-bit FNV-1a over whatever bytes the key's
//! [`Hash`] implementation feeds into the hasher, and then xor-folds the result down to the
//! width requested by the caller (`u8`, `u16`, `u32` or `u64`).
//!
//! ```
//! use ts_hashmap::reduced_hash;
//!
//! let a: u8 = reduced_hash("prueba1");
//! let b: u8 = reduced_hash("prueba2");
//! assert_ne!(a, b);
//! ```

use std::fmt::{self, Debug, Formatter};
use std::hash::{BuildHasher, Hash, Hasher};
use std::marker::PhantomData;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// An unsigned integer type that a reduced hash can be folded into.
///
/// Implemented for `u8`, `u16`, `u32` and `u64`.
pub trait HashWidth: sealed::Sealed + Copy + Eq + Debug + Into<u64> {
    /// Number of bits in the reduced hash.
    const BITS: u32;

    /// Folds a full 64-bit hash down to this width.
    fn fold(hash: u64) -> Self;
}

impl HashWidth for u64 {
    const BITS: u32 = 64;

    #[inline]
    fn fold(hash: u64) -> Self {
        hash
    }
}

impl HashWidth for u32 {
    const BITS: u32 = 32;

    #[inline]
    fn fold(hash: u64) -> Self {
        (hash ^ (hash >> 32)) as u32
    }
}

impl HashWidth for u16 {
    const BITS: u32 = 16;

    #[inline]
    fn fold(hash: u64) -> Self {
        let h = u32::fold(hash);
        (h ^ (h >> 16)) as u16
    }
}

impl HashWidth for u8 {
    const BITS: u32 = 8;

    #[inline]
    fn fold(hash: u64) -> Self {
        let h = u16::fold(hash);
        (h ^ (h >> 8)) as u8
    }
}

/// Computes the reduced hash of `key` at width `W`.
///
/// The result only depends on `key` and `W`: there is no seed and no hidden state, so the
/// same key always lands in the same bucket, across threads and across runs.
pub fn reduced_hash<W, Q>(key: &Q) -> W
where
    W: HashWidth,
    Q: ?Sized + Hash,
{
    let mut hasher = ReducedHasher::<W>::default();
    key.hash(&mut hasher);
    hasher.reduced()
}

/// A [`Hasher`] computing 64-bit FNV-1a, folded to `W` on [`finish`](Hasher::finish).
pub struct ReducedHasher<W = u64> {
    state: u64,
    _width: PhantomData<fn() -> W>,
}

impl<W> Default for ReducedHasher<W> {
    fn default() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
            _width: PhantomData,
        }
    }
}

impl<W> Clone for ReducedHasher<W> {
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            _width: PhantomData,
        }
    }
}

impl<W> Debug for ReducedHasher<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducedHasher")
            .field("state", &self.state)
            .finish()
    }
}

impl<W: HashWidth> ReducedHasher<W> {
    /// Returns the hash of the bytes written so far at width `W`.
    #[inline]
    pub fn reduced(&self) -> W {
        W::fold(self.state)
    }
}

impl<W: HashWidth> Hasher for ReducedHasher<W> {
    #[inline]
    fn finish(&self) -> u64 {
        self.reduced().into()
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u64::from(b);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }
}

/// A [`BuildHasher`] producing [`ReducedHasher`]s of width `W`.
///
/// Pick a narrow width when the table has few buckets and you want the bucket index to be the
/// reduced hash itself (for example `ReducedState<u8>` with 256 buckets).
pub struct ReducedState<W = u64> {
    _width: PhantomData<fn() -> W>,
}

impl<W> ReducedState<W> {
    /// Creates a new builder. It carries no state.
    pub const fn new() -> Self {
        Self {
            _width: PhantomData,
        }
    }
}

impl<W> Default for ReducedState<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Clone for ReducedState<W> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<W> Copy for ReducedState<W> {}

impl<W: HashWidth> Debug for ReducedState<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducedState")
            .field("bits", &W::BITS)
            .finish()
    }
}

impl<W: HashWidth> BuildHasher for ReducedState<W> {
    type Hasher = ReducedHasher<W>;

    #[inline]
    fn build_hasher(&self) -> ReducedHasher<W> {
        ReducedHasher::default()
    }
}
