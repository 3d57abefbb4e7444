//! A thread-segmented hash table.
//!
//! [`HashMap`] splits its storage into a fixed number of buckets, each an append-ordered list
//! of entries protected by its own [`parking_lot::RwLock`]. A key is placed in bucket
//! `hash(key) % bucket_count`, where the hash is a small deterministic [reduced
//! hash](reduced_hash) folded to 8, 16, 32 or 64 bits. Threads that work on keys living in
//! different buckets never contend with each other; threads that share a bucket serialize
//! writers and share readers.
//!
//! The bucket count is chosen when the map is created and never changes. There is no
//! rehashing, so the average bucket length grows linearly with the number of entries. Pick the
//! count (and the hash width, see [`ReducedState`]) to suit the expected key population.
//!
//! # A quick example
//!
//! ```
//! use ts_hashmap::HashMap;
//!
//! let numbers = HashMap::<String, f64>::new();
//! *numbers.get_or_default("numero") = 2.3;
//! assert_eq!(*numbers.find("numero").unwrap(), 2.3);
//!
//! numbers.clear();
//! *numbers.get_or_default("uno") = 1.0;
//! *numbers.get_or_default("dos") = 2.0;
//! *numbers.get_or_default("tres") = 3.0;
//! *numbers.get_or_default("tres") += 1.0;
//!
//! let sum: f64 = numbers.iter().map(|e| *e.value()).sum();
//! assert_eq!(sum, 7.0);
//! assert!(numbers.find("pepe").is_none());
//! assert_eq!(*numbers.find("uno").unwrap(), 1.0);
//! ```
//!
//! # Handles and locking
//!
//! Lookups hand out handles instead of plain references:
//!
//!  - [`HashMap::find`] returns a [`Ref`], which keeps the entry's bucket read-locked.
//!  - [`HashMap::get_or_default`] and friends return a [`RefMut`], which keeps the bucket
//!    write-locked. Modifications through it are visible to other threads once it is dropped.
//!  - [`HashMap::iter`] yields [`EntryRef`](iter::EntryRef)s, which keep the bucket they came
//!    from read-locked.
//!
//! A handle stays valid for as long as it exists: no other thread can remove or move its entry
//! while the bucket is locked. In exchange, a thread must not try to write to a bucket it is
//! still holding a handle into. The bucket locks are not reentrant for writing, so this
//! deadlocks:
//!
//! ```no_run
//! use ts_hashmap::HashMap;
//!
//! let map = HashMap::new();
//! map.insert(1, 1);
//! let one = map.find(&1).unwrap();
//! map.insert(1, 2); // waits forever for `one` to be dropped
//! # drop(one);
//! ```
//!
//! Reading is reentrant. Lookups and traversals take their read locks without queueing behind
//! writers, so a thread holding a [`Ref`] or an [`EntryRef`](iter::EntryRef) may go on reading
//! the same bucket even while another thread waits to write to it:
//!
//! ```
//! use ts_hashmap::HashMap;
//!
//! let map = HashMap::with_buckets(1);
//! map.insert(1, 1);
//! map.insert(2, 2);
//! for e in map.iter() {
//!     assert!(map.contains_key(e.key()));
//! }
//! ```
//!
//! # Consistency
//!
//! Every single-key operation is atomic with respect to every other operation on the same key.
//! Whole-map operations ([`HashMap::clear`], [`HashMap::retain`], iteration and the other
//! traversals) go through the buckets in ascending index order and work on one bucket at a
//! time. They observe and modify each bucket consistently but may miss or include entries
//! concurrently inserted into or removed from other buckets; in particular another thread may
//! see a partially cleared map. A traversal locks the next bucket before it releases the
//! current one, and `clear` and `retain` never hold more than one bucket lock, so a handle held
//! into one bucket only ever stalls them at that bucket.
//!
//! [`HashMap::len`] is maintained in an atomic counter that is updated while the modified
//! bucket is still locked, so it is exact whenever the map is quiescent.
#![deny(
    missing_docs,
    missing_debug_implementations,
    rustdoc::broken_intra_doc_links
)]
#![warn(rust_2018_idioms)]

mod bucket;
mod hash;
mod map;
mod map_ref;

pub mod iter;

#[cfg(feature = "rayon")]
mod rayon_impls;

#[cfg(feature = "serde")]
mod serde_impls;

pub use hash::{reduced_hash, HashWidth, ReducedHasher, ReducedState};
pub use map::{HashMap, TryInsertError, DEFAULT_BUCKETS};
pub use map_ref::{Ref, RefMut};

/// Default hasher for [`HashMap`]: the full 64-bit reduced hash.
pub type DefaultHashBuilder = ReducedState<u64>;
