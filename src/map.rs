use crate::bucket::Bucket;
use crate::iter::*;
use crate::map_ref::{Ref, RefMut};
use crossbeam::utils::CachePadded;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::TryReserveError;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FromIterator;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The number of buckets used by [`HashMap::new`].
///
/// One bucket per value of an 8-bit reduced hash.
pub const DEFAULT_BUCKETS: usize = 256;

/// A bucket and its lock, padded to a cache line so that neighbouring locks do not share one.
pub(crate) type Slot<K, V> = CachePadded<RwLock<Bucket<K, V>>>;

/// A thread-segmented hash table.
///
/// The table is split into a fixed number of buckets, chosen at construction. Each bucket is
/// an append-ordered list of entries behind its own reader-writer lock. A key's bucket is its
/// hash modulo the bucket count, so every single-key operation locks exactly one bucket and
/// operations on keys in different buckets never contend.
///
/// Lookups return handles ([`Ref`], [`RefMut`]) that keep the bucket locked while alive. See
/// the [crate-level documentation](crate) for the locking rules.
pub struct HashMap<K, V, S = crate::DefaultHashBuilder> {
    /// The array of buckets. Its length never changes.
    buckets: Box<[Slot<K, V>]>,

    /// Total number of entries. Only updated while holding the lock of the bucket that changed.
    count: AtomicUsize,

    build_hasher: S,
}

/// The error type for the [`HashMap::try_insert`] method.
pub struct TryInsertError<'a, K, V> {
    /// A reference to the entry currently mapped to the key.
    pub current: Ref<'a, K, V>,
    /// The value that [`HashMap::try_insert`] failed to insert.
    pub not_inserted: V,
}

impl<K, V> Debug for TryInsertError<'_, K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryInsertError")
            .field("current", &self.current)
            .field("not_inserted", &self.not_inserted)
            .finish()
    }
}

impl<K, V> Display for TryInsertError<'_, K, V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Insert of \"{:?}\" failed as key was already present with value \"{:?}\"",
            self.not_inserted,
            self.current.value()
        )
    }
}

impl<K, V> Error for TryInsertError<'_, K, V>
where
    K: Debug,
    V: Debug,
{
    #[inline]
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

// ===
// construction and whole-table methods. none of these need to hash a key.
// ===

impl<K, V> HashMap<K, V, crate::DefaultHashBuilder> {
    /// Creates an empty `HashMap` with [`DEFAULT_BUCKETS`] buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    /// let map: HashMap<&str, i32> = HashMap::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `HashMap` with `buckets` buckets.
    ///
    /// The bucket count is fixed for the lifetime of the map. More buckets means less lock
    /// contention and shorter linear scans, at the cost of a larger fixed footprint.
    ///
    /// # Panics
    ///
    /// Panics if `buckets` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    /// let map: HashMap<&str, i32> = HashMap::with_buckets(1024);
    /// assert_eq!(map.bucket_count(), 1024);
    /// ```
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_buckets_and_hasher(buckets, crate::DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map with [`DEFAULT_BUCKETS`] buckets which will use `hash_builder` to
    /// hash keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::{HashMap, ReducedState};
    ///
    /// let map = HashMap::with_hasher(ReducedState::<u8>::new());
    /// map.insert(1, 2);
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKETS, hash_builder)
    }

    /// Creates an empty map with `buckets` buckets, using `hash_builder` to hash the keys.
    ///
    /// Only `hash % buckets` matters for placement, so a hasher narrower than the bucket count
    /// (for example an 8-bit [`ReducedState`](crate::ReducedState) with 1024 buckets) leaves
    /// some buckets permanently unused.
    ///
    /// # Panics
    ///
    /// Panics if `buckets` is zero.
    pub fn with_buckets_and_hasher(buckets: usize, hash_builder: S) -> Self {
        assert_ne!(buckets, 0, "a HashMap needs at least one bucket");
        log::debug!("creating hash map with {} buckets", buckets);
        Self {
            buckets: (0..buckets)
                .map(|_| CachePadded::new(RwLock::new(Bucket::default())))
                .collect(),
            count: AtomicUsize::new(0),
            build_hasher: hash_builder,
        }
    }

    /// Returns a reference to the map's [`BuildHasher`].
    pub fn hasher(&self) -> &S {
        &self.build_hasher
    }

    /// Returns the number of buckets. Fixed at construction.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn slots(&self) -> &[Slot<K, V>] {
        &self.buckets
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::new();
    ///
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert!(map.len() == 2);
    /// ```
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Returns `true` if the map is empty. Otherwise returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::new();
    /// assert!(map.is_empty());
    /// map.insert("a", 1);
    /// assert!(!map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of entries in each bucket, in bucket order.
    ///
    /// Each bucket is locked and measured in turn, so under concurrent modification the
    /// result is not a consistent snapshot. Useful for judging whether the bucket count and
    /// hash width suit the key distribution.
    pub fn bucket_loads(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.read_recursive().len()).collect()
    }

    /// An iterator visiting all entries, bucket by bucket.
    ///
    /// The iterator element type is [`EntryRef<'a, K, V>`](EntryRef). Entries of one bucket
    /// come out in insertion order; buckets are visited in ascending index order. Only the
    /// bucket being visited is locked, so entries may be added to or removed from other buckets
    /// while the iteration is in progress.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::new();
    /// map.insert("uno", 1.0);
    /// map.insert("dos", 2.0);
    ///
    /// let sum: f64 = map.iter().map(|e| *e.value()).sum();
    /// assert_eq!(sum, 3.0);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(BucketTraverser::new(&self.buckets))
    }

    /// An iterator visiting all keys, cloned, in the same order as [`HashMap::iter`].
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { iter: self.iter() }
    }

    /// An iterator visiting all values, cloned, in the same order as [`HashMap::iter`].
    pub fn values(&self) -> Values<'_, K, V> {
        Values { iter: self.iter() }
    }

    /// Clears the map, removing all key-value pairs.
    ///
    /// Buckets are emptied one at a time in ascending index order, each under its own write
    /// lock, and no two bucket locks are held at once. Another thread may therefore observe a
    /// partially cleared map, and an entry inserted into an already-emptied bucket during the
    /// call survives it. A thread holding a handle into some bucket only stalls `clear` at that
    /// bucket; it can still read or write every other bucket meanwhile.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::new();
    ///
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&self) {
        let mut removed = 0;
        for slot in self.buckets.iter() {
            let mut bucket = slot.write();
            let n = bucket.clear();
            if n != 0 {
                self.count.fetch_sub(n, Ordering::SeqCst);
                removed += n;
            }
        }
        log::debug!("cleared {} entries", removed);
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all pairs `(k, v)` such that `f(&k, &mut v)` returns `false`.
    /// Buckets are processed one at a time in ascending order; entries inserted into an
    /// already-processed bucket during the call are not visited.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::new();
    ///
    /// for i in 0..8 {
    ///     map.insert(i, i * 10);
    /// }
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// ```
    pub fn retain<F>(&self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut removed = 0;
        for slot in self.buckets.iter() {
            let mut bucket = slot.write();
            let n = bucket.retain(&mut f);
            if n != 0 {
                self.count.fetch_sub(n, Ordering::SeqCst);
                removed += n;
            }
        }
        log::trace!("retain removed {} entries", removed);
    }
}

// ===
// single-key operations. these hash the key to find its bucket and lock only that bucket.
// ===

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn hash<Q: ?Sized + Hash>(&self, key: &Q) -> u64 {
        let mut h = self.build_hasher.build_hasher();
        key.hash(&mut h);
        h.finish()
    }

    /// Returns the index of the bucket `key` belongs to.
    pub(crate) fn bucket_index<Q: ?Sized + Hash>(&self, key: &Q) -> usize {
        (self.hash(key) % self.buckets.len() as u64) as usize
    }

    #[inline]
    fn slot<Q: ?Sized + Hash>(&self, key: &Q) -> &RwLock<Bucket<K, V>> {
        &self.buckets[self.bucket_index(key)]
    }

    /// Returns a handle to the entry for `key`, or `None` if there is none.
    ///
    /// `None` plays the role of the past-the-end position: a miss is ordinary control flow,
    /// and the map is never modified by a lookup. The bucket of a found entry stays
    /// read-locked while the returned [`Ref`] is alive.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash` and `Eq` on the
    /// borrowed form must match those for the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::<String, f64>::new();
    /// map.insert("uno".to_string(), 1.0);
    /// assert_eq!(*map.find("uno").unwrap(), 1.0);
    /// assert!(map.find("pepe").is_none());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Option<Ref<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let bucket = self.slot(key).read_recursive();
        let index = bucket.find(key)?;
        Some(Ref::new(bucket, index))
    }

    /// Tests if `key` is a key in this table.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash` and `Eq` on the
    /// borrowed form must match those for the key type.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.slot(key).read_recursive().find(key).is_some()
    }

    /// Returns a mutable handle to the value for `key`, inserting `V::default()` first if the
    /// key is absent.
    ///
    /// The lookup and the insertion happen under a single acquisition of the bucket's write
    /// lock, and the lock is held until the returned [`RefMut`] is dropped. The key is only
    /// cloned into the map when it is actually inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::<String, f64>::new();
    /// assert_eq!(*map.get_or_default("numero"), 0.0);
    /// *map.get_or_default("numero") = 2.3;
    /// *map.get_or_default("numero") += 1.0;
    /// assert_eq!(*map.get_or_default("numero"), 3.3);
    /// ```
    pub fn get_or_default<Q>(&self, key: &Q) -> RefMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Returns a mutable handle to the value for `key`, inserting the result of `f` first if
    /// the key is absent.
    ///
    /// `f` runs while the bucket is write-locked, so it should be short.
    pub fn get_or_insert_with<Q, F>(&self, key: &Q, f: F) -> RefMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
        F: FnOnce() -> V,
    {
        let mut bucket = self.slot(key).write();
        let index = match bucket.find(key) {
            Some(i) => i,
            None => {
                let i = bucket.push(key.to_owned(), f());
                self.count.fetch_add(1, Ordering::SeqCst);
                i
            }
        };
        RefMut::new(bucket, index)
    }

    /// Like [`HashMap::get_or_default`], but reports allocation failure instead of aborting.
    ///
    /// If the bucket can not grow, the map is left unchanged and the error is returned.
    pub fn try_get_or_default<Q>(&self, key: &Q) -> Result<RefMut<'_, K, V>, TryReserveError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
        V: Default,
    {
        self.try_get_or_insert_with(key, V::default)
    }

    /// Like [`HashMap::get_or_insert_with`], but reports allocation failure instead of
    /// aborting.
    ///
    /// Room for the new entry is reserved before `f` is called or the key is cloned, so on
    /// error neither has happened and the bucket is untouched.
    pub fn try_get_or_insert_with<Q, F>(
        &self,
        key: &Q,
        f: F,
    ) -> Result<RefMut<'_, K, V>, TryReserveError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + ToOwned<Owned = K>,
        F: FnOnce() -> V,
    {
        let mut bucket = self.slot(key).write();
        let index = match bucket.find(key) {
            Some(i) => i,
            None => {
                bucket.try_reserve()?;
                let i = bucket.push(key.to_owned(), f());
                self.count.fetch_add(1, Ordering::SeqCst);
                i
            }
        };
        Ok(RefMut::new(bucket, index))
    }

    /// Maps `key` to `value` in this table.
    ///
    /// If the key was already present its value is overwritten (the entry keeps its position
    /// in the bucket) and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(*map.find(&37).unwrap(), "b");
    /// ```
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut bucket = self.slot(&key).write();
        let old = bucket.insert(key, value);
        if old.is_none() {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
        old
    }

    /// Inserts `key` and `value` into the map, unless `key` is already present.
    ///
    /// On success, returns a handle to the inserted value. If the key is present, an error
    /// carrying a handle to the current entry and the rejected value is returned instead, and
    /// the map is not modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::new();
    /// assert_eq!(*map.try_insert(37, "a").unwrap(), "a");
    ///
    /// let err = map.try_insert(37, "b").unwrap_err();
    /// assert_eq!(err.current.value(), &"a");
    /// assert_eq!(err.not_inserted, "b");
    /// ```
    pub fn try_insert(
        &self,
        key: K,
        value: V,
    ) -> Result<RefMut<'_, K, V>, TryInsertError<'_, K, V>> {
        let mut bucket = self.slot(&key).write();
        match bucket.find(&key) {
            Some(index) => Err(TryInsertError {
                current: Ref::downgrade(bucket, index),
                not_inserted: value,
            }),
            None => {
                let index = bucket.push(key, value);
                self.count.fetch_add(1, Ordering::SeqCst);
                Ok(RefMut::new(bucket, index))
            }
        }
    }

    /// Removes the key (and its corresponding value) from this map, returning the value.
    ///
    /// The remaining entries of the bucket keep their relative order.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash` and `Eq` on the
    /// borrowed form must match those for the key type.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the key was
    /// previously in the map.
    pub fn remove_entry<Q>(&self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut bucket = self.slot(key).write();
        let removed = bucket.remove(key)?;
        self.count.fetch_sub(1, Ordering::SeqCst);
        Some(removed)
    }

    /// If the value for the specified `key` is present, attempts to compute a new mapping
    /// given the key and its current mapped value.
    ///
    /// The new mapping is computed by `remapping_function`, which may return `None` to
    /// signalize that the mapping should be removed. The whole call runs under the bucket's
    /// write lock, so it is atomic with respect to other operations on that bucket.
    ///
    /// Returns a handle to the new value, or `None` if the key was absent or the mapping was
    /// removed.
    pub fn compute_if_present<Q, F>(
        &self,
        key: &Q,
        remapping_function: F,
    ) -> Option<RefMut<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&K, &V) -> Option<V>,
    {
        let mut bucket = self.slot(key).write();
        let index = bucket.find(key)?;
        let (k, v) = bucket.entry_mut(index);
        match remapping_function(k, v) {
            Some(new) => {
                *v = new;
                Some(RefMut::new(bucket, index))
            }
            None => {
                bucket.remove(key);
                self.count.fetch_sub(1, Ordering::SeqCst);
                None
            }
        }
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    /// Compares the two maps entry by entry.
    ///
    /// While an entry of `self` is checked, its bucket in `self` and the matching bucket in
    /// `other` are both read-locked. The comparison is only meaningful when neither map is
    /// being modified concurrently.
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|e| other.find(e.key()).map_or(false, |v| *v == *e.value()))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut m = f.debug_map();
        for e in self.iter() {
            m.entry(e.key(), e.value());
        }
        m.finish()
    }
}

impl<K, V, S> Extend<(K, V)> for &HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for &HashMap<K, V, S>
where
    K: Copy + Hash + Eq,
    V: Copy,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        (&*self).extend(iter);
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let map = Self::default();
        (&map).extend(iter);
        map
    }
}

impl<'a, K, V, S> FromIterator<(&'a K, &'a V)> for HashMap<K, V, S>
where
    K: Copy + Hash + Eq,
    V: Copy,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (&'a K, &'a V)>>(iter: T) -> Self {
        Self::from_iter(iter.into_iter().map(|(&k, &v)| (k, v)))
    }
}

impl<'a, K, V, S> FromIterator<&'a (K, V)> for HashMap<K, V, S>
where
    K: Copy + Hash + Eq,
    V: Copy,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = &'a (K, V)>>(iter: T) -> Self {
        Self::from_iter(iter.into_iter().map(|&(k, v)| (k, v)))
    }
}

impl<K, V, S> Clone for HashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Clones the map bucket by bucket.
    ///
    /// The clone uses the same hasher and bucket count, so every entry stays in the bucket
    /// (and position) it had in the original.
    fn clone(&self) -> HashMap<K, V, S> {
        let mut count = 0;
        let buckets = self
            .buckets
            .iter()
            .map(|slot| {
                let bucket = slot.read_recursive();
                count += bucket.len();
                CachePadded::new(RwLock::new(Bucket::clone(&bucket)))
            })
            .collect();
        Self {
            buckets,
            count: AtomicUsize::new(count),
            build_hasher: self.build_hasher.clone(),
        }
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let buckets: Vec<Vec<(K, V)>> = self
            .buckets
            .into_vec()
            .into_iter()
            .map(|slot| slot.into_inner().into_inner().into_entries())
            .collect();
        IntoIter {
            entries: buckets.into_iter().flatten(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = EntryRef<'a, K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
