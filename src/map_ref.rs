use crate::bucket::Bucket;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLockReadGuard, RwLockWriteGuard,
};
use std::fmt::{self, Debug, Formatter};
use std::ops::{Deref, DerefMut};

/// A shared reference to an entry of a [`HashMap`](crate::HashMap), returned by
/// [`HashMap::find`](crate::HashMap::find).
///
/// The bucket holding the entry stays read-locked for as long as the `Ref` is alive. Other
/// readers of that bucket proceed, writers to it wait, and every other bucket is unaffected.
pub struct Ref<'a, K, V> {
    guard: MappedRwLockReadGuard<'a, (K, V)>,
}

impl<'a, K, V> Ref<'a, K, V> {
    pub(crate) fn new(guard: RwLockReadGuard<'a, Bucket<K, V>>, index: usize) -> Self {
        Self {
            guard: RwLockReadGuard::map(guard, |b| b.entry(index)),
        }
    }

    pub(crate) fn downgrade(guard: RwLockWriteGuard<'a, Bucket<K, V>>, index: usize) -> Self {
        Self::new(RwLockWriteGuard::downgrade(guard), index)
    }

    /// Returns the key of the entry.
    pub fn key(&self) -> &K {
        &self.guard.0
    }

    /// Returns the value of the entry.
    pub fn value(&self) -> &V {
        &self.guard.1
    }

    /// Returns both key and value.
    pub fn pair(&self) -> (&K, &V) {
        (&self.guard.0, &self.guard.1)
    }
}

impl<K, V> Deref for Ref<'_, K, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.value()
    }
}

impl<K: Debug, V: Debug> Debug for Ref<'_, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref")
            .field(self.key())
            .field(self.value())
            .finish()
    }
}

/// An exclusive reference to an entry of a [`HashMap`](crate::HashMap), returned by
/// [`HashMap::get_or_default`](crate::HashMap::get_or_default) and friends.
///
/// The bucket holding the entry stays write-locked until the `RefMut` is dropped, so any
/// modification made through it is published atomically with respect to other users of that
/// bucket:
///
/// ```
/// use ts_hashmap::HashMap;
///
/// let map = HashMap::<String, f64>::new();
/// *map.get_or_default("tres") = 3.0;
/// *map.get_or_default("tres") += 1.0;
/// assert_eq!(*map.find("tres").unwrap(), 4.0);
/// ```
///
/// Do not call back into the same bucket (or into [`HashMap::clear`](crate::HashMap::clear))
/// from the thread holding a `RefMut`: bucket locks are not reentrant.
pub struct RefMut<'a, K, V> {
    guard: MappedRwLockWriteGuard<'a, (K, V)>,
}

impl<'a, K, V> RefMut<'a, K, V> {
    pub(crate) fn new(guard: RwLockWriteGuard<'a, Bucket<K, V>>, index: usize) -> Self {
        Self {
            guard: RwLockWriteGuard::map(guard, |b| b.entry_mut(index)),
        }
    }

    /// Returns the key of the entry.
    pub fn key(&self) -> &K {
        &self.guard.0
    }

    /// Returns the value of the entry.
    pub fn value(&self) -> &V {
        &self.guard.1
    }

    /// Returns the value of the entry, mutably.
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.guard.1
    }

    /// Returns the key and a mutable reference to the value.
    pub fn pair_mut(&mut self) -> (&K, &mut V) {
        let (k, v) = &mut *self.guard;
        (k, v)
    }
}

impl<K, V> Deref for RefMut<'_, K, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.value()
    }
}

impl<K, V> DerefMut for RefMut<'_, K, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.value_mut()
    }
}

impl<K: Debug, V: Debug> Debug for RefMut<'_, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefMut")
            .field(self.key())
            .field(self.value())
            .finish()
    }
}
