//! Iterators over a [`HashMap`](crate::HashMap).

mod traverser;
pub(crate) use traverser::BucketTraverser;

use crate::bucket::Bucket;
use parking_lot::RwLockReadGuard;
use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;
use std::rc::Rc;

/// An iterator over a map's entries.
///
/// Buckets are visited in ascending index order and entries within a bucket in insertion
/// order. The bucket currently being visited is read-locked, and stays locked for as long as
/// any [`EntryRef`] handed out from it is alive. Buckets already left behind are released, so
/// the iteration is a per-bucket snapshot rather than an atomic view of the whole map.
///
/// See [`HashMap::iter`](crate::HashMap::iter) for details.
pub struct Iter<'a, K, V> {
    pub(crate) buckets: BucketTraverser<'a, K, V>,
    pub(crate) current: Option<Rc<RwLockReadGuard<'a, Bucket<K, V>>>>,
    pub(crate) index: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(buckets: BucketTraverser<'a, K, V>) -> Self {
        Self {
            buckets,
            current: None,
            index: 0,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = EntryRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(bucket) = &self.current {
                if self.index < bucket.len() {
                    let entry = EntryRef {
                        bucket: Rc::clone(bucket),
                        index: self.index,
                    };
                    self.index += 1;
                    return Some(entry);
                }
            }
            // the next bucket is locked before the previous one is released
            match self.buckets.next() {
                Some(bucket) => {
                    self.current = Some(Rc::new(bucket));
                    self.index = 0;
                }
                None => {
                    self.current = None;
                    return None;
                }
            }
        }
    }
}

impl<K, V> Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("buckets", &self.buckets)
            .field("index", &self.index)
            .finish()
    }
}

/// An entry yielded by [`Iter`].
///
/// Keeps the entry's bucket read-locked while alive.
pub struct EntryRef<'a, K, V> {
    bucket: Rc<RwLockReadGuard<'a, Bucket<K, V>>>,
    index: usize,
}

impl<K, V> EntryRef<'_, K, V> {
    /// Returns the key of the entry.
    pub fn key(&self) -> &K {
        &self.bucket.entry(self.index).0
    }

    /// Returns the value of the entry.
    pub fn value(&self) -> &V {
        &self.bucket.entry(self.index).1
    }

    /// Returns both key and value.
    pub fn pair(&self) -> (&K, &V) {
        let (k, v) = self.bucket.entry(self.index);
        (k, v)
    }
}

impl<K, V> Clone for EntryRef<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            bucket: Rc::clone(&self.bucket),
            index: self.index,
        }
    }
}

impl<K, V> Deref for EntryRef<'_, K, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.value()
    }
}

impl<K: Debug, V: Debug> Debug for EntryRef<'_, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntryRef")
            .field(self.key())
            .field(self.value())
            .finish()
    }
}

/// An iterator over a map's keys. Keys are cloned out of the map.
///
/// See [`HashMap::keys`](crate::HashMap::keys) for details.
#[derive(Debug)]
pub struct Keys<'a, K, V> {
    pub(crate) iter: Iter<'a, K, V>,
}

impl<K: Clone, V> Iterator for Keys<'_, K, V> {
    type Item = K;
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.iter.next()?;
        Some(entry.key().clone())
    }
}

/// An iterator over a map's values. Values are cloned out of the map.
///
/// See [`HashMap::values`](crate::HashMap::values) for details.
#[derive(Debug)]
pub struct Values<'a, K, V> {
    pub(crate) iter: Iter<'a, K, V>,
}

impl<K, V: Clone> Iterator for Values<'_, K, V> {
    type Item = V;
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.iter.next()?;
        Some(entry.value().clone())
    }
}

/// An owning iterator over a map's entries, in the same order as [`Iter`].
///
/// Created by consuming a [`HashMap`](crate::HashMap) with `into_iter`.
#[derive(Debug)]
pub struct IntoIter<K, V> {
    pub(crate) entries: std::iter::Flatten<std::vec::IntoIter<Vec<(K, V)>>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}
