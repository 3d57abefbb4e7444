use std::borrow::Borrow;
use std::collections::TryReserveError;

/// One segment of the table: an append-ordered list of entries.
///
/// Keys are unique within a bucket. Lookups are a linear scan, so the cost of an operation is
/// proportional to the number of keys that share this bucket.
#[derive(Debug, Clone)]
pub(crate) struct Bucket<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for Bucket<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K, V> Bucket<K, V> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn entry(&self, index: usize) -> &(K, V) {
        &self.entries[index]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, index: usize) -> &mut (K, V) {
        &mut self.entries[index]
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[(K, V)] {
        &self.entries
    }

    /// Makes room for one more entry, reporting allocation failure instead of aborting.
    ///
    /// On error the bucket is left exactly as it was.
    pub(crate) fn try_reserve(&mut self) -> Result<(), TryReserveError> {
        self.entries.try_reserve(1)
    }

    /// Drops every entry, returning how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub(crate) fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }

    /// Keeps only the entries for which `f` returns `true`, preserving order.
    ///
    /// Returns the number of removed entries.
    pub(crate) fn retain<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain_mut(|(k, v)| f(k, v));
        before - self.entries.len()
    }
}

impl<K, V> Bucket<K, V>
where
    K: Eq,
{
    /// Returns the position of `key` in this bucket.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries.iter().position(|(k, _)| k.borrow() == key)
    }

    /// Appends a new entry. The caller must have checked that `key` is absent.
    pub(crate) fn push(&mut self, key: K, value: V) -> usize {
        debug_assert!(self.find(&key).is_none());
        self.entries.push((key, value));
        self.entries.len() - 1
    }

    /// Inserts `key`, overwriting and returning the previous value if it was present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.find(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.push(key, value);
                None
            }
        }
    }

    /// Removes `key` while keeping the remaining entries in insertion order.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let i = self.find(key)?;
        Some(self.entries.remove(i))
    }
}
