use crate::bucket::Bucket;
use crate::map::Slot;
use parking_lot::RwLockReadGuard;
use std::fmt;

/// Walks the bucket array in ascending index order, read-locking one bucket at a time.
///
/// Empty buckets are locked, checked and released without being yielded. Buckets are taken
/// with `read_recursive`, so a thread that already holds a read handle into a bucket can walk
/// past it even while a writer is queued on that bucket.
pub(crate) struct BucketTraverser<'a, K, V> {
    buckets: &'a [Slot<K, V>],

    /// Index of bucket to lock next
    index: usize,
}

impl<'a, K, V> BucketTraverser<'a, K, V> {
    pub(crate) fn new(buckets: &'a [Slot<K, V>]) -> Self {
        Self { buckets, index: 0 }
    }
}

impl<K, V> fmt::Debug for BucketTraverser<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketTraverser")
            .field("buckets", &self.buckets.len())
            .field("index", &self.index)
            .finish()
    }
}

impl<'a, K, V> Iterator for BucketTraverser<'a, K, V> {
    type Item = RwLockReadGuard<'a, Bucket<K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.buckets.get(self.index) {
            self.index += 1;
            let bucket = slot.read_recursive();
            if bucket.len() != 0 {
                return Some(bucket);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.buckets.len() - self.index))
    }
}
