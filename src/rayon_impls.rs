use crate::HashMap;
use rayon::iter::{FromParallelIterator, IntoParallelIterator, ParallelExtend, ParallelIterator};
use std::hash::{BuildHasher, Hash};

impl<K, V, S> ParallelExtend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
    S: BuildHasher + Sync,
{
    // of limited use due to the `&mut self` parameter, see `par_extend_shared`
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        self.par_extend_shared(par_iter);
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
    S: BuildHasher + Sync,
{
    /// Inserts every pair of a parallel iterator, from rayon's worker threads.
    ///
    /// Unlike [`ParallelExtend::par_extend`] this only needs a shared reference, so the map
    /// can be filled while other threads are using it. Each pair is inserted with
    /// [`HashMap::insert`]; the order in which pairs with equal keys win is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use rayon::prelude::*;
    /// use ts_hashmap::HashMap;
    ///
    /// let map = HashMap::new();
    /// map.par_extend_shared((0..1000).into_par_iter().map(|i| (i, i * 2)));
    /// assert_eq!(map.len(), 1000);
    /// ```
    pub fn par_extend_shared<I>(&self, par_iter: I)
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        log::trace!("extending map from a parallel iterator");
        par_iter.into_par_iter().for_each(|(k, v)| {
            self.insert(k, v);
        });
    }
}

impl<K, V, S> FromParallelIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
    S: BuildHasher + Default + Sync,
{
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        let mut created_map = HashMap::default();
        created_map.par_extend(par_iter);
        created_map
    }
}
