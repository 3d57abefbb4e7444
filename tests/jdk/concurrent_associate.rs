use rand::Rng;
use std::sync::Arc;
use ts_hashmap::HashMap;

/// Number of entries for each thread to place in the map.
const NUM_ENTRIES: usize = 128;

/// Number of iterations for each test
const ITERATIONS: usize = 64;

#[derive(Hash, PartialEq, Eq, Clone, Copy, Default)]
struct KeyVal {
    _data: usize,
}

impl KeyVal {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        Self { _data: rng.gen() }
    }
}

fn insert(map: Arc<HashMap<KeyVal, KeyVal>>, k: KeyVal) {
    map.insert(k, k);
}

fn get_or_default(map: Arc<HashMap<KeyVal, KeyVal>>, k: KeyVal) {
    *map.get_or_default(&k) = k;
}

fn try_insert(map: Arc<HashMap<KeyVal, KeyVal>>, k: KeyVal) {
    let _ = map.try_insert(k, k);
}

#[test]
fn test_concurrent_insert() {
    test(insert);
}

#[test]
fn test_concurrent_get_or_default() {
    test(get_or_default);
}

#[test]
fn test_concurrent_try_insert() {
    test(try_insert);
}

fn test<F>(associator: F)
where
    F: Fn(Arc<HashMap<KeyVal, KeyVal>>, KeyVal) + Send + Copy + 'static,
{
    for _ in 0..ITERATIONS {
        test_once(associator);
    }
}

fn test_once<F>(associator: F)
where
    F: Fn(Arc<HashMap<KeyVal, KeyVal>>, KeyVal) + Send + Copy + 'static,
{
    let map = Arc::new(HashMap::new());
    let mut threads = Vec::new();
    for _ in 0..num_cpus::get().min(8) {
        let map = map.clone();
        let handle = std::thread::spawn(move || {
            for _ in 0..NUM_ENTRIES {
                let key = KeyVal::new();
                associator(map.clone(), key);
                assert!(map.contains_key(&key));
            }
        });
        threads.push(handle);
    }
    for t in threads {
        t.join().expect("failed to join thread");
    }
    assert!(map.len() <= NUM_ENTRIES * num_cpus::get().min(8));
}
