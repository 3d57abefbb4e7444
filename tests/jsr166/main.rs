use std::iter::FromIterator;
use ts_hashmap::*;

const ITER: [(usize, &'static str); 5] = [(1, "A"), (2, "B"), (3, "C"), (4, "D"), (5, "E")];

#[test]
fn test_from_iter() {
    let map1 = from_iter_contron();
    let map2: HashMap<_, _> = HashMap::from_iter(ITER.iter());
    assert_eq!(map1, map2);
}

fn from_iter_contron() -> HashMap<usize, &'static str> {
    let map = HashMap::with_buckets(5);
    assert!(map.is_empty());

    for (key, value) in &ITER {
        map.insert(*key, *value);
    }

    assert!(!map.is_empty());
    assert_eq!(ITER.len(), map.len());
    map
}

fn map5() -> HashMap<isize, String> {
    let map = HashMap::new();
    assert!(map.is_empty());
    map.insert(1, "A".to_owned());
    map.insert(2, "B".to_owned());
    map.insert(3, "C".to_owned());
    map.insert(4, "D".to_owned());
    map.insert(5, "E".to_owned());
    assert!(!map.is_empty());
    assert_eq!(map.len(), 5);
    map
}

// clear removes all pairs
#[test]
fn test_clear() {
    let map = map5();
    map.clear();
    assert_eq!(map.len(), 0);
}

// maps with same contents are equal
#[test]
fn test_equals() {
    let map1 = map5();
    let map2 = map5();
    assert_eq!(map1, map2);
    assert_eq!(map2, map1);
    map1.clear();
    assert_ne!(map1, map2);
    assert_ne!(map2, map1);
}

// contains_key returns true for contained key
#[test]
fn test_contains_key() {
    let map = map5();
    assert!(map.contains_key(&1));
    assert!(!map.contains_key(&0));
}

// find returns the correct element at the given key, or None if not present
#[test]
fn test_find() {
    let map = map5();
    assert_eq!(map.find(&1).unwrap().as_str(), "A");
    assert!(map.find(&-1).is_none());
}

// is_empty is true of empty map and false for non-empty
#[test]
fn test_is_empty() {
    let empty = HashMap::<usize, usize>::new();
    let map = map5();
    assert!(empty.is_empty());
    assert!(!map.is_empty());
}

// keys returns all the keys
#[test]
fn test_keys() {
    let map = map5();
    let mut keys: Vec<_> = map.keys().collect();
    keys.sort_unstable();
    assert_eq!(keys, vec![1, 2, 3, 4, 5]);
}

// values returns all the values
#[test]
fn test_values() {
    let map = map5();
    let mut values: Vec<_> = map.values().collect();
    values.sort_unstable();
    assert_eq!(values, vec!["A", "B", "C", "D", "E"]);
}

// iter yields every key paired with its value
#[test]
fn test_iter() {
    let map = map5();
    let mut pairs: Vec<_> = map
        .iter()
        .map(|e| (*e.key(), e.value().clone()))
        .collect();
    pairs.sort_unstable();
    assert_eq!(pairs.len(), 5);
    assert_eq!(pairs[0], (1, "A".to_owned()));
    assert_eq!(pairs[4], (5, "E".to_owned()));
}

// try_insert of an absent key adds it, of a present key leaves it alone
#[test]
fn test_try_insert() {
    let map = map5();
    assert!(map.try_insert(6, "Z".to_owned()).is_ok());
    assert!(map.contains_key(&6));
    assert!(map.try_insert(1, "Z".to_owned()).is_err());
    assert_eq!(map.find(&1).unwrap().as_str(), "A");
}

// remove removes the correct key-value pair from the map
#[test]
fn test_remove() {
    let map = map5();
    map.remove(&5);
    assert_eq!(map.len(), 4);
    assert!(!map.contains_key(&5));
}

// Debug output contains every pair
#[test]
fn test_debug() {
    let map = map5();
    let s = format!("{:?}", map);
    for (k, v) in [(1, "A"), (2, "B"), (3, "C"), (4, "D"), (5, "E")] {
        assert!(s.contains(&format!("{}: {:?}", k, v)));
    }
}
