//! Hash map utilities with ahash-backed hashing
//!
//! Symbol tables are looked up once per identifier reference, so they use
//! ahash for consistent performance. Nothing in the engine iterates these maps
//! to produce output; emission order always follows the source tree.

use ahash::RandomState;
use std::collections::{HashMap, HashSet};

/// Create a new `HashMap` with the ahash hasher
///
/// # Example
///
/// ```rust
/// use stylable_core::utils::hashers::create_hash_map;
///
/// let mut map = create_hash_map::<String, i32>();
/// map.insert("root".to_string(), 1);
/// ```
#[must_use]
pub fn create_hash_map<K, V>() -> HashMap<K, V, RandomState> {
    HashMap::with_hasher(RandomState::new())
}

/// Create a new `HashSet` with the ahash hasher
#[must_use]
pub fn create_hash_set<T>() -> HashSet<T, RandomState> {
    HashSet::with_hasher(RandomState::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_and_sets_work() {
        let mut map = create_hash_map::<&str, usize>();
        map.insert("a", 1);
        assert_eq!(map.get("a"), Some(&1));

        let mut set = create_hash_set();
        assert!(set.insert("x"));
        assert!(!set.insert("x"));
    }
}
