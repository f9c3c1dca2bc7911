//! Explicit grouping of flat row lists.
//!
//! Aggregation stages never carry an implicit "current group": they call
//! `group_by` to get `(key, rows)` pairs and reduce each pair on its own.

use std::collections::HashMap;
use std::hash::Hash;

/// Partition `items` by `key_fn`.
///
/// Groups come out in the order their key was first seen, and rows keep
/// their input order within a group, so the result is deterministic for a
/// given input.
pub fn group_by<T, K, F>(items: Vec<T>, key_fn: F) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for item in items {
        let key = key_fn(&item);
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }

    groups
}
