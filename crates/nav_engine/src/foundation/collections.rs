//! Specialized collection types

pub use slotmap::{new_key_type, Key, SlotMap};

/// Handle-based map using slot map for stable references
///
/// Keys stay valid across insertions and removals of other entries, which is
/// what lets several lists (a navigation stack and a cache, for example)
/// point at the same stored value.
pub type HandleMap<K, T> = SlotMap<K, T>;

/// Remove every entry of `keys` equal to `key`, returning how many were removed
pub fn remove_key<K: Key>(keys: &mut Vec<K>, key: K) -> usize {
    let before = keys.len();
    keys.retain(|k| *k != key);
    before - keys.len()
}
