use std::collections::HashSet;

use crate::types::Item;

/// Items of `current` whose link is not in `previous`, in `current` order.
/// With no previous items everything counts as new.
pub fn new_items(current: &[Item], previous: &[Item]) -> Vec<Item> {
    if previous.is_empty() {
        return current.to_vec();
    }

    let seen: HashSet<&str> = previous.iter().map(|i| i.link.as_str()).collect();
    current
        .iter()
        .filter(|item| !seen.contains(item.link.as_str()))
        .cloned()
        .collect()
}
