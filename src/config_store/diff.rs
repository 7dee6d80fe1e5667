use std::{collections::BTreeSet, time::Instant};

use super::{ConfigChange, ConfigSnapshot};

/// Compares two snapshots and returns one change per differing variable.
///
/// Keys are reported in sorted order. Identical snapshots, including two
/// handles to the same allocation, produce no changes.
pub fn diff_snapshots(old: &ConfigSnapshot, new: &ConfigSnapshot) -> Vec<ConfigChange> {
    if old.ptr_eq(new) {
        return Vec::new();
    }

    let timestamp = Instant::now();
    let keys: BTreeSet<&str> = old.iter().chain(new.iter()).map(|(k, _)| k).collect();

    keys.into_iter()
        .filter_map(|key| {
            let old_value = old.get(key);
            let new_value = new.get(key);

            if old_value == new_value {
                return None;
            }

            Some(ConfigChange {
                key: key.to_string(),
                old_value: old_value.map(str::to_string),
                new_value: new_value.map(str::to_string),
                timestamp,
            })
        })
        .collect()
}

/// Checks if a variable name matches a subscription pattern
///
/// # Arguments
/// * `key` - The variable name, possibly dot-separated
/// * `pattern` - The pattern to match against (supports "*" as wildcard segment)
///
/// # Examples
/// * `"greeting"` matches `"greeting"`
/// * `"db.host"` matches `"db.*"`
/// * `"db.host"` matches `"*"`
pub(super) fn key_matches(key: &str, pattern: &str) -> bool {
    const WILDCARD: &str = "*";

    if pattern == WILDCARD {
        return true;
    };

    let key_parts: Vec<&str> = key.split('.').collect();
    let pattern_parts: Vec<&str> = pattern.split('.').collect();

    if pattern_parts.last() != Some(&WILDCARD) && key_parts.len() != pattern_parts.len() {
        return false;
    }

    if key_parts.len() < pattern_parts.len() {
        return false;
    }

    for (key_part, pattern_part) in key_parts.iter().zip(pattern_parts.iter()) {
        if pattern_part == &WILDCARD {
            continue;
        }

        if key_part != pattern_part {
            return false;
        }
    }

    true
}
