use std::collections::btree_map::Entry;

use super::{total_time_key, Summary};

/// Rebuilds the derived total-time entry of every application.
///
/// The previous total is dropped before summing, so a stale or doubled total never
/// contributes to the new one. Calling this twice is the same as calling it once.
pub fn recompute_total_time(summary: &mut Summary) {
    for (app_name, record) in summary.apps_mut() {
        let key = total_time_key(app_name);
        record.remove(&key);
        let total = record.sum();
        record.insert(key, total);
    }
}

/// Merges two summaries into a new one.
///
/// Titles present in both are added together. `second`'s total-time entries are folded in
/// like any other title, which double counts them until the final recompute rebuilds every
/// total from the real entries.
pub fn combine(first: &Summary, second: &Summary) -> Summary {
    let mut combined = first.clone();
    recompute_total_time(&mut combined);

    for (app_name, record) in second.apps() {
        match combined.app_entry(app_name.to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
            }
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                for (title, seconds) in record.iter() {
                    existing.add(title, seconds);
                }
            }
        }
    }

    recompute_total_time(&mut combined);
    combined
}

/// Folds any number of summaries with [combine], starting from an empty one.
pub fn combine_all<'a>(summaries: impl IntoIterator<Item = &'a Summary>) -> Summary {
    summaries
        .into_iter()
        .fold(Summary::new(), |total, next| combine(&total, next))
}
