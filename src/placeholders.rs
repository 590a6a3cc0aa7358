//! Placeholder keys known to the slide template.
//!
//! Both the replacement map and the reset batch are derived from this list.

use std::ops::RangeInclusive;

/// Scalar fields refreshed every week.
pub const WEEKLY_KEYS: [&str; 7] = [
    "week_number",
    "week_suffix",
    "BN_offering",
    "MN_offering",
    "PN_offering",
    "BN_SundayS",
    "MN_SundayS",
];

/// Song slots present in the template, `song_1` through `song_10`.
pub const SONG_SLOTS: RangeInclusive<u32> = 1..=10;

pub const ENGLISH_SUFFIX: &str = "_eng";

pub fn song_key(slot: u32) -> String {
    format!("song_{slot}")
}

pub fn english_key(key: &str) -> String {
    format!("{key}{ENGLISH_SUFFIX}")
}

/// Every placeholder the template is expected to carry: weekly keys first,
/// then each song slot followed by its English counterpart.
pub fn reset_keys() -> Vec<String> {
    let mut keys: Vec<String> = WEEKLY_KEYS.iter().map(|k| k.to_string()).collect();
    for slot in SONG_SLOTS {
        let key = song_key(slot);
        let english = english_key(&key);
        keys.push(key);
        keys.push(english);
    }
    keys
}
