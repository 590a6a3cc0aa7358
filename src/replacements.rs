use crate::placeholders::{WEEKLY_KEYS, english_key};
use serde_json::Value;
use std::collections::HashMap;

/// Placeholder label to the text that should replace it.
pub type ReplacementMap = HashMap<String, String>;

/// Builds the replacement map for one weekly payload.
///
/// All weekly keys are always present. Each entry under `songs` whose value is
/// an object contributes `<key>` (from `main`) and `<key>_eng` (from `eng`);
/// anything else under `songs` is ignored. Missing fields become `""`.
pub fn build_replacement_map(data: &Value) -> ReplacementMap {
    let mut map: ReplacementMap = WEEKLY_KEYS
        .iter()
        .map(|&key| (key.to_string(), field_text(data.get(key))))
        .collect();

    if let Some(songs) = data.get("songs").and_then(Value::as_object) {
        for (song_key, lyrics) in songs {
            if !lyrics.is_object() {
                continue;
            }
            map.insert(song_key.clone(), field_text(lyrics.get("main")));
            map.insert(english_key(song_key), field_text(lyrics.get("eng")));
        }
    }

    map
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_payload_yields_blank_weekly_keys() {
        let map = build_replacement_map(&json!({}));
        assert_eq!(map.len(), WEEKLY_KEYS.len());
        for key in WEEKLY_KEYS {
            assert_eq!(map[key], "");
        }
    }

    #[test]
    fn weekly_and_song_fields() {
        let map = build_replacement_map(&json!({
            "week_number": "3",
            "songs": {
                "song_1": {"main": "Amazing Grace", "eng": "Amazing Grace (EN)"}
            }
        }));
        assert_eq!(map["week_number"], "3");
        assert_eq!(map["week_suffix"], "");
        assert_eq!(map["MN_SundayS"], "");
        assert_eq!(map["song_1"], "Amazing Grace");
        assert_eq!(map["song_1_eng"], "Amazing Grace (EN)");
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn song_subfields_default_independently() {
        let map = build_replacement_map(&json!({
            "songs": {
                "song_2": {"main": "Be Thou My Vision"},
                "song_3": {"eng": "How Great Thou Art"},
                "song_4": {}
            }
        }));
        assert_eq!(map["song_2"], "Be Thou My Vision");
        assert_eq!(map["song_2_eng"], "");
        assert_eq!(map["song_3"], "");
        assert_eq!(map["song_3_eng"], "How Great Thou Art");
        assert_eq!(map["song_4"], "");
        assert_eq!(map["song_4_eng"], "");
    }

    #[test]
    fn non_object_songs_are_skipped() {
        let map = build_replacement_map(&json!({
            "songs": {
                "song_1": "just a title",
                "song_2": null,
                "song_3": ["verse"],
                "song_4": {"main": "kept"}
            }
        }));
        assert!(!map.contains_key("song_1"));
        assert!(!map.contains_key("song_2_eng"));
        assert!(!map.contains_key("song_3"));
        assert_eq!(map["song_4"], "kept");
    }

    #[test]
    fn scalars_are_stringified() {
        let map = build_replacement_map(&json!({
            "week_number": 12,
            "BN_offering": 1520.5,
            "MN_offering": null,
            "PN_offering": true,
            "extra": "ignored"
        }));
        assert_eq!(map["week_number"], "12");
        assert_eq!(map["BN_offering"], "1520.5");
        assert_eq!(map["MN_offering"], "");
        assert_eq!(map["PN_offering"], "true");
        assert!(!map.contains_key("extra"));
    }

    #[test]
    fn non_object_payloads_fall_back_to_defaults() {
        for payload in [json!([1, 2]), json!("text"), json!({"songs": [1]})] {
            let map = build_replacement_map(&payload);
            assert_eq!(map.len(), WEEKLY_KEYS.len());
        }
    }
}
