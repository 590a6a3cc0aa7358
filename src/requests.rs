//! Presentation snapshot model and the batch requests derived from it.
//!
//! Only the parts of the Slides document the sync cares about are modelled:
//! every page element's id, its alt-text description, and whether it is a shape.

use crate::placeholders::reset_keys;
use crate::replacements::ReplacementMap;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    #[serde(default)]
    pub presentation_id: String,
    #[serde(default)]
    pub slides: Vec<Page>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    /// Alt text; used as the placeholder label.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub shape: Option<Shape>,
}

/// Presence marks the element as a shape; its properties are not needed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Shape {}

impl PageElement {
    /// Placeholder label of a shape element, if it has a non-empty one.
    fn placeholder(&self) -> Option<&str> {
        self.shape.as_ref()?;
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

/// One entry of a `presentations.batchUpdate` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    DeleteText(DeleteText),
    InsertText(InsertText),
    ReplaceAllText(ReplaceAllText),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteText {
    pub object_id: String,
    pub text_range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRange {
    #[serde(rename = "type")]
    pub kind: RangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeType {
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub object_id: String,
    pub insertion_index: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllText {
    pub contains_text: SubstringMatchCriteria,
    pub replace_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatchCriteria {
    pub text: String,
    pub match_case: bool,
}

impl Request {
    pub fn clear(object_id: &str) -> Self {
        Request::DeleteText(DeleteText {
            object_id: object_id.to_string(),
            text_range: TextRange {
                kind: RangeType::All,
            },
        })
    }

    pub fn insert(object_id: &str, text: &str) -> Self {
        Request::InsertText(InsertText {
            object_id: object_id.to_string(),
            insertion_index: 0,
            text: text.to_string(),
        })
    }

    pub fn replace_all(find: &str, replace: &str) -> Self {
        Request::ReplaceAllText(ReplaceAllText {
            contains_text: SubstringMatchCriteria {
                text: find.to_string(),
                match_case: true,
            },
            replace_text: replace.to_string(),
        })
    }
}

/// Clear-then-insert pairs for every shape whose alt text names a key in `map`.
pub fn update_requests(presentation: &Presentation, map: &ReplacementMap) -> Vec<Request> {
    let mut requests = Vec::new();
    for slide in &presentation.slides {
        for element in &slide.page_elements {
            let Some(label) = element.placeholder() else {
                continue;
            };
            let Some(text) = map.get(label) else {
                continue;
            };
            debug!("match: {label} -> {}/{}", slide.object_id, element.object_id);
            requests.push(Request::clear(&element.object_id));
            requests.push(Request::insert(&element.object_id, text));
        }
    }
    requests
}

/// Replaces every occurrence of each known placeholder key with itself.
pub fn reset_requests() -> Vec<Request> {
    reset_keys()
        .iter()
        .map(|key| Request::replace_all(key, key))
        .collect()
}
