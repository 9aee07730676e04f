//! Classification of JSON response bodies.
//!
//! A response is classified once with [`classify`], then summarized with
//! [`ShapeSummary::of`]: item count, sample keys and pagination metadata.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Top-level structure of a JSON response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// A JSON object that is not a paginated envelope.
    Object,
    /// A bare JSON array.
    List,
    /// An object with both `count` and `results` fields.
    PaginatedList,
    /// Any other JSON value (string, number, boolean, null), or an empty body.
    Unknown,
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Object => "object",
            Self::List => "list",
            Self::PaginatedList => "paginated_list",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classifies a JSON value.
pub fn classify(value: &Value) -> ResponseShape {
    match value {
        Value::Object(map) if map.contains_key("results") && map.contains_key("count") => {
            ResponseShape::PaginatedList
        }
        Value::Object(_) => ResponseShape::Object,
        Value::Array(_) => ResponseShape::List,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            ResponseShape::Unknown
        }
    }
}

/// Metadata of a paginated envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// The `count` field, total number of items across pages.
    pub count: Option<u64>,
    /// `next` is present and not null.
    pub has_next: bool,
    /// `previous` is present and not null.
    pub has_previous: bool,
}

/// Normalized summary of a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeSummary {
    /// The classified shape.
    pub shape: ResponseShape,
    /// Number of items for lists and paginated envelopes.
    pub item_count: Option<usize>,
    /// Keys of the first item for lists, or of the object itself.
    pub sample_keys: Vec<String>,
    /// Keys of the top-level object, empty for non-objects.
    pub top_level_keys: Vec<String>,
    /// Pagination metadata for paginated envelopes.
    pub pagination: Option<PageInfo>,
}

impl ShapeSummary {
    /// Summarizes a JSON value. Key order follows the document.
    pub fn of(value: &Value) -> Self {
        let shape = classify(value);
        let top_level_keys = value.as_object().map(keys_of).unwrap_or_default();

        match (shape, value) {
            (ResponseShape::PaginatedList, Value::Object(map)) => {
                let results = map.get("results").and_then(Value::as_array);
                Self {
                    shape,
                    item_count: results.map(Vec::len),
                    sample_keys: results.map(|items| first_item_keys(items)).unwrap_or_default(),
                    top_level_keys,
                    pagination: Some(PageInfo {
                        count: map.get("count").and_then(Value::as_u64),
                        has_next: map.get("next").is_some_and(|next| !next.is_null()),
                        has_previous: map.get("previous").is_some_and(|prev| !prev.is_null()),
                    }),
                }
            }
            (ResponseShape::List, Value::Array(items)) => Self {
                shape,
                item_count: Some(items.len()),
                sample_keys: first_item_keys(items),
                top_level_keys,
                pagination: None,
            },
            _ => Self {
                shape,
                item_count: None,
                sample_keys: top_level_keys.clone(),
                top_level_keys,
                pagination: None,
            },
        }
    }

    /// Summary of a success response without body, such as `204 No Content`.
    pub fn empty() -> Self {
        Self {
            shape: ResponseShape::Unknown,
            item_count: None,
            sample_keys: Vec::new(),
            top_level_keys: Vec::new(),
            pagination: None,
        }
    }

    /// Whether `key` appears at the top level or in the sampled item.
    pub fn has_key(&self, key: &str) -> bool {
        self.top_level_keys.iter().any(|it| it == key)
            || self.sample_keys.iter().any(|it| it == key)
    }
}

fn keys_of(map: &Map<String, Value>) -> Vec<String> {
    map.keys().cloned().collect()
}

fn first_item_keys(items: &[Value]) -> Vec<String> {
    items
        .first()
        .and_then(Value::as_object)
        .map(keys_of)
        .unwrap_or_default()
}
