use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::shape::{ResponseShape, ShapeSummary};

/// Shape a well-formed response of an endpoint is expected to have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedShape {
    /// Any JSON object, paginated envelopes included.
    #[default]
    Object,
    /// A bare JSON array.
    List,
    /// A `{count, next, previous, results}` envelope.
    PaginatedList,
}

impl ExpectedShape {
    /// Whether a classified response satisfies this expectation.
    pub fn accepts(self, shape: ResponseShape) -> bool {
        matches!(
            (self, shape),
            (Self::Object, ResponseShape::Object | ResponseShape::PaginatedList)
                | (Self::List, ResponseShape::List)
                | (Self::PaginatedList, ResponseShape::PaginatedList)
        )
    }
}

/// One endpoint to probe and what its response should contain.
///
/// # Example
///
/// ```rust
/// use apiprobe_core::{EndpointDescriptor, ExpectedShape};
///
/// let users = EndpointDescriptor::paginated("/users/")
///     .with_name("Users")
///     .with_key_fields(["id", "username"]);
///
/// assert_eq!(users.expected_shape(), ExpectedShape::PaginatedList);
/// assert_eq!(users.label(), "Users");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointDescriptor {
    path: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    expected_shape: ExpectedShape,
    #[serde(default)]
    key_fields: IndexSet<String>,
}

impl EndpointDescriptor {
    /// An endpoint expected to return a JSON object.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            expected_shape: ExpectedShape::Object,
            key_fields: IndexSet::new(),
        }
    }

    /// An endpoint expected to return a paginated envelope.
    pub fn paginated(path: impl Into<String>) -> Self {
        Self::new(path).with_expected_shape(ExpectedShape::PaginatedList)
    }

    /// An endpoint expected to return a bare list.
    pub fn list(path: impl Into<String>) -> Self {
        Self::new(path).with_expected_shape(ExpectedShape::List)
    }

    /// Sets a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the expected shape.
    #[must_use]
    pub fn with_expected_shape(mut self, expected_shape: ExpectedShape) -> Self {
        self.expected_shape = expected_shape;
        self
    }

    /// Adds fields the response must contain.
    #[must_use]
    pub fn with_key_fields<I, S>(mut self, key_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_fields.extend(key_fields.into_iter().map(Into::into));
        self
    }

    /// The path appended to the base URL, e.g. `/users/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The display name, falling back to the path.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }

    /// The expected shape.
    pub fn expected_shape(&self) -> ExpectedShape {
        self.expected_shape
    }

    /// Fields the response must contain.
    pub fn key_fields(&self) -> &IndexSet<String> {
        &self.key_fields
    }

    /// Key fields absent from both the top-level object and the sampled item.
    pub fn missing_keys(&self, summary: &ShapeSummary) -> Vec<String> {
        self.key_fields
            .iter()
            .filter(|key| !summary.has_key(key))
            .cloned()
            .collect()
    }
}
