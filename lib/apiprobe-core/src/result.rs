use std::fmt;

use serde::Serialize;

use crate::EndpointDescriptor;
use crate::shape::{PageInfo, ResponseShape, ShapeSummary};

/// Maximum number of characters kept from an error response body.
pub(crate) const BODY_MAX_LENGTH: usize = 1024;

/// Why an endpoint could not be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeFailure {
    /// No HTTP response was received (connection refused, timeout, ...).
    Connection {
        /// Transport error message.
        message: String,
    },
    /// The request could not be built.
    Request {
        /// Description of the problem.
        message: String,
    },
    /// The server answered with a non-success status.
    Status {
        /// Response body, possibly truncated.
        body: String,
    },
    /// The body of a success response is not readable JSON.
    MalformedBody {
        /// Parsing or reading error message.
        message: String,
    },
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection { message } => write!(f, "connection failure: {message}"),
            Self::Request { message } => write!(f, "invalid request: {message}"),
            Self::Status { body } => write!(f, "unexpected status: {body}"),
            Self::MalformedBody { message } => write!(f, "malformed body: {message}"),
        }
    }
}

/// Outcome of probing one endpoint.
///
/// Only produced after a request was issued for the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    status_code: Option<u16>,
    shape_matched: bool,
    shape: Option<ResponseShape>,
    item_count: Option<usize>,
    sample_keys: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<PageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<ProbeFailure>,
}

impl ProbeResult {
    pub(crate) fn inspected(
        descriptor: &EndpointDescriptor,
        status_code: u16,
        summary: ShapeSummary,
    ) -> Self {
        let missing_keys = descriptor.missing_keys(&summary);
        let shape_matched =
            descriptor.expected_shape().accepts(summary.shape) && missing_keys.is_empty();
        let ShapeSummary {
            shape,
            item_count,
            sample_keys,
            top_level_keys: _,
            pagination,
        } = summary;

        Self {
            endpoint: descriptor.path().to_string(),
            name: descriptor.name().map(str::to_string),
            status_code: Some(status_code),
            shape_matched,
            shape: Some(shape),
            item_count,
            sample_keys,
            missing_keys,
            pagination,
            failure: None,
        }
    }

    pub(crate) fn failed(
        descriptor: &EndpointDescriptor,
        status_code: Option<u16>,
        failure: ProbeFailure,
    ) -> Self {
        Self {
            endpoint: descriptor.path().to_string(),
            name: descriptor.name().map(str::to_string),
            status_code,
            shape_matched: false,
            shape: None,
            item_count: None,
            sample_keys: Vec::new(),
            missing_keys: Vec::new(),
            pagination: None,
            failure: Some(failure),
        }
    }

    /// The probed path.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The descriptor's display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// HTTP status, absent when no response was received.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Whether the response had the expected shape and every key field.
    pub fn shape_matched(&self) -> bool {
        self.shape_matched
    }

    /// The classified shape of a success response.
    pub fn shape(&self) -> Option<ResponseShape> {
        self.shape
    }

    /// Number of items for lists and paginated envelopes.
    pub fn item_count(&self) -> Option<usize> {
        self.item_count
    }

    /// Keys of the first item, or of the object itself.
    pub fn sample_keys(&self) -> &[String] {
        &self.sample_keys
    }

    /// Key fields the response lacked.
    pub fn missing_keys(&self) -> &[String] {
        &self.missing_keys
    }

    /// Pagination metadata of a paginated envelope.
    pub fn pagination(&self) -> Option<&PageInfo> {
        self.pagination.as_ref()
    }

    /// Why the endpoint could not be inspected, if it could not.
    pub fn failure(&self) -> Option<&ProbeFailure> {
        self.failure.as_ref()
    }
}

/// Keeps at most [`BODY_MAX_LENGTH`] characters of a response body.
pub(crate) fn truncate_body(body: String) -> String {
    match body.char_indices().nth(BODY_MAX_LENGTH) {
        Some((index, _)) => format!("{}... (truncated)", body.get(..index).unwrap_or_default()),
        None => body,
    }
}
