use serde::Serialize;

use crate::config::ConfigError;

/// Errors that prevent a probe run from being set up.
///
/// Per-endpoint failures are not errors: they are captured in
/// [`ProbeResult`](crate::ProbeResult) so that a run always completes.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ProbeError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when the client cannot be constructed (e.g. TLS backend setup).
    ReqwestError(reqwest::Error),

    /// JSON serialization error, raised when rendering a report.
    JsonValueError(serde_json::Error),

    /// The configuration could not be loaded or is invalid.
    Config(ConfigError),

    /// The base URL is not an absolute `http`/`https` URL.
    #[display("Invalid base URL '{url}': {reason}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// Username or password is empty or missing.
    #[display("Invalid credentials: {reason}")]
    #[from(skip)]
    InvalidCredentials {
        /// What is wrong with the credentials.
        reason: &'static str,
    },
}

/// Why a login attempt did not produce an authenticated session.
///
/// Carries the raw status and body so the failure can be displayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Error, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthFailure {
    /// No HTTP response was received from the login endpoint.
    #[display("Could not reach the login endpoint: {message}")]
    Connection {
        /// Transport error message.
        message: String,
    },

    /// The login request could not be built.
    #[display("Invalid login request: {message}")]
    Request {
        /// Description of the problem.
        message: String,
    },

    /// The server answered with a non-success status.
    #[display("Login rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the server.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The server answered with a success status but no usable `token` field.
    #[display("Login response (status {status}) does not contain a token: {body}")]
    MissingToken {
        /// HTTP status code returned by the server.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The returned token cannot be sent in an `Authorization` header.
    #[display("Login returned an unusable token: {message}")]
    InvalidToken {
        /// Description of the problem.
        message: String,
    },
}

impl AuthFailure {
    /// The HTTP status of the login response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::MissingToken { status, .. } => Some(*status),
            Self::Connection { .. } | Self::Request { .. } | Self::InvalidToken { .. } => None,
        }
    }
}
