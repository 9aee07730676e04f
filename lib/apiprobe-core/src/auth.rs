use std::fmt;

use http::HeaderValue;
use http::header::{AUTHORIZATION, HeaderName, InvalidHeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ProbeError;

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
///
/// Used for passwords and tokens. `Debug` never shows the value and `Display`
/// only shows a masked preview.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the inner value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Masked preview, safe for logs and reports.
    ///
    /// At most a quarter of the value, and never more than its last 4
    /// characters, is revealed.
    pub fn masked(&self) -> String {
        let len = self.0.chars().count();
        if len <= 8 {
            return "***".to_string();
        }
        let revealed = (len / 4).min(4);
        let tail: String = self.0.chars().skip(len - revealed).collect();
        format!("***{tail}")
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Username and password sent once to the login endpoint.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecureString,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

impl Credentials {
    /// Creates credentials, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidCredentials`] if the username or password is empty.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> Result<Self, ProbeError> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(ProbeError::InvalidCredentials {
                reason: "username must not be empty",
            });
        }
        if password.is_empty() {
            return Err(ProbeError::InvalidCredentials {
                reason: "password must not be empty",
            });
        }
        Ok(Self { username, password })
    }

    /// The login username.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn login_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&LoginRequest {
            username: &self.username,
            password: self.password.as_str(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Prefix used in the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScheme {
    /// `Authorization: Token <token>` (Django REST framework token auth).
    #[default]
    Token,
    /// `Authorization: Bearer <token>` (RFC 6750).
    Bearer,
}

impl TokenScheme {
    /// The header value prefix for this scheme.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Token => "Token",
            Self::Bearer => "Bearer",
        }
    }

    /// Builds the `Authorization` header for the given token.
    ///
    /// # Errors
    ///
    /// Fails if the token contains characters that are not allowed in a header.
    pub fn to_header(
        self,
        token: &SecureString,
    ) -> Result<(HeaderName, HeaderValue), InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("{} {}", self.prefix(), token.as_str()))?;
        value.set_sensitive(true);
        Ok((AUTHORIZATION, value))
    }
}

/// Identifier of the logged-in user, numeric or textual (e.g. a UUID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserId {
    /// An integer id.
    Number(i64),
    /// Any other id, kept as text.
    Text(String),
}

impl UserId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(
                number
                    .as_i64()
                    .map_or_else(|| Self::Text(number.to_string()), Self::Number),
            ),
            Value::String(text) if !text.is_empty() => Some(Self::Text(text.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Optional identity fields returned next to the token by the login endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginProfile {
    /// `user_id` field.
    pub user_id: Option<UserId>,
    /// `username` field.
    pub username: Option<String>,
    /// `role` field.
    pub role: Option<String>,
    /// `email` field.
    pub email: Option<String>,
}

impl LoginProfile {
    pub(crate) fn from_login_response(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            user_id: value.get("user_id").and_then(UserId::from_value),
            username: text("username"),
            role: text("role"),
            email: text("email"),
        }
    }
}

/// Short-lived context of one probing run: the base URL and, after a
/// successful login, the token.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: Url,
    token: Option<SecureString>,
    profile: Option<LoginProfile>,
}

impl Session {
    /// A session without token: requests are sent unauthenticated.
    pub fn anonymous(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            profile: None,
        }
    }

    pub(crate) fn authenticated(base_url: Url, token: SecureString, profile: LoginProfile) -> Self {
        Self {
            base_url,
            token: Some(token),
            profile: Some(profile),
        }
    }

    /// The base URL every endpoint path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token obtained at login, if any.
    pub fn token(&self) -> Option<&SecureString> {
        self.token.as_ref()
    }

    /// The identity fields returned at login, if any.
    pub fn profile(&self) -> Option<&LoginProfile> {
        self.profile.as_ref()
    }

    /// Whether requests will carry an `Authorization` header.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
