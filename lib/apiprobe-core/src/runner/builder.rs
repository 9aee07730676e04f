use std::time::Duration;

use url::Url;

use super::{DEFAULT_LOGIN_PATH, ProbeRunner};
use crate::{ProbeError, SuccessCodes, TokenScheme};

/// Builder for [`ProbeRunner`].
///
/// # Default Configuration
///
/// - **Login path**: `/auth/login/`
/// - **Token scheme**: `Token` (`Authorization: Token <token>`)
/// - **Success statuses**: any `2xx`
/// - **Timeout**: the HTTP client default
///
/// # Example
///
/// ```rust
/// use apiprobe_core::{ProbeRunner, SuccessCodes, TokenScheme};
///
/// # fn example() -> Result<(), apiprobe_core::ProbeError> {
/// let runner = ProbeRunner::builder("http://localhost:8000/api")
///     .with_token_scheme(TokenScheme::Bearer)
///     .with_success_codes(SuccessCodes::strict())
///     .build()?;
///
/// assert_eq!(runner.base_url().as_str(), "http://localhost:8000/api");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProbeRunnerBuilder {
    base_url: String,
    login_path: String,
    token_scheme: TokenScheme,
    success_codes: SuccessCodes,
    timeout: Option<Duration>,
}

impl ProbeRunnerBuilder {
    pub(super) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            token_scheme: TokenScheme::default(),
            success_codes: SuccessCodes::default(),
            timeout: None,
        }
    }

    /// Sets the path of the login endpoint, relative to the base URL.
    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Sets the `Authorization` header scheme.
    #[must_use]
    pub fn with_token_scheme(mut self, token_scheme: TokenScheme) -> Self {
        self.token_scheme = token_scheme;
        self
    }

    /// Sets the statuses treated as success.
    #[must_use]
    pub fn with_success_codes(mut self, success_codes: SuccessCodes) -> Self {
        self.success_codes = success_codes;
        self
    }

    /// Sets a total timeout for each request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the runner.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::InvalidBaseUrl`] if the base URL is empty, relative, or not `http`/`https`
    /// - [`ProbeError::ReqwestError`] if the HTTP client cannot be created
    pub fn build(self) -> Result<ProbeRunner, ProbeError> {
        let Self {
            base_url,
            login_path,
            token_scheme,
            success_codes,
            timeout,
        } = self;

        let base_url = parse_base_url(&base_url)?;

        let client = reqwest::Client::builder();
        let client = if let Some(timeout) = timeout {
            client.timeout(timeout)
        } else {
            client
        };
        let client = client.build()?;

        Ok(ProbeRunner {
            client,
            base_url,
            login_path,
            token_scheme,
            success_codes,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ProbeError> {
    let invalid = |reason: &str| ProbeError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    let url = Url::parse(raw).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not contain a query or fragment"));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("http://localhost:8000/api")]
    #[case("https://hr.example.com/api/")]
    #[case("http://127.0.0.1:8000")]
    fn test_valid_base_url(#[case] raw: &str) {
        assert!(parse_base_url(raw).is_ok());
    }

    #[rstest]
    #[case("", "must not be empty")]
    #[case("   ", "must not be empty")]
    #[case("/api", "relative URL without a base")]
    #[case("ftp://example.com/api", "scheme must be http or https")]
    #[case("localhost:8000/api", "scheme must be http or https")]
    #[case("http://x/api?page=1", "must not contain a query or fragment")]
    fn test_invalid_base_url(#[case] raw: &str, #[case] reason: &str) {
        let error = parse_base_url(raw).expect_err("should be rejected");
        let ProbeError::InvalidBaseUrl { reason: actual, .. } = error else {
            panic!("unexpected error: {error:?}");
        };
        assert_eq!(actual, reason);
    }

    #[test]
    fn test_builder_defaults() {
        let runner = ProbeRunner::builder("http://x/api")
            .build()
            .expect("valid runner");

        assert_eq!(runner.base_url().as_str(), "http://x/api");
        assert_eq!(runner.login_path, "/auth/login/");
        assert_eq!(runner.token_scheme, TokenScheme::Token);
        assert!(runner.success_codes.contains(204));
    }

    #[test]
    fn test_builder_overrides() {
        let runner = ProbeRunner::builder("http://x/api")
            .with_login_path("/token/")
            .with_token_scheme(TokenScheme::Bearer)
            .with_success_codes(SuccessCodes::strict())
            .with_timeout(Duration::from_secs(5))
            .build()
            .expect("valid runner");

        assert_eq!(runner.login_path, "/token/");
        assert_eq!(runner.token_scheme, TokenScheme::Bearer);
        assert!(!runner.success_codes.contains(204));
    }
}
