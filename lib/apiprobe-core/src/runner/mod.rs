use http::Method;
use http::header::{HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

mod builder;
pub use self::builder::ProbeRunnerBuilder;

mod execution;

use crate::auth::{Credentials, LoginProfile, SecureString, Session, TokenScheme};
use crate::report::{LoginOutcome, ProbeReport};
use crate::result::{ProbeFailure, ProbeResult, truncate_body};
use crate::shape::ShapeSummary;
use crate::{AuthFailure, EndpointDescriptor, ProbeConfig, ProbeError, SuccessCodes};

pub(crate) const DEFAULT_LOGIN_PATH: &str = "/auth/login/";

/// Logs in against a web API and probes its endpoints, one request at a time.
///
/// Every failure met while probing an endpoint is recorded in its
/// [`ProbeResult`]; a run never stops half-way.
///
/// # Example
///
/// ```rust,no_run
/// use apiprobe_core::{Credentials, EndpointDescriptor, ProbeRunner};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let runner = ProbeRunner::builder("http://localhost:8000/api").build()?;
/// let credentials = Credentials::new("admin", "admin123")?;
///
/// let session = runner.authenticate(&credentials).await?;
/// let results = runner
///     .probe(&session, &[EndpointDescriptor::paginated("/users/")])
///     .await;
///
/// for result in &results {
///     println!("{} -> {:?}", result.endpoint(), result.status_code());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProbeRunner {
    client: reqwest::Client,
    base_url: Url,
    login_path: String,
    token_scheme: TokenScheme,
    success_codes: SuccessCodes,
}

// Create
impl ProbeRunner {
    /// Starts building a runner for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> ProbeRunnerBuilder {
        ProbeRunnerBuilder::new(base_url)
    }

    /// Builds a runner from a configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration or its base URL is invalid.
    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        config.validate()?;

        let success_codes = if config.strict_status {
            SuccessCodes::strict()
        } else {
            SuccessCodes::default()
        };
        let builder = Self::builder(config.base_url.clone())
            .with_login_path(config.login_path.clone())
            .with_token_scheme(config.token_scheme)
            .with_success_codes(success_codes);
        let builder = match config.timeout() {
            Some(timeout) => builder.with_timeout(timeout),
            None => builder,
        };
        builder.build()
    }

    /// The base URL every path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// A session without token, for unauthenticated probing.
    pub fn anonymous_session(&self) -> Session {
        Session::anonymous(self.base_url.clone())
    }
}

// Authenticate
impl ProbeRunner {
    /// Logs in with a single `POST` to the login endpoint.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] carrying the raw status and body when the
    /// server is unreachable, answers with a non-success status, or omits the
    /// `token` field.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthFailure> {
        let url = Self::build_url(&self.base_url, &self.login_path).map_err(|err| {
            AuthFailure::Request {
                message: err.to_string(),
            }
        })?;
        let body = credentials
            .login_body()
            .map_err(|err| AuthFailure::Request {
                message: err.to_string(),
            })?;
        let request = Self::build_request(Method::POST, url, None, Some(body));

        info!(username = credentials.username(), "logging in");
        let exchanged = self.exchange(request).await.map_err(|err| {
            warn!(%err, "login endpoint unreachable");
            AuthFailure::Connection {
                message: err.to_string(),
            }
        })?;

        let status = exchanged.status.as_u16();
        let body = exchanged
            .body
            .map_err(|message| AuthFailure::Connection { message })?;

        if !self.success_codes.contains(status) {
            warn!(status, "login rejected");
            return Err(AuthFailure::Rejected {
                status,
                body: truncate_body(body),
            });
        }

        let value = serde_json::from_str::<Value>(&body).ok();
        let token = value
            .as_ref()
            .and_then(|value| value.get("token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(SecureString::from);
        let (Some(value), Some(token)) = (value, token) else {
            warn!(status, "login response without token");
            return Err(AuthFailure::MissingToken {
                status,
                body: truncate_body(body),
            });
        };

        self.token_scheme
            .to_header(&token)
            .map_err(|err| AuthFailure::InvalidToken {
                message: err.to_string(),
            })?;

        let profile = LoginProfile::from_login_response(&value);
        info!(%token, role = ?profile.role, "logged in");

        Ok(Session::authenticated(
            self.base_url.clone(),
            token,
            profile,
        ))
    }
}

// Probe
impl ProbeRunner {
    /// Issues one `GET` per descriptor, in order, and returns one result each.
    ///
    /// The `Authorization` header is sent only when the session holds a token.
    pub async fn probe(
        &self,
        session: &Session,
        descriptors: &[EndpointDescriptor],
    ) -> Vec<ProbeResult> {
        let authorization = match session.token() {
            Some(token) => self
                .token_scheme
                .to_header(token)
                .map(Some)
                .map_err(|err| err.to_string()),
            None => Ok(None),
        };

        let mut results = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let result = match &authorization {
                Ok(authorization) => {
                    self.probe_one(session, descriptor, authorization.as_ref())
                        .await
                }
                Err(message) => ProbeResult::failed(
                    descriptor,
                    None,
                    ProbeFailure::Request {
                        message: message.clone(),
                    },
                ),
            };
            results.push(result);
        }
        results
    }

    async fn probe_one(
        &self,
        session: &Session,
        descriptor: &EndpointDescriptor,
        authorization: Option<&(HeaderName, HeaderValue)>,
    ) -> ProbeResult {
        let endpoint = descriptor.path();
        let url = match Self::build_url(session.base_url(), endpoint) {
            Ok(url) => url,
            Err(err) => {
                warn!(endpoint, %err, "invalid endpoint URL");
                let failure = ProbeFailure::Request {
                    message: err.to_string(),
                };
                return ProbeResult::failed(descriptor, None, failure);
            }
        };
        let request = Self::build_request(Method::GET, url, authorization, None);

        let exchanged = match self.exchange(request).await {
            Ok(exchanged) => exchanged,
            Err(err) => {
                warn!(endpoint, %err, "connection failure");
                let failure = ProbeFailure::Connection {
                    message: err.to_string(),
                };
                return ProbeResult::failed(descriptor, None, failure);
            }
        };

        let status = exchanged.status.as_u16();
        let body = match exchanged.body {
            Ok(body) => body,
            Err(message) => {
                warn!(endpoint, status, %message, "unreadable body");
                return ProbeResult::failed(
                    descriptor,
                    Some(status),
                    ProbeFailure::MalformedBody { message },
                );
            }
        };

        if !self.success_codes.contains(status) {
            warn!(endpoint, status, "unexpected status");
            let failure = ProbeFailure::Status {
                body: truncate_body(body),
            };
            return ProbeResult::failed(descriptor, Some(status), failure);
        }

        if body.trim().is_empty() {
            info!(endpoint, status, "probed, empty body");
            return ProbeResult::inspected(descriptor, status, ShapeSummary::empty());
        }

        let value = match serde_json::from_str::<Value>(&body) {
            Ok(value) => value,
            Err(err) => {
                warn!(endpoint, status, %err, "body is not JSON");
                let failure = ProbeFailure::MalformedBody {
                    message: err.to_string(),
                };
                return ProbeResult::failed(descriptor, Some(status), failure);
            }
        };

        let result = ProbeResult::inspected(descriptor, status, ShapeSummary::of(&value));
        info!(
            endpoint,
            status,
            shape = ?result.shape(),
            items = ?result.item_count(),
            matched = result.shape_matched(),
            "probed"
        );
        result
    }
}

// Run
impl ProbeRunner {
    /// Runs a whole probing session described by a configuration.
    ///
    /// Public endpoints are probed anonymously first. Then, when credentials
    /// are configured, the runner logs in and probes the other endpoints with
    /// the token. A failed login is recorded in the report and the endpoints
    /// are probed unauthenticated.
    ///
    /// # Errors
    ///
    /// Fails only if the configured credentials are incomplete or empty.
    pub async fn run(&self, config: &ProbeConfig) -> Result<ProbeReport, ProbeError> {
        let credentials = config.credentials()?;

        let anonymous = self.anonymous_session();
        let public = self.probe(&anonymous, &config.public_endpoints).await;

        let (login, session) = match credentials {
            None => {
                info!("no credentials configured, probing anonymously");
                (LoginOutcome::Skipped, anonymous)
            }
            Some(credentials) => match self.authenticate(&credentials).await {
                Ok(session) => (LoginOutcome::authenticated(&credentials, &session), session),
                Err(failure) => {
                    warn!(%failure, "continuing without token");
                    (LoginOutcome::Failed { failure }, anonymous)
                }
            },
        };

        let results = self.probe(&session, &config.endpoints).await;

        Ok(ProbeReport {
            base_url: self.base_url.to_string(),
            public,
            login,
            results,
        })
    }
}
