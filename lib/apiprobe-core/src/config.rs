//! Probe configuration: base URL, credentials and endpoints.
//!
//! A configuration is usually read from a YAML file:
//!
//! ```yaml
//! base_url: http://localhost:8000/api
//! username: admin
//! password: admin123
//! token_scheme: token
//! public_endpoints:
//!   - path: /token/
//! endpoints:
//!   - path: /dashboard/stats/
//!     name: Dashboard Stats
//!     key_fields: [total_users, pending_leaves]
//!   - path: /users/
//!     name: Users
//!     expected_shape: paginated_list
//!     key_fields: [count, results]
//! ```
//!
//! The `APIPROBE_BASE_URL`, `APIPROBE_USERNAME` and `APIPROBE_PASSWORD`
//! environment variables take precedence over the file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::auth::{Credentials, SecureString, TokenScheme};
use crate::{EndpointDescriptor, ProbeError};

/// Environment variable overriding [`ProbeConfig::base_url`].
pub const ENV_BASE_URL: &str = "APIPROBE_BASE_URL";
/// Environment variable overriding [`ProbeConfig::username`].
pub const ENV_USERNAME: &str = "APIPROBE_USERNAME";
/// Environment variable overriding [`ProbeConfig::password`].
pub const ENV_PASSWORD: &str = "APIPROBE_PASSWORD";

/// Errors raised while loading or validating a [`ProbeConfig`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[display("Cannot read configuration file '{path}': {message}")]
    Read {
        /// The file path.
        path: String,
        /// The I/O error message.
        message: String,
    },

    /// The YAML document is malformed or has unexpected fields.
    #[display("Invalid YAML configuration: {message}")]
    Yaml {
        /// The parser error message.
        message: String,
    },

    /// An endpoint or login path does not start with `/`.
    #[display("Path '{path}' must start with '/'")]
    InvalidPath {
        /// The rejected path.
        path: String,
    },

    /// Only one of username and password is set.
    #[display("Both username and password are required to log in, missing {missing}")]
    IncompleteCredentials {
        /// The missing field.
        missing: &'static str,
    },
}

/// Everything a probing run needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// Absolute base URL, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    /// Login username.
    #[serde(default)]
    pub username: Option<String>,
    /// Login password.
    #[serde(default)]
    pub password: Option<SecureString>,
    /// Login endpoint path, relative to the base URL.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// `Authorization` header scheme.
    #[serde(default)]
    pub token_scheme: TokenScheme,
    /// Only `200 OK` counts as success when set; any `2xx` otherwise.
    #[serde(default)]
    pub strict_status: bool,
    /// Per-request timeout, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Endpoints probed without token, before logging in.
    #[serde(default)]
    pub public_endpoints: Vec<EndpointDescriptor>,
    /// Endpoints probed with the session token.
    #[serde(default)]
    pub endpoints: Vec<EndpointDescriptor>,
}

fn default_login_path() -> String {
    crate::runner::DEFAULT_LOGIN_PATH.to_string()
}

impl ProbeConfig {
    /// A configuration with no credentials and no endpoints.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            login_path: default_login_path(),
            token_scheme: TokenScheme::default(),
            strict_status: false,
            timeout_secs: None,
            public_endpoints: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    /// The endpoints of the HR management API served on `localhost:8000`.
    pub fn local_default() -> Self {
        let paginated = |path: &str, name: &str| {
            EndpointDescriptor::paginated(path)
                .with_name(name)
                .with_key_fields(["count", "results"])
        };

        let mut config = Self::new("http://localhost:8000/api");
        config.public_endpoints = vec![
            EndpointDescriptor::new("/token/"),
            EndpointDescriptor::new("/auth/login/"),
        ];
        config.endpoints = vec![
            EndpointDescriptor::new("/dashboard/stats/")
                .with_name("Dashboard Stats")
                .with_key_fields([
                    "total_users",
                    "total_departments",
                    "today_attendance",
                    "pending_leaves",
                ]),
            paginated("/users/", "Users"),
            paginated("/attendance/", "Attendance"),
            paginated("/leaves/", "Leaves"),
            paginated("/notifications/", "Notifications"),
            paginated("/departments/", "Departments"),
            paginated("/documents/", "Documents"),
            paginated("/chat-rooms/", "Chat Rooms"),
        ];
        config
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document does not describe a configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|err| ConfigError::Yaml {
            message: err.to_string(),
        })
    }

    /// Reads a YAML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Applies the `APIPROBE_*` environment variables.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by environment variable name.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = Some(password.into());
        }
        self
    }

    /// Checks the paths and the credential pair.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = std::iter::once(self.login_path.as_str()).chain(
            self.public_endpoints
                .iter()
                .chain(&self.endpoints)
                .map(EndpointDescriptor::path),
        );
        for path in paths {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath {
                    path: path.to_string(),
                });
            }
        }

        match (&self.username, &self.password) {
            (Some(_), None) => Err(ConfigError::IncompleteCredentials {
                missing: "password",
            }),
            (None, Some(_)) => Err(ConfigError::IncompleteCredentials {
                missing: "username",
            }),
            _ => Ok(()),
        }
    }

    /// The configured credentials, if any.
    ///
    /// # Errors
    ///
    /// Fails if only one of username and password is set, or if one is empty.
    pub fn credentials(&self) -> Result<Option<Credentials>, ProbeError> {
        self.validate()?;
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                Credentials::new(username.clone(), password.clone()).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// The per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ExpectedShape;

    const CONFIG: &str = r"
base_url: http://localhost:8000/api
username: admin
password: admin123
token_scheme: bearer
strict_status: true
timeout_secs: 30
public_endpoints:
  - path: /token/
endpoints:
  - path: /dashboard/stats/
    name: Dashboard Stats
    key_fields: [total_users, pending_leaves]
  - path: /users/
    expected_shape: paginated_list
    key_fields: [count, results]
  - path: /departments/
    expected_shape: list
";

    #[test]
    fn test_parse_yaml() {
        let config = ProbeConfig::from_yaml_str(CONFIG).expect("valid config");

        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.login_path, "/auth/login/");
        assert_eq!(config.token_scheme, TokenScheme::Bearer);
        assert!(config.strict_status);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.public_endpoints, [EndpointDescriptor::new("/token/")]);

        let shapes: Vec<_> = config
            .endpoints
            .iter()
            .map(EndpointDescriptor::expected_shape)
            .collect();
        assert_eq!(
            shapes,
            [
                ExpectedShape::Object,
                ExpectedShape::PaginatedList,
                ExpectedShape::List
            ]
        );
        assert_eq!(config.endpoints[0].label(), "Dashboard Stats");
    }

    #[test]
    fn test_password_is_not_in_debug_output() {
        let config = ProbeConfig::from_yaml_str(CONFIG).expect("valid config");
        assert!(!format!("{config:?}").contains("admin123"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = ProbeConfig::from_yaml_str("base_url: http://x/api\nbase_ulr: typo\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn test_missing_base_url_is_rejected() {
        let result = ProbeConfig::from_yaml_str("username: admin\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = ProbeConfig::from_file("/nonexistent/apiprobe.yml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let env = HashMap::from([
            (ENV_BASE_URL, "http://staging/api".to_string()),
            (ENV_PASSWORD, "s3cret".to_string()),
        ]);
        let config = ProbeConfig::from_yaml_str(CONFIG)
            .expect("valid config")
            .with_overrides(|key| env.get(key).cloned());

        assert_eq!(config.base_url, "http://staging/api");
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(
            config.password.as_ref().map(SecureString::as_str),
            Some("s3cret")
        );
    }

    #[test]
    fn test_validate_paths() {
        let mut config = ProbeConfig::new("http://x/api");
        config.endpoints.push(EndpointDescriptor::new("users/"));

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPath {
                path: "users/".to_string()
            })
        );
    }

    #[test]
    fn test_credentials() {
        let config = ProbeConfig::new("http://x/api");
        assert!(config.credentials().expect("no credentials").is_none());

        let config = config.with_credentials("admin", "admin123");
        let credentials = config
            .credentials()
            .expect("valid credentials")
            .expect("credentials present");
        assert_eq!(credentials.username(), "admin");

        let mut config = ProbeConfig::new("http://x/api");
        config.username = Some("admin".to_string());
        assert!(matches!(
            config.credentials(),
            Err(ProbeError::Config(ConfigError::IncompleteCredentials {
                missing: "password"
            }))
        ));

        let config = ProbeConfig::new("http://x/api").with_credentials("admin", "");
        assert!(matches!(
            config.credentials(),
            Err(ProbeError::InvalidCredentials { .. })
        ));
    }

    #[test]
    fn test_local_default() {
        let config = ProbeConfig::local_default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoints.len(), 8);
        assert_eq!(config.public_endpoints.len(), 2);
        assert!(config.username.is_none());
    }

    #[test]
    fn test_demo_config_covers_local_default() {
        let demo = ProbeConfig::from_yaml_str(include_str!("../../../demos/hr-api.yml"))
            .expect("valid demo config");
        let local = ProbeConfig::local_default();

        let paths = |endpoints: &[EndpointDescriptor]| {
            endpoints
                .iter()
                .map(|it| it.path().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(demo.base_url, local.base_url);
        assert_eq!(paths(&demo.endpoints), paths(&local.endpoints));
        assert_eq!(paths(&demo.public_endpoints), paths(&local.public_endpoints));
        assert!(demo.validate().is_ok());
    }
}
