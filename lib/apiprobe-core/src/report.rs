//! Presentation of probe results, kept apart from the probing itself.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::Serialize;

use crate::auth::{Credentials, LoginProfile, Session};
use crate::{AuthFailure, ProbeError, ProbeResult};

/// What happened at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoginOutcome {
    /// No credentials were configured.
    Skipped,
    /// A token was obtained.
    Authenticated {
        /// The username sent at login.
        username: String,
        /// Masked token preview.
        token: String,
        /// Identity fields returned by the server.
        profile: LoginProfile,
    },
    /// Login failed; endpoints were probed without token.
    Failed {
        /// Why the login failed.
        failure: AuthFailure,
    },
}

impl LoginOutcome {
    pub(crate) fn authenticated(credentials: &Credentials, session: &Session) -> Self {
        Self::Authenticated {
            username: credentials.username().to_string(),
            token: session
                .token()
                .map(ToString::to_string)
                .unwrap_or_default(),
            profile: session.profile().cloned().unwrap_or_default(),
        }
    }
}

/// Everything observed during one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    /// The probed base URL.
    pub base_url: String,
    /// Results of the endpoints probed before login.
    pub public: Vec<ProbeResult>,
    /// The login outcome.
    pub login: LoginOutcome,
    /// Results of the endpoints probed after login.
    pub results: Vec<ProbeResult>,
}

impl ProbeReport {
    /// Number of endpoints, public ones included, whose response matched.
    pub fn matched_count(&self) -> usize {
        self.all_results().filter(|it| it.shape_matched()).count()
    }

    /// Number of probed endpoints, public ones included.
    pub fn total_count(&self) -> usize {
        self.public.len() + self.results.len()
    }

    fn all_results(&self) -> impl Iterator<Item = &ProbeResult> {
        self.public.iter().chain(&self.results)
    }
}

/// Output format of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown report format '{other}', expected text or json")),
        }
    }
}

/// Renders a report.
///
/// # Errors
///
/// Fails only if JSON serialization fails.
pub fn render(report: &ProbeReport, format: ReportFormat) -> Result<String, ProbeError> {
    let output = match format {
        ReportFormat::Text => TextReport(report).to_string(),
        ReportFormat::Json => serde_json::to_string_pretty(report)?,
    };
    Ok(output)
}

struct TextReport<'a>(&'a ProbeReport);

impl Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Probing {}", report.base_url)?;

        if !report.public.is_empty() {
            writeln!(f)?;
            writeln!(f, "Public endpoints")?;
            for result in &report.public {
                write_result(f, result)?;
            }
        }

        writeln!(f)?;
        write_login(f, &report.login)?;

        if !report.results.is_empty() {
            writeln!(f)?;
            writeln!(f, "Endpoints")?;
            for result in &report.results {
                write_result(f, result)?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "{}/{} endpoints matched",
            report.matched_count(),
            report.total_count()
        )
    }
}

fn write_login(f: &mut fmt::Formatter<'_>, login: &LoginOutcome) -> fmt::Result {
    match login {
        LoginOutcome::Skipped => writeln!(f, "Login: skipped, no credentials"),
        LoginOutcome::Authenticated {
            username,
            token,
            profile,
        } => {
            write!(f, "Login: authenticated as {username}, token {token}")?;
            if let Some(user_id) = &profile.user_id {
                write!(f, ", user id {user_id}")?;
            }
            if let Some(role) = &profile.role {
                write!(f, ", role {role}")?;
            }
            if let Some(email) = &profile.email {
                write!(f, ", email {email}")?;
            }
            writeln!(f)
        }
        LoginOutcome::Failed { failure } => writeln!(f, "Login: failed, {failure}"),
    }
}

fn write_result(f: &mut fmt::Formatter<'_>, result: &ProbeResult) -> fmt::Result {
    let status = result
        .status_code()
        .map_or_else(|| "---".to_string(), |status| status.to_string());
    let verdict = if result.shape_matched() { "ok" } else { "mismatch" };

    write!(f, "  GET {} -> {status}", result.endpoint())?;
    if let Some(name) = result.name() {
        write!(f, " ({name})")?;
    }
    if let Some(shape) = result.shape() {
        write!(f, " {shape}")?;
    }
    writeln!(f, " [{verdict}]")?;

    if let Some(count) = result.item_count() {
        write!(f, "      items: {count}")?;
        if let Some(page) = result.pagination() {
            if let Some(total) = page.count {
                write!(f, " of {total}")?;
            }
            let yes_no = |flag: bool| if flag { "yes" } else { "no" };
            write!(
                f,
                ", next: {}, previous: {}",
                yes_no(page.has_next),
                yes_no(page.has_previous)
            )?;
        }
        writeln!(f)?;
    }
    if !result.sample_keys().is_empty() {
        writeln!(f, "      keys: {}", result.sample_keys().join(", "))?;
    }
    if !result.missing_keys().is_empty() {
        writeln!(f, "      missing: {}", result.missing_keys().join(", "))?;
    }
    if let Some(failure) = result.failure() {
        writeln!(f, "      {failure}")?;
    }
    Ok(())
}
