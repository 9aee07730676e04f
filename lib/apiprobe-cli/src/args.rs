use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};

use apiprobe_core::{ProbeConfig, ReportFormat};

pub const HELP: &str = "\
apiprobe - log in against a JSON web API and probe its endpoints

USAGE:
  apiprobe [OPTIONS]

OPTIONS:
  -c, --config <FILE>      YAML configuration (defaults to the local HR API)
  -b, --base-url <URL>     Base URL, e.g. http://localhost:8000/api
  -u, --username <NAME>    Login username
  -p, --password <PASS>    Login password
  -f, --format <FORMAT>    Report format: text or json [default: text]
  -v, --verbose            Log every request and response
  -h, --help               Print this help

ENVIRONMENT:
  APIPROBE_BASE_URL, APIPROBE_USERNAME, APIPROBE_PASSWORD
      override the configuration file; flags override both.
";

#[derive(Debug, Default)]
pub struct CliArgs {
    pub help: bool,
    pub config: Option<PathBuf>,
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub format: ReportFormat,
    pub verbose: bool,
    /// Arguments left over after parsing, reported once logging is set up.
    pub unused: Vec<OsString>,
}

impl CliArgs {
    pub fn parse() -> Result<Self> {
        Self::parse_from(std::env::args_os().skip(1).collect())
    }

    pub fn parse_from(args: Vec<OsString>) -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_vec(args);

        let help = pargs.contains(["-h", "--help"]);
        let verbose = pargs.contains(["-v", "--verbose"]);

        let config = pargs
            .opt_value_from_os_str(["-c", "--config"], |value| {
                Ok::<_, std::convert::Infallible>(PathBuf::from(value))
            })
            .context("parsing config argument")?;
        let base_url = pargs
            .opt_value_from_str(["-b", "--base-url"])
            .context("parsing base URL argument")?;
        let username = pargs
            .opt_value_from_str(["-u", "--username"])
            .context("parsing username argument")?;
        let password = pargs
            .opt_value_from_str(["-p", "--password"])
            .context("parsing password argument")?;
        let format = pargs
            .opt_value_from_str(["-f", "--format"])
            .context("parsing format argument")?;

        Ok(Self {
            help,
            config,
            base_url,
            username,
            password,
            format: format.unwrap_or_default(),
            verbose,
            unused: pargs.finish(),
        })
    }

    /// Loads the configuration file, then applies the environment, then the flags.
    pub fn load_config(&self) -> Result<ProbeConfig> {
        let config = match &self.config {
            Some(path) => ProbeConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => ProbeConfig::local_default(),
        };
        Ok(self.apply(config.with_env_overrides()))
    }

    fn apply(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(username) = &self.username {
            config.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.password = Some(password.as_str().into());
        }
        config
    }
}
