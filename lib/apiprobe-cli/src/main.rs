#![allow(missing_docs)]
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{Level, info, warn};

use apiprobe_core::ProbeRunner;
use apiprobe_core::report::render;

mod args;
use self::args::{CliArgs, HELP};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = CliArgs::parse().context("parsing arguments")?;

    let mut stdout = io::stdout().lock();
    if cli.help {
        stdout.write_all(HELP.as_bytes())?;
        return Ok(());
    }

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    if !cli.unused.is_empty() {
        warn!(remaining = ?cli.unused, "Warning: unused arguments left");
    }

    let config = cli.load_config()?;
    let runner = ProbeRunner::from_config(&config).context("invalid configuration")?;
    info!(base_url = %runner.base_url(), "probing");

    let report = runner.run(&config).await.context("probing")?;
    let output = render(&report, cli.format).context("rendering report")?;
    writeln!(stdout, "{output}")?;

    info!(
        matched = report.matched_count(),
        total = report.total_count(),
        "Bye!"
    );
    Ok(())
}
