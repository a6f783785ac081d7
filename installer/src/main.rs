//! kubectl installer CLI entrypoint.
//!
//! This binary installs the latest stable kubectl for linux/amd64 into a
//! system binary directory and verifies it. Errors from the installer are
//! translated into the process exit code here and nowhere else.

use clap::Parser;
use kubectl_installer::cli::Cli;
use kubectl_installer::config::InstallConfig;
use kubectl_installer::error::{InstallerError, Result};
use kubectl_installer::installer::Installer;
use kubectl_installer::interrupt::InterruptFlag;
use kubectl_installer::output::{dry_run_text, success_message, write_stderr_line};
use log::{LevelFilter, warn};
use std::io::Write;

/// Exit code used when an interrupt signal stopped the run.
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let interrupt = InterruptFlag::register().unwrap_or_else(|e| {
        warn!("could not install signal handlers: {e}");
        InterruptFlag::new()
    });
    let installer = Installer::new(InstallConfig::from(&cli.install), interrupt);

    if cli.dry_run {
        let plan = installer.plan(stderr)?;
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, dry_run_text(&plan));
        return Ok(());
    }

    let report = installer.install(stderr)?;

    if !cli.install.quiet {
        write_stderr_line(stderr, success_message(&report));
    }
    if cli.json {
        writeln!(stdout, "{}", report.to_json()?)
            .map_err(|source| InstallerError::WriteFailed { source })?;
    }

    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err @ InstallerError::Interrupted { .. }) => {
            write_stderr_line(stderr, err);
            EXIT_INTERRUPTED
        }
        Err(err) => {
            write_stderr_line(stderr, display_chain(&err));
            1
        }
    }
}

/// Render an error followed by its `source` chain.
fn display_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
