#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `scale`: list serial ports, stream readings to the console, or take a
//! single JSON snapshot from a serial scale or the built-in simulator.

mod cli;
mod commands;
mod console;
mod error_fmt;
mod interrupt;
mod logging;

use std::path::Path;

use clap::Parser;
use scale_config::Config;

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE};
use crate::commands::ReadArgs;
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::interrupt::Interrupt;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    logging::init_tracing(cli.json, level, &cfg.logging);

    let interrupt = Interrupt::install()?;

    match cli.cmd {
        Commands::Ports => commands::run_ports(cli.json),
        Commands::Read {
            port,
            simulate,
            count,
            raw,
        } => commands::run_read(
            &cfg,
            ReadArgs {
                port,
                simulate,
                count,
                raw,
            },
            cli.json,
            &interrupt,
        ),
        Commands::Snapshot {
            port,
            simulate,
            override_body,
        } => commands::run_snapshot(
            &cfg,
            port.as_deref(),
            simulate,
            override_body.as_deref(),
            cli.json,
        ),
    }
}

/// The default path may be absent (built-in defaults); an explicit one must exist.
fn load_config(path: &Path) -> eyre::Result<Config> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG) {
        return Ok(Config::default());
    }
    scale_config::load_file(path)
}
