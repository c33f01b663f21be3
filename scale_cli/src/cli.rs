//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DEFAULT_CONFIG: &str = "etc/scale_config.toml";

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "scale", version, about = "Read weights from a serial scale or its simulator")]
pub struct Cli {
    /// Path to config TOML; a missing default file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Output and log as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides the config
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List serial ports, numbered for selection
    Ports,
    /// Print readings continuously until Ctrl-C
    Read {
        /// Port name or 1-based index from `scale ports`
        #[arg(long, value_name = "NAME")]
        port: Option<String>,
        /// Use the simulated scale instead of a serial port
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "port")]
        simulate: bool,
        /// Stop after this many readings
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
        /// Show every reading as-is (no zero debouncing)
        #[arg(long, action = ArgAction::SetTrue)]
        raw: bool,
    },
    /// Print one reading as a JSON payload
    Snapshot {
        /// Port name or 1-based index from `scale ports`
        #[arg(long, value_name = "NAME")]
        port: Option<String>,
        /// Use the simulated scale instead of a serial port
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "port")]
        simulate: bool,
        /// Manual weight for the simulator, e.g. '{"weight": 2.5}'
        #[arg(long = "override", value_name = "JSON", requires = "simulate")]
        override_body: Option<String>,
    },
}
