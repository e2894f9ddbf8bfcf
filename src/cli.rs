//! Command-line argument parsing for the console host.

use clap::Parser;
use crier::config::Config;
use std::path::PathBuf;

/// A declarative command and event wiring engine, driven from the console.
#[derive(Parser, Debug)]
#[command(name = "crier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command prefix override (defaults to the configured prefix)
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Display name of the console caller
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// Read lines from a script file instead of stdin (use "-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub script: Option<String>,

    /// Write logs to the platform log file instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}
