//! Command-line interface for javelin.
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

/// Wrapper around `LevelFilter` so clap can parse log levels from either
/// string names ("info", "debug", etc.) or numeric shorthands (0-5).
#[derive(Clone, Copy, Debug)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// String representation suitable for `RUST_LOG`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("log level cannot be empty".into());
        }

        if let Ok(number) = trimmed.parse::<u8>() {
            let level = match number {
                0 => LevelFilter::OFF,
                1 => LevelFilter::ERROR,
                2 => LevelFilter::WARN,
                3 => LevelFilter::INFO,
                4 => LevelFilter::DEBUG,
                5 => LevelFilter::TRACE,
                _ => {
                    return Err(format!(
                        "unsupported log level number '{number}' (expected 0-5)"
                    ));
                }
            };

            return Ok(LogLevelArg(level));
        }

        let lowercase = trimmed.to_ascii_lowercase();
        let level = match lowercase.as_str() {
            "off" => Some(LevelFilter::OFF),
            "error" | "err" => Some(LevelFilter::ERROR),
            "warn" | "warning" => Some(LevelFilter::WARN),
            "info" | "information" => Some(LevelFilter::INFO),
            "debug" => Some(LevelFilter::DEBUG),
            "trace" => Some(LevelFilter::TRACE),
            _ => None,
        }
        .ok_or_else(|| format!("invalid log level '{trimmed}'"))?;

        Ok(LogLevelArg(level))
    }
}

/// Command-line interface for javelin.
#[derive(Parser)]
#[command(name = "javelin", version, author)]
#[command(about = "A bootstrap launcher for JVM server applications", long_about = None)]
pub struct Cli {
    /// Override the logging verbosity for this invocation only.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for javelin.
#[derive(Subcommand)]
pub enum Commands {
    /// Discover a JVM, assemble the launch command, and run the server.
    Start {
        /// Path to the configuration file (defaults to `javelin.yaml`).
        #[arg(short, long, value_name = "PATH")]
        config: Option<String>,

        /// Print the assembled command instead of executing it.
        #[arg(short = 'g', long)]
        generate_only: bool,

        /// Relaunch the server after it exits (in addition to the config
        /// file's `supervise.auto_restart`).
        #[arg(short, long)]
        restart: bool,

        /// File polled as a pseudo-stdin channel, relative to the working
        /// directory (overrides `supervise.stdin_file`).
        #[arg(long, value_name = "FILE")]
        stdin: Option<String>,
    },

    /// List discovered JVM installations in ranked order.
    Locate {
        /// Path to the configuration file (defaults to `javelin.yaml`).
        #[arg(short, long, value_name = "PATH")]
        config: Option<String>,

        /// Only show candidates with this major version.
        #[arg(long, value_name = "VERSION")]
        version: Option<String>,

        /// Vendor substring moved to the front of the ranking.
        #[arg(long, value_name = "VENDOR")]
        prefer: Option<String>,
    },
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
