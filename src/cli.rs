// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `auctioneer`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "auctioneer",
    version,
    about = "Run a sealed-turn auction between bidder subprocesses.",
    long_about = None
)]
pub struct CliArgs {
    /// Startup input (`startingBid minIncrement numBidders` + bidder blocks).
    ///
    /// Read from stdin when omitted or `-`.
    #[arg(long, short, value_name = "PATH")]
    pub input: Option<String>,

    /// Optional runtime settings file (TOML).
    #[arg(long, value_name = "PATH")]
    pub settings: Option<String>,

    /// Directory bidder executables are resolved against.
    ///
    /// Overrides `[auction].bidder_dir`; default `../bin`.
    #[arg(long, value_name = "DIR")]
    pub bidder_dir: Option<PathBuf>,

    /// Per-bidder reply bound, e.g. `500ms` or `2s`.
    ///
    /// Overrides `[auction].read_timeout`.
    #[arg(long, value_name = "DURATION")]
    pub read_timeout: Option<String>,

    /// Close the auction after this many rounds.
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AUCTIONEER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the bidder launch specs, but spawn nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = CliArgs::try_parse_from([
            "auctioneer",
            "--input",
            "auction.txt",
            "--bidder-dir",
            "/opt/bidders",
            "--read-timeout",
            "500ms",
            "--max-rounds",
            "5",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.input.as_deref(), Some("auction.txt"));
        assert_eq!(args.bidder_dir, Some(PathBuf::from("/opt/bidders")));
        assert_eq!(args.read_timeout.as_deref(), Some("500ms"));
        assert_eq!(args.max_rounds, Some(5));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }

    #[test]
    fn everything_is_optional() {
        let args = CliArgs::try_parse_from(["auctioneer"]).unwrap();
        assert!(args.input.is_none());
        assert!(args.settings.is_none());
        assert!(!args.dry_run);
    }
}
