// src/lib.rs

pub mod channel;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{AuctionConfig, Settings, load_and_validate, load_from_reader, parse_duration};
use crate::engine::run_auction;
use crate::errors::AuctionError;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading + CLI overrides
/// - startup input loading and validation
/// - the auction runtime (channels, launcher, coordinator, reaper)
/// - printing the final report on stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;
    debug!(?settings, "resolved settings");

    let config = match args.input.as_deref() {
        None | Some("-") => load_from_reader(std::io::stdin().lock(), &settings.bidder_dir)
            .context("reading auction input from stdin")?,
        Some(path) => load_and_validate(path, &settings.bidder_dir)
            .with_context(|| format!("reading auction input from '{path}'"))?,
    };

    if args.dry_run {
        print_dry_run(&config, &settings);
        return Ok(());
    }

    info!(
        bidders = config.bidder_count(),
        starting_bid = config.starting_bid,
        min_increment = config.min_increment,
        "starting auction"
    );

    let report = run_auction(&config, &settings).await?;
    print!("{report}");
    Ok(())
}

/// Settings file (if any) with CLI flags applied on top.
fn resolve_settings(args: &CliArgs) -> Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from '{path}'"))?,
        None => Settings::default(),
    };

    if let Some(dir) = &args.bidder_dir {
        settings.bidder_dir = dir.clone();
    }

    if let Some(raw) = &args.read_timeout {
        let timeout = parse_duration(raw)
            .map_err(|e| AuctionError::Settings(format!("--read-timeout: {e}")))?;
        if timeout.is_zero() {
            return Err(AuctionError::Settings("--read-timeout must be > 0".to_string()).into());
        }
        settings.read_timeout = timeout;
    }

    if let Some(max) = args.max_rounds {
        if max == 0 {
            return Err(AuctionError::Settings("--max-rounds must be >= 1".to_string()).into());
        }
        settings.max_rounds = Some(max);
    }

    Ok(settings)
}

/// Simple dry-run output: print the auction parameters and launch specs.
fn print_dry_run(config: &AuctionConfig, settings: &Settings) {
    println!("auctioneer dry-run");
    println!("  starting_bid = {}", config.starting_bid);
    println!("  min_increment = {}", config.min_increment);
    println!("  read_timeout = {:?}", settings.read_timeout);
    println!("  write_timeout = {:?}", settings.write_timeout);
    println!("  reap_grace = {:?}", settings.reap_grace);
    if let Some(max) = settings.max_rounds {
        println!("  max_rounds = {max}");
    }
    if settings.leader_may_raise {
        println!("  leader_may_raise = true");
    }
    println!();

    println!("bidders ({}):", config.bidder_count());
    for spec in &config.bidders {
        println!("  - {} {}", spec.id, spec.name);
        println!("      path: {}", spec.executable_path.display());
        if !spec.arguments.is_empty() {
            println!("      args: {:?}", spec.arguments);
        }
    }

    debug!("dry-run complete (no bidder launched)");
}
