// src/engine/runtime.rs

//! Setup and teardown around one auction.
//!
//! `run_auction` wires the pieces in order:
//! 1. create one channel pair per bidder (fatal on failure, nothing spawned)
//! 2. launch every bidder (exec failures exclude that bidder; spawn
//!    failures terminate the bidders already started and abort)
//! 3. run the coordinator until the auction closes
//! 4. reap every process and build the report
//!
//! A shutdown signal during step 3 terminates and reaps every bidder before
//! returning `AuctionError::Aborted`.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use tracing::{error, info, warn};

use crate::channel::{ChannelPair, create_pairs};
use crate::config::{AuctionConfig, Settings};
use crate::engine::coordinator::{Coordinator, CoordinatorOptions};
use crate::engine::core::{AuctionCore, CoreOptions};
use crate::engine::link::BidderLink;
use crate::engine::AuctionOutcome;
use crate::errors::{AuctionError, Result};
use crate::exec::{BidderHandle, Reaper, spawn_bidder};
use crate::types::{BidderId, BidderStatus};

/// Final status of one bidder, for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidderSummary {
    pub id: BidderId,
    pub name: String,
    pub status: BidderStatus,
}

/// Everything the invoking environment is told once the auction is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionReport {
    pub outcome: AuctionOutcome,
    pub bidders: Vec<BidderSummary>,
}

impl AuctionReport {
    fn new(outcome: AuctionOutcome, handles: &[BidderHandle], statuses: BTreeMap<BidderId, BidderStatus>) -> Self {
        let bidders = handles
            .iter()
            .map(|handle| BidderSummary {
                id: handle.id(),
                name: handle.name().to_string(),
                status: statuses
                    .get(&handle.id())
                    .cloned()
                    .unwrap_or_else(|| handle.status().clone()),
            })
            .collect();

        Self { outcome, bidders }
    }

    pub fn winner_name(&self) -> Option<&str> {
        let winner = self.outcome.winner?;
        self.bidders
            .iter()
            .find(|b| b.id == winner)
            .map(|b| b.name.as_str())
    }

    pub fn status_of(&self, bidder: BidderId) -> Option<&BidderStatus> {
        self.bidders.iter().find(|b| b.id == bidder).map(|b| &b.status)
    }
}

impl fmt::Display for AuctionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = &self.outcome;
        match outcome.winner {
            Some(id) => writeln!(
                f,
                "winner {} ({}) bid {} after {} rounds",
                id,
                self.winner_name().unwrap_or("?"),
                outcome.final_bid,
                outcome.rounds
            )?,
            None => writeln!(
                f,
                "no winner (starting bid {}) after {} rounds",
                outcome.final_bid, outcome.rounds
            )?,
        }

        for bidder in &self.bidders {
            writeln!(f, "bidder {} {} {}", bidder.id, bidder.name, bidder.status)?;
        }
        Ok(())
    }
}

/// Run a complete auction, aborting on Ctrl-C.
pub async fn run_auction(config: &AuctionConfig, settings: &Settings) -> Result<AuctionReport> {
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    run_auction_until(config, settings, interrupted).await
}

/// Run a complete auction, aborting when `shutdown` completes first.
pub async fn run_auction_until<F>(
    config: &AuctionConfig,
    settings: &Settings,
    shutdown: F,
) -> Result<AuctionReport>
where
    F: Future<Output = ()>,
{
    let reaper = Reaper::new(settings.reap_grace);

    let pairs = create_pairs(config.bidder_count()).inspect_err(|err| {
        error!(error = %err, "could not create bidder channels; no bidder started");
    })?;

    let (mut handles, links) = launch_all(config, pairs, &reaper).await?;

    let active = handles.iter().filter(|h| h.is_active()).map(|h| h.id());
    let core = AuctionCore::new(
        config.starting_bid,
        config.min_increment,
        active,
        CoreOptions::from(settings),
    );
    let coordinator = Coordinator::new(core, links, CoordinatorOptions::from(settings));

    let outcome = tokio::select! {
        outcome = coordinator.run() => outcome,
        () = shutdown => {
            warn!("shutdown requested; terminating bidders");
            reaper.terminate_all(&mut handles).await;
            return Err(AuctionError::Aborted(
                "interrupted before the auction closed".to_string(),
            ));
        }
    };

    let statuses = reaper.reap_all(&mut handles).await;
    Ok(AuctionReport::new(outcome, &handles, statuses))
}

/// Launch one process per bidder.
///
/// Returns a handle for every bidder (failed launches included) and a link
/// for every bidder that started.
async fn launch_all(
    config: &AuctionConfig,
    pairs: Vec<ChannelPair>,
    reaper: &Reaper,
) -> Result<(Vec<BidderHandle>, Vec<BidderLink>)> {
    let mut handles = Vec::with_capacity(config.bidder_count());
    let mut links = Vec::with_capacity(config.bidder_count());

    for (spec, pair) in config.bidders.iter().zip(pairs) {
        let launched = match spawn_bidder(spec, pair) {
            Ok(launched) => launched,
            Err(err) if err.is_per_bidder() => {
                warn!(bidder = spec.id, error = %err, "bidder failed to start; excluded from auction");
                handles.push(BidderHandle::failed(spec.clone(), err.to_string()));
                continue;
            }
            Err(err) => {
                links.clear();
                return Err(abort_launch(err, &mut handles, reaper).await);
            }
        };

        handles.push(launched.handle);
        match BidderLink::from_std(spec.id, launched.endpoint) {
            Ok(link) => links.push(link),
            Err(e) => {
                links.clear();
                return Err(abort_launch(AuctionError::Io(e), &mut handles, reaper).await);
            }
        }
    }

    let started = handles.iter().filter(|h| h.is_active()).count();
    info!(started, total = handles.len(), "bidders launched");

    Ok((handles, links))
}

async fn abort_launch(err: AuctionError, handles: &mut [BidderHandle], reaper: &Reaper) -> AuctionError {
    error!(error = %err, started = handles.len(), "fatal launch failure; terminating started bidders");
    reaper.terminate_all(handles).await;
    err
}
