// src/engine/coordinator.rs

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::{ProtocolTokens, Settings};
use crate::engine::core::{AuctionCore, RoundSnapshot, RoundStart, RoundVerdict};
use crate::engine::link::BidderLink;
use crate::engine::protocol::{ClosingAnnouncement, parse_reply};
use crate::engine::{AuctionOutcome, RoundResponse};
use crate::errors::AuctionError;
use crate::types::BidderId;

/// IO bounds and reply tokens used by the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub tokens: ProtocolTokens,
}

impl From<&Settings> for CoordinatorOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            read_timeout: settings.read_timeout,
            write_timeout: settings.write_timeout,
            tokens: settings.tokens.clone(),
        }
    }
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        CoordinatorOptions::from(&Settings::default())
    }
}

/// Drives the auction rounds over the bidders' channels.
///
/// This is the IO shell around [`AuctionCore`]: it owns every coordinator
/// end, fans each round's announcement out to all recipients, fans the
/// replies back in under a per-bidder read bound, and hands them to the
/// core. A bidder's channel is closed as soon as the core deactivates it.
pub struct Coordinator {
    core: AuctionCore,
    links: BTreeMap<BidderId, BidderLink>,
    options: CoordinatorOptions,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("core", &self.core)
            .field("links", &self.links.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Pair the core with the coordinator ends.
    ///
    /// Bidders the core considers active but that have no link are
    /// deactivated; links for bidders unknown to the core are closed.
    pub fn new(
        mut core: AuctionCore,
        links: impl IntoIterator<Item = BidderLink>,
        options: CoordinatorOptions,
    ) -> Self {
        let mut links: BTreeMap<BidderId, BidderLink> =
            links.into_iter().map(|link| (link.bidder(), link)).collect();

        let unlinked: Vec<BidderId> = core
            .state()
            .active
            .iter()
            .copied()
            .filter(|id| !links.contains_key(id))
            .collect();
        for bidder in unlinked {
            core.deactivate(bidder, "no channel");
        }

        links.retain(|bidder, _| core.is_active(*bidder));

        Self {
            core,
            links,
            options,
        }
    }

    /// Run rounds until the core closes the auction, announce the result
    /// and close every remaining channel.
    pub async fn run(mut self) -> AuctionOutcome {
        info!(
            bidders = self.links.len(),
            starting_bid = self.core.state().current_bid,
            min_increment = self.core.state().min_increment,
            "auction started"
        );

        let outcome = loop {
            let snapshot = match self.core.begin_round() {
                RoundStart::Open(snapshot) => snapshot,
                RoundStart::Closed(outcome) => break outcome,
            };

            info!(
                round = snapshot.round,
                current_bid = snapshot.current_bid,
                bidders = snapshot.recipients.len(),
                "round started"
            );

            self.broadcast(&snapshot).await;
            self.core.broadcast_complete();

            let responses = self.collect(&snapshot).await;
            let verdict = self.core.evaluate(responses);
            self.close_inactive_links();

            match verdict {
                RoundVerdict::Raised { bidder, amount } => {
                    debug!(round = snapshot.round, bidder, amount, "round won");
                }
                RoundVerdict::Closed(outcome) => break outcome,
            }
        };

        self.announce_close(&outcome).await;
        outcome
    }

    async fn broadcast(&mut self, snapshot: &RoundSnapshot) {
        let line = snapshot.announcement().encode();
        let line = line.as_str();
        let bound = self.options.write_timeout;

        let sends = self
            .links
            .iter_mut()
            .filter(|(bidder, _)| snapshot.includes(**bidder))
            .map(|(&bidder, link)| async move { (bidder, link.send_line(line, bound).await) });

        for (bidder, result) in join_all(sends).await {
            match result {
                Ok(()) => debug!(bidder, round = snapshot.round, "announcement sent"),
                Err(err) => {
                    warn!(bidder, round = snapshot.round, error = %err, "could not write to bidder");
                    self.core.deactivate(bidder, "write failed");
                }
            }
        }

        self.close_inactive_links();
    }

    async fn collect(&mut self, snapshot: &RoundSnapshot) -> BTreeMap<BidderId, RoundResponse> {
        let bound = self.options.read_timeout;
        let tokens = &self.options.tokens;
        let round = snapshot.round;

        let reads = self
            .links
            .iter_mut()
            .filter(|(bidder, _)| snapshot.includes(**bidder))
            .map(|(&bidder, link)| async move {
                let response = match link.recv_line(bound).await {
                    Ok(line) => {
                        debug!(bidder, round, reply = %line, "bidder replied");
                        parse_reply(&line, tokens)
                    }
                    Err(AuctionError::BidderEof(_)) => {
                        warn!(bidder, round, "bidder closed its channel");
                        RoundResponse::Disconnected
                    }
                    Err(err @ AuctionError::ReplyTooLong { .. }) => {
                        warn!(bidder, round, error = %err, "oversized reply; treated as pass");
                        RoundResponse::Malformed(err.to_string())
                    }
                    Err(err @ AuctionError::BidderTimeout { .. }) => {
                        warn!(bidder, round, error = %err, "bidder timed out");
                        RoundResponse::TimedOut
                    }
                    Err(err) => {
                        warn!(bidder, round, error = %err, "could not read from bidder");
                        RoundResponse::Disconnected
                    }
                };
                (bidder, response)
            });

        join_all(reads).await.into_iter().collect()
    }

    async fn announce_close(&mut self, outcome: &AuctionOutcome) {
        let line = ClosingAnnouncement::from(outcome).encode();
        let line = line.as_str();
        let bound = self.options.write_timeout;

        let sends = self.links.iter_mut().map(|(&bidder, link)| async move {
            if let Err(err) = link.send_line(line, bound).await {
                debug!(bidder, error = %err, "could not send closing announcement");
            }
        });
        join_all(sends).await;
    }

    fn close_inactive_links(&mut self) {
        let core = &self.core;
        self.links.retain(|&bidder, _| {
            let keep = core.is_active(bidder);
            if !keep {
                debug!(bidder, "closing channel of inactive bidder");
            }
            keep
        });
    }
}
