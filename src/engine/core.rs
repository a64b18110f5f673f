// src/engine/core.rs

//! Pure auction state machine.
//!
//! `Setup → RoundBroadcast → RoundCollect → RoundEvaluate → (RoundBroadcast | Closed)`
//!
//! The core decides *who* is asked each round and *what* the round's
//! responses mean. It never touches channels or processes; the async
//! [`Coordinator`](crate::engine::Coordinator) performs the IO and feeds
//! results back in. This keeps every bidding rule unit-testable without
//! Tokio.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::engine::protocol::RoundAnnouncement;
use crate::engine::{AuctionOutcome, CloseReason, RoundResponse};
use crate::types::{Amount, BidderId};

/// Lifecycle phase of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    RoundBroadcast,
    RoundCollect,
    RoundEvaluate,
    Closed,
}

/// Mutable auction state, exclusively owned by the core.
///
/// Invariants:
/// - `current_bid` never decreases.
/// - `leading_bidder`, when set, made the offer equal to `current_bid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionState {
    pub current_bid: Amount,
    pub min_increment: Amount,
    pub leading_bidder: Option<BidderId>,
    /// Number of the round currently being (or next to be) held, from 1.
    pub round: u32,
    pub active: BTreeSet<BidderId>,
}

impl AuctionState {
    /// Smallest offer that can be accepted this round.
    pub fn threshold(&self) -> Amount {
        self.current_bid.saturating_add(self.min_increment)
    }
}

/// Bidding rules that are configurable at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreOptions {
    /// Accept a raise from the bidder that already leads.
    pub leader_may_raise: bool,
    /// Close after this many rounds even if bidding continues.
    pub max_rounds: Option<u32>,
}

impl From<&Settings> for CoreOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            leader_may_raise: settings.leader_may_raise,
            max_rounds: settings.max_rounds,
        }
    }
}

/// Consistent view of the state taken when a round starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub round: u32,
    pub current_bid: Amount,
    pub min_increment: Amount,
    /// Bidders that receive this round's announcement, ascending by id.
    pub recipients: Vec<BidderId>,
}

impl RoundSnapshot {
    pub fn announcement(&self) -> RoundAnnouncement {
        RoundAnnouncement {
            current_bid: self.current_bid,
            min_increment: self.min_increment,
            round: self.round,
        }
    }

    pub fn includes(&self, bidder: BidderId) -> bool {
        self.recipients.binary_search(&bidder).is_ok()
    }
}

/// Result of asking the core to start a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundStart {
    Open(RoundSnapshot),
    Closed(AuctionOutcome),
}

/// Result of evaluating a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundVerdict {
    /// A raise was accepted; another round follows.
    Raised { bidder: BidderId, amount: Amount },
    Closed(AuctionOutcome),
}

#[derive(Debug)]
pub struct AuctionCore {
    state: AuctionState,
    phase: Phase,
    options: CoreOptions,
    rounds_held: u32,
    outcome: Option<AuctionOutcome>,
}

impl AuctionCore {
    /// Enter `Setup` with every given bidder active and no leader.
    pub fn new(
        starting_bid: Amount,
        min_increment: Amount,
        bidders: impl IntoIterator<Item = BidderId>,
        options: CoreOptions,
    ) -> Self {
        Self {
            state: AuctionState {
                current_bid: starting_bid,
                min_increment,
                leading_bidder: None,
                round: 1,
                active: bidders.into_iter().collect(),
            },
            phase: Phase::Setup,
            options,
            rounds_held: 0,
            outcome: None,
        }
    }

    pub fn state(&self) -> &AuctionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self, bidder: BidderId) -> bool {
        self.state.active.contains(&bidder)
    }

    pub fn outcome(&self) -> Option<&AuctionOutcome> {
        self.outcome.as_ref()
    }

    /// Start the next round, or close the auction if nobody is left who
    /// could raise.
    pub fn begin_round(&mut self) -> RoundStart {
        if let Some(outcome) = &self.outcome {
            return RoundStart::Closed(outcome.clone());
        }

        if self.state.active.is_empty() {
            return RoundStart::Closed(self.close(CloseReason::NoActiveBidders));
        }

        if !self.options.leader_may_raise && self.only_leader_remains() {
            return RoundStart::Closed(self.close(CloseReason::NoChallengers));
        }

        self.phase = Phase::RoundBroadcast;
        self.rounds_held += 1;

        RoundStart::Open(RoundSnapshot {
            round: self.state.round,
            current_bid: self.state.current_bid,
            min_increment: self.state.min_increment,
            recipients: self.state.active.iter().copied().collect(),
        })
    }

    /// The announcement has been written to every recipient.
    pub fn broadcast_complete(&mut self) {
        if self.phase == Phase::RoundBroadcast {
            self.phase = Phase::RoundCollect;
        }
    }

    /// Remove a bidder from the auction for all remaining rounds.
    ///
    /// Returns `false` if it was not active. A deactivated leader keeps its
    /// standing bid.
    pub fn deactivate(&mut self, bidder: BidderId, reason: &str) -> bool {
        let removed = self.state.active.remove(&bidder);
        if removed {
            info!(
                bidder,
                round = self.state.round,
                reason,
                remaining = self.state.active.len(),
                "bidder deactivated"
            );
        }
        removed
    }

    /// Apply one round's responses.
    ///
    /// - Withdrawals, timeouts and disconnects deactivate the bidder.
    /// - Malformed replies and offers below the threshold count as passes.
    /// - The highest offer `>= current_bid + min_increment` wins the round;
    ///   equal offers go to the lowest bidder id.
    /// - Without such an offer the auction closes.
    pub fn evaluate(&mut self, responses: BTreeMap<BidderId, RoundResponse>) -> RoundVerdict {
        if let Some(outcome) = &self.outcome {
            return RoundVerdict::Closed(outcome.clone());
        }

        self.phase = Phase::RoundEvaluate;
        let round = self.state.round;
        let threshold = self.state.threshold();
        let mut best: Option<(BidderId, Amount)> = None;

        // BTreeMap iterates in ascending id order, so only a strictly higher
        // offer may replace the current best.
        for (bidder, response) in responses {
            if !self.is_active(bidder) {
                debug!(bidder, round, "ignoring response from inactive bidder");
                continue;
            }

            if let Some(reason) = response.deactivation_reason() {
                self.deactivate(bidder, reason);
                continue;
            }

            match response {
                RoundResponse::Offer(amount) if amount < threshold => {
                    debug!(bidder, round, amount, threshold, "offer below threshold; treated as pass");
                }
                RoundResponse::Offer(amount) => {
                    if self.state.leading_bidder == Some(bidder) && !self.options.leader_may_raise {
                        debug!(bidder, round, amount, "leader cannot raise its own bid; ignored");
                        continue;
                    }
                    if best.is_none_or(|(_, top)| amount > top) {
                        best = Some((bidder, amount));
                    }
                }
                RoundResponse::Pass => {
                    debug!(bidder, round, "bidder passed");
                }
                RoundResponse::Malformed(reply) => {
                    warn!(bidder, round, reply = %reply, "malformed reply; treated as pass");
                }
                RoundResponse::Withdrawn | RoundResponse::TimedOut | RoundResponse::Disconnected => {}
            }
        }

        let Some((bidder, amount)) = best else {
            let reason = if self.state.active.is_empty() {
                CloseReason::NoActiveBidders
            } else {
                CloseReason::NoRaise
            };
            return RoundVerdict::Closed(self.close(reason));
        };

        info!(
            bidder,
            round,
            previous = self.state.current_bid,
            amount,
            "raise accepted"
        );
        self.state.current_bid = amount;
        self.state.leading_bidder = Some(bidder);

        if self.options.max_rounds.is_some_and(|max| self.rounds_held >= max) {
            return RoundVerdict::Closed(self.close(CloseReason::RoundLimit));
        }

        self.state.round += 1;
        self.phase = Phase::RoundBroadcast;
        RoundVerdict::Raised { bidder, amount }
    }

    fn only_leader_remains(&self) -> bool {
        match self.state.leading_bidder {
            Some(leader) => self.state.active.iter().all(|&id| id == leader),
            None => false,
        }
    }

    fn close(&mut self, reason: CloseReason) -> AuctionOutcome {
        let outcome = AuctionOutcome {
            winner: self.state.leading_bidder,
            final_bid: self.state.current_bid,
            rounds: self.rounds_held,
            reason,
        };
        info!(
            winner = ?outcome.winner,
            final_bid = outcome.final_bid,
            rounds = outcome.rounds,
            reason = %reason,
            "auction closed"
        );
        self.phase = Phase::Closed;
        self.outcome = Some(outcome.clone());
        outcome
    }
}
