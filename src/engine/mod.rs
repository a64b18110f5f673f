// src/engine/mod.rs

//! Auction engine.
//!
//! This module ties together:
//! - the pure round state machine ([`core`])
//! - the line protocol spoken with bidders ([`protocol`])
//! - the coordinator-side channel wrapper ([`link`])
//! - the async coordinator that broadcasts and collects each round
//!   ([`coordinator`])
//! - setup and teardown around an auction: channels, launching, reaping,
//!   cancellation ([`runtime`])
//!
//! The core has no channels, no Tokio types and performs no IO; the shells
//! around it do.

use std::fmt;

use crate::types::{Amount, BidderId};

/// What the coordinator obtained from one bidder during a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundResponse {
    /// A numeric offer (not yet checked against the threshold).
    Offer(Amount),
    /// Explicit pass for this round; the bidder stays active.
    Pass,
    /// Explicit withdrawal; the bidder leaves the auction.
    Withdrawn,
    /// Anything that is neither a number nor a known token. Counts as a pass.
    Malformed(String),
    /// No reply within the read bound.
    TimedOut,
    /// Channel reached EOF or failed.
    Disconnected,
}

impl RoundResponse {
    /// Why this response removes the bidder from the auction, if it does.
    pub fn deactivation_reason(&self) -> Option<&'static str> {
        match self {
            RoundResponse::Withdrawn => Some("withdrew"),
            RoundResponse::TimedOut => Some("timed out"),
            RoundResponse::Disconnected => Some("channel closed"),
            RoundResponse::Offer(_) | RoundResponse::Pass | RoundResponse::Malformed(_) => None,
        }
    }
}

/// Why the auction reached `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// A round passed without any offer meeting the threshold.
    NoRaise,
    /// Every bidder was deactivated.
    NoActiveBidders,
    /// Only the current leader remains and it may not raise its own bid.
    NoChallengers,
    /// The configured round cap was reached.
    RoundLimit,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::NoRaise => "no raise",
            CloseReason::NoActiveBidders => "no active bidders",
            CloseReason::NoChallengers => "no challengers",
            CloseReason::RoundLimit => "round limit",
        };
        f.write_str(s)
    }
}

/// Final result of an auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionOutcome {
    /// Leading bidder at close, `None` if nobody ever raised.
    pub winner: Option<BidderId>,
    /// Current bid at close (the starting bid when there is no winner).
    pub final_bid: Amount,
    /// Number of rounds that were broadcast.
    pub rounds: u32,
    pub reason: CloseReason,
}

pub mod coordinator;
pub mod core;
pub mod link;
pub mod protocol;
pub mod runtime;

pub use coordinator::{Coordinator, CoordinatorOptions};
pub use self::core::{AuctionCore, AuctionState, CoreOptions, Phase, RoundSnapshot, RoundStart, RoundVerdict};
pub use link::BidderLink;
pub use protocol::{ClosingAnnouncement, RoundAnnouncement, parse_reply};
pub use runtime::{AuctionReport, BidderSummary, run_auction, run_auction_until};
