// src/engine/protocol.rs

//! Line protocol spoken over each bidder's channel.
//!
//! Coordinator → bidder, once per round:
//!
//! ```text
//! <currentBid> <minIncrement> <round>
//! ```
//!
//! Bidder → coordinator, one line per round: an integer offer, the pass
//! token, or the withdraw token.
//!
//! Coordinator → bidder, once at close:
//!
//! ```text
//! end <winnerId|none> <finalBid>
//! ```

use crate::config::ProtocolTokens;
use crate::engine::{AuctionOutcome, RoundResponse};
use crate::types::{Amount, BidderId};

/// Per-round state broadcast to every recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundAnnouncement {
    pub current_bid: Amount,
    pub min_increment: Amount,
    pub round: u32,
}

impl RoundAnnouncement {
    pub fn encode(&self) -> String {
        format!("{} {} {}\n", self.current_bid, self.min_increment, self.round)
    }
}

/// Announcement sent to every still-connected bidder once the auction closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosingAnnouncement {
    pub winner: Option<BidderId>,
    pub final_bid: Amount,
}

impl ClosingAnnouncement {
    pub fn encode(&self) -> String {
        match self.winner {
            Some(id) => format!("end {} {}\n", id, self.final_bid),
            None => format!("end none {}\n", self.final_bid),
        }
    }
}

impl From<&AuctionOutcome> for ClosingAnnouncement {
    fn from(outcome: &AuctionOutcome) -> Self {
        Self {
            winner: outcome.winner,
            final_bid: outcome.final_bid,
        }
    }
}

/// Interpret one reply line from a bidder.
pub fn parse_reply(line: &str, tokens: &ProtocolTokens) -> RoundResponse {
    let reply = line.trim();

    if let Ok(amount) = reply.parse::<Amount>() {
        return RoundResponse::Offer(amount);
    }

    let lowered = reply.to_lowercase();
    if lowered == tokens.pass {
        RoundResponse::Pass
    } else if lowered == tokens.withdraw {
        RoundResponse::Withdrawn
    } else {
        RoundResponse::Malformed(reply.to_string())
    }
}
