// src/config/model.rs

use std::path::PathBuf;

use crate::types::{Amount, BidderId};

/// One bidder block exactly as it appeared in the startup input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBidderEntry {
    /// Executable token (resolved against the bidder directory later).
    pub name: String,
    pub arguments: Vec<String>,
}

/// Startup input after tokenization, before semantic checks.
///
/// Mirrors the input layout:
///
/// ```text
/// 100 10 2
/// alpha 1 --greedy
/// beta 0
/// ```
///
/// Numbers are kept signed here so that validation can report a negative
/// starting bid or increment precisely instead of failing at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAuctionInput {
    pub starting_bid: i64,
    pub min_increment: i64,
    pub bidders: Vec<RawBidderEntry>,
}

/// Launch description for a single bidder. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidderSpec {
    pub id: BidderId,
    /// Name token from the input, used in logs and the final report.
    pub name: String,
    pub executable_path: PathBuf,
    /// Argument vector passed after the implicit program name.
    pub arguments: Vec<String>,
}

/// Validated auction configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionConfig {
    pub starting_bid: Amount,
    pub min_increment: Amount,
    pub bidders: Vec<BidderSpec>,
}

impl AuctionConfig {
    pub fn bidder_count(&self) -> usize {
        self.bidders.len()
    }

    pub fn bidder(&self, id: BidderId) -> Option<&BidderSpec> {
        self.bidders.get(id)
    }
}
