// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Only setup-level failures (`MalformedInput`, `ChannelCreation`, `Spawn`,
//! `Settings`) ever escape an auction run. The per-bidder variants are
//! produced so they can be logged with a proper message, then absorbed by
//! the coordinator or reaper.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::BidderId;

#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Could not create channel for bidder {bidder}: {source}")]
    ChannelCreation {
        bidder: BidderId,
        #[source]
        source: io::Error,
    },

    #[error("Could not spawn process for bidder {bidder} ({}): {source}", path.display())]
    Spawn {
        bidder: BidderId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not execute bidder {bidder} ({}): {source}", path.display())]
    Exec {
        bidder: BidderId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Bidder {bidder} did not respond within {after:?}")]
    BidderTimeout { bidder: BidderId, after: Duration },

    #[error("Bidder {0} closed its channel")]
    BidderEof(BidderId),

    #[error("Bidder {bidder} sent a reply longer than {limit} bytes")]
    ReplyTooLong { bidder: BidderId, limit: u64 },

    #[error("Bidder {bidder} did not exit within {grace:?}")]
    ReapTimeout { bidder: BidderId, grace: Duration },

    #[error("Auction aborted: {0}")]
    Aborted(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AuctionError {
    /// Whether this error isolates a single bidder rather than the whole run.
    pub fn is_per_bidder(&self) -> bool {
        matches!(
            self,
            AuctionError::Exec { .. }
                | AuctionError::BidderTimeout { .. }
                | AuctionError::BidderEof(_)
                | AuctionError::ReplyTooLong { .. }
                | AuctionError::ReapTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AuctionError>;
