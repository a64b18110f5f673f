// src/channel/mod.rs

//! Channel factory: one connected Unix stream socket pair per bidder.
//!
//! The coordinator keeps `coordinator_end`; `child_end` becomes the bidder's
//! stdin and stdout. Both ends are created close-on-exec by the standard
//! library, so a child only ever inherits the descriptors explicitly
//! installed as its standard streams.

use std::os::unix::net::UnixStream;

use tracing::debug;

use crate::errors::{AuctionError, Result};
use crate::types::BidderId;

/// Both ends of one bidder's private duplex channel.
#[derive(Debug)]
pub struct ChannelPair {
    pub bidder: BidderId,
    pub coordinator_end: UnixStream,
    pub child_end: UnixStream,
}

impl ChannelPair {
    /// Allocate a fresh pair for `bidder`.
    pub fn open(bidder: BidderId) -> Result<Self> {
        let (coordinator_end, child_end) = UnixStream::pair()
            .map_err(|source| AuctionError::ChannelCreation { bidder, source })?;

        Ok(Self {
            bidder,
            coordinator_end,
            child_end,
        })
    }

    pub fn into_parts(self) -> (UnixStream, UnixStream) {
        (self.coordinator_end, self.child_end)
    }
}

/// Create `count` independent channel pairs, one per bidder id `0..count`.
///
/// All-or-nothing: if any allocation fails, pairs created so far are closed
/// and the `ChannelCreation` error is returned.
pub fn create_pairs(count: usize) -> Result<Vec<ChannelPair>> {
    let pairs = (0..count)
        .map(ChannelPair::open)
        .collect::<Result<Vec<_>>>()?;

    debug!(count, "created bidder channel pairs");
    Ok(pairs)
}
