//! In-process bidders speaking the line protocol over a socket pair.
//!
//! These stand in for bidder processes when a test only cares about the
//! coordinator's round logic.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;

use auctioneer::engine::BidderLink;
use auctioneer::types::BidderId;

/// How a fake bidder answers each announcement.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Offer `currentBid + minIncrement` every round.
    AlwaysRaise,
    /// Reply `pass` every round.
    AlwaysPass,
    /// Raise by the minimum in the first round, then pass.
    RaiseOnce,
    /// Offer the same amount every round.
    Fixed(u64),
    /// Send these replies in order, then pass.
    Script(Vec<String>),
    /// Read announcements but never reply.
    Silent,
    /// Pass for this many rounds, then close the channel.
    HangUpAfter(usize),
}

/// Start a fake bidder task and return the coordinator-side link for it.
///
/// The join handle resolves to every line the bidder received, closing
/// announcement included.
pub fn fake_bidder(id: BidderId, strategy: Strategy) -> (BidderLink, JoinHandle<Vec<String>>) {
    let (ours, theirs) = UnixStream::pair().expect("creating socket pair for fake bidder");
    let handle = tokio::spawn(run_strategy(theirs, strategy));
    (BidderLink::new(id, ours), handle)
}

/// Convenience: one fake bidder per strategy, ids in order.
pub fn fake_bidders(
    strategies: impl IntoIterator<Item = Strategy>,
) -> (Vec<BidderLink>, Vec<JoinHandle<Vec<String>>>) {
    strategies
        .into_iter()
        .enumerate()
        .map(|(id, strategy)| fake_bidder(id, strategy))
        .unzip()
}

async fn run_strategy(stream: UnixStream, strategy: Strategy) -> Vec<String> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut received = Vec::new();
    let mut rounds_seen = 0usize;

    while let Ok(Some(line)) = lines.next_line().await {
        received.push(line.clone());
        if line.starts_with("end") {
            break;
        }

        let mut fields = line
            .split_whitespace()
            .map(|f| f.parse::<u64>().unwrap_or_default());
        let bid = fields.next().unwrap_or_default();
        let inc = fields.next().unwrap_or_default();
        let raise = (bid + inc).to_string();

        let reply = match &strategy {
            Strategy::AlwaysRaise => Some(raise),
            Strategy::AlwaysPass => Some("pass".to_string()),
            Strategy::RaiseOnce if rounds_seen == 0 => Some(raise),
            Strategy::RaiseOnce => Some("pass".to_string()),
            Strategy::Fixed(amount) => Some(amount.to_string()),
            Strategy::Script(replies) => Some(
                replies
                    .get(rounds_seen)
                    .cloned()
                    .unwrap_or_else(|| "pass".to_string()),
            ),
            Strategy::Silent => None,
            Strategy::HangUpAfter(n) if rounds_seen >= *n => return received,
            Strategy::HangUpAfter(_) => Some("pass".to_string()),
        };
        rounds_seen += 1;

        if let Some(reply) = reply {
            if write_half.write_all(format!("{reply}\n").as_bytes()).await.is_err() {
                break;
            }
        }
    }

    received
}
