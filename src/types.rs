use std::fmt;

/// Index of a bidder in input order (`0..N-1`).
pub type BidderId = usize;

/// Bid amounts are whole currency units.
pub type Amount = u64;

/// Lifecycle status of a bidder process as seen by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidderStatus {
    /// Process is running (or at least was never reaped).
    Active,
    /// Process exited normally with the given code.
    Exited(i32),
    /// Process could not be launched, was killed, or could not be reaped.
    Failed(String),
}

impl BidderStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, BidderStatus::Active)
    }
}

impl fmt::Display for BidderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidderStatus::Active => write!(f, "active"),
            BidderStatus::Exited(code) => write!(f, "exited({code})"),
            BidderStatus::Failed(reason) => write!(f, "failed({reason})"),
        }
    }
}
