#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use auctioneer::config::{AuctionConfig, BidderSpec, Settings};
use auctioneer::types::Amount;

/// `/bin/sh -c` bodies implementing the bidder protocol.
pub mod scripts {
    /// Always offers `currentBid + minIncrement`.
    pub const ALWAYS_RAISE: &str =
        r#"while read bid inc round; do [ "$bid" = end ] && exit 0; echo $((bid + inc)); done"#;

    /// Passes every round.
    pub const ALWAYS_PASS: &str =
        r#"while read bid inc round; do [ "$bid" = end ] && exit 0; echo pass; done"#;

    /// Raises by the minimum in its first round, then passes.
    pub const RAISE_ONCE: &str = r#"raised=0
while read bid inc round; do
  [ "$bid" = end ] && exit 0
  if [ "$raised" = 0 ]; then raised=1; echo $((bid + inc)); else echo pass; fi
done"#;

    /// Reads the first announcement and exits without replying.
    pub const QUIT_AFTER_FIRST_LINE: &str = "read line; exit 3";

    /// Echoes every line back.
    pub const ECHO: &str = "exec cat";

    /// Ignores its channel and never exits on its own.
    pub const NEVER_EXITS: &str = "exec sleep 30";
}

/// Builder for `AuctionConfig` to simplify test setup.
pub struct AuctionConfigBuilder {
    starting_bid: Amount,
    min_increment: Amount,
    bidders: Vec<BidderSpec>,
}

impl AuctionConfigBuilder {
    pub fn new(starting_bid: Amount, min_increment: Amount) -> Self {
        Self {
            starting_bid,
            min_increment,
            bidders: Vec::new(),
        }
    }

    /// Add a bidder with an explicit executable path and arguments.
    pub fn bidder(mut self, name: &str, path: impl Into<PathBuf>, args: &[&str]) -> Self {
        let id = self.bidders.len();
        self.bidders.push(BidderSpec {
            id,
            name: name.to_string(),
            executable_path: path.into(),
            arguments: args.iter().map(|a| a.to_string()).collect(),
        });
        self
    }

    /// Add a bidder that runs `script` under `/bin/sh -c`.
    pub fn shell_bidder(self, name: &str, script: &str) -> Self {
        self.bidder(name, "/bin/sh", &["-c", script])
    }

    pub fn build(self) -> AuctionConfig {
        AuctionConfig {
            starting_bid: self.starting_bid,
            min_increment: self.min_increment,
            bidders: self.bidders,
        }
    }
}

/// Settings with bounds short enough for tests.
pub fn fast_settings() -> Settings {
    Settings {
        read_timeout: Duration::from_secs(2),
        write_timeout: Duration::from_secs(1),
        reap_grace: Duration::from_secs(2),
        ..Settings::default()
    }
}
