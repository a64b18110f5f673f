// src/config/validate.rs

use std::path::Path;

use crate::config::model::{AuctionConfig, BidderSpec, RawAuctionInput};
use crate::errors::{AuctionError, Result};

impl RawAuctionInput {
    /// Check value ranges and resolve every bidder executable against
    /// `bidder_dir`, producing the immutable `AuctionConfig`.
    pub fn into_config(self, bidder_dir: &Path) -> Result<AuctionConfig> {
        validate_raw_input(&self)?;

        let bidders = self
            .bidders
            .into_iter()
            .enumerate()
            .map(|(id, entry)| BidderSpec {
                id,
                executable_path: bidder_dir.join(&entry.name),
                name: entry.name,
                arguments: entry.arguments,
            })
            .collect();

        Ok(AuctionConfig {
            starting_bid: self.starting_bid as u64,
            min_increment: self.min_increment as u64,
            bidders,
        })
    }
}

fn validate_raw_input(raw: &RawAuctionInput) -> Result<()> {
    if raw.starting_bid < 0 {
        return Err(AuctionError::MalformedInput(format!(
            "starting bid must be >= 0 (got {})",
            raw.starting_bid
        )));
    }

    if raw.min_increment <= 0 {
        return Err(AuctionError::MalformedInput(format!(
            "minimum increment must be > 0 (got {})",
            raw.min_increment
        )));
    }

    if raw.bidders.is_empty() {
        return Err(AuctionError::MalformedInput(
            "input must describe at least one bidder".to_string(),
        ));
    }

    for (id, entry) in raw.bidders.iter().enumerate() {
        if entry.name.is_empty() {
            return Err(AuctionError::MalformedInput(format!(
                "bidder {id} has an empty executable name"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawBidderEntry;
    use std::path::PathBuf;

    fn raw(starting_bid: i64, min_increment: i64) -> RawAuctionInput {
        RawAuctionInput {
            starting_bid,
            min_increment,
            bidders: vec![
                RawBidderEntry {
                    name: "alpha".into(),
                    arguments: vec!["1".into()],
                },
                RawBidderEntry {
                    name: "/usr/local/bin/beta".into(),
                    arguments: vec![],
                },
            ],
        }
    }

    #[test]
    fn assigns_ids_in_input_order_and_resolves_paths() {
        let cfg = raw(0, 5).into_config(&PathBuf::from("../bin")).unwrap();

        assert_eq!(cfg.starting_bid, 0);
        assert_eq!(cfg.min_increment, 5);
        assert_eq!(cfg.bidders[0].id, 0);
        assert_eq!(cfg.bidders[0].executable_path, PathBuf::from("../bin/alpha"));
        assert_eq!(cfg.bidders[1].id, 1);
        // Absolute names are not re-rooted.
        assert_eq!(
            cfg.bidders[1].executable_path,
            PathBuf::from("/usr/local/bin/beta")
        );
    }

    #[test]
    fn negative_starting_bid_is_rejected() {
        let err = raw(-1, 5).into_config(Path::new("bin")).unwrap_err();
        assert!(matches!(err, AuctionError::MalformedInput(msg) if msg.contains("starting bid")));
    }

    #[test]
    fn non_positive_increment_is_rejected() {
        let err = raw(10, 0).into_config(Path::new("bin")).unwrap_err();
        assert!(matches!(err, AuctionError::MalformedInput(msg) if msg.contains("increment")));
    }
}
