// src/config/loader.rs

use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::config::model::{AuctionConfig, RawAuctionInput, RawBidderEntry};
use crate::errors::{AuctionError, Result};

/// Tokenize startup input into a `RawAuctionInput`.
///
/// Layout: `startingBid minIncrement numBidders`, then `numBidders` blocks of
/// `name argCount arg1 ... argN`. Tokens are whitespace separated; line
/// breaks carry no meaning.
///
/// This only checks the *shape* of the input (missing tokens, non-numeric
/// numbers, leftover tokens). Value ranges are checked in `validate.rs`.
pub fn parse_input(input: &str) -> Result<RawAuctionInput> {
    let mut tokens = Tokens::new(input);

    let starting_bid: i64 = tokens.number("starting bid")?;
    let min_increment: i64 = tokens.number("minimum increment")?;
    let count: i64 = tokens.number("bidder count")?;

    if count < 1 {
        return Err(AuctionError::MalformedInput(format!(
            "bidder count must be >= 1 (got {count})"
        )));
    }

    let mut bidders = Vec::with_capacity(count.min(64) as usize);
    for index in 0..count {
        let name = tokens.word(&format!("name of bidder {index}"))?.to_string();
        let arg_count: i64 = tokens.number(&format!("argument count of bidder '{name}'"))?;
        if arg_count < 0 {
            return Err(AuctionError::MalformedInput(format!(
                "argument count of bidder '{name}' must be >= 0 (got {arg_count})"
            )));
        }

        let mut arguments = Vec::with_capacity(arg_count.min(64) as usize);
        for _ in 0..arg_count {
            match tokens.next() {
                Some(arg) => arguments.push(arg.to_string()),
                None => {
                    return Err(AuctionError::MalformedInput(format!(
                        "bidder '{name}' declares {arg_count} arguments but only {} are present",
                        arguments.len()
                    )));
                }
            }
        }

        bidders.push(RawBidderEntry { name, arguments });
    }

    if let Some(extra) = tokens.next() {
        return Err(AuctionError::MalformedInput(format!(
            "unexpected token '{extra}' after the last bidder block; \
             an argument count may be wrong"
        )));
    }

    Ok(RawAuctionInput {
        starting_bid,
        min_increment,
        bidders,
    })
}

/// Parse and validate startup input held in memory.
pub fn load_from_str(input: &str, bidder_dir: &Path) -> Result<AuctionConfig> {
    let raw = parse_input(input)?;
    raw.into_config(bidder_dir)
}

/// Read startup input from any reader (stdin in production).
pub fn load_from_reader(mut reader: impl Read, bidder_dir: &Path) -> Result<AuctionConfig> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    load_from_str(&contents, bidder_dir)
}

/// Read startup input from a file and return the raw, unvalidated form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawAuctionInput> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_input(&contents)
}

/// Load startup input from a file and validate it.
///
/// This is the recommended entry point for file-based input: the result has
/// every executable path resolved against `bidder_dir`.
pub fn load_and_validate(path: impl AsRef<Path>, bidder_dir: &Path) -> Result<AuctionConfig> {
    let raw = load_from_path(path)?;
    raw.into_config(bidder_dir)
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace(),
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn word(&mut self, what: &str) -> Result<&'a str> {
        self.next()
            .ok_or_else(|| AuctionError::MalformedInput(format!("missing {what}")))
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.word(what)?;
        token.parse().map_err(|_| {
            AuctionError::MalformedInput(format!("{what} must be an integer (got '{token}')"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn malformed(input: &str) -> String {
        match parse_input(input) {
            Err(AuctionError::MalformedInput(msg)) => msg,
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn parses_blocks_across_arbitrary_line_breaks() {
        let raw = parse_input("100 10\n2\nalpha 2 --step\n 5\nbeta 0\n").unwrap();

        assert_eq!(raw.starting_bid, 100);
        assert_eq!(raw.min_increment, 10);
        assert_eq!(raw.bidders.len(), 2);
        assert_eq!(raw.bidders[0].name, "alpha");
        assert_eq!(raw.bidders[0].arguments, vec!["--step", "5"]);
        assert!(raw.bidders[1].arguments.is_empty());
    }

    #[test]
    fn missing_header_field_is_malformed() {
        assert!(malformed("100 10").contains("bidder count"));
        assert!(malformed("").contains("starting bid"));
    }

    #[test]
    fn non_numeric_field_is_malformed() {
        let msg = malformed("100 ten 1 alpha 0");
        assert!(msg.contains("minimum increment"));
        assert!(msg.contains("ten"));

        let msg = malformed("100 10 1 alpha many");
        assert!(msg.contains("argument count"));
    }

    #[test]
    fn argument_count_larger_than_tokens_is_malformed() {
        let msg = malformed("100 10 1 alpha 3 a b");
        assert!(msg.contains("declares 3 arguments"));
    }

    #[test]
    fn argument_count_smaller_than_tokens_is_malformed() {
        let msg = malformed("100 10 1 alpha 1 a b");
        assert!(msg.contains("unexpected token 'b'"));
    }

    #[test]
    fn missing_bidder_block_is_malformed() {
        let msg = malformed("100 10 2 alpha 0");
        assert!(msg.contains("name of bidder 1"));
    }

    #[test]
    fn zero_bidders_is_malformed() {
        assert!(malformed("100 10 0").contains("bidder count"));
    }

    #[test]
    fn load_from_str_resolves_paths() {
        let cfg = load_from_str("0 1 1 alpha 0", &PathBuf::from("../bin")).unwrap();
        assert_eq!(cfg.bidders[0].executable_path, PathBuf::from("../bin/alpha"));
    }
}
