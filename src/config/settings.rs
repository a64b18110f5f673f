// src/config/settings.rs

//! Optional runtime settings read from a TOML file.
//!
//! ```toml
//! [auction]
//! bidder_dir = "../bin"
//! read_timeout = "2s"
//! write_timeout = "1s"
//! reap_grace = "3s"
//! max_rounds = 1000
//! leader_may_raise = false
//!
//! [protocol]
//! pass_token = "pass"
//! withdraw_token = "withdraw"
//! ```
//!
//! Every section and key is optional. Durations are kept as strings in the
//! file model and parsed once into [`Settings`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{AuctionError, Result};

/// Direct mapping of the settings TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub auction: AuctionSection,

    #[serde(default)]
    pub protocol: ProtocolSection,
}

/// `[auction]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuctionSection {
    /// Directory bidder executables are resolved against.
    #[serde(default = "default_bidder_dir")]
    pub bidder_dir: PathBuf,

    /// Bound on waiting for one bidder's reply in a round.
    #[serde(default = "default_read_timeout")]
    pub read_timeout: String,

    /// Bound on writing the round announcement to one bidder.
    #[serde(default = "default_write_timeout")]
    pub write_timeout: String,

    /// How long the reaper waits for each process before killing it.
    #[serde(default = "default_reap_grace")]
    pub reap_grace: String,

    /// Hard cap on the number of rounds. `None` means unlimited.
    #[serde(default)]
    pub max_rounds: Option<u32>,

    /// Whether the current leader's own raise is eligible.
    #[serde(default)]
    pub leader_may_raise: bool,
}

fn default_bidder_dir() -> PathBuf {
    PathBuf::from("../bin")
}

fn default_read_timeout() -> String {
    "2s".to_string()
}

fn default_write_timeout() -> String {
    "1s".to_string()
}

fn default_reap_grace() -> String {
    "3s".to_string()
}

impl Default for AuctionSection {
    fn default() -> Self {
        Self {
            bidder_dir: default_bidder_dir(),
            read_timeout: default_read_timeout(),
            write_timeout: default_write_timeout(),
            reap_grace: default_reap_grace(),
            max_rounds: None,
            leader_may_raise: false,
        }
    }
}

/// `[protocol]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolSection {
    #[serde(default = "default_pass_token")]
    pub pass_token: String,

    #[serde(default = "default_withdraw_token")]
    pub withdraw_token: String,
}

fn default_pass_token() -> String {
    "pass".to_string()
}

fn default_withdraw_token() -> String {
    "withdraw".to_string()
}

impl Default for ProtocolSection {
    fn default() -> Self {
        Self {
            pass_token: default_pass_token(),
            withdraw_token: default_withdraw_token(),
        }
    }
}

/// Reply tokens a bidder may send instead of a numeric offer.
///
/// Matching is case-insensitive; tokens are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolTokens {
    pub pass: String,
    pub withdraw: String,
}

impl Default for ProtocolTokens {
    fn default() -> Self {
        Self {
            pass: default_pass_token(),
            withdraw: default_withdraw_token(),
        }
    }
}

/// Resolved runtime settings used by the auction runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bidder_dir: PathBuf,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub reap_grace: Duration,
    pub max_rounds: Option<u32>,
    pub leader_may_raise: bool,
    pub tokens: ProtocolTokens,
}

impl Default for Settings {
    fn default() -> Self {
        // The defaults are known-good literals.
        Self {
            bidder_dir: default_bidder_dir(),
            read_timeout: Duration::from_secs(2),
            write_timeout: Duration::from_secs(1),
            reap_grace: Duration::from_secs(3),
            max_rounds: None,
            leader_may_raise: false,
            tokens: ProtocolTokens::default(),
        }
    }
}

impl TryFrom<SettingsFile> for Settings {
    type Error = AuctionError;

    fn try_from(file: SettingsFile) -> std::result::Result<Self, Self::Error> {
        let auction = file.auction;
        let protocol = file.protocol;

        let read_timeout = positive_duration("auction.read_timeout", &auction.read_timeout)?;
        let write_timeout = positive_duration("auction.write_timeout", &auction.write_timeout)?;
        let reap_grace = positive_duration("auction.reap_grace", &auction.reap_grace)?;

        if auction.max_rounds == Some(0) {
            return Err(AuctionError::Settings(
                "auction.max_rounds must be >= 1 when set (got 0)".to_string(),
            ));
        }

        let tokens = ProtocolTokens {
            pass: reply_token("protocol.pass_token", &protocol.pass_token)?,
            withdraw: reply_token("protocol.withdraw_token", &protocol.withdraw_token)?,
        };
        if tokens.pass == tokens.withdraw {
            return Err(AuctionError::Settings(format!(
                "protocol.pass_token and protocol.withdraw_token must differ (both '{}')",
                tokens.pass
            )));
        }

        Ok(Settings {
            bidder_dir: auction.bidder_dir,
            read_timeout,
            write_timeout,
            reap_grace,
            max_rounds: auction.max_rounds,
            leader_may_raise: auction.leader_may_raise,
            tokens,
        })
    }
}

impl Settings {
    /// Load settings from a TOML file and resolve them.
    pub fn load(path: impl AsRef<Path>) -> Result<Settings> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Settings> {
        let file: SettingsFile = toml::from_str(contents)?;
        Settings::try_from(file)
    }
}

fn positive_duration(key: &str, value: &str) -> Result<Duration> {
    let dur = parse_duration(value)
        .map_err(|e| AuctionError::Settings(format!("{key}: {e}")))?;
    if dur.is_zero() {
        return Err(AuctionError::Settings(format!("{key} must be > 0")));
    }
    Ok(dur)
}

fn reply_token(key: &str, value: &str) -> Result<String> {
    let token = value.trim().to_lowercase();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuctionError::Settings(format!(
            "{key} must be a single non-empty word (got '{value}')"
        )));
    }
    if token.parse::<i64>().is_ok() {
        return Err(AuctionError::Settings(format!(
            "{key} must not be numeric (got '{value}')"
        )));
    }
    Ok(token)
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{s}'"))
}
