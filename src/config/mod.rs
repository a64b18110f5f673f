// src/config/mod.rs

//! Configuration loading and validation for auctioneer.
//!
//! Responsibilities:
//! - Define the auction input data model (`model.rs`).
//! - Tokenize the startup input into a raw model (`loader.rs`).
//! - Validate it and resolve executable paths (`validate.rs`).
//! - Load optional runtime settings from TOML (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_reader, load_from_str, parse_input};
pub use model::{AuctionConfig, BidderSpec, RawAuctionInput, RawBidderEntry};
pub use settings::{ProtocolTokens, Settings, SettingsFile, parse_duration};
