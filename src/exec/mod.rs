// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for running bidder executables with
//! `tokio::process::Command`, each wired to its own channel endpoint, and
//! for collecting their exit statuses afterwards.
//!
//! - [`launcher`] spawns one bidder process with stdin/stdout rebound to
//!   the child end of its channel pair.
//! - [`handle`] holds the per-bidder process handle and lifecycle status.
//! - [`reaper`] waits for every process (unordered, bounded by a grace
//!   period) and implements cancellation via SIGTERM.

pub mod handle;
pub mod launcher;
pub mod reaper;

pub use handle::BidderHandle;
pub use launcher::{LaunchedBidder, spawn_bidder};
pub use reaper::Reaper;
