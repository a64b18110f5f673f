// src/exec/reaper.rs

//! Process reaper: collects exit statuses after the auction closes.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::join_all;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::errors::AuctionError;
use crate::exec::handle::BidderHandle;
use crate::types::{BidderId, BidderStatus};

/// Waits for bidder processes to exit, in whatever order they exit.
///
/// Reaping is idempotent: a handle whose process was already reaped keeps
/// its recorded status and is not waited on again.
#[derive(Debug, Clone, Copy)]
pub struct Reaper {
    grace: Duration,
}

impl Reaper {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Wait for every unreaped process and return the final status of every
    /// handle, keyed by bidder id.
    ///
    /// A process still running after the grace period produces a
    /// `ReapTimeout` (logged only), is killed, and is recorded as `Failed`.
    pub async fn reap_all(&self, handles: &mut [BidderHandle]) -> BTreeMap<BidderId, BidderStatus> {
        let grace = self.grace;
        join_all(handles.iter_mut().map(|handle| reap_one(handle, grace))).await;

        handles
            .iter()
            .map(|handle| (handle.id(), handle.status().clone()))
            .collect()
    }

    /// Cancellation path: send SIGTERM to every live process, then reap.
    pub async fn terminate_all(
        &self,
        handles: &mut [BidderHandle],
    ) -> BTreeMap<BidderId, BidderStatus> {
        for handle in handles.iter() {
            if let Some(pid) = handle.live_pid() {
                signal_terminate(handle.id(), pid);
            }
        }
        self.reap_all(handles).await
    }
}

async fn reap_one(handle: &mut BidderHandle, grace: Duration) {
    let bidder = handle.id();
    let Some(mut child) = handle.take_child() else {
        debug!(bidder, status = %handle.status(), "bidder already reaped");
        return;
    };

    match timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            handle.record_exit(status);
            info!(
                bidder,
                exit_code = status.code(),
                success = status.success(),
                "bidder process exited"
            );
        }
        Ok(Err(e)) => {
            warn!(bidder, error = %e, "failed to wait for bidder process");
            handle.mark_failed(format!("wait failed: {e}"));
        }
        Err(_elapsed) => {
            let err = AuctionError::ReapTimeout { bidder, grace };
            warn!(bidder, error = %err, "killing bidder process");
            if let Err(e) = child.kill().await {
                warn!(bidder, error = %e, "failed to kill bidder process");
            }
            handle.mark_failed(err.to_string());
        }
    }
}

fn signal_terminate(bidder: BidderId, pid: u32) {
    let Ok(raw) = i32::try_from(pid) else {
        warn!(bidder, pid, "pid out of range; not signalling");
        return;
    };

    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => debug!(bidder, pid, "sent SIGTERM"),
        Err(e) => debug!(bidder, pid, error = %e, "SIGTERM not delivered"),
    }
}
