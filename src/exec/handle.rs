// src/exec/handle.rs

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use tokio::process::Child;

use crate::config::BidderSpec;
use crate::types::{BidderId, BidderStatus};

/// Coordinator-side record of one bidder process.
///
/// - `child` is `Some` until the process has been reaped.
/// - `status` starts as `Active` (or `Failed` if the launch failed) and is
///   finalised by the reaper.
#[derive(Debug)]
pub struct BidderHandle {
    spec: BidderSpec,
    pid: Option<u32>,
    child: Option<Child>,
    status: BidderStatus,
}

impl BidderHandle {
    pub fn launched(spec: BidderSpec, child: Child) -> Self {
        Self {
            pid: child.id(),
            spec,
            child: Some(child),
            status: BidderStatus::Active,
        }
    }

    /// Handle for a bidder whose process never started.
    pub fn failed(spec: BidderSpec, reason: impl Into<String>) -> Self {
        Self {
            spec,
            pid: None,
            child: None,
            status: BidderStatus::Failed(reason.into()),
        }
    }

    pub fn id(&self) -> BidderId {
        self.spec.id
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Pid of a process that has not been reaped yet.
    pub fn live_pid(&self) -> Option<u32> {
        self.child.as_ref().and(self.pid)
    }

    pub fn status(&self) -> &BidderStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_reaped(&self) -> bool {
        self.child.is_none()
    }

    pub(crate) fn take_child(&mut self) -> Option<Child> {
        self.child.take()
    }

    pub(crate) fn record_exit(&mut self, status: ExitStatus) {
        self.status = status_from_exit(status);
    }

    pub(crate) fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = BidderStatus::Failed(reason.into());
    }
}

fn status_from_exit(status: ExitStatus) -> BidderStatus {
    match status.code() {
        Some(code) => BidderStatus::Exited(code),
        None => match status.signal() {
            Some(sig) => BidderStatus::Failed(format!("terminated by signal {sig}")),
            None => BidderStatus::Failed("terminated without exit code".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_exit_codes_and_signals() {
        assert_eq!(
            status_from_exit(ExitStatus::from_raw(0)),
            BidderStatus::Exited(0)
        );
        // Wait status encoding: exit code in the high byte.
        assert_eq!(
            status_from_exit(ExitStatus::from_raw(3 << 8)),
            BidderStatus::Exited(3)
        );
        // Low seven bits hold the terminating signal.
        assert_eq!(
            status_from_exit(ExitStatus::from_raw(9)),
            BidderStatus::Failed("terminated by signal 9".to_string())
        );
    }
}
