// src/exec/launcher.rs

//! Bidder process launcher.

use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::process::Stdio;

use nix::errno::Errno;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::channel::ChannelPair;
use crate::config::BidderSpec;
use crate::errors::{AuctionError, Result};
use crate::exec::handle::BidderHandle;

/// A running bidder plus the coordinator's end of its channel.
#[derive(Debug)]
pub struct LaunchedBidder {
    pub handle: BidderHandle,
    pub endpoint: UnixStream,
}

/// Spawn the bidder described by `spec`, with stdin and stdout both bound to
/// the child end of `pair`.
///
/// The parent's copies of the child end are closed before this returns, so
/// the coordinator observes EOF on its end as soon as the child exits.
///
/// Errors:
/// - `AuctionError::Exec` if the executable is missing, not executable, or
///   not a valid program image. Only that bidder is affected.
/// - `AuctionError::Spawn` for any other failure (descriptor or process
///   exhaustion). This is fatal for the auction.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_bidder(spec: &BidderSpec, pair: ChannelPair) -> Result<LaunchedBidder> {
    let (coordinator_end, child_end) = pair.into_parts();

    let stdout_end = child_end
        .try_clone()
        .map_err(|source| spawn_error(spec, source))?;

    let mut cmd = Command::new(&spec.executable_path);
    cmd.args(&spec.arguments)
        .stdin(Stdio::from(OwnedFd::from(child_end)))
        .stdout(Stdio::from(OwnedFd::from(stdout_end)))
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let spawned = cmd.spawn();
    // The command still owns the child-side descriptors; release them now.
    drop(cmd);

    let mut child = spawned.map_err(|source| classify_spawn_error(spec, source))?;

    info!(
        bidder = spec.id,
        name = %spec.name,
        pid = child.id(),
        path = %spec.executable_path.display(),
        args = ?spec.arguments,
        "bidder process launched"
    );

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = child.stderr.take() {
        let bidder = spec.id;
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();

            while let Ok(Some(line)) = lines.next_line().await {
                debug!(bidder, "stderr: {}", line);
            }
        });
    }

    Ok(LaunchedBidder {
        handle: BidderHandle::launched(spec.clone(), child),
        endpoint: coordinator_end,
    })
}

fn classify_spawn_error(spec: &BidderSpec, source: io::Error) -> AuctionError {
    let exec_failure = matches!(
        source.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    ) || source.raw_os_error() == Some(Errno::ENOEXEC as i32);

    if exec_failure {
        AuctionError::Exec {
            bidder: spec.id,
            path: spec.executable_path.clone(),
            source,
        }
    } else {
        spawn_error(spec, source)
    }
}

fn spawn_error(spec: &BidderSpec, source: io::Error) -> AuctionError {
    AuctionError::Spawn {
        bidder: spec.id,
        path: spec.executable_path.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec(path: &str) -> BidderSpec {
        BidderSpec {
            id: 4,
            name: "probe".into(),
            executable_path: PathBuf::from(path),
            arguments: vec![],
        }
    }

    #[test]
    fn missing_executable_is_exec_error() {
        let err = classify_spawn_error(
            &spec("/nonexistent/probe"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(err, AuctionError::Exec { bidder: 4, .. }));
        assert!(err.is_per_bidder());
    }

    #[test]
    fn bad_image_is_exec_error() {
        let err = classify_spawn_error(
            &spec("/tmp/probe"),
            io::Error::from_raw_os_error(Errno::ENOEXEC as i32),
        );
        assert!(matches!(err, AuctionError::Exec { .. }));
    }

    #[test]
    fn resource_exhaustion_is_spawn_error() {
        let err = classify_spawn_error(
            &spec("/bin/true"),
            io::Error::from_raw_os_error(Errno::EAGAIN as i32),
        );
        assert!(matches!(err, AuctionError::Spawn { .. }));
        assert!(!err.is_per_bidder());
    }
}
