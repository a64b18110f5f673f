// src/engine/link.rs

//! Coordinator-side end of one bidder's channel.

use std::io;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tracing::debug;

use crate::errors::{AuctionError, Result};
use crate::types::BidderId;

/// Longest reply line accepted from a bidder. A longer line is skipped up to
/// its newline and reported as `ReplyTooLong`.
pub const MAX_REPLY_BYTES: u64 = 4096;

/// How one bounded line read ended.
enum Framed {
    Line,
    Eof,
    Oversized,
}

/// Buffered, line-oriented wrapper around the coordinator end.
///
/// Dropping the link closes the coordinator end, which the bidder observes
/// as EOF on its stdin.
#[derive(Debug)]
pub struct BidderLink {
    bidder: BidderId,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    buf: Vec<u8>,
}

impl BidderLink {
    pub fn new(bidder: BidderId, stream: UnixStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            bidder,
            reader: BufReader::new(read_half),
            writer: write_half,
            buf: Vec::new(),
        }
    }

    /// Register a blocking std endpoint with the Tokio reactor.
    pub fn from_std(bidder: BidderId, stream: StdUnixStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self::new(bidder, UnixStream::from_std(stream)?))
    }

    pub fn bidder(&self) -> BidderId {
        self.bidder
    }

    /// Write `line` (expected to end in `\n`) within `bound`.
    ///
    /// Output the bidder produced before this announcement is discarded
    /// first, so the next `recv_line` only sees a reply to `line`.
    pub async fn send_line(&mut self, line: &str, bound: Duration) -> Result<()> {
        let stale = self.discard_pending();
        if stale > 0 {
            debug!(bidder = self.bidder, bytes = stale, "discarded unsolicited bidder output");
        }

        let writer = &mut self.writer;
        let write = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        };

        match timeout(bound, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AuctionError::Io(e)),
            Err(_elapsed) => Err(AuctionError::BidderTimeout {
                bidder: self.bidder,
                after: bound,
            }),
        }
    }

    /// Read one reply line within `bound`, without its line terminator.
    ///
    /// - `BidderEof` if the bidder closed its end before sending anything.
    /// - `BidderTimeout` if no complete line arrived in time.
    /// - `ReplyTooLong` if the line exceeds `MAX_REPLY_BYTES`; the rest of
    ///   that line is consumed so the next read starts on a fresh line.
    pub async fn recv_line(&mut self, bound: Duration) -> Result<String> {
        self.buf.clear();
        let reader = &mut self.reader;
        let buf = &mut self.buf;

        let read = async {
            let n = (&mut *reader)
                .take(MAX_REPLY_BYTES)
                .read_until(b'\n', &mut *buf)
                .await?;

            let framed = if n == 0 {
                Framed::Eof
            } else if n as u64 == MAX_REPLY_BYTES && buf.last() != Some(&b'\n') {
                skip_line(&mut *reader).await?;
                Framed::Oversized
            } else {
                Framed::Line
            };
            Ok::<_, io::Error>(framed)
        };

        match timeout(bound, read).await {
            Ok(Ok(Framed::Eof)) => Err(AuctionError::BidderEof(self.bidder)),
            Ok(Ok(Framed::Oversized)) => Err(AuctionError::ReplyTooLong {
                bidder: self.bidder,
                limit: MAX_REPLY_BYTES,
            }),
            Ok(Ok(Framed::Line)) => {
                let line = String::from_utf8_lossy(&self.buf);
                Ok(line.trim_end_matches(['\r', '\n']).to_string())
            }
            Ok(Err(e)) => Err(AuctionError::Io(e)),
            Err(_elapsed) => Err(AuctionError::BidderTimeout {
                bidder: self.bidder,
                after: bound,
            }),
        }
    }

    /// Drop buffered bytes and whatever the socket holds right now, without
    /// waiting. Returns the number of bytes dropped.
    fn discard_pending(&mut self) -> usize {
        let buffered = self.reader.buffer().len();
        self.reader.consume(buffered);

        let mut dropped = buffered;
        let mut scratch = [0u8; 1024];
        loop {
            match self.reader.get_ref().try_read(&mut scratch) {
                // EOF stays observable: the next read returns 0 again.
                Ok(0) => break,
                Ok(n) => dropped += n,
                Err(_) => break,
            }
        }
        dropped
    }
}

/// Consume input up to and including the next newline (or EOF).
async fn skip_line(reader: &mut BufReader<OwnedReadHalf>) -> io::Result<()> {
    loop {
        let (consumed, done) = {
            let available = reader.fill_buf().await?;
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), available.is_empty()),
            }
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const BOUND: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn round_trips_lines() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let mut link = BidderLink::new(0, ours);
        let (their_read, mut their_write) = theirs.into_split();

        link.send_line("100 10 1\n", BOUND).await.unwrap();
        let mut lines = BufReader::new(their_read).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("100 10 1"));

        their_write.write_all(b"110\r\n").await.unwrap();
        assert_eq!(link.recv_line(BOUND).await.unwrap(), "110");
    }

    #[tokio::test]
    async fn eof_is_reported() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let mut link = BidderLink::new(3, ours);
        drop(theirs);

        let err = link.recv_line(BOUND).await.unwrap_err();
        assert!(matches!(err, AuctionError::BidderEof(3)));
    }

    #[tokio::test]
    async fn silence_times_out() {
        let (ours, _theirs) = UnixStream::pair().unwrap();
        let mut link = BidderLink::new(1, ours);

        let err = link.recv_line(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, AuctionError::BidderTimeout { bidder: 1, .. }));
    }

    #[tokio::test]
    async fn final_line_without_newline_is_returned() {
        let (ours, mut theirs) = UnixStream::pair().unwrap();
        let mut link = BidderLink::new(0, ours);

        theirs.write_all(b"pass").await.unwrap();
        drop(theirs);

        assert_eq!(link.recv_line(BOUND).await.unwrap(), "pass");
        assert!(matches!(
            link.recv_line(BOUND).await,
            Err(AuctionError::BidderEof(0))
        ));
    }

    #[tokio::test]
    async fn write_after_peer_closed_fails() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let mut link = BidderLink::new(2, ours);
        drop(theirs);

        let err = link.send_line("100 10 1\n", BOUND).await.unwrap_err();
        assert!(matches!(err, AuctionError::Io(_)));
    }

    #[tokio::test]
    async fn over_long_reply_is_skipped_to_its_newline() {
        let (ours, mut theirs) = UnixStream::pair().unwrap();
        let mut link = BidderLink::new(0, ours);

        let mut noisy = " ".repeat(4500);
        noisy.push_str("999\n");
        theirs.write_all(noisy.as_bytes()).await.unwrap();
        theirs.write_all(b"pass\n").await.unwrap();

        let err = link.recv_line(BOUND).await.unwrap_err();
        assert!(matches!(
            err,
            AuctionError::ReplyTooLong { bidder: 0, limit: MAX_REPLY_BYTES }
        ));
        assert_eq!(link.recv_line(BOUND).await.unwrap(), "pass");
    }

    #[tokio::test]
    async fn reply_just_under_the_cap_is_accepted() {
        let (ours, mut theirs) = UnixStream::pair().unwrap();
        let mut link = BidderLink::new(0, ours);

        let mut line = "7".repeat(MAX_REPLY_BYTES as usize - 1);
        line.push('\n');
        theirs.write_all(line.as_bytes()).await.unwrap();

        let reply = link.recv_line(BOUND).await.unwrap();
        assert_eq!(reply.len(), MAX_REPLY_BYTES as usize - 1);
    }

    #[tokio::test]
    async fn extra_lines_do_not_answer_the_next_round() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let mut link = BidderLink::new(0, ours);
        let (their_read, mut their_write) = theirs.into_split();
        let mut lines = BufReader::new(their_read).lines();

        // Two lines in one write land in the link's buffer together.
        their_write.write_all(b"110\n999\n").await.unwrap();
        assert_eq!(link.recv_line(BOUND).await.unwrap(), "110");

        link.send_line("110 10 2\n", BOUND).await.unwrap();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("110 10 2"));
        their_write.write_all(b"pass\n").await.unwrap();
        assert_eq!(link.recv_line(BOUND).await.unwrap(), "pass");

        // A late line still sitting in the socket is dropped as well.
        their_write.write_all(b"120\n").await.unwrap();
        link.send_line("110 10 3\n", BOUND).await.unwrap();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("110 10 3"));
        their_write.write_all(b"pass\n").await.unwrap();
        assert_eq!(link.recv_line(BOUND).await.unwrap(), "pass");
    }
}
