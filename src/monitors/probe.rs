//! Single-shot MSNP liveness probe
//!
//! A probe opens one TCP connection, sends the `VER` greeting a real client
//! would send first, and waits for the server's first line.
//!
//! ```text
//! connect → send "VER 1 MSNP15\r\n" → read until "\r\n" | EOF | deadline
//! ```
//!
//! The probe never retries; the status monitor decides the cadence.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{instrument, trace};

/// Greeting sent right after the connection is established
pub const GREETING: &[u8] = b"VER 1 MSNP15\r\n";

const LINE_TERMINATOR: &[u8] = b"\r\n";

const READ_CHUNK_SIZE: usize = 1024;

/// A first line longer than this is not an MSNP server talking
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// How a single probe attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A full line came back, `elapsed` after the greeting was sent
    Responded { elapsed: Duration },
    /// The server closed the connection before completing a line
    Closed,
    /// Nothing line-terminated arrived before the deadline
    TimedOut,
}

/// Probe targeting one fixed `host:port`
#[derive(Debug, Clone)]
pub struct ProtocolProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ProtocolProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// The probed endpoint as `host:port`
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Run one probe attempt
    ///
    /// Connection and I/O failures are returned as errors. Connecting is
    /// bounded by the same timeout as the read so an unreachable host cannot
    /// stall the caller.
    #[instrument(skip(self), fields(target = %self.target()))]
    pub async fn run(&self) -> Result<ProbeOutcome> {
        let mut stream = timeout(
            self.timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        .context("connect timed out")?
        .context("failed to connect")?;

        stream
            .write_all(GREETING)
            .await
            .context("failed to send greeting")?;
        let sent_at = Instant::now();
        trace!("greeting sent");

        let outcome = read_first_line(&mut stream, sent_at, sent_at + self.timeout)
            .await
            .context("failed to read response")?;

        trace!("probe finished: {outcome:?}");
        Ok(outcome)
    }
}

/// Accumulate bytes from `reader` until the buffer holds a line terminator,
/// the peer closes, or `deadline` passes
///
/// Only the newly read bytes (plus the one before them) are searched after
/// each chunk. A peer streaming more than `MAX_LINE_LENGTH` bytes without a
/// terminator is an `InvalidData` error.
pub async fn read_first_line<R>(
    reader: &mut R,
    sent_at: Instant,
    deadline: Instant,
) -> std::io::Result<ProbeOutcome>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        match timeout_at(deadline, reader.read(&mut chunk)).await {
            Err(_) => return Ok(ProbeOutcome::TimedOut),
            Ok(Ok(0)) => return Ok(ProbeOutcome::Closed),
            Ok(Ok(n)) => {
                // The terminator may start on the last byte of the previous chunk
                let search_from = buffer.len().saturating_sub(LINE_TERMINATOR.len() - 1);
                buffer.extend_from_slice(&chunk[..n]);
                if contains_terminator(&buffer[search_from..]) {
                    return Ok(ProbeOutcome::Responded {
                        elapsed: sent_at.elapsed(),
                    });
                }
                if buffer.len() > MAX_LINE_LENGTH {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("no line terminator in the first {MAX_LINE_LENGTH} bytes"),
                    ));
                }
            }
            Ok(Err(e)) => return Err(e),
        }
    }
}

fn contains_terminator(buffer: &[u8]) -> bool {
    buffer
        .windows(LINE_TERMINATOR.len())
        .any(|window| window == LINE_TERMINATOR)
}
