//! Per-connection read loop.
//!
//! A connection moves through exactly two states, `CONNECTED` and
//! `DISCONNECTED`.  While connected the handler repeatedly:
//!
//! 1. Reads one newline-terminated line (bounded by
//!    [`ConnectionLimits::max_line_bytes`]).
//! 2. Decodes it with [`decode_line`].
//! 3. Dispatches the resulting event to the injection backend.
//!
//! A failure in steps 2 or 3, or an over-long line, rejects that one message:
//! it is logged and the loop reads the next line.  Only EOF, a read error, or
//! the optional read timeout leave the loop.  Whichever way the loop exits, the
//! stream is shut down exactly once before [`handle_connection`] returns.
//!
//! Lines are processed strictly one at a time, so a slow backend throttles the
//! read side through TCP flow control and nothing is buffered beyond one line.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use tracing::{debug, warn};

use iobus_core::decode_line;
use iobus_core::protocol::events::EventType;

use crate::application::dispatch_event::DispatchEventUseCase;
use crate::domain::config::ConnectionLimits;

use super::{ConnectionError, MessageError};

/// How a connection's read loop ended.
#[derive(Debug)]
pub enum ConnectionEnd {
    /// The peer closed its side (zero-byte read).
    PeerClosed,
    /// The stream failed or went idle past the read timeout.
    Failed(ConnectionError),
}

/// Counters reported when a connection closes.
#[derive(Debug)]
pub struct ConnectionSummary {
    /// Messages decoded and dispatched successfully.
    pub messages_processed: u64,
    /// Messages rejected by framing, decoding, or the backend.
    pub messages_rejected: u64,
    /// Whitespace-only lines that were ignored.
    pub lines_skipped: u64,
    pub end: ConnectionEnd,
}

/// Outcome of one bounded line read.
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    /// `buf` holds one line, `\n` or `\r\n` stripped.
    Line,
    /// The line exceeded the limit and was discarded up to its newline.
    TooLong,
    /// The peer closed the stream and no bytes were pending.
    Eof,
}

/// Reads the next line into `buf` without letting it grow past `max` bytes.
///
/// Bytes past the limit are consumed and dropped until the next newline, so a
/// hostile sender cannot make the host buffer an unbounded line.  The limit
/// excludes the terminator, including the `\r` of a CRLF ending.  A final line
/// with no trailing newline is returned as a normal line.
///
/// `idle` bounds each wait for more bytes, not the whole line: the clock
/// restarts whenever data arrives.
async fn read_line_bounded<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
    idle: Option<Duration>,
) -> Result<LineRead, ConnectionError>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut overflowed = false;

    loop {
        let available = match idle {
            Some(limit) => timeout(limit, reader.fill_buf())
                .await
                .map_err(|_| ConnectionError::ReadTimeout(limit))??,
            None => reader.fill_buf().await?,
        };
        if available.is_empty() {
            if !overflowed && buf.is_empty() {
                return Ok(LineRead::Eof);
            }
            return Ok(finish_line(buf, overflowed, max));
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let chunk_len = newline.unwrap_or(available.len());
        if !overflowed {
            // One byte of slack for a `\r` that turns out to precede `\n`.
            if buf.len() + chunk_len > max.saturating_add(1) {
                overflowed = true;
                buf.clear();
            } else {
                buf.extend_from_slice(&available[..chunk_len]);
            }
        }

        match newline {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(finish_line(buf, overflowed, max));
            }
            None => reader.consume(chunk_len),
        }
    }
}

/// Strips a trailing `\r` and applies the length limit to what remains.
fn finish_line(buf: &mut Vec<u8>, overflowed: bool, max: usize) -> LineRead {
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    if overflowed || buf.len() > max {
        buf.clear();
        LineRead::TooLong
    } else {
        LineRead::Line
    }
}

/// Decodes and dispatches one line.
fn process_line(
    line: &[u8],
    dispatcher: &DispatchEventUseCase,
) -> Result<EventType, MessageError> {
    let event = decode_line(line)?;
    let event_type = event.event_type();
    dispatcher.dispatch(event)?;
    Ok(event_type)
}

/// Runs the read loop for one connection until it ends, then shuts the stream
/// down.
///
/// Never returns an error: per-message failures are logged and counted, and
/// the reason the connection ended is reported in the returned summary.
pub async fn handle_connection<S>(
    stream: S,
    dispatcher: &DispatchEventUseCase,
    limits: ConnectionLimits,
) -> ConnectionSummary
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut summary = ConnectionSummary {
        messages_processed: 0,
        messages_rejected: 0,
        lines_skipped: 0,
        end: ConnectionEnd::PeerClosed,
    };

    let end = read_loop(&mut reader, dispatcher, limits, &mut summary).await;
    summary.end = end;

    if let Err(e) = reader.get_mut().shutdown().await {
        debug!("shutdown after close failed: {e}");
    }
    summary
}

async fn read_loop<R>(
    reader: &mut R,
    dispatcher: &DispatchEventUseCase,
    limits: ConnectionLimits,
    summary: &mut ConnectionSummary,
) -> ConnectionEnd
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut line_no: u64 = 0;

    loop {
        let result = read_line_bounded(
            reader,
            &mut buf,
            limits.max_line_bytes,
            limits.read_timeout,
        )
        .await;

        let outcome = match result {
            Ok(LineRead::Eof) => return ConnectionEnd::PeerClosed,
            Err(e) => return ConnectionEnd::Failed(e),
            Ok(LineRead::TooLong) => {
                line_no += 1;
                Err(MessageError::LineTooLong {
                    limit: limits.max_line_bytes,
                })
            }
            Ok(LineRead::Line) => {
                line_no += 1;
                if buf.iter().all(u8::is_ascii_whitespace) {
                    summary.lines_skipped += 1;
                    continue;
                }
                process_line(&buf, dispatcher)
            }
        };

        match outcome {
            Ok(event_type) => {
                summary.messages_processed += 1;
                debug!(line = line_no, event = event_type.wire_name(), "event dispatched");
            }
            Err(e) => {
                summary.messages_rejected += 1;
                warn!(line = line_no, "message rejected: {e}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
