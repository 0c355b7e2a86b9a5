// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Screen geometry probe.
//
// Two strategies, tried in order:
//
//   1. Ask the kernel: `ioctl(TIOCGWINSZ)` on stdout.
//   2. Ask the terminal: push the cursor to the bottom-right corner with
//      `ESC [ 999 C ESC [ 999 B` (the terminal clamps at the real edge),
//      send a Device Status Report `ESC [ 6 n`, and read back
//      `ESC [ rows ; cols R`.
//
// The second strategy exists for terminals where the ioctl is missing or
// reports zero columns. If both fail the session cannot render, so the
// error is fatal.

use std::io::{self, Write};

use crate::ansi;
use crate::error::{Error, Result};
use crate::output::{frame_error, OutputBuffer};
use crate::reader::ByteSource;

/// Longest cursor position report we will read, terminator included.
const REPORT_MAX: usize = 32;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Screen dimensions in character cells. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Strategy 1: ioctl ──────────────────────────────────────────────────────

/// Query the window size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// kernel reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn query_window_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn query_window_size() -> Option<Size> {
    None
}

// ─── Strategy 2: cursor probe ───────────────────────────────────────────────

/// Measure the screen by moving the cursor to the far corner and asking
/// the terminal where it ended up.
///
/// # Errors
///
/// - [`Error::Write`] if either request cannot be written.
/// - [`Error::Read`] if reading the reply fails.
/// - [`Error::WindowSize`] if no reply arrives before the read times out.
/// - [`Error::CursorReport`] if the reply is malformed.
pub fn probe_cursor_position(out: &mut impl Write, input: &mut impl ByteSource) -> Result<Size> {
    let mut moves = OutputBuffer::new();
    ansi::cursor_forward(&mut moves, ansi::BULK_MOVE).map_err(frame_error)?;
    ansi::cursor_down(&mut moves, ansi::BULK_MOVE).map_err(frame_error)?;
    moves.flush_to(out)?;

    let mut request = OutputBuffer::new();
    ansi::request_cursor_position(&mut request).map_err(frame_error)?;
    request.flush_to(out)?;

    let reply = read_report(input)?;
    parse_cursor_report(&reply)
}

/// Collect reply bytes up to (not including) the `R` terminator.
fn read_report(input: &mut impl ByteSource) -> Result<Vec<u8>> {
    let mut reply = Vec::with_capacity(REPORT_MAX);
    while reply.len() < REPORT_MAX - 1 {
        match input.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => reply.push(b),
        }
    }

    if reply.is_empty() {
        return Err(Error::WindowSize(io::Error::new(
            io::ErrorKind::TimedOut,
            "terminal did not answer the cursor position request",
        )));
    }
    Ok(reply)
}

/// Parse a cursor position report body: `ESC [ rows ; cols`.
///
/// The trailing `R` must already be stripped. Both numbers must be
/// positive decimals.
///
/// # Errors
///
/// Returns [`Error::CursorReport`] carrying the raw bytes if the body
/// does not match.
pub fn parse_cursor_report(reply: &[u8]) -> Result<Size> {
    let malformed = || Error::CursorReport(reply.to_vec());

    let body = reply.strip_prefix(b"\x1b[").ok_or_else(malformed)?;
    let (rows, cols) = split_once(body, b';').ok_or_else(malformed)?;
    let rows = parse_decimal(rows).ok_or_else(malformed)?;
    let cols = parse_decimal(cols).ok_or_else(malformed)?;

    if rows == 0 || cols == 0 {
        return Err(malformed());
    }
    Ok(Size { cols, rows })
}

fn split_once(bytes: &[u8], sep: u8) -> Option<(&[u8], &[u8])> {
    let at = bytes.iter().position(|&b| b == sep)?;
    Some((&bytes[..at], &bytes[at + 1..]))
}

/// Non-empty run of ASCII digits that fits in a `u16`.
fn parse_decimal(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    digits.iter().try_fold(0u16, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u16::from(d - b'0'))
    })
}

// ─── Probe ──────────────────────────────────────────────────────────────────

/// Determine the screen size: ioctl first, cursor probe as fallback.
///
/// # Errors
///
/// Propagates the fallback's error when the ioctl is unavailable.
pub fn probe(out: &mut impl Write, input: &mut impl ByteSource) -> Result<Size> {
    probe_with(query_window_size(), out, input)
}

/// [`probe`] with the primary strategy's answer supplied by the caller.
///
/// # Errors
///
/// Propagates the fallback's error when `primary` is `None`.
pub fn probe_with(
    primary: Option<Size>,
    out: &mut impl Write,
    input: &mut impl ByteSource,
) -> Result<Size> {
    if let Some(size) = primary {
        tracing::info!(cols = size.cols, rows = size.rows, "window size from ioctl");
        return Ok(size);
    }

    tracing::debug!("ioctl window size unavailable, probing cursor position");
    let size = probe_cursor_position(out, input)?;
    tracing::info!(cols = size.cols, rows = size.rows, "window size from cursor probe");
    Ok(size)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
