// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Bounded-wait byte input.
//
// The key decoder needs one primitive: "give me the next byte, or tell
// me none arrived within the timeout". That is what tells a lone Escape
// keypress apart from the first byte of an arrow-key sequence, and what
// keeps the loop from blocking forever on a silent terminal.
//
// `ByteSource` is that primitive. `TtyReader` implements it for stdin
// with `poll()` + a one-byte `read()`, so the timeout is explicit rather
// than left to the line discipline's VTIME. `ScriptedSource` replays a
// fixed script for tests, gaps included.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default per-byte wait: one decisecond, the classic VTIME=1 bound.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

#[cfg(unix)]
const STDIN_FD: i32 = libc::STDIN_FILENO;
#[cfg(not(unix))]
const STDIN_FD: i32 = 0;

/// A byte stream read with a bounded wait per byte.
pub trait ByteSource {
    /// Read one byte, waiting at most the source's timeout.
    ///
    /// Returns `Ok(None)` when no byte arrived in time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the underlying device fails.
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

// ─── TtyReader ──────────────────────────────────────────────────────────────

/// Reads stdin one byte at a time with a bounded wait.
#[derive(Debug)]
pub struct TtyReader {
    #[cfg_attr(not(unix), allow(dead_code))]
    fd: i32,
    timeout_ms: i32,
}

impl TtyReader {
    /// Reader over stdin that waits at most `timeout` per byte.
    ///
    /// Timeouts longer than `i32::MAX` milliseconds are clamped.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        Self {
            fd: STDIN_FD,
            timeout_ms,
        }
    }
}

impl Default for TtyReader {
    fn default() -> Self {
        Self::new(DEFAULT_READ_TIMEOUT)
    }
}

#[cfg(unix)]
impl ByteSource for TtyReader {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&raw mut pfd, 1, self.timeout_ms) };
        if ready < 0 {
            return retry_or_fail(io::Error::last_os_error());
        }
        if ready == 0 {
            return Ok(None);
        }
        if pfd.revents & libc::POLLIN == 0 && hung_up(pfd.revents) {
            return Err(hangup_error());
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(self.fd, (&raw mut byte).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 if hung_up(pfd.revents) => Err(hangup_error()),
            // VMIN=0 lets read() return nothing; same as a timeout.
            0 => Ok(None),
            _ => retry_or_fail(io::Error::last_os_error()),
        }
    }
}

/// The terminal went away or the descriptor is unusable. Waiting again
/// would return immediately with the same result.
#[cfg(unix)]
const fn hung_up(revents: libc::c_short) -> bool {
    revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0
}

#[cfg(unix)]
fn hangup_error() -> Error {
    Error::Read(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "terminal hung up",
    ))
}

#[cfg(not(unix))]
impl ByteSource for TtyReader {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) => retry_or_fail(e),
        }
    }
}

/// `EAGAIN` and `EINTR` count as "nothing yet"; anything else is fatal.
fn retry_or_fail(e: io::Error) -> Result<Option<u8>> {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
        _ => Err(Error::Read(e)),
    }
}

// ─── ScriptedSource ─────────────────────────────────────────────────────────

/// One step of a scripted input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A byte is available.
    Byte(u8),
    /// The wait expires with nothing to read.
    Gap,
}

/// Replays a fixed sequence of bytes and timeouts.
///
/// Once the script runs out every read fails with an `UnexpectedEof`
/// [`Error::Read`], so a loop that never quits cannot spin forever.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
}

impl ScriptedSource {
    /// Script from explicit steps.
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Script that delivers `bytes` back to back with no gaps.
    #[must_use]
    pub fn bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.iter().copied().map(Step::Byte))
    }

    /// Append a timeout to the end of the script.
    #[must_use]
    pub fn then_gap(mut self) -> Self {
        self.steps.push_back(Step::Gap);
        self
    }

    /// Append more bytes to the end of the script.
    #[must_use]
    pub fn then_bytes(mut self, bytes: &[u8]) -> Self {
        self.steps.extend(bytes.iter().copied().map(Step::Byte));
        self
    }

    /// Steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl ByteSource for ScriptedSource {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        match self.steps.pop_front() {
            Some(Step::Byte(b)) => Ok(Some(b)),
            Some(Step::Gap) => Ok(None),
            None => Err(Error::Read(io::ErrorKind::UnexpectedEof.into())),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
