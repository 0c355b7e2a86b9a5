// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Output buffering — one frame, one write.
//
// The renderer composes an entire frame (cursor hide, every row, cursor
// placement, cursor show) into an `OutputBuffer`, then hands it to the
// terminal with a single `write_all`. The terminal never sees half a
// frame, so there is no tearing and no cursor flicker mid-repaint.
//
// Growth uses `try_reserve`: if the allocator refuses, the append fails
// with `Error::OutOfMemory` instead of aborting or silently dropping bytes.
// A frame with missing bytes would corrupt the screen invisibly.

use std::io::{self, Write};

use crate::error::{Error, Result};

/// Initial capacity: an 80×24 frame with escapes fits without regrowth.
const DEFAULT_CAPACITY: usize = 4096;

/// Append-only byte accumulator for a single frame.
///
/// Bytes are only ever added at the end. Nothing already appended is
/// rewritten or truncated. [`flush_to`](Self::flush_to) consumes the
/// buffer, so a flushed frame cannot be written twice.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been appended yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append `bytes` to the end of the frame, growing as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the buffer cannot grow. Nothing is
    /// appended in that case.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf
            .try_reserve(bytes.len())
            .map_err(|_| Error::OutOfMemory {
                requested: bytes.len(),
            })?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Write the whole frame to `w` in one `write_all`, then drop it.
    ///
    /// An empty buffer writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the writer fails.
    pub fn flush_to(self, w: &mut impl Write) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        w.write_all(&self.buf).map_err(Error::Write)?;
        w.flush().map_err(Error::Write)
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets the `ansi` writers target the buffer directly.
///
/// A growth failure surfaces as an `io::Error` of kind `OutOfMemory` that
/// carries the original [`Error`]; [`frame_error`] recovers it.
impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op. The real write happens in `flush_to`.
        Ok(())
    }
}

// ─── RawStdout ───────────────────────────────────────────────────────────────

/// Unbuffered writer straight to fd 1.
///
/// `io::Stdout` is line-buffered and would split a frame at its last
/// newline. Writing to the descriptor directly keeps a frame to one
/// `write()` syscall.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawStdout;

#[cfg(unix)]
impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(not(unix))]
impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Convert an `io::Error` raised while composing into a frame.
///
/// Unwraps the [`Error::OutOfMemory`] that [`OutputBuffer`]'s `Write` impl
/// tucks inside; anything else is reported as a write failure.
#[must_use]
pub fn frame_error(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::OutOfMemory {
        match e.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(inner)) => *inner,
            Some(Err(other)) => Error::Write(io::Error::new(io::ErrorKind::OutOfMemory, other)),
            None => Error::Write(io::ErrorKind::OutOfMemory.into()),
        }
    } else {
        Error::Write(e)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
