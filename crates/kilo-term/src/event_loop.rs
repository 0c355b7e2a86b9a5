// SPDX-License-Identifier: MIT
//
// Event loop — render, read, dispatch, repeat.
//
// One thread, no channels, no async. Each cycle:
//
//   1. The application paints a whole frame into a fresh `OutputBuffer`.
//   2. The frame goes to the terminal in one write and is dropped.
//   3. The decoder waits for the next key. Timeouts in between keys are
//      absorbed here; they do not trigger a repaint.
//   4. The key is handed to the application, which either keeps going or
//      asks to quit.
//
// On quit the loop clears the screen and returns `Ok`. Any fatal error
// returns early with the error; the caller owns the `RawMode` guard, so
// restoring the terminal happens when that guard goes out of scope.

use std::io::Write;
use std::time::Duration;

use crate::ansi;
use crate::error::Result;
use crate::input::{Decoder, Key};
use crate::output::{frame_error, OutputBuffer, RawStdout};
use crate::reader::{ByteSource, TtyReader, DEFAULT_READ_TIMEOUT};

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the loop to do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running.
    Continue,
    /// Clear the screen and leave the loop.
    Quit,
}

/// Application interface for the event loop.
pub trait App {
    /// Handle one decoded key.
    fn on_key(&mut self, key: Key) -> Action;

    /// Compose the current state into `frame`.
    ///
    /// Called once per cycle with an empty buffer. Whatever is appended
    /// is written to the terminal as a single unit.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the buffer if it cannot grow.
    fn paint(&self, frame: &mut OutputBuffer) -> std::io::Result<()>;
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Timing configuration for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Longest wait for a single input byte. Also the window in which the
    /// rest of an escape sequence must arrive.
    pub read_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The read → decode → dispatch → render loop.
///
/// Generic over the byte source and the output so the whole cycle can be
/// driven from a script in tests.
#[derive(Debug)]
pub struct EventLoop<S, W> {
    decoder: Decoder<S>,
    out: W,
}

impl EventLoop<TtyReader, RawStdout> {
    /// Loop over the real terminal: stdin through [`TtyReader`], frames to fd 1.
    #[must_use]
    pub fn stdio(config: LoopConfig) -> Self {
        Self::new(TtyReader::new(config.read_timeout), RawStdout)
    }
}

impl<S: ByteSource, W: Write> EventLoop<S, W> {
    /// Loop reading keys from `source` and writing frames to `out`.
    pub const fn new(source: S, out: W) -> Self {
        Self {
            decoder: Decoder::new(source),
            out,
        }
    }

    /// The byte source, for probes that must run before the loop starts.
    pub const fn source_mut(&mut self) -> &mut S {
        self.decoder.source_mut()
    }

    /// The output, for writes outside a frame.
    pub const fn out_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Run until the application returns [`Action::Quit`].
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: a frame that could not be composed
    /// or written, or a failed read.
    pub fn run(&mut self, app: &mut impl App) -> Result<()> {
        loop {
            self.render(&*app)?;

            let key = self.wait_for_key()?;
            if app.on_key(key) == Action::Quit {
                tracing::info!("quit requested");
                return clear_screen(&mut self.out);
            }
        }
    }

    /// Compose one frame and write it in a single call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`](crate::Error::OutOfMemory) or
    /// [`Error::Write`](crate::Error::Write).
    pub fn render(&mut self, app: &impl App) -> Result<()> {
        let mut frame = OutputBuffer::new();
        app.paint(&mut frame).map_err(frame_error)?;
        frame.flush_to(&mut self.out)
    }

    /// Block (in bounded steps) until a key arrives.
    fn wait_for_key(&mut self) -> Result<Key> {
        loop {
            if let Some(key) = self.decoder.next_key()? {
                return Ok(key);
            }
        }
    }
}

/// Clear the screen and home the cursor, in one write.
///
/// # Errors
///
/// Returns [`Error::Write`](crate::Error::Write) if the write fails.
pub fn clear_screen(out: &mut impl Write) -> Result<()> {
    let mut frame = OutputBuffer::new();
    ansi::clear_screen(&mut frame).map_err(frame_error)?;
    ansi::cursor_home(&mut frame).map_err(frame_error)?;
    frame.flush_to(out)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
