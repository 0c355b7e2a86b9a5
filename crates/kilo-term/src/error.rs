// SPDX-License-Identifier: MIT
//
// Fatal terminal errors.
//
// Every variant here ends the session: the terminal is in an unknown
// state (attributes), rendering has no dimensions (geometry), or a frame
// could not be delivered whole (output). Malformed escape sequences are
// not errors at all; the decoder folds them into `Key::Escape`.

use std::io;

/// Result alias used throughout `kilo-term`.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal condition raised by the terminal engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `tcgetattr` failed while capturing the original attributes.
    #[error("tcgetattr: {0}")]
    GetAttributes(#[source] io::Error),

    /// `tcsetattr` failed while installing or restoring attributes.
    #[error("tcsetattr: {0}")]
    SetAttributes(#[source] io::Error),

    /// Standard input is not an interactive terminal.
    #[error("standard input is not a terminal")]
    NotATerminal,

    /// Neither the window-size query nor the cursor probe produced a size.
    #[error("could not determine window size: {0}")]
    WindowSize(#[source] io::Error),

    /// The cursor position report was missing or malformed.
    #[error("malformed cursor position report {0:?}")]
    CursorReport(Vec<u8>),

    /// Reading from the terminal failed.
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing a frame to the terminal failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),

    /// The frame buffer could not grow to hold the next append.
    #[error("out of memory while composing a frame ({requested} more bytes)")]
    OutOfMemory {
        /// Bytes that the failed append needed.
        requested: usize,
    },
}
