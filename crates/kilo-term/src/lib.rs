// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal engine for the kilo editor.
//
// Owns everything that touches the character device: the raw-mode
// session, the key decoder that turns escape sequences into navigation
// keys, the geometry probe, and the append-only output buffer that
// stages one full frame before a single write.
//
// Direct termios and ANSI escape sequences, no TUI framework. Every byte
// sent to the terminal goes through `ansi` into an `OutputBuffer`, and
// every byte read comes through a `ByteSource` with a bounded wait.

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;

pub use error::{Error, Result};
