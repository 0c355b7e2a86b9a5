// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write the exact bytes of each terminal command the
// editor uses to any `impl Write`. No state and no policy: the renderer
// decides what goes into a frame, this module only knows the encoding.
//
// Cursor coordinates are 0-indexed in our API and converted to the
// 1-indexed form the terminal expects.
//
// All functions return `io::Result` propagated from the underlying writer.
// Writing into an `OutputBuffer` only fails when the buffer cannot grow.

use std::io::{self, Write};

/// Clamp target for the bulk cursor moves used by the geometry fallback.
///
/// Terminals stop the cursor at the real edge, so any value past the
/// largest plausible screen works.
pub const BULK_MOVE: u16 = 999;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Move the cursor right by `n` cells (CUF). Stops at the right margin.
#[inline]
pub fn cursor_forward(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "\x1b[{n}C")
}

/// Move the cursor down by `n` rows (CUD). Stops at the bottom margin.
#[inline]
pub fn cursor_down(w: &mut impl Write, n: u16) -> io::Result<()> {
    write!(w, "\x1b[{n}B")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2). The cursor does not move.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the cursor to the end of the current line (EL 0).
#[inline]
pub fn erase_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Row separator between screen rows.
///
/// Written between rows, never after the last one, so the terminal does
/// not scroll the frame up by one line.
#[inline]
pub fn row_break(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\r\n")
}

// ─── Device Status Report ───────────────────────────────────────────────────

/// Ask the terminal where the cursor is (DSR 6).
///
/// The reply arrives on the input side as `ESC [ row ; col R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: run an ANSI function and return its output as a string.
    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_origin() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
    }

    #[test]
    fn cursor_to_position() {
        assert_eq!(emit(|w| cursor_to(w, 10, 20)), "\x1b[21;11H");
    }

    #[test]
    fn cursor_to_does_not_overflow() {
        assert_eq!(
            emit(|w| cursor_to(w, u16::MAX, u16::MAX)),
            "\x1b[65536;65536H"
        );
    }

    #[test]
    fn cursor_home_sequence() {
        assert_eq!(emit(|w| cursor_home(w)), "\x1b[H");
    }

    #[test]
    fn bulk_moves() {
        assert_eq!(emit(|w| cursor_forward(w, BULK_MOVE)), "\x1b[999C");
        assert_eq!(emit(|w| cursor_down(w, BULK_MOVE)), "\x1b[999B");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
    }

    // ── Screen ──────────────────────────────────────────────────────────

    #[test]
    fn clear_screen_sequence() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
    }

    #[test]
    fn erase_line_sequence() {
        assert_eq!(emit(|w| erase_line(w)), "\x1b[K");
    }

    #[test]
    fn row_break_is_crlf() {
        assert_eq!(emit(|w| row_break(w)), "\r\n");
    }

    #[test]
    fn dsr_request() {
        assert_eq!(emit(|w| request_cursor_position(w)), "\x1b[6n");
    }
}
