// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns the raw byte stream from a `ByteSource` into logical keys. Plain
// bytes pass through untouched; escape sequences sent by navigation keys
// are folded into named keys:
//
//   ESC [ A/B/C/D        arrows
//   ESC [ H / ESC [ F    Home / End
//   ESC [ 1~ 7~          Home
//   ESC [ 4~ 8~          End
//   ESC [ 3~             Delete
//   ESC [ 5~ / 6~        PageUp / PageDown
//   ESC O H / ESC O F    Home / End (application cursor mode)
//
// # Escape vs escape-sequence ambiguity
//
// A lone ESC byte is a valid keypress and also the first byte of every
// sequence above. The decoder resolves it with the source's bounded
// wait: if the follow-up byte does not arrive in time, the user pressed
// Escape. Anything that starts like a sequence but does not match a
// known one also collapses to `Key::Escape`. The decoder never waits for
// an unrecognised continuation and never reports malformed input as an
// error.

use crate::error::Result;
use crate::reader::ByteSource;

/// The escape byte (0x1B).
pub const ESC: u8 = 0x1B;

/// The byte a terminal sends for Ctrl+`c` in raw mode.
///
/// Ctrl clears the top three bits: `ctrl(b'q') == 0x11`.
#[inline]
#[must_use]
pub const fn ctrl(c: u8) -> u8 {
    c & 0x1F
}

// ─── Key ────────────────────────────────────────────────────────────────────

/// A logical key produced by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal input byte (printable or control character).
    Byte(u8),
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Editing ─────────────────────────────────────────────────
    Delete,
    /// A standalone Escape press, or a sequence the decoder didn't know.
    Escape,
}

impl Key {
    /// Whether this is the literal byte for Ctrl+`c`.
    #[inline]
    #[must_use]
    pub const fn is_ctrl(self, c: u8) -> bool {
        matches!(self, Self::Byte(b) if b == ctrl(c))
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Where the decoder is inside an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between keys.
    Ground,
    /// Saw ESC.
    Escape,
    /// Saw `ESC [`.
    Csi,
    /// Saw `ESC [ <digit>`, waiting for `~`.
    CsiParam(u8),
    /// Saw `ESC O`.
    Ss3,
    /// Saw ESC and a byte that starts no known sequence. One more byte
    /// is consumed before giving up.
    Unknown,
}

/// Reads logical keys from a [`ByteSource`].
///
/// Each call to [`next_key`](Self::next_key) runs the state machine from
/// `Ground` to a key (or to a timeout in `Ground`). No state survives
/// between keys, so a garbled sequence cannot poison the next one.
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
}

impl<S: ByteSource> Decoder<S> {
    /// Decoder over `source`.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Mutable access to the underlying source.
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Decode the next key.
    ///
    /// Returns `Ok(None)` if no byte arrived within the source's timeout.
    /// Once a first byte has arrived, always returns a key: a sequence
    /// cut short by a timeout, or one that matches nothing, yields
    /// [`Key::Escape`].
    ///
    /// # Errors
    ///
    /// Propagates fatal read errors from the source.
    pub fn next_key(&mut self) -> Result<Option<Key>> {
        let mut state = State::Ground;

        loop {
            let Some(byte) = self.source.read_byte()? else {
                if state == State::Ground {
                    return Ok(None);
                }
                tracing::trace!(?state, "escape sequence timed out");
                return Ok(Some(Key::Escape));
            };

            state = match (state, byte) {
                (State::Ground, ESC) => State::Escape,
                (State::Ground, b) => return Ok(Some(Key::Byte(b))),

                (State::Escape, b'[') => State::Csi,
                (State::Escape, b'O') => State::Ss3,
                (State::Escape, _) => State::Unknown,

                (State::Csi, b @ b'0'..=b'9') => State::CsiParam(b),
                (State::Csi, b) => return Ok(Some(csi_letter(b))),

                (State::CsiParam(digit), b'~') => return Ok(Some(csi_tilde(digit))),

                (State::Ss3, b) => return Ok(Some(ss3_letter(b))),

                (state, b) => {
                    tracing::trace!(?state, byte = b, "unrecognised escape sequence");
                    return Ok(Some(Key::Escape));
                }
            };
        }
    }
}

/// Final byte of `ESC [ <letter>`.
const fn csi_letter(b: u8) -> Key {
    match b {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => Key::Escape,
    }
}

/// Parameter digit of `ESC [ <digit> ~`.
const fn csi_tilde(digit: u8) -> Key {
    match digit {
        b'1' | b'7' => Key::Home,
        b'3' => Key::Delete,
        b'4' | b'8' => Key::End,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    }
}

/// Final byte of `ESC O <letter>`.
const fn ss3_letter(b: u8) -> Key {
    match b {
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => Key::Escape,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::reader::{ScriptedSource, Step};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Helper: decode exactly one key from `bytes`, followed by a gap.
    fn decode_one(bytes: &[u8]) -> Key {
        let mut dec = Decoder::new(ScriptedSource::bytes(bytes).then_gap());
        dec.next_key().unwrap().expect("a key")
    }

    /// Helper: decode every key until the script runs dry.
    fn decode_all(src: ScriptedSource) -> Vec<Key> {
        let mut dec = Decoder::new(src);
        let mut keys = Vec::new();
        while let Ok(next) = dec.next_key() {
            if let Some(k) = next {
                keys.push(k);
            }
        }
        keys
    }

    // ── Ground ──────────────────────────────────────────────────────────

    #[test]
    fn plain_byte() {
        assert_eq!(decode_one(b"a"), Key::Byte(b'a'));
    }

    #[test]
    fn control_byte() {
        assert_eq!(decode_one(&[ctrl(b'q')]), Key::Byte(0x11));
        assert!(decode_one(&[0x11]).is_ctrl(b'q'));
    }

    #[test]
    fn high_byte_passes_through() {
        assert_eq!(decode_one(&[0xC3]), Key::Byte(0xC3));
    }

    #[test]
    fn timeout_in_ground_is_no_key() {
        let mut dec = Decoder::new(ScriptedSource::default().then_gap());
        assert_eq!(dec.next_key().unwrap(), None);
    }

    // ── CSI letters ─────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(decode_one(b"\x1b[A"), Key::Up);
        assert_eq!(decode_one(b"\x1b[B"), Key::Down);
        assert_eq!(decode_one(b"\x1b[C"), Key::Right);
        assert_eq!(decode_one(b"\x1b[D"), Key::Left);
    }

    #[test]
    fn csi_home_end() {
        assert_eq!(decode_one(b"\x1b[H"), Key::Home);
        assert_eq!(decode_one(b"\x1b[F"), Key::End);
    }

    #[test]
    fn unknown_csi_letter_is_escape() {
        assert_eq!(decode_one(b"\x1b[Z"), Key::Escape);
    }

    // ── CSI tilde ───────────────────────────────────────────────────────

    #[test]
    fn tilde_keys() {
        assert_eq!(decode_one(b"\x1b[1~"), Key::Home);
        assert_eq!(decode_one(b"\x1b[3~"), Key::Delete);
        assert_eq!(decode_one(b"\x1b[4~"), Key::End);
        assert_eq!(decode_one(b"\x1b[5~"), Key::PageUp);
        assert_eq!(decode_one(b"\x1b[6~"), Key::PageDown);
        assert_eq!(decode_one(b"\x1b[7~"), Key::Home);
        assert_eq!(decode_one(b"\x1b[8~"), Key::End);
    }

    #[test]
    fn unknown_tilde_digit_is_escape() {
        assert_eq!(decode_one(b"\x1b[2~"), Key::Escape);
        assert_eq!(decode_one(b"\x1b[9~"), Key::Escape);
    }

    #[test]
    fn digit_without_tilde_is_escape() {
        assert_eq!(decode_one(b"\x1b[5x"), Key::Escape);
    }

    #[test]
    fn digit_then_timeout_is_escape() {
        assert_eq!(decode_one(b"\x1b[5"), Key::Escape);
    }

    // ── SS3 ─────────────────────────────────────────────────────────────

    #[test]
    fn ss3_home_end() {
        assert_eq!(decode_one(b"\x1bOH"), Key::Home);
        assert_eq!(decode_one(b"\x1bOF"), Key::End);
    }

    #[test]
    fn unknown_ss3_is_escape() {
        assert_eq!(decode_one(b"\x1bOP"), Key::Escape);
    }

    // ── Lone escape ─────────────────────────────────────────────────────

    #[test]
    fn lone_escape_then_timeout() {
        assert_eq!(decode_one(b"\x1b"), Key::Escape);
    }

    #[test]
    fn escape_bracket_then_timeout() {
        assert_eq!(decode_one(b"\x1b["), Key::Escape);
    }

    #[test]
    fn escape_then_unrelated_bytes_is_one_escape() {
        // Both follow-up bytes belong to the failed sequence.
        let keys = decode_all(ScriptedSource::bytes(b"\x1bxab"));
        assert_eq!(keys, vec![Key::Escape, Key::Byte(b'b')]);
    }

    #[test]
    fn unknown_sequence_swallows_ctrl_q() {
        let keys = decode_all(ScriptedSource::bytes(&[ESC, b'x', ctrl(b'q')]).then_gap());
        assert_eq!(keys, vec![Key::Escape]);
    }

    #[test]
    fn escape_unrelated_byte_then_timeout() {
        assert_eq!(decode_one(b"\x1bx"), Key::Escape);
    }

    #[test]
    fn gap_mid_sequence_does_not_leak_into_next_key() {
        let src = ScriptedSource::new([
            Step::Byte(ESC),
            Step::Byte(b'['),
            Step::Gap,
            Step::Byte(b'q'),
        ]);
        assert_eq!(decode_all(src), vec![Key::Escape, Key::Byte(b'q')]);
    }

    // ── Streams ─────────────────────────────────────────────────────────

    #[test]
    fn back_to_back_sequences() {
        let keys = decode_all(ScriptedSource::bytes(b"\x1b[A\x1b[3~x\x1bOF"));
        assert_eq!(keys, vec![Key::Up, Key::Delete, Key::Byte(b'x'), Key::End]);
    }

    #[test]
    fn read_error_propagates() {
        let mut dec = Decoder::new(ScriptedSource::bytes(b"\x1b"));
        assert!(matches!(dec.next_key(), Err(Error::Read(_))));
    }

    #[test]
    fn source_keeps_unread_bytes() {
        let mut dec = Decoder::new(ScriptedSource::bytes(b"ab"));
        dec.next_key().unwrap();
        assert_eq!(dec.source_mut().remaining(), 1);
    }

    proptest! {
        /// Every byte stream decodes to keys without consuming more than
        /// four bytes per key.
        #[test]
        fn arbitrary_bytes_always_decode(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let mut dec = Decoder::new(ScriptedSource::bytes(&bytes));
            let mut before = dec.source_mut().remaining();
            while let Ok(Some(_)) = dec.next_key() {
                let after = dec.source_mut().remaining();
                prop_assert!(before - after >= 1 && before - after <= 4);
                before = after;
            }
        }
    }
}
