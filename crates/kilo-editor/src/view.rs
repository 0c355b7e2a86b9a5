//! View — composes one frame from the document and the cursor.
//!
//! A frame is always the same shape:
//!
//! ```text
//! ESC[?25l  ESC[H                       hide cursor, go home
//! row 0     ESC[K \r\n                  text, or "~"
//! row 1     ESC[K \r\n
//! ...
//! row r/3   ~   Kilo editor -- ...      welcome banner (empty document only)
//! ...
//! row r-1   ESC[K                       no trailing \r\n: no scroll
//! ESC[y;xH  ESC[?25h                    place cursor, show it
//! ```
//!
//! The cursor stays hidden while the rows are drawn, so it never flickers
//! across the screen as the frame lands. Lines longer than the screen are
//! cut at `cols` bytes and written once.

use std::io::{self, Write};

use kilo_term::ansi;
use kilo_term::geometry::Size;

use crate::cursor::Cursor;
use crate::document::Document;

/// Banner shown on an empty document.
pub const WELCOME: &str = concat!("Kilo editor -- version ", env!("CARGO_PKG_VERSION"));

/// Draws frames for a screen of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    size: Size,
}

impl View {
    /// View over a `size` screen.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self { size }
    }

    /// Row that carries the welcome banner.
    #[inline]
    #[must_use]
    pub const fn welcome_row(&self) -> u16 {
        self.size.rows / 3
    }

    /// Compose a full frame into `out`.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out` (for an `OutputBuffer`, only a
    /// failure to grow).
    pub fn render(&self, out: &mut impl Write, doc: &Document, cursor: &Cursor) -> io::Result<()> {
        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;
        self.draw_rows(out, doc)?;
        ansi::cursor_to(out, cursor.x(), cursor.y())?;
        ansi::cursor_show(out)
    }

    fn draw_rows(&self, out: &mut impl Write, doc: &Document) -> io::Result<()> {
        let cols = usize::from(self.size.cols);

        for y in 0..self.size.rows {
            match doc.line() {
                Some(line) if y == 0 => {
                    let text = line.as_bytes();
                    out.write_all(&text[..text.len().min(cols)])?;
                }
                None if y == self.welcome_row() => self.draw_welcome(out)?,
                _ => out.write_all(b"~")?,
            }

            ansi::erase_line(out)?;
            if y + 1 < self.size.rows {
                ansi::row_break(out)?;
            }
        }
        Ok(())
    }

    /// `~`, left padding, banner. The banner is clipped to the screen.
    fn draw_welcome(&self, out: &mut impl Write) -> io::Result<()> {
        let cols = usize::from(self.size.cols);
        let text = &WELCOME.as_bytes()[..WELCOME.len().min(cols)];

        let mut padding = (cols - text.len()) / 2;
        if padding > 0 {
            out.write_all(b"~")?;
            padding -= 1;
        }
        for _ in 0..padding {
            out.write_all(b" ")?;
        }
        out.write_all(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{Direction, Motion};
    use kilo_term::output::OutputBuffer;
    use pretty_assertions::assert_eq;

    const SCREEN: Size = Size { cols: 80, rows: 24 };

    fn frame(size: Size, doc: &Document, cursor: &Cursor) -> String {
        let mut out = OutputBuffer::new();
        View::new(size).render(&mut out, doc, cursor).unwrap();
        String::from_utf8_lossy(out.as_bytes()).into_owned()
    }

    /// Split the row section of a frame into its rows, without `ESC[K`.
    fn rows(frame: &str) -> Vec<String> {
        let body = frame
            .strip_prefix("\x1b[?25l\x1b[H")
            .expect("frame starts with hide + home");
        let end = body.rfind("\x1b[K").expect("rows end with erase") + 3;
        body[..end]
            .split("\r\n")
            .map(|r| r.strip_suffix("\x1b[K").expect("row ends with erase").to_owned())
            .collect()
    }

    // -- Frame shape --------------------------------------------------------

    #[test]
    fn frame_starts_hidden_and_ends_shown() {
        let f = frame(SCREEN, &Document::empty(), &Cursor::new(SCREEN));
        assert!(f.starts_with("\x1b[?25l\x1b[H"));
        assert!(f.ends_with("\x1b[1;1H\x1b[?25h"));
    }

    #[test]
    fn every_row_is_drawn_without_trailing_newline() {
        let f = frame(SCREEN, &Document::empty(), &Cursor::new(SCREEN));
        assert_eq!(rows(&f).len(), 24);
        assert_eq!(f.matches("\r\n").count(), 23);
        assert_eq!(f.matches("\x1b[K").count(), 24);
    }

    #[test]
    fn cursor_is_placed_one_based() {
        let mut c = Cursor::new(SCREEN);
        c.apply(Motion::Step(Direction::Right));
        c.apply(Motion::Step(Direction::Down));
        c.apply(Motion::Step(Direction::Down));
        let f = frame(SCREEN, &Document::empty(), &c);
        assert!(f.ends_with("\x1b[3;2H\x1b[?25h"));
    }

    // -- Welcome banner -----------------------------------------------------

    #[test]
    fn welcome_banner_centered_on_row_eight() {
        let f = frame(SCREEN, &Document::empty(), &Cursor::new(SCREEN));
        let rows = rows(&f);

        let banner_row = &rows[8];
        assert!(banner_row.starts_with('~'));
        assert!(banner_row.ends_with(WELCOME));

        let lead = banner_row.len() - WELCOME.len();
        assert_eq!(lead, (80 - WELCOME.len()) / 2);
        assert!(banner_row[1..lead].bytes().all(|b| b == b' '));

        for (y, row) in rows.iter().enumerate() {
            if y != 8 {
                assert_eq!(row, "~", "row {y}");
            }
        }
    }

    #[test]
    fn welcome_banner_clipped_on_narrow_screen() {
        let size = Size { cols: 10, rows: 6 };
        let f = frame(size, &Document::empty(), &Cursor::new(size));
        assert_eq!(rows(&f)[2], &WELCOME[..10]);
    }

    #[test]
    fn no_banner_when_document_has_a_line() {
        let doc = Document::from_bytes(b"hello\n");
        let f = frame(SCREEN, &doc, &Cursor::new(SCREEN));
        assert!(!f.contains(WELCOME));
    }

    // -- Content ------------------------------------------------------------

    #[test]
    fn content_on_first_row_then_tildes() {
        let doc = Document::from_bytes(b"hello\n");
        let rows = rows(&frame(SCREEN, &doc, &Cursor::new(SCREEN)));
        assert_eq!(rows[0], "hello");
        assert!(rows[1..].iter().all(|r| r == "~"));
    }

    #[test]
    fn empty_line_draws_blank_first_row() {
        let doc = Document::from_bytes(b"\n");
        let rows = rows(&frame(SCREEN, &doc, &Cursor::new(SCREEN)));
        assert_eq!(rows[0], "");
        assert_eq!(rows[8], "~");
    }

    #[test]
    fn long_line_truncated_to_screen_width_once() {
        let size = Size { cols: 10, rows: 3 };
        let doc = Document::from_bytes(b"abcdefghijklmnopqrstuvwxyz\n");
        let f = frame(size, &doc, &Cursor::new(size));
        let rows = rows(&f);
        assert_eq!(rows[0], "abcdefghij");
        assert_eq!(rows[0].len(), 10);
        assert!(!f.contains("klm"));
    }

    #[test]
    fn line_exactly_screen_width_is_untouched() {
        let size = Size { cols: 5, rows: 2 };
        let doc = Document::from_bytes(b"12345");
        assert_eq!(rows(&frame(size, &doc, &Cursor::new(size)))[0], "12345");
    }

    #[test]
    fn single_row_screen() {
        let size = Size { cols: 80, rows: 1 };
        let f = frame(size, &Document::empty(), &Cursor::new(size));
        // rows / 3 == 0: the only row is the banner row.
        assert!(!f.contains("\r\n"));
        assert!(rows(&f)[0].ends_with(WELCOME));
    }
}
