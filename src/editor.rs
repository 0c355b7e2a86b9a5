// SPDX-License-Identifier: MIT
//
// The editor session: document, cursor, and view in one value.
//
// Implements the event loop's `App` trait. Navigation keys move the
// cursor, Ctrl-Q quits, everything else is ignored. There is no global
// state; the loop owns nothing but a `&mut Editor`.

use std::io;

use kilo_editor::cursor::{Cursor, Motion};
use kilo_editor::document::Document;
use kilo_editor::view::View;

use kilo_term::event_loop::{Action, App};
use kilo_term::geometry::Size;
use kilo_term::input::Key;
use kilo_term::output::OutputBuffer;

/// The key that ends the session.
pub const QUIT_KEY: u8 = b'q';

/// Editor state for one terminal session.
#[derive(Debug)]
pub struct Editor {
    doc: Document,
    cursor: Cursor,
    view: View,
}

impl Editor {
    /// Session showing `doc` on a `size` screen, cursor at the origin.
    #[must_use]
    pub const fn new(doc: Document, size: Size) -> Self {
        Self {
            doc,
            cursor: Cursor::new(size),
            view: View::new(size),
        }
    }

    /// Current cursor.
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }
}

impl App for Editor {
    fn on_key(&mut self, key: Key) -> Action {
        if key.is_ctrl(QUIT_KEY) {
            return Action::Quit;
        }
        if let Some(motion) = Motion::from_key(key) {
            self.cursor.apply(motion);
        }
        Action::Continue
    }

    fn paint(&self, frame: &mut OutputBuffer) -> io::Result<()> {
        self.view.render(frame, &self.doc, &self.cursor)
    }
}
