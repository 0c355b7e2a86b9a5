//! Cursor — screen position with clamped motions.
//!
//! The cursor lives in screen coordinates: `x` is a column, `y` a row,
//! both 0-indexed, and it can never leave the screen. Every motion is
//! clamped per step, so `0 <= x < cols` and `0 <= y < rows` hold after
//! any sequence of moves.
//!
//! Page motions are built from single steps: `PageDown` is `rows` steps
//! down, each clamped like an ordinary `Down`. The boundary policy lives
//! in [`Cursor::step`] and nowhere else.

use kilo_term::geometry::Size;
use kilo_term::input::Key;

/// A single-cell step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A cursor motion the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// One cell in a direction.
    Step(Direction),
    /// First column.
    Home,
    /// Last column of the screen.
    End,
    /// One screen of `Up` steps.
    PageUp,
    /// One screen of `Down` steps.
    PageDown,
}

impl Motion {
    /// The motion a key triggers, if any.
    #[must_use]
    pub const fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Up => Some(Self::Step(Direction::Up)),
            Key::Down => Some(Self::Step(Direction::Down)),
            Key::Left => Some(Self::Step(Direction::Left)),
            Key::Right => Some(Self::Step(Direction::Right)),
            Key::Home => Some(Self::Home),
            Key::End => Some(Self::End),
            Key::PageUp => Some(Self::PageUp),
            Key::PageDown => Some(Self::PageDown),
            Key::Byte(_) | Key::Delete | Key::Escape => None,
        }
    }
}

/// Cursor position on a fixed-size screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    x: u16,
    y: u16,
    size: Size,
}

impl Cursor {
    /// Cursor at the top-left corner of a `size` screen.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self { x: 0, y: 0, size }
    }

    /// Column, 0-indexed.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Row, 0-indexed.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// Last valid column.
    const fn max_x(&self) -> u16 {
        self.size.cols.saturating_sub(1)
    }

    /// Last valid row.
    const fn max_y(&self) -> u16 {
        self.size.rows.saturating_sub(1)
    }

    /// Move one cell, staying put at the screen edge.
    pub const fn step(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.x = self.x.saturating_sub(1),
            Direction::Right => {
                if self.x < self.max_x() {
                    self.x += 1;
                }
            }
            Direction::Up => self.y = self.y.saturating_sub(1),
            Direction::Down => {
                if self.y < self.max_y() {
                    self.y += 1;
                }
            }
        }
    }

    /// Apply a motion.
    pub fn apply(&mut self, motion: Motion) {
        match motion {
            Motion::Step(dir) => self.step(dir),
            Motion::Home => self.x = 0,
            Motion::End => self.x = self.max_x(),
            Motion::PageUp => self.repeat(Direction::Up, self.size.rows),
            Motion::PageDown => self.repeat(Direction::Down, self.size.rows),
        }
    }

    fn repeat(&mut self, dir: Direction, times: u16) {
        for _ in 0..times {
            self.step(dir);
        }
    }
}
