//! # kilo-editor — Editor core for kilo
//!
//! The state the terminal engine renders:
//!
//! - **[`document`]** — the single line of text loaded from a file
//! - **[`cursor`]** — cursor position clamped to the screen, with motions
//! - **[`view`]** — composes a full frame from document and cursor

pub mod cursor;
pub mod document;
pub mod view;
