// SPDX-License-Identifier: MIT
//
// kilo — a minimal screen-oriented terminal text editor.
//
// This is the binary that wires the crates together:
//
//   kilo-term   → raw mode, key decoding, geometry, framed output, loop
//   kilo-editor → document line, cursor model, frame renderer
//
// Startup order matters. The document is loaded before the terminal is
// touched, so a bad path fails with the shell still intact. Then raw
// mode is entered, the screen is measured, and the loop runs:
//
//   stdin → decoder → Editor::on_key → cursor motion
//   Editor::paint → View::render → OutputBuffer → one write to fd 1
//
// A fatal error inside the session clears the screen while the terminal
// is still raw, then the `RawMode` guard restores it. Failures before raw
// mode leave the screen alone. Either way the cause goes to stderr and
// the log, and the process exits with status 1. A failed restore after a
// clean quit is fatal too.

mod cli;
mod editor;
mod logging;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use kilo_editor::document::{Document, DocumentError};
use kilo_term::event_loop::{self, EventLoop, LoopConfig};
use kilo_term::geometry;
use kilo_term::output::RawStdout;
use kilo_term::terminal::RawMode;

use crate::cli::Cli;
use crate::editor::Editor;
use crate::logging::LogError;

/// Anything that ends the session early.
#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Terminal(#[from] kilo_term::Error),
}

/// Run one editing session. The terminal is restored before this returns.
fn run(cli: &Cli) -> Result<(), Error> {
    logging::init(cli.log_file.as_deref())?;

    let doc = match &cli.file {
        Some(path) => Document::open(path)?,
        None => Document::empty(),
    };

    let config = cli.loop_config();
    let mut raw = RawMode::enter(config.read_timeout)?;
    let session = edit(doc, config);
    finish(session, || raw.exit(), &mut RawStdout)
}

/// Measure the screen and run the loop until the user quits.
fn edit(doc: Document, config: LoopConfig) -> kilo_term::Result<()> {
    let mut event_loop = EventLoop::stdio(config);
    let size = geometry::probe(&mut RawStdout, event_loop.source_mut())?;

    let mut editor = Editor::new(doc, size);
    event_loop.run(&mut editor)
}

/// Leave raw mode after a session.
///
/// On a clean quit a failed restore is the session's error. On a failed
/// session the screen is cleared first, and the session error wins over
/// any restore error.
fn finish(
    session: kilo_term::Result<()>,
    restore: impl FnOnce() -> kilo_term::Result<()>,
    screen: &mut impl Write,
) -> Result<(), Error> {
    match session {
        Ok(()) => restore().map_err(Error::from),
        Err(e) => {
            let _ = event_loop::clear_screen(screen);
            if let Err(restore_err) = restore() {
                tracing::error!(error = %restore_err, "terminal restore failed");
            }
            Err(e.into())
        }
    }
}

/// Exit status for a session outcome: 0 on quit, 1 after a fatal error.
/// The cause is written to `stderr` with a `kilo:` prefix.
fn report(result: Result<(), Error>, stderr: &mut impl Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            let _ = writeln!(stderr, "kilo: {e}");
            1
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(report(run(&cli), &mut io::stderr()))
}
