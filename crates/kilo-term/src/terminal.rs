// SPDX-License-Identifier: MIT
//
// Raw-mode session — termios capture, install, and RAII restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), isatty, and raw fd writes. These are the standard POSIX
// interfaces for terminal control; there is no safe alternative. Each
// unsafe block is minimal.
#![allow(unsafe_code)]
//
// `RawMode::enter` snapshots the terminal's line discipline and installs
// a raw configuration: no echo, no canonical line buffering, no XON/XOFF,
// no CR→NL translation, no output post-processing, no signal keys, 8-bit
// characters, and a read that returns after at most one VTIME interval.
// Dropping the guard puts the snapshot back, on every exit path.
//
// The panic hook covers the one path a destructor may not: it restores
// the attributes from a process-wide backup and clears the screen before
// the original hook prints the panic message to a working terminal.

use std::io;
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;
use std::time::Duration;

use crate::error::{Error, Result};

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// VTIME value (deciseconds) for a per-byte read timeout.
///
/// Rounded up so the line discipline never waits less than asked, and
/// clamped to the 1..=255 range VTIME can hold.
#[must_use]
pub fn vtime_for(timeout: Duration) -> u8 {
    let tenths = timeout.as_millis().div_ceil(100);
    u8::try_from(tenths.clamp(1, 255)).unwrap_or(u8::MAX)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
///
/// [`RawMode`] owns its own copy, but the panic hook can't reach it.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Show the cursor, clear the screen, home the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[?25h\x1b[2J\x1b[H";

/// Panic hook guard: the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write [`EMERGENCY_RESTORE`] straight to fd 1.
///
/// Bypasses `io::stdout()` so a panic raised while the stdout lock is
/// held (mid-frame) cannot deadlock here.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        use std::io::Write;
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Raw configuration ──────────────────────────────────────────────────────

/// Turn a captured termios into the raw configuration, in place.
///
/// `vtime` is the read timeout in deciseconds; VMIN is 0 so `read()`
/// returns empty-handed once it expires.
#[cfg(unix)]
pub fn make_raw(termios: &mut libc::termios, vtime: u8) {
    termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    termios.c_oflag &= !libc::OPOST;
    termios.c_cflag |= libc::CS8;
    termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = vtime;
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw-mode guard for stdin's terminal.
///
/// Holds the attributes captured by [`enter`](Self::enter) and restores
/// them exactly once, either through [`exit`](Self::exit) or on drop.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use kilo_term::terminal::RawMode;
///
/// let raw = RawMode::enter(Duration::from_millis(100))?;
/// // ... read keys, render frames ...
/// drop(raw); // attributes restored
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct RawMode {
    /// Attributes to put back. `None` once restored.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl std::fmt::Debug for RawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMode")
            .field("active", &self.is_active())
            .finish()
    }
}

impl RawMode {
    /// Capture the current attributes and switch stdin to raw mode.
    ///
    /// # Errors
    ///
    /// - [`Error::NotATerminal`] if stdin is not a TTY.
    /// - [`Error::GetAttributes`] if the attributes cannot be read.
    /// - [`Error::SetAttributes`] if the raw configuration is rejected.
    #[cfg(unix)]
    pub fn enter(read_timeout: Duration) -> Result<Self> {
        if !is_tty() {
            return Err(Error::NotATerminal);
        }

        let original = unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
                return Err(Error::GetAttributes(io::Error::last_os_error()));
            }
            termios
        };

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }
        install_panic_hook();

        // From here on the guard exists, so a failed install still restores.
        let session = Self {
            original: Some(original),
        };

        let mut config = original;
        make_raw(&mut config, vtime_for(read_timeout));
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const config) } != 0 {
            return Err(Error::SetAttributes(io::Error::last_os_error()));
        }

        tracing::debug!(vtime = config.c_cc[libc::VTIME], "raw mode entered");
        Ok(session)
    }

    #[cfg(not(unix))]
    pub fn enter(_read_timeout: Duration) -> Result<Self> {
        Err(Error::NotATerminal)
    }

    /// Whether the captured attributes are still waiting to be restored.
    #[cfg(unix)]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.original.is_some()
    }

    #[cfg(not(unix))]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        false
    }

    /// Restore the captured attributes.
    ///
    /// Idempotent: only the first call touches the terminal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SetAttributes`] if `tcsetattr` fails. The guard
    /// is spent either way; a second attempt would not fare better.
    #[cfg(unix)]
    pub fn exit(&mut self) -> Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };

        let rc = unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) };

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }

        if rc != 0 {
            return Err(Error::SetAttributes(io::Error::last_os_error()));
        }
        tracing::debug!("raw mode restored");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn exit(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            tracing::error!(error = %e, "failed to restore terminal attributes");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
