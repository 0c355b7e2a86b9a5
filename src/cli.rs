// SPDX-License-Identifier: MIT
//
// Command-line surface.
//
//   kilo [FILE] [--log-file PATH] [--escape-timeout-ms N]
//
// Flags fall back to `KILO_*` environment variables so a wrapper script
// can set them once.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use kilo_term::event_loop::LoopConfig;

/// A minimal screen-oriented terminal text editor.
#[derive(Debug, Parser)]
#[command(name = "kilo", version, about)]
pub struct Cli {
    /// File whose first line is shown. Without it the welcome banner is shown.
    pub file: Option<PathBuf>,

    /// Append logs to this file (the terminal itself is never used for logs).
    #[arg(long, env = "KILO_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// How long to wait for each input byte, in milliseconds. Escape
    /// sequences must arrive within this window to be recognised.
    #[arg(
        long,
        env = "KILO_ESCAPE_TIMEOUT_MS",
        value_name = "MS",
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(1..=25_500),
    )]
    pub escape_timeout_ms: u64,
}

impl Cli {
    /// Loop timing derived from the flags.
    #[must_use]
    pub const fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            read_timeout: Duration::from_millis(self.escape_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments() {
        let cli = Cli::try_parse_from(["kilo"]).unwrap();
        assert!(cli.file.is_none());
        assert_eq!(cli.loop_config(), LoopConfig::default());
    }

    #[test]
    fn file_argument() {
        let cli = Cli::try_parse_from(["kilo", "notes.txt"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("notes.txt")));
    }

    #[test]
    fn timeout_flag() {
        let cli = Cli::try_parse_from(["kilo", "--escape-timeout-ms", "250"]).unwrap();
        assert_eq!(cli.loop_config().read_timeout, Duration::from_millis(250));
    }

    #[test]
    fn timeout_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["kilo", "--escape-timeout-ms", "0"]).is_err());
        assert!(Cli::try_parse_from(["kilo", "--escape-timeout-ms", "30000"]).is_err());
    }

    #[test]
    fn log_file_flag() {
        let cli = Cli::try_parse_from(["kilo", "--log-file", "/tmp/kilo.log", "a.txt"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/kilo.log")));
        assert_eq!(cli.file, Some(PathBuf::from("a.txt")));
    }
}
