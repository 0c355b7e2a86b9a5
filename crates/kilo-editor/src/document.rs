//! Document — the text shown on screen.
//!
//! The editor holds at most one line: the first line of the file given on
//! the command line, with every trailing `\n` / `\r` stripped. The bytes
//! are kept as-is (no UTF-8 requirement) because the renderer writes them
//! straight to the terminal. Once loaded, the line never changes.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Failure to load a document from disk.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The file could not be opened.
    #[error("{}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file opened but reading its first line failed.
    #[error("{}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One row of text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    text: Vec<u8>,
}

impl Line {
    /// Build a line from raw bytes, stripping trailing line terminators.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        let end = bytes
            .iter()
            .rposition(|&b| b != b'\n' && b != b'\r')
            .map_or(0, |i| i + 1);
        Self {
            text: bytes[..end].to_vec(),
        }
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the line has no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The raw bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }
}

/// The document being displayed: zero or one line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    line: Option<Line>,
}

impl Document {
    /// A document with no lines. The view shows the welcome banner.
    #[must_use]
    pub const fn empty() -> Self {
        Self { line: None }
    }

    /// Document holding the first line of `bytes`.
    ///
    /// Empty input yields no line; a lone newline yields one empty line.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let first = match bytes.iter().position(|&b| b == b'\n') {
            Some(i) => &bytes[..=i],
            None => bytes,
        };
        Self {
            line: (!first.is_empty()).then(|| Line::new(first)),
        }
    }

    /// Load the first line of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Open`] if the file cannot be opened and
    /// [`DocumentError::Read`] if reading it fails.
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path).map_err(|source| DocumentError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut first = Vec::new();
        BufReader::new(file)
            .read_until(b'\n', &mut first)
            .map_err(|source| DocumentError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let doc = Self::from_bytes(&first);
        tracing::debug!(
            path = %path.display(),
            len = doc.line().map_or(0, Line::len),
            "document loaded"
        );
        Ok(doc)
    }

    /// The line, if the document has one.
    #[inline]
    #[must_use]
    pub const fn line(&self) -> Option<&Line> {
        self.line.as_ref()
    }
}
