//! Line scrubber
//!
//! Activity Statements contain a legal notice about quantity signs whose
//! text holds an unescaped `"`. The CSV reader cannot recover from it, so
//! the line is replaced with a placeholder before structured parsing.
//! Every other line is kept byte-for-byte and the line count is unchanged.

use crate::types::JournalError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Fragment identifying the line to replace
pub const BROKEN_LINE_FRAGMENT: &str = "Quantities preceded by a \"-\" sign ";

/// Text written in place of a broken line
pub const PLACEHOLDER_LINE: &str = "REMOVED LINE";

/// Where the scrubbed statement text ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrubMode {
    /// Scrub in memory and leave the input file untouched
    #[default]
    InMemory,
    /// Also write the scrubbed text back over the input file
    InPlace,
}

/// Replace every broken line in `text`
///
/// Returns the scrubbed text and the number of lines replaced.
pub fn scrub_text(text: &str) -> (String, usize) {
    let mut replaced = 0;
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| {
            if line.contains(BROKEN_LINE_FRAGMENT) {
                replaced += 1;
                PLACEHOLDER_LINE
            } else {
                line
            }
        })
        .collect();

    (lines.join("\n"), replaced)
}

/// Read a statement file and return its scrubbed text
///
/// With [`ScrubMode::InPlace`] the scrubbed text is written back to `path`
/// when at least one line was replaced.
///
/// # Errors
///
/// Returns `FileNotFound` if the file is missing and `IoError` for any
/// other read or write failure.
pub fn read_scrubbed(path: &Path, mode: ScrubMode) -> Result<String, JournalError> {
    let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => JournalError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => JournalError::from(e),
    })?;

    let (scrubbed, replaced) = scrub_text(&raw);
    debug!(path = %path.display(), replaced, "scrubbed statement");

    if mode == ScrubMode::InPlace && replaced > 0 {
        fs::write(path, &scrubbed)?;
        info!(path = %path.display(), replaced, "rewrote statement with broken lines removed");
    }

    Ok(scrubbed)
}
