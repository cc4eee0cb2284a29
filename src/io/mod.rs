//! I/O module
//!
//! Handles statement input and journal output.
//!
//! # Components
//!
//! - `scrubber` - Removes the known-broken legal notice line before parsing
//! - `statement_reader` - Row iterator over heterogeneous statement sections
//! - `journal_format` - Fixed-layout journal CSV output

pub mod journal_format;
pub mod scrubber;
pub mod statement_reader;

pub use journal_format::{journal_row, write_journal, write_journal_csv, JOURNAL_COLUMNS};
pub use scrubber::{read_scrubbed, scrub_text, ScrubMode};
pub use statement_reader::{StatementReader, StatementRow};
