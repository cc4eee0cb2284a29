//! Statement conversion pipeline
//!
//! Orchestrates a one-shot conversion by coordinating the scrubber, the
//! statement reader, the parser and the journal writer:
//!
//! 1. Scrub the statement text ([`read_scrubbed`])
//! 2. Stream its rows ([`StatementReader`]) through a fresh
//!    [`StatementParser`]
//! 3. Flatten the ledger into the transaction list
//! 4. Optionally write the journal CSV ([`write_journal`])
//!
//! The first error from any step is returned; nothing is written for a
//! statement that failed to parse.

use crate::core::StatementParser;
use crate::io::{read_scrubbed, write_journal, ScrubMode, StatementReader};
use crate::types::{JournalError, Transaction};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Parse an already scrubbed statement
///
/// # Errors
///
/// Returns the first CSV, structural or numeric error encountered.
pub fn parse_statement<R: Read>(input: R) -> Result<Vec<Transaction>, JournalError> {
    let mut parser = StatementParser::new();

    for row in StatementReader::new(input) {
        parser.process(&row?)?;
    }

    Ok(parser.finish())
}

/// Read a statement file and return its normalized transactions
///
/// # Examples
///
/// ```no_run
/// use trade_journal::io::ScrubMode;
/// use trade_journal::pipeline::read_transactions;
/// use std::path::Path;
///
/// let transactions = read_transactions(Path::new("statement.csv"), ScrubMode::InMemory)
///     .expect("Statement could not be parsed");
/// println!("{} transactions", transactions.len());
/// ```
pub fn read_transactions(path: &Path, mode: ScrubMode) -> Result<Vec<Transaction>, JournalError> {
    let text = read_scrubbed(path, mode)?;
    let transactions = parse_statement(text.as_bytes())?;

    info!(
        path = %path.display(),
        transactions = transactions.len(),
        "parsed statement"
    );
    Ok(transactions)
}

/// Convert a statement file into a journal file
///
/// Returns the transactions written, in journal order.
pub fn convert_statement(
    input: &Path,
    output: &Path,
    mode: ScrubMode,
) -> Result<Vec<Transaction>, JournalError> {
    let transactions = read_transactions(input, mode)?;
    write_journal(output, &transactions)?;
    Ok(transactions)
}
