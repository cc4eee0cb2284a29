//! Trade Journal Library
//! # Overview
//!
//! This library converts brokerage "Activity Statement" CSV exports into a
//! flat ledger of transactions for a trade-journal spreadsheet.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Transaction, Action, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::parser`] - Row classification and the stateful single pass
//!   - [`core::trades`] - Proceeds and cost-basis arithmetic per asset class
//!   - [`core::ledger`] - Transaction storage and dividend/withholding correlation
//! - [`io`] - Line scrubbing, statement reading and journal output
//! - [`pipeline`] - File-to-file conversion
//!
//! # Transaction Types
//!
//! - **Trade**: Stock purchase or sale
//! - **Trade - Option**: Option purchase or sale, with Close and Assignment variants
//! - **Dividend**: Cash dividend, with any withholding tax merged in as a fee
//! - **Forex**: CAD to USD conversion
//!
//! # Error Policy
//!
//! Statements are assumed well-formed apart from one known broken notice
//! line, which the scrubber removes. Any other malformed row aborts the
//! conversion with a [`JournalError`].

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod types;

pub use core::{Ledger, StatementParser};
pub use io::{write_journal, write_journal_csv, ScrubMode};
pub use pipeline::{convert_statement, parse_statement, read_transactions};
pub use types::{Action, BuySell, JournalError, Transaction, TransactionDetail};
