//! Error types for the trade journal
//!
//! Every failure while converting a statement is fatal: the parser never
//! skips a row and continues. Errors are surfaced as values so the caller
//! decides how to terminate.
//!
//! # Error Categories
//!
//! - **Input-access errors**: File not found, permission denied, etc.
//! - **Structural errors**: Malformed CSV, short rows, unknown asset classes,
//!   broken dividend/withholding correlation
//! - **Numeric-format errors**: Fields that should be decimals but are not
//! - **Output errors**: The journal file could not be written

use thiserror::Error;

/// Main error type for statement conversion
///
/// Each variant includes enough context (line number, ticker, offending
/// value) to identify the failing condition in the statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JournalError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV structure error reported by the reader
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A row is shorter than its section requires
    #[error("{section} row at line {line} has no field {index}")]
    MissingField {
        /// Section of the row (e.g. "Trades")
        section: String,
        /// Zero-based field index that was expected
        index: usize,
        /// Line number of the row
        line: u64,
    },

    /// A field expected to hold a decimal could not be parsed
    #[error("Invalid decimal '{value}' for {field} at line {line}")]
    InvalidDecimal {
        /// Name of the field being parsed
        field: String,
        /// The raw field text
        value: String,
        /// Line number of the row
        line: u64,
    },

    /// Trades row with an asset class the journal cannot represent
    #[error("Unsupported asset class '{asset_class}' at line {line}")]
    UnsupportedAssetClass {
        /// The asset class tag as reported
        asset_class: String,
        /// Line number of the row
        line: u64,
    },

    /// Option symbol without a contract description after the ticker
    #[error("Malformed option descriptor '{descriptor}' at line {line}")]
    MalformedDescriptor {
        /// The raw symbol field
        descriptor: String,
        /// Line number of the row
        line: u64,
    },

    /// Withholding tax arrived for a ticker with no prior dividend
    #[error("No dividend recorded for ticker {ticker} before its withholding tax")]
    NoOpenDividend {
        /// Ticker of the withholding row
        ticker: String,
    },

    /// Withholding tax arrived for a ticker with several prior transactions
    #[error("Expected 1 transaction for ticker {ticker} but have {count}")]
    AmbiguousDividend {
        /// Ticker of the withholding row
        ticker: String,
        /// Number of transactions already recorded for it
        count: usize,
    },

    /// The single prior transaction for the ticker is not a dividend
    #[error("Transaction for ticker {ticker} has unexpected action {action}")]
    UnexpectedAction {
        /// Ticker of the withholding row
        ticker: String,
        /// Action of the transaction that was found
        action: String,
    },

    /// Decimal arithmetic overflowed
    #[error("Arithmetic overflow in {operation} at line {line}")]
    ArithmeticOverflow {
        /// Computation that overflowed
        operation: String,
        /// Line number of the row
        line: u64,
    },

    /// The journal could not be written
    #[error("Output error: {message}")]
    OutputError {
        /// Description of the write failure
        message: String,
    },
}

// Conversion from io::Error to JournalError
impl From<std::io::Error> for JournalError {
    fn from(error: std::io::Error) -> Self {
        JournalError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to JournalError
impl From<csv::Error> for JournalError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        JournalError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl JournalError {
    /// Create a MissingField error
    pub fn missing_field(section: &str, index: usize, line: u64) -> Self {
        JournalError::MissingField {
            section: section.to_string(),
            index,
            line,
        }
    }

    /// Create an InvalidDecimal error
    pub fn invalid_decimal(field: &str, value: &str, line: u64) -> Self {
        JournalError::InvalidDecimal {
            field: field.to_string(),
            value: value.to_string(),
            line,
        }
    }

    /// Create an UnsupportedAssetClass error
    pub fn unsupported_asset_class(asset_class: &str, line: u64) -> Self {
        JournalError::UnsupportedAssetClass {
            asset_class: asset_class.to_string(),
            line,
        }
    }

    /// Create a MalformedDescriptor error
    pub fn malformed_descriptor(descriptor: &str, line: u64) -> Self {
        JournalError::MalformedDescriptor {
            descriptor: descriptor.to_string(),
            line,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, line: u64) -> Self {
        JournalError::ArithmeticOverflow {
            operation: operation.to_string(),
            line,
        }
    }

    /// Create an OutputError from anything displayable
    pub fn output(error: impl std::fmt::Display) -> Self {
        JournalError::OutputError {
            message: error.to_string(),
        }
    }
}
