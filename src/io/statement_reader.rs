//! Statement row reader with iterator interface
//!
//! An Activity Statement is many tables stacked in one file: every row
//! starts with its section name (`Trades`, `Dividends`, ...) and a record
//! kind (`Header`, `Data`, `Total`, ...), and each section has its own
//! column count. The reader therefore never assumes headers or a fixed
//! width; it yields raw [`StatementRow`]s and leaves interpretation to the
//! parser.
//!
//! CSV structure errors are yielded as `Err` items carrying the line
//! number. The input must already be scrubbed (see [`crate::io::scrubber`]),
//! so the reader works over any [`Read`] rather than a file path.

use crate::types::JournalError;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;

/// One row of a statement with its source line number
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    fields: StringRecord,
    line: u64,
}

impl StatementRow {
    /// Build a row from its fields
    pub fn new<I, T>(fields: I, line: u64) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut record = StringRecord::new();
        for field in fields {
            record.push_field(field.as_ref());
        }
        StatementRow {
            fields: record,
            line,
        }
    }

    /// Line number of the row in the statement (1-based)
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Number of fields in this row
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`, if the row is long enough
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index)
    }

    /// Section name (first field), empty if the row has no fields
    pub fn section(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Field at `index`, or a `MissingField` error naming this row's section
    pub fn field(&self, index: usize) -> Result<&str, JournalError> {
        self.get(index)
            .ok_or_else(|| JournalError::missing_field(self.section(), index, self.line))
    }
}

/// Streaming reader over statement rows
#[derive(Debug)]
pub struct StatementReader<R> {
    reader: csv::Reader<R>,
}

impl<R: Read> StatementReader<R> {
    /// Wrap any reader holding scrubbed statement text
    ///
    /// The CSV reader is configured to:
    /// - Treat every row as data (no header row)
    /// - Allow a different field count on every row
    /// - Keep field text exactly as written (no trimming)
    pub fn new(input: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::None)
            .buffer_capacity(8 * 1024)
            .from_reader(input);

        Self { reader }
    }
}

impl<R: Read> Iterator for StatementReader<R> {
    type Item = Result<StatementRow, JournalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();

        match self.reader.read_record(&mut record) {
            Ok(true) => {
                let line = record.position().map(|pos| pos.line()).unwrap_or_default();
                Some(Ok(StatementRow {
                    fields: record,
                    line,
                }))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}
