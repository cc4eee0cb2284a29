//! Core business logic module
//!
//! This module contains the statement normalization components:
//! - `parser` - Stateful single pass over statement rows
//! - `trades` - Per-asset-class trade arithmetic
//! - `ledger` - Transaction storage with per-ticker correlation lookups

pub mod ledger;
pub mod parser;
pub mod trades;

pub use ledger::Ledger;
pub use parser::{RowKind, StatementParser};
pub use trades::{AssetClass, TradeFields};
