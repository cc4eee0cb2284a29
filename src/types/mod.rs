//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Normalized transaction and its per-kind detail
//! - `error`: Error types for statement conversion

pub mod error;
pub mod transaction;

pub use error::JournalError;
pub use transaction::{
    Action, BuySell, DividendPayment, EquityTrade, ForexConversion, OptionTrade, OptionTradeKind,
    Transaction, TransactionDetail,
};
