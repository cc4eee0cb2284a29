//! Journal output format
//!
//! The trade-journal spreadsheet imports a headerless CSV with a fixed
//! column layout. Each transaction fills the columns that apply to its
//! action and leaves every other column empty. Column positions must not
//! move: the spreadsheet addresses them by index.
//!
//! Row conversion is pure; only [`write_journal`] touches the filesystem.

use crate::types::{JournalError, Transaction, TransactionDetail};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Number of columns in a journal row
pub const JOURNAL_COLUMNS: usize = 35;

/// Journal column indexes
pub mod column {
    pub const DATE: usize = 0;
    pub const ACCOUNT: usize = 1;
    pub const ACTION: usize = 3;
    pub const TICKER: usize = 6;
    pub const OPTION_CONTRACT: usize = 9;
    pub const BUY_SELL: usize = 10;
    pub const OPTION_CONTRACTS: usize = 11;
    pub const SHARES: usize = 12;
    pub const PRICE: usize = 13;
    pub const PROCEEDS: usize = 14;
    pub const COST_BASIS_SHARE: usize = 16;
    pub const COST_BASIS_BUY_OR_OPTION: usize = 17;
    pub const COST_BASIS_TOTAL: usize = 18;
    pub const DIVIDEND: usize = 20;
    pub const COMMISSION: usize = 21;
    pub const FEE: usize = 24;
    pub const FOREX_USD_BUY: usize = 26;
    pub const FOREX_USD_CAD: usize = 27;
    pub const FOREX_CAD_SELL: usize = 28;
    pub const NOTES: usize = 34;
}

/// Convert a transaction to its journal row
pub fn journal_row(tx: &Transaction) -> [String; JOURNAL_COLUMNS] {
    let mut row: [String; JOURNAL_COLUMNS] = std::array::from_fn(|_| String::new());

    row[column::DATE] = tx.date.clone();
    row[column::ACCOUNT] = tx.account.clone();
    row[column::ACTION] = tx.action().to_string();
    row[column::TICKER] = tx.ticker.clone();
    row[column::COMMISSION] = tx.commission.clone().unwrap_or_default();
    row[column::NOTES] = tx.notes.clone();

    match &tx.detail {
        TransactionDetail::Equity(equity) => {
            row[column::BUY_SELL] = equity.buy_sell.to_string();
            row[column::SHARES] = equity.shares.clone();
            row[column::PRICE] = equity.price.clone();
            row[column::PROCEEDS] = equity.proceeds.to_string();
            row[column::COST_BASIS_BUY_OR_OPTION] = equity.cost_basis_buy_or_option.to_string();
            row[column::COST_BASIS_TOTAL] = equity.cost_basis_total.to_string();
        }
        TransactionDetail::Option(option) => {
            row[column::OPTION_CONTRACT] = option.contract.clone();
            row[column::BUY_SELL] = option.buy_sell.to_string();
            row[column::OPTION_CONTRACTS] = option.contracts.clone();
            row[column::PRICE] = option.price.clone();
            row[column::PROCEEDS] = option.proceeds.to_string();
            row[column::COST_BASIS_SHARE] = option.cost_basis_share.to_string();
            row[column::COST_BASIS_BUY_OR_OPTION] = option.cost_basis_buy_or_option.to_string();
        }
        TransactionDetail::Forex(forex) => {
            row[column::FOREX_USD_BUY] = forex.usd_buy.clone();
            row[column::FOREX_USD_CAD] = forex.usd_cad.clone();
            row[column::FOREX_CAD_SELL] = forex.cad_sell.to_string();
        }
        TransactionDetail::Dividend(dividend) => {
            row[column::DIVIDEND] = dividend.amount.clone();
            row[column::FEE] = dividend.fee.clone().unwrap_or_default();
        }
    }

    row
}

/// Write transactions as journal rows, in the order given
///
/// No header row is written.
pub fn write_journal_csv(
    transactions: &[Transaction],
    output: &mut dyn Write,
) -> Result<(), JournalError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);

    for tx in transactions {
        writer
            .write_record(journal_row(tx))
            .map_err(|e| JournalError::output(format!("Failed to write journal row: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| JournalError::output(format!("Failed to flush journal: {}", e)))?;

    Ok(())
}

/// Create (or truncate) `path` and write the journal to it
pub fn write_journal(path: &Path, transactions: &[Transaction]) -> Result<(), JournalError> {
    let mut file = File::create(path).map_err(|e| {
        JournalError::output(format!("Failed to create '{}': {}", path.display(), e))
    })?;

    write_journal_csv(transactions, &mut file)?;
    info!(path = %path.display(), rows = transactions.len(), "wrote journal");

    Ok(())
}
