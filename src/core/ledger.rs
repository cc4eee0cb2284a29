//! Transaction ledger with a per-ticker index
//!
//! The ledger is the only mutable state of a parse run besides the current
//! account alias. Transactions are kept in one list in the order they were
//! recorded; a ticker index maps each symbol to the positions of its
//! transactions so that later rows can be correlated with earlier ones:
//!
//! - a withholding-tax row is merged into the single dividend already
//!   recorded for its ticker ([`Ledger::find_unique_open_dividend`])
//! - an option close or assignment consumes the open lots of the same
//!   contract, oldest first ([`Ledger::close_option_lots`])
//!
//! Transactions are never removed. Flattening returns them in recording
//! order across all tickers, and a merged dividend keeps its position.

use crate::types::{DividendPayment, JournalError, Transaction, TransactionDetail};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// Open contracts left from one opening option trade
#[derive(Debug, Clone, PartialEq)]
struct OptionLot {
    /// Unsigned contract count not yet closed
    contracts: Decimal,
    /// Cost basis still attributed to those contracts
    basis: Decimal,
}

/// A recorded dividend, borrowed so a withholding tax can be merged into it
#[derive(Debug)]
pub struct OpenDividend<'a> {
    payment: &'a mut DividendPayment,
    notes: &'a mut String,
}

impl OpenDividend<'_> {
    /// Set the withholding tax as the dividend's fee and append `note` to
    /// its notes on a new line
    pub fn merge_withholding(self, fee: &str, note: &str) {
        let OpenDividend { payment, notes } = self;
        payment.fee = Some(fee.to_string());
        notes.push('\n');
        notes.push_str(note);
    }
}

/// Ledger of normalized transactions
#[derive(Debug, Default)]
pub struct Ledger {
    /// Transactions in recording order
    entries: Vec<Transaction>,

    /// Ticker to positions in `entries`, in recording order
    by_ticker: HashMap<String, Vec<usize>>,

    /// Open option lots per (ticker, contract), oldest first
    option_lots: HashMap<(String, String), VecDeque<OptionLot>>,
}

impl Ledger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Ledger {
            entries: Vec::new(),
            by_ticker: HashMap::new(),
            option_lots: HashMap::new(),
        }
    }

    /// Record a transaction under its ticker
    pub fn add(&mut self, transaction: Transaction) {
        let position = self.entries.len();
        self.by_ticker
            .entry(transaction.ticker.clone())
            .or_default()
            .push(position);
        self.entries.push(transaction);
    }

    /// Number of recorded transactions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the dividend a withholding-tax row belongs to
    ///
    /// The statement lists each dividend before its withholding tax, so
    /// the ticker must have exactly one transaction recorded and it must be
    /// a dividend. Anything else means the statement does not match the
    /// expected layout.
    ///
    /// # Errors
    ///
    /// * `NoOpenDividend` - Nothing recorded for the ticker
    /// * `AmbiguousDividend` - More than one transaction recorded for it
    /// * `UnexpectedAction` - The single transaction is not a dividend
    pub fn find_unique_open_dividend(
        &mut self,
        ticker: &str,
    ) -> Result<OpenDividend<'_>, JournalError> {
        let positions = match self.by_ticker.get(ticker) {
            Some(positions) if !positions.is_empty() => positions,
            _ => {
                return Err(JournalError::NoOpenDividend {
                    ticker: ticker.to_string(),
                })
            }
        };

        if positions.len() > 1 {
            return Err(JournalError::AmbiguousDividend {
                ticker: ticker.to_string(),
                count: positions.len(),
            });
        }

        let transaction = &mut self.entries[positions[0]];
        let action = transaction.action();
        let Transaction { detail, notes, .. } = transaction;
        match detail {
            TransactionDetail::Dividend(payment) => Ok(OpenDividend { payment, notes }),
            _ => Err(JournalError::UnexpectedAction {
                ticker: ticker.to_string(),
                action: action.to_string(),
            }),
        }
    }

    /// Register the contracts of an opening option trade
    ///
    /// `contracts` is the signed reported quantity; lots are matched by
    /// size only, so a short and a long open of one contract share a queue.
    pub fn open_option_lot(
        &mut self,
        ticker: &str,
        contract: &str,
        contracts: Decimal,
        basis: Decimal,
    ) {
        self.option_lots
            .entry((ticker.to_string(), contract.to_string()))
            .or_default()
            .push_back(OptionLot {
                contracts: contracts.abs(),
                basis,
            });
    }

    /// Consume open lots for a closing or assigned option trade
    ///
    /// Lots are consumed oldest first. A partly consumed lot gives up the
    /// pro-rata share of its basis and keeps the rest for later closes.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(basis))` - Opening basis of the contracts being closed
    /// * `Ok(None)` - The statement holds fewer open contracts than are
    ///   being closed; whatever was open is still consumed
    ///
    /// # Errors
    ///
    /// * `ArithmeticOverflow` - The basis share could not be computed
    pub fn close_option_lots(
        &mut self,
        ticker: &str,
        contract: &str,
        contracts: Decimal,
        line: u64,
    ) -> Result<Option<Decimal>, JournalError> {
        let lots = match self
            .option_lots
            .get_mut(&(ticker.to_string(), contract.to_string()))
        {
            Some(lots) => lots,
            None => return Ok(None),
        };

        let overflow = || JournalError::arithmetic_overflow("opening basis", line);
        let mut remaining = contracts.abs();
        let mut matched = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let Some(lot) = lots.front_mut() else {
                break;
            };

            if lot.contracts <= remaining {
                matched = matched.checked_add(lot.basis).ok_or_else(overflow)?;
                remaining -= lot.contracts;
                lots.pop_front();
            } else {
                let share = lot
                    .basis
                    .checked_mul(remaining)
                    .and_then(|scaled| scaled.checked_div(lot.contracts))
                    .ok_or_else(overflow)?;
                matched = matched.checked_add(share).ok_or_else(overflow)?;
                lot.basis -= share;
                lot.contracts -= remaining;
                remaining = Decimal::ZERO;
            }
        }

        Ok(remaining.is_zero().then(|| matched.normalize()))
    }

    /// Consume the ledger, returning every transaction in recording order
    pub fn into_transactions(self) -> Vec<Transaction> {
        self.entries
    }
}
