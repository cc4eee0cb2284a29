//! Trade row normalization
//!
//! A `Trades,Data,Order` row describes a stock trade, an option trade or
//! a currency conversion depending on its asset class. Each kind derives
//! its cash values with its own rule:
//!
//! | Asset class | Proceeds | Rounding |
//! |---|---|---|
//! | Stocks | `-shares * price` | 2 dp |
//! | Equity and Index Options | `-100 * contracts * price` | 2 dp |
//! | Forex | `-usd_bought * usd_cad` (CAD sold) | 6 dp |
//!
//! Cost basis is the unrounded proceeds plus commission, kept exact.
//! All arithmetic is decimal; any unparsable number aborts the run.

use crate::io::StatementRow;
use crate::types::{
    BuySell, EquityTrade, ForexConversion, JournalError, OptionTrade, OptionTradeKind,
    Transaction, TransactionDetail,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Shares per option contract
pub const CONTRACT_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;

/// Conversions buying less USD than this are automatic sweeps
pub const SWEEP_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

pub const SWEEP_NOTE: &str = "remaining CAD auto converted";
pub const FULL_CONVERSION_NOTE: &str = "converted all CAD to USD";

// Field positions in a Trades row
const ASSET_CLASS: usize = 3;
const SYMBOL: usize = 5;
const DATE_TIME: usize = 6;
const QUANTITY: usize = 7;
const PRICE: usize = 8;
const COMMISSION: usize = 11;
const CODE: usize = 15;

/// Asset classes the journal can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Stocks,
    Options,
    Forex,
}

impl AssetClass {
    /// Parse the asset class tag of a Trades row
    pub fn parse(tag: &str, line: u64) -> Result<Self, JournalError> {
        match tag {
            "Stocks" => Ok(AssetClass::Stocks),
            "Equity and Index Options" => Ok(AssetClass::Options),
            "Forex" => Ok(AssetClass::Forex),
            other => Err(JournalError::unsupported_asset_class(other, line)),
        }
    }
}

/// Fields of a `Trades,Data,Order` row
#[derive(Debug, Clone, PartialEq)]
pub struct TradeFields<'a> {
    pub asset_class: AssetClass,
    pub symbol: &'a str,
    /// Trade date without the time of day
    pub date: &'a str,
    pub quantity: &'a str,
    pub price: &'a str,
    pub commission: &'a str,
    /// `;`-separated trade codes, empty when the column is absent
    pub code: &'a str,
    pub line: u64,
}

impl<'a> TradeFields<'a> {
    /// Extract the trade fields from a row
    ///
    /// # Errors
    ///
    /// * `MissingField` - The row is shorter than a Trades row must be
    /// * `UnsupportedAssetClass` - The asset class is not handled
    pub fn from_row(row: &'a StatementRow) -> Result<Self, JournalError> {
        let line = row.line();
        let asset_class = AssetClass::parse(row.field(ASSET_CLASS)?, line)?;
        let date_time = row.field(DATE_TIME)?;

        Ok(TradeFields {
            asset_class,
            symbol: row.field(SYMBOL)?,
            date: trade_date(date_time),
            quantity: row.field(QUANTITY)?,
            price: row.field(PRICE)?,
            commission: row.field(COMMISSION)?,
            code: row.get(CODE).unwrap_or_default(),
            line,
        })
    }

    fn decimal(&self, field: &str, value: &str) -> Result<Decimal, JournalError> {
        parse_decimal(field, value, self.line)
    }

    fn overflow(&self, operation: &str) -> JournalError {
        JournalError::arithmetic_overflow(operation, self.line)
    }
}

/// Date part of a `"date, time"` field
pub fn trade_date(date_time: &str) -> &str {
    date_time
        .split_once(", ")
        .map_or(date_time, |(date, _)| date)
}

/// Parse a decimal field, naming the field on failure
///
/// Only plain notation is accepted: an optional sign, digits and one
/// decimal point. Digit separators (`1_000`) and exponents (`1e3`) are
/// rejected, as are grouping commas, which callers strip where the
/// statement uses them.
pub fn parse_decimal(field: &str, value: &str, line: u64) -> Result<Decimal, JournalError> {
    let plain = value
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+'));
    if !plain {
        return Err(JournalError::invalid_decimal(field, value, line));
    }

    Decimal::from_str(value).map_err(|_| JournalError::invalid_decimal(field, value, line))
}

/// Round half to even and fix the scale, so `1183` prints as `1183.00`
pub fn round_to(value: Decimal, decimal_places: u32) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(decimal_places);
    rounded
}

/// Classify an option trade from its trade codes
///
/// `A` (assignment) takes precedence over `C` (closing trade).
pub fn option_trade_kind(code: &str) -> OptionTradeKind {
    let mut kind = OptionTradeKind::Open;
    for token in code.split(';').map(str::trim) {
        match token {
            "A" => return OptionTradeKind::Assignment,
            "C" => kind = OptionTradeKind::Close,
            _ => {}
        }
    }
    kind
}

/// Build a stock trade transaction
pub fn stock_trade(fields: &TradeFields<'_>, account: &str) -> Result<Transaction, JournalError> {
    let shares = fields.decimal("shares", fields.quantity)?;
    let price = fields.decimal("price", fields.price)?;
    let commission = fields.decimal("commission", fields.commission)?;

    let proceeds = -shares
        .checked_mul(price)
        .ok_or_else(|| fields.overflow("proceeds"))?;
    let cost_basis = proceeds
        .checked_add(commission)
        .ok_or_else(|| fields.overflow("cost basis"))?
        .normalize();

    Ok(Transaction {
        ticker: fields.symbol.to_string(),
        account: account.to_string(),
        date: fields.date.to_string(),
        commission: Some(fields.commission.to_string()),
        notes: String::new(),
        detail: TransactionDetail::Equity(EquityTrade {
            buy_sell: BuySell::from_quantity(fields.quantity),
            shares: fields.quantity.to_string(),
            price: fields.price.to_string(),
            proceeds: round_to(proceeds, 2),
            cost_basis_buy_or_option: cost_basis,
            cost_basis_total: cost_basis,
        }),
    })
}

/// Build an option trade transaction
///
/// The symbol packs the ticker and the contract, e.g. `PR 20JAN23 9 C`.
/// The contract is everything after the first `"<ticker> "`.
/// `realized_pl` is left unset; it depends on earlier ledger entries.
pub fn option_trade(fields: &TradeFields<'_>, account: &str) -> Result<Transaction, JournalError> {
    let ticker = fields.symbol.split(' ').next().unwrap_or_default();
    let contract = fields
        .symbol
        .split_once(&format!("{} ", ticker))
        .map(|(_, contract)| contract)
        .filter(|contract| !ticker.is_empty() && !contract.is_empty())
        .ok_or_else(|| JournalError::malformed_descriptor(fields.symbol, fields.line))?;

    let contracts = fields.decimal("option contracts", fields.quantity)?;
    let price = fields.decimal("price", fields.price)?;
    let commission = fields.decimal("commission", fields.commission)?;

    let proceeds = -contracts
        .checked_mul(CONTRACT_MULTIPLIER)
        .and_then(|shares| shares.checked_mul(price))
        .ok_or_else(|| fields.overflow("proceeds"))?;
    let cost_basis = proceeds
        .checked_add(commission)
        .ok_or_else(|| fields.overflow("cost basis"))?
        .normalize();

    Ok(Transaction {
        ticker: ticker.to_string(),
        account: account.to_string(),
        date: fields.date.to_string(),
        commission: Some(fields.commission.to_string()),
        notes: String::new(),
        detail: TransactionDetail::Option(OptionTrade {
            kind: option_trade_kind(fields.code),
            buy_sell: BuySell::from_quantity(fields.quantity),
            contracts: fields.quantity.to_string(),
            contract: contract.to_string(),
            price: fields.price.to_string(),
            proceeds: round_to(proceeds, 2),
            cost_basis_share: Decimal::ZERO,
            cost_basis_buy_or_option: cost_basis,
            realized_pl: None,
        }),
    })
}

/// Build a CAD to USD conversion transaction
///
/// Quantity is the USD bought (may contain grouping commas) and price is
/// the USD.CAD rate. A zero commission is not reported.
pub fn forex_conversion(
    fields: &TradeFields<'_>,
    account: &str,
) -> Result<Transaction, JournalError> {
    let usd_buy = fields.decimal("USD bought", &fields.quantity.replace(',', ""))?;
    let usd_cad = fields.decimal("USD.CAD rate", fields.price)?;

    let cad_sell = -usd_buy
        .checked_mul(usd_cad)
        .ok_or_else(|| fields.overflow("CAD sold"))?;

    let commission = match fields.commission {
        "0" => None,
        reported => Some(reported.to_string()),
    };
    let notes = if usd_buy < SWEEP_THRESHOLD {
        SWEEP_NOTE
    } else {
        FULL_CONVERSION_NOTE
    };

    Ok(Transaction {
        ticker: String::new(),
        account: account.to_string(),
        date: fields.date.to_string(),
        commission,
        notes: notes.to_string(),
        detail: TransactionDetail::Forex(ForexConversion {
            usd_buy: fields.quantity.to_string(),
            usd_cad: fields.price.to_string(),
            cad_sell: round_to(cad_sell, 6),
        }),
    })
}

/// Build the transaction for any supported trade row
pub fn trade(fields: &TradeFields<'_>, account: &str) -> Result<Transaction, JournalError> {
    match fields.asset_class {
        AssetClass::Stocks => stock_trade(fields, account),
        AssetClass::Options => option_trade(fields, account),
        AssetClass::Forex => forex_conversion(fields, account),
    }
}
