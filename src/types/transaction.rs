//! Transaction-related types for the trade journal
//!
//! A [`Transaction`] is one normalized financial event from an Activity
//! Statement. Fields shared by every event live on the struct itself; the
//! fields specific to one kind of event live in exactly one
//! [`TransactionDetail`] variant, so a stock trade can never carry option
//! or forex values.

use rust_decimal::Decimal;
use std::fmt;

/// Journal action tag, as written to the journal's action column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Stock purchase or sale
    Trade,
    /// Option purchase or sale that opens (or adds to) a position
    TradeOption,
    /// Option trade that closes an existing position
    TradeOptionClose,
    /// Option position closed by assignment
    TradeOptionAssignment,
    /// Cash dividend, possibly with withholding tax merged in
    Dividend,
    /// CAD to USD currency conversion
    Forex,
}

impl Action {
    /// Label used in the journal spreadsheet
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Trade => "Trade",
            Action::TradeOption => "Trade - Option",
            Action::TradeOptionClose => "Trade - Option - Close",
            Action::TradeOptionAssignment => "Trade - Option - Assignment",
            Action::Dividend => "Dividend",
            Action::Forex => "Forex",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuySell {
    Buy,
    Sell,
}

impl BuySell {
    /// Derive the direction from a reported quantity
    ///
    /// The statement has no separate direction column: a quantity whose
    /// text starts with `-` is a sale, anything else is a purchase.
    pub fn from_quantity(quantity: &str) -> Self {
        if quantity.starts_with('-') {
            BuySell::Sell
        } else {
            BuySell::Buy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuySell::Buy => "Buy",
            BuySell::Sell => "Sell",
        }
    }
}

impl fmt::Display for BuySell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an option trade relates to an existing position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTradeKind {
    Open,
    Close,
    Assignment,
}

/// Stock trade values
#[derive(Debug, Clone, PartialEq)]
pub struct EquityTrade {
    pub buy_sell: BuySell,
    /// Signed share count as reported (negative = sell)
    pub shares: String,
    /// Execution price per share as reported
    pub price: String,
    /// `-shares * price`, rounded to 2 decimal places
    pub proceeds: Decimal,
    /// Unrounded proceeds plus commission
    pub cost_basis_buy_or_option: Decimal,
    /// Mirrors `cost_basis_buy_or_option`
    pub cost_basis_total: Decimal,
}

/// Option trade values
#[derive(Debug, Clone, PartialEq)]
pub struct OptionTrade {
    pub kind: OptionTradeKind,
    pub buy_sell: BuySell,
    /// Signed contract count as reported (negative = sell)
    pub contracts: String,
    /// Contract description without the ticker, e.g. `20JAN23 9 C`
    pub contract: String,
    /// Execution price per share of the underlying, as reported
    pub price: String,
    /// `-100 * contracts * price`, rounded to 2 decimal places
    pub proceeds: Decimal,
    /// Always zero for options
    pub cost_basis_share: Decimal,
    /// Unrounded proceeds plus commission
    pub cost_basis_buy_or_option: Decimal,
    /// Net cash of the position, set on close/assignment when the opening
    /// trade is in the same statement
    pub realized_pl: Option<Decimal>,
}

/// CAD to USD conversion values
#[derive(Debug, Clone, PartialEq)]
pub struct ForexConversion {
    /// USD bought as reported (may contain grouping commas)
    pub usd_buy: String,
    /// USD.CAD exchange rate as reported
    pub usd_cad: String,
    /// `-usd_buy * usd_cad`, rounded to 6 decimal places
    pub cad_sell: Decimal,
}

/// Dividend payment values
#[derive(Debug, Clone, PartialEq)]
pub struct DividendPayment {
    /// Dividend amount as reported
    pub amount: String,
    /// Withholding tax amount, set once the matching tax row is merged
    pub fee: Option<String>,
}

/// Kind-specific part of a transaction
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionDetail {
    Equity(EquityTrade),
    Option(OptionTrade),
    Forex(ForexConversion),
    Dividend(DividendPayment),
}

/// One normalized financial event
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Instrument symbol; empty for forex conversions
    pub ticker: String,

    /// Account alias in effect when the row was read
    pub account: String,

    /// Trade or payment date, without time of day
    pub date: String,

    /// Broker commission as reported; `None` when not charged or not
    /// applicable
    pub commission: Option<String>,

    /// Free-text annotation
    pub notes: String,

    pub detail: TransactionDetail,
}

impl Transaction {
    /// Journal action derived from the transaction detail
    pub fn action(&self) -> Action {
        match &self.detail {
            TransactionDetail::Equity(_) => Action::Trade,
            TransactionDetail::Option(option) => match option.kind {
                OptionTradeKind::Open => Action::TradeOption,
                OptionTradeKind::Close => Action::TradeOptionClose,
                OptionTradeKind::Assignment => Action::TradeOptionAssignment,
            },
            TransactionDetail::Forex(_) => Action::Forex,
            TransactionDetail::Dividend(_) => Action::Dividend,
        }
    }

    /// Trade direction, if the transaction is a trade
    pub fn buy_sell(&self) -> Option<BuySell> {
        match &self.detail {
            TransactionDetail::Equity(equity) => Some(equity.buy_sell),
            TransactionDetail::Option(option) => Some(option.buy_sell),
            TransactionDetail::Forex(_) | TransactionDetail::Dividend(_) => None,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.account, self.action())?;
        match &self.detail {
            TransactionDetail::Equity(equity) => write!(
                f,
                " {} {} {} @ {} proceeds {} cost basis {}",
                self.ticker,
                equity.buy_sell,
                equity.shares,
                equity.price,
                equity.proceeds,
                equity.cost_basis_total
            ),
            TransactionDetail::Option(option) => {
                write!(
                    f,
                    " {} {} {} {} @ {} proceeds {} cost basis {}",
                    self.ticker,
                    option.contract,
                    option.buy_sell,
                    option.contracts,
                    option.price,
                    option.proceeds,
                    option.cost_basis_buy_or_option
                )?;
                if let Some(realized) = option.realized_pl {
                    write!(f, " realized {}", realized)?;
                }
                Ok(())
            }
            TransactionDetail::Forex(forex) => write!(
                f,
                " USD {} at {} CAD {}",
                forex.usd_buy, forex.usd_cad, forex.cad_sell
            ),
            TransactionDetail::Dividend(dividend) => {
                write!(f, " {} {}", self.ticker, dividend.amount)?;
                if let Some(fee) = &dividend.fee {
                    write!(f, " fee {}", fee)?;
                }
                Ok(())
            }
        }
    }
}
