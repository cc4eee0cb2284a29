//! Statement parser
//!
//! This module provides the StatementParser that turns the row stream of an
//! Activity Statement into normalized transactions. It makes one forward
//! pass, one row at a time, and keeps two pieces of state:
//!
//! - the current account alias, set by `Account Information` rows and
//!   stamped on every transaction recorded after it
//! - the [`Ledger`], which later rows may consult or update
//!
//! Rows are classified by their first three fields; rows of any other
//! section are ignored. The first malformed row aborts the pass: the
//! parser never skips a row and continues.

use crate::core::ledger::Ledger;
use crate::core::trades::{self, TradeFields};
use crate::io::StatementRow;
use crate::types::{DividendPayment, JournalError, OptionTradeKind, Transaction, TransactionDetail};
use tracing::{debug, info};

/// Annotation appended to a dividend once its withholding tax is merged
pub const WITHHOLDING_NOTE: &str = "15% tax withdrawn";

// Field positions shared by Dividends and Withholding Tax rows
const PAYMENT_DATE: usize = 3;
const PAYMENT_DESCRIPTION: usize = 4;
const PAYMENT_AMOUNT: usize = 5;

// Field position in an Account Information row
const ALIAS_VALUE: usize = 3;

/// Row kinds the parser acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// `Account Information,Data,Account Alias`
    AccountAlias,
    /// `Dividends,Data,USD`
    Dividend,
    /// `Withholding Tax,Data,USD`
    WithholdingTax,
    /// `Trades,Data,Order`
    Trade,
    /// Anything else (headers, totals, other sections)
    Ignored,
}

impl RowKind {
    /// Classify a row by its section, record kind and sub-kind
    pub fn classify(row: &StatementRow) -> Self {
        match (row.get(0), row.get(1), row.get(2)) {
            (Some("Account Information"), Some("Data"), Some("Account Alias")) => {
                RowKind::AccountAlias
            }
            (Some("Dividends"), Some("Data"), Some("USD")) => RowKind::Dividend,
            (Some("Withholding Tax"), Some("Data"), Some("USD")) => RowKind::WithholdingTax,
            (Some("Trades"), Some("Data"), Some("Order")) => RowKind::Trade,
            _ => RowKind::Ignored,
        }
    }
}

/// Ticker of a payment description such as
/// `MSFT(US5949181045) Cash Dividend USD 0.68 per Share (Ordinary Dividend)`
pub fn description_ticker(description: &str) -> &str {
    description
        .split_once('(')
        .map_or(description, |(ticker, _)| ticker)
}

/// Statement parser
///
/// Holds the state of one parse run. Create it, feed it every row with
/// [`process`](Self::process), then call [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct StatementParser {
    account_alias: String,
    ledger: Ledger,
}

impl StatementParser {
    /// Create a parser with no account alias and an empty ledger
    pub fn new() -> Self {
        StatementParser {
            account_alias: String::new(),
            ledger: Ledger::new(),
        }
    }

    #[cfg(test)]
    fn account_alias(&self) -> &str {
        &self.account_alias
    }

    #[cfg(test)]
    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Process a single statement row
    ///
    /// Routes the row to the appropriate handler based on its kind.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The row is too short for its section
    /// - A numeric field is not a decimal
    /// - A trade has an unsupported asset class or malformed option symbol
    /// - A withholding-tax row has no unique dividend to merge into
    pub fn process(&mut self, row: &StatementRow) -> Result<(), JournalError> {
        match RowKind::classify(row) {
            RowKind::AccountAlias => self.process_account_alias(row),
            RowKind::Dividend => self.process_dividend(row),
            RowKind::WithholdingTax => self.process_withholding_tax(row),
            RowKind::Trade => self.process_trade(row),
            RowKind::Ignored => Ok(()),
        }
    }

    fn process_account_alias(&mut self, row: &StatementRow) -> Result<(), JournalError> {
        let alias = row.field(ALIAS_VALUE)?;
        info!(alias, line = row.line(), "account alias");
        self.account_alias = alias.to_string();
        Ok(())
    }

    /// Record a dividend payment
    ///
    /// The ticker is the description up to its first `(`; the whole
    /// description becomes the notes.
    fn process_dividend(&mut self, row: &StatementRow) -> Result<(), JournalError> {
        let date = row.field(PAYMENT_DATE)?;
        let description = row.field(PAYMENT_DESCRIPTION)?;
        let amount = row.field(PAYMENT_AMOUNT)?;

        self.record(Transaction {
            ticker: description_ticker(description).to_string(),
            account: self.account_alias.clone(),
            date: date.to_string(),
            commission: None,
            notes: description.to_string(),
            detail: TransactionDetail::Dividend(DividendPayment {
                amount: amount.to_string(),
                fee: None,
            }),
        });

        Ok(())
    }

    /// Merge a withholding tax into the dividend recorded for its ticker
    ///
    /// The tax amount becomes the dividend's fee and the withholding note
    /// is appended to its notes on a new line.
    fn process_withholding_tax(&mut self, row: &StatementRow) -> Result<(), JournalError> {
        let description = row.field(PAYMENT_DESCRIPTION)?;
        let amount = row.field(PAYMENT_AMOUNT)?;
        let ticker = description_ticker(description);

        self.ledger
            .find_unique_open_dividend(ticker)?
            .merge_withholding(amount, WITHHOLDING_NOTE);

        debug!(ticker, fee = amount, line = row.line(), "merged withholding tax");
        Ok(())
    }

    /// Record a stock trade, option trade or currency conversion
    ///
    /// Opening option trades add a lot to the ledger. Closes and
    /// assignments consume lots of the same contract, oldest first, and
    /// get their realized P/L from the opening basis they consumed.
    fn process_trade(&mut self, row: &StatementRow) -> Result<(), JournalError> {
        let fields = TradeFields::from_row(row)?;
        let mut transaction = trades::trade(&fields, &self.account_alias)?;

        if let TransactionDetail::Option(option) = &mut transaction.detail {
            let contracts = trades::parse_decimal("option contracts", fields.quantity, row.line())?;

            match option.kind {
                OptionTradeKind::Open => self.ledger.open_option_lot(
                    &transaction.ticker,
                    &option.contract,
                    contracts,
                    option.cost_basis_buy_or_option,
                ),
                OptionTradeKind::Close | OptionTradeKind::Assignment => {
                    let opening = self.ledger.close_option_lots(
                        &transaction.ticker,
                        &option.contract,
                        contracts,
                        row.line(),
                    )?;
                    if opening.is_none() {
                        debug!(
                            ticker = %transaction.ticker,
                            contract = %option.contract,
                            line = row.line(),
                            "closing more contracts than this statement opened"
                        );
                    }
                    option.realized_pl = opening
                        .map(|opening| {
                            opening
                                .checked_add(option.cost_basis_buy_or_option)
                                .map(|realized| realized.normalize())
                                .ok_or_else(|| {
                                    JournalError::arithmetic_overflow("realized P/L", row.line())
                                })
                        })
                        .transpose()?;
                }
            }
        }

        self.record(transaction);
        Ok(())
    }

    fn record(&mut self, transaction: Transaction) {
        debug!(
            ticker = %transaction.ticker,
            action = %transaction.action(),
            date = %transaction.date,
            "recorded transaction"
        );
        self.ledger.add(transaction);
    }

    /// Consume the parser, returning every transaction in recording order
    pub fn finish(self) -> Vec<Transaction> {
        self.ledger.into_transactions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, BuySell};
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn row(fields: &[&str]) -> StatementRow {
        StatementRow::new(fields.iter().copied(), 1)
    }

    fn alias(name: &str) -> StatementRow {
        row(&["Account Information", "Data", "Account Alias", name])
    }

    fn dividend(description: &str, amount: &str) -> StatementRow {
        row(&["Dividends", "Data", "USD", "2023-06-08", description, amount])
    }

    fn withholding(description: &str, amount: &str) -> StatementRow {
        row(&["Withholding Tax", "Data", "USD", "2023-06-08", description, amount, ""])
    }

    fn option_trade(symbol: &str, contracts: &str, price: &str, commission: &str, code: &str) -> StatementRow {
        row(&[
            "Trades", "Data", "Order", "Equity and Index Options", "USD", symbol,
            "2022-11-25, 10:15:00", contracts, price, "", "", commission, "", "", "", code,
        ])
    }

    fn parse(rows: &[StatementRow]) -> Result<Vec<Transaction>, JournalError> {
        let mut parser = StatementParser::new();
        for row in rows {
            parser.process(row)?;
        }
        Ok(parser.finish())
    }

    const MSFT_DIVIDEND: &str =
        "MSFT(US5949181045) Cash Dividend USD 0.68 per Share (Ordinary Dividend)";

    #[rstest]
    #[case::alias(&["Account Information", "Data", "Account Alias", "TFSA"], RowKind::AccountAlias)]
    #[case::dividend(&["Dividends", "Data", "USD", "2023-06-08"], RowKind::Dividend)]
    #[case::withholding(&["Withholding Tax", "Data", "USD"], RowKind::WithholdingTax)]
    #[case::trade(&["Trades", "Data", "Order", "Stocks"], RowKind::Trade)]
    #[case::trade_header(&["Trades", "Header", "DataDiscriminator"], RowKind::Ignored)]
    #[case::trade_subtotal(&["Trades", "SubTotal", "", "Stocks"], RowKind::Ignored)]
    #[case::dividend_total(&["Dividends", "Data", "Total", "", "", "136"], RowKind::Ignored)]
    #[case::cad_dividend(&["Dividends", "Data", "CAD", "2023-06-08"], RowKind::Ignored)]
    #[case::account_name(&["Account Information", "Data", "Name", "Jane"], RowKind::Ignored)]
    #[case::placeholder(&["REMOVED LINE"], RowKind::Ignored)]
    #[case::empty(&[], RowKind::Ignored)]
    fn test_classify(#[case] fields: &[&str], #[case] expected: RowKind) {
        assert_eq!(RowKind::classify(&row(fields)), expected);
    }

    #[rstest]
    #[case::with_isin("MSFT(US5949181045) Cash Dividend", "MSFT")]
    #[case::payment_in_lieu("SMG(US8101861065) Payment in Lieu of Dividend - US Tax", "SMG")]
    #[case::no_parenthesis("MSFT", "MSFT")]
    fn test_description_ticker(#[case] description: &str, #[case] expected: &str) {
        assert_eq!(description_ticker(description), expected);
    }

    #[test]
    fn test_account_alias_persists_until_changed() {
        let transactions = parse(&[
            alias("TFSA"),
            dividend("MSFT(US5949181045) Cash", "136"),
            row(&["Account Information", "Data", "Name", "Jane"]),
            dividend("AAPL(US0378331005) Cash", "24"),
            alias("RRSP"),
            dividend("KO(US1912161007) Cash", "46"),
        ])
        .unwrap();

        let accounts: Vec<&str> = transactions.iter().map(|tx| tx.account.as_str()).collect();
        assert_eq!(accounts, vec!["TFSA", "TFSA", "RRSP"]);
    }

    #[test]
    fn test_transactions_before_alias_have_empty_account() {
        let transactions = parse(&[dividend("MSFT(US5949181045) Cash", "136")]).unwrap();
        assert_eq!(transactions[0].account, "");
    }

    #[test]
    fn test_dividend() {
        let transactions = parse(&[alias("TFSA"), dividend(MSFT_DIVIDEND, "136")]).unwrap();

        assert_eq!(transactions.len(), 1);
        let tx = &transactions[0];
        assert_eq!(tx.action(), Action::Dividend);
        assert_eq!(tx.ticker, "MSFT");
        assert_eq!(tx.date, "2023-06-08");
        assert_eq!(tx.notes, MSFT_DIVIDEND);
        assert_eq!(tx.commission, None);
        assert_eq!(
            tx.detail,
            TransactionDetail::Dividend(DividendPayment {
                amount: "136".to_string(),
                fee: None,
            })
        );
    }

    #[test]
    fn test_withholding_tax_merges_into_dividend() {
        let transactions = parse(&[
            alias("TFSA"),
            dividend(MSFT_DIVIDEND, "136"),
            dividend("AAPL(US0378331005) Cash Dividend", "24"),
            withholding("MSFT(US5949181045) Cash Dividend - US Tax", "-20.4"),
        ])
        .unwrap();

        assert_eq!(transactions.len(), 2);
        let msft = &transactions[0];
        assert_eq!(msft.ticker, "MSFT");
        assert_eq!(msft.notes, format!("{}\n{}", MSFT_DIVIDEND, WITHHOLDING_NOTE));
        assert_eq!(
            msft.detail,
            TransactionDetail::Dividend(DividendPayment {
                amount: "136".to_string(),
                fee: Some("-20.4".to_string()),
            })
        );
    }

    #[test]
    fn test_withholding_tax_without_dividend() {
        let result = parse(&[withholding("SMG(US8101861065) Payment in Lieu - US Tax", "-3")]);
        assert_eq!(
            result.unwrap_err(),
            JournalError::NoOpenDividend { ticker: "SMG".to_string() }
        );
    }

    #[test]
    fn test_withholding_tax_with_two_dividends() {
        let result = parse(&[
            dividend(MSFT_DIVIDEND, "136"),
            dividend(MSFT_DIVIDEND, "140"),
            withholding("MSFT(US5949181045) - US Tax", "-20.4"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            JournalError::AmbiguousDividend { ticker: "MSFT".to_string(), count: 2 }
        );
    }

    #[test]
    fn test_withholding_tax_for_traded_ticker() {
        let result = parse(&[
            option_trade("PR 20JAN23 9 C", "-6", "1.971666667", "-3.0190707", "O"),
            withholding("PR(US7433151039) - US Tax", "-1"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            JournalError::UnexpectedAction {
                ticker: "PR".to_string(),
                action: "Trade - Option".to_string(),
            }
        );
    }

    #[test]
    fn test_option_close_realizes_against_opening_trade() {
        let transactions = parse(&[
            option_trade("PR 20JAN23 9 C", "-6", "1.971666667", "-3.0190707", "O"),
            option_trade("PR 20JAN23 9 C", "6", "0.5", "-3", "C"),
        ])
        .unwrap();

        assert_eq!(transactions[1].action(), Action::TradeOptionClose);
        assert_eq!(transactions[1].buy_sell(), Some(BuySell::Buy));
        match &transactions[1].detail {
            TransactionDetail::Option(option) => {
                assert_eq!(option.cost_basis_buy_or_option.to_string(), "-303");
                // 1179.9809295 opening + -303 closing
                assert_eq!(option.realized_pl, Some(Decimal::new(8769809295, 7)));
            }
            other => panic!("expected option trade, got {:?}", other),
        }
    }

    #[test]
    fn test_option_close_in_two_fills_realizes_each_share_once() {
        let transactions = parse(&[
            option_trade("PR 20JAN23 9 C", "-6", "2", "0", "O"),
            option_trade("PR 20JAN23 9 C", "3", "1", "0", "C"),
            option_trade("PR 20JAN23 9 C", "3", "1", "0", "C"),
        ])
        .unwrap();

        let realized: Vec<Option<Decimal>> = transactions
            .iter()
            .map(|tx| match &tx.detail {
                TransactionDetail::Option(option) => option.realized_pl,
                other => panic!("expected option trade, got {:?}", other),
            })
            .collect();

        // 1200 opening basis split across the fills, -300 each
        assert_eq!(
            realized,
            vec![None, Some(Decimal::from(300)), Some(Decimal::from(300))]
        );
    }

    #[test]
    fn test_option_close_beyond_statement_position() {
        let transactions = parse(&[
            option_trade("PR 20JAN23 9 C", "-1", "2", "0", "O"),
            option_trade("PR 20JAN23 9 C", "2", "1", "0", "C"),
        ])
        .unwrap();

        match &transactions[1].detail {
            TransactionDetail::Option(option) => assert_eq!(option.realized_pl, None),
            other => panic!("expected option trade, got {:?}", other),
        }
    }

    #[test]
    fn test_option_assignment_without_opening_trade() {
        let transactions = parse(&[option_trade("PR 20JAN23 9 C", "6", "0", "0", "A;C")]).unwrap();

        assert_eq!(transactions[0].action(), Action::TradeOptionAssignment);
        match &transactions[0].detail {
            TransactionDetail::Option(option) => assert_eq!(option.realized_pl, None),
            other => panic!("expected option trade, got {:?}", other),
        }
    }

    #[test]
    fn test_first_error_aborts() {
        let mut parser = StatementParser::new();
        parser.process(&dividend(MSFT_DIVIDEND, "136")).unwrap();

        let bad = row(&["Trades", "Data", "Order", "Warrants", "USD", "X", "2022-11-25", "1", "1", "", "", "0"]);
        assert!(matches!(
            parser.process(&bad),
            Err(JournalError::UnsupportedAssetClass { .. })
        ));
        assert_eq!(parser.ledger().len(), 1);
    }

    #[test]
    fn test_short_dividend_row() {
        let result = parse(&[row(&["Dividends", "Data", "USD", "2023-06-08", MSFT_DIVIDEND])]);
        assert_eq!(
            result.unwrap_err(),
            JournalError::missing_field("Dividends", PAYMENT_AMOUNT, 1)
        );
    }

    #[test]
    fn test_short_alias_row() {
        let result = parse(&[row(&["Account Information", "Data", "Account Alias"])]);
        assert!(matches!(result, Err(JournalError::MissingField { index: 3, .. })));
    }

    #[test]
    fn test_ignored_rows_leave_state_untouched() {
        let mut parser = StatementParser::new();
        parser.process(&row(&["Statement", "Header", "Field Name", "Field Value"])).unwrap();
        parser.process(&row(&["REMOVED LINE"])).unwrap();

        assert_eq!(parser.account_alias(), "");
        assert!(parser.ledger().is_empty());
    }
}
