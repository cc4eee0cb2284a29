//! Trade Journal CLI
//!
//! Converts an Activity Statement export into trade-journal rows.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --data ./statements/2023-06.csv
//! cargo run -- --data ./statements/2023-06.csv --output journal.csv --quiet
//! cargo run -- --data ./statements/2023-06.csv --log-level debug
//! ```
//!
//! The journal is written to `--output` (default `transactions.csv`) and
//! each transaction is listed on stdout. Logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, malformed statement, unwritable output, etc.)

use std::io::{stderr, stdout, BufWriter, Write};
use std::process;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};
use trade_journal::{cli, pipeline, Transaction};

fn main() {
    let args = cli::parse_args();
    setup_logging(args.log_level.into());

    let transactions = match pipeline::convert_statement(&args.data, &args.output, args.scrub_mode())
    {
        Ok(transactions) => transactions,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Err(e) = list_transactions(&transactions) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(level: LevelFilter) {
    // stdout carries the transaction listing
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn list_transactions(transactions: &[Transaction]) -> std::io::Result<()> {
    let mut out = BufWriter::new(stdout().lock());
    for (i, tx) in transactions.iter().enumerate() {
        writeln!(out, "transaction: {} {}", i, tx)?;
    }
    out.flush()
}
