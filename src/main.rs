use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::io;
use std::path::PathBuf;
use tipcalc::application::history::HistoryStore;
use tipcalc::domain::calculation::CalculationId;
use tipcalc::domain::ports::CalculationStoreBox;
use tipcalc::domain::tip::{self, DEFAULT_TIP_PERCENT, TipBreakdown};
use tipcalc::infrastructure::in_memory::InMemoryCalculationStore;
use tipcalc::infrastructure::json_file::JsonFileCalculationStore;
use tipcalc::interfaces::csv::history_writer::HistoryWriter;
use tipcalc::interfaces::input::{TIP_PERCENT_RANGE, parse_bill_amount};
use tipcalc::interfaces::summary::{format_currency, share_text};
use tipcalc::telemetry;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// History file used when no database path is given.
    #[arg(
        long,
        global = true,
        env = "TIPCALC_DATA_FILE",
        default_value = "tipcalc-history.json"
    )]
    data_file: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "TIPCALC_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Keep history in memory only; nothing is written to disk.
    #[arg(long, global = true, conflicts_with = "db_path")]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the tip and total for a bill
    Calc(CalculationArgs),
    /// Compute a tip and save it to the history
    Save(CalculationArgs),
    /// Print a plain-text summary to share
    Share(CalculationArgs),
    /// Print the saved history as CSV, newest first
    History,
    /// Delete one saved calculation
    Delete {
        /// Id of the calculation to delete
        id: CalculationId,
    },
    /// Delete every saved calculation
    Clear,
}

#[derive(Args)]
struct CalculationArgs {
    /// Bill amount. Input that is not a number counts as zero.
    bill: String,

    /// Tip percent
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_TIP_PERCENT,
        value_parser = clap::value_parser!(u32).range(
            i64::from(*TIP_PERCENT_RANGE.start())..=i64::from(*TIP_PERCENT_RANGE.end())
        )
    )]
    percent: u32,
}

impl CalculationArgs {
    fn compute(&self) -> (Decimal, TipBreakdown) {
        let bill_amount = parse_bill_amount(&self.bill);
        (bill_amount, tip::compute(bill_amount, Decimal::from(self.percent)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Calc(args) => {
            let (_, breakdown) = args.compute();
            print_breakdown(&breakdown);
        }
        Command::Share(args) => {
            let (bill_amount, breakdown) = args.compute();
            println!(
                "{}",
                share_text(
                    bill_amount,
                    args.percent,
                    breakdown.tip_amount,
                    breakdown.total_amount
                )
            );
        }
        Command::Save(args) => {
            let history = HistoryStore::new(open_backend(&cli)?);
            let (bill_amount, breakdown) = args.compute();
            let id = history
                .insert(breakdown.into_new_calculation(bill_amount, args.percent))
                .await
                .into_diagnostic()?;
            println!("Saved calculation {}", id);
            print_breakdown(&breakdown);
        }
        Command::History => {
            let history = HistoryStore::new(open_backend(&cli)?);
            let records = history.all().await.into_diagnostic()?;

            let stdout = io::stdout();
            let mut writer = HistoryWriter::new(stdout.lock());
            writer.write_records(&records).into_diagnostic()?;
        }
        Command::Delete { id } => {
            let history = HistoryStore::new(open_backend(&cli)?);
            history.delete(*id).await.into_diagnostic()?;
        }
        Command::Clear => {
            let history = HistoryStore::new(open_backend(&cli)?);
            history.delete_all().await.into_diagnostic()?;
        }
    }

    Ok(())
}

fn print_breakdown(breakdown: &TipBreakdown) {
    println!("Tip: {}", format_currency(breakdown.tip_amount));
    println!("Total: {}", format_currency(breakdown.total_amount));
}

fn open_backend(cli: &Cli) -> Result<CalculationStoreBox> {
    if cli.in_memory {
        return Ok(Box::new(InMemoryCalculationStore::new()));
    }

    if let Some(db_path) = &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            use tipcalc::infrastructure::rocksdb::RocksDBStore;

            info!(path = %db_path.display(), "using rocksdb history");
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            return Ok(Box::new(store));
        }

        #[cfg(not(feature = "storage-rocksdb"))]
        {
            tracing::warn!(
                path = %db_path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to the history file."
            );
        }
    }

    let store = JsonFileCalculationStore::open(&cli.data_file).into_diagnostic()?;
    info!(path = %store.path().display(), "using history file");
    Ok(Box::new(store))
}
