use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use ltt_cli::logging::{self, LogConfig};
use ltt_cli::{csv_loader, report, utils};
use ltt_core::{CalculationInput, Jurisdiction, LandTransferTaxCalculator};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Ontario and Toronto land transfer tax calculator.
///
/// Quotes the provincial and municipal land transfer tax on a home purchase,
/// including first-time buyer rebates.
#[derive(Debug, Parser)]
#[command(name = "ltt", version, about)]
struct Cli {
    /// Log filter, e.g. `debug` or `warn,ltt_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Quote the tax on a single purchase.
    Quote {
        /// Purchase price, e.g. `650000` or `"$1,250,000"`.
        #[arg(allow_hyphen_values = true)]
        price: String,

        /// Property location: `toronto` or `other`.
        #[arg(long, default_value = "toronto", value_parser = parse_location)]
        location: Jurisdiction,

        /// Apply first-time home buyer rebates.
        #[arg(long)]
        first_time_buyer: bool,

        /// Show how the price was split across each tax tier.
        #[arg(long)]
        breakdown: bool,
    },

    /// Quote every purchase in a CSV file.
    Batch {
        /// CSV file with a `price` column and optional `location` and
        /// `first_time_buyer` columns.
        #[arg(short, long)]
        file: PathBuf,

        /// Write results here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_location(s: &str) -> Result<Jurisdiction, String> {
    Jurisdiction::parse(s)
        .ok_or_else(|| format!("unknown location '{s}' (expected toronto or other)"))
}

// ─── commands ────────────────────────────────────────────────────────────────

fn quote(
    calculator: &LandTransferTaxCalculator<'_>,
    input: CalculationInput,
    breakdown: bool,
) -> Result<()> {
    let result = calculator
        .calculate(&input)
        .context("Please enter a valid purchase price")?;

    print!("{}", report::render_quote(calculator, &result, breakdown));
    Ok(())
}

fn batch(
    calculator: &LandTransferTaxCalculator<'_>,
    file: &Path,
    output: Option<&Path>,
) -> Result<()> {
    info!("Loading purchases from: {}", file.display());

    let inputs = csv_loader::load_from_file(file)
        .with_context(|| format!("Failed to load CSV: {}", file.display()))?;

    debug!("Parsed {} purchases from CSV", inputs.len());

    let results = inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| {
            calculator
                .calculate(input)
                .with_context(|| format!("row {}", idx + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create: {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    report::write_csv(&results, writer).context("Failed to write results")?;

    info!("Quoted {} purchases", results.len());
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&LogConfig {
        filter: cli.log_level.clone(),
        file: cli.log_file.clone(),
    })?;

    let calculator = LandTransferTaxCalculator::new();

    match cli.command {
        Command::Quote {
            price,
            location,
            first_time_buyer,
            breakdown,
        } => {
            let price = utils::parse_price(&price)?;
            quote(
                &calculator,
                CalculationInput {
                    price,
                    jurisdiction: location,
                    first_time_buyer,
                },
                breakdown,
            )
        }
        Command::Batch { file, output } => batch(&calculator, &file, output.as_deref()),
    }
}
