//! Plain-text and CSV rendering of calculation results.

use std::fmt;
use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use ltt_core::calculations::{TierCharge, bracket_charges};
use ltt_core::{BracketTable, CalculationResult, LandTransferTaxCalculator};

use crate::utils::{format_amount, format_currency, format_rate};

const LABEL_WIDTH: usize = 20;

/// The four summary lines shown for a quote.
pub struct Summary<'a>(pub &'a CalculationResult);

impl fmt::Display for Summary<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let result = self.0;
        for (label, amount) in [
            ("Provincial:", result.provincial_tax),
            ("Municipal:", result.municipal_tax),
            ("Rebate:", result.rebate),
            ("Land Transfer Tax:", result.total_tax),
        ] {
            writeln!(f, "{label:<LABEL_WIDTH$}{:>16}", format_currency(amount))?;
        }
        Ok(())
    }
}

/// How a price was split across the tiers of one table.
pub struct Breakdown<'a, 't> {
    pub price: Decimal,
    pub table: &'a BracketTable<'t>,
}

impl fmt::Display for Breakdown<'_, '_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let charges = bracket_charges(self.price, self.table);

        writeln!(f, "{} tiers:", self.table.name())?;
        if charges.is_empty() {
            writeln!(f, "  (nothing taxable)")?;
        }
        for charge in &charges {
            writeln!(
                f,
                "  {:<34}{:>6} on {:>16} = {:>14}",
                tier_label(charge),
                format_rate(charge.rate),
                format_currency(charge.taxable),
                format_currency(charge.tax),
            )?;
        }
        Ok(())
    }
}

fn tier_label(charge: &TierCharge) -> String {
    match charge.upper {
        Some(upper) => format!(
            "{} - {}",
            format_currency(charge.lower),
            format_currency(upper)
        ),
        None => format!("above {}", format_currency(charge.lower)),
    }
}

/// The summary, optionally followed by the per-tier breakdown of every
/// table that applied.
pub struct Quote<'a, 't> {
    pub calculator: &'a LandTransferTaxCalculator<'t>,
    pub result: &'a CalculationResult,
    pub breakdown: bool,
}

impl fmt::Display for Quote<'_, '_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", Summary(self.result))?;
        if !self.breakdown {
            return Ok(());
        }

        let price = self.result.input.price;
        write!(f, "\n{}", Breakdown {
            price,
            table: self.calculator.provincial_table(),
        })?;
        if self.result.input.jurisdiction.has_municipal_tax() {
            write!(f, "\n{}", Breakdown {
                price,
                table: self.calculator.municipal_table(),
            })?;
        }
        Ok(())
    }
}

/// Renders the four summary lines shown for a quote.
pub fn render_summary(result: &CalculationResult) -> String {
    Summary(result).to_string()
}

/// Renders how the price was split across the tiers of one table.
pub fn render_breakdown(
    price: Decimal,
    table: &BracketTable<'_>,
) -> String {
    Breakdown { price, table }.to_string()
}

/// Renders a quote, with the per-tier breakdown when `breakdown` is set.
pub fn render_quote(
    calculator: &LandTransferTaxCalculator<'_>,
    result: &CalculationResult,
    breakdown: bool,
) -> String {
    Quote {
        calculator,
        result,
        breakdown,
    }
    .to_string()
}

/// One line of batch output.
#[derive(Debug, Serialize)]
struct ResultRow {
    price: Decimal,
    location: &'static str,
    first_time_buyer: bool,
    provincial_tax: String,
    municipal_tax: String,
    rebate: String,
    total_tax: String,
}

impl From<&CalculationResult> for ResultRow {
    fn from(result: &CalculationResult) -> Self {
        Self {
            price: result.input.price,
            location: result.input.jurisdiction.as_str(),
            first_time_buyer: result.input.first_time_buyer,
            provincial_tax: format_amount(result.provincial_tax),
            municipal_tax: format_amount(result.municipal_tax),
            rebate: format_amount(result.rebate),
            total_tax: format_amount(result.total_tax),
        }
    }
}

/// Writes results as CSV with a header row, in the order given.
pub fn write_csv<W: Write>(
    results: &[CalculationResult],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for result in results {
        wtr.serialize(ResultRow::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}
