//! Progressive marginal bracket engine.
//!
//! A single table-driven walk serves every jurisdiction: the price is fed
//! through the tiers of a [`BracketTable`] from the lowest upward, and each
//! tier taxes only the slice of the price that falls inside its width. The
//! final tier is unbounded and taxes whatever is left.
//!
//! Results are exact (unrounded) decimals. The tax is a continuous,
//! non-decreasing, piecewise-linear function of the price; crossing a
//! threshold changes only the marginal rate.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use ltt_core::ONTARIO;
//! use ltt_core::calculations::{bracket_charges, bracket_tax};
//!
//! // 55,000 × 0.5% + 195,000 × 1.0%
//! assert_eq!(bracket_tax(dec!(250000), &ONTARIO), dec!(2225));
//!
//! let charges = bracket_charges(dec!(250000), &ONTARIO);
//! assert_eq!(charges.len(), 2);
//! assert_eq!(charges[1].taxable, dec!(195000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::BracketTable;
use crate::calculations::common::non_negative;

/// The slice of a price taxed by one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCharge {
    /// Price at which this tier starts.
    pub lower: Decimal,
    /// Price at which this tier ends; `None` for the unbounded tier.
    pub upper: Option<Decimal>,
    pub rate: Decimal,
    /// Portion of the price that falls inside this tier.
    pub taxable: Decimal,
    /// `taxable * rate`
    pub tax: Decimal,
}

/// Splits `price` across the tiers of `table`.
///
/// Returns one [`TierCharge`] per tier the price reaches, in ascending order.
/// A zero price reaches no tier. Negative prices are treated as zero.
pub fn bracket_charges(
    price: Decimal,
    table: &BracketTable<'_>,
) -> Vec<TierCharge> {
    let mut remaining = non_negative(price);
    let mut lower = Decimal::ZERO;
    let mut charges = Vec::new();

    for bracket in table.brackets() {
        if remaining.is_zero() {
            break;
        }

        let taxable = match bracket.width {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        let upper = bracket.width.map(|width| lower + width);

        charges.push(TierCharge {
            lower,
            upper,
            rate: bracket.rate,
            taxable,
            tax: taxable * bracket.rate,
        });

        remaining -= taxable;
        lower += taxable;
    }

    trace!(table = table.name(), %price, tiers = charges.len(), "split price across tiers");
    charges
}

/// Land transfer tax owed on `price` under `table`, unrounded.
///
/// Negative prices are treated as zero; reject them before calling if they
/// indicate bad input.
pub fn bracket_tax(
    price: Decimal,
    table: &BracketTable<'_>,
) -> Decimal {
    bracket_charges(price, table)
        .iter()
        .map(|charge| charge.tax)
        .sum()
}

/// Rate applied to the next dollar above `price`.
///
/// At an exact threshold this is the rate of the tier that starts there.
pub fn marginal_rate(
    price: Decimal,
    table: &BracketTable<'_>,
) -> Decimal {
    let price = non_negative(price);
    let mut upper = Decimal::ZERO;

    for bracket in table.brackets() {
        match bracket.width {
            Some(width) => {
                upper += width;
                if price < upper {
                    return bracket.rate;
                }
            }
            None => return bracket.rate,
        }
    }

    // BracketTable always ends with an unbounded tier.
    Decimal::ZERO
}
