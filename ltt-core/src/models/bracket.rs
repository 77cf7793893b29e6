use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One marginal tier of a bracket table.
///
/// `width` is how much of the price this tier consumes before the next one
/// starts; `None` marks the final, unbounded tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub width: Option<Decimal>,
    pub rate: Decimal,
}

impl Bracket {
    pub const fn bounded(
        width: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            width: Some(width),
            rate,
        }
    }

    pub const fn unbounded(rate: Decimal) -> Self {
        Self { width: None, rate }
    }
}

/// Errors raised when a bracket table is not well formed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table has no tiers")]
    Empty,

    /// A tier before the last one has no width.
    #[error("tier {index} is unbounded but is not the final tier")]
    UnboundedTier { index: usize },

    #[error("tier {index} has a non-positive width")]
    NonPositiveWidth { index: usize },

    #[error("final tier must be unbounded")]
    BoundedFinalTier,

    #[error("tier {index} has rate {rate}, expected a fraction between 0 and 1")]
    RateOutOfRange { index: usize, rate: Decimal },
}

/// An ordered, immutable list of tiers consumed from the lowest upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BracketTable<'a> {
    name: &'a str,
    brackets: &'a [Bracket],
}

impl<'a> BracketTable<'a> {
    /// Builds a table after checking that every tier but the last has a
    /// positive width, the last is unbounded, and all rates lie in `[0, 1]`.
    pub fn new(
        name: &'a str,
        brackets: &'a [Bracket],
    ) -> Result<Self, BracketTableError> {
        let (last, tiers) = brackets.split_last().ok_or(BracketTableError::Empty)?;

        for (index, bracket) in tiers.iter().enumerate() {
            match bracket.width {
                None => return Err(BracketTableError::UnboundedTier { index }),
                Some(width) if width <= Decimal::ZERO => {
                    return Err(BracketTableError::NonPositiveWidth { index });
                }
                Some(_) => {}
            }
        }

        if last.width.is_some() {
            return Err(BracketTableError::BoundedFinalTier);
        }

        if let Some((index, bracket)) = brackets
            .iter()
            .enumerate()
            .find(|(_, b)| b.rate < Decimal::ZERO || b.rate > Decimal::ONE)
        {
            return Err(BracketTableError::RateOutOfRange {
                index,
                rate: bracket.rate,
            });
        }

        Ok(Self { name, brackets })
    }

    /// Skips validation; only for the compile-time tables below.
    const fn from_static(
        name: &'a str,
        brackets: &'a [Bracket],
    ) -> Self {
        Self { name, brackets }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn brackets(&self) -> &'a [Bracket] {
        self.brackets
    }
}

const fn dollars(amount: u32) -> Decimal {
    Decimal::from_parts(amount, 0, 0, false, 0)
}

/// A rate given in tenths of a percent, e.g. `per_mille(15)` is 1.5%.
const fn per_mille(rate: u32) -> Decimal {
    Decimal::from_parts(rate, 0, 0, false, 3)
}

const ONTARIO_BRACKETS: [Bracket; 5] = [
    Bracket::bounded(dollars(55_000), per_mille(5)),
    Bracket::bounded(dollars(195_000), per_mille(10)),
    Bracket::bounded(dollars(150_000), per_mille(15)),
    Bracket::bounded(dollars(1_600_000), per_mille(20)),
    Bracket::unbounded(per_mille(25)),
];

const TORONTO_BRACKETS: [Bracket; 10] = [
    Bracket::bounded(dollars(55_000), per_mille(5)),
    Bracket::bounded(dollars(195_000), per_mille(10)),
    Bracket::bounded(dollars(150_000), per_mille(15)),
    Bracket::bounded(dollars(1_600_000), per_mille(20)),
    Bracket::bounded(dollars(1_000_000), per_mille(25)),
    Bracket::bounded(dollars(1_000_000), per_mille(35)),
    Bracket::bounded(dollars(1_000_000), per_mille(45)),
    Bracket::bounded(dollars(5_000_000), per_mille(55)),
    Bracket::bounded(dollars(10_000_000), per_mille(65)),
    Bracket::unbounded(per_mille(75)),
];

/// Ontario provincial land transfer tax.
///
/// | Portion of price          | Rate |
/// |---------------------------|------|
/// | up to $55,000             | 0.5% |
/// | $55,000 – $250,000        | 1.0% |
/// | $250,000 – $400,000       | 1.5% |
/// | $400,000 – $2,000,000     | 2.0% |
/// | above $2,000,000          | 2.5% |
pub const ONTARIO: BracketTable<'static> = BracketTable::from_static("Ontario", &ONTARIO_BRACKETS);

/// Toronto municipal land transfer tax.
///
/// Shares the first four Ontario tiers, then climbs through the luxury tiers.
///
/// | Portion of price          | Rate |
/// |---------------------------|------|
/// | up to $55,000             | 0.5% |
/// | $55,000 – $250,000        | 1.0% |
/// | $250,000 – $400,000       | 1.5% |
/// | $400,000 – $2,000,000     | 2.0% |
/// | $2,000,000 – $3,000,000   | 2.5% |
/// | $3,000,000 – $4,000,000   | 3.5% |
/// | $4,000,000 – $5,000,000   | 4.5% |
/// | $5,000,000 – $10,000,000  | 5.5% |
/// | $10,000,000 – $20,000,000 | 6.5% |
/// | above $20,000,000         | 7.5% |
pub const TORONTO: BracketTable<'static> = BracketTable::from_static("Toronto", &TORONTO_BRACKETS);
