//! Land transfer tax aggregation for Ontario purchases.
//!
//! Combines the provincial layer (always charged) with the Toronto municipal
//! layer (charged only inside Toronto) and applies the first-time buyer
//! refunds.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Provincial tax: Ontario brackets applied to the price |
//! | 2    | Municipal tax: Toronto brackets applied to the price, or 0 outside Toronto |
//! | 3    | Provincial rebate: smaller of Step 1 or $4,000 (first-time buyers only) |
//! | 4    | Municipal rebate: smaller of Step 2 or $4,475 (first-time buyers in Toronto only) |
//! | 5    | Rebate: Step 3 + Step 4 |
//! | 6    | Total tax: (Step 1 - Step 3) + (Step 2 - Step 4) |
//!
//! Amounts are exact. Rounding to cents is left to presentation.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use ltt_core::{Jurisdiction, calculate};
//!
//! let result = calculate(dec!(400000), Jurisdiction::Toronto, true).unwrap();
//!
//! assert_eq!(result.provincial_tax, dec!(4475.00));
//! assert_eq!(result.municipal_tax, dec!(4475.00));
//! assert_eq!(result.rebate, dec!(8475.00));
//! assert_eq!(result.total_tax, dec!(475.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::bracket_tax::bracket_tax;
use crate::{BracketTable, CalculationInput, CalculationResult, Jurisdiction, ONTARIO, TORONTO};

/// Maximum first-time buyer refund of the Ontario tax.
pub const ONTARIO_REBATE_CAP: Decimal = Decimal::from_parts(4_000, 0, 0, false, 0);

/// Maximum first-time buyer refund of the Toronto tax.
pub const TORONTO_REBATE_CAP: Decimal = Decimal::from_parts(4_475, 0, 0, false, 0);

/// Errors that can occur during land transfer tax calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LandTransferTaxError {
    /// The purchase price was negative.
    #[error("purchase price must not be negative, got {0}")]
    InvalidPrice(Decimal),

    /// A rebate cap was negative.
    #[error("rebate cap must not be negative, got {0}")]
    NegativeRebateCap(Decimal),
}

/// Upper limits on the first-time buyer refund for each layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebateCaps {
    pub provincial: Decimal,
    pub municipal: Decimal,
}

impl Default for RebateCaps {
    fn default() -> Self {
        Self {
            provincial: ONTARIO_REBATE_CAP,
            municipal: TORONTO_REBATE_CAP,
        }
    }
}

/// Calculator for provincial and municipal land transfer tax.
///
/// Holds only borrowed, immutable tables, so one instance can be shared
/// freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct LandTransferTaxCalculator<'a> {
    provincial: BracketTable<'a>,
    municipal: BracketTable<'a>,
    rebate_caps: RebateCaps,
}

impl LandTransferTaxCalculator<'static> {
    /// Creates a calculator using the current Ontario and Toronto schedules.
    pub fn new() -> Self {
        Self {
            provincial: ONTARIO,
            municipal: TORONTO,
            rebate_caps: RebateCaps::default(),
        }
    }
}

impl Default for LandTransferTaxCalculator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LandTransferTaxCalculator<'a> {
    /// Creates a calculator with custom schedules and rebate caps.
    ///
    /// # Errors
    ///
    /// Returns [`LandTransferTaxError::NegativeRebateCap`] if either cap is negative.
    pub fn with_tables(
        provincial: BracketTable<'a>,
        municipal: BracketTable<'a>,
        rebate_caps: RebateCaps,
    ) -> Result<Self, LandTransferTaxError> {
        for cap in [rebate_caps.provincial, rebate_caps.municipal] {
            if cap < Decimal::ZERO {
                return Err(LandTransferTaxError::NegativeRebateCap(cap));
            }
        }

        Ok(Self {
            provincial,
            municipal,
            rebate_caps,
        })
    }

    pub fn provincial_table(&self) -> &BracketTable<'a> {
        &self.provincial
    }

    pub fn municipal_table(&self) -> &BracketTable<'a> {
        &self.municipal
    }

    pub fn rebate_caps(&self) -> RebateCaps {
        self.rebate_caps
    }

    /// Calculates tax, rebates and the net total for one purchase.
    ///
    /// # Errors
    ///
    /// Returns [`LandTransferTaxError::InvalidPrice`] if the price is negative.
    pub fn calculate(
        &self,
        input: &CalculationInput,
    ) -> Result<CalculationResult, LandTransferTaxError> {
        if input.price < Decimal::ZERO {
            warn!(price = %input.price, "rejected negative purchase price");
            return Err(LandTransferTaxError::InvalidPrice(input.price));
        }

        let provincial_tax = self.provincial_tax(input.price);
        let municipal_tax = self.municipal_tax(input.price, input.jurisdiction);

        let provincial_rebate = self.provincial_rebate(provincial_tax, input.first_time_buyer);
        let municipal_rebate =
            self.municipal_rebate(municipal_tax, input.jurisdiction, input.first_time_buyer);

        let total_tax = self.total_tax(
            provincial_tax,
            provincial_rebate,
            municipal_tax,
            municipal_rebate,
        );

        debug!(
            price = %input.price,
            jurisdiction = %input.jurisdiction,
            first_time_buyer = input.first_time_buyer,
            %provincial_tax,
            %municipal_tax,
            %total_tax,
            "calculated land transfer tax"
        );

        Ok(CalculationResult {
            input: *input,
            provincial_tax,
            municipal_tax,
            provincial_rebate,
            municipal_rebate,
            rebate: provincial_rebate + municipal_rebate,
            total_tax,
        })
    }

    /// Calculates the provincial layer (Step 1).
    fn provincial_tax(
        &self,
        price: Decimal,
    ) -> Decimal {
        bracket_tax(price, &self.provincial)
    }

    /// Calculates the municipal layer (Step 2).
    fn municipal_tax(
        &self,
        price: Decimal,
        jurisdiction: Jurisdiction,
    ) -> Decimal {
        if jurisdiction.has_municipal_tax() {
            bracket_tax(price, &self.municipal)
        } else {
            Decimal::ZERO
        }
    }

    /// Calculates the provincial refund (Step 3).
    fn provincial_rebate(
        &self,
        provincial_tax: Decimal,
        first_time_buyer: bool,
    ) -> Decimal {
        if first_time_buyer {
            provincial_tax.min(self.rebate_caps.provincial)
        } else {
            Decimal::ZERO
        }
    }

    /// Calculates the municipal refund (Step 4).
    fn municipal_rebate(
        &self,
        municipal_tax: Decimal,
        jurisdiction: Jurisdiction,
        first_time_buyer: bool,
    ) -> Decimal {
        if first_time_buyer && jurisdiction.has_municipal_tax() {
            municipal_tax.min(self.rebate_caps.municipal)
        } else {
            Decimal::ZERO
        }
    }

    /// Calculates the net total (Step 6).
    fn total_tax(
        &self,
        provincial_tax: Decimal,
        provincial_rebate: Decimal,
        municipal_tax: Decimal,
        municipal_rebate: Decimal,
    ) -> Decimal {
        (provincial_tax - provincial_rebate) + (municipal_tax - municipal_rebate)
    }
}

/// Calculates land transfer tax with the current Ontario and Toronto schedules.
///
/// # Errors
///
/// Returns [`LandTransferTaxError::InvalidPrice`] if `price` is negative.
pub fn calculate(
    price: Decimal,
    jurisdiction: Jurisdiction,
    first_time_buyer: bool,
) -> Result<CalculationResult, LandTransferTaxError> {
    LandTransferTaxCalculator::new().calculate(&CalculationInput {
        price,
        jurisdiction,
        first_time_buyer,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::Bracket;

    fn input(
        price: Decimal,
        jurisdiction: Jurisdiction,
        first_time_buyer: bool,
    ) -> CalculationInput {
        CalculationInput {
            price,
            jurisdiction,
            first_time_buyer,
        }
    }

    /// Initializes tracing subscriber for tests that verify log output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // provincial_tax / municipal_tax tests
    // =========================================================================

    #[test]
    fn provincial_tax_keeps_sub_cent_fractions() {
        let calculator = LandTransferTaxCalculator::new();

        // 54999.99 × 0.005 = 274.99995
        let result = calculator.provincial_tax(dec!(54999.99));

        assert_eq!(result, dec!(274.99995));
    }

    #[test]
    fn municipal_tax_zero_outside_toronto() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator.municipal_tax(dec!(1000000), Jurisdiction::Default);

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn municipal_tax_charged_in_toronto() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator.municipal_tax(dec!(1000000), Jurisdiction::Toronto);

        // 4475 + 600000 × 0.02
        assert_eq!(result, dec!(16475.00));
    }

    // =========================================================================
    // provincial_rebate / municipal_rebate tests
    // =========================================================================

    #[test]
    fn provincial_rebate_zero_for_repeat_buyer() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator.provincial_rebate(dec!(4475.00), false);

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn provincial_rebate_capped_at_4000() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator.provincial_rebate(dec!(4475.00), true);

        assert_eq!(result, dec!(4000));
    }

    #[test]
    fn provincial_rebate_covers_small_tax_in_full() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator.provincial_rebate(dec!(725.00), true);

        assert_eq!(result, dec!(725.00));
    }

    #[test]
    fn municipal_rebate_capped_at_4475() {
        let calculator = LandTransferTaxCalculator::new();

        let result =
            calculator.municipal_rebate(dec!(16475.00), Jurisdiction::Toronto, true);

        assert_eq!(result, dec!(4475));
    }

    #[test]
    fn municipal_rebate_zero_outside_toronto() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator.municipal_rebate(dec!(16475.00), Jurisdiction::Default, true);

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn municipal_rebate_zero_for_repeat_buyer() {
        let calculator = LandTransferTaxCalculator::new();

        let result =
            calculator.municipal_rebate(dec!(16475.00), Jurisdiction::Toronto, false);

        assert_eq!(result, dec!(0));
    }

    // =========================================================================
    // total_tax tests
    // =========================================================================

    #[test]
    fn total_tax_subtracts_both_rebates() {
        let calculator = LandTransferTaxCalculator::new();

        let result =
            calculator.total_tax(dec!(4475.00), dec!(4000), dec!(4475.00), dec!(4475));

        assert_eq!(result, dec!(475.00));
    }

    // =========================================================================
    // calculate (integration) tests
    // =========================================================================

    #[test]
    fn calculate_zero_price() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator
            .calculate(&input(dec!(0), Jurisdiction::Toronto, true))
            .unwrap();

        assert_eq!(result.provincial_tax, dec!(0));
        assert_eq!(result.municipal_tax, dec!(0));
        assert_eq!(result.rebate, dec!(0));
        assert_eq!(result.total_tax, dec!(0));
    }

    #[test]
    fn calculate_rejects_negative_price() {
        let _guard = init_test_tracing();
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator.calculate(&input(dec!(-1), Jurisdiction::Default, false));

        assert_eq!(result, Err(LandTransferTaxError::InvalidPrice(dec!(-1))));
    }

    #[test]
    fn calculate_outside_toronto_has_no_municipal_layer() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator
            .calculate(&input(dec!(250000), Jurisdiction::Default, false))
            .unwrap();

        assert_eq!(result.provincial_tax, dec!(2225.00));
        assert_eq!(result.municipal_tax, dec!(0));
        assert_eq!(result.total_tax, dec!(2225.00));
    }

    #[test]
    fn calculate_first_time_buyer_outside_toronto() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator
            .calculate(&input(dec!(500000), Jurisdiction::Default, true))
            .unwrap();

        // 4475 + 100000 × 0.02 = 6475, less 4000
        assert_eq!(result.provincial_tax, dec!(6475.00));
        assert_eq!(result.provincial_rebate, dec!(4000));
        assert_eq!(result.municipal_rebate, dec!(0));
        assert_eq!(result.total_tax, dec!(2475.00));
    }

    #[test]
    fn calculate_first_time_buyer_pays_nothing_on_cheap_home() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator
            .calculate(&input(dec!(100000), Jurisdiction::Toronto, true))
            .unwrap();

        // 275 + 45000 × 0.01 = 725 per layer, fully refunded
        assert_eq!(result.provincial_tax, dec!(725.00));
        assert_eq!(result.municipal_tax, dec!(725.00));
        assert_eq!(result.rebate, dec!(1450.00));
        assert_eq!(result.total_tax, dec!(0));
    }

    #[test]
    fn calculate_total_matches_unrounded_layers() {
        let calculator = LandTransferTaxCalculator::new();

        // 1 × 0.005 = 0.005 on each layer
        let result = calculator
            .calculate(&input(dec!(1), Jurisdiction::Toronto, false))
            .unwrap();

        assert_eq!(result.provincial_tax, dec!(0.005));
        assert_eq!(result.municipal_tax, dec!(0.005));
        assert_eq!(
            result.total_tax,
            bracket_tax(dec!(1), &ONTARIO) + bracket_tax(dec!(1), &TORONTO)
        );
        assert_eq!(result.total_tax, dec!(0.010));
    }

    #[test]
    fn calculate_first_time_buyer_refund_covers_sub_cent_tax() {
        let calculator = LandTransferTaxCalculator::new();

        let result = calculator
            .calculate(&input(dec!(1), Jurisdiction::Toronto, true))
            .unwrap();

        assert_eq!(result.rebate, dec!(0.010));
        assert_eq!(result.total_tax, dec!(0));
    }

    #[test]
    fn calculate_echoes_input() {
        let calculator = LandTransferTaxCalculator::new();
        let request = input(dec!(650000), Jurisdiction::Toronto, false);

        let result = calculator.calculate(&request).unwrap();

        assert_eq!(result.input, request);
        assert_eq!(result.gross_tax(), result.total_tax);
    }

    #[test]
    fn calculate_total_never_negative() {
        let calculator = LandTransferTaxCalculator::new();

        for price in [dec!(0), dec!(1), dec!(55000), dec!(368000), dec!(400000), dec!(3000000)] {
            for jurisdiction in [Jurisdiction::Default, Jurisdiction::Toronto] {
                for first_time_buyer in [false, true] {
                    let result = calculator
                        .calculate(&input(price, jurisdiction, first_time_buyer))
                        .unwrap();

                    assert!(result.total_tax >= Decimal::ZERO);
                    assert!(result.rebate <= result.gross_tax());
                    assert_eq!(result.total_tax, result.gross_tax() - result.rebate);
                }
            }
        }
    }

    // =========================================================================
    // with_tables tests
    // =========================================================================

    #[test]
    fn with_tables_rejects_negative_cap() {
        let caps = RebateCaps {
            provincial: dec!(-1),
            municipal: dec!(4475),
        };

        let result = LandTransferTaxCalculator::with_tables(ONTARIO, TORONTO, caps);

        assert_eq!(
            result.map(|c| c.rebate_caps()),
            Err(LandTransferTaxError::NegativeRebateCap(dec!(-1)))
        );
    }

    #[test]
    fn with_tables_uses_custom_schedule_and_caps() {
        let flat = [Bracket::unbounded(dec!(0.01))];
        let table = BracketTable::new("flat", &flat).unwrap();
        let caps = RebateCaps {
            provincial: dec!(100),
            municipal: dec!(0),
        };
        let calculator = LandTransferTaxCalculator::with_tables(table, table, caps).unwrap();

        let result = calculator
            .calculate(&input(dec!(50000), Jurisdiction::Toronto, true))
            .unwrap();

        assert_eq!(result.provincial_tax, dec!(500.00));
        assert_eq!(result.municipal_tax, dec!(500.00));
        assert_eq!(result.rebate, dec!(100));
        assert_eq!(result.total_tax, dec!(900.00));
        assert_eq!(calculator.provincial_table().name(), "flat");
    }

    #[test]
    fn default_calculator_uses_current_schedules() {
        let calculator = LandTransferTaxCalculator::default();

        assert_eq!(calculator.provincial_table().name(), "Ontario");
        assert_eq!(calculator.municipal_table().name(), "Toronto");
        assert_eq!(calculator.rebate_caps(), RebateCaps::default());
    }
}
