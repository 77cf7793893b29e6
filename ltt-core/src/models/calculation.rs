use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Jurisdiction;

/// A single quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Purchase price in dollars. Must not be negative.
    pub price: Decimal,
    pub jurisdiction: Jurisdiction,
    pub first_time_buyer: bool,
}

/// Land transfer tax owed for one [`CalculationInput`].
///
/// Amounts are exact and may carry fractions of a cent; round them only for
/// display. `total_tax` is always
/// `provincial_tax + municipal_tax - rebate` and never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub input: CalculationInput,

    /// Ontario land transfer tax before any rebate.
    pub provincial_tax: Decimal,

    /// Toronto municipal land transfer tax before any rebate.
    /// Zero outside Toronto.
    pub municipal_tax: Decimal,

    /// First-time buyer refund of the provincial tax.
    pub provincial_rebate: Decimal,

    /// First-time buyer refund of the municipal tax.
    pub municipal_rebate: Decimal,

    /// Sum of both rebates.
    pub rebate: Decimal,

    /// Net tax payable after rebates.
    pub total_tax: Decimal,
}

impl CalculationResult {
    /// Tax before rebates across both layers.
    pub fn gross_tax(&self) -> Decimal {
        self.provincial_tax + self.municipal_tax
    }
}
