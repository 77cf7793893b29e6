//! Land transfer tax calculations.
//!
//! The `bracket_tax` module holds the marginal bracket engine shared by every
//! jurisdiction. The `land_transfer` module layers the provincial and
//! municipal taxes and applies first-time buyer rebates.

pub mod bracket_tax;
pub mod common;
pub mod land_transfer;

pub use bracket_tax::{TierCharge, bracket_charges, bracket_tax, marginal_rate};
pub use land_transfer::{
    LandTransferTaxCalculator, LandTransferTaxError, ONTARIO_REBATE_CAP, RebateCaps,
    TORONTO_REBATE_CAP, calculate,
};
