pub mod calculations;
pub mod models;

pub use calculations::{LandTransferTaxCalculator, LandTransferTaxError, RebateCaps, calculate};
pub use models::*;
