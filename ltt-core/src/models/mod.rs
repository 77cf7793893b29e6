mod bracket;
mod calculation;
mod jurisdiction;

pub use bracket::{Bracket, BracketTable, BracketTableError, ONTARIO, TORONTO};
pub use calculation::{CalculationInput, CalculationResult};
pub use jurisdiction::Jurisdiction;
