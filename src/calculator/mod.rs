//! Arithmetic and rating formulas
//!
//! Pure functions with no state or I/O. Division never fails: a zero
//! denominator yields [`Metric::Undefined`](crate::types::Metric).

pub mod arithmetic;
pub mod formulas;
pub mod stat_calculator;

// Re-export commonly used items
pub use arithmetic::{add, divide, multiply, subtract};
pub use formulas::{pythagorean_winning_percentage, winning_percentage, PYTHAGOREAN_EXPONENT};
pub use stat_calculator::{StandardCalculator, StatCalculator};
