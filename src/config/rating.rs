//! Rating formula configuration

use crate::calculator::PYTHAGOREAN_EXPONENT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Exponent of the Pythagorean expectation
    pub pythagorean_exponent: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            pythagorean_exponent: PYTHAGOREAN_EXPONENT,
        }
    }
}
