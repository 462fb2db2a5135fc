//! Calculator trait used by the aggregation and rating engines

use crate::calculator::{arithmetic, formulas};
use crate::config::RatingConfig;
use crate::types::{Metric, TeamSeason};

/// Trait for the arithmetic the engines perform on team season records
#[cfg_attr(test, mockall::automock)]
pub trait StatCalculator: Send + Sync {
    /// Divide, yielding `Metric::Undefined` on a zero denominator
    fn divide(&self, numerator: f64, denominator: f64) -> Metric;

    fn multiply(&self, a: f64, b: f64) -> f64;

    /// Winning percentage with ties counted as half a win
    fn winning_percentage(&self, team: &TeamSeason) -> Metric;

    /// Pythagorean expectation from the team's current point totals
    fn pythagorean_winning_percentage(&self, team: &TeamSeason) -> Metric;
}

/// Calculator backed by the pure formulas
#[derive(Debug, Clone)]
pub struct StandardCalculator {
    exponent: f64,
}

impl StandardCalculator {
    /// Create a calculator with a custom Pythagorean exponent
    pub fn new(exponent: f64) -> Self {
        Self { exponent }
    }

    pub fn from_config(config: &RatingConfig) -> Self {
        Self::new(config.pythagorean_exponent)
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }
}

impl Default for StandardCalculator {
    fn default() -> Self {
        Self::new(formulas::PYTHAGOREAN_EXPONENT)
    }
}

impl StatCalculator for StandardCalculator {
    fn divide(&self, numerator: f64, denominator: f64) -> Metric {
        arithmetic::divide(numerator, denominator)
    }

    fn multiply(&self, a: f64, b: f64) -> f64 {
        arithmetic::multiply(a, b)
    }

    fn winning_percentage(&self, team: &TeamSeason) -> Metric {
        formulas::winning_percentage(team)
    }

    fn pythagorean_winning_percentage(&self, team: &TeamSeason) -> Metric {
        formulas::pythagorean_winning_percentage(
            f64::from(team.points_for),
            f64::from(team.points_against),
            self.exponent,
        )
    }
}
