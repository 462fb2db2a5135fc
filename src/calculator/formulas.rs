//! Win-expectancy formulas over team season records

use crate::calculator::arithmetic::divide;
use crate::types::{Metric, TeamSeason};

/// Exponent used by the Pythagorean expectation
pub const PYTHAGOREAN_EXPONENT: f64 = 2.37;

/// (2 * wins + ties) / (2 * games); ties count as half a win
pub fn winning_percentage(team: &TeamSeason) -> Metric {
    let numerator = 2.0 * f64::from(team.wins) + f64::from(team.ties);
    let denominator = 2.0 * f64::from(team.games);
    divide(numerator, denominator)
}

/// PF^e / (PF^e + PA^e)
///
/// Undefined when a team has neither scored nor allowed a point.
pub fn pythagorean_winning_percentage(points_for: f64, points_against: f64, exponent: f64) -> Metric {
    let scored = points_for.powf(exponent);
    let allowed = points_against.powf(exponent);
    divide(scored, scored + allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::approx_eq;

    fn record(wins: i32, losses: i32, ties: i32) -> TeamSeason {
        let mut team = TeamSeason::new("Team", 2017, "NFL");
        team.wins = wins;
        team.losses = losses;
        team.ties = ties;
        team.games = wins + losses + ties;
        team
    }

    #[test]
    fn test_winning_percentage() {
        assert_eq!(winning_percentage(&record(3, 1, 0)), Metric::Defined(0.75));
        assert_eq!(winning_percentage(&record(1, 1, 2)), Metric::Defined(0.5));
        assert_eq!(winning_percentage(&record(0, 0, 1)), Metric::Defined(0.5));
    }

    #[test]
    fn test_winning_percentage_without_games_is_undefined() {
        assert_eq!(winning_percentage(&record(0, 0, 0)), Metric::Undefined);
    }

    #[test]
    fn test_pythagorean_even_points() {
        let pct = pythagorean_winning_percentage(300.0, 300.0, PYTHAGOREAN_EXPONENT);
        assert_eq!(pct, Metric::Defined(0.5));
    }

    #[test]
    fn test_pythagorean_known_value() {
        // 400^2.37 / (400^2.37 + 300^2.37)
        let pct = pythagorean_winning_percentage(400.0, 300.0, PYTHAGOREAN_EXPONENT)
            .value()
            .unwrap();
        let expected = 1.0 / (1.0 + (300.0f64 / 400.0).powf(PYTHAGOREAN_EXPONENT));
        assert!(approx_eq(pct, expected, 1e-12));
        assert!(pct > 0.66 && pct < 0.67);
    }

    #[test]
    fn test_pythagorean_shutouts() {
        assert_eq!(
            pythagorean_winning_percentage(21.0, 0.0, PYTHAGOREAN_EXPONENT),
            Metric::Defined(1.0)
        );
        assert_eq!(
            pythagorean_winning_percentage(0.0, 21.0, PYTHAGOREAN_EXPONENT),
            Metric::Defined(0.0)
        );
    }

    #[test]
    fn test_pythagorean_without_points_is_undefined() {
        assert_eq!(
            pythagorean_winning_percentage(0.0, 0.0, PYTHAGOREAN_EXPONENT),
            Metric::Undefined
        );
    }
}
