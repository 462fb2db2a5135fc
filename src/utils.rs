//! Utility functions for the season ledger

use crate::types::{Game, SeasonId};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Distinct seasons appearing in a list of games, in ascending order
pub fn seasons_of(games: &[Game]) -> Vec<SeasonId> {
    games
        .iter()
        .map(|game| game.season_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Compare two floats with an absolute tolerance
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seasons_of() {
        let games = vec![
            Game::new(2018, 1, "A", 1, "B", 0),
            Game::new(2017, 1, "A", 1, "B", 0),
            Game::new(2018, 2, "B", 1, "A", 0),
        ];
        assert_eq!(seasons_of(&games), vec![2017, 2018]);
        assert!(seasons_of(&[]).is_empty());
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(0.1 + 0.2, 0.3, 1e-12));
        assert!(!approx_eq(0.5, 0.6, 0.01));
    }
}
