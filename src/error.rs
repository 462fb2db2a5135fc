//! Error types for the season ledger
//!
//! Public operations return `anyhow::Result`; the variants below are the
//! conditions callers are expected to tell apart.

use crate::types::{GameId, SeasonId};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ledger scenarios
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: GameId },

    #[error("Team season not found: {team_name} ({season_id})")]
    TeamSeasonNotFound {
        team_name: String,
        season_id: SeasonId,
    },

    #[error("League season not found: {season_id}")]
    LeagueSeasonNotFound { season_id: SeasonId },

    #[error("Invalid game: {reason}")]
    InvalidGame { reason: String },

    #[error("Commit failed: {message}")]
    CommitFailed { message: String },

    #[error("Arithmetic overflow: {a} {operation} {b}")]
    ArithmeticOverflow {
        operation: &'static str,
        a: i32,
        b: i32,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl StatsError {
    /// True for the variants that mean a referenced key does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StatsError::GameNotFound { .. }
                | StatsError::TeamSeasonNotFound { .. }
                | StatsError::LeagueSeasonNotFound { .. }
        )
    }

    /// Classify an `anyhow::Error` produced by this crate
    pub fn is_not_found_error(error: &anyhow::Error) -> bool {
        error
            .downcast_ref::<StatsError>()
            .map(StatsError::is_not_found)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err: anyhow::Error = StatsError::GameNotFound { game_id: 7 }.into();
        assert!(StatsError::is_not_found_error(&err));

        let err: anyhow::Error = StatsError::InvalidGame {
            reason: "guest and host are the same team".to_string(),
        }
        .into();
        assert!(!StatsError::is_not_found_error(&err));

        let err = anyhow::anyhow!("some other failure");
        assert!(!StatsError::is_not_found_error(&err));
    }

    #[test]
    fn test_error_messages() {
        let err = StatsError::TeamSeasonNotFound {
            team_name: "Chicago Cardinals".to_string(),
            season_id: 1925,
        };
        assert_eq!(
            err.to_string(),
            "Team season not found: Chicago Cardinals (1925)"
        );
    }
}
