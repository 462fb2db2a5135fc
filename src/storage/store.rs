//! Store trait and the change set it commits

use crate::error::Result;
use crate::types::{
    Game, GameId, LeagueSeasonTotals, ScheduleAverages, ScheduleTotals, SeasonId, TeamSeason,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Change to the game table carried by a commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameChange {
    /// Store a new game; the store assigns its id
    Insert(Game),
    /// Replace the stored game with the same id
    Update(Game),
    Remove(GameId),
}

/// Everything one engine operation writes, applied all-or-nothing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub team_seasons: Vec<TeamSeason>,
    pub game: Option<GameChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.team_seasons.is_empty() && self.game.is_none()
    }
}

/// Trait for the persistence and reporting operations the engines consume
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Get a team's record for a season
    async fn find_team_season(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<TeamSeason>>;

    /// Get every team record of a season
    async fn list_team_seasons(&self, season_id: SeasonId) -> Result<Vec<TeamSeason>>;

    async fn find_game(&self, game_id: GameId) -> Result<Option<Game>>;

    /// Totals of every opponent on a team's schedule
    async fn get_schedule_totals(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<ScheduleTotals>>;

    /// Opponents' average points scored and allowed
    async fn get_schedule_averages(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<ScheduleAverages>>;

    async fn get_league_season_totals(
        &self,
        season_id: SeasonId,
    ) -> Result<Option<LeagueSeasonTotals>>;

    /// Apply a change set atomically.
    ///
    /// Returns the id assigned to an inserted game, if the change set had one.
    async fn commit(&self, changes: ChangeSet) -> Result<Option<GameId>>;
}
