//! In-memory store implementation
//!
//! Holds games and team season records behind a single lock and derives the
//! schedule and league reports from them.

use crate::calculator::{add, divide};
use crate::error::{Result, StatsError};
use crate::storage::store::{ChangeSet, GameChange, StatsStore};
use crate::types::{
    Game, GameId, LeagueSeasonTotals, ScheduleAverages, ScheduleTotals, SeasonId, TeamSeason,
    TeamSeasonKey,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    games: BTreeMap<GameId, Game>,
    team_seasons: HashMap<TeamSeasonKey, TeamSeason>,
    last_game_id: GameId,
}

impl StoreState {
    fn schedule_totals(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<ScheduleTotals>> {
        if !self
            .team_seasons
            .contains_key(&TeamSeasonKey::new(team_name, season_id))
        {
            return Ok(None);
        }

        let mut totals = ScheduleTotals::default();
        for game in self.games.values().filter(|g| g.season_id == season_id) {
            let opponent = if game.guest_name == team_name {
                &game.host_name
            } else if game.host_name == team_name {
                &game.guest_name
            } else {
                continue;
            };

            // One entry per meeting, so a twice-faced opponent counts twice
            if let Some(opponent) = self
                .team_seasons
                .get(&TeamSeasonKey::new(opponent.as_str(), season_id))
            {
                totals.schedule_games = add(totals.schedule_games, opponent.games)?;
                totals.schedule_points_for =
                    add(totals.schedule_points_for, opponent.points_for)?;
                totals.schedule_points_against =
                    add(totals.schedule_points_against, opponent.points_against)?;
            }
        }

        Ok(Some(totals))
    }

    fn league_totals(&self, season_id: SeasonId) -> Result<Option<LeagueSeasonTotals>> {
        let mut seasons = self
            .team_seasons
            .values()
            .filter(|ts| ts.season_id == season_id)
            .peekable();
        if seasons.peek().is_none() {
            return Ok(None);
        }

        let (mut total_games, mut total_points) = (0, 0);
        for ts in seasons {
            total_games = add(total_games, ts.games)?;
            total_points = add(total_points, ts.points_for)?;
        }

        Ok(Some(LeagueSeasonTotals {
            season_id,
            total_games,
            total_points,
            average_points: divide(f64::from(total_points), f64::from(total_games)),
        }))
    }

    /// Check a change set can be applied in full before touching anything
    fn validate(&self, changes: &ChangeSet) -> Result<()> {
        for team_season in &changes.team_seasons {
            if !self.team_seasons.contains_key(&team_season.key()) {
                return Err(StatsError::CommitFailed {
                    message: format!("unknown team season {}", team_season.key()),
                }
                .into());
            }
        }

        match &changes.game {
            Some(GameChange::Update(game)) => {
                let game_id = game.id.ok_or_else(|| StatsError::CommitFailed {
                    message: "cannot update a game without an id".to_string(),
                })?;
                if !self.games.contains_key(&game_id) {
                    return Err(StatsError::GameNotFound { game_id }.into());
                }
            }
            Some(GameChange::Remove(game_id)) => {
                if !self.games.contains_key(game_id) {
                    return Err(StatsError::GameNotFound { game_id: *game_id }.into());
                }
            }
            Some(GameChange::Insert(_)) | None => {}
        }

        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct InMemoryStatsStore {
    state: RwLock<StoreState>,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| {
            StatsError::InternalError {
                message: "Failed to acquire store read lock".to_string(),
            }
            .into()
        })
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| {
            StatsError::InternalError {
                message: "Failed to acquire store write lock".to_string(),
            }
            .into()
        })
    }

    /// Seed or replace a team season record
    pub fn insert_team_season(&self, team_season: TeamSeason) -> Result<()> {
        let mut state = self.write_state()?;
        state.team_seasons.insert(team_season.key(), team_season);
        Ok(())
    }

    pub fn insert_team_seasons<I>(&self, team_seasons: I) -> Result<()>
    where
        I: IntoIterator<Item = TeamSeason>,
    {
        let mut state = self.write_state()?;
        for team_season in team_seasons {
            state.team_seasons.insert(team_season.key(), team_season);
        }
        Ok(())
    }

    pub fn game_count(&self) -> Result<usize> {
        Ok(self.read_state()?.games.len())
    }
}

#[async_trait]
impl StatsStore for InMemoryStatsStore {
    async fn find_team_season(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<TeamSeason>> {
        let state = self.read_state()?;
        Ok(state
            .team_seasons
            .get(&TeamSeasonKey::new(team_name, season_id))
            .cloned())
    }

    async fn list_team_seasons(&self, season_id: SeasonId) -> Result<Vec<TeamSeason>> {
        let state = self.read_state()?;
        let mut team_seasons: Vec<TeamSeason> = state
            .team_seasons
            .values()
            .filter(|ts| ts.season_id == season_id)
            .cloned()
            .collect();
        team_seasons.sort_by(|a, b| a.team_name.cmp(&b.team_name));
        Ok(team_seasons)
    }

    async fn find_game(&self, game_id: GameId) -> Result<Option<Game>> {
        let state = self.read_state()?;
        Ok(state.games.get(&game_id).cloned())
    }

    async fn get_schedule_totals(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<ScheduleTotals>> {
        let state = self.read_state()?;
        state.schedule_totals(team_name, season_id)
    }

    async fn get_schedule_averages(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<ScheduleAverages>> {
        let state = self.read_state()?;
        let averages = state.schedule_totals(team_name, season_id)?.and_then(|totals| {
            let games = f64::from(totals.schedule_games);
            Some(ScheduleAverages {
                points_for: divide(f64::from(totals.schedule_points_for), games).value()?,
                points_against: divide(f64::from(totals.schedule_points_against), games)
                    .value()?,
            })
        });
        Ok(averages)
    }

    async fn get_league_season_totals(
        &self,
        season_id: SeasonId,
    ) -> Result<Option<LeagueSeasonTotals>> {
        let state = self.read_state()?;
        state.league_totals(season_id)
    }

    async fn commit(&self, changes: ChangeSet) -> Result<Option<GameId>> {
        let mut state = self.write_state()?;
        state.validate(&changes)?;

        let touched = changes.team_seasons.len();
        for team_season in changes.team_seasons {
            state.team_seasons.insert(team_season.key(), team_season);
        }

        let inserted = match changes.game {
            Some(GameChange::Insert(mut game)) => {
                state.last_game_id += 1;
                let game_id = state.last_game_id;
                game.id = Some(game_id);
                state.games.insert(game_id, game);
                Some(game_id)
            }
            Some(GameChange::Update(game)) => {
                if let Some(game_id) = game.id {
                    state.games.insert(game_id, game);
                }
                None
            }
            Some(GameChange::Remove(game_id)) => {
                state.games.remove(&game_id);
                None
            }
            None => None,
        };

        debug!(
            "In-memory commit: {} team season(s), inserted game {:?}",
            touched, inserted
        );
        Ok(inserted)
    }
}
