//! Mock store for testing
//!
//! Wraps [`InMemoryStatsStore`], records committed change sets, lets tests
//! replace the reporting collaborator's answers and can fail the next commit.

use crate::error::{Result, StatsError};
use crate::storage::memory::InMemoryStatsStore;
use crate::storage::store::{ChangeSet, StatsStore};
use crate::types::{
    Game, GameId, LeagueSeasonTotals, ScheduleAverages, ScheduleTotals, SeasonId, TeamSeason,
    TeamSeasonKey,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MockStatsStore {
    inner: InMemoryStatsStore,
    commit_calls: RwLock<Vec<ChangeSet>>,
    fail_next_commit: AtomicBool,
    schedule_totals: RwLock<HashMap<TeamSeasonKey, Option<ScheduleTotals>>>,
    schedule_averages: RwLock<HashMap<TeamSeasonKey, Option<ScheduleAverages>>>,
    league_totals: RwLock<HashMap<SeasonId, Option<LeagueSeasonTotals>>>,
}

impl MockStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for seeding and inspection
    pub fn inner(&self) -> &InMemoryStatsStore {
        &self.inner
    }

    /// Get all successful commits (for testing)
    pub fn get_commit_calls(&self) -> Vec<ChangeSet> {
        self.commit_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn clear_commit_calls(&self) {
        if let Ok(mut calls) = self.commit_calls.write() {
            calls.clear();
        }
    }

    /// Make the next commit fail without writing anything
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Override the schedule totals reported for a team; `None` means no data
    pub fn preset_schedule_totals(
        &self,
        team_name: &str,
        season_id: SeasonId,
        totals: Option<ScheduleTotals>,
    ) {
        if let Ok(mut presets) = self.schedule_totals.write() {
            presets.insert(TeamSeasonKey::new(team_name, season_id), totals);
        }
    }

    pub fn preset_schedule_averages(
        &self,
        team_name: &str,
        season_id: SeasonId,
        averages: Option<ScheduleAverages>,
    ) {
        if let Ok(mut presets) = self.schedule_averages.write() {
            presets.insert(TeamSeasonKey::new(team_name, season_id), averages);
        }
    }

    pub fn preset_league_totals(&self, season_id: SeasonId, totals: Option<LeagueSeasonTotals>) {
        if let Ok(mut presets) = self.league_totals.write() {
            presets.insert(season_id, totals);
        }
    }

    fn preset<K, V>(presets: &RwLock<HashMap<K, Option<V>>>, key: &K) -> Option<Option<V>>
    where
        K: std::hash::Hash + Eq,
        V: Clone,
    {
        presets
            .read()
            .ok()
            .and_then(|presets| presets.get(key).cloned())
    }
}

#[async_trait]
impl StatsStore for MockStatsStore {
    async fn find_team_season(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<TeamSeason>> {
        self.inner.find_team_season(team_name, season_id).await
    }

    async fn list_team_seasons(&self, season_id: SeasonId) -> Result<Vec<TeamSeason>> {
        self.inner.list_team_seasons(season_id).await
    }

    async fn find_game(&self, game_id: GameId) -> Result<Option<Game>> {
        self.inner.find_game(game_id).await
    }

    async fn get_schedule_totals(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<ScheduleTotals>> {
        let key = TeamSeasonKey::new(team_name, season_id);
        match Self::preset(&self.schedule_totals, &key) {
            Some(totals) => Ok(totals),
            None => self.inner.get_schedule_totals(team_name, season_id).await,
        }
    }

    async fn get_schedule_averages(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<Option<ScheduleAverages>> {
        let key = TeamSeasonKey::new(team_name, season_id);
        match Self::preset(&self.schedule_averages, &key) {
            Some(averages) => Ok(averages),
            None => self.inner.get_schedule_averages(team_name, season_id).await,
        }
    }

    async fn get_league_season_totals(
        &self,
        season_id: SeasonId,
    ) -> Result<Option<LeagueSeasonTotals>> {
        match Self::preset(&self.league_totals, &season_id) {
            Some(totals) => Ok(totals),
            None => self.inner.get_league_season_totals(season_id).await,
        }
    }

    async fn commit(&self, changes: ChangeSet) -> Result<Option<GameId>> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StatsError::CommitFailed {
                message: "injected commit failure".to_string(),
            }
            .into());
        }

        let recorded = changes.clone();
        let game_id = self.inner.commit(changes).await?;
        if let Ok(mut calls) = self.commit_calls.write() {
            calls.push(recorded);
        }
        Ok(game_id)
    }
}
