//! Game lifecycle controller
//!
//! Add, delete and edit games. Each operation stages the game change and the
//! aggregate changes in one unit of work and commits them together, so a
//! failure anywhere leaves the store as it was.

use crate::calculator::StatCalculator;
use crate::direction::Direction;
use crate::engine::aggregation::GameAggregator;
use crate::error::{Result, StatsError};
use crate::metrics::MetricsCollector;
use crate::storage::{StatsStore, UnitOfWork};
use crate::types::{Game, GameId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Clone)]
pub struct GameLifecycle {
    store: Arc<dyn StatsStore>,
    aggregator: GameAggregator,
    metrics: Option<Arc<MetricsCollector>>,
}

impl GameLifecycle {
    pub fn new(store: Arc<dyn StatsStore>, calculator: Arc<dyn StatCalculator>) -> Self {
        Self {
            store,
            aggregator: GameAggregator::new(calculator),
            metrics: None,
        }
    }

    /// Record operation counts and durations in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Apply a new game to its participants and store it
    pub async fn add_game(&self, game: Game) -> Result<GameId> {
        let start = Instant::now();
        let result = self.try_add_game(game).await;
        self.record_operation("add", result.is_ok(), start.elapsed());
        result
    }

    /// Reverse a stored game's effect and remove it; returns the removed game
    pub async fn delete_game(&self, game_id: GameId) -> Result<Game> {
        let start = Instant::now();
        let result = self.try_delete_game(game_id).await;
        self.record_operation("delete", result.is_ok(), start.elapsed());
        result
    }

    /// Replace `old` with `new`: reverse the old result, then apply the new one.
    ///
    /// `old` must be the stored game, id included; `new` takes the same id.
    pub async fn edit_game(&self, old: &Game, new: Game) -> Result<()> {
        let start = Instant::now();
        let result = self.try_edit_game(old, new).await;
        self.record_operation("edit", result.is_ok(), start.elapsed());
        result
    }

    /// Edit using the stored version of `new.id` as the prior game
    pub async fn update_game(&self, new: Game) -> Result<()> {
        let game_id = new.id.ok_or_else(|| StatsError::InvalidGame {
            reason: "game to update has no id".to_string(),
        })?;
        let old = self
            .store
            .find_game(game_id)
            .await?
            .ok_or(StatsError::GameNotFound { game_id })?;
        self.edit_game(&old, new).await
    }

    async fn try_add_game(&self, mut game: Game) -> Result<GameId> {
        game.validate()?;
        game.id = None;

        let mut uow = UnitOfWork::new(self.store.as_ref());
        self.aggregate(&mut uow, &game, Direction::Apply).await?;

        let summary = format!(
            "{} {} @ {} {} (season {}, week {})",
            game.guest_name,
            game.guest_score,
            game.host_name,
            game.host_score,
            game.season_id,
            game.week
        );
        uow.insert_game(game);

        let game_id = self
            .commit(uow)
            .await?
            .ok_or_else(|| StatsError::InternalError {
                message: "store did not assign an id to the new game".to_string(),
            })?;

        info!("Added game {}: {}", game_id, summary);
        Ok(game_id)
    }

    async fn try_delete_game(&self, game_id: GameId) -> Result<Game> {
        let game = self
            .store
            .find_game(game_id)
            .await?
            .ok_or(StatsError::GameNotFound { game_id })?;

        let mut uow = UnitOfWork::new(self.store.as_ref());
        self.aggregate(&mut uow, &game, Direction::Reverse).await?;
        uow.remove_game(game_id);
        self.commit(uow).await?;

        info!(
            "Deleted game {}: {} @ {} (season {}, week {})",
            game_id, game.guest_name, game.host_name, game.season_id, game.week
        );
        Ok(game)
    }

    async fn try_edit_game(&self, old: &Game, mut new: Game) -> Result<()> {
        let game_id = old.id.ok_or_else(|| StatsError::InvalidGame {
            reason: "game to edit has no id".to_string(),
        })?;
        if let Some(new_id) = new.id {
            if new_id != game_id {
                return Err(StatsError::InvalidGame {
                    reason: format!("cannot replace game {} with game {}", game_id, new_id),
                }
                .into());
            }
        }
        new.id = Some(game_id);
        old.validate()?;
        new.validate()?;

        let stored = self
            .store
            .find_game(game_id)
            .await?
            .ok_or(StatsError::GameNotFound { game_id })?;
        // Only the stored version may be reversed
        if *old != stored {
            return Err(StatsError::InvalidGame {
                reason: format!("game {} does not match the stored version", game_id),
            }
            .into());
        }

        // The reversal must be fully staged before the new result is read
        let mut uow = UnitOfWork::new(self.store.as_ref());
        self.aggregate(&mut uow, &stored, Direction::Reverse).await?;
        self.aggregate(&mut uow, &new, Direction::Apply).await?;
        uow.update_game(new);
        self.commit(uow).await?;

        info!("Edited game {}", game_id);
        Ok(())
    }

    async fn aggregate(
        &self,
        uow: &mut UnitOfWork<'_>,
        game: &Game,
        direction: Direction,
    ) -> Result<()> {
        self.aggregator.process(uow, game, direction).await?;
        if let Some(metrics) = &self.metrics {
            metrics.record_aggregate_update(direction);
        }
        Ok(())
    }

    async fn commit(&self, uow: UnitOfWork<'_>) -> Result<Option<GameId>> {
        match uow.commit().await {
            Ok(game_id) => Ok(game_id),
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_commit_failure();
                }
                Err(e)
            }
        }
    }

    fn record_operation(&self, operation: &str, success: bool, duration: Duration) {
        if !success {
            error!("Game {} failed after {:?}", operation, duration);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_game_operation(operation, success, duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::StandardCalculator;
    use crate::storage::MockStatsStore;
    use crate::types::TeamSeason;

    fn setup() -> (Arc<MockStatsStore>, GameLifecycle) {
        let store = Arc::new(MockStatsStore::new());
        store
            .inner()
            .insert_team_seasons(vec![
                TeamSeason::new("Guest", 2017, "NFL"),
                TeamSeason::new("Host", 2017, "NFL"),
            ])
            .unwrap();
        let lifecycle = GameLifecycle::new(store.clone(), Arc::new(StandardCalculator::default()));
        (store, lifecycle)
    }

    async fn team(store: &MockStatsStore, name: &str) -> TeamSeason {
        store.find_team_season(name, 2017).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_add_commits_once() {
        let (store, lifecycle) = setup();
        let game = Game::new(2017, 1, "Guest", 10, "Host", 20).decide_from_score();

        let game_id = lifecycle.add_game(game).await.unwrap();

        let commits = store.get_commit_calls();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].team_seasons.len(), 2);
        assert_eq!(
            store.find_game(game_id).await.unwrap().unwrap().id,
            Some(game_id)
        );
    }

    #[tokio::test]
    async fn test_delete_missing_game() {
        let (store, lifecycle) = setup();
        let err = lifecycle.delete_game(42).await.unwrap_err();
        assert!(StatsError::is_not_found_error(&err));
        assert!(store.get_commit_calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_game_rejected_before_aggregation() {
        let (store, lifecycle) = setup();
        let mut game = Game::new(2017, 1, "Guest", 10, "Host", 20);
        game.winner_name = Some("Host".to_string());

        assert!(lifecycle.add_game(game).await.is_err());
        assert!(store.get_commit_calls().is_empty());
        assert_eq!(team(&store, "Host").await.games, 0);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_partial_writes() {
        let (store, lifecycle) = setup();
        store.fail_next_commit();

        let game = Game::new(2017, 1, "Guest", 10, "Host", 20).decide_from_score();
        assert!(lifecycle.add_game(game).await.is_err());

        assert_eq!(team(&store, "Guest").await, TeamSeason::new("Guest", 2017, "NFL"));
        assert_eq!(team(&store, "Host").await, TeamSeason::new("Host", 2017, "NFL"));
        assert_eq!(store.inner().game_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_edit_rejects_mismatched_ids() {
        let (_store, lifecycle) = setup();
        let game_id = lifecycle
            .add_game(Game::new(2017, 1, "Guest", 10, "Host", 20).decide_from_score())
            .await
            .unwrap();

        let mut old = Game::new(2017, 1, "Guest", 10, "Host", 20).decide_from_score();
        old.id = Some(game_id);
        let mut new = old.clone();
        new.id = Some(game_id + 1);

        assert!(lifecycle.edit_game(&old, new).await.is_err());
    }

    #[tokio::test]
    async fn test_edit_rejects_result_that_differs_from_stored() {
        let (store, lifecycle) = setup();
        let game_id = lifecycle
            .add_game(Game::new(2017, 1, "Guest", 10, "Host", 20).decide_from_score())
            .await
            .unwrap();
        store.clear_commit_calls();

        // Same teams and score, but the result flipped
        let mut old = store.find_game(game_id).await.unwrap().unwrap();
        old.winner_name = Some("Guest".to_string());
        old.loser_name = Some("Host".to_string());
        let new = Game::new(2017, 1, "Guest", 10, "Host", 27).decide_from_score();

        let err = lifecycle.edit_game(&old, new).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StatsError>(),
            Some(StatsError::InvalidGame { .. })
        ));
        assert!(store.get_commit_calls().is_empty());
        assert_eq!(team(&store, "Host").await.wins, 1);
        assert_eq!(team(&store, "Guest").await.losses, 1);
    }

    #[tokio::test]
    async fn test_update_game_uses_stored_version() {
        let (store, lifecycle) = setup();
        let game_id = lifecycle
            .add_game(Game::new(2017, 1, "Guest", 10, "Host", 20).decide_from_score())
            .await
            .unwrap();

        let mut corrected = Game::new(2017, 1, "Guest", 24, "Host", 20).decide_from_score();
        corrected.id = Some(game_id);
        lifecycle.update_game(corrected).await.unwrap();

        let guest = team(&store, "Guest").await;
        let host = team(&store, "Host").await;
        assert_eq!((guest.games, guest.wins, guest.losses), (1, 1, 0));
        assert_eq!((host.games, host.wins, host.losses), (1, 0, 1));
        assert_eq!((guest.points_for, guest.points_against), (24, 20));

        let stored = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(stored.guest_score, 24);
    }

    #[tokio::test]
    async fn test_metrics_recorded() {
        let (_store, lifecycle) = setup();
        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let lifecycle = lifecycle.with_metrics(metrics.clone());

        let game_id = lifecycle
            .add_game(Game::new(2017, 1, "Guest", 10, "Host", 20).decide_from_score())
            .await
            .unwrap();
        lifecycle.delete_game(game_id).await.unwrap();

        let games = metrics.games();
        assert_eq!(
            games
                .games_processed_total
                .with_label_values(&["add", "success"])
                .get(),
            1
        );
        assert_eq!(
            games
                .aggregate_updates_total
                .with_label_values(&["reverse"])
                .get(),
            1
        );
    }
}
