//! Schedule-adjusted offensive and defensive ratings
//!
//! For each team in a season the engine scales the team's per-game scoring and
//! allowing by how its opponents compare with the league average:
//!
//! - `offensive_factor = league_average / opponents_average_points_against`
//! - `defensive_factor = league_average / opponents_average_points_for`
//! - `index = average * factor`
//!
//! A team facing stingy defenses gets an offensive factor above one; a team
//! facing weak offenses gets a defensive factor above one.

use crate::calculator::StatCalculator;
use crate::error::{Result, StatsError};
use crate::metrics::MetricsCollector;
use crate::storage::{StatsStore, UnitOfWork};
use crate::types::{LeagueSeasonTotals, Metric, SeasonId, TeamSeason};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Why a team was left unrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingScheduleTotals,
    MissingScheduleAverages,
    NoScheduleGames,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingScheduleTotals => write!(f, "no schedule totals"),
            SkipReason::MissingScheduleAverages => write!(f, "no schedule averages"),
            SkipReason::NoScheduleGames => write!(f, "no games on schedule"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingOutcome {
    Rated,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTeam {
    pub team_name: String,
    pub reason: SkipReason,
}

/// Summary of one rankings pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingsReport {
    pub season_id: SeasonId,
    pub rated: Vec<String>,
    pub skipped: Vec<SkippedTeam>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RankingsEngine {
    store: Arc<dyn StatsStore>,
    calculator: Arc<dyn StatCalculator>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RankingsEngine {
    pub fn new(store: Arc<dyn StatsStore>, calculator: Arc<dyn StatCalculator>) -> Self {
        Self {
            store,
            calculator,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Recompute ratings for every team in a season and commit them together.
    ///
    /// Teams without usable schedule data are skipped and keep their previous
    /// ratings; the rest of the pass continues.
    pub async fn update_rankings(&self, season_id: SeasonId) -> Result<RankingsReport> {
        let start = Instant::now();
        let league = self.league_totals(season_id).await?;
        let team_seasons = self.store.list_team_seasons(season_id).await?;

        info!(
            "Updating rankings for {} team(s) in season {} (league average {})",
            team_seasons.len(),
            season_id,
            league.average_points
        );

        let mut uow = UnitOfWork::new(self.store.as_ref());
        let mut rated = Vec::new();
        let mut skipped = Vec::new();

        for mut team in team_seasons {
            match self.rate_team(&mut team, &league).await? {
                RatingOutcome::Rated => {
                    rated.push(team.team_name.clone());
                    uow.stage_team_season(team);
                }
                RatingOutcome::Skipped(reason) => {
                    warn!("Skipping {}: {}", team.key(), reason);
                    skipped.push(SkippedTeam {
                        team_name: team.team_name,
                        reason,
                    });
                }
            }
        }

        uow.commit().await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_rankings_pass(rated.len(), skipped.len(), start.elapsed());
        }
        info!(
            "Rankings updated for season {}: {} rated, {} skipped",
            season_id,
            rated.len(),
            skipped.len()
        );

        Ok(RankingsReport {
            season_id,
            rated,
            skipped,
            completed_at: current_timestamp(),
        })
    }

    /// Recompute one team's ratings in its own transaction
    pub async fn update_rankings_for_team(
        &self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<RatingOutcome> {
        let league = self.league_totals(season_id).await?;
        let mut team = self
            .store
            .find_team_season(team_name, season_id)
            .await?
            .ok_or_else(|| StatsError::TeamSeasonNotFound {
                team_name: team_name.to_string(),
                season_id,
            })?;

        let outcome = self.rate_team(&mut team, &league).await?;
        match outcome {
            RatingOutcome::Rated => {
                let mut uow = UnitOfWork::new(self.store.as_ref());
                uow.stage_team_season(team);
                uow.commit().await?;
            }
            RatingOutcome::Skipped(reason) => {
                warn!("Skipping {}: {}", team.key(), reason);
            }
        }
        Ok(outcome)
    }

    async fn league_totals(&self, season_id: SeasonId) -> Result<LeagueSeasonTotals> {
        let totals = self
            .store
            .get_league_season_totals(season_id)
            .await?
            .ok_or(StatsError::LeagueSeasonNotFound { season_id })?;
        Ok(totals)
    }

    /// Rate one team in place; leaves it untouched when skipped
    async fn rate_team(
        &self,
        team: &mut TeamSeason,
        league: &LeagueSeasonTotals,
    ) -> Result<RatingOutcome> {
        let Some(totals) = self
            .store
            .get_schedule_totals(&team.team_name, team.season_id)
            .await?
        else {
            return Ok(RatingOutcome::Skipped(SkipReason::MissingScheduleTotals));
        };
        if totals.schedule_games == 0 {
            return Ok(RatingOutcome::Skipped(SkipReason::NoScheduleGames));
        }

        let Some(averages) = self
            .store
            .get_schedule_averages(&team.team_name, team.season_id)
            .await?
        else {
            return Ok(RatingOutcome::Skipped(SkipReason::MissingScheduleAverages));
        };

        let calculator = &self.calculator;
        let games = f64::from(team.games);

        team.offensive_average = calculator.divide(f64::from(team.points_for), games);
        team.defensive_average = calculator.divide(f64::from(team.points_against), games);

        team.offensive_factor = league
            .average_points
            .and_then(|average| calculator.divide(average, averages.points_against));
        team.defensive_factor = league
            .average_points
            .and_then(|average| calculator.divide(average, averages.points_for));

        team.offensive_index = team
            .offensive_average
            .zip_with(team.offensive_factor, |average, factor| {
                Metric::Defined(calculator.multiply(average, factor))
            });
        team.defensive_index = team
            .defensive_average
            .zip_with(team.defensive_factor, |average, factor| {
                Metric::Defined(calculator.multiply(average, factor))
            });

        team.final_pythagorean_winning_percentage =
            calculator.pythagorean_winning_percentage(team);

        debug!(
            "Rated {}: offense {} x {} = {}, defense {} x {} = {}",
            team.key(),
            team.offensive_average,
            team.offensive_factor,
            team.offensive_index,
            team.defensive_average,
            team.defensive_factor,
            team.defensive_index
        );

        Ok(RatingOutcome::Rated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::stat_calculator::MockStatCalculator;
    use crate::calculator::StandardCalculator;
    use crate::storage::MockStatsStore;
    use crate::types::{ScheduleAverages, ScheduleTotals};
    use crate::utils::approx_eq;

    fn team(name: &str, games: i32, points_for: i32, points_against: i32) -> TeamSeason {
        let mut ts = TeamSeason::new(name, 2017, "NFL");
        ts.games = games;
        ts.wins = games;
        ts.points_for = points_for;
        ts.points_against = points_against;
        ts
    }

    /// Store with one team whose schedule and league reports are preset
    fn preset_store() -> Arc<MockStatsStore> {
        let store = Arc::new(MockStatsStore::new());
        store
            .inner()
            .insert_team_season(team("Alpha", 2, 60, 20))
            .unwrap();
        store.preset_league_totals(
            2017,
            Some(LeagueSeasonTotals {
                season_id: 2017,
                total_games: 64,
                total_points: 1280,
                average_points: Metric::Defined(20.0),
            }),
        );
        store.preset_schedule_totals(
            "Alpha",
            2017,
            Some(ScheduleTotals {
                schedule_games: 4,
                schedule_points_for: 100,
                schedule_points_against: 60,
            }),
        );
        store.preset_schedule_averages(
            "Alpha",
            2017,
            Some(ScheduleAverages {
                points_for: 25.0,
                points_against: 15.0,
            }),
        );
        store
    }

    #[tokio::test]
    async fn test_rating_formula() {
        let store = preset_store();
        let engine = RankingsEngine::new(store.clone(), Arc::new(StandardCalculator::default()));

        let report = engine.update_rankings(2017).await.unwrap();
        assert_eq!(report.rated, vec!["Alpha".to_string()]);
        assert!(report.skipped.is_empty());

        let alpha = store.find_team_season("Alpha", 2017).await.unwrap().unwrap();
        assert_eq!(alpha.offensive_average, Metric::Defined(30.0));
        assert_eq!(alpha.defensive_average, Metric::Defined(10.0));

        let offensive_index = alpha.offensive_index.value().unwrap();
        let defensive_index = alpha.defensive_index.value().unwrap();
        // 30 * 20 / 15 and 10 * 20 / 25
        assert!(approx_eq(offensive_index, 40.0, 1e-9));
        assert!(approx_eq(defensive_index, 8.0, 1e-9));
        assert!(alpha.final_pythagorean_winning_percentage.value().unwrap() > 0.9);
    }

    #[tokio::test]
    async fn test_uses_calculator_primitives() {
        let store = preset_store();

        let mut calculator = MockStatCalculator::new();
        calculator
            .expect_divide()
            .times(4)
            .returning(|_, _| Metric::Defined(2.0));
        calculator
            .expect_multiply()
            .times(2)
            .returning(|_, _| 7.0);
        calculator
            .expect_pythagorean_winning_percentage()
            .times(1)
            .returning(|_| Metric::Defined(0.6));

        let engine = RankingsEngine::new(store.clone(), Arc::new(calculator));
        engine.update_rankings(2017).await.unwrap();

        let alpha = store.find_team_season("Alpha", 2017).await.unwrap().unwrap();
        assert_eq!(alpha.offensive_average, Metric::Defined(2.0));
        assert_eq!(alpha.offensive_factor, Metric::Defined(2.0));
        assert_eq!(alpha.offensive_index, Metric::Defined(7.0));
        assert_eq!(alpha.defensive_index, Metric::Defined(7.0));
        assert_eq!(
            alpha.final_pythagorean_winning_percentage,
            Metric::Defined(0.6)
        );
    }

    #[tokio::test]
    async fn test_undefined_average_skips_multiplication() {
        let store = preset_store();

        let mut calculator = MockStatCalculator::new();
        calculator
            .expect_divide()
            .times(4)
            .returning(|_, _| Metric::Undefined);
        calculator.expect_multiply().never();
        calculator
            .expect_pythagorean_winning_percentage()
            .returning(|_| Metric::Undefined);

        let engine = RankingsEngine::new(store.clone(), Arc::new(calculator));
        engine.update_rankings(2017).await.unwrap();

        let alpha = store.find_team_season("Alpha", 2017).await.unwrap().unwrap();
        assert!(alpha.offensive_index.is_undefined());
        assert!(alpha.defensive_index.is_undefined());
    }

    #[tokio::test]
    async fn test_skip_reasons() {
        let store = preset_store();
        store
            .inner()
            .insert_team_seasons(vec![team("Bravo", 1, 7, 3), team("Charlie", 1, 3, 7)])
            .unwrap();
        store.preset_schedule_totals("Bravo", 2017, None);
        store.preset_schedule_totals(
            "Charlie",
            2017,
            Some(ScheduleTotals {
                schedule_games: 2,
                schedule_points_for: 10,
                schedule_points_against: 10,
            }),
        );
        store.preset_schedule_averages("Charlie", 2017, None);

        let engine = RankingsEngine::new(store.clone(), Arc::new(StandardCalculator::default()));
        let report = engine.update_rankings(2017).await.unwrap();

        assert_eq!(report.rated, vec!["Alpha".to_string()]);
        assert_eq!(
            report.skipped,
            vec![
                SkippedTeam {
                    team_name: "Bravo".to_string(),
                    reason: SkipReason::MissingScheduleTotals,
                },
                SkippedTeam {
                    team_name: "Charlie".to_string(),
                    reason: SkipReason::MissingScheduleAverages,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_league_totals_writes_nothing() {
        let store = preset_store();
        store.preset_league_totals(2017, None);

        let engine = RankingsEngine::new(store.clone(), Arc::new(StandardCalculator::default()));
        let err = engine.update_rankings(2017).await.unwrap_err();

        assert!(StatsError::is_not_found_error(&err));
        assert!(store.get_commit_calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_team_update() {
        let store = preset_store();
        let engine = RankingsEngine::new(store.clone(), Arc::new(StandardCalculator::default()));

        let outcome = engine.update_rankings_for_team("Alpha", 2017).await.unwrap();
        assert_eq!(outcome, RatingOutcome::Rated);
        assert_eq!(store.get_commit_calls().len(), 1);

        let err = engine
            .update_rankings_for_team("Nobody", 2017)
            .await
            .unwrap_err();
        assert!(StatsError::is_not_found_error(&err));
    }
}
