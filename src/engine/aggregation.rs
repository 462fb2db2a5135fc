//! Game aggregation engine
//!
//! Applies or reverses one game's effect on the two participants' season
//! records. Every delta goes through [`Direction::apply_delta`] and every
//! derived value is recomputed from the updated totals, so a reversal undoes
//! an application exactly.

use crate::calculator::StatCalculator;
use crate::direction::Direction;
use crate::error::Result;
use crate::storage::UnitOfWork;
use crate::types::{Game, Metric, SeasonId};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct GameAggregator {
    calculator: Arc<dyn StatCalculator>,
}

impl GameAggregator {
    pub fn new(calculator: Arc<dyn StatCalculator>) -> Self {
        Self { calculator }
    }

    /// Apply or reverse `game` against the records staged in `uow`.
    ///
    /// The game must already be validated. All participants are resolved
    /// before any record is changed, so a missing record fails the call with
    /// nothing staged.
    pub async fn process(
        &self,
        uow: &mut UnitOfWork<'_>,
        game: &Game,
        direction: Direction,
    ) -> Result<()> {
        let season_id = game.season_id;
        let decided = game.decided_teams();

        uow.team_season_mut(&game.guest_name, season_id).await?;
        uow.team_season_mut(&game.host_name, season_id).await?;
        if let Some((winner, loser)) = decided {
            uow.team_season_mut(winner, season_id).await?;
            uow.team_season_mut(loser, season_id).await?;
        }

        debug!(
            "{} week {} game {} {} @ {} {} ({})",
            direction,
            game.week,
            game.guest_name,
            game.guest_score,
            game.host_name,
            game.host_score,
            season_id
        );

        self.update_records(uow, game, direction).await?;

        self.update_scoring(
            uow,
            &game.guest_name,
            season_id,
            game.guest_score,
            game.host_score,
            direction,
        )
        .await?;
        self.update_scoring(
            uow,
            &game.host_name,
            season_id,
            game.host_score,
            game.guest_score,
            direction,
        )
        .await?;

        Ok(())
    }

    async fn update_records(
        &self,
        uow: &mut UnitOfWork<'_>,
        game: &Game,
        direction: Direction,
    ) -> Result<()> {
        let season_id = game.season_id;
        let tie = game.is_tie();

        for team_name in [&game.guest_name, &game.host_name] {
            let team = uow.team_season_mut(team_name, season_id).await?;
            team.games = direction.apply_delta(team.games, 1)?;
            if tie {
                team.ties = direction.apply_delta(team.ties, 1)?;
            }
        }

        if let Some((winner, loser)) = game.decided_teams() {
            let winner = uow.team_season_mut(winner, season_id).await?;
            winner.wins = direction.apply_delta(winner.wins, 1)?;

            let loser = uow.team_season_mut(loser, season_id).await?;
            loser.losses = direction.apply_delta(loser.losses, 1)?;
        }

        for team_name in [&game.guest_name, &game.host_name] {
            let team = uow.team_season_mut(team_name, season_id).await?;
            team.winning_percentage = self.calculator.winning_percentage(team);
        }

        Ok(())
    }

    async fn update_scoring(
        &self,
        uow: &mut UnitOfWork<'_>,
        team_name: &str,
        season_id: SeasonId,
        team_score: i32,
        opponent_score: i32,
        direction: Direction,
    ) -> Result<()> {
        let team = uow.team_season_mut(team_name, season_id).await?;
        team.points_for = direction.apply_delta(team.points_for, team_score)?;
        team.points_against = direction.apply_delta(team.points_against, opponent_score)?;

        match self.calculator.pythagorean_winning_percentage(team) {
            Metric::Defined(pct) => {
                let games = f64::from(team.games);
                team.pythagorean_wins = games * pct;
                team.pythagorean_losses = games * (1.0 - pct);
            }
            Metric::Undefined => {
                team.pythagorean_wins = 0.0;
                team.pythagorean_losses = 0.0;
            }
        }

        debug!(
            "{} now {}-{}-{}, {} PF {} PA, pythagorean {:.2}-{:.2}",
            team.key(),
            team.wins,
            team.losses,
            team.ties,
            team.points_for,
            team.points_against,
            team.pythagorean_wins,
            team.pythagorean_losses
        );

        Ok(())
    }
}
