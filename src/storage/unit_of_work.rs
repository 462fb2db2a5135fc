//! Per-operation staging of team season changes
//!
//! The first access to a team season loads it from the store. Later accesses
//! in the same operation see the staged copy, so a reversal followed by an
//! application reads the intermediate state. Nothing is written until
//! [`UnitOfWork::commit`].

use crate::error::{Result, StatsError};
use crate::storage::store::{ChangeSet, GameChange, StatsStore};
use crate::types::{Game, GameId, SeasonId, TeamSeason, TeamSeasonKey};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, error};

pub struct UnitOfWork<'a> {
    store: &'a dyn StatsStore,
    team_seasons: BTreeMap<TeamSeasonKey, TeamSeason>,
    game: Option<GameChange>,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(store: &'a dyn StatsStore) -> Self {
        Self {
            store,
            team_seasons: BTreeMap::new(),
            game: None,
        }
    }

    /// Get the staged record for a team season, loading it on first access
    pub async fn team_season_mut(
        &mut self,
        team_name: &str,
        season_id: SeasonId,
    ) -> Result<&mut TeamSeason> {
        match self.team_seasons.entry(TeamSeasonKey::new(team_name, season_id)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let team_season = self
                    .store
                    .find_team_season(team_name, season_id)
                    .await?
                    .ok_or_else(|| StatsError::TeamSeasonNotFound {
                        team_name: team_name.to_string(),
                        season_id,
                    })?;
                debug!("Loaded team season {}", entry.key());
                Ok(entry.insert(team_season))
            }
        }
    }

    /// Stage a record read outside the unit of work, replacing any staged copy
    pub fn stage_team_season(&mut self, team_season: TeamSeason) {
        self.team_seasons.insert(team_season.key(), team_season);
    }

    pub fn staged_team_season(&self, team_name: &str, season_id: SeasonId) -> Option<&TeamSeason> {
        self.team_seasons
            .get(&TeamSeasonKey::new(team_name, season_id))
    }

    pub fn staged_count(&self) -> usize {
        self.team_seasons.len()
    }

    pub fn insert_game(&mut self, game: Game) {
        self.game = Some(GameChange::Insert(game));
    }

    pub fn update_game(&mut self, game: Game) {
        self.game = Some(GameChange::Update(game));
    }

    pub fn remove_game(&mut self, game_id: GameId) {
        self.game = Some(GameChange::Remove(game_id));
    }

    /// Build the change set without committing it
    pub fn into_change_set(self) -> ChangeSet {
        ChangeSet {
            team_seasons: self.team_seasons.into_values().collect(),
            game: self.game,
        }
    }

    /// Commit every staged change in one store transaction
    pub async fn commit(self) -> Result<Option<GameId>> {
        let store = self.store;
        let changes = self.into_change_set();
        if changes.is_empty() {
            return Ok(None);
        }

        let touched = changes.team_seasons.len();
        match store.commit(changes).await {
            Ok(game_id) => {
                debug!("Committed {} team season(s)", touched);
                Ok(game_id)
            }
            Err(e) => {
                error!("Commit of {} team season(s) failed: {}", touched, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryStatsStore;

    fn seeded_store() -> InMemoryStatsStore {
        let store = InMemoryStatsStore::new();
        store
            .insert_team_season(TeamSeason::new("Guest", 2017, "NFL"))
            .unwrap();
        store
            .insert_team_season(TeamSeason::new("Host", 2017, "NFL"))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_staged_reads_see_earlier_writes() {
        let store = seeded_store();
        let mut uow = UnitOfWork::new(&store);

        uow.team_season_mut("Guest", 2017).await.unwrap().games = 3;
        let again = uow.team_season_mut("Guest", 2017).await.unwrap();
        assert_eq!(again.games, 3);

        // Store is untouched until commit
        let stored = store.find_team_season("Guest", 2017).await.unwrap().unwrap();
        assert_eq!(stored.games, 0);
    }

    #[tokio::test]
    async fn test_commit_writes_everything() {
        let store = seeded_store();
        let mut uow = UnitOfWork::new(&store);

        uow.team_season_mut("Guest", 2017).await.unwrap().wins = 1;
        uow.team_season_mut("Host", 2017).await.unwrap().losses = 1;
        uow.insert_game(Game::new(2017, 1, "Guest", 21, "Host", 7).decide_from_score());
        assert_eq!(uow.staged_count(), 2);

        let game_id = uow.commit().await.unwrap();
        assert!(game_id.is_some());

        let guest = store.find_team_season("Guest", 2017).await.unwrap().unwrap();
        let host = store.find_team_season("Host", 2017).await.unwrap().unwrap();
        assert_eq!(guest.wins, 1);
        assert_eq!(host.losses, 1);
    }

    #[tokio::test]
    async fn test_missing_team_season() {
        let store = seeded_store();
        let mut uow = UnitOfWork::new(&store);

        let err = uow.team_season_mut("Nobody", 2017).await.unwrap_err();
        assert!(StatsError::is_not_found_error(&err));
    }

    #[tokio::test]
    async fn test_empty_commit_is_a_no_op() {
        let store = seeded_store();
        let uow = UnitOfWork::new(&store);
        assert_eq!(uow.commit().await.unwrap(), None);
    }
}
