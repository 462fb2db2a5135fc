//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use season_ledger::engine::{GameLifecycle, RankingsEngine};
use season_ledger::storage::{MockStatsStore, StatsStore};
use season_ledger::{Game, SeasonId, StandardCalculator, TeamSeason};
use std::sync::Arc;

pub const SEASON: SeasonId = 2017;

/// A small league, one division per conference
pub const TEAMS: [(&str, &str, &str); 6] = [
    ("Chicago", "NFC", "North"),
    ("Green Bay", "NFC", "North"),
    ("Detroit", "NFC", "North"),
    ("New England", "AFC", "East"),
    ("Buffalo", "AFC", "East"),
    ("Miami", "AFC", "East"),
];

pub fn empty_team(name: &str) -> TeamSeason {
    let mut team = TeamSeason::new(name, SEASON, "NFL");
    if let Some((_, conference, division)) = TEAMS.iter().find(|(team, _, _)| *team == name) {
        team.conference_name = Some(conference.to_string());
        team.division_name = Some(division.to_string());
    }
    team
}

/// Mock store seeded with every team in `TEAMS`
pub fn league_store() -> Arc<MockStatsStore> {
    let store = Arc::new(MockStatsStore::new());
    store
        .inner()
        .insert_team_seasons(TEAMS.iter().map(|(name, _, _)| empty_team(name)))
        .expect("seed team seasons");
    store
}

pub fn lifecycle(store: &Arc<MockStatsStore>) -> GameLifecycle {
    GameLifecycle::new(store.clone(), Arc::new(StandardCalculator::default()))
}

pub fn rankings(store: &Arc<MockStatsStore>) -> RankingsEngine {
    RankingsEngine::new(store.clone(), Arc::new(StandardCalculator::default()))
}

/// Game whose result follows the score
pub fn game(week: u32, guest: &str, guest_score: i32, host: &str, host_score: i32) -> Game {
    Game::new(SEASON, week, guest, guest_score, host, host_score).decide_from_score()
}

pub async fn team(store: &MockStatsStore, name: &str) -> TeamSeason {
    store
        .find_team_season(name, SEASON)
        .await
        .expect("store read")
        .expect("team season exists")
}

/// All team seasons of the test season, sorted by name
pub async fn snapshot(store: &MockStatsStore) -> Vec<TeamSeason> {
    store.list_team_seasons(SEASON).await.expect("store read")
}

/// A short schedule where every team has played at least twice
pub fn opening_weeks() -> Vec<Game> {
    vec![
        game(1, "Green Bay", 17, "Chicago", 24),
        game(1, "Detroit", 20, "New England", 20),
        game(1, "Buffalo", 13, "Miami", 31),
        game(2, "Chicago", 10, "Detroit", 27),
        game(2, "Miami", 6, "Green Bay", 35),
        game(2, "New England", 28, "Buffalo", 14),
        game(3, "Detroit", 3, "Green Bay", 10),
    ]
}
