//! Common types used throughout the season ledger

use serde::{Deserialize, Serialize};

/// Identifier assigned to a game by the store
pub type GameId = u64;

/// Season identifier (the year the season started)
pub type SeasonId = i32;

/// A numeric result that may be undefined, e.g. a ratio with a zero denominator.
///
/// Serializes as a nullable number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Metric {
    Defined(f64),
    #[default]
    Undefined,
}

impl Metric {
    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Defined(_))
    }

    pub fn is_undefined(&self) -> bool {
        !self.is_defined()
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Defined(value) => Some(*value),
            Metric::Undefined => None,
        }
    }

    pub fn unwrap_or(&self, default: f64) -> f64 {
        self.value().unwrap_or(default)
    }

    pub fn map<F: FnOnce(f64) -> f64>(self, f: F) -> Metric {
        match self {
            Metric::Defined(value) => Metric::Defined(f(value)),
            Metric::Undefined => Metric::Undefined,
        }
    }

    pub fn and_then<F: FnOnce(f64) -> Metric>(self, f: F) -> Metric {
        match self {
            Metric::Defined(value) => f(value),
            Metric::Undefined => Metric::Undefined,
        }
    }

    /// Combine two metrics; undefined if either side is
    pub fn zip_with<F: FnOnce(f64, f64) -> Metric>(self, other: Metric, f: F) -> Metric {
        match (self, other) {
            (Metric::Defined(a), Metric::Defined(b)) => f(a, b),
            _ => Metric::Undefined,
        }
    }
}

impl From<Option<f64>> for Metric {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(value) => Metric::Defined(value),
            None => Metric::Undefined,
        }
    }
}

impl From<Metric> for Option<f64> {
    fn from(metric: Metric) -> Self {
        metric.value()
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Defined(value) => write!(f, "{:.3}", value),
            Metric::Undefined => write!(f, "-"),
        }
    }
}

/// A single game between a guest and a host team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Assigned by the store on insert
    #[serde(default)]
    pub id: Option<GameId>,
    pub season_id: SeasonId,
    pub week: u32,
    pub guest_name: String,
    pub guest_score: i32,
    pub host_name: String,
    pub host_score: i32,
    /// Blank winner and loser together mean a tie
    pub winner_name: Option<String>,
    pub loser_name: Option<String>,
    #[serde(default)]
    pub is_playoff: bool,
    pub notes: Option<String>,
}

fn is_blank(name: &Option<String>) -> bool {
    name.as_deref().map_or(true, |name| name.trim().is_empty())
}

impl Game {
    /// Create an unsaved regular-season game with no recorded result
    pub fn new(
        season_id: SeasonId,
        week: u32,
        guest_name: impl Into<String>,
        guest_score: i32,
        host_name: impl Into<String>,
        host_score: i32,
    ) -> Self {
        Self {
            id: None,
            season_id,
            week,
            guest_name: guest_name.into(),
            guest_score,
            host_name: host_name.into(),
            host_score,
            winner_name: None,
            loser_name: None,
            is_playoff: false,
            notes: None,
        }
    }

    /// Fill winner and loser from the score; equal scores leave a tie
    pub fn decide_from_score(mut self) -> Self {
        let (winner, loser) = match self.guest_score.cmp(&self.host_score) {
            std::cmp::Ordering::Greater => (Some(&self.guest_name), Some(&self.host_name)),
            std::cmp::Ordering::Less => (Some(&self.host_name), Some(&self.guest_name)),
            std::cmp::Ordering::Equal => (None, None),
        };
        self.winner_name = winner.cloned();
        self.loser_name = loser.cloned();
        self
    }

    pub fn is_tie(&self) -> bool {
        is_blank(&self.winner_name) && is_blank(&self.loser_name)
    }

    /// Winner and loser names, or `None` for a tie
    pub fn decided_teams(&self) -> Option<(&str, &str)> {
        if self.is_tie() {
            return None;
        }
        Some((
            self.winner_name.as_deref().unwrap_or_default(),
            self.loser_name.as_deref().unwrap_or_default(),
        ))
    }

    /// Reject games the aggregation engine cannot apply symmetrically
    pub fn validate(&self) -> crate::error::Result<()> {
        let invalid = |reason: String| -> anyhow::Error {
            crate::error::StatsError::InvalidGame { reason }.into()
        };

        if self.guest_name.trim().is_empty() || self.host_name.trim().is_empty() {
            return Err(invalid("guest and host names are required".to_string()));
        }
        if self.guest_name == self.host_name {
            return Err(invalid(format!(
                "'{}' cannot play itself",
                self.guest_name
            )));
        }
        if self.guest_score < 0 || self.host_score < 0 {
            return Err(invalid(format!(
                "negative score {}-{}",
                self.guest_score, self.host_score
            )));
        }

        match (is_blank(&self.winner_name), is_blank(&self.loser_name)) {
            (true, true) => Ok(()),
            (false, false) => {
                let (winner, loser) = self.decided_teams().unwrap_or_default();
                let guest_won = winner == self.guest_name && loser == self.host_name;
                let host_won = winner == self.host_name && loser == self.guest_name;
                if guest_won || host_won {
                    Ok(())
                } else {
                    Err(invalid(format!(
                        "winner '{}' and loser '{}' must be the guest and host",
                        winner, loser
                    )))
                }
            }
            _ => Err(invalid(
                "winner and loser must both be set or both be blank".to_string(),
            )),
        }
    }
}

/// Composite key of a team's season record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamSeasonKey {
    pub team_name: String,
    pub season_id: SeasonId,
}

impl TeamSeasonKey {
    pub fn new(team_name: impl Into<String>, season_id: SeasonId) -> Self {
        Self {
            team_name: team_name.into(),
            season_id,
        }
    }
}

impl std::fmt::Display for TeamSeasonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.team_name, self.season_id)
    }
}

/// A team's cumulative statistical record for one season
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSeason {
    pub team_name: String,
    pub season_id: SeasonId,
    pub league_name: String,
    pub conference_name: Option<String>,
    pub division_name: Option<String>,

    pub games: i32,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub winning_percentage: Metric,

    pub points_for: i32,
    pub points_against: i32,
    pub pythagorean_wins: f64,
    pub pythagorean_losses: f64,

    pub offensive_average: Metric,
    pub offensive_factor: Metric,
    pub offensive_index: Metric,
    pub defensive_average: Metric,
    pub defensive_factor: Metric,
    pub defensive_index: Metric,
    pub final_pythagorean_winning_percentage: Metric,
}

impl TeamSeason {
    /// Create an empty record for a team that has not played yet
    pub fn new(
        team_name: impl Into<String>,
        season_id: SeasonId,
        league_name: impl Into<String>,
    ) -> Self {
        Self {
            team_name: team_name.into(),
            season_id,
            league_name: league_name.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> TeamSeasonKey {
        TeamSeasonKey::new(self.team_name.clone(), self.season_id)
    }

    /// Games played equals wins + losses + ties
    pub fn is_record_consistent(&self) -> bool {
        self.games == self.wins + self.losses + self.ties
    }
}

/// Aggregate statistics of every opponent a team has faced in a season
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub schedule_games: i32,
    pub schedule_points_for: i32,
    pub schedule_points_against: i32,
}

/// Opponents' average points scored and allowed per game
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleAverages {
    pub points_for: f64,
    pub points_against: f64,
}

/// League-wide totals for a season, used as the normalization baseline
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeagueSeasonTotals {
    pub season_id: SeasonId,
    /// Team-games played (each game counts once per participant)
    pub total_games: i32,
    pub total_points: i32,
    /// Points per team-game
    pub average_points: Metric,
}
