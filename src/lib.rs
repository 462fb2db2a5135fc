//! Season Ledger - game-outcome aggregation and rating engine
//!
//! This crate keeps each team's season record in step with the games played
//! (add, edit and delete are applied and reversed symmetrically) and
//! recomputes schedule-adjusted offensive and defensive ratings per season.

pub mod calculator;
pub mod config;
pub mod direction;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, StatsError};
pub use types::*;

// Re-export key components
pub use calculator::{StandardCalculator, StatCalculator};
pub use direction::Direction;
pub use engine::{GameLifecycle, RankingsEngine};
pub use storage::{InMemoryStatsStore, StatsStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
