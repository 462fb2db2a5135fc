//! Apply/reverse direction for per-game aggregate updates
//!
//! Every aggregate change a game makes is written once in terms of
//! [`Direction::apply_delta`], so applying and then reversing the same game
//! leaves the record where it started.

use crate::calculator::arithmetic::{add, subtract};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Add the game's contribution
    Apply,
    /// Remove a previously applied contribution
    Reverse,
}

impl Direction {
    /// Add or remove `delta`; fails instead of overflowing
    pub fn apply_delta(self, current: i32, delta: i32) -> Result<i32> {
        match self {
            Direction::Apply => add(current, delta),
            Direction::Reverse => subtract(current, delta),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Apply => "apply",
            Direction::Reverse => "reverse",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
