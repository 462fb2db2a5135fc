//! Game aggregation, lifecycle and rankings engines

pub mod aggregation;
pub mod lifecycle;
pub mod rankings;

// Re-export commonly used types
pub use aggregation::GameAggregator;
pub use lifecycle::GameLifecycle;
pub use rankings::{RankingsEngine, RankingsReport, RatingOutcome, SkipReason, SkippedTeam};
