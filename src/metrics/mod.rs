//! Metrics for the season ledger
//!
//! Prometheus counters and histograms describing game lifecycle operations
//! and rankings passes.

pub mod collector;

pub use collector::{GameMetrics, MetricsCollector, PerformanceMetrics, RatingMetrics};
