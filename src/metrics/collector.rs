//! Metrics collection using Prometheus
//!
//! Counters and histograms for the game lifecycle and rankings engines.

use crate::direction::Direction;
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the season ledger
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    game_metrics: GameMetrics,

    rating_metrics: RatingMetrics,

    performance_metrics: PerformanceMetrics,
}

/// Game lifecycle metrics
#[derive(Clone)]
pub struct GameMetrics {
    /// Games processed by operation (add, edit, delete) and status
    pub games_processed_total: IntCounterVec,

    /// Per-game aggregate updates by direction
    pub aggregate_updates_total: IntCounterVec,

    /// Commits rejected by the store
    pub commit_failures_total: IntCounter,
}

/// Rankings metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Teams rated or skipped during rankings passes
    pub teams_total: IntCounterVec,

    /// Completed rankings passes
    pub rankings_passes_total: IntCounter,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Engine operation durations
    pub operation_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let game_metrics = GameMetrics::new(&registry)?;
        let rating_metrics = RatingMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            game_metrics,
            rating_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn games(&self) -> &GameMetrics {
        &self.game_metrics
    }

    pub fn ratings(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a lifecycle operation and how long it took
    pub fn record_game_operation(&self, operation: &str, success: bool, duration: Duration) {
        let status = if success { "success" } else { "error" };

        self.game_metrics
            .games_processed_total
            .with_label_values(&[operation, status])
            .inc();

        self.performance_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Record one game's effect being applied or reversed
    pub fn record_aggregate_update(&self, direction: Direction) {
        self.game_metrics
            .aggregate_updates_total
            .with_label_values(&[direction.as_str()])
            .inc();
    }

    pub fn record_commit_failure(&self) {
        self.game_metrics.commit_failures_total.inc();
    }

    /// Record the outcome of a rankings pass
    pub fn record_rankings_pass(&self, rated: usize, skipped: usize, duration: Duration) {
        self.rating_metrics
            .teams_total
            .with_label_values(&["rated"])
            .inc_by(rated as u64);
        self.rating_metrics
            .teams_total
            .with_label_values(&["skipped"])
            .inc_by(skipped as u64);
        self.rating_metrics.rankings_passes_total.inc();

        self.performance_metrics
            .operation_duration
            .with_label_values(&["update_rankings"])
            .observe(duration.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl GameMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let games_processed_total = IntCounterVec::new(
            Opts::new(
                "season_ledger_games_processed_total",
                "Games processed by lifecycle operation",
            ),
            &["operation", "status"],
        )?;
        registry.register(Box::new(games_processed_total.clone()))?;

        let aggregate_updates_total = IntCounterVec::new(
            Opts::new(
                "season_ledger_aggregate_updates_total",
                "Per-game aggregate updates by direction",
            ),
            &["direction"],
        )?;
        registry.register(Box::new(aggregate_updates_total.clone()))?;

        let commit_failures_total = IntCounter::new(
            "season_ledger_commit_failures_total",
            "Commits rejected by the store",
        )?;
        registry.register(Box::new(commit_failures_total.clone()))?;

        Ok(Self {
            games_processed_total,
            aggregate_updates_total,
            commit_failures_total,
        })
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let teams_total = IntCounterVec::new(
            Opts::new(
                "season_ledger_rankings_teams_total",
                "Teams rated or skipped during rankings passes",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(teams_total.clone()))?;

        let rankings_passes_total = IntCounter::new(
            "season_ledger_rankings_passes_total",
            "Completed rankings passes",
        )?;
        registry.register(Box::new(rankings_passes_total.clone()))?;

        Ok(Self {
            teams_total,
            rankings_passes_total,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "season_ledger_operation_duration_seconds",
                "Engine operation duration",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self { operation_duration })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
