//! Command-line entry point for the season ledger
//!
//! Replays a season file (team records and games) through the game lifecycle
//! against the in-memory store, runs a rankings pass per season and prints
//! the resulting standings as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use season_ledger::config::AppConfig;
use season_ledger::engine::{GameLifecycle, RankingsEngine};
use season_ledger::metrics::MetricsCollector;
use season_ledger::storage::{InMemoryStatsStore, StatsStore};
use season_ledger::utils::seasons_of;
use season_ledger::{Game, StandardCalculator, TeamSeason};
use serde::Deserialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Season Ledger - team season aggregates and schedule-adjusted ratings
#[derive(Parser)]
#[command(
    name = "season-ledger",
    version,
    about = "Replay a season of games and compute schedule-adjusted ratings",
    long_about = "Season Ledger applies every game in a season file to the participating \
                 teams' records, then recomputes offensive and defensive ratings adjusted \
                 for strength of schedule and prints the standings as JSON."
)]
struct Args {
    /// Season file with `team_seasons` and `games` arrays (JSON)
    #[arg(value_name = "FILE")]
    season_file: PathBuf,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Pythagorean exponent override
    #[arg(long, value_name = "EXPONENT")]
    exponent: Option<f64>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and season file, then exit)
    #[arg(long, help = "Validate configuration and season file without replaying")]
    dry_run: bool,

    /// Print Prometheus metrics after the standings
    #[arg(long)]
    metrics: bool,
}

#[derive(Debug, Deserialize)]
struct SeasonFile {
    team_seasons: Vec<TeamSeason>,
    games: Vec<Game>,
}

impl SeasonFile {
    fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read season file {}", path.display()))?;
        let mut season: SeasonFile = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid season file {}", path.display()))?;

        for game in season.games.iter_mut() {
            if game.winner_name.is_none() && game.loser_name.is_none() {
                *game = game.clone().decide_from_score();
            }
        }
        Ok(season)
    }

    fn validate(&self) -> Result<()> {
        for (index, game) in self.games.iter().enumerate() {
            game.validate()
                .with_context(|| format!("Game #{} in season file", index + 1))?;
        }
        Ok(())
    }
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(exponent) = args.exponent {
        config.rating.pythagorean_exponent = exponent;
    }

    season_ledger::config::validate_config(&config)?;
    Ok(config)
}

/// Best record first; teams without games sort last
fn by_standing(a: &TeamSeason, b: &TeamSeason) -> Ordering {
    let pct = |team: &TeamSeason| team.winning_percentage.unwrap_or(-1.0);
    pct(b)
        .partial_cmp(&pct(a))
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            (b.points_for - b.points_against).cmp(&(a.points_for - a.points_against))
        })
        .then_with(|| a.team_name.cmp(&b.team_name))
}

async fn run(args: &Args, config: &AppConfig, season: SeasonFile) -> Result<()> {
    let store = Arc::new(InMemoryStatsStore::new());
    store.insert_team_seasons(season.team_seasons)?;

    let calculator = Arc::new(StandardCalculator::from_config(&config.rating));
    let metrics = Arc::new(MetricsCollector::new()?);
    let lifecycle =
        GameLifecycle::new(store.clone(), calculator.clone()).with_metrics(metrics.clone());
    let rankings = RankingsEngine::new(store.clone(), calculator).with_metrics(metrics.clone());

    let seasons = seasons_of(&season.games);
    let total = season.games.len();
    for game in season.games {
        lifecycle.add_game(game).await?;
    }
    info!("Replayed {} game(s) across {} season(s)", total, seasons.len());

    let mut standings = Vec::new();
    for season_id in seasons {
        let report = rankings.update_rankings(season_id).await?;
        for skipped in &report.skipped {
            warn!(
                "{} ({}) left unrated: {}",
                skipped.team_name, season_id, skipped.reason
            );
        }

        let mut teams = store.list_team_seasons(season_id).await?;
        teams.sort_by(by_standing);
        standings.extend(teams);
    }

    println!("{}", serde_json::to_string_pretty(&standings)?);

    if args.metrics {
        print!("{}", metrics.encode_text()?);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let season = SeasonFile::load(&args.season_file)?;
    season.validate()?;

    if args.dry_run {
        info!(
            "Season file valid: {} team season(s), {} game(s)",
            season.team_seasons.len(),
            season.games.len()
        );
        return Ok(());
    }

    info!(
        "{} starting with Pythagorean exponent {}",
        config.service.name, config.rating.pythagorean_exponent
    );

    if let Err(e) = run(&args, &config, season).await {
        error!("Season replay failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
