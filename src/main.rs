//! Command-line entry point for the skill-graph rating engine
//!
//! Reads a match description as JSON, rates it with the factor-graph
//! TrueSkill calculator and prints the result as JSON on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use skill_graph::config::AppConfig;
use skill_graph::rating::SkillCalculator;
use skill_graph::trueskill::FactorGraphTrueSkillCalculator;
use skill_graph::{GameInfo, Player, Rating, Team};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Skill Graph - TrueSkill ratings over a Gaussian factor graph
#[derive(Parser)]
#[command(
    name = "skill-graph",
    version,
    about = "Rate multiplayer matches with TrueSkill on a factor graph",
    long_about = "Skill Graph builds the TrueSkill factor graph for a match described in a JSON \
                 file, runs expectation propagation to convergence and reports updated ratings \
                 or the predicted match quality."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        global = true,
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compute posterior ratings for a finished match
    Rate {
        #[arg(value_name = "MATCH_FILE")]
        match_file: PathBuf,
    },
    /// Compute the draw-probability match quality of a planned match
    Quality {
        #[arg(value_name = "MATCH_FILE")]
        match_file: PathBuf,
    },
}

/// One player entry in a match file. Missing ratings start from the game default.
#[derive(Debug, Deserialize)]
struct MatchPlayer {
    #[serde(flatten)]
    player: Player<String>,
    #[serde(default)]
    rating: Option<Rating>,
}

#[derive(Debug, Deserialize)]
struct MatchFile {
    /// Overrides the configured game parameters for this match
    #[serde(default)]
    game: Option<GameInfo>,
    teams: Vec<Vec<MatchPlayer>>,
    #[serde(default)]
    ranks: Vec<u32>,
}

impl MatchFile {
    fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read match file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid match file {}", path.display()))
    }

    fn teams(&self, game_info: &GameInfo) -> Vec<Team<Player<String>>> {
        self.teams
            .iter()
            .map(|team| {
                team.iter()
                    .map(|entry| {
                        let rating = entry.rating.unwrap_or_else(|| game_info.default_rating());
                        (entry.player.clone(), rating)
                    })
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct RatingReport {
    mean: f64,
    standard_deviation: f64,
    conservative_rating: f64,
}

impl From<&Rating> for RatingReport {
    fn from(rating: &Rating) -> Self {
        Self {
            mean: rating.mean,
            standard_deviation: rating.standard_deviation,
            conservative_rating: rating.conservative_rating(),
        }
    }
}

#[derive(Debug, Serialize)]
struct QualityReport {
    quality: f64,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment, then apply CLI overrides
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

    Ok(config)
}

fn rate(config: &AppConfig, match_file: &Path) -> Result<String> {
    let matchup = MatchFile::load(match_file)?;
    let game_info = matchup.game.clone().unwrap_or_else(|| config.game.clone());
    let teams = matchup.teams(&game_info);
    let ranks = if matchup.ranks.is_empty() {
        (1..=teams.len() as u32).collect()
    } else {
        matchup.ranks.clone()
    };

    let calculator = FactorGraphTrueSkillCalculator::new().with_engine_settings(config.engine.clone());
    let ratings = calculator.calculate_new_ratings(&game_info, &teams, &ranks)?;
    info!("Rated match with {} teams and {} players", teams.len(), ratings.len());

    let report: BTreeMap<String, RatingReport> = ratings
        .iter()
        .map(|(player, rating)| (player.id.clone(), RatingReport::from(rating)))
        .collect();
    Ok(serde_json::to_string_pretty(&report)?)
}

fn quality(config: &AppConfig, match_file: &Path) -> Result<String> {
    let matchup = MatchFile::load(match_file)?;
    let game_info = matchup.game.clone().unwrap_or_else(|| config.game.clone());
    let teams = matchup.teams(&game_info);

    let calculator = FactorGraphTrueSkillCalculator::new().with_engine_settings(config.engine.clone());
    let quality = calculator.calculate_match_quality(&game_info, &teams)?;
    debug!("Match quality {:.6}", quality);

    Ok(serde_json::to_string_pretty(&QualityReport { quality })?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!("Running {} {}", config.service.name, skill_graph::VERSION);

    let output = match &args.command {
        Command::Rate { match_file } => rate(&config, match_file)?,
        Command::Quality { match_file } => quality(&config, match_file)?,
    };
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_file_defaults() {
        let matchup: MatchFile = serde_json::from_str(
            r#"{
                "teams": [
                    [{"id": "alice", "rating": {"mean": 30.0, "standard_deviation": 5.0}}],
                    [{"id": "bob", "partial_play_percentage": 0.5}]
                ]
            }"#,
        )
        .unwrap();

        assert!(matchup.game.is_none());
        assert!(matchup.ranks.is_empty());

        let game_info = GameInfo::default();
        let teams = matchup.teams(&game_info);
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].players()[0].1, Rating::new(30.0, 5.0));
        assert_eq!(teams[1].players()[0].0.partial_play_percentage, 0.5);
        assert_eq!(teams[1].players()[0].0.partial_update_percentage, 1.0);
        assert_eq!(teams[1].players()[0].1, game_info.default_rating());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from(["skill-graph", "--debug", "rate", "match.json"]).unwrap();
        assert!(args.debug);
        assert!(matches!(args.command, Command::Rate { .. }));

        let args = Args::try_parse_from(["skill-graph", "quality", "match.json", "-l", "warn"]).unwrap();
        assert_eq!(args.log_level.as_deref(), Some("warn"));
        assert!(matches!(args.command, Command::Quality { .. }));
    }
}
