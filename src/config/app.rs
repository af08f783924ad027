//! Main application configuration
//!
//! This module defines the configuration structures for the skill-graph
//! binary, including environment variable loading, TOML files and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::trueskill::DEFAULT_LOOP_MAX_DELTA;
use crate::types::GameInfo;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub game: GameInfo,
    pub engine: EngineSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Message-passing engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Convergence threshold of the multi-team schedule loop
    pub loop_max_delta: f64,
    /// Upper bound on loop iterations; unbounded when absent
    pub max_loop_iterations: Option<usize>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "skill-graph".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            loop_max_delta: DEFAULT_LOOP_MAX_DELTA,
            max_loop_iterations: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Game settings
        if let Ok(mean) = env::var("SKILL_INITIAL_MEAN") {
            config.game.initial_mean = mean
                .parse()
                .map_err(|_| anyhow!("Invalid SKILL_INITIAL_MEAN value: {}", mean))?;
        }
        if let Ok(sd) = env::var("SKILL_INITIAL_SD") {
            config.game.initial_standard_deviation = sd
                .parse()
                .map_err(|_| anyhow!("Invalid SKILL_INITIAL_SD value: {}", sd))?;
        }
        if let Ok(beta) = env::var("SKILL_BETA") {
            config.game.beta = beta
                .parse()
                .map_err(|_| anyhow!("Invalid SKILL_BETA value: {}", beta))?;
        }
        if let Ok(dynamics) = env::var("SKILL_DYNAMICS") {
            config.game.dynamics_factor = dynamics
                .parse()
                .map_err(|_| anyhow!("Invalid SKILL_DYNAMICS value: {}", dynamics))?;
        }
        if let Ok(draw) = env::var("SKILL_DRAW_PROBABILITY") {
            config.game.draw_probability = draw
                .parse()
                .map_err(|_| anyhow!("Invalid SKILL_DRAW_PROBABILITY value: {}", draw))?;
        }

        // Engine settings
        if let Ok(delta) = env::var("SKILL_LOOP_MAX_DELTA") {
            config.engine.loop_max_delta = delta
                .parse()
                .map_err(|_| anyhow!("Invalid SKILL_LOOP_MAX_DELTA value: {}", delta))?;
        }
        if let Ok(iterations) = env::var("SKILL_MAX_LOOP_ITERATIONS") {
            config.engine.max_loop_iterations = Some(
                iterations
                    .parse()
                    .map_err(|_| anyhow!("Invalid SKILL_MAX_LOOP_ITERATIONS value: {}", iterations))?,
            );
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file. Missing sections take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate game parameters
    config.game.validate()?;

    // Validate engine settings
    if !(config.engine.loop_max_delta > 0.0) {
        return Err(anyhow!("Loop max delta must be positive"));
    }
    if config.engine.max_loop_iterations == Some(0) {
        return Err(anyhow!("Max loop iterations must be greater than 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.engine.loop_max_delta, 0.0001);
        assert_eq!(config.engine.max_loop_iterations, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.game.draw_probability = 1.5;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.engine.max_loop_iterations = Some(0);
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.engine.loop_max_delta = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.game.draw_probability = 0.0;
        config.engine.max_loop_iterations = Some(50);

        let text = config.to_toml_string().unwrap();
        let parsed = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [game]
            initial_mean = 1500.0
            initial_standard_deviation = 500.0
            beta = 250.0
            dynamics_factor = 5.0
            draw_probability = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.game.initial_mean, 1500.0);
        assert_eq!(config.service, ServiceSettings::default());
        assert_eq!(config.engine, EngineSettings::default());
    }
}
