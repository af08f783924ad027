//! Skill Graph - TrueSkill ratings on a Gaussian factor graph
//!
//! This crate provides a generic factor-graph message-passing engine
//! (variables, factors, schedules, layers) and the TrueSkill rating
//! calculator built on it for any number of teams of any size.

pub mod config;
pub mod error;
pub mod factor_graphs;
pub mod numerics;
pub mod rating;
pub mod trueskill;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, SkillError};
pub use types::*;

// Re-export key components
pub use numerics::GaussianDistribution;
pub use rating::{SkillCalculator, SupportedOptions};
pub use trueskill::FactorGraphTrueSkillCalculator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
