//! Rating calculator interface
//!
//! Defines what every calculator supports and the input validation they
//! share. The factor-graph TrueSkill calculator lives in `crate::trueskill`.

pub mod calculator;

// Re-export commonly used types
pub use calculator::{SkillCalculator, SupportedOptions};
