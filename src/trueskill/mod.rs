//! TrueSkill over a factor graph
//!
//! Player priors flow through skills, performances, team performances and
//! team differences down to the comparison factors that encode the observed
//! ranking; expectation propagation then carries the evidence back up.

pub mod calculator;
pub mod draw_margin;
pub mod factor_graph;
pub mod factors;
pub mod layers;

pub use calculator::FactorGraphTrueSkillCalculator;
pub use draw_margin::draw_margin_from_draw_probability;
pub use factor_graph::TrueSkillFactorGraph;
pub use layers::DEFAULT_LOOP_MAX_DELTA;
