//! Compares each adjacent-team difference against the draw margin:
//! greater-than for decisive results, within for draws.

use crate::error::{Result, SkillError};
use crate::factor_graphs::{FactorGraph, FactorGraphLayer, GroupShape, LayerBase};
use crate::numerics::GaussianDistribution;
use crate::trueskill::factors::{GaussianGreaterThanFactor, GaussianWithinFactor};

/// Attaches the observed outcome to every adjacent difference: a draw keeps
/// it within the margin, a decisive result pushes it past the margin.
pub struct TeamDifferencesComparisonLayer {
    base: LayerBase,
    team_ranks: Vec<u32>,
    epsilon: f64,
}

impl TeamDifferencesComparisonLayer {
    /// `team_ranks` must already be in graph order.
    pub fn new(team_ranks: Vec<u32>, epsilon: f64) -> Self {
        Self {
            base: LayerBase::default(),
            team_ranks,
            epsilon,
        }
    }
}

impl FactorGraphLayer<GaussianDistribution> for TeamDifferencesComparisonLayer {
    fn name(&self) -> &str {
        "TeamDifferencesComparisonLayer"
    }

    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayerBase {
        &mut self.base
    }

    fn input_shape(&self) -> GroupShape {
        GroupShape::singletons(self.team_ranks.len().saturating_sub(1))
    }

    fn build_layer(&mut self, graph: &mut FactorGraph<GaussianDistribution>) -> Result<()> {
        let differences: Vec<_> = self
            .base
            .input_variables_groups()
            .iter()
            .map(|group| group[0])
            .collect();

        if differences.len() + 1 != self.team_ranks.len() {
            return Err(SkillError::invalid_argument(format!(
                "{} team differences for {} ranks",
                differences.len(),
                self.team_ranks.len()
            )));
        }

        for (i, difference) in differences.into_iter().enumerate() {
            let is_draw = self.team_ranks[i] == self.team_ranks[i + 1];
            let factor = if is_draw {
                let within = GaussianWithinFactor::new(self.epsilon, difference, graph.variables());
                graph.add_factor(within)
            } else {
                let greater_than = GaussianGreaterThanFactor::new(self.epsilon, difference, graph.variables());
                graph.add_factor(greater_than)
            };
            self.base.add_layer_factor(factor);
        }

        Ok(())
    }
}
