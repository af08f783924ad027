//! Performance difference between each pair of adjacent teams.

use crate::error::Result;
use crate::factor_graphs::{FactorGraph, FactorGraphLayer, GroupShape, LayerBase};
use crate::numerics::GaussianDistribution;
use crate::trueskill::factors::GaussianWeightedSumFactor;

use super::GaussianVariableFactory;

/// One difference variable per pair of adjacent teams: `stronger - weaker`.
pub struct TeamPerformancesToTeamPerformanceDifferencesLayer {
    base: LayerBase,
    team_count: usize,
    variable_factory: GaussianVariableFactory,
}

impl TeamPerformancesToTeamPerformanceDifferencesLayer {
    pub fn new(team_count: usize, variable_factory: GaussianVariableFactory) -> Self {
        Self {
            base: LayerBase::default(),
            team_count,
            variable_factory,
        }
    }
}

impl FactorGraphLayer<GaussianDistribution> for TeamPerformancesToTeamPerformanceDifferencesLayer {
    fn name(&self) -> &str {
        "TeamPerformancesToTeamPerformanceDifferencesLayer"
    }

    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayerBase {
        &mut self.base
    }

    fn input_shape(&self) -> GroupShape {
        GroupShape::singletons(self.team_count)
    }

    fn build_layer(&mut self, graph: &mut FactorGraph<GaussianDistribution>) -> Result<()> {
        let teams: Vec<_> = self
            .base
            .input_variables_groups()
            .iter()
            .map(|group| group[0])
            .collect();

        for pair in teams.windows(2) {
            let difference = self
                .variable_factory
                .create_basic_variable(graph.variables_mut(), "Team performance difference");
            let factor = GaussianWeightedSumFactor::new(difference, pair, &[1.0, -1.0], graph.variables())?;

            self.base.add_layer_factor(graph.add_factor(factor));
            self.base.add_output_group(vec![difference]);
        }

        Ok(())
    }
}
