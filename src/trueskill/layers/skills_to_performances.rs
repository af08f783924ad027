//! Adds a performance variable per player, tied to its skill by a likelihood factor.

use crate::error::Result;
use crate::factor_graphs::{FactorGraph, FactorGraphLayer, GroupShape, LayerBase, Schedule};
use crate::numerics::GaussianDistribution;
use crate::trueskill::factors::GaussianLikelihoodFactor;

use super::{roster_shape, GaussianVariableFactory, Roster};

/// Adds performance noise: one performance variable per skill variable.
pub struct PlayerSkillsToPerformancesLayer {
    base: LayerBase,
    roster: Roster,
    beta_squared: f64,
    variable_factory: GaussianVariableFactory,
}

impl PlayerSkillsToPerformancesLayer {
    pub fn new(roster: Roster, beta_squared: f64, variable_factory: GaussianVariableFactory) -> Self {
        Self {
            base: LayerBase::default(),
            roster,
            beta_squared,
            variable_factory,
        }
    }

    fn all_factors_at(&self, name: &str, index: usize) -> Vec<Schedule> {
        self.base
            .local_factors()
            .iter()
            .map(|likelihood| Schedule::step(name, *likelihood, index))
            .collect()
    }
}

impl FactorGraphLayer<GaussianDistribution> for PlayerSkillsToPerformancesLayer {
    fn name(&self) -> &str {
        "PlayerSkillsToPerformancesLayer"
    }

    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayerBase {
        &mut self.base
    }

    fn input_shape(&self) -> GroupShape {
        roster_shape(&self.roster)
    }

    fn build_layer(&mut self, graph: &mut FactorGraph<GaussianDistribution>) -> Result<()> {
        let input = self.base.input_variables_groups().clone();

        for (team, skills) in self.roster.iter().zip(input) {
            let mut performances = Vec::with_capacity(skills.len());

            for (player, skill) in team.iter().zip(skills) {
                let performance = self
                    .variable_factory
                    .create_basic_variable(graph.variables_mut(), format!("{}'s performance", player.label));
                let likelihood =
                    GaussianLikelihoodFactor::new(self.beta_squared, performance, skill, graph.variables());
                self.base.add_layer_factor(graph.add_factor(likelihood));
                performances.push(performance);
            }

            self.base.add_output_group(performances);
        }

        Ok(())
    }

    fn create_prior_schedule(&self) -> Result<Option<Schedule>> {
        Ok(Some(Schedule::sequence(
            "All skill to performance sending",
            self.all_factors_at("Skill to Perf step", 0),
        )))
    }

    fn create_posterior_schedule(&self) -> Result<Option<Schedule>> {
        Ok(Some(Schedule::sequence(
            "All skill to performance sending",
            self.all_factors_at("Perf to Skill step", 1),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trueskill::layers::test_support::{factory, groups, roster};

    #[test]
    fn test_performance_per_skill() {
        let mut graph = FactorGraph::new();
        let input = groups(&mut graph, &[2, 1], 10.0);
        let mut layer = PlayerSkillsToPerformancesLayer::new(roster(&[2, 1]), 4.0, factory());

        layer.set_input_variables_groups(input).unwrap();
        layer.build_layer(&mut graph).unwrap();

        let shape: Vec<usize> = layer.output_variables_groups().iter().map(Vec::len).collect();
        assert_eq!(shape, vec![2, 1]);
        assert_eq!(layer.factors().len(), 3);

        let performance = layer.output_variables_groups()[1][0];
        assert_eq!(graph.variables().name(performance), "Variable[p10's performance]");

        layer.create_prior_schedule().unwrap().unwrap().visit(&mut graph).unwrap();
        let marginal = graph.variables().value(performance);
        assert!((marginal.mean() - 10.0).abs() < 1e-9);
        assert!((marginal.variance() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut graph = FactorGraph::new();
        let input = groups(&mut graph, &[1, 1], 0.0);
        let mut layer = PlayerSkillsToPerformancesLayer::new(roster(&[2, 1]), 4.0, factory());

        assert!(layer.set_input_variables_groups(input).is_err());
    }
}
