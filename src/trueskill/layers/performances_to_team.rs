//! Sums player performances into one team performance, weighted by partial play.

use crate::error::Result;
use crate::factor_graphs::{FactorGraph, FactorGraphLayer, GroupShape, LayerBase, Schedule};
use crate::numerics::GaussianDistribution;
use crate::trueskill::factors::GaussianWeightedSumFactor;

use super::{roster_shape, GaussianVariableFactory, Roster};

/// Sums player performances into one team performance, each player weighted
/// by how much of the game they played.
pub struct PlayerPerformancesToTeamPerformancesLayer {
    base: LayerBase,
    roster: Roster,
    variable_factory: GaussianVariableFactory,
}

impl PlayerPerformancesToTeamPerformancesLayer {
    pub fn new(roster: Roster, variable_factory: GaussianVariableFactory) -> Self {
        Self {
            base: LayerBase::default(),
            roster,
            variable_factory,
        }
    }
}

impl FactorGraphLayer<GaussianDistribution> for PlayerPerformancesToTeamPerformancesLayer {
    fn name(&self) -> &str {
        "PlayerPerformancesToTeamPerformancesLayer"
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

        for (team, performances) in self.roster.iter().zip(input) {
            let members: Vec<&str> = team.iter().map(|player| player.label.as_str()).collect();
            let team_performance = self
                .variable_factory
                .create_basic_variable(graph.variables_mut(), format!("Team[{}]'s performance", members.join(", ")));

            let weights: Vec<f64> = team.iter().map(|player| player.partial_play_percentage).collect();
            let sum = GaussianWeightedSumFactor::new(team_performance, &performances, &weights, graph.variables())?;

            self.base.add_layer_factor(graph.add_factor(sum));
            self.base.add_output_group(vec![team_performance]);
        }

        Ok(())
    }

    fn create_prior_schedule(&self) -> Result<Option<Schedule>> {
        let steps = self
            .base
            .local_factors()
            .iter()
            .map(|sum| Schedule::step("Perf to Team Perf Step", *sum, 0))
            .collect();
        Ok(Some(Schedule::sequence("all player perf to team perf schedule", steps)))
    }

    fn create_posterior_schedule(&self) -> Result<Option<Schedule>> {
        let mut steps = Vec::new();
        for (sum, team) in self.base.local_factors().iter().zip(&self.roster) {
            for index in 1..=team.len() {
                steps.push(Schedule::step(format!("team sum perf @{}", index), *sum, index));
            }
        }
        Ok(Some(Schedule::sequence("all of the team's sum iterations", steps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trueskill::layers::test_support::{factory, groups, roster};

    #[test]
    fn test_one_team_performance_per_team() {
        let mut graph = FactorGraph::new();
        let input = groups(&mut graph, &[2, 3], 5.0);
        let mut layer = PlayerPerformancesToTeamPerformancesLayer::new(roster(&[2, 3]), factory());

        layer.set_input_variables_groups(input).unwrap();
        layer.build_layer(&mut graph).unwrap();

        let shape: Vec<usize> = layer.output_variables_groups().iter().map(Vec::len).collect();
        assert_eq!(shape, vec![1, 1]);
        let first = layer.output_variables_groups()[0][0];
        assert_eq!(graph.variables().name(first), "Variable[Team[p00, p01]'s performance]");

        layer.create_prior_schedule().unwrap().unwrap().visit(&mut graph).unwrap();
        let team = graph.variables().value(layer.output_variables_groups()[1][0]);
        assert!((team.mean() - 15.0).abs() < 1e-9);
        assert!((team.variance() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_posterior_schedule_covers_every_member() {
        let mut graph = FactorGraph::new();
        let input = groups(&mut graph, &[2, 3], 0.0);
        let mut layer = PlayerPerformancesToTeamPerformancesLayer::new(roster(&[2, 3]), factory());
        layer.set_input_variables_groups(input).unwrap();
        layer.build_layer(&mut graph).unwrap();

        let factors = layer.factors();
        let expected = Schedule::sequence(
            "all of the team's sum iterations",
            vec![
                Schedule::step("team sum perf @1", factors[0], 1),
                Schedule::step("team sum perf @2", factors[0], 2),
                Schedule::step("team sum perf @1", factors[1], 1),
                Schedule::step("team sum perf @2", factors[1], 2),
                Schedule::step("team sum perf @3", factors[1], 3),
            ],
        );
        assert_eq!(layer.create_posterior_schedule().unwrap().unwrap(), expected);
    }
}
