//! First layer: one skill variable per player, seeded from its rating.

use std::fmt;

use crate::error::Result;
use crate::factor_graphs::{
    FactorGraph, FactorGraphLayer, GroupShape, KeyedVariable, LayerBase, Schedule,
};
use crate::numerics::GaussianDistribution;
use crate::trueskill::factors::GaussianPriorFactor;
use crate::types::Team;
use crate::utils::square;

use super::GaussianVariableFactory;

/// Creates one skill variable per player and anchors it to the player's
/// current rating, widened by the dynamics factor.
pub struct PlayerPriorValuesToSkillsLayer<K> {
    base: LayerBase,
    teams: Vec<Team<K>>,
    dynamics_factor: f64,
    variable_factory: GaussianVariableFactory,
    skills: Vec<Vec<KeyedVariable<K>>>,
}

impl<K: Clone + fmt::Display> PlayerPriorValuesToSkillsLayer<K> {
    pub fn new(teams: Vec<Team<K>>, dynamics_factor: f64, variable_factory: GaussianVariableFactory) -> Self {
        Self {
            base: LayerBase::default(),
            teams,
            dynamics_factor,
            variable_factory,
            skills: Vec::new(),
        }
    }

    /// Skill variables per team, tagged with their players.
    pub fn skills(&self) -> &[Vec<KeyedVariable<K>>] {
        &self.skills
    }
}

impl<K: Clone + fmt::Display> FactorGraphLayer<GaussianDistribution> for PlayerPriorValuesToSkillsLayer<K> {
    fn name(&self) -> &str {
        "PlayerPriorValuesToSkillsLayer"
    }

    fn base(&self) -> &LayerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayerBase {
        &mut self.base
    }

    fn input_shape(&self) -> GroupShape {
        GroupShape::NoInput
    }

    fn build_layer(&mut self, graph: &mut FactorGraph<GaussianDistribution>) -> Result<()> {
        for team in &self.teams {
            let mut team_skills = Vec::with_capacity(team.len());

            for (player, rating) in team.iter() {
                let skill = self.variable_factory.create_keyed_variable(
                    graph.variables_mut(),
                    player.clone(),
                    format!("{}'s skill", player),
                );
                let prior = GaussianPriorFactor::new(
                    rating.mean,
                    square(rating.standard_deviation) + square(self.dynamics_factor),
                    skill.id(),
                    graph.variables(),
                );
                self.base.add_layer_factor(graph.add_factor(prior));
                team_skills.push(skill);
            }

            self.base
                .add_output_group(team_skills.iter().map(KeyedVariable::id).collect());
            self.skills.push(team_skills);
        }

        Ok(())
    }

    fn create_prior_schedule(&self) -> Result<Option<Schedule>> {
        let steps = self
            .base
            .local_factors()
            .iter()
            .map(|prior| Schedule::step("Prior to Skill Step", *prior, 0))
            .collect();
        Ok(Some(Schedule::sequence("All priors", steps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trueskill::layers::test_support::factory;
    use crate::types::Rating;

    #[test]
    fn test_one_skill_per_player() {
        let teams = vec![
            Team::with_player("alice", Rating::new(30.0, 4.0)),
            Team::with_player("bob", Rating::new(20.0, 3.0)).add_player("carol", Rating::new(25.0, 5.0)),
        ];
        let mut layer = PlayerPriorValuesToSkillsLayer::new(teams, 0.0, factory());
        let mut graph = FactorGraph::new();

        layer.build_layer(&mut graph).unwrap();
        let shape: Vec<usize> = layer.output_variables_groups().iter().map(Vec::len).collect();
        assert_eq!(shape, vec![1, 2]);
        assert_eq!(layer.factors().len(), 3);

        let bob = &layer.skills()[1][0];
        assert_eq!(*bob.key(), "bob");
        assert_eq!(graph.variables().name(bob.id()), "Variable[bob's skill]");
    }

    #[test]
    fn test_prior_schedule_installs_ratings() {
        let teams = vec![Team::with_player(1_u32, Rating::new(30.0, 4.0))];
        let mut layer = PlayerPriorValuesToSkillsLayer::new(teams, 3.0, factory());
        let mut graph = FactorGraph::new();
        layer.build_layer(&mut graph).unwrap();

        let schedule = layer.create_prior_schedule().unwrap().unwrap();
        assert_eq!(schedule.name(), "All priors");
        schedule.visit(&mut graph).unwrap();

        let skill = graph.variables().value(layer.skills()[0][0].id());
        assert!((skill.mean() - 30.0).abs() < 1e-9);
        assert!((skill.variance() - 25.0).abs() < 1e-9);
        assert!(layer.create_posterior_schedule().unwrap().is_none());
    }

    #[test]
    fn test_rejects_input() {
        let mut layer = PlayerPriorValuesToSkillsLayer::<u32>::new(Vec::new(), 0.0, factory());
        assert!(layer.set_input_variables_groups(vec![vec![]]).is_err());
    }
}
