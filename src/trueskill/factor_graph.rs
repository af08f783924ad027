//! The TrueSkill factor graph: builds the layer pipeline for one match, runs
//! message passing to convergence and reads back posterior ratings.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::config::EngineSettings;
use crate::error::{Result, SkillError};
use crate::factor_graphs::{FactorGraph, FactorGraphLayer, FactorList, Schedule, VariableFactory};
use crate::numerics::GaussianDistribution;
use crate::types::{partial_play_percentage, GameInfo, PlayerKey, Rating, Team};
use crate::utils::square;

use super::draw_margin::draw_margin_from_draw_probability;
use super::layers::{
    IteratedTeamDifferencesInnerLayer, PlayerPerformancesToTeamPerformancesLayer,
    PlayerPriorValuesToSkillsLayer, PlayerSkillsToPerformancesLayer, PlayerSlot, Roster,
    TeamDifferencesComparisonLayer, TeamPerformancesToTeamPerformanceDifferencesLayer,
};

type GaussianLayer = Box<dyn FactorGraphLayer<GaussianDistribution>>;

/// One match's factor graph. Teams and ranks must already be sorted by rank.
pub struct TrueSkillFactorGraph<K> {
    graph: FactorGraph<GaussianDistribution>,
    prior_layer: PlayerPriorValuesToSkillsLayer<K>,
    layers: Vec<GaussianLayer>,
    built: bool,
}

impl<K: PlayerKey> TrueSkillFactorGraph<K> {
    pub fn new(
        game_info: &GameInfo,
        teams: Vec<Team<K>>,
        team_ranks: Vec<u32>,
        engine: &EngineSettings,
    ) -> Result<Self> {
        if teams.len() != team_ranks.len() {
            return Err(SkillError::invalid_argument(format!(
                "{} teams but {} ranks",
                teams.len(),
                team_ranks.len()
            )));
        }

        let variable_factory = Rc::new(VariableFactory::new(GaussianDistribution::uniform));
        let team_count = teams.len();
        let roster = roster(&teams);
        let epsilon = draw_margin_from_draw_probability(game_info.draw_probability, game_info.beta);

        let prior_layer =
            PlayerPriorValuesToSkillsLayer::new(teams, game_info.dynamics_factor, variable_factory.clone());

        let layers: Vec<GaussianLayer> = vec![
            Box::new(PlayerSkillsToPerformancesLayer::new(
                roster.clone(),
                square(game_info.beta),
                variable_factory.clone(),
            )),
            Box::new(PlayerPerformancesToTeamPerformancesLayer::new(
                roster,
                variable_factory.clone(),
            )),
            Box::new(
                IteratedTeamDifferencesInnerLayer::new(
                    team_count,
                    TeamPerformancesToTeamPerformanceDifferencesLayer::new(team_count, variable_factory),
                    TeamDifferencesComparisonLayer::new(team_ranks, epsilon),
                )
                .with_loop_limits(engine.loop_max_delta, engine.max_loop_iterations),
            ),
        ];

        Ok(Self {
            graph: FactorGraph::new(),
            prior_layer,
            layers,
            built: false,
        })
    }

    /// Build every layer in order, feeding each one the previous layer's output.
    pub fn build_graph(&mut self) -> Result<()> {
        if self.built {
            return Err(SkillError::invalid_operation("factor graph is already built"));
        }

        let Self {
            graph,
            prior_layer,
            layers,
            ..
        } = self;

        prior_layer.build_layer(graph)?;
        let mut last_output = prior_layer.output_variables_groups().clone();

        for layer in layers.iter_mut() {
            layer.set_input_variables_groups(last_output)?;
            layer.build_layer(graph)?;
            last_output = layer.output_variables_groups().clone();
        }

        self.built = true;
        debug!(
            "Built factor graph with {} variables and {} factors",
            self.graph.variables().len(),
            self.graph.factor_count()
        );
        Ok(())
    }

    /// Priors of every layer top-down, then posteriors bottom-up.
    pub fn create_full_schedule(&self) -> Result<Schedule> {
        self.require_built()?;

        let mut full_schedule = Vec::new();
        for layer in self.all_layers() {
            if let Some(schedule) = layer.create_prior_schedule()? {
                full_schedule.push(schedule);
            }
        }
        for layer in self.all_layers().into_iter().rev() {
            if let Some(schedule) = layer.create_posterior_schedule()? {
                full_schedule.push(schedule);
            }
        }

        Ok(Schedule::sequence("Full schedule", full_schedule))
    }

    pub fn run_schedule(&mut self) -> Result<()> {
        let schedule = self.create_full_schedule()?;
        let delta = schedule.visit(&mut self.graph)?;
        debug!("Ran full schedule, last delta {}", delta);
        Ok(())
    }

    /// Likelihood of the observed ranking under the current messages.
    /// Resets marginals to their priors, so call it after reading ratings
    /// or re-run the schedule afterwards.
    pub fn probability_of_ranking(&mut self) -> Result<f64> {
        self.require_built()?;

        let factor_list: FactorList = self
            .all_layers()
            .iter()
            .flat_map(|layer| layer.factors())
            .collect();
        let log_z = factor_list.log_normalization(&mut self.graph)?;
        Ok(log_z.exp())
    }

    /// Posterior skill of every player, keyed by player.
    pub fn updated_ratings(&self) -> Result<HashMap<K, Rating>> {
        self.require_built()?;

        let mut ratings = HashMap::new();
        for team in self.prior_layer.skills() {
            for skill in team {
                let value = self.graph.variables().value(skill.id());
                ratings.insert(
                    skill.key().clone(),
                    Rating::new(value.mean(), value.standard_deviation()),
                );
            }
        }
        Ok(ratings)
    }

    fn all_layers(&self) -> Vec<&dyn FactorGraphLayer<GaussianDistribution>> {
        let mut layers: Vec<&dyn FactorGraphLayer<GaussianDistribution>> =
            Vec::with_capacity(self.layers.len() + 1);
        layers.push(&self.prior_layer);
        for layer in &self.layers {
            layers.push(layer.as_ref());
        }
        layers
    }

    fn require_built(&self) -> Result<()> {
        if self.built {
            Ok(())
        } else {
            Err(SkillError::invalid_operation("factor graph has not been built"))
        }
    }
}

fn roster<K: PlayerKey>(teams: &[Team<K>]) -> Roster {
    teams
        .iter()
        .map(|team| {
            team.iter()
                .map(|(player, _)| PlayerSlot {
                    label: player.to_string(),
                    partial_play_percentage: partial_play_percentage(player),
                })
                .collect()
        })
        .collect()
}
