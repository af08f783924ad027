//! TrueSkill calculator for any number of teams of any size, using the full
//! factor graph for updates and a closed form for match quality.

use std::collections::HashMap;

use tracing::debug;

use crate::config::EngineSettings;
use crate::error::{Result, SkillError};
use crate::numerics::{Matrix, PlayersRange, TeamsRange};
use crate::rating::{SkillCalculator, SupportedOptions};
use crate::types::{partial_play_percentage, GameInfo, Participant, PlayerKey, Rating, Team};
use crate::utils::{sort_by_rank, square};

use super::factor_graph::TrueSkillFactorGraph;

#[derive(Debug, Clone)]
pub struct FactorGraphTrueSkillCalculator {
    teams_allowed: TeamsRange,
    engine: EngineSettings,
}

impl Default for FactorGraphTrueSkillCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorGraphTrueSkillCalculator {
    /// Two or more teams of at least one player each.
    pub fn new() -> Self {
        Self {
            teams_allowed: TeamsRange::at_least(2),
            engine: EngineSettings::default(),
        }
    }

    /// Same engine restricted to head-to-head matches.
    pub fn two_team() -> Self {
        Self {
            teams_allowed: TeamsRange::exactly(2),
            ..Self::new()
        }
    }

    pub fn with_engine_settings(mut self, engine: EngineSettings) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine_settings(&self) -> &EngineSettings {
        &self.engine
    }
}

impl SkillCalculator for FactorGraphTrueSkillCalculator {
    fn supported_options(&self) -> SupportedOptions {
        SupportedOptions::PARTIAL_PLAY | SupportedOptions::PARTIAL_UPDATE
    }

    fn teams_allowed(&self) -> TeamsRange {
        self.teams_allowed
    }

    fn players_per_team_allowed(&self) -> PlayersRange {
        PlayersRange::at_least(1)
    }

    fn calculate_new_ratings<K: PlayerKey>(
        &self,
        game_info: &GameInfo,
        teams: &[Team<K>],
        team_ranks: &[u32],
    ) -> Result<HashMap<K, Rating>> {
        game_info.validate()?;
        self.validate_team_count_and_players_count_per_team(teams)?;
        if teams.len() != team_ranks.len() {
            return Err(SkillError::invalid_argument(format!(
                "{} teams but {} ranks",
                teams.len(),
                team_ranks.len()
            )));
        }

        let (sorted_teams, sorted_ranks) = sort_by_rank(teams.to_vec(), team_ranks);

        let mut factor_graph =
            TrueSkillFactorGraph::new(game_info, sorted_teams, sorted_ranks, &self.engine)?;
        factor_graph.build_graph()?;
        factor_graph.run_schedule()?;

        let mut new_ratings = factor_graph.updated_ratings()?;
        let probability = factor_graph.probability_of_ranking()?;
        debug!(
            "Rated {} teams, {} players; probability of outcome {:.6}",
            teams.len(),
            new_ratings.len(),
            probability
        );

        for (player, prior) in teams.iter().flat_map(|team| team.iter()) {
            let update_percentage = player.partial_update_percentage();
            if update_percentage >= 1.0 {
                continue;
            }
            if let Some(posterior) = new_ratings.get_mut(player) {
                *posterior = Rating::partial_update(prior, posterior, update_percentage.max(0.0));
            }
        }

        Ok(new_ratings)
    }

    fn calculate_match_quality<K: PlayerKey>(&self, game_info: &GameInfo, teams: &[Team<K>]) -> Result<f64> {
        game_info.validate()?;
        self.validate_team_count_and_players_count_per_team(teams)?;

        let ratings: Vec<&Rating> = teams
            .iter()
            .flat_map(|team| team.iter().map(|(_, rating)| rating))
            .collect();
        let means: Vec<f64> = ratings.iter().map(|rating| rating.mean).collect();
        let variances: Vec<f64> = ratings.iter().map(|rating| rating.variance()).collect();

        let mean_matrix = Matrix::column_vector(&means);
        let variance_matrix = Matrix::diagonal(&variances);
        let player_team_assignments = player_team_assignment_matrix(teams);
        let assignments_transposed = player_team_assignments.transpose();

        let mean_transposed = mean_matrix.transpose();
        let start = &mean_transposed * &player_team_assignments;
        let a_t_a = &(&assignments_transposed * &player_team_assignments).scale(square(game_info.beta));
        let a_t_s_a = &(&assignments_transposed * &variance_matrix) * &player_team_assignments;
        let middle = a_t_a + &a_t_s_a;
        let middle_inverse = middle.inverse()?;
        let end = &assignments_transposed * &mean_matrix;

        let exp_part = (&(&start * &middle_inverse) * &end).scale(-0.5).determinant()?;
        let sqrt_part = (a_t_a.determinant()? / middle.determinant()?).sqrt();

        Ok(exp_part.exp() * sqrt_part)
    }
}

/// Players × (teams − 1) matrix: column `i` weighs team `i` positively and
/// team `i + 1` negatively, each player by its partial-play percentage.
fn player_team_assignment_matrix<K: Participant>(teams: &[Team<K>]) -> Matrix {
    let total_players: usize = teams.iter().map(Team::len).sum();
    let mut matrix = Matrix::zeros(total_players, teams.len().saturating_sub(1));

    let mut row_offset = 0;
    for (column, pair) in teams.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);

        for (row, (player, _)) in current.iter().enumerate() {
            matrix.set(row_offset + row, column, partial_play_percentage(player));
        }
        let next_offset = row_offset + current.len();
        for (row, (player, _)) in next.iter().enumerate() {
            matrix.set(next_offset + row, column, -partial_play_percentage(player));
        }

        row_offset = next_offset;
    }

    matrix
}
