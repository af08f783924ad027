//! Layers of the rating factor graph, from player priors down to the
//! comparison of adjacent teams.

mod comparison;
mod iterated_inner;
mod performances_to_team;
mod prior_to_skills;
mod skills_to_performances;
mod team_differences;

pub use comparison::TeamDifferencesComparisonLayer;
pub use iterated_inner::{IteratedTeamDifferencesInnerLayer, DEFAULT_LOOP_MAX_DELTA};
pub use performances_to_team::PlayerPerformancesToTeamPerformancesLayer;
pub use prior_to_skills::PlayerPriorValuesToSkillsLayer;
pub use skills_to_performances::PlayerSkillsToPerformancesLayer;
pub use team_differences::TeamPerformancesToTeamPerformanceDifferencesLayer;

use std::rc::Rc;

use crate::factor_graphs::{GroupShape, VariableFactory};
use crate::numerics::GaussianDistribution;

/// Shared handle to the factory every layer creates its variables with.
pub type GaussianVariableFactory = Rc<VariableFactory<GaussianDistribution>>;

/// What the per-player layers need to know about one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSlot {
    pub label: String,
    pub partial_play_percentage: f64,
}

/// Players per team, in graph order.
pub type Roster = Vec<Vec<PlayerSlot>>;

pub(crate) fn roster_shape(roster: &Roster) -> GroupShape {
    GroupShape::Sizes(roster.iter().map(Vec::len).collect())
}
