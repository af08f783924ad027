//! Runs the team differences and comparisons together, looping over the
//! chain of teams until the messages settle.

use crate::error::{Result, SkillError};
use crate::factor_graphs::{
    FactorGraph, FactorGraphLayer, FactorId, GroupShape, LayerBase, Schedule,
};
use crate::numerics::GaussianDistribution;

use super::{TeamDifferencesComparisonLayer, TeamPerformancesToTeamPerformanceDifferencesLayer};

/// Default convergence threshold of the multi-team difference loop
pub const DEFAULT_LOOP_MAX_DELTA: f64 = 0.0001;

/// Owns the difference and comparison layers and iterates between them until
/// the team differences agree with the observed ranking.
pub struct IteratedTeamDifferencesInnerLayer {
    base: LayerBase,
    team_count: usize,
    differences: TeamPerformancesToTeamPerformanceDifferencesLayer,
    comparisons: TeamDifferencesComparisonLayer,
    loop_max_delta: f64,
    max_loop_iterations: Option<usize>,
}

impl IteratedTeamDifferencesInnerLayer {
    pub fn new(
        team_count: usize,
        differences: TeamPerformancesToTeamPerformanceDifferencesLayer,
        comparisons: TeamDifferencesComparisonLayer,
    ) -> Self {
        Self {
            base: LayerBase::default(),
            team_count,
            differences,
            comparisons,
            loop_max_delta: DEFAULT_LOOP_MAX_DELTA,
            max_loop_iterations: None,
        }
    }

    pub fn with_loop_limits(mut self, max_delta: f64, max_iterations: Option<usize>) -> Self {
        self.loop_max_delta = max_delta;
        self.max_loop_iterations = max_iterations;
        self
    }

    fn two_team_inner_prior_loop_schedule(&self) -> Schedule {
        let differences = self.differences.base().local_factors();
        let comparisons = self.comparisons.base().local_factors();

        Schedule::sequence(
            "loop of just two teams inner sequence",
            vec![
                Schedule::step("send team perf to perf differences", differences[0], 0),
                Schedule::step("send to greater than or within factor", comparisons[0], 0),
            ],
        )
    }

    fn multiple_team_inner_prior_loop_schedule(&self) -> Schedule {
        let differences = self.differences.base().local_factors();
        let comparisons = self.comparisons.base().local_factors();
        let total_team_differences = differences.len();

        let forward = (0..total_team_differences - 1)
            .map(|i| {
                Schedule::sequence(
                    format!("current forward schedule piece {}", i),
                    vec![
                        Schedule::step(format!("team perf to perf diff {}", i), differences[i], 0),
                        Schedule::step(
                            format!("greater than or within result factor {}", i),
                            comparisons[i],
                            0,
                        ),
                        Schedule::step(format!("team perf to perf diff factors [{}], 2", i), differences[i], 2),
                    ],
                )
            })
            .collect();

        let backward = (0..total_team_differences - 1)
            .map(|i| {
                let index = total_team_differences - 1 - i;
                Schedule::sequence(
                    format!("current backward schedule piece {}", i),
                    vec![
                        Schedule::step(format!("team perf to perf diff factors [{}] @ 0", index), differences[index], 0),
                        Schedule::step(
                            format!("greater than or within result factors [{}] @ 0", index),
                            comparisons[index],
                            0,
                        ),
                        Schedule::step(format!("team perf to perf diff factors [{}] @ 1", index), differences[index], 1),
                    ],
                )
            })
            .collect();

        let forward_backward = Schedule::sequence(
            "forward backward schedule to loop",
            vec![
                Schedule::sequence("forward schedule", forward),
                Schedule::sequence("backward schedule", backward),
            ],
        );

        Schedule::looped(
            format!("loop with max delta of {}", self.loop_max_delta),
            forward_backward,
            self.loop_max_delta,
        )
        .with_max_iterations(self.max_loop_iterations)
    }

    fn difference_factors(&self) -> &[FactorId] {
        self.differences.base().local_factors()
    }
}

impl FactorGraphLayer<GaussianDistribution> for IteratedTeamDifferencesInnerLayer {
    fn name(&self) -> &str {
        "IteratedTeamDifferencesInnerLayer"
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
        self.differences
            .set_input_variables_groups(self.base.input_variables_groups().clone())?;
        self.differences.build_layer(graph)?;

        self.comparisons
            .set_input_variables_groups(self.differences.output_variables_groups().clone())?;
        self.comparisons.build_layer(graph)
    }

    fn create_prior_schedule(&self) -> Result<Option<Schedule>> {
        let inner_loop = match self.base.input_variables_groups().len() {
            0 | 1 => {
                return Err(SkillError::invalid_operation(
                    "at least two teams are needed to compare team performances",
                ))
            }
            2 => self.two_team_inner_prior_loop_schedule(),
            _ => self.multiple_team_inner_prior_loop_schedule(),
        };

        let differences = self.difference_factors();
        let total_team_differences = differences.len();

        Ok(Some(Schedule::sequence(
            "inner schedule",
            vec![
                inner_loop,
                Schedule::step(
                    "teamPerformanceToPerformanceDifferenceFactors[0] @ 1",
                    differences[0],
                    1,
                ),
                Schedule::step(
                    format!(
                        "teamPerformanceToPerformanceDifferenceFactors[{}] @ 2",
                        total_team_differences - 1
                    ),
                    differences[total_team_differences - 1],
                    2,
                ),
            ],
        )))
    }

    fn factors(&self) -> Vec<FactorId> {
        let mut factors = self.differences.factors();
        factors.extend(self.comparisons.factors());
        factors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trueskill::layers::test_support::{factory, groups};

    fn built(ranks: Vec<u32>) -> (FactorGraph<GaussianDistribution>, IteratedTeamDifferencesInnerLayer) {
        let team_count = ranks.len();
        let mut graph = FactorGraph::new();
        let input = groups(&mut graph, &vec![1; team_count], 0.0);
        let mut layer = IteratedTeamDifferencesInnerLayer::new(
            team_count,
            TeamPerformancesToTeamPerformanceDifferencesLayer::new(team_count, factory()),
            TeamDifferencesComparisonLayer::new(ranks, 0.5),
        );
        layer.set_input_variables_groups(input).unwrap();
        layer.build_layer(&mut graph).unwrap();
        (graph, layer)
    }

    fn steps(schedule: &Schedule, out: &mut Vec<(usize, usize)>) {
        match schedule {
            Schedule::Step { factor, index, .. } => out.push((factor.index(), *index)),
            Schedule::Sequence { schedules, .. } => schedules.iter().for_each(|child| steps(child, out)),
            Schedule::Loop { schedule, .. } => steps(schedule, out),
        }
    }

    #[test]
    fn test_two_team_schedule() {
        let (_, layer) = built(vec![1, 2]);
        let factors = layer.factors();
        assert_eq!(factors.len(), 2);

        let schedule = layer.create_prior_schedule().unwrap().unwrap();
        let mut visited = Vec::new();
        steps(&schedule, &mut visited);

        let (difference, comparison) = (factors[0].index(), factors[1].index());
        assert_eq!(
            visited,
            vec![(difference, 0), (comparison, 0), (difference, 1), (difference, 2)]
        );
    }

    #[test]
    fn test_multi_team_schedule_loops_forward_then_backward() {
        let (mut graph, layer) = built(vec![1, 2, 3]);
        let layer = layer.with_loop_limits(DEFAULT_LOOP_MAX_DELTA, Some(500));
        let factors = layer.factors();
        let (d0, d1, c0, c1) = (
            factors[0].index(),
            factors[1].index(),
            factors[2].index(),
            factors[3].index(),
        );

        let schedule = layer.create_prior_schedule().unwrap().unwrap();
        let Schedule::Sequence { schedules, .. } = &schedule else {
            panic!("expected a sequence");
        };
        assert!(matches!(schedules[0], Schedule::Loop { max_delta, .. } if max_delta == DEFAULT_LOOP_MAX_DELTA));

        let mut visited = Vec::new();
        steps(&schedule, &mut visited);
        assert_eq!(
            visited,
            vec![(d0, 0), (c0, 0), (d0, 2), (d1, 0), (c1, 0), (d1, 1), (d0, 1), (d1, 2)]
        );

        let delta = schedule.visit(&mut graph).unwrap();
        assert!(delta.is_finite());
    }

    #[test]
    fn test_loop_limits_are_forwarded() {
        let (_, layer) = built(vec![1, 2, 3, 4]);
        let layer = layer.with_loop_limits(0.01, Some(7));

        let schedule = layer.create_prior_schedule().unwrap().unwrap();
        let Schedule::Sequence { schedules, .. } = &schedule else {
            panic!("expected a sequence");
        };
        assert!(matches!(
            schedules[0],
            Schedule::Loop { max_delta, max_iterations: Some(7), .. } if max_delta == 0.01
        ));
    }

    #[test]
    fn test_single_team_rejected() {
        let mut layer = IteratedTeamDifferencesInnerLayer::new(
            1,
            TeamPerformancesToTeamPerformanceDifferencesLayer::new(1, factory()),
            TeamDifferencesComparisonLayer::new(vec![1], 0.5),
        );
        let mut graph = FactorGraph::new();
        let input = groups(&mut graph, &[1], 0.0);
        layer.set_input_variables_groups(input).unwrap();
        layer.build_layer(&mut graph).unwrap();

        assert!(matches!(
            layer.create_prior_schedule(),
            Err(SkillError::InvalidOperation { .. })
        ));
    }
}
