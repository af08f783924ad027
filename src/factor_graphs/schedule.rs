//! Evaluation-order plans for message updates
//!
//! A schedule is a small tree: steps update a single edge, sequences run their
//! children in construction order, and loops repeat a child until the largest
//! marginal change it reports drops to the threshold.

use std::fmt;

use tracing::{trace, warn};

use super::graph::{FactorGraph, FactorId};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Schedule {
    /// Update one edge of one factor.
    Step {
        name: String,
        factor: FactorId,
        index: usize,
    },
    /// Visit children in order; reports the largest child delta.
    Sequence {
        name: String,
        schedules: Vec<Schedule>,
    },
    /// Visit `schedule` at least once and again while its delta exceeds `max_delta`.
    Loop {
        name: String,
        schedule: Box<Schedule>,
        max_delta: f64,
        max_iterations: Option<usize>,
    },
}

impl Schedule {
    pub fn step(name: impl Into<String>, factor: FactorId, index: usize) -> Self {
        Schedule::Step {
            name: name.into(),
            factor,
            index,
        }
    }

    pub fn sequence(name: impl Into<String>, schedules: Vec<Schedule>) -> Self {
        Schedule::Sequence {
            name: name.into(),
            schedules,
        }
    }

    /// Loop without an iteration cap. Termination relies on the factor math
    /// driving the delta below `max_delta`.
    pub fn looped(name: impl Into<String>, schedule: Schedule, max_delta: f64) -> Self {
        Schedule::Loop {
            name: name.into(),
            schedule: Box::new(schedule),
            max_delta,
            max_iterations: None,
        }
    }

    /// Bound the number of visits of a loop. No effect on steps and sequences.
    pub fn with_max_iterations(self, cap: Option<usize>) -> Self {
        match self {
            Schedule::Loop {
                name,
                schedule,
                max_delta,
                ..
            } => Schedule::Loop {
                name,
                schedule,
                max_delta,
                max_iterations: cap,
            },
            other => other,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Schedule::Step { name, .. }
            | Schedule::Sequence { name, .. }
            | Schedule::Loop { name, .. } => name,
        }
    }

    /// Evaluate the tree once and return the largest delta it reports.
    pub fn visit<T: Clone>(&self, graph: &mut FactorGraph<T>) -> Result<f64> {
        match self {
            Schedule::Step { factor, index, .. } => graph.update_message(*factor, *index),
            Schedule::Sequence { schedules, .. } => {
                let mut max_delta: f64 = 0.0;
                for schedule in schedules {
                    max_delta = max_delta.max(schedule.visit(graph)?);
                }
                Ok(max_delta)
            }
            Schedule::Loop {
                name,
                schedule,
                max_delta,
                max_iterations,
            } => {
                let mut iterations = 1;
                let mut delta = schedule.visit(graph)?;

                while delta > *max_delta {
                    if let Some(cap) = max_iterations {
                        if iterations >= *cap {
                            warn!(
                                "{} stopped after {} iterations with delta {}",
                                name, iterations, delta
                            );
                            break;
                        }
                    }

                    delta = schedule.visit(graph)?;
                    iterations += 1;
                }

                trace!("{} converged after {} iterations", name, iterations);
                Ok(delta)
            }
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
