//! Normalization constant of a whole factor graph

use super::graph::{FactorGraph, FactorId};
use crate::error::Result;

/// The set of factors whose joint normalization is being computed.
#[derive(Debug, Clone, Default)]
pub struct FactorList {
    factors: Vec<FactorId>,
}

impl FactorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_factor(&mut self, factor: FactorId) -> FactorId {
        self.factors.push(factor);
        factor
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FactorId> + '_ {
        self.factors.iter().copied()
    }

    /// Log of the graph's normalization constant.
    ///
    /// Resets every marginal to its prior, re-sends every message once and
    /// adds each factor's own term. Only meaningful once propagation has
    /// converged, since it reads the messages left behind by the schedule.
    pub fn log_normalization<T: Clone>(&self, graph: &mut FactorGraph<T>) -> Result<f64> {
        for factor in &self.factors {
            graph.reset_marginals(*factor)?;
        }

        let mut sum_log_z = 0.0;
        for factor in &self.factors {
            let messages = graph.factor(*factor)?.number_of_messages();
            for index in 0..messages {
                sum_log_z += graph.send_message(*factor, index)?;
            }
        }

        let mut sum_log_s = 0.0;
        for factor in &self.factors {
            sum_log_s += graph.log_normalization(*factor)?;
        }

        Ok(sum_log_z + sum_log_s)
    }
}

impl FromIterator<FactorId> for FactorList {
    fn from_iter<I: IntoIterator<Item = FactorId>>(iter: I) -> Self {
        Self {
            factors: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor_graphs::testing::{ScriptedFactor, VisitLog};
    use crate::factor_graphs::variable::Variable;

    fn scripted_graph() -> (FactorGraph<f64>, FactorList) {
        let log = VisitLog::default();
        let mut graph = FactorGraph::new();
        let x = graph.variables_mut().add(Variable::new("x", 2.0));
        let y = graph.variables_mut().add(Variable::new("y", 3.0));

        let first = ScriptedFactor::new("first", graph.variables_mut(), &[x, y], &[], log.clone())
            .with_self_normalization(0.5);
        let second = ScriptedFactor::new("second", graph.variables_mut(), &[x], &[], log)
            .with_self_normalization(-0.25);

        let list = [graph.add_factor(first), graph.add_factor(second)]
            .into_iter()
            .collect();
        (graph, list)
    }

    #[test]
    fn test_log_normalization_sums_sends_and_self_terms() {
        let (mut graph, list) = scripted_graph();

        // Each send returns the marginal before adding the message (1.0):
        // first@0 -> 2, first@1 -> 3, second@0 -> 3; self terms 0.5 - 0.25.
        let value = list.log_normalization(&mut graph).unwrap();
        assert!((value - 8.25).abs() < 1e-12);
    }

    #[test]
    fn test_log_normalization_is_idempotent() {
        let (mut graph, list) = scripted_graph();

        let first = list.log_normalization(&mut graph).unwrap();
        let second = list.log_normalization(&mut graph).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resets_perturbed_marginals() {
        let (mut graph, list) = scripted_graph();
        let baseline = list.log_normalization(&mut graph).unwrap();

        for factor in list.iter() {
            graph.update_message(factor, 0).unwrap();
        }

        assert_eq!(list.log_normalization(&mut graph).unwrap(), baseline);
    }

    #[test]
    fn test_empty_list() {
        let mut graph: FactorGraph<f64> = FactorGraph::new();
        let list = FactorList::new();
        assert!(list.is_empty());
        assert_eq!(list.log_normalization(&mut graph).unwrap(), 0.0);
    }
}
