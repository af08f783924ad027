//! Conditions a performance difference on lying within the draw margin.

use crate::error::Result;
use crate::factor_graphs::{Factor, FactorBindings, Message, VariableArena, VariableId};
use crate::numerics::{truncated, GaussianDistribution};

use super::{bind_uniform, replace_marginal, send_gaussian};

/// Evidence that a variable lies inside `[-ε, ε]`; used for drawn ranks.
#[derive(Debug, Clone)]
pub struct GaussianWithinFactor {
    bindings: FactorBindings<GaussianDistribution>,
    epsilon: f64,
}

impl GaussianWithinFactor {
    pub fn new(epsilon: f64, variable: VariableId, variables: &VariableArena<GaussianDistribution>) -> Self {
        let mut factor = Self {
            bindings: FactorBindings::new(format!("{} <= {:.3}", variables.name(variable), epsilon)),
            epsilon,
        };
        factor.create_variable_to_message_binding(variables, variable);
        factor
    }
}

impl Factor<GaussianDistribution> for GaussianWithinFactor {
    fn bindings(&self) -> &FactorBindings<GaussianDistribution> {
        &self.bindings
    }

    fn create_variable_to_message_binding(
        &mut self,
        variables: &VariableArena<GaussianDistribution>,
        variable: VariableId,
    ) -> &Message<GaussianDistribution> {
        bind_uniform(&mut self.bindings, variables, variable)
    }

    fn update_message_at(
        &mut self,
        index: usize,
        variables: &mut VariableArena<GaussianDistribution>,
    ) -> Result<f64> {
        let marginal = *variables.value(self.bindings.variable(index));
        let message = *self.bindings.message(index).value();
        let message_from_variable = marginal / message;

        let c = message_from_variable.precision();
        let d = message_from_variable.precision_mean();
        let sqrt_c = c.sqrt();
        let d_on_sqrt_c = d / sqrt_c;
        let epsilon_times_sqrt_c = self.epsilon * sqrt_c;

        let denominator = 1.0 - truncated::w_within_margin(d_on_sqrt_c, epsilon_times_sqrt_c);
        let new_precision = c / denominator;
        let new_precision_mean =
            (d + sqrt_c * truncated::v_within_margin(d_on_sqrt_c, epsilon_times_sqrt_c)) / denominator;

        let new_marginal = GaussianDistribution::from_precision_mean(new_precision_mean, new_precision);
        replace_marginal(&mut self.bindings, index, variables, new_marginal)
    }

    fn send_message_at(
        &mut self,
        index: usize,
        variables: &mut VariableArena<GaussianDistribution>,
    ) -> Result<f64> {
        send_gaussian(&self.bindings, index, variables)
    }

    fn log_normalization(&self, variables: &VariableArena<GaussianDistribution>) -> f64 {
        let marginal = variables.value(self.bindings.variable(0));
        let message = self.bindings.message(0).value();
        let message_from_variable = *marginal / *message;
        let mean = message_from_variable.mean();
        let standard_deviation = message_from_variable.standard_deviation();

        let z = GaussianDistribution::cumulative_to((self.epsilon - mean) / standard_deviation)
            - GaussianDistribution::cumulative_to((-self.epsilon - mean) / standard_deviation);

        -GaussianDistribution::log_product_normalization(&message_from_variable, message) + z.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor_graphs::{FactorGraph, Variable};
    use crate::trueskill::factors::test_support::assert_close;

    #[test]
    fn test_centered_draw_keeps_mean_and_narrows() {
        let mut graph = FactorGraph::new();
        let difference = graph
            .variables_mut()
            .add(Variable::new("difference", GaussianDistribution::new(0.0, 2.0)));
        let factor = GaussianWithinFactor::new(0.5, difference, graph.variables());
        let id = graph.add_factor(factor);

        let delta = graph.update_message(id, 0).unwrap();
        let marginal = graph.variables().value(difference);

        assert!(delta > 0.0);
        assert_close(marginal.mean(), 0.0, 1e-9);
        assert!(marginal.standard_deviation() < 0.5);
    }

    #[test]
    fn test_off_center_draw_pulls_toward_zero() {
        let mut graph = FactorGraph::new();
        let difference = graph
            .variables_mut()
            .add(Variable::new("difference", GaussianDistribution::new(3.0, 2.0)));
        let factor = GaussianWithinFactor::new(1.0, difference, graph.variables());
        let id = graph.add_factor(factor);

        graph.update_message(id, 0).unwrap();
        let marginal = graph.variables().value(difference);
        assert!(marginal.mean() > 0.0 && marginal.mean() < 1.0);
    }
}
