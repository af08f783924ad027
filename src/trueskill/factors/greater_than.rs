//! Conditions a performance difference on exceeding the draw margin.

use crate::error::Result;
use crate::factor_graphs::{Factor, FactorBindings, Message, VariableArena, VariableId};
use crate::numerics::{truncated, GaussianDistribution};

use super::{bind_uniform, replace_marginal, send_gaussian};

/// Evidence that a variable exceeds a margin `ε`: truncates its belief to `x > ε`.
#[derive(Debug, Clone)]
pub struct GaussianGreaterThanFactor {
    bindings: FactorBindings<GaussianDistribution>,
    epsilon: f64,
}

impl GaussianGreaterThanFactor {
    pub fn new(epsilon: f64, variable: VariableId, variables: &VariableArena<GaussianDistribution>) -> Self {
        let mut factor = Self {
            bindings: FactorBindings::new(format!("{} > {:.3}", variables.name(variable), epsilon)),
            epsilon,
        };
        factor.create_variable_to_message_binding(variables, variable);
        factor
    }
}

impl Factor<GaussianDistribution> for GaussianGreaterThanFactor {
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

        let denominator = 1.0 - truncated::w_exceeds_margin(d_on_sqrt_c, epsilon_times_sqrt_c);
        let new_precision = c / denominator;
        let new_precision_mean =
            (d + sqrt_c * truncated::v_exceeds_margin(d_on_sqrt_c, epsilon_times_sqrt_c)) / denominator;

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

        -GaussianDistribution::log_product_normalization(&message_from_variable, message)
            + GaussianDistribution::cumulative_to(
                (message_from_variable.mean() - self.epsilon) / message_from_variable.standard_deviation(),
            )
            .ln()
    }
}
