//! Links a skill to a noisy performance through a fixed variance (β²).

use crate::error::Result;
use crate::factor_graphs::{Factor, FactorBindings, Message, VariableArena, VariableId};
use crate::numerics::GaussianDistribution;

use super::{bind_uniform, send_gaussian};

/// Connects two variables through Gaussian noise of fixed variance:
/// `x ~ N(y, β²)`. Edge 0 is the noisy value, edge 1 the underlying mean.
#[derive(Debug, Clone)]
pub struct GaussianLikelihoodFactor {
    bindings: FactorBindings<GaussianDistribution>,
    precision: f64,
}

impl GaussianLikelihoodFactor {
    pub fn new(
        beta_squared: f64,
        noisy: VariableId,
        mean: VariableId,
        variables: &VariableArena<GaussianDistribution>,
    ) -> Self {
        let mut factor = Self {
            bindings: FactorBindings::new(format!(
                "Likelihood of {} going to {}",
                variables.name(mean),
                variables.name(noisy)
            )),
            precision: 1.0 / beta_squared,
        };
        factor.create_variable_to_message_binding(variables, noisy);
        factor.create_variable_to_message_binding(variables, mean);
        factor
    }
}

impl Factor<GaussianDistribution> for GaussianLikelihoodFactor {
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
        let source = 1 - index;

        let target_variable = self.bindings.variable(index);
        let target_message = *self.bindings.message(index).value();
        let target_marginal = *variables.value(target_variable);
        let source_message = *self.bindings.message(source).value();
        let source_marginal = *variables.value(self.bindings.variable(source));

        let a = self.precision
            / (self.precision + source_marginal.precision() - source_message.precision());
        let new_message = GaussianDistribution::from_precision_mean(
            a * (source_marginal.precision_mean() - source_message.precision_mean()),
            a * (source_marginal.precision() - source_message.precision()),
        );

        let new_marginal = (target_marginal / target_message) * new_message;

        self.bindings.message_mut(index).set_value(new_message);
        variables.set_value(target_variable, new_marginal)?;
        Ok(new_marginal.absolute_difference(&target_marginal))
    }

    fn send_message_at(
        &mut self,
        index: usize,
        variables: &mut VariableArena<GaussianDistribution>,
    ) -> Result<f64> {
        send_gaussian(&self.bindings, index, variables)
    }

    fn log_normalization(&self, variables: &VariableArena<GaussianDistribution>) -> f64 {
        GaussianDistribution::log_ratio_normalization(
            variables.value(self.bindings.variable(0)),
            self.bindings.message(0).value(),
        )
    }
}
