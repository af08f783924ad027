//! Fixed Gaussian belief sent to a single variable, used to seed skills from ratings.

use crate::error::Result;
use crate::factor_graphs::{Factor, FactorBindings, Message, VariableArena, VariableId};
use crate::numerics::GaussianDistribution;

use super::{bind_uniform, send_gaussian};

/// Supplies a fixed Gaussian belief to a single variable.
#[derive(Debug, Clone)]
pub struct GaussianPriorFactor {
    bindings: FactorBindings<GaussianDistribution>,
    new_message: GaussianDistribution,
}

impl GaussianPriorFactor {
    pub fn new(
        mean: f64,
        variance: f64,
        variable: VariableId,
        variables: &VariableArena<GaussianDistribution>,
    ) -> Self {
        let mut factor = Self {
            bindings: FactorBindings::new(format!("Prior value going to {}", variables.name(variable))),
            new_message: GaussianDistribution::new(mean, variance.sqrt()),
        };
        factor.create_variable_to_message_binding(variables, variable);
        factor
    }
}

impl Factor<GaussianDistribution> for GaussianPriorFactor {
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
        let variable = self.bindings.variable(index);
        let old_marginal = *variables.value(variable);
        let old_message = *self.bindings.message(index).value();

        let new_marginal = GaussianDistribution::from_precision_mean(
            old_marginal.precision_mean() + self.new_message.precision_mean()
                - old_message.precision_mean(),
            old_marginal.precision() + self.new_message.precision() - old_message.precision(),
        );

        variables.set_value(variable, new_marginal)?;
        self.bindings.message_mut(index).set_value(self.new_message);
        Ok(old_marginal.absolute_difference(&new_marginal))
    }

    fn send_message_at(
        &mut self,
        index: usize,
        variables: &mut VariableArena<GaussianDistribution>,
    ) -> Result<f64> {
        send_gaussian(&self.bindings, index, variables)
    }
}
