//! Gaussian factor kinds used by the rating graph
//!
//! All of them start every edge from the uniform distribution and share the
//! same send rule: multiply the message into the marginal and report the log
//! of the product's normalization constant.

mod greater_than;
mod likelihood;
mod prior;
mod weighted_sum;
mod within;

pub use greater_than::GaussianGreaterThanFactor;
pub use likelihood::GaussianLikelihoodFactor;
pub use prior::GaussianPriorFactor;
pub use weighted_sum::GaussianWeightedSumFactor;
pub use within::GaussianWithinFactor;

use crate::error::Result;
use crate::factor_graphs::{FactorBindings, Message, VariableArena, VariableId};
use crate::numerics::GaussianDistribution;

pub(crate) fn bind_uniform<'a>(
    bindings: &'a mut FactorBindings<GaussianDistribution>,
    variables: &VariableArena<GaussianDistribution>,
    variable: VariableId,
) -> &'a Message<GaussianDistribution> {
    let name = format!("message from {} to {}", bindings, variables.name(variable));
    bindings.bind(variable, Message::new(GaussianDistribution::uniform(), name))
}

pub(crate) fn send_gaussian(
    bindings: &FactorBindings<GaussianDistribution>,
    index: usize,
    variables: &mut VariableArena<GaussianDistribution>,
) -> Result<f64> {
    let variable = bindings.variable(index);
    let marginal = *variables.value(variable);
    let message = *bindings.message(index).value();

    let log_z = GaussianDistribution::log_product_normalization(&marginal, &message);
    variables.set_value(variable, marginal * message)?;
    Ok(log_z)
}

/// Install `new_marginal` on edge `index` and rescale the message so the
/// cavity (marginal / message) is unchanged. Returns the marginal change.
pub(crate) fn replace_marginal(
    bindings: &mut FactorBindings<GaussianDistribution>,
    index: usize,
    variables: &mut VariableArena<GaussianDistribution>,
    new_marginal: GaussianDistribution,
) -> Result<f64> {
    let variable = bindings.variable(index);
    let old_marginal = *variables.value(variable);
    let old_message = *bindings.message(index).value();

    let new_message = old_message * new_marginal / old_marginal;
    bindings.message_mut(index).set_value(new_message);
    variables.set_value(variable, new_marginal)?;
    Ok(new_marginal.absolute_difference(&old_marginal))
}
