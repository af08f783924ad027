//! Constrains one variable to a weighted sum of others and updates every
//! edge through the rearranged linear relation.

use crate::error::{Result, SkillError};
use crate::factor_graphs::{Factor, FactorBindings, Message, VariableArena, VariableId};
use crate::numerics::GaussianDistribution;

use super::{bind_uniform, send_gaussian};

/// Linear constraint `sum = Σ aᵢ·xᵢ`. Edge 0 is the sum, edges 1..=n the terms.
///
/// Updating edge `k > 0` solves the same constraint for `x_k`, so every edge
/// carries its own weight row and the order in which the other edges are read.
#[derive(Debug, Clone)]
pub struct GaussianWeightedSumFactor {
    bindings: FactorBindings<GaussianDistribution>,
    weights: Vec<Vec<f64>>,
    weights_squared: Vec<Vec<f64>>,
    variable_index_orders: Vec<Vec<usize>>,
}

impl GaussianWeightedSumFactor {
    pub fn new(
        sum: VariableId,
        terms: &[VariableId],
        term_weights: &[f64],
        variables: &VariableArena<GaussianDistribution>,
    ) -> Result<Self> {
        if terms.len() != term_weights.len() {
            return Err(SkillError::invalid_argument(format!(
                "weighted sum over {} variables given {} weights",
                terms.len(),
                term_weights.len()
            )));
        }

        let (weights, variable_index_orders) = solve_for_each_edge(term_weights);
        let weights_squared = weights
            .iter()
            .map(|row| row.iter().map(|w| w * w).collect())
            .collect();

        let mut factor = Self {
            bindings: FactorBindings::new(sum_name(sum, terms, term_weights, variables)),
            weights,
            weights_squared,
            variable_index_orders,
        };

        factor.create_variable_to_message_binding(variables, sum);
        for term in terms {
            factor.create_variable_to_message_binding(variables, *term);
        }
        Ok(factor)
    }
}

/// Weight rows and read orders for every edge. Row 0 is the constraint as
/// given; row `k` rearranges it as `x_k = sum/a_k - Σ_{j≠k} (a_j/a_k)·x_j`.
/// A zero weight makes its row all zeros instead of dividing by it.
fn solve_for_each_edge(term_weights: &[f64]) -> (Vec<Vec<f64>>, Vec<Vec<usize>>) {
    let n = term_weights.len();
    let mut weights = Vec::with_capacity(n + 1);
    let mut orders = Vec::with_capacity(n + 1);

    weights.push(term_weights.to_vec());
    orders.push((0..=n).collect());

    for edge in 1..=n {
        let pivot = term_weights[edge - 1];
        let mut row = Vec::with_capacity(n);
        let mut order = Vec::with_capacity(n + 1);
        order.push(edge);

        for (source, weight) in term_weights.iter().enumerate() {
            if source == edge - 1 {
                continue;
            }
            row.push(if pivot == 0.0 { 0.0 } else { -weight / pivot });
            order.push(source + 1);
        }

        row.push(if pivot == 0.0 { 0.0 } else { 1.0 / pivot });
        order.push(0);

        weights.push(row);
        orders.push(order);
    }

    (weights, orders)
}

fn sum_name(
    sum: VariableId,
    terms: &[VariableId],
    term_weights: &[f64],
    variables: &VariableArena<GaussianDistribution>,
) -> String {
    let mut name = format!("{} = ", variables.name(sum));
    for (i, (term, weight)) in terms.iter().zip(term_weights).enumerate() {
        let negative = *weight < 0.0;
        if i > 0 {
            name.push_str(if negative { " - " } else { " + " });
        } else if negative {
            name.push('-');
        }
        name.push_str(&format!("{:.2}*[{}]", weight.abs(), variables.name(*term)));
    }
    name
}

impl Factor<GaussianDistribution> for GaussianWeightedSumFactor {
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
        let order = &self.variable_index_orders[index];
        let weights = &self.weights[index];
        let weights_squared = &self.weights_squared[index];

        let mut inverse_of_new_precision_sum = 0.0;
        let mut weighted_mean_sum = 0.0;

        for (i, edge) in order.iter().skip(1).enumerate() {
            let marginal = variables.value(self.bindings.variable(*edge));
            let message = self.bindings.message(*edge).value();
            let cavity_precision = marginal.precision() - message.precision();

            inverse_of_new_precision_sum += weights_squared[i] / cavity_precision;
            weighted_mean_sum +=
                weights[i] * (marginal.precision_mean() - message.precision_mean()) / cavity_precision;
        }

        let new_precision = 1.0 / inverse_of_new_precision_sum;
        let new_message =
            GaussianDistribution::from_precision_mean(new_precision * weighted_mean_sum, new_precision);

        let target = self.bindings.variable(index);
        let old_marginal = *variables.value(target);
        let old_message = *self.bindings.message(index).value();
        let new_marginal = (old_marginal / old_message) * new_message;

        self.bindings.message_mut(index).set_value(new_message);
        variables.set_value(target, new_marginal)?;
        Ok(new_marginal.absolute_difference(&old_marginal))
    }

    fn send_message_at(
        &mut self,
        index: usize,
        variables: &mut VariableArena<GaussianDistribution>,
    ) -> Result<f64> {
        send_gaussian(&self.bindings, index, variables)
    }

    fn log_normalization(&self, variables: &VariableArena<GaussianDistribution>) -> f64 {
        (1..self.bindings.len())
            .map(|i| {
                GaussianDistribution::log_ratio_normalization(
                    variables.value(self.bindings.variable(i)),
                    self.bindings.message(i).value(),
                )
            })
            .sum()
    }
}
