//! Pipeline stages that build a factor graph layer by layer
//!
//! Each layer takes the previous layer's output variables, grouped per team,
//! creates its own variables and factors, and optionally contributes a
//! schedule for the forward (prior) and backward (posterior) sweeps.

use super::graph::{FactorGraph, FactorId};
use super::schedule::Schedule;
use super::variable::VariableId;
use crate::error::{Result, SkillError};

/// Variables grouped per team: outer index is the team, inner the member.
pub type VariableGroups = Vec<Vec<VariableId>>;

/// What input grouping a layer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupShape {
    /// The layer derives its variables itself and takes no input.
    NoInput,
    /// Exactly these group sizes, in order.
    Sizes(Vec<usize>),
    /// Any grouping.
    Unconstrained,
}

impl GroupShape {
    /// `count` groups of one variable each.
    pub fn singletons(count: usize) -> Self {
        GroupShape::Sizes(vec![1; count])
    }

    pub fn check(&self, layer: &str, groups: &VariableGroups) -> Result<()> {
        match self {
            GroupShape::Unconstrained => Ok(()),
            GroupShape::NoInput => Err(SkillError::invalid_argument(format!(
                "{} takes no input variables",
                layer
            ))),
            GroupShape::Sizes(expected) => {
                let actual: Vec<usize> = groups.iter().map(Vec::len).collect();
                if &actual == expected {
                    Ok(())
                } else {
                    Err(SkillError::invalid_argument(format!(
                        "{} expects input groups of sizes {:?}, got {:?}",
                        layer, expected, actual
                    )))
                }
            }
        }
    }
}

/// Input, output and factors common to every layer.
#[derive(Debug, Clone, Default)]
pub struct LayerBase {
    input_variables_groups: VariableGroups,
    output_variables_groups: VariableGroups,
    local_factors: Vec<FactorId>,
}

impl LayerBase {
    pub fn input_variables_groups(&self) -> &VariableGroups {
        &self.input_variables_groups
    }

    pub fn output_variables_groups(&self) -> &VariableGroups {
        &self.output_variables_groups
    }

    pub fn local_factors(&self) -> &[FactorId] {
        &self.local_factors
    }

    pub fn add_output_group(&mut self, group: Vec<VariableId>) {
        self.output_variables_groups.push(group);
    }

    pub fn add_layer_factor(&mut self, factor: FactorId) {
        self.local_factors.push(factor);
    }

    fn set_input_variables_groups(&mut self, groups: VariableGroups) {
        self.input_variables_groups = groups;
    }
}

/// One stage of a layered factor graph over values of type `T`.
pub trait FactorGraphLayer<T> {
    fn name(&self) -> &str;

    fn base(&self) -> &LayerBase;

    fn base_mut(&mut self) -> &mut LayerBase;

    /// Grouping this layer accepts from the previous one.
    fn input_shape(&self) -> GroupShape;

    /// Create output variables and local factors from the current input.
    fn build_layer(&mut self, graph: &mut FactorGraph<T>) -> Result<()>;

    fn create_prior_schedule(&self) -> Result<Option<Schedule>> {
        Ok(None)
    }

    fn create_posterior_schedule(&self) -> Result<Option<Schedule>> {
        Ok(None)
    }

    /// Hand over the previous layer's output, rejecting a mismatched shape
    /// before anything is built.
    fn set_input_variables_groups(&mut self, groups: VariableGroups) -> Result<()> {
        self.input_shape().check(self.name(), &groups)?;
        self.base_mut().set_input_variables_groups(groups);
        Ok(())
    }

    fn output_variables_groups(&self) -> &VariableGroups {
        self.base().output_variables_groups()
    }

    /// Every factor this layer contributes to the graph.
    fn factors(&self) -> Vec<FactorId> {
        self.base().local_factors().to_vec()
    }
}
