//! The factor node contract
//!
//! A factor owns one message per edge and remembers, in creation order, which
//! variable each edge points at. Concrete factor kinds implement the per-edge
//! update and send formulas; index validation, binding bookkeeping and marginal
//! resets are shared here.

use std::fmt;

use super::message::Message;
use super::variable::{VariableArena, VariableId};
use crate::error::{Result, SkillError};

/// Edge bookkeeping shared by every factor kind.
#[derive(Debug, Clone)]
pub struct FactorBindings<T> {
    name: String,
    messages: Vec<Message<T>>,
    variables: Vec<VariableId>,
}

impl<T> FactorBindings<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: format!("Factor[{}]", name.into()),
            messages: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a new edge and return a reference to its message.
    pub fn bind(&mut self, variable: VariableId, message: Message<T>) -> &Message<T> {
        self.messages.push(message);
        self.variables.push(variable);
        &self.messages[self.messages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        SkillError::check_index(&self.name, index, self.messages.len())
    }

    pub fn message(&self, index: usize) -> &Message<T> {
        &self.messages[index]
    }

    pub fn message_mut(&mut self, index: usize) -> &mut Message<T> {
        &mut self.messages[index]
    }

    pub fn messages(&self) -> &[Message<T>] {
        &self.messages
    }

    pub fn variable(&self, index: usize) -> VariableId {
        self.variables[index]
    }

    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }
}

impl<T> fmt::Display for FactorBindings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A factor node over variables holding values of type `T`.
///
/// Implementors provide `update_message_at` and `send_message_at`; callers go
/// through `update_message` and `send_message`, which reject edge indices the
/// factor does not have before dispatching.
pub trait Factor<T> {
    fn bindings(&self) -> &FactorBindings<T>;

    /// Create this factor's message for a new edge to `variable`.
    fn create_variable_to_message_binding(
        &mut self,
        variables: &VariableArena<T>,
        variable: VariableId,
    ) -> &Message<T>;

    /// Recompute the message on edge `index` and fold it into the marginal.
    /// `index` has already been validated. Returns the change in the marginal.
    fn update_message_at(&mut self, index: usize, variables: &mut VariableArena<T>) -> Result<f64>;

    /// Multiply the message on edge `index` into the marginal and return the
    /// edge's log-normalization contribution. `index` has already been validated.
    fn send_message_at(&mut self, index: usize, variables: &mut VariableArena<T>) -> Result<f64>;

    /// The factor's own log-normalization term.
    fn log_normalization(&self, _variables: &VariableArena<T>) -> f64 {
        0.0
    }

    fn name<'a>(&'a self) -> &'a str
    where
        T: 'a,
    {
        self.bindings().name()
    }

    fn number_of_messages(&self) -> usize {
        self.bindings().len()
    }

    fn update_message(&mut self, index: usize, variables: &mut VariableArena<T>) -> Result<f64> {
        self.bindings().check_index(index)?;
        self.update_message_at(index, variables)
    }

    fn send_message(&mut self, index: usize, variables: &mut VariableArena<T>) -> Result<f64> {
        self.bindings().check_index(index)?;
        self.send_message_at(index, variables)
    }

    fn reset_marginals(&self, variables: &mut VariableArena<T>)
    where
        T: Clone,
    {
        for variable in self.bindings().variables() {
            variables.reset_to_prior(*variable);
        }
    }
}
