//! Scripted factors for exercising schedules and normalization without
//! any real message math.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::factor::{Factor, FactorBindings};
use super::message::Message;
use super::variable::{VariableArena, VariableId};
use crate::error::Result;

pub(crate) type VisitLog = Rc<RefCell<Vec<String>>>;

/// Returns queued deltas from `update_message` (0.0 once drained) and records
/// every visit as `"<label>@<edge>"`.
pub(crate) struct ScriptedFactor {
    bindings: FactorBindings<f64>,
    label: String,
    deltas: VecDeque<f64>,
    log: VisitLog,
    self_normalization: f64,
}

impl ScriptedFactor {
    pub(crate) fn new(
        label: &str,
        variables: &mut VariableArena<f64>,
        bound: &[VariableId],
        deltas: &[f64],
        log: VisitLog,
    ) -> Self {
        let mut factor = Self {
            bindings: FactorBindings::new(label),
            label: label.to_string(),
            deltas: deltas.iter().copied().collect(),
            log,
            self_normalization: 0.0,
        };
        for variable in bound {
            factor.create_variable_to_message_binding(variables, *variable);
        }
        factor
    }

    pub(crate) fn with_self_normalization(mut self, value: f64) -> Self {
        self.self_normalization = value;
        self
    }
}

impl Factor<f64> for ScriptedFactor {
    fn bindings(&self) -> &FactorBindings<f64> {
        &self.bindings
    }

    fn create_variable_to_message_binding(
        &mut self,
        variables: &VariableArena<f64>,
        variable: VariableId,
    ) -> &Message<f64> {
        let name = format!("message from {} to {}", self.bindings, variables.name(variable));
        self.bindings.bind(variable, Message::new(1.0, name))
    }

    fn update_message_at(&mut self, index: usize, variables: &mut VariableArena<f64>) -> Result<f64> {
        self.log.borrow_mut().push(format!("{}@{}", self.label, index));
        let variable = self.bindings.variable(index);
        let current = *variables.value(variable);
        variables.set_value(variable, current + 1.0)?;
        Ok(self.deltas.pop_front().unwrap_or(0.0))
    }

    fn send_message_at(&mut self, index: usize, variables: &mut VariableArena<f64>) -> Result<f64> {
        let variable = self.bindings.variable(index);
        let message = *self.bindings.message(index).value();
        let marginal = *variables.value(variable);
        variables.set_value(variable, marginal + message)?;
        Ok(marginal)
    }

    fn log_normalization(&self, _variables: &VariableArena<f64>) -> f64 {
        self.self_normalization
    }
}
