//! Arena holding every variable and factor of one computation

use std::fmt;

use super::factor::Factor;
use super::variable::VariableArena;
use crate::error::{Result, SkillError};

/// Stable handle to a factor inside one [`FactorGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactorId(usize);

impl FactorId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for FactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "factor #{}", self.0)
    }
}

/// Variables and factors of a single graph. Built fresh per computation and
/// dropped once results are extracted.
pub struct FactorGraph<T> {
    variables: VariableArena<T>,
    factors: Vec<Box<dyn Factor<T>>>,
}

impl<T: Clone> Default for FactorGraph<T> {
    fn default() -> Self {
        Self {
            variables: VariableArena::new(),
            factors: Vec::new(),
        }
    }
}

impl<T: Clone> FactorGraph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variables(&self) -> &VariableArena<T> {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableArena<T> {
        &mut self.variables
    }

    pub fn add_factor(&mut self, factor: impl Factor<T> + 'static) -> FactorId {
        self.factors.push(Box::new(factor));
        FactorId(self.factors.len() - 1)
    }

    pub fn factor_count(&self) -> usize {
        self.factors.len()
    }

    pub fn factor(&self, id: FactorId) -> Result<&dyn Factor<T>> {
        match self.factors.get(id.0) {
            Some(factor) => Ok(factor.as_ref()),
            None => Err(unknown_factor(id, self.factors.len())),
        }
    }

    pub fn update_message(&mut self, id: FactorId, index: usize) -> Result<f64> {
        let len = self.factors.len();
        let factor = self
            .factors
            .get_mut(id.0)
            .ok_or_else(|| unknown_factor(id, len))?;
        factor.update_message(index, &mut self.variables)
    }

    pub fn send_message(&mut self, id: FactorId, index: usize) -> Result<f64> {
        let len = self.factors.len();
        let factor = self
            .factors
            .get_mut(id.0)
            .ok_or_else(|| unknown_factor(id, len))?;
        factor.send_message(index, &mut self.variables)
    }

    pub fn reset_marginals(&mut self, id: FactorId) -> Result<()> {
        let len = self.factors.len();
        let factor = self
            .factors
            .get(id.0)
            .ok_or_else(|| unknown_factor(id, len))?;
        factor.reset_marginals(&mut self.variables);
        Ok(())
    }

    pub fn log_normalization(&self, id: FactorId) -> Result<f64> {
        Ok(self.factor(id)?.log_normalization(&self.variables))
    }
}

fn unknown_factor(id: FactorId, len: usize) -> SkillError {
    SkillError::InvalidIndex {
        target: "factor graph".to_string(),
        index: id.0,
        len,
    }
}

impl<T> fmt::Debug for FactorGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorGraph")
            .field("variables", &self.variables.len())
            .field("factors", &self.factors.len())
            .finish()
    }
}
