//! Variable nodes and the arena that owns them
//!
//! Many factors may send messages into the same variable, so variables are
//! not owned by any one factor. They live in a [`VariableArena`] and factors
//! refer to them through copyable [`VariableId`] handles.

use std::fmt;

use crate::error::{Result, SkillError};

/// Stable handle to a variable inside one [`VariableArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(usize);

impl VariableId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named marginal with the prior it resets to.
#[derive(Debug, Clone)]
pub struct Variable<T> {
    name: String,
    prior: T,
    value: T,
    read_only: bool,
}

impl<T: Clone> Variable<T> {
    pub fn new(name: impl Into<String>, prior: T) -> Self {
        Self {
            name: format!("Variable[{}]", name.into()),
            value: prior.clone(),
            prior,
            read_only: false,
        }
    }

    /// Sentinel for output slots nobody reads: always holds `default` and
    /// rejects every write.
    pub fn read_only(default: T) -> Self {
        Self {
            name: "Variable[Default]".to_string(),
            value: default.clone(),
            prior: default,
            read_only: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn prior(&self) -> &T {
        &self.prior
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_value(&mut self, value: T) -> Result<()> {
        if self.read_only {
            return Err(SkillError::UnsupportedWrite {
                name: self.name.clone(),
            });
        }
        self.value = value;
        Ok(())
    }

    pub fn reset_to_prior(&mut self) {
        self.value = self.prior.clone();
    }
}

impl<T> fmt::Display for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A variable handle tagged with the key (usually a player) it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedVariable<K> {
    key: K,
    id: VariableId,
}

impl<K> KeyedVariable<K> {
    pub fn new(key: K, id: VariableId) -> Self {
        Self { key, id }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn id(&self) -> VariableId {
        self.id
    }
}

/// Owns every variable of one factor graph.
///
/// Handles are only meaningful for the arena that issued them; looking up a
/// handle from another arena panics.
#[derive(Debug, Clone)]
pub struct VariableArena<T> {
    variables: Vec<Variable<T>>,
}

impl<T> Default for VariableArena<T> {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
        }
    }
}

impl<T> VariableArena<T> {
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, id: VariableId) -> &Variable<T> {
        &self.variables[id.0]
    }

    pub fn name(&self, id: VariableId) -> &str {
        &self.get(id).name
    }

    pub fn value(&self, id: VariableId) -> &T {
        &self.get(id).value
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &Variable<T>)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, variable)| (VariableId(index), variable))
    }
}

impl<T: Clone> VariableArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, variable: Variable<T>) -> VariableId {
        self.variables.push(variable);
        VariableId(self.variables.len() - 1)
    }

    pub fn set_value(&mut self, id: VariableId, value: T) -> Result<()> {
        self.variables[id.0].set_value(value)
    }

    pub fn reset_to_prior(&mut self, id: VariableId) {
        self.variables[id.0].reset_to_prior();
    }
}
