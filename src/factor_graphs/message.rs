//! Messages carried on factor-to-variable edges

use std::fmt;

/// Belief sent by one factor to one variable. Owned by the factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Message<T> {
    name: String,
    value: T,
}

impl<T> Message<T> {
    pub fn new(value: T, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }
}

impl<T> fmt::Display for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
