//! Builds variables whose priors come from a generator closure

use super::variable::{KeyedVariable, Variable, VariableArena, VariableId};

/// Creates variables in an arena, calling the prior generator once per
/// variable so no two variables ever start from the same prior instance.
pub struct VariableFactory<T> {
    prior_initializer: Box<dyn Fn() -> T>,
}

impl<T: Clone> VariableFactory<T> {
    pub fn new(prior_initializer: impl Fn() -> T + 'static) -> Self {
        Self {
            prior_initializer: Box::new(prior_initializer),
        }
    }

    pub fn create_basic_variable(
        &self,
        arena: &mut VariableArena<T>,
        name: impl Into<String>,
    ) -> VariableId {
        arena.add(Variable::new(name, (self.prior_initializer)()))
    }

    pub fn create_keyed_variable<K>(
        &self,
        arena: &mut VariableArena<T>,
        key: K,
        name: impl Into<String>,
    ) -> KeyedVariable<K> {
        let id = self.create_basic_variable(arena, name);
        KeyedVariable::new(key, id)
    }
}

impl<T> std::fmt::Debug for VariableFactory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableFactory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_prior_generated_per_variable() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let factory = VariableFactory::new(move || {
            counter.set(counter.get() + 1);
            vec![0.0_f64; 2]
        });

        let mut arena = VariableArena::new();
        let first = factory.create_basic_variable(&mut arena, "first");
        let second = factory.create_keyed_variable(&mut arena, 7_u32, "second");
        assert_eq!(calls.get(), 2);

        arena.set_value(first, vec![9.0, 9.0]).unwrap();
        arena.reset_to_prior(second.id());
        assert_eq!(*arena.value(second.id()), vec![0.0, 0.0]);
        assert_eq!(*arena.get(second.id()).prior(), vec![0.0, 0.0]);

        arena.reset_to_prior(first);
        assert_eq!(*arena.value(first), vec![0.0, 0.0]);
    }

    #[test]
    fn test_keyed_variable_names() {
        let factory = VariableFactory::new(|| 0.0);
        let mut arena = VariableArena::new();
        let keyed = factory.create_keyed_variable(&mut arena, "bob", "bob's skill");

        assert_eq!(*keyed.key(), "bob");
        assert_eq!(arena.name(keyed.id()), "Variable[bob's skill]");
    }
}
