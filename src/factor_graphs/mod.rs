//! Generic belief-propagation engine
//!
//! Variables, messages and factors form a bipartite graph; schedules decide in
//! which order edges are updated; layers assemble the graph stage by stage.
//! Nothing in here knows what the values mean. Concrete factor kinds live with
//! the rating model that uses them.

pub mod factor;
pub mod factor_list;
pub mod graph;
pub mod layer;
pub mod message;
pub mod schedule;
pub mod variable;
pub mod variable_factory;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use factor::{Factor, FactorBindings};
pub use factor_list::FactorList;
pub use graph::{FactorGraph, FactorId};
pub use layer::{FactorGraphLayer, GroupShape, LayerBase, VariableGroups};
pub use message::Message;
pub use schedule::Schedule;
pub use variable::{KeyedVariable, Variable, VariableArena, VariableId};
pub use variable_factory::VariableFactory;
