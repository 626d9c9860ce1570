//! Finite automata over `char` alphabets.
//!
//! This module provides the ε-NFA and DFA arenas with:
//! - Epsilon closure and NFA simulation
//! - Subset construction (NFA to DFA conversion)
//! - Partition-refinement DFA minimization
//! - Ordered transition tables for external renderers

mod dfa;
pub(crate) mod nfa;
mod state;
mod subset_construction;
pub mod symbol;
mod table;

pub use dfa::Dfa;
pub use nfa::Nfa;
pub use state::{StateId, StateSet};
pub use subset_construction::subset_construction;
pub use symbol::{EPSILON, SymbolId};
pub use table::{TableRow, TransitionTable};
