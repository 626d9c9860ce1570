//! Subset construction algorithm for converting ε-NFA to DFA.

use crate::automaton::dfa::Dfa;
use crate::automaton::nfa::Nfa;
use crate::automaton::state::{StateId, StateSet};
use crate::error::CompileError;
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Convert an epsilon-NFA to a DFA using the powerset construction algorithm.
///
/// Subsets are explored breadth-first and symbols in ascending order, so DFA
/// state numbering is deterministic. Fails once more than `max_states` DFA
/// states would be needed.
pub fn subset_construction(nfa: &Nfa, max_states: usize) -> Result<Dfa, CompileError> {
    // The start state counts against the limit too.
    if max_states == 0 {
        return Err(CompileError::StateLimitExceeded { limit: 0 });
    }

    // Sorted NFA state ids -> DFA state. The map's insertion index is the
    // DFA state id.
    let mut state_mapping: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let mut dfa = Dfa::new();
    dfa.extend_alphabet(nfa.alphabet().iter().copied());

    let start = StateSet::singleton(nfa.start_state(), nfa.num_states() as usize);
    let initial_set = nfa.epsilon_closure(&start);
    if initial_set.intersects(nfa.final_states()) {
        dfa.add_final_state(0);
    }
    state_mapping.insert(initial_set.to_vec(), 0);

    let mut worklist: VecDeque<(StateId, StateSet)> = VecDeque::from([(0, initial_set)]);

    while let Some((current_dfa_state, current_nfa_set)) = worklist.pop_front() {
        for &symbol in nfa.alphabet() {
            let moved = nfa.move_on_symbol(&current_nfa_set, symbol);
            if moved.is_empty() {
                // No transition on this symbol - implicit reject
                continue;
            }
            let next_nfa_set = nfa.epsilon_closure(&moved);
            let next_vec = next_nfa_set.to_vec();

            let next_dfa_state = match state_mapping.get(&next_vec) {
                Some(&existing) => existing,
                None => {
                    if state_mapping.len() >= max_states {
                        return Err(CompileError::StateLimitExceeded { limit: max_states });
                    }
                    let new_state = dfa.add_state();
                    if next_nfa_set.intersects(nfa.final_states()) {
                        dfa.add_final_state(new_state);
                    }
                    state_mapping.insert(next_vec, new_state);
                    worklist.push_back((new_state, next_nfa_set));
                    new_state
                }
            };

            dfa.add_transition(current_dfa_state, symbol, next_dfa_state);
        }
    }

    dfa.set_state_mapping(state_mapping.into_keys().collect());
    Ok(dfa)
}
