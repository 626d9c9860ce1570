//! Deterministic Finite Automaton (DFA) implementation with partition-refinement
//! minimization.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{self, SymbolId, is_epsilon};
use crate::automaton::table::{TableRow, TransitionTable};
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, VecDeque};

#[derive(Debug, Clone, Default)]
struct DfaState {
    accepting: bool,
    /// symbol -> destination; never contains epsilon
    transitions: IndexMap<SymbolId, StateId>,
}

/// A Deterministic Finite Automaton.
///
/// Missing transitions are implicit rejects: there is no dead state.
#[derive(Debug, Clone)]
pub struct Dfa {
    states: Vec<DfaState>,
    start_state: StateId,
    final_states: StateSet,
    alphabet: BTreeSet<SymbolId>,
    /// DFA state -> the NFA states it stands for (set by subset construction)
    state_mapping: Option<Vec<Vec<StateId>>>,
}

impl Dfa {
    /// Create a DFA holding only its start state (id 0).
    pub fn new() -> Self {
        Self::with_states(1, 0)
    }

    fn with_states(count: usize, start_state: StateId) -> Self {
        Self {
            states: vec![DfaState::default(); count],
            start_state,
            final_states: StateSet::with_capacity(count),
            alphabet: BTreeSet::new(),
            state_mapping: None,
        }
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(DfaState::default());
        (self.states.len() - 1) as StateId
    }

    pub fn set_start_state(&mut self, state: StateId) {
        assert!((state as usize) < self.states.len(), "unknown start state {state}");
        self.start_state = state;
    }

    pub fn add_final_state(&mut self, state: StateId) {
        self.states[state as usize].accepting = true;
        self.final_states.insert(state);
    }

    /// Set the transition from `source` on `symbol`, replacing any previous one.
    pub fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        assert!(!is_epsilon(symbol), "a DFA has no epsilon transitions");
        assert!(
            (destination as usize) < self.states.len(),
            "destination state {destination} is not in this automaton"
        );
        self.alphabet.insert(symbol);
        self.states[source as usize]
            .transitions
            .insert(symbol, destination);
    }

    /// Record symbols as part of the alphabet even if no transition uses them.
    pub(crate) fn extend_alphabet(&mut self, symbols: impl IntoIterator<Item = SymbolId>) {
        self.alphabet.extend(symbols);
    }

    pub(crate) fn set_state_mapping(&mut self, mapping: Vec<Vec<StateId>>) {
        self.state_mapping = Some(mapping);
    }

    /// For each DFA state, the sorted NFA states it represents.
    pub fn state_mapping(&self) -> Option<&[Vec<StateId>]> {
        self.state_mapping.as_deref()
    }

    pub fn transition(&self, source: StateId, symbol: SymbolId) -> Option<StateId> {
        self.states
            .get(source as usize)
            .and_then(|s| s.transitions.get(&symbol).copied())
    }

    pub fn num_states(&self) -> StateId {
        self.states.len() as StateId
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    pub fn final_states(&self) -> &StateSet {
        &self.final_states
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.states
            .get(state as usize)
            .is_some_and(|s| s.accepting)
    }

    pub fn alphabet(&self) -> &BTreeSet<SymbolId> {
        &self.alphabet
    }

    /// Get all transitions as an iterator.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.states.iter().enumerate().flat_map(|(src, state)| {
            state
                .transitions
                .iter()
                .map(move |(&sym, &dst)| (src as StateId, sym, dst))
        })
    }

    /// Whole-string match. Rejects as soon as a character has no transition.
    pub fn matches(&self, input: &str) -> bool {
        let mut state = self.start_state;
        for c in input.chars() {
            match self.transition(state, symbol::from_char(c)) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accepting(state)
    }

    /// Minimize the DFA by Moore-style partition refinement.
    /// Returns a new DFA; unreachable states are dropped.
    pub fn minimize(&self) -> Dfa {
        let reachable = self.find_reachable_states();
        let symbols: Vec<SymbolId> = self.alphabet.iter().copied().collect();

        // Initial partition: accepting vs. non-accepting.
        let mut block_of = self.number_blocks(&reachable, |state| {
            vec![Some(usize::from(self.is_accepting(state)))]
        });

        // Each pass keeps a state's own block in its signature, so blocks
        // only ever split and equal assignments mean a fixed point.
        loop {
            let refined = self.number_blocks(&reachable, |state| {
                let mut signature = Vec::with_capacity(symbols.len() + 1);
                signature.push(block_of[state as usize]);
                signature.extend(symbols.iter().map(|&sym| {
                    self.transition(state, sym)
                        .and_then(|dst| block_of[dst as usize])
                }));
                signature
            });
            if refined == block_of {
                break;
            }
            block_of = refined;
        }

        self.build_minimized_dfa(&reachable, &block_of)
    }

    /// Assign block numbers to `states` by signature. Blocks are numbered in
    /// order of their lowest state, so equal partitions get equal vectors.
    fn number_blocks<F>(&self, states: &StateSet, signature: F) -> Vec<Option<usize>>
    where
        F: Fn(StateId) -> Vec<Option<usize>>,
    {
        let mut blocks: IndexSet<Vec<Option<usize>>> = IndexSet::new();
        let mut block_of = vec![None; self.states.len()];
        for state in states.iter() {
            let (block, _) = blocks.insert_full(signature(state));
            block_of[state as usize] = Some(block);
        }
        block_of
    }

    /// Find all states reachable from the start state.
    fn find_reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.states.len());
        let mut queue = VecDeque::from([self.start_state]);

        while let Some(state) = queue.pop_front() {
            if !reachable.insert(state) {
                continue;
            }
            for &next in self.states[state as usize].transitions.values() {
                if !reachable.contains(next) {
                    queue.push_back(next);
                }
            }
        }

        reachable
    }

    fn build_minimized_dfa(&self, reachable: &StateSet, block_of: &[Option<usize>]) -> Dfa {
        let num_blocks = block_of.iter().flatten().max().map_or(0, |&m| m + 1);
        let new_start = block_of[self.start_state as usize].unwrap_or(0) as StateId;
        let mut minimized = Dfa::with_states(num_blocks, new_start);
        minimized.extend_alphabet(self.alphabet.iter().copied());

        let mut representatives: Vec<Option<StateId>> = vec![None; num_blocks];
        let mut merged_mapping: Vec<BTreeSet<StateId>> = vec![BTreeSet::new(); num_blocks];

        for state in reachable.iter() {
            let Some(block) = block_of[state as usize] else {
                continue;
            };
            representatives[block].get_or_insert(state);
            if self.is_accepting(state) {
                minimized.add_final_state(block as StateId);
            }
            if let Some(mapping) = &self.state_mapping {
                merged_mapping[block].extend(mapping[state as usize].iter().copied());
            }
        }

        // All members of a block agree on target blocks, so any member works.
        for (block, representative) in representatives.iter().enumerate() {
            let Some(rep) = *representative else {
                continue;
            };
            for (&sym, &dst) in &self.states[rep as usize].transitions {
                if let Some(target) = block_of[dst as usize] {
                    minimized.add_transition(block as StateId, sym, target as StateId);
                }
            }
        }

        if self.state_mapping.is_some() {
            minimized.set_state_mapping(
                merged_mapping
                    .into_iter()
                    .map(|set| set.into_iter().collect())
                    .collect(),
            );
        }

        minimized
    }

    /// Ordered transition table with one column per alphabet symbol.
    pub fn to_transition_table(&self) -> TransitionTable {
        let symbols: Vec<SymbolId> = self.alphabet.iter().copied().collect();
        let rows = self
            .states
            .iter()
            .enumerate()
            .map(|(id, state)| TableRow {
                state: id as StateId,
                start: id as StateId == self.start_state,
                accepting: state.accepting,
                targets: symbols
                    .iter()
                    .map(|sym| state.transitions.get(sym).into_iter().copied().collect())
                    .collect(),
                epsilon: None,
            })
            .collect();
        TransitionTable::new(&symbols, rows)
    }
}

impl Default for Dfa {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: SymbolId = 'a' as SymbolId;
    const B: SymbolId = 'b' as SymbolId;

    #[test]
    fn test_dfa_matches() {
        // 0 -a-> 1 -b-> 2(final)
        let mut dfa = Dfa::new();
        let s1 = dfa.add_state();
        let s2 = dfa.add_state();
        dfa.add_final_state(s2);
        dfa.add_transition(0, A, s1);
        dfa.add_transition(s1, B, s2);

        assert_eq!(dfa.num_states(), 3);
        assert!(dfa.matches("ab"));
        assert!(!dfa.matches("a"));
        assert!(!dfa.matches("abb"));
        assert!(!dfa.matches("ba"));
        assert!(!dfa.matches(""));
    }

    #[test]
    fn test_dfa_minimization_merges_equivalent_states() {
        // 0 -a-> 1 -b-> 3(final)
        // 0 -b-> 2 -b-> 4(final)
        // 1 ~ 2 and 3 ~ 4.
        let mut dfa = Dfa::new();
        for _ in 0..4 {
            dfa.add_state();
        }
        dfa.add_final_state(3);
        dfa.add_final_state(4);
        dfa.add_transition(0, A, 1);
        dfa.add_transition(0, B, 2);
        dfa.add_transition(1, B, 3);
        dfa.add_transition(2, B, 4);

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 3);
        assert_eq!(minimized.final_states().len(), 1);
        for input in ["ab", "bb", "a", "b", "", "abb", "ba"] {
            assert_eq!(minimized.matches(input), dfa.matches(input), "{input:?}");
        }
    }

    #[test]
    fn test_blocks_numbered_by_lowest_state() {
        let mut dfa = Dfa::new();
        for _ in 0..3 {
            dfa.add_state();
        }
        let states: StateSet = [0, 1, 2, 3].into_iter().collect();
        let block_of = dfa.number_blocks(&states, |s| vec![Some((s % 2) as usize + 7)]);
        assert_eq!(block_of, vec![Some(0), Some(1), Some(0), Some(1)]);

        let partial: StateSet = [1, 3].into_iter().collect();
        let block_of = dfa.number_blocks(&partial, |s| vec![Some(s as usize)]);
        assert_eq!(block_of, vec![None, Some(0), None, Some(1)]);
    }

    #[test]
    fn test_minimization_drops_unreachable_states() {
        let mut dfa = Dfa::new();
        let s1 = dfa.add_state();
        let orphan = dfa.add_state();
        dfa.add_final_state(s1);
        dfa.add_final_state(orphan);
        dfa.add_transition(0, A, s1);
        dfa.add_transition(orphan, B, 0);

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 2);
        assert!(minimized.matches("a"));
        assert!(!minimized.matches("b"));
        // The orphan's symbol still belongs to the alphabet.
        assert!(minimized.alphabet().contains(&B));
    }

    #[test]
    fn test_minimization_separates_by_missing_transition() {
        // 1 and 2 are both accepting, but only 1 continues on 'a'.
        let mut dfa = Dfa::new();
        let s1 = dfa.add_state();
        let s2 = dfa.add_state();
        dfa.add_final_state(s1);
        dfa.add_final_state(s2);
        dfa.add_transition(0, A, s1);
        dfa.add_transition(s1, A, s2);

        assert_eq!(dfa.minimize().num_states(), 3);
    }

    #[test]
    fn test_minimize_is_idempotent() {
        let mut dfa = Dfa::new();
        let s1 = dfa.add_state();
        dfa.add_final_state(s1);
        dfa.add_transition(0, A, s1);
        dfa.add_transition(s1, A, s1);
        dfa.add_transition(s1, B, 0);

        let once = dfa.minimize();
        let twice = once.minimize();
        assert_eq!(once.num_states(), twice.num_states());
        assert_eq!(
            once.to_transition_table(),
            twice.to_transition_table()
        );
    }

    #[test]
    fn test_minimization_without_accepting_states() {
        let mut dfa = Dfa::new();
        let s1 = dfa.add_state();
        dfa.add_transition(0, A, s1);

        let minimized = dfa.minimize();
        assert!(minimized.final_states().is_empty());
        // A missing transition is its own signature entry, distinct from any block.
        assert_eq!(minimized.num_states(), 2);
        assert!(!minimized.matches("a"));
        assert!(!minimized.matches(""));
    }

    #[test]
    fn test_state_mapping_is_merged() {
        let mut dfa = Dfa::new();
        let s1 = dfa.add_state();
        let s2 = dfa.add_state();
        dfa.add_final_state(s1);
        dfa.add_final_state(s2);
        dfa.add_transition(0, A, s1);
        dfa.add_transition(0, B, s2);
        dfa.set_state_mapping(vec![vec![0], vec![1, 3], vec![2, 3]]);

        let minimized = dfa.minimize();
        assert_eq!(
            minimized.state_mapping(),
            Some(&[vec![0], vec![1, 2, 3]][..])
        );
    }

    #[test]
    fn test_transition_table() {
        let mut dfa = Dfa::new();
        let s1 = dfa.add_state();
        dfa.add_final_state(s1);
        dfa.add_transition(0, B, s1);
        dfa.extend_alphabet([A]);

        let table = dfa.to_transition_table();
        assert_eq!(table.symbols, vec!['a', 'b']);
        assert_eq!(table.rows[0].targets, vec![vec![], vec![1]]);
        assert_eq!(table.rows[0].epsilon, None);
        assert!(table.rows[1].accepting);
    }
}
