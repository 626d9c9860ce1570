//! Epsilon Non-deterministic Finite Automaton (ε-NFA) implementation.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{EPSILON, SymbolId, is_epsilon};
use crate::automaton::symbol;
use crate::automaton::table::{TableRow, TransitionTable};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// One arena slot: the accepting flag and the outgoing transitions.
#[derive(Debug, Clone, Default)]
pub(crate) struct NfaState {
    pub(crate) accepting: bool,
    /// symbol -> sorted, duplicate-free destinations; epsilon is stored under
    /// [`EPSILON`]
    pub(crate) transitions: IndexMap<SymbolId, Vec<StateId>>,
}

impl NfaState {
    /// Add an edge to `destination` on `symbol`. Returns `false` if it was
    /// already there.
    pub(crate) fn connect(&mut self, symbol: SymbolId, destination: StateId) -> bool {
        let destinations = self.transitions.entry(symbol).or_default();
        match destinations.binary_search(&destination) {
            Ok(_) => false,
            Err(at) => {
                destinations.insert(at, destination);
                true
            }
        }
    }

    /// Move every destination up by `by`.
    pub(crate) fn shift_targets(&mut self, by: StateId) {
        for destination in self.transitions.values_mut().flatten() {
            *destination += by;
        }
    }
}

/// An Epsilon Non-deterministic Finite Automaton.
///
/// States live in an arena and are addressed by index. There is always exactly
/// one start state.
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<NfaState>,
    start_state: StateId,
    final_states: StateSet,
    /// All symbols used (excluding epsilon)
    alphabet: BTreeSet<SymbolId>,
}

impl Nfa {
    /// Create an NFA holding only its start state (id 0).
    pub fn new() -> Self {
        Self {
            states: vec![NfaState::default()],
            start_state: 0,
            final_states: StateSet::with_capacity(16),
            alphabet: BTreeSet::new(),
        }
    }

    /// Build an NFA from a finished arena. Accepting states and the alphabet
    /// are derived from the slots.
    pub(crate) fn from_arena(states: Vec<NfaState>, start_state: StateId) -> Self {
        let mut final_states = StateSet::with_capacity(states.len());
        let mut alphabet = BTreeSet::new();
        for (id, state) in states.iter().enumerate() {
            if state.accepting {
                final_states.insert(id as StateId);
            }
            alphabet.extend(state.transitions.keys().copied().filter(|&s| !is_epsilon(s)));
        }
        Self {
            states,
            start_state,
            final_states,
            alphabet,
        }
    }

    /// Append a fresh state and return its id.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(NfaState::default());
        (self.states.len() - 1) as StateId
    }

    /// Add a transition from source to destination on the given symbol.
    ///
    /// # Panics
    ///
    /// Panics if either state does not belong to this NFA.
    pub fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        assert!(
            (destination as usize) < self.states.len(),
            "destination state {destination} is not in this automaton"
        );
        if !is_epsilon(symbol) {
            self.alphabet.insert(symbol);
        }
        self.states[source as usize].connect(symbol, destination);
    }

    pub fn add_epsilon_transition(&mut self, source: StateId, destination: StateId) {
        self.add_transition(source, EPSILON, destination);
    }

    pub fn set_start_state(&mut self, state: StateId) {
        assert!((state as usize) < self.states.len(), "unknown start state {state}");
        self.start_state = state;
    }

    pub fn add_final_state(&mut self, state: StateId) {
        self.states[state as usize].accepting = true;
        self.final_states.insert(state);
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

    /// The alphabet in ascending order (epsilon excluded).
    pub fn alphabet(&self) -> &BTreeSet<SymbolId> {
        &self.alphabet
    }

    /// Destinations of `state` on `symbol`, if any.
    pub fn targets(&self, state: StateId, symbol: SymbolId) -> Option<&[StateId]> {
        self.states
            .get(state as usize)
            .and_then(|s| s.transitions.get(&symbol))
            .map(Vec::as_slice)
    }

    /// Least superset of `states` closed under epsilon transitions.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.states.len());
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(s) = stack.pop() {
            if !closure.insert(s) {
                continue;
            }
            if let Some(destinations) = self.targets(s, EPSILON) {
                stack.extend(destinations.iter().copied().filter(|&d| !closure.contains(d)));
            }
        }

        closure
    }

    /// States reached from `states` by consuming exactly `symbol`.
    /// No epsilon closure is taken.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        assert!(!is_epsilon(symbol), "Use epsilon_closure for epsilon moves");

        let mut reached = StateSet::with_capacity(self.states.len());
        for state in states.iter() {
            for &destination in self.targets(state, symbol).unwrap_or_default() {
                reached.insert(destination);
            }
        }
        reached
    }

    /// Simulate the NFA on `input` by tracking the set of live states.
    pub fn accepts(&self, input: &str) -> bool {
        let start = StateSet::singleton(self.start_state, self.states.len());
        let mut current = self.epsilon_closure(&start);

        for c in input.chars() {
            let moved = self.move_on_symbol(&current, symbol::from_char(c));
            if moved.is_empty() {
                return false;
            }
            current = self.epsilon_closure(&moved);
        }

        current.intersects(&self.final_states)
    }

    /// Get all transitions as an iterator.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.states.iter().enumerate().flat_map(|(src, state)| {
            state.transitions.iter().flat_map(move |(&sym, dests)| {
                dests.iter().map(move |&dst| (src as StateId, sym, dst))
            })
        })
    }

    /// Ordered transition table with one column per alphabet symbol plus ε.
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
                    .map(|sym| state.transitions.get(sym).cloned().unwrap_or_default())
                    .collect(),
                epsilon: Some(state.transitions.get(&EPSILON).cloned().unwrap_or_default()),
            })
            .collect();
        TransitionTable::new(&symbols, rows)
    }
}

impl Default for Nfa {
    fn default() -> Self {
        Self::new()
    }
}
