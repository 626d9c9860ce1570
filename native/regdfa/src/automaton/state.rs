//! State identifiers and bit-set backed state sets.

use fixedbitset::FixedBitSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Index of a state inside its automaton's arena.
pub type StateId = u32;

/// A duplicate-free set of states.
///
/// Iteration is always in ascending order, which makes [`StateSet::to_vec`]
/// an order-independent key for the set. Equality and hashing look at the
/// members only, never at the capacity.
#[derive(Clone, Default)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// Create an empty set sized for `capacity` states.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Create a set holding a single state.
    pub fn singleton(state: StateId, capacity: usize) -> Self {
        let mut set = Self::with_capacity(capacity);
        set.insert(state);
        set
    }

    /// Insert a state, growing the set if needed. Returns `true` if the state
    /// was not present before.
    pub fn insert(&mut self, state: StateId) -> bool {
        let idx = state as usize;
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        !self.bits.put(idx)
    }

    pub fn contains(&self, state: StateId) -> bool {
        let idx = state as usize;
        idx < self.bits.len() && self.bits.contains(idx)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Iterate over the states in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|i| i as StateId)
    }

    /// Union this set with another, modifying self in place.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    /// Check if this set shares at least one state with another.
    pub fn intersects(&self, other: &StateSet) -> bool {
        !self.bits.is_disjoint(&other.bits)
    }

    /// Sorted ids, used as the canonical key of the set.
    pub fn to_vec(&self) -> Vec<StateId> {
        self.iter().collect()
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for StateSet {}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for member in self.iter() {
            member.hash(state);
        }
        self.len().hash(state);
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let items: Vec<StateId> = iter.into_iter().collect();
        let capacity = items.iter().copied().max().map_or(0, |m| m as usize + 1);
        let mut set = Self::with_capacity(capacity);
        for state in items {
            set.insert(state);
        }
        set
    }
}
