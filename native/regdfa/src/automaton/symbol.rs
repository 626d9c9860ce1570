//! Symbol types for automata transitions.

/// A transition label. Alphabet symbols are Unicode scalar values, so a
/// `char` maps to its code point.
pub type SymbolId = u32;

/// Epsilon (empty) transitions. No `char` has this code point.
pub const EPSILON: SymbolId = u32::MAX;

#[inline]
pub fn is_epsilon(symbol: SymbolId) -> bool {
    symbol == EPSILON
}

#[inline]
pub fn from_char(c: char) -> SymbolId {
    c as SymbolId
}

/// The character a symbol was built from, or `None` for epsilon.
#[inline]
pub fn to_char(symbol: SymbolId) -> Option<char> {
    char::from_u32(symbol)
}
