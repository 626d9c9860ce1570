//! Thompson construction: evaluates a postfix token sequence into an ε-NFA.
//!
//! All fragments of one compilation share a single arena, and the fragments
//! on the evaluation stack tile it: each one owns a contiguous range, in
//! stack order. A combinator consumes its operands, which therefore sit at
//! the end of the arena, and relabels them in place around any new states.
//! The arena stays linear in pattern length.

use crate::automaton::nfa::{Nfa, NfaState};
use crate::automaton::symbol::from_char;
use crate::automaton::{EPSILON, StateId, SymbolId};
use crate::error::CompileError;
use crate::syntax::Token;
use std::ops::Range;

/// Handle to a finished sub-automaton inside the arena.
#[derive(Debug, Clone)]
struct Fragment {
    /// Every state of the fragment, and every transition target, lies here.
    states: Range<StateId>,
    start: StateId,
    accepting: Vec<StateId>,
}

impl Fragment {
    fn shifted(self, by: StateId) -> Fragment {
        Fragment {
            states: self.states.start + by..self.states.end + by,
            start: self.start + by,
            accepting: self.accepting.into_iter().map(|s| s + by).collect(),
        }
    }
}

#[derive(Debug, Default)]
struct Builder {
    arena: Vec<NfaState>,
}

impl Builder {
    fn alloc(&mut self) -> StateId {
        self.arena.push(NfaState::default());
        (self.arena.len() - 1) as StateId
    }

    fn connect(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        self.arena[source as usize].connect(symbol, destination);
    }

    /// Insert two fresh states at `floor`, the first id of the consumed
    /// operands, and move the operands up past them. Returns the new pair.
    fn open_gap(&mut self, floor: StateId) -> (StateId, StateId) {
        let at = floor as usize;
        for _ in 0..2 {
            self.arena.insert(at, NfaState::default());
        }
        for state in &mut self.arena[at + 2..] {
            state.shift_targets(2);
        }
        (floor, floor + 1)
    }

    fn literal(&mut self, c: char) -> Fragment {
        let start = self.alloc();
        let accept = self.alloc();
        self.connect(start, from_char(c), accept);
        Fragment {
            states: start..accept + 1,
            start,
            accepting: vec![accept],
        }
    }

    fn concat(&mut self, left: Fragment, right: Fragment) -> Fragment {
        debug_assert_eq!(left.states.end, right.states.start);
        for &accept in &left.accepting {
            self.connect(accept, EPSILON, right.start);
        }
        Fragment {
            states: left.states.start..right.states.end,
            start: left.start,
            accepting: right.accepting,
        }
    }

    fn union(&mut self, left: Fragment, right: Fragment) -> Fragment {
        debug_assert_eq!(left.states.end, right.states.start);
        let (start, accept) = self.open_gap(left.states.start);
        let left = left.shifted(2);
        let right = right.shifted(2);
        for branch in [&left, &right] {
            self.connect(start, EPSILON, branch.start);
            for &inner in &branch.accepting {
                self.connect(inner, EPSILON, accept);
            }
        }
        Fragment {
            states: start..right.states.end,
            start,
            accepting: vec![accept],
        }
    }

    fn star(&mut self, operand: Fragment) -> Fragment {
        let (start, accept) = self.open_gap(operand.states.start);
        let inner = operand.shifted(2);
        self.connect(start, EPSILON, accept);
        self.connect(start, EPSILON, inner.start);
        for &inner_accept in &inner.accepting {
            self.connect(inner_accept, EPSILON, inner.start);
            self.connect(inner_accept, EPSILON, accept);
        }
        Fragment {
            states: start..inner.states.end,
            start,
            accepting: vec![accept],
        }
    }

    /// Turn the arena into an NFA. `fragment` must be the only one left, so
    /// it covers the whole arena.
    fn finish(self, fragment: Fragment) -> Nfa {
        debug_assert_eq!(fragment.states, 0..self.arena.len() as StateId);
        let mut states = self.arena;
        for accept in fragment.accepting {
            states[accept as usize].accepting = true;
        }
        Nfa::from_arena(states, fragment.start)
    }
}

fn pop(stack: &mut Vec<Fragment>, operator: &str) -> Result<Fragment, CompileError> {
    stack
        .pop()
        .ok_or_else(|| CompileError::construction(format!("{operator} is missing an operand")))
}

/// Evaluate postfix tokens (see [`crate::syntax::to_postfix`]) into an NFA.
pub fn build_nfa(postfix: &[Token]) -> Result<Nfa, CompileError> {
    let mut builder = Builder::default();
    let mut stack: Vec<Fragment> = Vec::new();

    for &token in postfix {
        let fragment = match token {
            Token::Literal(c) => builder.literal(c),
            Token::Star => {
                let operand = pop(&mut stack, "`*`")?;
                builder.star(operand)
            }
            Token::Concat => {
                let right = pop(&mut stack, "concatenation")?;
                let left = pop(&mut stack, "concatenation")?;
                builder.concat(left, right)
            }
            Token::Union => {
                let right = pop(&mut stack, "`|`")?;
                let left = pop(&mut stack, "`|`")?;
                builder.union(left, right)
            }
            Token::Open | Token::Close => {
                return Err(CompileError::construction(
                    "grouping token in postfix input",
                ));
            }
        };
        stack.push(fragment);
    }

    match (stack.pop(), stack.len()) {
        (Some(fragment), 0) => Ok(builder.finish(fragment)),
        (None, _) => Err(CompileError::construction("empty expression")),
        (Some(_), rest) => Err(CompileError::construction(format!(
            "{} fragments left after evaluation",
            rest + 1
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::StateSet;
    use crate::syntax::{normalize, to_postfix};

    fn nfa(pattern: &str) -> Nfa {
        build_nfa(&to_postfix(&normalize(pattern))).unwrap()
    }

    fn eps(nfa: &Nfa, state: StateId) -> Vec<StateId> {
        nfa.targets(state, EPSILON).map_or_else(Vec::new, <[StateId]>::to_vec)
    }

    #[test]
    fn test_literal() {
        let nfa = nfa("a");
        assert_eq!(nfa.num_states(), 2);
        assert_eq!(nfa.start_state(), 0);
        assert_eq!(nfa.final_states().to_vec(), vec![1]);
        assert_eq!(nfa.targets(0, from_char('a')).unwrap().to_vec(), vec![1]);
    }

    #[test]
    fn test_concat_wires_left_accept_to_right_start() {
        let nfa = nfa("ab");
        assert_eq!(nfa.num_states(), 4);
        assert_eq!(eps(&nfa, 1), vec![2]);
        assert_eq!(nfa.final_states().to_vec(), vec![3]);
        assert!(!nfa.is_accepting(1));
    }

    #[test]
    fn test_union_has_dedicated_start_and_accept() {
        let nfa = nfa("a|b");
        assert_eq!(nfa.num_states(), 6);
        assert_eq!(eps(&nfa, 0), vec![2, 4]);
        assert_eq!(eps(&nfa, 3), vec![1]);
        assert_eq!(eps(&nfa, 5), vec![1]);
        assert_eq!(nfa.final_states().to_vec(), vec![1]);
    }

    #[test]
    fn test_star_loop_and_exit() {
        let nfa = nfa("a*");
        assert_eq!(nfa.num_states(), 4);
        assert_eq!(eps(&nfa, 0), vec![1, 2]);
        assert_eq!(eps(&nfa, 3), vec![1, 2]);
        assert_eq!(nfa.final_states().to_vec(), vec![1]);
    }

    #[test]
    fn test_repeated_subpattern_gets_distinct_states() {
        let nfa = nfa("aa");
        let a = from_char('a');
        let first = nfa.targets(0, a).unwrap().to_vec();
        let second = nfa.targets(2, a).unwrap().to_vec();
        assert_eq!(first, vec![1]);
        assert_eq!(second, vec![3]);
        assert!(nfa.accepts("aa"));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_nfa_accepts_scenarios() {
        let nfa = nfa("a(b|c)*");
        for input in ["a", "abc", "acbcb"] {
            assert!(nfa.accepts(input), "{input:?}");
        }
        for input in ["b", "", "ad"] {
            assert!(!nfa.accepts(input), "{input:?}");
        }
    }

    #[test]
    fn test_every_state_is_used() {
        // No orphaned arena slots leak into the result.
        let nfa = nfa("(a|b)*abb");
        let mut touched = StateSet::singleton(nfa.start_state(), 0);
        for (src, _, dst) in nfa.transitions() {
            touched.insert(src);
            touched.insert(dst);
        }
        assert_eq!(touched.len(), nfa.num_states() as usize);
    }

    #[test]
    fn test_nested_operand_layout() {
        // The union's operands move up past its new start and accept.
        let nfa = nfa("ab|c");
        assert_eq!(nfa.num_states(), 8);
        assert_eq!(eps(&nfa, 0), vec![2, 6]);
        assert_eq!(eps(&nfa, 3), vec![4]);
        assert_eq!(eps(&nfa, 5), vec![1]);
        assert_eq!(eps(&nfa, 7), vec![1]);
        assert_eq!(nfa.targets(4, from_char('b')), Some(&[5][..]));
        assert!(nfa.accepts("ab"));
        assert!(nfa.accepts("c"));
        assert!(!nfa.accepts("abc"));
    }

    #[test]
    fn test_state_count_is_linear() {
        // Two states per literal, two more per union or star.
        let chain = nfa(&"a".repeat(1000));
        assert_eq!(chain.num_states(), 2000);
        assert_eq!(chain.transitions().count(), 1999);
        assert!(chain.accepts(&"a".repeat(1000)));
        assert!(!chain.accepts(&"a".repeat(999)));

        let depth = 500;
        let grouped = nfa(&format!("{}a{}", "(".repeat(depth), ")".repeat(depth)));
        assert_eq!(grouped.num_states(), 2);

        let starred = nfa(&format!("{}a{}", "(".repeat(depth), ")*".repeat(depth)));
        assert_eq!(starred.num_states(), 2 + 2 * depth as StateId);
        assert!(starred.accepts("aaa"));

        let alternatives = ["ab"; 300].join("|");
        assert_eq!(nfa(&alternatives).num_states(), 300 * 4 + 299 * 2);
    }

    #[test]
    fn test_stack_underflow() {
        let err = build_nfa(&[Token::Literal('a'), Token::Union]).unwrap_err();
        assert!(matches!(err, CompileError::Construction { .. }));
        assert!(build_nfa(&[Token::Star]).is_err());
        assert!(build_nfa(&[Token::Concat]).is_err());
    }

    #[test]
    fn test_leftover_fragments() {
        let err = build_nfa(&[Token::Literal('a'), Token::Literal('b')]).unwrap_err();
        assert_eq!(
            err,
            CompileError::construction("2 fragments left after evaluation")
        );
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(
            build_nfa(&[]).unwrap_err(),
            CompileError::construction("empty expression")
        );
        assert!(build_nfa(&to_postfix(&normalize("()"))).is_err());
    }
}
