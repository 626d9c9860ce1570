//! Compile regular expressions into minimal DFAs.
//!
//! The supported syntax is literals, `|`, `*` and `( )`. A pattern goes
//! through [`syntax::normalize`], [`syntax::to_postfix`],
//! [`thompson::build_nfa`], [`automaton::subset_construction`] and
//! [`automaton::Dfa::minimize`]. Matching is whole-string.
//!
//! ```
//! let re = regdfa::compile("a(b|c)*").unwrap();
//! assert!(re.matches("acbcb"));
//! assert!(!re.matches("b"));
//! ```

pub mod automaton;
pub mod config;
pub mod error;
#[cfg(feature = "python")]
mod python;
pub mod syntax;
pub mod thompson;

use automaton::{Dfa, Nfa, subset_construction};

pub use config::CompileOptions;
pub use error::CompileError;

/// A compiled pattern. Holds every stage of the pipeline for introspection.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    nfa: Nfa,
    dfa: Dfa,
    minimal_dfa: Option<Dfa>,
}

impl CompiledPattern {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the whole of `input` is in the pattern's language.
    pub fn matches(&self, input: &str) -> bool {
        self.matcher().matches(input)
    }

    /// The automaton used by [`CompiledPattern::matches`].
    pub fn matcher(&self) -> &Dfa {
        self.minimal_dfa.as_ref().unwrap_or(&self.dfa)
    }

    /// The Thompson NFA.
    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    /// The DFA produced by subset construction, before minimization.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// The minimized DFA, unless minimization was turned off.
    pub fn minimal_dfa(&self) -> Option<&Dfa> {
        self.minimal_dfa.as_ref()
    }
}

/// Compile `pattern` with [`CompileOptions::default`].
pub fn compile(pattern: &str) -> Result<CompiledPattern, CompileError> {
    compile_with(pattern, &CompileOptions::default())
}

/// Compile `pattern` through every stage under `options`.
///
/// Only literals, `|`, `*` and `( )` carry meaning. Every other character,
/// including `?`, `[`, `]` and `.`, is matched literally even though
/// [`syntax::validate`] checks `?` and brackets for placement.
pub fn compile_with(
    pattern: &str,
    options: &CompileOptions,
) -> Result<CompiledPattern, CompileError> {
    if options.validate {
        syntax::validate(pattern).map_err(|position| CompileError::Structural { position })?;
    }

    let postfix = syntax::to_postfix(&syntax::normalize(pattern));
    let nfa = thompson::build_nfa(&postfix)?;
    let dfa = subset_construction(&nfa, options.max_dfa_states)?;
    let minimal_dfa = options.minimize.then(|| dfa.minimize());

    Ok(CompiledPattern {
        pattern: pattern.to_string(),
        nfa,
        dfa,
        minimal_dfa,
    })
}
