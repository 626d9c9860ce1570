/// Default ceiling on DFA states produced by subset construction.
pub const DEFAULT_MAX_DFA_STATES: usize = 10_000;

/// Knobs for [`crate::compile_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Run the syntax validator before building anything.
    pub validate: bool,
    /// Match with the minimized DFA instead of the raw subset DFA.
    pub minimize: bool,
    /// Abort compilation once subset construction needs more states than this.
    pub max_dfa_states: usize,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(mut self, yes: bool) -> Self {
        self.validate = yes;
        self
    }

    pub fn minimize(mut self, yes: bool) -> Self {
        self.minimize = yes;
        self
    }

    pub fn max_dfa_states(mut self, limit: usize) -> Self {
        self.max_dfa_states = limit;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            validate: true,
            minimize: true,
            max_dfa_states: DEFAULT_MAX_DFA_STATES,
        }
    }
}
