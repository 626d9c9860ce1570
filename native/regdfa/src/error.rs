use std::fmt;

/// Why a pattern could not be compiled. No partial automaton survives an
/// error; callers fix the pattern and compile again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Unbalanced brackets or a misplaced operator at `position`
    /// (zero-based character index).
    Structural { position: usize },
    /// The postfix evaluation stack underflowed or did not end with exactly
    /// one fragment.
    Construction { reason: String },
    /// Subset construction needed more than `limit` DFA states.
    StateLimitExceeded { limit: usize },
}

impl CompileError {
    pub(crate) fn construction(reason: impl Into<String>) -> Self {
        CompileError::Construction {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Structural { position } => {
                write!(f, "invalid pattern syntax at position {position}")
            }
            CompileError::Construction { reason } => {
                write!(f, "malformed expression: {reason}")
            }
            CompileError::StateLimitExceeded { limit } => {
                write!(f, "DFA would exceed the limit of {limit} states")
            }
        }
    }
}

impl std::error::Error for CompileError {}
