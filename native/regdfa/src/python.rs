//! PyO3 bindings, built with the `python` feature.
//!
//! Exposes compilation, matching and stage introspection to a Python
//! front end; drawing the automata is left to the caller.

use crate::automaton::symbol::{is_epsilon, to_char};
use crate::automaton::{StateId, SymbolId};
use crate::config::{CompileOptions, DEFAULT_MAX_DFA_STATES};
use crate::{CompiledPattern, compile_with, syntax};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PySet};

/// (state count, start, accepting states, edges) of one pipeline stage.
type StageGraph = (StateId, StateId, Vec<StateId>, Vec<(StateId, SymbolId, StateId)>);

fn symbol_label(symbol: SymbolId) -> String {
    if is_epsilon(symbol) {
        "ε".to_string()
    } else {
        to_char(symbol).map(String::from).unwrap_or_default()
    }
}

/// A compiled regular expression.
#[pyclass(name = "Regex", module = "regdfa", frozen)]
pub struct PyRegex {
    inner: CompiledPattern,
}

impl PyRegex {
    fn stage(&self, stage: &str) -> PyResult<StageGraph> {
        match stage {
            "nfa" => {
                let nfa = self.inner.nfa();
                Ok((
                    nfa.num_states(),
                    nfa.start_state(),
                    nfa.final_states().to_vec(),
                    nfa.transitions().collect(),
                ))
            }
            "dfa" | "minimal_dfa" => {
                let dfa = if stage == "dfa" {
                    self.inner.dfa()
                } else {
                    self.inner.matcher()
                };
                Ok((
                    dfa.num_states(),
                    dfa.start_state(),
                    dfa.final_states().to_vec(),
                    dfa.transitions().collect(),
                ))
            }
            other => Err(PyValueError::new_err(format!(
                "unknown stage {other:?}; expected \"nfa\", \"dfa\" or \"minimal_dfa\""
            ))),
        }
    }
}

#[pymethods]
impl PyRegex {
    #[new]
    #[pyo3(signature = (pattern, *, validate = true, minimize = true, max_dfa_states = DEFAULT_MAX_DFA_STATES))]
    fn new(pattern: &str, validate: bool, minimize: bool, max_dfa_states: usize) -> PyResult<Self> {
        let options = CompileOptions::new()
            .validate(validate)
            .minimize(minimize)
            .max_dfa_states(max_dfa_states);
        let inner =
            compile_with(pattern, &options).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    fn __repr__(&self) -> String {
        format!("Regex({:?})", self.inner.pattern())
    }

    #[getter]
    fn pattern(&self) -> &str {
        self.inner.pattern()
    }

    /// Whole-string match.
    fn matches(&self, input: &str) -> bool {
        self.inner.matches(input)
    }

    fn nfa_table(&self) -> String {
        self.inner.nfa().to_transition_table().to_string()
    }

    fn dfa_table(&self) -> String {
        self.inner.dfa().to_transition_table().to_string()
    }

    fn minimal_dfa_table(&self) -> String {
        self.inner.matcher().to_transition_table().to_string()
    }

    /// State counts as (nfa, dfa, minimal dfa).
    fn state_counts(&self) -> (StateId, StateId, StateId) {
        (
            self.inner.nfa().num_states(),
            self.inner.dfa().num_states(),
            self.inner.matcher().num_states(),
        )
    }

    /// Accepting states of a stage as a set of integer indices.
    fn final_states(&self, py: Python<'_>, stage: &str) -> PyResult<Py<PySet>> {
        let (_, _, finals, _) = self.stage(stage)?;
        let set = PySet::empty(py)?;
        for state in finals {
            set.add(state)?;
        }
        Ok(set.unbind())
    }

    /// Convert a stage to a NetworkX MultiDiGraph.
    #[pyo3(signature = (stage = "minimal_dfa"))]
    fn to_networkx<'py>(&self, py: Python<'py>, stage: &str) -> PyResult<Bound<'py, PyAny>> {
        let (num_states, start, finals, edges) = self.stage(stage)?;

        let nx = py.import("networkx")?;
        let graph = nx.call_method0("MultiDiGraph")?;

        for state in 0..num_states {
            let attrs = PyDict::new(py);
            attrs.set_item("start", state == start)?;
            attrs.set_item("accepting", finals.contains(&state))?;
            graph.call_method("add_node", (state,), Some(&attrs))?;
        }

        for (src, sym, dst) in edges {
            let kwargs = PyDict::new(py);
            kwargs.set_item("label", symbol_label(sym))?;
            graph.call_method("add_edge", (src, dst), Some(&kwargs))?;
        }

        Ok(graph)
    }
}

/// Index of the first structurally invalid character, or `None`.
#[pyfunction]
fn validate(pattern: &str) -> Option<usize> {
    syntax::validate(pattern).err()
}

#[pymodule]
fn regdfa(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRegex>()?;
    m.add_function(wrap_pyfunction!(validate, m)?)?;
    Ok(())
}
