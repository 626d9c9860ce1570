//! Ordered transition tables for handing automata to a renderer.

use crate::automaton::state::StateId;
use crate::automaton::symbol::{SymbolId, to_char};
use serde::Serialize;
use std::fmt;

/// One row per state, one target column per alphabet symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionTable {
    pub symbols: Vec<char>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub state: StateId,
    pub start: bool,
    pub accepting: bool,
    /// Targets per entry of [`TransitionTable::symbols`]; empty means none.
    pub targets: Vec<Vec<StateId>>,
    /// Epsilon targets. Always `None` for deterministic automata.
    pub epsilon: Option<Vec<StateId>>,
}

impl TransitionTable {
    pub(crate) fn new(symbols: &[SymbolId], rows: Vec<TableRow>) -> Self {
        Self {
            symbols: symbols.iter().filter_map(|&s| to_char(s)).collect(),
            rows,
        }
    }

    fn has_epsilon_column(&self) -> bool {
        self.rows.iter().any(|row| row.epsilon.is_some())
    }

    fn grid(&self) -> Vec<Vec<String>> {
        let mut header = vec!["state".to_string(), "accepting".to_string()];
        header.extend(self.symbols.iter().map(char::to_string));
        let epsilon_column = self.has_epsilon_column();
        if epsilon_column {
            header.push("ε".to_string());
        }

        let mut grid = vec![header];
        for row in &self.rows {
            let name = if row.start {
                format!("->q{}", row.state)
            } else {
                format!("q{}", row.state)
            };
            let mut cells = vec![name, if row.accepting { "yes" } else { "no" }.to_string()];
            cells.extend(row.targets.iter().map(|t| format_targets(t)));
            if epsilon_column {
                cells.push(format_targets(row.epsilon.as_deref().unwrap_or_default()));
            }
            grid.push(cells);
        }
        grid
    }
}

fn format_targets(targets: &[StateId]) -> String {
    if targets.is_empty() {
        return "-".to_string();
    }
    targets
        .iter()
        .map(|t| format!("q{t}"))
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for TransitionTable {
    /// ASCII grid with `+---+` separators and left-justified cells.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.grid();
        let widths: Vec<usize> = (0..grid[0].len())
            .map(|col| {
                grid.iter()
                    .map(|row| row[col].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let separator = widths.iter().fold(String::from("+"), |mut acc, w| {
            acc.push_str(&"-".repeat(w + 2));
            acc.push('+');
            acc
        });

        writeln!(f, "{separator}")?;
        for (i, row) in grid.iter().enumerate() {
            write!(f, "|")?;
            for (cell, &width) in row.iter().zip(&widths) {
                let pad = width - cell.chars().count();
                write!(f, " {cell}{} |", " ".repeat(pad))?;
            }
            writeln!(f)?;
            if i == 0 {
                writeln!(f, "{separator}")?;
            }
        }
        write!(f, "{separator}")
    }
}
