//! The compiled parse table.
//!
//! A table is plain owned data and can be serialized, stored, and reused for any number of
//! parses without recompiling the grammar.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An action in a parse table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action<T> {
    /// Shift, moving to the given state.
    Shift(usize),
    /// Reduce by the production with the given generation.
    Reduce(usize),
    /// Accept, ending the parse.
    Accept,
    /// Fail the parse.
    Error {
        /// Why this cell rejects its lookahead.
        message: String,
        /// The candidate actions that were refused, for ambiguities the grammar left open.
        conflicts: Vec<Action<T>>,
        /// The lookahead of the cell, or `None` for end of input.
        lookahead: Option<T>,
    },
}

impl<T> Action<T> {
    /// Whether this is an `Error` action.
    pub fn is_error(&self) -> bool {
        matches!(*self, Action::Error { .. })
    }
}

/// A shift/reduce conflict that precedence could not decide and that was resolved by
/// shifting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict<T> {
    /// The state holding the cell.
    pub state: usize,
    /// The lookahead of the cell.
    pub lookahead: T,
    /// Target of the shift that was kept.
    pub shift: usize,
    /// Generation of the production whose reduction was dropped.
    pub reduce: usize,
}

/// What the parser needs to know about a production to reduce by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionInfo<N> {
    /// The nonterminal produced.
    pub lhs: N,
    /// Number of right-hand-side symbols popped.
    pub len: usize,
}

/// A state in a parse table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState<T: Ord, N: Ord> {
    /// The action if the lookahead is EOF.
    pub eof: Action<T>,
    /// The actions for each non-EOF lookahead.
    pub lookahead: BTreeMap<T, Action<T>>,
    /// The state to jump to when shifting a nonterminal (because of a reduce rule).
    pub goto: BTreeMap<N, usize>,
}

/// A parse table, as produced by [`Grammar::slr`](struct.Grammar.html#method.slr) or
/// [`Grammar::lr1`](struct.Grammar.html#method.lr1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTable<T: Ord, N: Ord> {
    /// The states of the parse table.
    pub states: Vec<TableState<T, N>>,
    /// The initial state.
    pub start: usize,
    /// Generation of the start production, which `Accept` reduces before returning.
    pub start_production: usize,
    /// Every production of the grammar, indexed by generation.
    pub productions: Vec<ProductionInfo<N>>,
    /// Shift/reduce conflicts that were resolved by the shift default rather than by declared
    /// precedence. An empty list means every ambiguity was settled by the grammar itself.
    pub conflicts: Vec<Conflict<T>>,
}

impl<T: Ord, N: Ord> ParseTable<T, N> {
    /// The action for `lookahead` (`None` for end of input) in `state`. `None` if the state
    /// does not exist or the terminal is not part of the grammar.
    pub fn action(&self, state: usize, lookahead: Option<&T>) -> Option<&Action<T>> {
        let s = self.states.get(state)?;
        match lookahead {
            Some(t) => s.lookahead.get(t),
            None => Some(&s.eof),
        }
    }

    /// The state reached from `state` after reducing to `n`.
    pub fn goto(&self, state: usize, n: &N) -> Option<usize> {
        self.states.get(state)?.goto.get(n).copied()
    }

    /// Lookaheads that `state` does not reject; `None` stands for end of input.
    pub fn expected(&self, state: usize) -> Vec<Option<&T>> {
        match self.states.get(state) {
            Some(s) => s
                .lookahead
                .iter()
                .filter(|(_, a)| !a.is_error())
                .map(|(t, _)| Some(t))
                .chain((!s.eof.is_error()).then_some(None))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether the table holds shift/reduce conflicts resolved by default.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}
