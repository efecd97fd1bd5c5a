//! Error types for grammar validation, table construction and parsing.
//!
//! Grammar and compile errors abort table construction; no partial table is returned. Parse
//! errors abort only the parse call that raised them.

use thiserror::Error;

use crate::parser::StackEntry;
use crate::table::Action;

/// A problem with the shape of a grammar, found before or during table construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError<T, N> {
    /// The start symbol is not a nonterminal of the grammar.
    #[error("start symbol {0:?} is not defined")]
    UnknownStart(N),
    /// A reachable nonterminal has no productions.
    #[error("nonterminal {0:?} has no productions")]
    EmptyNonterminal(N),
    /// The start nonterminal has no production.
    #[error("start symbol {0:?} has no production")]
    NoStartProduction(N),
    /// The start nonterminal has more than one production.
    #[error("start symbol {start:?} has {count} productions, expected exactly one")]
    MultipleStartProductions {
        /// The start nonterminal.
        start: N,
        /// Number of productions found.
        count: usize,
    },
    /// The start nonterminal appears on a right-hand side.
    #[error("start symbol {0:?} is referenced by a right-hand side")]
    StartReferenced(N),
    /// A terminal appears in more than one precedence group.
    #[error("terminal {0:?} is declared in more than one precedence group")]
    DuplicatePrecedence(T),
    /// A terminal has no declared precedence.
    #[error("terminal {0:?} has no declared precedence")]
    UndeclaredPrecedence(T),
    /// A production has neither a precedence tag nor a terminal on its right-hand side.
    #[error("production {production} of {lhs:?} has no terminal to take its precedence from")]
    NoRulePrecedence {
        /// The owning nonterminal.
        lhs: N,
        /// The production's generation.
        production: usize,
    },
    /// Two different productions with the same generation competed for one cell.
    #[error("productions {first} and {second} share a generation")]
    ReduceReduceTie {
        /// The production already in the cell.
        first: usize,
        /// The competing production.
        second: usize,
    },
    /// The automaton has no initial state.
    #[error("no initial state")]
    NoInitialState,
}

/// The reason table construction failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError<T, N> {
    /// The grammar is malformed.
    #[error("{0}")]
    Grammar(GrammarError<T, N>),
    /// Two actions that precedence cannot arbitrate landed in the same cell.
    #[error("conflict in state {state} on {lookahead:?}: {existing:?} vs {incoming:?}")]
    Conflict {
        /// The state holding the cell.
        state: usize,
        /// The lookahead of the cell, or `None` for end of input.
        lookahead: Option<T>,
        /// The action installed first.
        existing: Action<T>,
        /// The action that collided with it.
        incoming: Action<T>,
    },
}

impl<T, N> From<GrammarError<T, N>> for CompileError<T, N> {
    fn from(e: GrammarError<T, N>) -> Self {
        CompileError::Grammar(e)
    }
}

/// A parse that stopped on an input it could not handle.
///
/// The whole parse stack is handed back so the caller can see what had been recognized.
#[derive(Debug, Error)]
#[error("{message} in state {state} at {token:?}")]
pub struct SyntaxError<T, K, V> {
    /// What went wrong.
    pub message: String,
    /// The state on top of the stack.
    pub state: usize,
    /// The offending token, or `None` at end of input.
    pub token: Option<K>,
    /// Lookaheads the state would have accepted; `None` stands for end of input.
    pub expected: Vec<Option<T>>,
    /// The parse stack, bottom first.
    pub stack: Vec<StackEntry<V>>,
}

/// The reason a parse failed.
#[derive(Debug, Error)]
pub enum ParseError<T, K, V, E> {
    /// The token stream reported an error.
    #[error("lexical error: {0}")]
    Lex(E),
    /// The tokens do not form a sentence of the grammar.
    #[error("syntax error: {0}")]
    Syntax(SyntaxError<T, K, V>),
}
