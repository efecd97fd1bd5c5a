//! This crate provides data structures for context-free grammars, two algorithms that turn a
//! grammar into a deterministic parse table (SLR and canonical LR(1)), and a table-driven
//! shift-reduce parser that runs the result over a token stream.
//!
//! To use this crate, build a [`Grammar`](struct.Grammar.html) with
//! [`rule`](struct.Grammar.html#method.rule), declare operator precedence with
//! [`left`](struct.Grammar.html#method.left) and friends, and call
//! [`slr`](struct.Grammar.html#method.slr) or [`lr1`](struct.Grammar.html#method.lr1). The
//! resulting [`ParseTable`](struct.ParseTable.html) is plain data: it can be serialized and
//! handed to any number of [`Parser`](struct.Parser.html)s.
//!
//! ```
//! use lrkit::*;
//!
//! let mut g: Grammar<&str, &str, Reduction<i64>> = Grammar::new();
//! g.rule("S").alt(vec![Nonterminal("E")], Box::new(|v| v[0]));
//! g.rule("E")
//!     .alt(vec![Nonterminal("E"), Terminal("+"), Nonterminal("E")], Box::new(|v| v[0] + v[2]))
//!     .alt(vec![Nonterminal("E"), Terminal("*"), Nonterminal("E")], Box::new(|v| v[0] * v[2]))
//!     .alt(vec![Terminal("1")], Box::new(|_| 1))
//!     .alt(vec![Terminal("2")], Box::new(|_| 2));
//! g.left(["+"]).left(["*"]);
//!
//! let table = g.lr1(&"S", &DefaultConfig::new()).unwrap();
//! let mut parser = Parser::new(&g, &table);
//! let tokens = ["2", "+", "2", "*", "2"].map(|t| Ok::<_, std::convert::Infallible>(Digit(t)));
//! assert_eq!(parser.parse(tokens).unwrap(), 6);
//!
//! #[derive(Debug)]
//! struct Digit(&'static str);
//! impl Token for Digit {
//!     type Terminal = &'static str;
//!     fn terminal(&self) -> &&'static str {
//!         &self.0
//!     }
//! }
//! impl From<Digit> for i64 {
//!     fn from(d: Digit) -> i64 {
//!         d.0.parse().unwrap_or(0)
//!     }
//! }
//! ```

#![deny(missing_docs)]

pub mod automaton;
pub mod config;
pub mod conflict;
pub mod error;
pub mod grammar;
pub mod lr1;
pub mod parser;
pub mod precedence;
pub mod sets;
pub mod slr;
pub mod table;

pub use config::{Config, DefaultConfig};
pub use error::{CompileError, GrammarError, ParseError, SyntaxError};
pub use grammar::{Grammar, NonTerminal, Production, Reduction, Rule, Symbol};
pub use parser::{Parser, ParserStats, StackEntry, Token};
pub use precedence::{Assoc, Precedence, PrecedenceTable};
pub use table::{Action, Conflict, ParseTable, ProductionInfo, TableState};
pub use Symbol::*;

#[cfg(test)]
mod tests;
