//! The table-driven shift-reduce parser.

use std::fmt::Debug;

use log::{log_enabled, trace, Level};

use crate::error::{ParseError, SyntaxError};
use crate::grammar::Grammar;
use crate::table::{Action, ParseTable};

/// A token produced by a lexer: a value tagged with the terminal it stands for.
pub trait Token {
    /// The terminal type of the grammar.
    type Terminal;

    /// The terminal this token is an instance of.
    fn terminal(&self) -> &Self::Terminal;
}

impl<'a> Token for &'a str {
    type Terminal = &'a str;

    fn terminal(&self) -> &&'a str {
        self
    }
}

impl Token for char {
    type Terminal = char;

    fn terminal(&self) -> &char {
        self
    }
}

impl Token for String {
    type Terminal = String;

    fn terminal(&self) -> &String {
        self
    }
}

/// One entry of the parse stack. The bottom entry has no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry<V> {
    /// The state entered when this entry was pushed.
    pub state: usize,
    /// The shifted token or reduced value.
    pub value: Option<V>,
}

/// Counters for one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Tokens pulled from the stream.
    pub tokens: usize,
    /// Shift actions taken.
    pub shifts: usize,
    /// Reduce actions taken.
    pub reductions: usize,
}

/// A parser running a [`ParseTable`] with the reduction actions of the grammar it was built
/// from.
pub struct Parser<'g, T: Ord, N: Ord, A> {
    grammar: &'g Grammar<T, N, A>,
    table: &'g ParseTable<T, N>,
    stats: ParserStats,
}

impl<'g, T, N, A> Parser<'g, T, N, A>
where
    T: Ord + Clone + Debug,
    N: Ord + Clone + Debug,
{
    /// Create a parser. `table` must have been compiled from `grammar`.
    pub fn new(grammar: &'g Grammar<T, N, A>, table: &'g ParseTable<T, N>) -> Self {
        Parser {
            grammar,
            table,
            stats: ParserStats::default(),
        }
    }

    /// Counters of the most recent parse.
    pub fn stats(&self) -> ParserStats {
        self.stats.clone()
    }

    /// Parse `tokens` and return the value the start production reduces to.
    ///
    /// Accepting runs the start production's action on the values above the bottom of the
    /// stack. That reduction is not counted in [`ParserStats::reductions`].
    ///
    /// The end of the iterator is the end of input. An `Err` from the iterator ends the parse
    /// with [`ParseError::Lex`].
    pub fn parse<K, V, E, I>(&mut self, tokens: I) -> Result<V, ParseError<T, K, V, E>>
    where
        I: IntoIterator<Item = Result<K, E>>,
        K: Token<Terminal = T> + Debug,
        V: From<K>,
        A: Fn(Vec<V>) -> V,
    {
        let table = self.table;
        self.stats = ParserStats::default();
        let mut tokens = tokens.into_iter();
        let mut stack = vec![StackEntry {
            state: table.start,
            value: None,
        }];
        let mut token = match self.next_token(&mut tokens) {
            Ok(t) => t,
            Err(e) => return Err(ParseError::Lex(e)),
        };
        loop {
            let state = stack.last().map_or(table.start, |e| e.state);
            let action = table.action(state, token.as_ref().map(Token::terminal));
            match action {
                Some(&Action::Shift(next)) => {
                    trace!("Shift {}", next);
                    self.stats.shifts += 1;
                    stack.push(StackEntry {
                        state: next,
                        value: token.take().map(V::from),
                    });
                    token = match self.next_token(&mut tokens) {
                        Ok(t) => t,
                        Err(e) => return Err(ParseError::Lex(e)),
                    };
                }

                Some(&Action::Reduce(p)) => {
                    let info = match table.productions.get(p) {
                        Some(info) => info,
                        None => return Err(self.fail("unknown production", state, token, stack)),
                    };
                    trace!("Reduce {} ({:?}, {} symbols)", p, info.lhs, info.len);
                    if stack.len() <= info.len {
                        return Err(self.fail("parse stack underflow", state, token, stack));
                    }
                    let values: Vec<V> = stack
                        .drain(stack.len() - info.len..)
                        .filter_map(|e| e.value)
                        .collect();
                    let value = match self.grammar.productions().get(p) {
                        Some(production) => (production.action())(values),
                        None => return Err(self.fail("unknown production", state, token, stack)),
                    };
                    let top = stack.last().map_or(table.start, |e| e.state);
                    let next = match table.goto(top, &info.lhs) {
                        Some(next) => next,
                        None => return Err(self.fail("missing goto", top, token, stack)),
                    };
                    self.stats.reductions += 1;
                    stack.push(StackEntry {
                        state: next,
                        value: Some(value),
                    });
                }

                Some(&Action::Accept) => {
                    let p = table.start_production;
                    let (info, production) =
                        match (table.productions.get(p), self.grammar.productions().get(p)) {
                            (Some(info), Some(production)) => (info, production),
                            _ => return Err(self.fail("unknown production", state, token, stack)),
                        };
                    trace!("Accept {} ({:?}, {} symbols)", p, info.lhs, info.len);
                    // only the bottom entry may remain below the start production
                    if stack.len() != info.len + 1 {
                        return Err(self.fail("accepted with a malformed stack", state, token, stack));
                    }
                    let values: Vec<V> = stack.drain(1..).filter_map(|e| e.value).collect();
                    return Ok((production.action())(values));
                }

                Some(Action::Error { message, .. }) => {
                    trace!("Error {:?}", message);
                    return Err(self.fail(message, state, token, stack));
                }

                None => return Err(self.fail("unexpected token", state, token, stack)),
            }

            if log_enabled!(Level::Trace) {
                let states: Vec<usize> = stack.iter().map(|e| e.state).collect();
                trace!("stack {:?}, lookahead {:?}", states, token);
            }
        }
    }

    fn next_token<K, E>(
        &mut self,
        tokens: &mut impl Iterator<Item = Result<K, E>>,
    ) -> Result<Option<K>, E> {
        let token = tokens.next().transpose()?;
        if token.is_some() {
            self.stats.tokens += 1;
        }
        Ok(token)
    }

    fn fail<K, V, E>(
        &self,
        message: &str,
        state: usize,
        token: Option<K>,
        stack: Vec<StackEntry<V>>,
    ) -> ParseError<T, K, V, E> {
        ParseError::Syntax(SyntaxError {
            message: message.to_string(),
            state,
            token,
            expected: self
                .table
                .expected(state)
                .into_iter()
                .map(|t| t.cloned())
                .collect(),
            stack,
        })
    }
}
