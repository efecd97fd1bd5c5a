//! Candidate-action collection and conflict resolution, shared by both compilers.
//!
//! The compilers hand every candidate action to a [`TableBuilder`]. Shifts, gotos and the
//! accept action are unique per cell by construction; reductions may pile up. Once all
//! candidates are in, [`TableBuilder::finish`] settles each cell to exactly one action:
//!
//! - accept next to any other action is a compile error;
//! - among several reductions the earliest-declared production wins;
//! - a shift next to a reduction is decided by precedence, then associativity. A
//!   non-associative tie becomes an `Error` action. A failed precedence lookup defaults to the
//!   shift and is recorded in [`ParseTable::conflicts`].
//!
//! Cells nobody filled get an `Error` action, so the finished table is total over the
//! grammar's terminals plus end of input.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use log::{debug, warn};

use crate::automaton::{LrItem, StateMachine};
use crate::config::Config;
use crate::error::{CompileError, GrammarError};
use crate::grammar::Grammar;
use crate::precedence::Assoc;
use crate::table::{Action, Conflict, ParseTable, ProductionInfo, TableState};
use crate::Symbol::*;

#[derive(Debug, Default)]
struct Cell {
    shift: Option<usize>,
    reduces: BTreeSet<usize>,
    accept: bool,
}

/// Collects candidate actions per `(state, lookahead)` cell and resolves them into a
/// [`ParseTable`].
pub struct TableBuilder<'a, T, N, A> {
    grammar: &'a Grammar<T, N, A>,
    start_production: usize,
    cells: Vec<BTreeMap<Option<&'a T>, Cell>>,
    gotos: Vec<BTreeMap<&'a N, usize>>,
}

impl<'a, T, N, A> TableBuilder<'a, T, N, A>
where
    T: Ord + Clone + Debug,
    N: Ord + Clone + Debug,
{
    /// A builder for a table with `states` states, where `start_production` is the
    /// production whose completion accepts.
    pub fn new(grammar: &'a Grammar<T, N, A>, start_production: usize, states: usize) -> Self {
        TableBuilder {
            grammar,
            start_production,
            cells: (0..states).map(|_| BTreeMap::new()).collect(),
            gotos: (0..states).map(|_| BTreeMap::new()).collect(),
        }
    }

    /// Add the shifts and gotos given by the transitions of `machine`.
    pub fn add_transitions<I>(
        &mut self,
        machine: &StateMachine<'a, T, N, I>,
    ) -> Result<(), CompileError<T, N>>
    where
        I: LrItem<'a, T>,
    {
        for (i, (_, trans)) in machine.states.iter().enumerate() {
            for (&sym, &target) in trans.iter() {
                match *sym {
                    Terminal(ref t) => self.shift(i, t, target)?,
                    Nonterminal(ref n) => {
                        self.gotos[i].insert(n, target);
                    }
                }
            }
        }
        Ok(())
    }

    /// Offer `Shift(target)` for `(state, t)`.
    pub fn shift(&mut self, state: usize, t: &'a T, target: usize) -> Result<(), CompileError<T, N>> {
        let cell = self.cells[state].entry(Some(t)).or_default();
        match cell.shift {
            Some(existing) if existing != target => Err(CompileError::Conflict {
                state,
                lookahead: Some(t.clone()),
                existing: Action::Shift(existing),
                incoming: Action::Shift(target),
            }),
            _ => {
                cell.shift = Some(target);
                Ok(())
            }
        }
    }

    /// Offer a reduction by `production` for `(state, lookahead)`. Completing the start
    /// production at end of input offers `Accept` instead.
    pub fn reduce(
        &mut self,
        state: usize,
        lookahead: Option<&'a T>,
        production: usize,
        config: &impl Config<T, N, A>,
    ) {
        let cell = self.cells[state].entry(lookahead).or_default();
        if production == self.start_production && lookahead.is_none() {
            cell.accept = true;
        } else if config.reduce_on(&self.grammar.productions()[production], lookahead) {
            cell.reduces.insert(production);
        }
    }

    /// Resolve every cell and produce the table.
    pub fn finish(self, config: &impl Config<T, N, A>) -> Result<ParseTable<T, N>, CompileError<T, N>> {
        let terminals = self.grammar.terminals();
        let mut conflicts = Vec::new();
        let mut states = Vec::with_capacity(self.cells.len());
        for (state, (cells, gotos)) in self.cells.iter().zip(self.gotos.iter()).enumerate() {
            let mut eof = None;
            let mut lookahead = BTreeMap::new();
            for (&la, cell) in cells.iter() {
                let action = match self.resolve(state, la, cell, config)? {
                    Resolved::Action(a) => a,
                    Resolved::Defaulted(a, conflict) => {
                        warn!(
                            "shift/reduce conflict in state {} on {:?} resolved as shift: {:?}",
                            state,
                            conflict.lookahead,
                            self.grammar.productions()[conflict.reduce]
                        );
                        config.on_defaulted_conflict(&conflict);
                        conflicts.push(conflict);
                        a
                    }
                };
                match la {
                    Some(t) => {
                        lookahead.insert(t.clone(), action);
                    }
                    None => eof = Some(action),
                }
            }
            for &t in terminals.iter() {
                lookahead.entry(t.clone()).or_insert_with(|| Action::Error {
                    message: "unexpected token".to_string(),
                    conflicts: vec![],
                    lookahead: Some(t.clone()),
                });
            }
            states.push(TableState {
                eof: eof.unwrap_or_else(|| Action::Error {
                    message: "unexpected end of input".to_string(),
                    conflicts: vec![],
                    lookahead: None,
                }),
                lookahead,
                goto: gotos.iter().map(|(&n, &s)| (n.clone(), s)).collect(),
            });
        }
        debug!(
            "parse table: {} states, {} defaulted conflicts",
            states.len(),
            conflicts.len()
        );
        Ok(ParseTable {
            states,
            start: 0,
            start_production: self.start_production,
            productions: self
                .grammar
                .productions()
                .iter()
                .map(|p| ProductionInfo {
                    lhs: p.lhs().clone(),
                    len: p.rhs().len(),
                })
                .collect(),
            conflicts,
        })
    }

    fn resolve(
        &self,
        state: usize,
        lookahead: Option<&'a T>,
        cell: &Cell,
        config: &impl Config<T, N, A>,
    ) -> Result<Resolved<T>, CompileError<T, N>> {
        let conflict = |existing, incoming| CompileError::Conflict {
            state,
            lookahead: lookahead.cloned(),
            existing,
            incoming,
        };
        if cell.accept {
            if let Some(target) = cell.shift {
                return Err(conflict(Action::Accept, Action::Shift(target)));
            }
            if let Some(&p) = cell.reduces.iter().next() {
                return Err(conflict(Action::Accept, Action::Reduce(p)));
            }
            return Ok(Resolved::Action(Action::Accept));
        }
        let reduce = self.pick_reduce(state, lookahead, &cell.reduces)?;
        match (cell.shift, reduce, lookahead) {
            (Some(target), Some(p), Some(t)) => self.shift_reduce(state, t, target, p, config),
            (Some(target), _, _) => Ok(Resolved::Action(Action::Shift(target))),
            (None, Some(p), _) => Ok(Resolved::Action(Action::Reduce(p))),
            // every reduction in the cell was vetoed by `reduce_on`
            (None, None, _) => Ok(Resolved::Action(Action::Error {
                message: match lookahead {
                    Some(_) => "unexpected token".to_string(),
                    None => "unexpected end of input".to_string(),
                },
                conflicts: vec![],
                lookahead: lookahead.cloned(),
            })),
        }
    }

    /// The earliest-declared of the competing reductions.
    fn pick_reduce(
        &self,
        state: usize,
        lookahead: Option<&T>,
        reduces: &BTreeSet<usize>,
    ) -> Result<Option<usize>, CompileError<T, N>> {
        let productions = self.grammar.productions();
        let mut winner: Option<usize> = None;
        for &p in reduces.iter() {
            winner = Some(match winner {
                None => p,
                Some(w) => match productions[w].generation().cmp(&productions[p].generation()) {
                    Ordering::Less => w,
                    Ordering::Greater => p,
                    Ordering::Equal => {
                        return Err(GrammarError::ReduceReduceTie {
                            first: w,
                            second: p,
                        }
                        .into())
                    }
                },
            });
        }
        if reduces.len() > 1 {
            debug!(
                "reduce/reduce conflict in state {} on {:?} resolved in favour of {:?}",
                state,
                lookahead,
                winner.map(|w| &productions[w])
            );
        }
        Ok(winner)
    }

    fn shift_reduce(
        &self,
        state: usize,
        t: &T,
        target: usize,
        production: usize,
        config: &impl Config<T, N, A>,
    ) -> Result<Resolved<T>, CompileError<T, N>> {
        let precedences = self
            .grammar
            .terminal_precedence(t)
            .and_then(|tp| Ok((tp, self.grammar.rule_precedence(production)?)));
        let (tp, rp) = match precedences {
            Ok(pair) => pair,
            Err(e) if config.shift_on_undeclared_precedence() => {
                debug!("no precedence to settle state {} on {:?}: {}", state, t, e);
                return Ok(Resolved::Defaulted(
                    Action::Shift(target),
                    Conflict {
                        state,
                        lookahead: t.clone(),
                        shift: target,
                        reduce: production,
                    },
                ));
            }
            Err(e) => return Err(e.into()),
        };
        let action = match tp.level.cmp(&rp.level) {
            Ordering::Greater => Action::Shift(target),
            Ordering::Less => Action::Reduce(production),
            Ordering::Equal => match tp.assoc {
                Assoc::Left => Action::Reduce(production),
                Assoc::Right => Action::Shift(target),
                Assoc::NonAssoc => Action::Error {
                    message: "non-associative operator used associatively".to_string(),
                    conflicts: vec![Action::Shift(target), Action::Reduce(production)],
                    lookahead: Some(t.clone()),
                },
            },
        };
        Ok(Resolved::Action(action))
    }
}

enum Resolved<T> {
    Action(Action<T>),
    Defaulted(Action<T>, Conflict<T>),
}
