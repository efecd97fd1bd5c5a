//! Canonical LR(1) table construction.
//!
//! Items carry their own lookahead, so reductions are placed exactly on the terminals that can
//! follow them in context. The state space is larger than SLR's, but no reduction is placed
//! where the automaton can never use it.

use std::collections::VecDeque;
use std::fmt::{self, Debug};

use log::debug;

use crate::automaton::{self, advance_past, ItemSet, LrItem, StateMachine};
use crate::config::Config;
use crate::conflict::TableBuilder;
use crate::error::{CompileError, GrammarError};
use crate::grammar::{Grammar, Symbol};
use crate::sets::FirstSets;
use crate::table::ParseTable;
use crate::Symbol::*;

/// An LR(1) item: a production, a dot position, and the terminal expected after the
/// production is reduced (`None` for end of input).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lr1Item<'a, T> {
    /// The generation of the production.
    pub prod: usize,
    /// The position of the dot within the production's right-hand side.
    pub dot: usize,
    /// The lookahead.
    pub lookahead: Option<&'a T>,
}

impl<'a, T> Clone for Lr1Item<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Lr1Item<'a, T> {}

impl<'a, T: Debug> Debug for Lr1Item<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "[{}.{}, ", self.prod, self.dot)?;
        match self.lookahead {
            Some(t) => write!(f, "{:?}]", t),
            None => write!(f, "$]"),
        }
    }
}

impl<'a, T: Ord> LrItem<'a, T> for Lr1Item<'a, T> {
    fn production(&self) -> usize {
        self.prod
    }

    fn dot(&self) -> usize {
        self.dot
    }

    fn advance(&self) -> Self {
        Lr1Item {
            dot: self.dot + 1,
            ..*self
        }
    }

    fn lookahead(&self) -> Option<Option<&'a T>> {
        Some(self.lookahead)
    }
}

/// Computes the LR(1) closure of a set of items: for `[A → α • B β, a]`, the items
/// `[B → • γ, b]` are added for every production of `B` and every `b` in FIRST(β a).
pub fn closure<'a, T: Ord + Clone, N: Ord + Clone, A>(
    grammar: &'a Grammar<T, N, A>,
    first: &FirstSets<'a, T, N>,
    items: &ItemSet<Lr1Item<'a, T>>,
) -> ItemSet<Lr1Item<'a, T>> {
    let mut completed = items.items.clone();
    let mut to_add: VecDeque<Lr1Item<'a, T>> = items.items.iter().copied().collect();
    while let Some(item) = to_add.pop_front() {
        let rhs = grammar.productions()[item.prod].rhs();
        if let Some(Nonterminal(ref n)) = rhs.get(item.dot) {
            let lookaheads = first.first_of_sequence(&rhs[item.dot + 1..], item.lookahead);
            for &prod in grammar.alternatives(n) {
                for &lookahead in lookaheads.iter() {
                    let new_item = Lr1Item {
                        prod,
                        dot: 0,
                        lookahead,
                    };
                    if completed.insert(new_item) {
                        to_add.push_back(new_item);
                    }
                }
            }
        }
    }
    ItemSet { items: completed }
}

/// The closure of the items of `items` advanced past `sym`, lookaheads preserved.
pub fn goto<'a, T: Ord + Clone, N: Ord + Clone, A>(
    grammar: &'a Grammar<T, N, A>,
    first: &FirstSets<'a, T, N>,
    items: &ItemSet<Lr1Item<'a, T>>,
    sym: &Symbol<T, N>,
) -> ItemSet<Lr1Item<'a, T>> {
    closure(grammar, first, &advance_past(grammar, items, sym))
}

/// Construct the canonical collection of LR(1) item sets, starting from
/// `[start_production, 0, $]`.
pub fn build_states<'a, T: Ord + Clone, N: Ord + Clone, A>(
    grammar: &'a Grammar<T, N, A>,
    first: &FirstSets<'a, T, N>,
    start_production: usize,
) -> StateMachine<'a, T, N, Lr1Item<'a, T>> {
    let kernel = ItemSet::new([Lr1Item {
        prod: start_production,
        dot: 0,
        lookahead: None,
    }]);
    automaton::build(grammar, kernel, |k| closure(grammar, first, k))
}

impl<T, N, A> Grammar<T, N, A>
where
    T: Ord + Clone + Debug,
    N: Ord + Clone + Debug,
{
    /// Try to create a canonical LR(1) parse table out of the grammar, with `start` as the
    /// start symbol.
    ///
    /// Check [`ParseTable::conflicts`](struct.ParseTable.html#structfield.conflicts) on
    /// success: it lists the shift/reduce conflicts that had to be settled without declared
    /// precedence.
    pub fn lr1(
        &self,
        start: &N,
        config: &impl Config<T, N, A>,
    ) -> Result<ParseTable<T, N>, CompileError<T, N>> {
        let start_production = self.validate(start)?;
        let first_sets = FirstSets::new(self);
        let state_machine = build_states(self, &first_sets, start_production);
        if state_machine.states.is_empty() {
            return Err(GrammarError::NoInitialState.into());
        }
        debug!("LR(1) automaton: {} states", state_machine.states.len());

        let mut builder = TableBuilder::new(self, start_production, state_machine.states.len());
        builder.add_transitions(&state_machine)?;

        // add reductions
        for (i, (iset, _)) in state_machine.states.iter().enumerate() {
            for item in iset.items.iter() {
                if item.dot == self.productions()[item.prod].rhs().len() {
                    builder.reduce(i, item.lookahead, item.prod, config);
                }
            }
        }

        builder.finish(config)
    }

    /// Create the LR(1) state machine for the grammar.
    pub fn lr1_state_machine(
        &self,
        start: &N,
    ) -> Result<StateMachine<'_, T, N, Lr1Item<'_, T>>, GrammarError<T, N>> {
        let start_production = self.validate(start)?;
        let first_sets = FirstSets::new(self);
        Ok(build_states(self, &first_sets, start_production))
    }
}
