//! SLR(1) table construction: an LR(0) automaton whose reductions are placed on the FOLLOW
//! set of the reduced nonterminal.

use std::collections::VecDeque;
use std::fmt::Debug;

use log::debug;

use crate::automaton::{self, advance_past, ItemSet, LrItem, StateMachine};
use crate::config::Config;
use crate::conflict::TableBuilder;
use crate::error::{CompileError, GrammarError};
use crate::grammar::{Grammar, Symbol};
use crate::sets::{FirstSets, FollowSets};
use crate::table::ParseTable;
use crate::Symbol::*;

/// An LR(0) item: a production and a dot position.
///
/// For example, if production `E → E + T` is partially parsed as `E → E • + T`, the item
/// stores the generation of `E → E + T` and dot position 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lr0Item {
    /// The generation of the production.
    pub prod: usize,
    /// The position of the dot within the production's right-hand side.
    pub dot: usize,
}

impl<'a, T: 'a> LrItem<'a, T> for Lr0Item {
    fn production(&self) -> usize {
        self.prod
    }

    fn dot(&self) -> usize {
        self.dot
    }

    fn advance(&self) -> Self {
        Lr0Item {
            prod: self.prod,
            dot: self.dot + 1,
        }
    }
}

/// Computes the LR(0) closure of a set of items: for every item with the dot before a
/// nonterminal, the initial items of that nonterminal's productions are added, until nothing
/// new appears.
pub fn closure<T: Ord + Clone, N: Ord + Clone, A>(
    grammar: &Grammar<T, N, A>,
    items: &ItemSet<Lr0Item>,
) -> ItemSet<Lr0Item> {
    let mut completed = items.items.clone();
    let mut to_add: VecDeque<Lr0Item> = items.items.iter().copied().collect();
    while let Some(item) = to_add.pop_front() {
        if let Some(Nonterminal(ref n)) = grammar.productions()[item.prod].rhs().get(item.dot) {
            for &prod in grammar.alternatives(n) {
                let new_item = Lr0Item { prod, dot: 0 };
                if completed.insert(new_item) {
                    to_add.push_back(new_item);
                }
            }
        }
    }
    ItemSet { items: completed }
}

/// The closure of the items of `items` advanced past `sym`.
pub fn goto<T: Ord + Clone, N: Ord + Clone, A>(
    grammar: &Grammar<T, N, A>,
    items: &ItemSet<Lr0Item>,
    sym: &Symbol<T, N>,
) -> ItemSet<Lr0Item> {
    closure(grammar, &advance_past(grammar, items, sym))
}

/// Construct the canonical collection of LR(0) item sets, starting from the initial item of
/// `start_production`.
pub fn build_states<T: Ord + Clone, N: Ord + Clone, A>(
    grammar: &Grammar<T, N, A>,
    start_production: usize,
) -> StateMachine<'_, T, N, Lr0Item> {
    let kernel = ItemSet::new([Lr0Item {
        prod: start_production,
        dot: 0,
    }]);
    automaton::build(grammar, kernel, |k| closure(grammar, k))
}

impl<T, N, A> Grammar<T, N, A>
where
    T: Ord + Clone + Debug,
    N: Ord + Clone + Debug,
{
    /// Create the LR(0) state machine for the grammar.
    pub fn lr0_state_machine(
        &self,
        start: &N,
    ) -> Result<StateMachine<'_, T, N, Lr0Item>, GrammarError<T, N>> {
        let start_production = self.validate(start)?;
        Ok(build_states(self, start_production))
    }

    /// Try to create an SLR(1) parse table out of the grammar, with `start` as the start
    /// symbol.
    ///
    /// Check [`ParseTable::conflicts`](struct.ParseTable.html#structfield.conflicts) on
    /// success: it lists the shift/reduce conflicts that had to be settled without declared
    /// precedence.
    pub fn slr(
        &self,
        start: &N,
        config: &impl Config<T, N, A>,
    ) -> Result<ParseTable<T, N>, CompileError<T, N>> {
        let start_production = self.validate(start)?;
        let first_sets = FirstSets::new(self);
        let follow_sets = FollowSets::new(self, &first_sets, start);
        let state_machine = build_states(self, start_production);
        if state_machine.states.is_empty() {
            return Err(GrammarError::NoInitialState.into());
        }
        debug!("LR(0) automaton: {} states", state_machine.states.len());

        let mut builder = TableBuilder::new(self, start_production, state_machine.states.len());
        builder.add_transitions(&state_machine)?;

        // add reductions
        for (i, (iset, _)) in state_machine.states.iter().enumerate() {
            for item in iset.items.iter() {
                let p = &self.productions()[item.prod];
                if item.dot < p.rhs().len() {
                    continue;
                }
                for lookahead in follow_sets.lookaheads(p.lhs()) {
                    builder.reduce(i, lookahead, item.prod, config);
                }
            }
        }

        builder.finish(config)
    }
}
