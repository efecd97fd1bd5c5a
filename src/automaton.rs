//! Item sets and the canonical collection of parser states.
//!
//! The construction is shared by the SLR and LR(1) compilers; they differ only in the item
//! type and in how a kernel is closed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::io::{self, Write};

use crate::grammar::{Grammar, Symbol};

/// An item: a production with a distinguished position, and possibly a lookahead.
pub trait LrItem<'a, T: 'a>: Ord + Clone {
    /// Generation of the production.
    fn production(&self) -> usize;
    /// Position of the dot within the right-hand side.
    fn dot(&self) -> usize;
    /// The same item with the dot moved one symbol to the right.
    fn advance(&self) -> Self;
    /// The lookahead, for items that carry one. `Some(None)` is end of input.
    fn lookahead(&self) -> Option<Option<&'a T>> {
        None
    }
}

/// A set of items, forming a state of the automaton.
///
/// Items are kept sorted so that equal sets compare and hash equal regardless of the order in
/// which their items were found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemSet<I> {
    /// The items in the set.
    pub items: BTreeSet<I>,
}

impl<I: Ord> ItemSet<I> {
    /// A set holding the given items.
    pub fn new(items: impl IntoIterator<Item = I>) -> Self {
        ItemSet {
            items: items.into_iter().collect(),
        }
    }

    /// Whether the set has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// An item set and its transitions.
pub type State<'a, T, N, I> = (ItemSet<I>, BTreeMap<&'a Symbol<T, N>, usize>);

/// The canonical collection of item sets of a grammar.
#[derive(Debug)]
pub struct StateMachine<'a, T: 'a, N: 'a, I> {
    /// A vector of states, each of which consists of an item set and a set of transitions.
    ///
    /// State 0 is the starting state.
    pub states: Vec<State<'a, T, N, I>>,
}

/// Items advanced past `sym`, for every item of `items` whose dot precedes `sym`. The result
/// is the kernel of the goto target and still has to be closed.
pub fn advance_past<'a, T, N, A, I>(
    grammar: &'a Grammar<T, N, A>,
    items: &ItemSet<I>,
    sym: &Symbol<T, N>,
) -> ItemSet<I>
where
    T: Ord + 'a,
    N: Ord + 'a,
    I: LrItem<'a, T>,
{
    ItemSet {
        items: items
            .items
            .iter()
            .filter(|i| grammar.productions()[i.production()].rhs().get(i.dot()) == Some(sym))
            .map(|i| i.advance())
            .collect(),
    }
}

struct Collection<'a, T: 'a, N: 'a, I> {
    states: Vec<State<'a, T, N, I>>,
    item_sets: BTreeMap<ItemSet<I>, usize>,
    kernels: BTreeMap<ItemSet<I>, usize>,
}

impl<'a, T: Ord, N: Ord, I: Ord + Clone> Collection<'a, T, N, I> {
    fn item_set(&mut self, item_set: ItemSet<I>) -> usize {
        if let Some(&ix) = self.item_sets.get(&item_set) {
            return ix;
        }
        let ix = self.states.len();
        self.item_sets.insert(item_set.clone(), ix);
        self.states.push((item_set, BTreeMap::new()));
        ix
    }

    fn complete_kernel<C>(&mut self, kernel: ItemSet<I>, closure: &mut C) -> usize
    where
        C: FnMut(&ItemSet<I>) -> ItemSet<I>,
    {
        if let Some(&ix) = self.kernels.get(&kernel) {
            return ix;
        }
        let ix = self.item_set(closure(&kernel));
        self.kernels.insert(kernel, ix);
        ix
    }
}

/// Build the canonical collection reachable from `kernel`, closing every kernel with
/// `closure`. States are discovered breadth first and numbered in discovery order, so state 0
/// is the closure of `kernel`.
pub fn build<'a, T, N, A, I, C>(
    grammar: &'a Grammar<T, N, A>,
    kernel: ItemSet<I>,
    mut closure: C,
) -> StateMachine<'a, T, N, I>
where
    T: Ord + 'a,
    N: Ord + 'a,
    I: LrItem<'a, T>,
    C: FnMut(&ItemSet<I>) -> ItemSet<I>,
{
    let mut c = Collection {
        states: vec![],
        item_sets: BTreeMap::new(),
        kernels: BTreeMap::new(),
    };
    if kernel.is_empty() {
        return StateMachine { states: c.states };
    }
    c.complete_kernel(kernel, &mut closure);
    let mut finished = 0;
    while finished < c.states.len() {
        let mut next_kernels: BTreeMap<&'a Symbol<T, N>, BTreeSet<I>> = BTreeMap::new();
        for item in c.states[finished].0.items.iter() {
            let rhs = grammar.productions()[item.production()].rhs();
            if let Some(sym) = rhs.get(item.dot()) {
                next_kernels.entry(sym).or_default().insert(item.advance());
            }
        }
        for (sym, items) in next_kernels.into_iter() {
            let ix = c.complete_kernel(ItemSet { items }, &mut closure);
            c.states[finished].1.insert(sym, ix);
        }
        finished += 1;
    }
    StateMachine { states: c.states }
}

impl<'a, T: Debug, N: Debug, I: LrItem<'a, T>> StateMachine<'a, T, N, I> {
    /// Write the state machine in graphviz format.
    pub fn write_dot<A, W: Write>(&self, grammar: &Grammar<T, N, A>, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            r#"digraph G {{
    node [
        shape="box",
        style="rounded",
        penwidth=1,
        width=2.0
    ];"#
        )?;
        for (i, (iset, trans)) in self.states.iter().enumerate() {
            write!(out, "    s{}[label=<", i)?;
            for item in iset.items.iter() {
                let p = &grammar.productions()[item.production()];
                write!(out, "{:?} →", p.lhs())?;
                for sym in p.rhs()[..item.dot()].iter() {
                    write!(out, " {:?}", sym)?;
                }
                write!(out, " •")?;
                for sym in p.rhs()[item.dot()..].iter() {
                    write!(out, " {:?}", sym)?;
                }
                match item.lookahead() {
                    Some(Some(t)) => write!(out, ", {:?}", t)?,
                    Some(None) => write!(out, ", $")?,
                    None => {}
                }
                write!(out, "<br />")?;
            }
            writeln!(out, ">]")?;
            for (sym, &target) in trans.iter() {
                writeln!(out, "    s{} -> s{} [label=<{:?}>]", i, target, sym)?;
            }
        }
        writeln!(out, "}}")
    }
}
