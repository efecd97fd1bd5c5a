//! FIRST and FOLLOW sets.
//!
//! Both are computed by fixed-point iteration over every production of the grammar until a
//! full pass adds nothing. Sets only grow and are drawn from the finite terminal alphabet, so
//! the iteration terminates.

use std::collections::{BTreeMap, BTreeSet};

use crate::grammar::{Grammar, Symbol};
use crate::Symbol::*;

/// The FIRST set of a single symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct First<'a, T> {
    /// Terminals that can begin a derivation of the symbol.
    pub terminals: BTreeSet<&'a T>,
    /// Whether the symbol can derive ε.
    pub nullable: bool,
}

/// FIRST sets of every nonterminal of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets<'a, T, N> {
    sets: BTreeMap<&'a N, (BTreeSet<&'a T>, bool)>,
}

impl<'a, T: Ord, N: Ord> FirstSets<'a, T, N> {
    /// Compute the FIRST sets of `grammar`.
    pub fn new<A>(grammar: &'a Grammar<T, N, A>) -> Self {
        let mut sets: BTreeMap<&'a N, (BTreeSet<&'a T>, bool)> = grammar
            .nonterminals()
            .iter()
            .map(|nt| (nt.name(), (BTreeSet::new(), false)))
            .collect();
        loop {
            let mut changed = false;
            for p in grammar.productions() {
                let mut found = BTreeSet::new();
                let mut nullable = true;
                for sym in p.rhs().iter() {
                    match *sym {
                        Terminal(ref t) => {
                            found.insert(t);
                            nullable = false;
                        }
                        Nonterminal(ref n) => {
                            // refers to the owner; its own elements are already in the set
                            if n != p.lhs() {
                                if let Some((them, _)) = sets.get(n) {
                                    found.extend(them.iter().copied());
                                }
                            }
                            nullable = sets.get(n).is_some_and(|&(_, nullable)| nullable);
                        }
                    }
                    if !nullable {
                        // stop at the first symbol that cannot vanish
                        break;
                    }
                }
                if let Some(cell) = sets.get_mut(p.lhs()) {
                    for t in found {
                        changed |= cell.0.insert(t);
                    }
                    if nullable && !cell.1 {
                        cell.1 = true;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        FirstSets { sets }
    }

    /// The `(first set, nullable)` pair of a nonterminal.
    pub fn nonterminal(&self, n: &N) -> Option<&(BTreeSet<&'a T>, bool)> {
        self.sets.get(n)
    }

    /// All sets, keyed by nonterminal.
    pub fn sets(&self) -> &BTreeMap<&'a N, (BTreeSet<&'a T>, bool)> {
        &self.sets
    }

    /// FIRST of a single symbol. A terminal's FIRST set is the terminal itself.
    pub fn first(&self, sym: &'a Symbol<T, N>) -> First<'a, T> {
        match *sym {
            Terminal(ref t) => First {
                terminals: BTreeSet::from([t]),
                nullable: false,
            },
            Nonterminal(ref n) => match self.sets.get(n) {
                Some((terminals, nullable)) => First {
                    terminals: terminals.clone(),
                    nullable: *nullable,
                },
                None => First {
                    terminals: BTreeSet::new(),
                    nullable: false,
                },
            },
        }
    }

    /// FIRST of `syms` followed by `lookahead`, where `None` stands for end of input.
    ///
    /// `lookahead` is included only if the whole sequence can vanish.
    pub fn first_of_sequence(
        &self,
        syms: &'a [Symbol<T, N>],
        lookahead: Option<&'a T>,
    ) -> BTreeSet<Option<&'a T>> {
        let mut r = BTreeSet::new();
        for sym in syms.iter() {
            let First {
                terminals,
                nullable,
            } = self.first(sym);
            r.extend(terminals.into_iter().map(Some));
            if !nullable {
                return r;
            }
        }
        r.insert(lookahead);
        r
    }
}

/// FOLLOW sets of every nonterminal of a grammar, for one start symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets<'a, T, N> {
    sets: BTreeMap<&'a N, (BTreeSet<&'a T>, bool)>,
}

impl<'a, T: Ord, N: Ord> FollowSets<'a, T, N> {
    /// Compute the FOLLOW sets of `grammar` with `start` as the start symbol.
    /// Each entry maps a nonterminal to (follow set, whether the follow set contains EOF).
    pub fn new<A>(grammar: &'a Grammar<T, N, A>, first: &FirstSets<'a, T, N>, start: &N) -> Self {
        let mut r: BTreeMap<&'a N, (BTreeSet<&'a T>, bool)> = grammar
            .nonterminals()
            .iter()
            .map(|nt| (nt.name(), (BTreeSet::new(), nt.name() == start)))
            .collect();
        loop {
            let mut changed = false;
            for p in grammar.productions() {
                let mut follow = match r.get(p.lhs()) {
                    Some(f) => f.clone(),
                    None => continue,
                };
                for sym in p.rhs().iter().rev() {
                    match *sym {
                        Terminal(ref t) => {
                            follow.0.clear();
                            follow.1 = false;
                            follow.0.insert(t);
                        }
                        Nonterminal(ref n) => {
                            if let Some(s) = r.get_mut(n) {
                                for &t in follow.0.iter() {
                                    changed |= s.0.insert(t);
                                }
                                if !s.1 && follow.1 {
                                    s.1 = true;
                                    changed = true;
                                }
                            }
                            match first.nonterminal(n) {
                                Some(&(ref f, nullable)) => {
                                    if !nullable {
                                        follow.0.clear();
                                        follow.1 = false;
                                    }
                                    follow.0.extend(f.iter().copied());
                                }
                                None => {
                                    follow.0.clear();
                                    follow.1 = false;
                                }
                            }
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        FollowSets { sets: r }
    }

    /// The `(follow set, contains EOF)` pair of a nonterminal.
    pub fn follow(&self, n: &N) -> Option<&(BTreeSet<&'a T>, bool)> {
        self.sets.get(n)
    }

    /// All sets, keyed by nonterminal.
    pub fn sets(&self) -> &BTreeMap<&'a N, (BTreeSet<&'a T>, bool)> {
        &self.sets
    }

    /// FOLLOW of `n` as lookaheads, `None` standing for end of input.
    pub fn lookaheads(&self, n: &N) -> Vec<Option<&'a T>> {
        match self.sets.get(n) {
            Some((terminals, eof)) => terminals
                .iter()
                .map(|&t| Some(t))
                .chain(eof.then_some(None))
                .collect(),
            None => Vec::new(),
        }
    }
}
