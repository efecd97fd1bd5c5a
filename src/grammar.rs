//! The grammar model: symbols, productions, nonterminals, and the builder used to author them.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::{self, Debug, Display};

use crate::error::GrammarError;
use crate::precedence::{Assoc, Precedence, PrecedenceTable};
use Symbol::*;

// "T" = terminal, "N" = nonterminal, "A" = whatever is attached to a production.

/// A symbol in a context-free grammar.
#[derive(Ord, PartialOrd, Eq, PartialEq, Clone, Hash)]
pub enum Symbol<T, N> {
    /// A terminal symbol.
    Terminal(T),
    /// A nonterminal symbol.
    Nonterminal(N),
}

impl<T, N> Symbol<T, N> {
    /// The terminal, if this is one.
    pub fn terminal(&self) -> Option<&T> {
        match *self {
            Terminal(ref t) => Some(t),
            Nonterminal(_) => None,
        }
    }

    /// The nonterminal, if this is one.
    pub fn nonterminal(&self) -> Option<&N> {
        match *self {
            Terminal(_) => None,
            Nonterminal(ref n) => Some(n),
        }
    }
}

impl<T: Display, N: Display> Display for Symbol<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Terminal(ref t) => t.fmt(f),
            Nonterminal(ref n) => n.fmt(f),
        }
    }
}

impl<T: Debug, N: Debug> Debug for Symbol<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Terminal(ref t) => t.fmt(f),
            Nonterminal(ref n) => n.fmt(f),
        }
    }
}

/// A boxed reduction action: combines the values of a production's right-hand side.
pub type Reduction<V> = Box<dyn Fn(Vec<V>) -> V>;

/// One alternative `lhs -> rhs` of a nonterminal.
pub struct Production<T, N, A> {
    lhs: N,
    rhs: Vec<Symbol<T, N>>,
    prec: Option<T>,
    act: A,
    generation: usize,
}

impl<T, N, A> Production<T, N, A> {
    /// The nonterminal this production belongs to.
    pub fn lhs(&self) -> &N {
        &self.lhs
    }

    /// The right-hand side. Empty for an ε-production.
    pub fn rhs(&self) -> &[Symbol<T, N>] {
        &self.rhs
    }

    /// The explicit precedence tag, if one was given.
    pub fn prec(&self) -> Option<&T> {
        self.prec.as_ref()
    }

    /// The action attached to this production.
    pub fn action(&self) -> &A {
        &self.act
    }

    /// Declaration order across the whole grammar. Also the production's index in
    /// [`Grammar::productions`].
    pub fn generation(&self) -> usize {
        self.generation
    }
}

impl<T: Debug, N: Debug, A> Debug for Production<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{:?} →", self.lhs)?;
        for sym in self.rhs.iter() {
            write!(f, " {:?}", sym)?;
        }
        if let Some(ref p) = self.prec {
            write!(f, " %prec {:?}", p)?;
        }
        Ok(())
    }
}

/// A nonterminal and the generations of its productions, in declaration order.
#[derive(Debug, Clone)]
pub struct NonTerminal<N> {
    name: N,
    productions: Vec<usize>,
}

impl<N> NonTerminal<N> {
    /// The nonterminal's name.
    pub fn name(&self) -> &N {
        &self.name
    }

    /// The generations of this nonterminal's productions.
    pub fn productions(&self) -> &[usize] {
        &self.productions
    }
}

/// A context-free grammar with optional precedence declarations.
///
/// Nonterminals are kept in the order they were first mentioned; productions are kept in the
/// order they were added, which is also their generation.
pub struct Grammar<T, N, A> {
    nonterminals: Vec<NonTerminal<N>>,
    index: BTreeMap<N, usize>,
    productions: Vec<Production<T, N, A>>,
    precedence: PrecedenceTable<T>,
}

impl<T: Debug, N: Debug, A> Debug for Grammar<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("Grammar")
            .field("productions", &self.productions)
            .field("precedence", &self.precedence)
            .finish()
    }
}

impl<T: Ord + Clone, N: Ord + Clone, A> Default for Grammar<T, N, A> {
    fn default() -> Self {
        Grammar::new()
    }
}

/// A handle for adding alternatives to one nonterminal.
pub struct Rule<'g, T, N, A> {
    grammar: &'g mut Grammar<T, N, A>,
    lhs: N,
}

impl<'g, T: Ord + Clone, N: Ord + Clone, A> Rule<'g, T, N, A> {
    /// Add the alternative `lhs -> rhs`.
    pub fn alt(self, rhs: Vec<Symbol<T, N>>, act: A) -> Self {
        self.grammar.add_production(self.lhs.clone(), rhs, None, act);
        self
    }

    /// Add the alternative `lhs -> rhs`, taking its precedence from the terminal `prec`.
    pub fn alt_prec(self, rhs: Vec<Symbol<T, N>>, prec: T, act: A) -> Self {
        self.grammar.add_production(self.lhs.clone(), rhs, Some(prec), act);
        self
    }

    /// The generation the next alternative will receive.
    pub fn next_generation(&self) -> usize {
        self.grammar.productions.len()
    }
}

impl<T: Ord + Clone, N: Ord + Clone, A> Grammar<T, N, A> {
    /// Create an empty grammar.
    pub fn new() -> Self {
        Grammar {
            nonterminals: Vec::new(),
            index: BTreeMap::new(),
            productions: Vec::new(),
            precedence: PrecedenceTable::default(),
        }
    }

    /// Look up a nonterminal, registering it if it is new. Returns its index in
    /// [`nonterminals`](#method.nonterminals).
    pub fn get_or_create(&mut self, name: N) -> usize {
        if let Some(&ix) = self.index.get(&name) {
            return ix;
        }
        let ix = self.nonterminals.len();
        self.index.insert(name.clone(), ix);
        self.nonterminals.push(NonTerminal {
            name,
            productions: Vec::new(),
        });
        ix
    }

    /// Get a builder handle for the nonterminal `name`.
    pub fn rule(&mut self, name: N) -> Rule<'_, T, N, A> {
        self.get_or_create(name.clone());
        Rule {
            grammar: self,
            lhs: name,
        }
    }

    /// Append a production and return its generation.
    pub fn add_production(
        &mut self,
        lhs: N,
        rhs: Vec<Symbol<T, N>>,
        prec: Option<T>,
        act: A,
    ) -> usize {
        let generation = self.productions.len();
        let owner = self.get_or_create(lhs.clone());
        for sym in rhs.iter() {
            if let Nonterminal(ref n) = *sym {
                self.get_or_create(n.clone());
            }
        }
        self.nonterminals[owner].productions.push(generation);
        self.productions.push(Production {
            lhs,
            rhs,
            prec,
            act,
            generation,
        });
        generation
    }

    /// Declare a left-associative group, binding tighter than every earlier group.
    pub fn left(&mut self, terminals: impl IntoIterator<Item = T>) -> &mut Self {
        self.precedence.declare(Assoc::Left, terminals);
        self
    }

    /// Declare a right-associative group, binding tighter than every earlier group.
    pub fn right(&mut self, terminals: impl IntoIterator<Item = T>) -> &mut Self {
        self.precedence.declare(Assoc::Right, terminals);
        self
    }

    /// Declare a non-associative group, binding tighter than every earlier group.
    pub fn nonassoc(&mut self, terminals: impl IntoIterator<Item = T>) -> &mut Self {
        self.precedence.declare(Assoc::NonAssoc, terminals);
        self
    }
}

impl<T, N, A> Grammar<T, N, A> {
    /// The precedence declarations.
    pub fn precedence_table(&self) -> &PrecedenceTable<T> {
        &self.precedence
    }

    /// All nonterminals, in the order they were first mentioned.
    pub fn nonterminals(&self) -> &[NonTerminal<N>] {
        &self.nonterminals
    }

    /// All productions, indexed by generation.
    pub fn productions(&self) -> &[Production<T, N, A>] {
        &self.productions
    }
}

impl<T: Ord, N: Ord, A> Grammar<T, N, A> {
    /// Look up a nonterminal by name.
    pub fn nonterminal(&self, name: &N) -> Option<&NonTerminal<N>> {
        self.index.get(name).map(|&ix| &self.nonterminals[ix])
    }

    /// The generations of the productions of `name`; empty if `name` is unknown.
    pub fn alternatives(&self, name: &N) -> &[usize] {
        self.nonterminal(name).map_or(&[][..], |nt| nt.productions())
    }

    /// Every terminal that appears on some right-hand side.
    pub fn terminals(&self) -> BTreeSet<&T> {
        self.productions
            .iter()
            .flat_map(|p| p.rhs.iter().filter_map(Symbol::terminal))
            .collect()
    }

    /// The nonterminals reachable from `start`, including `start` itself.
    pub fn reachable(&self, start: &N) -> BTreeSet<&N> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        if let Some(nt) = self.nonterminal(start) {
            seen.insert(nt.name());
            queue.push_back(nt);
        }
        while let Some(nt) = queue.pop_front() {
            for &p in nt.productions() {
                for n in self.productions[p].rhs.iter().filter_map(Symbol::nonterminal) {
                    if seen.insert(n) {
                        if let Some(next) = self.nonterminal(n) {
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
        seen
    }
}

impl<T: Ord + Clone, N: Ord + Clone, A> Grammar<T, N, A> {
    /// Check the grammar for use with `start` as its start symbol, returning the generation of
    /// the single start production.
    ///
    /// The start symbol must have exactly one production and must not appear on any
    /// right-hand side. Every nonterminal reachable from it must have a production, and no
    /// terminal may be declared in two precedence groups.
    pub fn validate(&self, start: &N) -> Result<usize, GrammarError<T, N>> {
        let start_nt = self
            .nonterminal(start)
            .ok_or_else(|| GrammarError::UnknownStart(start.clone()))?;
        let start_production = match start_nt.productions() {
            [] => return Err(GrammarError::NoStartProduction(start.clone())),
            [p] => *p,
            many => {
                return Err(GrammarError::MultipleStartProductions {
                    start: start.clone(),
                    count: many.len(),
                })
            }
        };
        let reachable = self.reachable(start);
        for nt in self.nonterminals.iter() {
            if nt.productions.is_empty() && reachable.contains(nt.name()) {
                return Err(GrammarError::EmptyNonterminal(nt.name.clone()));
            }
        }
        let referenced = self
            .productions
            .iter()
            .flat_map(|p| p.rhs.iter())
            .any(|sym| sym.nonterminal() == Some(start));
        if referenced {
            return Err(GrammarError::StartReferenced(start.clone()));
        }
        if let Some(t) = self.precedence.duplicate() {
            return Err(GrammarError::DuplicatePrecedence(t.clone()));
        }
        Ok(start_production)
    }

    /// The declared precedence of `terminal`.
    pub fn terminal_precedence(&self, terminal: &T) -> Result<Precedence, GrammarError<T, N>> {
        self.precedence
            .lookup(terminal)
            .ok_or_else(|| GrammarError::UndeclaredPrecedence(terminal.clone()))
    }

    /// The precedence of a production: that of its tag if it has one, otherwise that of the
    /// rightmost terminal on its right-hand side.
    pub fn rule_precedence(&self, production: usize) -> Result<Precedence, GrammarError<T, N>> {
        let p = &self.productions[production];
        let terminal = p
            .prec
            .as_ref()
            .or_else(|| p.rhs.iter().rev().find_map(Symbol::terminal))
            .ok_or_else(|| GrammarError::NoRulePrecedence {
                lhs: p.lhs.clone(),
                production,
            })?;
        self.terminal_precedence(terminal)
    }
}
