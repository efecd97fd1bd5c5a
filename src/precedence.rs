//! Operator precedence and associativity declarations.
//!
//! Groups are declared lowest first: the first group gets level 0, the next level 1, and so
//! on. A terminal belongs to at most one group; a second declaration is reported by
//! [`Grammar::validate`](../struct.Grammar.html#method.validate).

use serde::{Deserialize, Serialize};

/// Associativity of a precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Assoc {
    /// `a op b op c` groups as `(a op b) op c`.
    Left,
    /// `a op b op c` groups as `a op (b op c)`.
    Right,
    /// `a op b op c` is a syntax error.
    NonAssoc,
}

/// The precedence of a terminal or a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precedence {
    /// Index of the declaring group; higher binds tighter.
    pub level: usize,
    /// Associativity of the declaring group.
    pub assoc: Assoc,
}

/// The ordered list of precedence groups declared for a grammar.
#[derive(Debug, Clone)]
pub struct PrecedenceTable<T> {
    groups: Vec<(Assoc, Vec<T>)>,
}

impl<T> Default for PrecedenceTable<T> {
    fn default() -> Self {
        PrecedenceTable { groups: Vec::new() }
    }
}

impl<T: PartialEq> PrecedenceTable<T> {
    /// Append a group one level above every group declared so far.
    pub fn declare(&mut self, assoc: Assoc, terminals: impl IntoIterator<Item = T>) {
        self.groups.push((assoc, terminals.into_iter().collect()));
    }

    /// The declared groups, lowest precedence first.
    pub fn groups(&self) -> &[(Assoc, Vec<T>)] {
        &self.groups
    }

    /// Look up the precedence of `terminal`, or `None` if it was never declared.
    pub fn lookup(&self, terminal: &T) -> Option<Precedence> {
        self.groups
            .iter()
            .enumerate()
            .find(|(_, (_, members))| members.contains(terminal))
            .map(|(level, &(assoc, _))| Precedence { level, assoc })
    }

    /// The first terminal declared more than once, if any.
    pub fn duplicate(&self) -> Option<&T> {
        let mut seen: Vec<&T> = Vec::new();
        for (_, members) in self.groups.iter() {
            for t in members.iter() {
                if seen.contains(&t) {
                    return Some(t);
                }
                seen.push(t);
            }
        }
        None
    }
}
