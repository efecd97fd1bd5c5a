//! Hooks for steering table construction.
//!
//! Every method has a default, so a custom configuration only overrides what it needs.
//! [`DefaultConfig`] overrides nothing.

use std::marker::PhantomData;

use crate::grammar::Production;
use crate::table::Conflict;

/// Decisions the table builder defers to the caller.
pub trait Config<T, N, A> {
    /// `shift_on_undeclared_precedence` decides what happens when a shift/reduce conflict
    /// involves a terminal or rule without declared precedence.
    ///
    /// If this method returns true, the shift is kept, as Yacc does, and the conflict is
    /// recorded in [`ParseTable::conflicts`](../struct.ParseTable.html#structfield.conflicts).
    /// This is the default.
    /// See, https://www.gnu.org/savannah-checkouts/gnu/bison/manual/html_node/Shift_002fReduce.html
    /// for more information.
    ///
    /// If this method returns false, the failed precedence lookup aborts table generation.
    fn shift_on_undeclared_precedence(&self) -> bool {
        true
    }

    /// `on_defaulted_conflict` is called for each conflict settled by shifting because
    /// precedence was missing.
    fn on_defaulted_conflict(&self, _conflict: &Conflict<T>) {}

    /// `reduce_on` is a predicate, allowing you to control certain reduce rules based on the
    /// lookahead token. This function takes two parameters: the rule, and the lookahead token
    /// (or `None` for EOF). You can use this to resolve shift-reduce conflicts. For example, you
    /// can solve the "dangling else" problem by forbidding the reduce action on an `else` token.
    fn reduce_on(&self, _production: &Production<T, N, A>, _lookahead: Option<&T>) -> bool {
        true
    }
}

/// A configuration that keeps every default.
pub struct DefaultConfig<T, N, A> {
    _marker: PhantomData<(T, N, A)>,
}

impl<T, N, A> DefaultConfig<T, N, A> {
    /// Create the default configuration.
    pub fn new() -> Self {
        DefaultConfig {
            _marker: PhantomData,
        }
    }
}

impl<T, N, A> Default for DefaultConfig<T, N, A> {
    fn default() -> Self {
        DefaultConfig::new()
    }
}

impl<T, N, A> Config<T, N, A> for DefaultConfig<T, N, A> {}
