//! Transition guard.
//!
//! The set of fence ids with a roll transition in flight. While an id is in
//! the set, the property pipeline drops every write to that fence except
//! `IsRolled` and `UnrolledHeight`. Membership is advisory; it does not
//! block anything on its own.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct TransitionGuard {
    active: HashSet<String>,
}

impl TransitionGuard {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Marks `id` as transitioning. Returns `false` if it already was.
    pub fn begin(&mut self, id: &str) -> bool { self.active.insert(id.to_string()) }

    /// Releases `id`. Returns `false` if it was not active.
    pub fn end(&mut self, id: &str) -> bool { self.active.remove(id) }

    #[must_use]
    pub fn is_active(&self, id: &str) -> bool { self.active.contains(id) }

    /// Releases every id, returning the ones that were active.
    pub fn clear_all(&mut self) -> Vec<String> {
        let mut cleared: Vec<String> = self.active.drain().collect();
        cleared.sort();
        cleared
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.active.is_empty() }

    #[must_use]
    pub fn len(&self) -> usize { self.active.len() }
}
