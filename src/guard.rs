//! Detection of circular references along the active walk path.

use crate::value::Identity;
use std::collections::HashSet;

/// Outcome of entering a composite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// The value was not on the path and has been pushed; pair with
    /// [`CycleGuard::exit`].
    First,
    /// The value is an ancestor of itself on the current path.
    Cycle,
    /// The guard is disabled and tracks nothing.
    Untracked,
}

/// Identities of the composites currently being visited.
///
/// A guard lives for exactly one top-level key generation and is threaded
/// through the walk by `&mut`, so concurrent calls never see each other's
/// state. Membership is path-scoped: a value reached again through a sibling
/// branch is walked again, only a value that is its own ancestor is cut.
#[derive(Debug, Default)]
pub struct CycleGuard {
    path: HashSet<Identity>,
    enabled: bool,
}

impl CycleGuard {
    /// Creates an empty, enabled guard.
    pub fn new() -> Self {
        Self {
            path: HashSet::new(),
            enabled: true,
        }
    }

    /// Creates a guard that never reports cycles.
    ///
    /// Walking a cyclic graph with it recurses until the stack is exhausted.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Pushes `id` onto the path unless it is already there.
    pub fn enter(&mut self, id: Identity) -> Visit {
        if !self.enabled {
            Visit::Untracked
        } else if self.path.insert(id) {
            Visit::First
        } else {
            Visit::Cycle
        }
    }

    /// Pops `id` after its children have been walked.
    pub fn exit(&mut self, id: Identity) {
        self.path.remove(&id);
    }

    /// Returns true if `id` is on the current path.
    pub fn contains(&self, id: Identity) -> bool {
        self.path.contains(&id)
    }

    /// Number of composites on the current path.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Returns true if the guard reports cycles.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
