//! Re-entrancy and depth guards for lazy analysis.
//!
//! A method body may ask for the return type of a method that is still being
//! resolved, directly or through a chain of calls. [`RecursionGuard`] keeps
//! the set of keys currently open so such a request is answered with
//! [`RecursionResult::Cycle`] and the caller falls back to `unknown`.
//! [`DepthCounter`] bounds walks where revisiting a node is legitimate, such
//! as nested closures.

use pinfer_common::limits::{DEFAULT_RESOLUTION_DEPTH, MAX_EXPR_DEPTH, MAX_RESOLUTION_ITERATIONS};
use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Limit presets for the guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Definitions resolving each other's return types.
    Definitions,
    /// Nested expressions and closures inside one body.
    Expressions,
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::Definitions => DEFAULT_RESOLUTION_DEPTH,
            Self::Expressions => MAX_EXPR_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::Definitions | Self::Expressions => MAX_RESOLUTION_ITERATIONS,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }

    /// Same iteration budget with a configured depth.
    pub const fn with_depth(self, max_depth: u32) -> Self {
        Self::Custom {
            max_depth,
            max_iterations: self.max_iterations(),
        }
    }
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already open further up the stack.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        self == Self::Entered
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        self == Self::Cycle
    }

    /// A limit was hit rather than a cycle found.
    #[inline]
    pub fn is_limit(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

/// Set of keys currently open, with depth and total-entry limits.
///
/// Each `Entered` result must be matched by one [`leave`](Self::leave).
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    open: FxHashSet<K>,
    entries: u32,
    profile: RecursionProfile,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn with_profile(profile: RecursionProfile) -> Self {
        RecursionGuard {
            open: FxHashSet::default(),
            entries: 0,
            profile,
        }
    }

    pub fn enter(&mut self, key: K) -> RecursionResult {
        if self.open.contains(&key) {
            return RecursionResult::Cycle;
        }
        if self.open.len() as u32 >= self.profile.max_depth() {
            return RecursionResult::DepthExceeded;
        }
        if self.entries >= self.profile.max_iterations() {
            return RecursionResult::IterationExceeded;
        }
        self.entries += 1;
        self.open.insert(key);
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let removed = self.open.remove(&key);
        debug_assert!(removed, "left a key that was never entered");
    }

    #[inline]
    pub fn is_open(&self, key: &K) -> bool {
        self.open.contains(key)
    }

    /// Number of keys currently open.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.open.len() as u32
    }

    /// Successful entries since creation.
    #[inline]
    pub fn entries(&self) -> u32 {
        self.entries
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            assert!(self.open.is_empty(), "{} keys still open", self.open.len());
        }
    }
}

/// Plain depth limit without key tracking.
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        DepthCounter { depth: 0, max_depth }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// False at the limit; do not call `leave` then.
    pub fn enter(&mut self) -> bool {
        if self.depth == self.max_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0);
        self.depth -= 1;
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod recursion_tests;
