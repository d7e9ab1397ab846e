//! Interned names.
//!
//! Class names, member names, template names and string literal values are
//! stored once in an [`AtomTable`] and handed around as [`Atom`]s, so type
//! keys stay `Copy` and name comparisons are integer comparisons.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Handle to a string in an [`AtomTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string; every table starts with it.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Pseudo types, magic methods and framework names seen in almost every
/// project. Seeding them keeps the low atoms stable between runs.
const PHP_NAMES: &[&str] = &[
    "self", "static", "parent", "this", "int", "float", "string", "bool", "array", "iterable",
    "callable", "object", "mixed", "void", "never", "null", "true", "false", "list",
    "__construct", "__invoke", "__call", "__callStatic", "__get", "__toString", "Closure",
    "Exception", "Throwable", "Traversable", "stdClass",
];

#[derive(Default)]
struct Entries {
    by_name: FxHashMap<Arc<str>, Atom>,
    names: Vec<Arc<str>>,
}

impl Entries {
    fn push(&mut self, name: &str) -> Atom {
        let atom = Atom(self.names.len() as u32);
        let shared: Arc<str> = Arc::from(name);
        self.names.push(Arc::clone(&shared));
        self.by_name.insert(shared, atom);
        atom
    }
}

/// Append-only string table behind a read-write lock.
///
/// Lookups of already known names only take the read lock. A poisoned lock
/// still holds consistent data (every write is a single push plus insert),
/// so it is recovered rather than propagated.
pub struct AtomTable {
    entries: RwLock<Entries>,
}

impl AtomTable {
    /// A table holding only the empty string.
    pub fn new() -> Self {
        let mut entries = Entries::default();
        entries.push("");
        AtomTable {
            entries: RwLock::new(entries),
        }
    }

    /// A table seeded with common PHP names.
    pub fn with_php_names() -> Self {
        let table = Self::new();
        for name in PHP_NAMES {
            table.intern(name);
        }
        table
    }

    pub fn intern(&self, name: &str) -> Atom {
        if let Some(&atom) = self.read().by_name.get(name) {
            return atom;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have won the race since the read.
        match entries.by_name.get(name) {
            Some(&atom) => atom,
            None => entries.push(name),
        }
    }

    /// The string behind `atom`, or the empty string for a foreign atom.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.get(atom).unwrap_or_else(|| Arc::from(""))
    }

    pub fn get(&self, atom: Atom) -> Option<Arc<str>> {
        self.read().names.get(atom.0 as usize).cloned()
    }

    /// Number of names, the empty string included.
    pub fn len(&self) -> usize {
        self.read().names.len()
    }

    /// True while only the empty string is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;
