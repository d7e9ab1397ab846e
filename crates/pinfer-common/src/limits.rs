//! Centralized limits for the inference engine.
//!
//! Cycle handling for definitions goes through the resolver's recursion guard;
//! these constants bound the purely structural walks over interned types.

/// Maximum nesting depth when substituting templates into a type.
///
/// Interned types are acyclic, so this only trips on pathological inputs such
/// as a generic wrapped thousands of times. The instantiator returns the type
/// unchanged past this depth.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum depth of the structural template solver.
pub const MAX_SOLVER_DEPTH: u32 = 40;

/// Maximum depth when rendering a type to its canonical string.
/// Deeper levels render as `...`.
pub const MAX_FORMAT_DEPTH: u32 = 32;

/// Default depth of the definition resolution guard.
///
/// Every nested definition resolution (method A's return needs method B's
/// return, which needs C's ...) adds one level.
pub const DEFAULT_RESOLUTION_DEPTH: u32 = 64;

/// Upper bound on definition resolutions performed by one guard.
pub const MAX_RESOLUTION_ITERATIONS: u32 = 200_000;

/// Maximum depth for visiting nested expressions and closures.
pub const MAX_EXPR_DEPTH: u32 = 256;
