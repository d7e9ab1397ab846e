//! Structural type model for PHP inference.
//!
//! - **Interning**: every `TypeData` gets a `TypeId`; equality is id equality
//! - **Immutability**: substitution builds new ids, never edits existing ones
//! - **Template solving**: structural matching of declared against actual types
//!
//! Nothing here knows about classes beyond their names; class lookups go
//! through the [`compat::ClassHierarchy`] seam.

pub mod compat;
mod format;
mod infer;
mod instantiate;
mod intern;
pub mod recursion;
pub mod types;
pub mod utils;
pub mod visitor;
pub mod widening;

pub use compat::{ClassHierarchy, FlatHierarchy, is_accepted_by};
pub use format::TypeFormatter;
pub use infer::{TemplateSolver, infer_templates, match_arguments};
pub use instantiate::{TypeInstantiator, TypeSubstitution, instantiate_type, substitute_this_type};
pub use intern::TypeInterner;
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use types::*;
pub use utils::union_or_single;
pub use widening::{widen_literal, widen_type};
