//! Literal widening.
//!
//! Widening forgets exact values: `int(42)` becomes `int`, and because the
//! rebuilt union deduplicates, `boolean(true)|boolean(false)` becomes
//! `boolean`. The operation is idempotent.

use crate::intern::TypeInterner;
use crate::types::*;
use crate::visitor::map_children;

/// Widen a literal to its primitive; non-literals are returned unchanged.
pub fn widen_literal(interner: &TypeInterner, ty: TypeId) -> TypeId {
    match interner.lookup(ty) {
        Some(TypeData::Literal(literal)) => literal.primitive(),
        _ => ty,
    }
}

/// Widen every literal reachable through unions, arrays and generic arguments.
///
/// Function signatures, templates and pending references are left alone:
/// their literals describe a contract, not a value.
pub fn widen_type(interner: &TypeInterner, ty: TypeId) -> TypeId {
    match interner.lookup(ty) {
        Some(TypeData::Literal(literal)) => literal.primitive(),
        Some(
            TypeData::Union(_)
            | TypeData::Array { .. }
            | TypeData::KeyedArray(_)
            | TypeData::Generic(_),
        ) => map_children(interner, ty, &mut |child| widen_type(interner, child)),
        _ => ty,
    }
}

#[cfg(test)]
#[path = "../tests/widening_tests.rs"]
mod widening_tests;
