//! "Accepted-by" compatibility.
//!
//! Answers whether a value of one type may flow into a slot declared with
//! another. Used when a declared return type competes with the inferred one
//! and when extensions check their receivers. Deliberately loose: PHP
//! coercions (`int` into `float`) are accepted, unresolved parts are not.

use crate::intern::TypeInterner;
use crate::types::*;
use crate::utils::{is_iterable_name, iterable_key_value};
use pinfer_common::Atom;

/// Class relationships needed to compare object types.
pub trait ClassHierarchy {
    /// Whether `class` is `ancestor` or extends/implements it.
    fn is_subclass_of(&self, class: Atom, ancestor: Atom) -> bool;
}

/// Hierarchy that only knows a class is itself.
pub struct FlatHierarchy;

impl ClassHierarchy for FlatHierarchy {
    fn is_subclass_of(&self, class: Atom, ancestor: Atom) -> bool {
        class == ancestor
    }
}

pub struct CompatChecker<'a> {
    interner: &'a TypeInterner,
    hierarchy: &'a dyn ClassHierarchy,
    depth: u32,
}

const MAX_COMPAT_DEPTH: u32 = 32;

impl<'a> CompatChecker<'a> {
    pub fn new(interner: &'a TypeInterner, hierarchy: &'a dyn ClassHierarchy) -> Self {
        CompatChecker {
            interner,
            hierarchy,
            depth: 0,
        }
    }

    /// Whether `source` is accepted by a slot of type `target`.
    pub fn is_accepted_by(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target || target == TypeId::MIXED {
            return true;
        }
        if source == TypeId::NEVER {
            return true;
        }
        if source == TypeId::UNKNOWN || target == TypeId::UNKNOWN {
            return false;
        }
        if self.depth >= MAX_COMPAT_DEPTH {
            return false;
        }
        self.depth += 1;
        let accepted = self.check(source, target);
        self.depth -= 1;
        accepted
    }

    fn check(&mut self, source: TypeId, target: TypeId) -> bool {
        let interner = self.interner;
        let Some(source_data) = interner.lookup(source) else {
            return false;
        };

        if let TypeData::Union(list) = source_data {
            return interner
                .type_list(list)
                .iter()
                .all(|member| self.is_accepted_by(*member, target));
        }

        let Some(target_data) = interner.lookup(target) else {
            return false;
        };

        if let TypeData::Union(list) = target_data {
            return interner
                .type_list(list)
                .iter()
                .any(|member| self.is_accepted_by(source, *member));
        }

        match (source_data, target_data) {
            (TypeData::Literal(literal), _) => {
                let primitive = literal.primitive();
                primitive == target || (primitive == TypeId::INT && target == TypeId::FLOAT)
            }
            (TypeData::Intrinsic(IntrinsicKind::Int), TypeData::Intrinsic(IntrinsicKind::Float)) => {
                true
            }
            (TypeData::Intrinsic(IntrinsicKind::Void), TypeData::Intrinsic(IntrinsicKind::Null))
            | (TypeData::Intrinsic(IntrinsicKind::Null), TypeData::Intrinsic(IntrinsicKind::Void)) => {
                true
            }
            (TypeData::Object(class), TypeData::Object(target_class)) => {
                self.class_accepted(class, target_class)
            }
            (TypeData::Generic(id), TypeData::Object(target_class)) => {
                let class = interner.generic_type(id).name;
                self.class_accepted(class, target_class)
            }
            (TypeData::Object(class), TypeData::Generic(id)) => {
                let generic = interner.generic_type(id);
                self.class_accepted(class, generic.name)
            }
            (TypeData::Generic(source_id), TypeData::Generic(target_id)) => {
                let source_generic = interner.generic_type(source_id);
                let target_generic = interner.generic_type(target_id);
                if !self.class_accepted(source_generic.name, target_generic.name) {
                    return false;
                }
                if source_generic.name != target_generic.name {
                    return true;
                }
                source_generic
                    .args
                    .iter()
                    .zip(target_generic.args.iter())
                    .all(|(s, t)| self.is_accepted_by(*s, *t))
            }
            (TypeData::Function(_), TypeData::Object(target_class)) => {
                let name = interner.resolve_atom_ref(target_class);
                name.eq_ignore_ascii_case("Closure") || name.eq_ignore_ascii_case("callable")
            }
            (TypeData::Function(source_id), TypeData::Function(target_id)) => {
                let source_shape = interner.function_shape(source_id);
                let target_shape = interner.function_shape(target_id);
                self.is_accepted_by(source_shape.return_type, target_shape.return_type)
            }
            (
                TypeData::Array { .. } | TypeData::KeyedArray(_),
                TypeData::Array { .. } | TypeData::Generic(_),
            ) => self.iterable_accepted(source, target),
            (TypeData::KeyedArray(source_id), TypeData::KeyedArray(target_id)) => {
                let source_shape = interner.keyed_array_shape(source_id);
                let target_shape = interner.keyed_array_shape(target_id);
                target_shape.items.iter().enumerate().all(|(index, item)| {
                    let matching = match item.key {
                        Some(key) => source_shape.item(&key),
                        None => source_shape.items.get(index),
                    };
                    match matching {
                        Some(source_item) => self.is_accepted_by(source_item.value, item.value),
                        None => item.optional,
                    }
                })
            }
            (TypeData::This, TypeData::Object(_) | TypeData::Generic(_)) => true,
            _ => false,
        }
    }

    fn iterable_accepted(&mut self, source: TypeId, target: TypeId) -> bool {
        let interner = self.interner;
        if let Some(TypeData::Generic(id)) = interner.lookup(target)
            && !is_iterable_name(&interner.resolve_atom_ref(interner.generic_type(id).name))
        {
            return false;
        }
        let (Some((source_key, source_value)), Some((target_key, target_value))) = (
            iterable_key_value(interner, source),
            iterable_key_value(interner, target),
        ) else {
            return false;
        };
        // An empty array literal fits any array slot.
        if source_value == TypeId::NEVER {
            return true;
        }
        let key_ok = target_key == TypeId::MIXED
            || interner.are_types_same(target_key, interner.union2(TypeId::INT, TypeId::STRING))
            || self.is_accepted_by(source_key, target_key);
        key_ok && self.is_accepted_by(source_value, target_value)
    }

    fn class_accepted(&self, class: Atom, target: Atom) -> bool {
        if class == target {
            return true;
        }
        let target_name = self.interner.resolve_atom_ref(target);
        if target_name.eq_ignore_ascii_case("object") {
            return true;
        }
        self.hierarchy.is_subclass_of(class, target)
    }
}

/// Convenience wrapper around [`CompatChecker::is_accepted_by`].
pub fn is_accepted_by(
    interner: &TypeInterner,
    hierarchy: &dyn ClassHierarchy,
    source: TypeId,
    target: TypeId,
) -> bool {
    CompatChecker::new(interner, hierarchy).is_accepted_by(source, target)
}

#[cfg(test)]
#[path = "../tests/compat_tests.rs"]
mod compat_tests;
