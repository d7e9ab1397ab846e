//! Template substitution.
//!
//! Substitution never mutates: it walks the type and interns a new one, so a
//! generic instantiated for one call site cannot leak its arguments into the
//! declaration or into another call site.

use crate::intern::TypeInterner;
use crate::types::*;
use crate::visitor::map_children;
use pinfer_common::limits::MAX_INSTANTIATION_DEPTH;
use rustc_hash::FxHashMap;

/// Mapping from template types to their replacements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair templates with arguments positionally.
    ///
    /// Missing arguments fall back to the template default, then `unknown`.
    pub fn from_args(interner: &TypeInterner, templates: &[TypeId], args: &[TypeId]) -> Self {
        let mut subst = Self::new();
        for (index, template) in templates.iter().enumerate() {
            let value = match args.get(index) {
                Some(arg) => *arg,
                None => interner
                    .template_of(*template)
                    .and_then(|info| info.default)
                    .unwrap_or(TypeId::UNKNOWN),
            };
            subst.insert(*template, value);
        }
        subst
    }

    pub fn insert(&mut self, template: TypeId, value: TypeId) {
        self.map.insert(template, value);
    }

    pub fn get(&self, template: TypeId) -> Option<TypeId> {
        self.map.get(&template).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Add every mapping of `other`; existing entries win.
    pub fn extend_missing(&mut self, other: &TypeSubstitution) {
        for (template, value) in &other.map {
            self.map.entry(*template).or_insert(*value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, TypeId)> + '_ {
        self.map.iter().map(|(template, value)| (*template, *value))
    }
}

/// Walks a type replacing templates (and optionally `$this`).
pub struct TypeInstantiator<'a> {
    interner: &'a TypeInterner,
    substitution: &'a TypeSubstitution,
    this_type: Option<TypeId>,
    depth: u32,
}

impl<'a> TypeInstantiator<'a> {
    pub fn new(interner: &'a TypeInterner, substitution: &'a TypeSubstitution) -> Self {
        TypeInstantiator {
            interner,
            substitution,
            this_type: None,
            depth: 0,
        }
    }

    pub fn with_this(mut self, this_type: TypeId) -> Self {
        self.this_type = Some(this_type);
        self
    }

    pub fn instantiate(&mut self, ty: TypeId) -> TypeId {
        if ty == TypeId::THIS {
            return self.this_type.unwrap_or(ty);
        }
        if ty.is_intrinsic() {
            return ty;
        }
        if let Some(replacement) = self.substitution.get(ty) {
            return replacement;
        }
        if self.depth >= MAX_INSTANTIATION_DEPTH {
            return ty;
        }
        self.depth += 1;
        let interner = self.interner;
        let result = map_children(interner, ty, &mut |child| self.instantiate(child));
        self.depth -= 1;
        result
    }
}

/// Apply a substitution to a type.
pub fn instantiate_type(
    interner: &TypeInterner,
    ty: TypeId,
    substitution: &TypeSubstitution,
) -> TypeId {
    if substitution.is_empty() {
        return ty;
    }
    TypeInstantiator::new(interner, substitution).instantiate(ty)
}

/// Replace `$this` with a concrete receiver type.
pub fn substitute_this_type(interner: &TypeInterner, ty: TypeId, this_type: TypeId) -> TypeId {
    let empty = TypeSubstitution::new();
    TypeInstantiator::new(interner, &empty)
        .with_this(this_type)
        .instantiate(ty)
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod instantiate_tests;
