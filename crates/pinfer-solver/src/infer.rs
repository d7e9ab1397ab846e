//! Recursive template solver.
//!
//! Walks a declared type and an actual type in lock-step; wherever the
//! declared side holds the template being solved, the structurally matching
//! part of the actual side is its solution.

use crate::instantiate::TypeSubstitution;
use crate::intern::TypeInterner;
use crate::types::*;
use crate::utils::{is_iterable_name, iterable_key_value, union_or_single};
use crate::visitor::for_each_child;
use pinfer_common::limits::MAX_SOLVER_DEPTH;
use tracing::trace;

pub struct TemplateSolver<'a> {
    interner: &'a TypeInterner,
    depth: u32,
}

impl<'a> TemplateSolver<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        TemplateSolver { interner, depth: 0 }
    }

    /// Solve `template` by matching `declared` against `actual`.
    pub fn solve(&mut self, declared: TypeId, actual: TypeId, template: TypeId) -> Option<TypeId> {
        if declared == template {
            return Some(actual);
        }
        if self.depth >= MAX_SOLVER_DEPTH || !self.mentions(declared, template) {
            return None;
        }
        self.depth += 1;
        let solution = self.solve_structural(declared, actual, template);
        self.depth -= 1;
        solution
    }

    fn solve_structural(
        &mut self,
        declared: TypeId,
        actual: TypeId,
        template: TypeId,
    ) -> Option<TypeId> {
        let interner = self.interner;
        let declared_data = interner.lookup(declared)?;

        if let TypeData::Union(list) = declared_data {
            return self.solve_union(&interner.type_list(list), actual, template);
        }

        // array<T> against int|string[]: solve each alternative and join.
        if let Some(TypeData::Union(list)) = interner.lookup(actual) {
            let solutions: Vec<TypeId> = interner
                .type_list(list)
                .iter()
                .filter_map(|member| self.solve(declared, *member, template))
                .collect();
            return (!solutions.is_empty()).then(|| union_or_single(interner, solutions));
        }

        let actual_data = interner.lookup(actual)?;
        match (declared_data, actual_data) {
            (TypeData::Generic(d), TypeData::Generic(a)) => {
                let declared_generic = interner.generic_type(d);
                let actual_generic = interner.generic_type(a);
                if declared_generic.name == actual_generic.name {
                    return self.solve_pairs(
                        declared_generic
                            .args
                            .iter()
                            .copied()
                            .zip(actual_generic.args.iter().copied()),
                        template,
                    );
                }
                self.solve_iterable(declared, actual, template)
            }
            (TypeData::Generic(_), TypeData::Array { .. } | TypeData::KeyedArray(_))
            | (TypeData::Array { .. }, TypeData::KeyedArray(_) | TypeData::Generic(_)) => {
                self.solve_iterable(declared, actual, template)
            }
            (
                TypeData::Array {
                    key: declared_key,
                    value: declared_value,
                },
                TypeData::Array {
                    key: actual_key,
                    value: actual_value,
                },
            ) => {
                let keys = match (declared_key, actual_key) {
                    (Some(d), Some(a)) => Some((d, a)),
                    _ => None,
                };
                self.solve_pairs(
                    keys.into_iter()
                        .chain(std::iter::once((declared_value, actual_value))),
                    template,
                )
            }
            (TypeData::KeyedArray(d), TypeData::KeyedArray(a)) => {
                let declared_shape = interner.keyed_array_shape(d);
                let actual_shape = interner.keyed_array_shape(a);
                let pairs: Vec<(TypeId, TypeId)> = declared_shape
                    .items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| {
                        let matching = match item.key {
                            Some(key) => actual_shape.item(&key),
                            None => actual_shape.items.get(index),
                        };
                        matching.map(|actual_item| (item.value, actual_item.value))
                    })
                    .collect();
                self.solve_pairs(pairs.into_iter(), template)
            }
            (TypeData::Function(d), TypeData::Function(a)) => {
                let declared_shape = interner.function_shape(d);
                let actual_shape = interner.function_shape(a);
                // The return type is the usual carrier (`callable(): T`).
                let pairs: Vec<(TypeId, TypeId)> = std::iter::once((
                    declared_shape.return_type,
                    actual_shape.return_type,
                ))
                .chain(
                    declared_shape
                        .params
                        .iter()
                        .zip(actual_shape.params.iter())
                        .map(|(d, a)| (d.ty, a.ty)),
                )
                .collect();
                self.solve_pairs(pairs.into_iter(), template)
            }
            _ => None,
        }
    }

    /// `T|null` against `Foo|null`: members present on both sides are peeled
    /// off the actual type before solving the remaining alternatives.
    fn solve_union(
        &mut self,
        declared_members: &[TypeId],
        actual: TypeId,
        template: TypeId,
    ) -> Option<TypeId> {
        let interner = self.interner;
        let remaining: Vec<TypeId> = interner
            .union_members(actual)
            .into_iter()
            .filter(|member| !declared_members.contains(member))
            .collect();
        if remaining.is_empty() {
            return None;
        }
        let narrowed = union_or_single(interner, remaining);
        for member in declared_members {
            if !self.mentions(*member, template) {
                continue;
            }
            if let Some(solution) = self.solve(*member, narrowed, template) {
                return Some(solution);
            }
        }
        None
    }

    /// `iterable<K, V>` and `array<K, V>` unify against any array-like value.
    fn solve_iterable(
        &mut self,
        declared: TypeId,
        actual: TypeId,
        template: TypeId,
    ) -> Option<TypeId> {
        let interner = self.interner;
        let declared_parts = match interner.lookup(declared)? {
            TypeData::Generic(id) => {
                let generic = interner.generic_type(id);
                if !is_iterable_name(&interner.resolve_atom_ref(generic.name)) {
                    return None;
                }
                match generic.args.as_slice() {
                    [value] => (None, *value),
                    [key, value] => (Some(*key), *value),
                    _ => return None,
                }
            }
            TypeData::Array { key, value } => (key, value),
            _ => return None,
        };
        let (actual_key, actual_value) = iterable_key_value(interner, actual)?;
        let (declared_key, declared_value) = declared_parts;
        let pairs = declared_key
            .map(|key| (key, actual_key))
            .into_iter()
            .chain(std::iter::once((declared_value, actual_value)));
        self.solve_pairs(pairs, template)
    }

    fn solve_pairs<I>(&mut self, pairs: I, template: TypeId) -> Option<TypeId>
    where
        I: Iterator<Item = (TypeId, TypeId)>,
    {
        for (declared, actual) in pairs {
            if let Some(solution) = self.solve(declared, actual, template) {
                return Some(solution);
            }
        }
        None
    }

    /// Whether `template` occurs anywhere inside `ty`.
    fn mentions(&self, ty: TypeId, template: TypeId) -> bool {
        if ty == template {
            return true;
        }
        if ty.is_intrinsic() {
            return false;
        }
        let mut children = Vec::new();
        for_each_child(self.interner, ty, &mut |child| children.push(child));
        children.into_iter().any(|child| self.mentions(child, template))
    }
}

/// Pair call arguments with declared parameters.
///
/// Named arguments bind by name; positional ones by index, with a trailing
/// variadic parameter taking the rest.
pub fn match_arguments(params: &[ParamInfo], args: &[CallArg]) -> Vec<(usize, TypeId)> {
    let mut pairs = Vec::with_capacity(args.len());
    let mut position = 0usize;
    for arg in args {
        if let Some(name) = arg.name {
            if let Some(index) = params.iter().position(|param| param.name == name) {
                pairs.push((index, arg.ty));
            }
            continue;
        }
        let index = match params.get(position) {
            Some(_) => position,
            None => match params.last() {
                Some(last) if last.variadic => params.len() - 1,
                _ => {
                    position += 1;
                    continue;
                }
            },
        };
        pairs.push((index, arg.ty));
        position += 1;
    }
    pairs
}

/// Solve every template of a callee from its parameters and the call's
/// arguments. Unsolved templates take their default, then `unknown`.
pub fn infer_templates(
    interner: &TypeInterner,
    templates: &[TypeId],
    params: &[ParamInfo],
    args: &[CallArg],
) -> TypeSubstitution {
    let mut substitution = TypeSubstitution::new();
    if templates.is_empty() {
        return substitution;
    }
    let pairs = match_arguments(params, args);
    for template in templates {
        let mut solver = TemplateSolver::new(interner);
        let mut solutions: Vec<TypeId> = Vec::new();
        for (index, actual) in &pairs {
            let declared = params[*index].ty;
            if let Some(solution) = solver.solve(declared, *actual, *template) {
                if !params[*index].variadic {
                    solutions.clear();
                    solutions.push(solution);
                    break;
                }
                solutions.push(solution);
            }
        }
        let value = if solutions.is_empty() {
            interner
                .template_of(*template)
                .and_then(|info| info.default)
                .unwrap_or(TypeId::UNKNOWN)
        } else {
            union_or_single(interner, solutions)
        };
        trace!(template = ?template, value = ?value, "solved template");
        substitution.insert(*template, value);
    }
    substitution
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod infer_tests;
