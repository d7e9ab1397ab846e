//! Type visitor infrastructure.
//!
//! `TypeVisitor` dispatches on `TypeData`; `map_children` and
//! `for_each_child` give one-level structural traversal used by widening,
//! instantiation and the reference resolver.

use crate::intern::TypeInterner;
use crate::types::*;
use pinfer_common::Atom;
use rustc_hash::FxHashSet;

/// Visitor pattern for type traversal.
///
/// Implementors override the variants they care about; everything else
/// yields `default_output()`.
pub trait TypeVisitor: Sized {
    type Output;

    fn visit_intrinsic(&mut self, kind: IntrinsicKind) -> Self::Output;

    fn visit_literal(&mut self, value: &LiteralValue) -> Self::Output;

    fn visit_union(&mut self, _types: &TypeInterner, _list_id: TypeListId) -> Self::Output {
        Self::default_output()
    }

    fn visit_array(
        &mut self,
        _types: &TypeInterner,
        _key: Option<TypeId>,
        _value: TypeId,
    ) -> Self::Output {
        Self::default_output()
    }

    fn visit_keyed_array(&mut self, _types: &TypeInterner, _id: KeyedArrayId) -> Self::Output {
        Self::default_output()
    }

    fn visit_object(&mut self, _name: Atom) -> Self::Output {
        Self::default_output()
    }

    fn visit_generic(&mut self, _types: &TypeInterner, _id: GenericId) -> Self::Output {
        Self::default_output()
    }

    fn visit_function(&mut self, _types: &TypeInterner, _id: FunctionShapeId) -> Self::Output {
        Self::default_output()
    }

    fn visit_template(&mut self, _types: &TypeInterner, _id: TemplateId) -> Self::Output {
        Self::default_output()
    }

    fn visit_this(&mut self) -> Self::Output {
        Self::default_output()
    }

    fn visit_reference(&mut self, _types: &TypeInterner, _id: ReferenceId) -> Self::Output {
        Self::default_output()
    }

    fn default_output() -> Self::Output;

    /// Main entry point.
    fn visit_type(&mut self, types: &TypeInterner, type_id: TypeId) -> Self::Output {
        match types.lookup(type_id) {
            Some(ref data) => self.visit_type_data(types, data),
            None => Self::default_output(),
        }
    }

    fn visit_type_data(&mut self, types: &TypeInterner, data: &TypeData) -> Self::Output {
        match data {
            TypeData::Intrinsic(kind) => self.visit_intrinsic(*kind),
            TypeData::Literal(value) => self.visit_literal(value),
            TypeData::Union(id) => self.visit_union(types, *id),
            TypeData::Array { key, value } => self.visit_array(types, *key, *value),
            TypeData::KeyedArray(id) => self.visit_keyed_array(types, *id),
            TypeData::Object(name) => self.visit_object(*name),
            TypeData::Generic(id) => self.visit_generic(types, *id),
            TypeData::Function(id) => self.visit_function(types, *id),
            TypeData::Template(id) => self.visit_template(types, *id),
            TypeData::This => self.visit_this(),
            TypeData::Reference(id) => self.visit_reference(types, *id),
        }
    }
}

/// Deep predicate search over a type tree.
///
/// Interned types form a DAG, so a visited set keeps shared subtrees from
/// being walked twice.
pub struct TypePredicateVisitor<F>
where
    F: Fn(&TypeData) -> bool,
{
    predicate: F,
    visited: FxHashSet<TypeId>,
}

impl<F> TypePredicateVisitor<F>
where
    F: Fn(&TypeData) -> bool,
{
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            visited: FxHashSet::default(),
        }
    }

    fn check(&mut self, types: &TypeInterner, type_id: TypeId) -> bool {
        if !self.visited.insert(type_id) {
            return false;
        }
        self.visit_type(types, type_id)
    }

    fn check_children(&mut self, types: &TypeInterner, type_id: TypeId) -> bool {
        let mut children = Vec::new();
        for_each_child(types, type_id, &mut |child| children.push(child));
        children.into_iter().any(|child| self.check(types, child))
    }
}

impl<F> TypeVisitor for TypePredicateVisitor<F>
where
    F: Fn(&TypeData) -> bool,
{
    type Output = bool;

    fn visit_type(&mut self, types: &TypeInterner, type_id: TypeId) -> bool {
        let Some(data) = types.lookup(type_id) else {
            return false;
        };
        if (self.predicate)(&data) {
            return true;
        }
        self.check_children(types, type_id)
    }

    fn visit_intrinsic(&mut self, _kind: IntrinsicKind) -> bool {
        false
    }

    fn visit_literal(&mut self, _value: &LiteralValue) -> bool {
        false
    }

    fn default_output() -> bool {
        false
    }
}

/// Whether any node of the type tree (the root included) matches.
pub fn contains_type_matching<F>(types: &TypeInterner, type_id: TypeId, predicate: F) -> bool
where
    F: Fn(&TypeData) -> bool,
{
    TypePredicateVisitor::new(predicate).check(types, type_id)
}

pub fn contains_references(types: &TypeInterner, type_id: TypeId) -> bool {
    if type_id.is_intrinsic() {
        return false;
    }
    contains_type_matching(types, type_id, |data| {
        matches!(data, TypeData::Reference(_))
    })
}

pub fn contains_templates(types: &TypeInterner, type_id: TypeId) -> bool {
    if type_id.is_intrinsic() {
        return false;
    }
    contains_type_matching(types, type_id, |data| matches!(data, TypeData::Template(_)))
}

pub fn contains_this(types: &TypeInterner, type_id: TypeId) -> bool {
    if type_id == TypeId::THIS {
        return true;
    }
    if type_id.is_intrinsic() {
        return false;
    }
    contains_type_matching(types, type_id, |data| matches!(data, TypeData::This))
}

pub fn contains_generics(types: &TypeInterner, type_id: TypeId) -> bool {
    if type_id.is_intrinsic() {
        return false;
    }
    contains_type_matching(types, type_id, |data| matches!(data, TypeData::Generic(_)))
}

/// Templates reachable from a type, in first-seen order.
pub fn collect_templates(types: &TypeInterner, type_id: TypeId) -> Vec<TypeId> {
    fn walk(
        types: &TypeInterner,
        type_id: TypeId,
        seen: &mut FxHashSet<TypeId>,
        out: &mut Vec<TypeId>,
    ) {
        if type_id.is_intrinsic() || !seen.insert(type_id) {
            return;
        }
        if types.is_template(type_id) {
            out.push(type_id);
            return;
        }
        let mut children = Vec::new();
        for_each_child(types, type_id, &mut |child| children.push(child));
        for child in children {
            walk(types, child, seen, out);
        }
    }

    let mut out = Vec::new();
    walk(types, type_id, &mut FxHashSet::default(), &mut out);
    out
}

/// Call `f` for each direct child type.
pub fn for_each_child<F>(types: &TypeInterner, type_id: TypeId, f: &mut F)
where
    F: FnMut(TypeId),
{
    let Some(data) = types.lookup(type_id) else {
        return;
    };
    match data {
        TypeData::Intrinsic(_)
        | TypeData::Literal(_)
        | TypeData::Object(_)
        | TypeData::Template(_)
        | TypeData::This => {}
        TypeData::Union(list) => {
            for member in types.type_list(list).iter() {
                f(*member);
            }
        }
        TypeData::Array { key, value } => {
            if let Some(key) = key {
                f(key);
            }
            f(value);
        }
        TypeData::KeyedArray(id) => {
            for item in &types.keyed_array_shape(id).items {
                f(item.value);
            }
        }
        TypeData::Generic(id) => {
            for arg in &types.generic_type(id).args {
                f(*arg);
            }
        }
        TypeData::Function(id) => {
            let shape = types.function_shape(id);
            for param in &shape.params {
                f(param.ty);
            }
            f(shape.return_type);
        }
        TypeData::Reference(id) => {
            let Some(reference) = types.reference(id) else {
                return;
            };
            match &*reference {
                ReferenceKind::MethodCall { receiver, args, .. } => {
                    f(*receiver);
                    args.iter().for_each(|arg| f(arg.ty));
                }
                ReferenceKind::StaticCall { args, .. } | ReferenceKind::New { args, .. } => {
                    args.iter().for_each(|arg| f(arg.ty));
                }
                ReferenceKind::PropertyFetch { receiver, .. } => f(*receiver),
                ReferenceKind::StaticPropertyFetch { .. } => {}
                ReferenceKind::CallableCall { callee, args } => {
                    if let CalleeRef::Value(value) = callee {
                        f(*value);
                    }
                    args.iter().for_each(|arg| f(arg.ty));
                }
            }
        }
    }
}

/// Rebuild a type with each direct child replaced by `f(child)`.
///
/// Returns the original id when no child changed, so untouched subtrees keep
/// their identity.
pub fn map_children<F>(types: &TypeInterner, type_id: TypeId, f: &mut F) -> TypeId
where
    F: FnMut(TypeId) -> TypeId,
{
    let Some(data) = types.lookup(type_id) else {
        return type_id;
    };
    match data {
        TypeData::Intrinsic(_)
        | TypeData::Literal(_)
        | TypeData::Object(_)
        | TypeData::Template(_)
        | TypeData::This => type_id,
        TypeData::Union(list) => {
            let members = types.type_list(list);
            let mapped: Vec<TypeId> = members.iter().map(|member| f(*member)).collect();
            if mapped[..] == members[..] {
                type_id
            } else {
                types.union(mapped)
            }
        }
        TypeData::Array { key, value } => {
            let new_key = key.map(&mut *f);
            let new_value = f(value);
            if new_key == key && new_value == value {
                type_id
            } else {
                types.array(new_key, new_value)
            }
        }
        TypeData::KeyedArray(id) => {
            let shape = types.keyed_array_shape(id);
            let mut changed = false;
            let items: Vec<ArrayItemType> = shape
                .items
                .iter()
                .map(|item| {
                    let value = f(item.value);
                    changed |= value != item.value;
                    ArrayItemType {
                        value,
                        ..item.clone()
                    }
                })
                .collect();
            if changed {
                types.keyed_array(items, shape.is_list)
            } else {
                type_id
            }
        }
        TypeData::Generic(id) => {
            let generic = types.generic_type(id);
            let args: Vec<TypeId> = generic.args.iter().map(|arg| f(*arg)).collect();
            if args == generic.args {
                type_id
            } else {
                types.generic(generic.name, args)
            }
        }
        TypeData::Function(id) => {
            let shape = types.function_shape(id);
            let params: Vec<ParamInfo> = shape
                .params
                .iter()
                .map(|param| ParamInfo {
                    ty: f(param.ty),
                    ..param.clone()
                })
                .collect();
            let return_type = f(shape.return_type);
            if params == shape.params && return_type == shape.return_type {
                type_id
            } else {
                types.function(FunctionShape {
                    templates: shape.templates.clone(),
                    params,
                    return_type,
                })
            }
        }
        TypeData::Reference(id) => {
            let Some(reference) = types.reference(id) else {
                return type_id;
            };
            let mut map_args = |args: &[CallArg]| -> Vec<CallArg> {
                args.iter()
                    .map(|arg| CallArg {
                        name: arg.name,
                        ty: f(arg.ty),
                    })
                    .collect()
            };
            let mapped = match &*reference {
                ReferenceKind::MethodCall {
                    receiver,
                    name,
                    args,
                } => {
                    let args = map_args(args);
                    ReferenceKind::MethodCall {
                        receiver: f(*receiver),
                        name: *name,
                        args,
                    }
                }
                ReferenceKind::StaticCall { class, name, args } => ReferenceKind::StaticCall {
                    class: *class,
                    name: *name,
                    args: map_args(args),
                },
                ReferenceKind::New { class, args } => ReferenceKind::New {
                    class: *class,
                    args: map_args(args),
                },
                ReferenceKind::PropertyFetch { receiver, name } => ReferenceKind::PropertyFetch {
                    receiver: f(*receiver),
                    name: *name,
                },
                ReferenceKind::StaticPropertyFetch { .. } => return type_id,
                ReferenceKind::CallableCall { callee, args } => {
                    let args = map_args(args);
                    let callee = match callee {
                        CalleeRef::Value(value) => CalleeRef::Value(f(*value)),
                        CalleeRef::Function(name) => CalleeRef::Function(*name),
                    };
                    ReferenceKind::CallableCall { callee, args }
                }
            };
            if mapped == *reference {
                type_id
            } else {
                types.reference_type(mapped)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/visitor_tests.rs"]
mod visitor_tests;
