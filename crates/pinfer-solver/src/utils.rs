//! Small shared helpers over interned types.

use crate::intern::TypeInterner;
use crate::types::*;

/// `never` for no members, the member itself for one, a union otherwise.
pub fn union_or_single(interner: &TypeInterner, types: Vec<TypeId>) -> TypeId {
    match types.len() {
        0 => TypeId::NEVER,
        1 => types[0],
        _ => interner.union(types),
    }
}

/// Names whose generic arguments read `<K, V>` or `<V>` like an array.
pub fn is_iterable_name(name: &str) -> bool {
    let name = name.trim_start_matches('\\');
    ["iterable", "array", "list", "Traversable", "Iterator", "IteratorAggregate"]
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

pub fn array_key_type(interner: &TypeInterner, key: ArrayKey) -> TypeId {
    match key {
        ArrayKey::Int(value) => interner.literal_int(value),
        ArrayKey::String(atom) => interner.intern(TypeData::Literal(LiteralValue::String(atom))),
    }
}

/// Key and value types of anything iterable like an array.
///
/// `array<V>` has an `int|string` key; keyed arrays yield the union of their
/// keys and of their values; `iterable<K, V>`-style generics yield their
/// arguments.
pub fn iterable_key_value(interner: &TypeInterner, ty: TypeId) -> Option<(TypeId, TypeId)> {
    match interner.lookup(ty)? {
        TypeData::Array { key, value } => Some((
            key.unwrap_or_else(|| interner.union2(TypeId::INT, TypeId::STRING)),
            value,
        )),
        TypeData::KeyedArray(id) => {
            let shape = interner.keyed_array_shape(id);
            if shape.items.is_empty() {
                return Some((TypeId::NEVER, TypeId::NEVER));
            }
            let key = if shape.is_list {
                TypeId::INT
            } else {
                let keys = shape
                    .items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| match item.key {
                        Some(key) => array_key_type(interner, key),
                        None => interner.literal_int(index as i64),
                    })
                    .collect();
                union_or_single(interner, keys)
            };
            let values = shape.items.iter().map(|item| item.value).collect();
            Some((key, union_or_single(interner, values)))
        }
        TypeData::Generic(id) => {
            let generic = interner.generic_type(id);
            if !is_iterable_name(&interner.resolve_atom_ref(generic.name)) {
                return None;
            }
            match generic.args.as_slice() {
                [value] => Some((TypeId::MIXED, *value)),
                [key, value] => Some((*key, *value)),
                _ => None,
            }
        }
        _ => None,
    }
}
