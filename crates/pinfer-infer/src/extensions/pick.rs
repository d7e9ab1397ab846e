//! `Pick<Shape, Keys>`: the items of a keyed array whose keys are listed.

use pinfer_ast::short_name;
use pinfer_solver::{ArrayKey, LiteralValue, TypeData, TypeId};

use super::{ExtensionContext, ResolvingTypeExtension};

pub struct PickExtension;

impl ResolvingTypeExtension for PickExtension {
    fn resolving_type(&self, ty: TypeId, ctx: &ExtensionContext<'_>) -> Option<TypeId> {
        let interner = ctx.interner();
        let TypeData::Generic(id) = interner.lookup(ty)? else {
            return None;
        };
        let generic = interner.generic_type(id);
        if !short_name(&interner.resolve_atom(generic.name)).eq_ignore_ascii_case("Pick") {
            return None;
        }
        let [shape, keys] = generic.args.as_slice() else {
            return None;
        };
        let TypeData::KeyedArray(shape_id) = interner.lookup(*shape)? else {
            return None;
        };
        let wanted: Vec<ArrayKey> = interner
            .union_members(*keys)
            .into_iter()
            .filter_map(|key| match interner.literal_value(key)? {
                LiteralValue::String(atom) => Some(ArrayKey::String(atom)),
                LiteralValue::Int(value) => Some(ArrayKey::Int(value)),
                _ => None,
            })
            .collect();
        let items = interner
            .keyed_array_shape(shape_id)
            .items
            .iter()
            .filter(|item| item.key.is_some_and(|key| wanted.contains(&key)))
            .cloned()
            .collect();
        Some(interner.keyed_array(items, false))
    }
}
