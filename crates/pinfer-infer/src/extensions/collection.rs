//! `Collection::map`: the callback's return type becomes the value type of
//! the resulting collection.

use pinfer_solver::{CallArg, TypeData, TypeId, infer_templates, instantiate_type};

use super::{ExtensionContext, MethodCallEvent, MethodReturnTypeExtension};

pub struct CollectionMapExtension {
    class: String,
}

impl CollectionMapExtension {
    pub fn new(class: &str) -> Self {
        CollectionMapExtension {
            class: class.trim_start_matches('\\').to_string(),
        }
    }
}

impl MethodReturnTypeExtension for CollectionMapExtension {
    fn applies_to(&self, class: &str, ctx: &ExtensionContext<'_>) -> bool {
        class.eq_ignore_ascii_case(&self.class) || ctx.is_subclass_of(class, &self.class)
    }

    fn method_return_type(
        &self,
        event: &MethodCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        let interner = ctx.interner();
        if !interner
            .resolve_atom_ref(event.name)
            .eq_ignore_ascii_case("map")
        {
            return None;
        }
        let (key, value) = match interner.lookup(event.receiver) {
            Some(TypeData::Generic(id)) => match interner.generic_type(id).args.as_slice() {
                [key, value] => (*key, *value),
                [value] => (TypeId::UNKNOWN, *value),
                _ => (TypeId::UNKNOWN, TypeId::UNKNOWN),
            },
            _ => (TypeId::UNKNOWN, TypeId::UNKNOWN),
        };
        let mapped = match event.args.first().and_then(|arg| interner.lookup(arg.ty)) {
            Some(TypeData::Function(id)) => {
                let shape = interner.function_shape(id);
                let args = [CallArg::positional(value), CallArg::positional(key)];
                let substitution = infer_templates(interner, &shape.templates, &shape.params, &args);
                instantiate_type(interner, shape.return_type, &substitution)
            }
            _ => TypeId::UNKNOWN,
        };
        Some(interner.generic(event.class, vec![key, mapped]))
    }
}
