//! Declared type hints to types.
//!
//! Native hints and parsed doc types share one representation; this module
//! turns them into interned types, binding `self`/`static`/`parent` and
//! template names to the enclosing declaration.

use once_cell::sync::Lazy;
use pinfer_ast::{NameTable, TemplateDecl, TypeHint};
use pinfer_common::Atom;
use pinfer_solver::{
    ArrayItemType, ArrayKey, FunctionShape, ParamInfo, TemplateInfo, TypeId, TypeInterner,
};
use rustc_hash::FxHashMap;

/// Keywords that map to a fixed type regardless of context.
static KEYWORD_TYPES: Lazy<FxHashMap<&'static str, TypeId>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    for (keyword, ty) in [
        ("int", TypeId::INT),
        ("integer", TypeId::INT),
        ("positive-int", TypeId::INT),
        ("negative-int", TypeId::INT),
        ("non-negative-int", TypeId::INT),
        ("float", TypeId::FLOAT),
        ("double", TypeId::FLOAT),
        ("string", TypeId::STRING),
        ("non-empty-string", TypeId::STRING),
        ("numeric-string", TypeId::STRING),
        ("class-string", TypeId::STRING),
        ("bool", TypeId::BOOLEAN),
        ("boolean", TypeId::BOOLEAN),
        ("true", TypeId::TRUE),
        ("false", TypeId::FALSE),
        ("null", TypeId::NULL),
        ("void", TypeId::VOID),
        ("never", TypeId::NEVER),
        ("mixed", TypeId::MIXED),
        ("resource", TypeId::MIXED),
    ] {
        map.insert(keyword, ty);
    }
    map
});

fn is_array_keyword(lower: &str) -> bool {
    matches!(lower, "array" | "list" | "non-empty-array" | "non-empty-list")
}

/// `$name` to `TName`: the template an untyped parameter or property becomes.
pub fn template_name_for(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("T{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "T".to_string(),
    }
}

/// Everything needed to turn a hint into a type at one declaration site.
pub struct HintContext<'a> {
    interner: &'a TypeInterner,
    names: &'a NameTable,
    self_class: Option<Atom>,
    parent_class: Option<Atom>,
    templates: FxHashMap<String, TypeId>,
}

impl<'a> HintContext<'a> {
    pub fn new(
        interner: &'a TypeInterner,
        names: &'a NameTable,
        self_class: Option<Atom>,
        parent_class: Option<Atom>,
    ) -> Self {
        HintContext {
            interner,
            names,
            self_class,
            parent_class,
            templates: FxHashMap::default(),
        }
    }

    /// Make a template visible by its name.
    pub fn add_template(&mut self, template: TypeId) {
        if let Some(info) = self.interner.template_of(template) {
            let name = self.interner.resolve_atom(info.name);
            self.templates.insert(name, template);
        }
    }

    pub fn with_templates(mut self, templates: impl IntoIterator<Item = TypeId>) -> Self {
        for template in templates {
            self.add_template(template);
        }
        self
    }

    pub fn resolve_class_name(&self, name: &str) -> String {
        self.names.resolve_class(name)
    }

    pub fn template(&self, name: &str) -> Option<TypeId> {
        self.templates.get(name).copied()
    }

    /// Declare `@template` tags owned by `owner`.
    ///
    /// Each template is visible to the bounds and defaults of the ones after it.
    pub fn declare(&mut self, decls: &[TemplateDecl], owner: Atom) -> Vec<TypeId> {
        let mut declared = Vec::with_capacity(decls.len());
        for decl in decls {
            let bound = decl.bound.as_ref().map(|hint| self.resolve(hint));
            let default = decl.default.as_ref().map(|hint| self.resolve(hint));
            let template = self.interner.template(TemplateInfo {
                name: self.interner.intern_string(&decl.name),
                owner,
                bound,
                default,
            });
            self.add_template(template);
            declared.push(template);
        }
        declared
    }

    pub fn resolve(&self, hint: &TypeHint) -> TypeId {
        let interner = self.interner;
        match hint {
            TypeHint::Named(name) => self.resolve_named(name),
            TypeHint::Nullable(inner) => interner.union2(self.resolve(inner), TypeId::NULL),
            TypeHint::Union(members) => {
                interner.union(members.iter().map(|member| self.resolve(member)).collect())
            }
            // Only the first member is tracked.
            TypeHint::Intersection(members) => members
                .first()
                .map(|member| self.resolve(member))
                .unwrap_or(TypeId::UNKNOWN),
            TypeHint::Generic { name, args } => self.resolve_generic(name, args),
            TypeHint::Shape { items, list } => {
                let items = items
                    .iter()
                    .map(|item| ArrayItemType {
                        key: item.key.as_deref().map(|key| self.array_key(key)),
                        value: self.resolve(&item.value),
                        optional: item.optional,
                        description: None,
                    })
                    .collect();
                interner.keyed_array(items, *list)
            }
            TypeHint::Callable {
                params,
                return_type,
            } => {
                let empty = interner.intern_string("");
                let params = params
                    .iter()
                    .map(|param| ParamInfo {
                        name: empty,
                        ty: self.resolve(param),
                        optional: false,
                        variadic: false,
                    })
                    .collect();
                interner.function(FunctionShape {
                    templates: Vec::new(),
                    params,
                    return_type: self.resolve(return_type),
                })
            }
            TypeHint::IntLiteral(value) => interner.literal_int(*value),
            TypeHint::FloatLiteral(value) => interner.literal_float(*value),
            TypeHint::StringLiteral(value) => interner.literal_string(value),
        }
    }

    fn array_key(&self, key: &str) -> ArrayKey {
        match key.parse::<i64>() {
            Ok(index) => ArrayKey::Int(index),
            Err(_) => ArrayKey::String(self.interner.intern_string(key)),
        }
    }

    fn resolve_named(&self, name: &str) -> TypeId {
        let interner = self.interner;
        if let Some(template) = self.template(name) {
            return template;
        }
        let lower = name.to_ascii_lowercase();
        if let Some(ty) = KEYWORD_TYPES.get(lower.as_str()) {
            return *ty;
        }
        if is_array_keyword(&lower) {
            return interner.array(None, TypeId::MIXED);
        }
        match lower.as_str() {
            "iterable" => interner.generic(
                interner.intern_string("iterable"),
                vec![TypeId::MIXED, TypeId::MIXED],
            ),
            "array-key" => interner.union2(TypeId::INT, TypeId::STRING),
            "numeric" => interner.union2(TypeId::INT, TypeId::FLOAT),
            "scalar" => interner.union(vec![
                TypeId::INT,
                TypeId::FLOAT,
                TypeId::STRING,
                TypeId::BOOLEAN,
            ]),
            "self" => self
                .self_class
                .map(|class| interner.object_atom(class))
                .unwrap_or(TypeId::UNKNOWN),
            "static" | "$this" => TypeId::THIS,
            "parent" => self
                .parent_class
                .map(|class| interner.object_atom(class))
                .unwrap_or(TypeId::UNKNOWN),
            "callable" => interner.object("callable"),
            "object" => interner.object("object"),
            "closure" | "\\closure" => interner.object("Closure"),
            _ => interner.object(&self.names.resolve_class(name)),
        }
    }

    fn resolve_generic(&self, name: &str, args: &[TypeHint]) -> TypeId {
        let interner = self.interner;
        let args: Vec<TypeId> = args.iter().map(|arg| self.resolve(arg)).collect();
        let lower = name.to_ascii_lowercase();
        if is_array_keyword(&lower) {
            return match args.as_slice() {
                [value] => interner.array(None, *value),
                [key, value] => interner.array(Some(*key), *value),
                _ => interner.array(None, TypeId::MIXED),
            };
        }
        let class = match lower.as_str() {
            "iterable" => interner.intern_string("iterable"),
            "class-string" => return TypeId::STRING,
            "self" | "static" => match self.self_class {
                Some(class) => class,
                None => return TypeId::UNKNOWN,
            },
            _ => interner.intern_string(&self.names.resolve_class(name)),
        };
        interner.generic(class, args)
    }
}

#[cfg(test)]
#[path = "../tests/type_hints_tests.rs"]
mod type_hints_tests;
