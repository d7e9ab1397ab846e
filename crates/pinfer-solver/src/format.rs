//! Canonical string rendering of types.
//!
//! The rendering is part of the public contract: downstream code and tests
//! compare these strings directly.
//!
//! | Type | Rendering |
//! |---|---|
//! | literals | `int(42)`, `string(wow)`, `boolean(true)`, `float(1.5)` |
//! | union | `unknown\|int(1)` |
//! | arrays | `array<int>`, `array<string, int>` |
//! | keyed arrays | `array{a: int(1), b?: string}`, `list{int(1), int(2)}` |
//! | generics | `Foo<int(42)>` |
//! | functions | `<TA>(TA): TA`, `(): int(2)` |
//! | `$this` | `$this` |

use crate::intern::TypeInterner;
use crate::types::*;
use pinfer_common::limits::MAX_FORMAT_DEPTH;

pub struct TypeFormatter<'a> {
    interner: &'a TypeInterner,
    depth: u32,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        TypeFormatter { interner, depth: 0 }
    }

    pub fn format(&mut self, ty: TypeId) -> String {
        if self.depth >= MAX_FORMAT_DEPTH {
            return "...".to_string();
        }
        self.depth += 1;
        let rendered = self.format_inner(ty);
        self.depth -= 1;
        rendered
    }

    fn format_inner(&mut self, ty: TypeId) -> String {
        let Some(data) = self.interner.lookup(ty) else {
            return "unknown".to_string();
        };
        match data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Literal(literal) => self.format_literal(&literal),
            TypeData::Union(list) => {
                let members = self.interner.type_list(list);
                self.join(&members, "|")
            }
            TypeData::Array { key, value } => match key {
                Some(key) => format!("array<{}, {}>", self.format(key), self.format(value)),
                None => format!("array<{}>", self.format(value)),
            },
            TypeData::KeyedArray(id) => {
                let shape = self.interner.keyed_array_shape(id);
                self.format_keyed_array(&shape)
            }
            TypeData::Object(name) => self.interner.resolve_atom(name),
            TypeData::Generic(id) => {
                let generic = self.interner.generic_type(id);
                format!(
                    "{}<{}>",
                    self.interner.resolve_atom(generic.name),
                    self.join(&generic.args, ", ")
                )
            }
            TypeData::Function(id) => {
                let shape = self.interner.function_shape(id);
                self.format_function(&shape)
            }
            TypeData::Template(id) => {
                let info = self.interner.template_info(id);
                self.interner.resolve_atom(info.name)
            }
            TypeData::This => "$this".to_string(),
            TypeData::Reference(id) => match self.interner.reference(id) {
                Some(reference) => self.format_reference(&reference),
                None => "unknown".to_string(),
            },
        }
    }

    fn format_literal(&self, literal: &LiteralValue) -> String {
        match literal {
            LiteralValue::Int(value) => format!("int({value})"),
            LiteralValue::Float(value) => format!("float({})", value.0),
            LiteralValue::String(atom) => {
                format!("string({})", self.interner.resolve_atom(*atom))
            }
            LiteralValue::Boolean(value) => format!("boolean({value})"),
        }
    }

    fn format_keyed_array(&mut self, shape: &KeyedArrayShape) -> String {
        let items: Vec<String> = shape
            .items
            .iter()
            .map(|item| {
                let value = self.format(item.value);
                match item.key {
                    Some(key) => format!(
                        "{}{}: {}",
                        self.format_key(key),
                        if item.optional { "?" } else { "" },
                        value
                    ),
                    None => value,
                }
            })
            .collect();
        let prefix = if shape.is_list { "list" } else { "array" };
        format!("{prefix}{{{}}}", items.join(", "))
    }

    fn format_key(&self, key: ArrayKey) -> String {
        match key {
            ArrayKey::Int(value) => value.to_string(),
            ArrayKey::String(atom) => self.interner.resolve_atom(atom),
        }
    }

    fn format_function(&mut self, shape: &FunctionShape) -> String {
        let mut out = String::new();
        if !shape.templates.is_empty() {
            let templates: Vec<String> = shape
                .templates
                .iter()
                .map(|template| self.format_template_declaration(*template))
                .collect();
            out.push('<');
            out.push_str(&templates.join(", "));
            out.push('>');
        }
        let params: Vec<TypeId> = shape.params.iter().map(|param| param.ty).collect();
        out.push('(');
        out.push_str(&self.join(&params, ", "));
        out.push_str("): ");
        out.push_str(&self.format(shape.return_type));
        out
    }

    fn format_template_declaration(&mut self, template: TypeId) -> String {
        let Some(info) = self.interner.template_of(template) else {
            return self.format(template);
        };
        let name = self.interner.resolve_atom(info.name);
        match info.bound {
            Some(bound) => format!("{name} is {}", self.format(bound)),
            None => name,
        }
    }

    fn format_reference(&mut self, reference: &ReferenceKind) -> String {
        match reference {
            ReferenceKind::MethodCall {
                receiver,
                name,
                args,
            } => format!(
                "({})->{}({})",
                self.format(*receiver),
                self.interner.resolve_atom(*name),
                self.format_args(args)
            ),
            ReferenceKind::StaticCall { class, name, args } => format!(
                "{}::{}({})",
                self.format_class_ref(*class),
                self.interner.resolve_atom(*name),
                self.format_args(args)
            ),
            ReferenceKind::New { class, args } => format!(
                "(new {}({}))",
                self.format_class_ref(*class),
                self.format_args(args)
            ),
            ReferenceKind::PropertyFetch { receiver, name } => format!(
                "({})->{}",
                self.format(*receiver),
                self.interner.resolve_atom(*name)
            ),
            ReferenceKind::StaticPropertyFetch { class, name } => format!(
                "{}::${}",
                self.format_class_ref(*class),
                self.interner.resolve_atom(*name)
            ),
            ReferenceKind::CallableCall { callee, args } => {
                let callee = match callee {
                    CalleeRef::Function(name) => self.interner.resolve_atom(*name),
                    CalleeRef::Value(ty) => format!("({})", self.format(*ty)),
                };
                format!("{callee}({})", self.format_args(args))
            }
        }
    }

    fn format_class_ref(&self, class: ClassRefKind) -> String {
        match class {
            ClassRefKind::Named(name) => self.interner.resolve_atom(name),
            ClassRefKind::SelfClass => "self".to_string(),
            ClassRefKind::StaticClass => "static".to_string(),
            ClassRefKind::ParentClass => "parent".to_string(),
        }
    }

    fn format_args(&mut self, args: &[CallArg]) -> String {
        let rendered: Vec<String> = args
            .iter()
            .map(|arg| match arg.name {
                Some(name) => format!(
                    "{}: {}",
                    self.interner.resolve_atom(name),
                    self.format(arg.ty)
                ),
                None => self.format(arg.ty),
            })
            .collect();
        rendered.join(", ")
    }

    fn join(&mut self, types: &[TypeId], separator: &str) -> String {
        let rendered: Vec<String> = types.iter().map(|ty| self.format(*ty)).collect();
        rendered.join(separator)
    }
}

impl TypeInterner {
    /// Canonical string of a type.
    pub fn format(&self, ty: TypeId) -> String {
        TypeFormatter::new(self).format(ty)
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod format_tests;
