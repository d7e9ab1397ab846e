//! Declared types: native type hints and the types of parsed doc tags.

#[derive(Clone, Debug, PartialEq)]
pub enum TypeHint {
    /// A keyword (`int`, `self`, `static`, ...), a class name as written,
    /// or a template name.
    Named(String),
    Nullable(Box<TypeHint>),
    Union(Vec<TypeHint>),
    Intersection(Vec<TypeHint>),
    /// `Collection<int, User>`, `array<string>`, `iterable<K, V>`.
    Generic { name: String, args: Vec<TypeHint> },
    /// `array{id: int, name?: string}` or `list{int, string}`.
    Shape { items: Vec<ShapeItem>, list: bool },
    /// `callable(int): string`, `Closure(T): U`.
    Callable {
        params: Vec<TypeHint>,
        return_type: Box<TypeHint>,
    },
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeItem {
    pub key: Option<String>,
    pub value: TypeHint,
    pub optional: bool,
}

impl TypeHint {
    pub fn named(name: impl Into<String>) -> Self {
        TypeHint::Named(name.into())
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeHint>) -> Self {
        TypeHint::Generic {
            name: name.into(),
            args,
        }
    }

    pub fn nullable(inner: TypeHint) -> Self {
        TypeHint::Nullable(Box::new(inner))
    }
}
