//! Type representation for the inference engine.
//!
//! Types are interned: every distinct `TypeData` gets one `TypeId`, so
//! structural equality is `TypeId` equality and substitution always builds new
//! ids instead of touching existing ones. Composite payloads (member lists,
//! array shapes, signatures, references) live in side tables keyed by the
//! small ids below.

use pinfer_common::Atom;
use std::hash::{Hash, Hasher};

/// Handle to an interned type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// "Could not infer". Distinct from `mixed`.
    pub const UNKNOWN: TypeId = TypeId(0);
    pub const MIXED: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const VOID: TypeId = TypeId(3);
    pub const NULL: TypeId = TypeId(4);
    pub const INT: TypeId = TypeId(5);
    pub const FLOAT: TypeId = TypeId(6);
    pub const STRING: TypeId = TypeId(7);
    pub const BOOLEAN: TypeId = TypeId(8);
    /// `boolean(true)`
    pub const TRUE: TypeId = TypeId(9);
    /// `boolean(false)`
    pub const FALSE: TypeId = TypeId(10);
    /// `$this`, the late-bound receiver.
    pub const THIS: TypeId = TypeId(11);

    /// First id handed out to interned (non-builtin) types.
    pub const FIRST_USER: u32 = 100;

    #[inline]
    pub fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Unknown,
    Mixed,
    Never,
    Void,
    Null,
    Int,
    Float,
    String,
    Boolean,
}

impl IntrinsicKind {
    pub fn to_type_id(self) -> TypeId {
        match self {
            IntrinsicKind::Unknown => TypeId::UNKNOWN,
            IntrinsicKind::Mixed => TypeId::MIXED,
            IntrinsicKind::Never => TypeId::NEVER,
            IntrinsicKind::Void => TypeId::VOID,
            IntrinsicKind::Null => TypeId::NULL,
            IntrinsicKind::Int => TypeId::INT,
            IntrinsicKind::Float => TypeId::FLOAT,
            IntrinsicKind::String => TypeId::STRING,
            IntrinsicKind::Boolean => TypeId::BOOLEAN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Mixed => "mixed",
            IntrinsicKind::Never => "never",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Int => "int",
            IntrinsicKind::Float => "float",
            IntrinsicKind::String => "string",
            IntrinsicKind::Boolean => "boolean",
        }
    }
}

/// `f64` with bitwise equality so float literals can be interned.
#[derive(Clone, Copy, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Int(i64),
    Float(OrderedFloat),
    String(Atom),
    Boolean(bool),
}

impl LiteralValue {
    /// The primitive a literal widens to.
    pub fn primitive(&self) -> TypeId {
        match self {
            LiteralValue::Int(_) => TypeId::INT,
            LiteralValue::Float(_) => TypeId::FLOAT,
            LiteralValue::String(_) => TypeId::STRING,
            LiteralValue::Boolean(_) => TypeId::BOOLEAN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyedArrayId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GenericId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TemplateId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceId(pub u32);

/// Key of a keyed-array item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    String(Atom),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayItemType {
    /// `None` for list-style items.
    pub key: Option<ArrayKey>,
    pub value: TypeId,
    pub optional: bool,
    /// Doc comment text carried over to schema property descriptions.
    pub description: Option<Atom>,
}

impl ArrayItemType {
    pub fn new(key: Option<ArrayKey>, value: TypeId) -> Self {
        ArrayItemType {
            key,
            value,
            optional: false,
            description: None,
        }
    }
}

/// `array{a: int, b?: string}` or `list{int, string}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyedArrayShape {
    pub items: Vec<ArrayItemType>,
    pub is_list: bool,
}

impl KeyedArrayShape {
    pub fn item(&self, key: &ArrayKey) -> Option<&ArrayItemType> {
        self.items.iter().find(|item| item.key.as_ref() == Some(key))
    }
}

/// A class or interface name applied to type arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericType {
    pub name: Atom,
    pub args: Vec<TypeId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Atom,
    pub ty: TypeId,
    pub optional: bool,
    pub variadic: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    /// Template types declared by the function, each a `TypeData::Template`.
    pub templates: Vec<TypeId>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

/// A named placeholder owned by a function, method or class.
///
/// `owner` keeps two `TA` templates of different functions apart.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TemplateInfo {
    pub name: Atom,
    pub owner: Atom,
    pub bound: Option<TypeId>,
    pub default: Option<TypeId>,
}

/// Class part of a static reference.
///
/// `self` and `parent` are bound to the lexical class of the scope that
/// resolves the reference; `static` stays late-bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassRefKind {
    Named(Atom),
    SelfClass,
    StaticClass,
    ParentClass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallArg {
    /// Named-argument label.
    pub name: Option<Atom>,
    pub ty: TypeId,
}

impl CallArg {
    pub fn positional(ty: TypeId) -> Self {
        CallArg { name: None, ty }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalleeRef {
    /// A named function; the name is namespace-resolved.
    Function(Atom),
    /// Calling a value (`$callback(...)`).
    Value(TypeId),
}

/// A pending call or fetch, resolved later by the reference resolver.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    MethodCall {
        receiver: TypeId,
        name: Atom,
        args: Vec<CallArg>,
    },
    StaticCall {
        class: ClassRefKind,
        name: Atom,
        args: Vec<CallArg>,
    },
    New {
        class: ClassRefKind,
        args: Vec<CallArg>,
    },
    PropertyFetch {
        receiver: TypeId,
        name: Atom,
    },
    StaticPropertyFetch {
        class: ClassRefKind,
        name: Atom,
    },
    CallableCall {
        callee: CalleeRef,
        args: Vec<CallArg>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    Union(TypeListId),
    /// `array<V>` when `key` is `None`, otherwise `array<K, V>`.
    Array {
        key: Option<TypeId>,
        value: TypeId,
    },
    KeyedArray(KeyedArrayId),
    Object(Atom),
    Generic(GenericId),
    Function(FunctionShapeId),
    Template(TemplateId),
    This,
    Reference(ReferenceId),
}
