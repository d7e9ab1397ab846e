//! Expression and statement nodes.
//!
//! The tree is produced by an external PHP parser; the engine only reads it.
//! Identifiers are kept exactly as written in the source and are resolved
//! against the file's [`NameTable`](crate::NameTable) at the point of use.

use crate::decl::Param;
use crate::hint::TypeHint;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
    /// `"Hello {$name}"` and heredocs.
    Interpolated(Vec<Expr>),
    Array(Vec<ArrayItem>),
    /// A variable without the leading `$`.
    Variable(String),
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// `$a += 1`, `$a .= 'x'`, `$a ??= []`.
    AssignOp {
        op: BinaryOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `then` is `None` for the short form `$a ?: $b`.
    Ternary {
        condition: Box<Expr>,
        then: Option<Box<Expr>>,
        otherwise: Box<Expr>,
    },
    Match {
        subject: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Throw(Box<Expr>),
    New {
        class: ClassRef,
        args: Vec<Arg>,
    },
    MethodCall {
        receiver: Box<Expr>,
        name: String,
        args: Vec<Arg>,
        nullsafe: bool,
    },
    StaticCall {
        class: ClassRef,
        name: String,
        args: Vec<Arg>,
    },
    PropertyFetch {
        receiver: Box<Expr>,
        name: String,
        nullsafe: bool,
    },
    StaticPropertyFetch {
        class: ClassRef,
        name: String,
    },
    /// `Foo::BAR` and `Foo::class`.
    ClassConstFetch {
        class: ClassRef,
        name: String,
    },
    /// Global constants such as `PHP_EOL`.
    ConstFetch(String),
    Call {
        callee: Callee,
        args: Vec<Arg>,
    },
    /// `$a['key']`, or `$a[]` when `key` is `None` (write context only).
    ArrayFetch {
        target: Box<Expr>,
        key: Option<Box<Expr>>,
    },
    Closure(Rc<Closure>),
    /// `fn ($x) => ...`; the body is a single `return` statement.
    ArrowFunction(Rc<Closure>),
    Cast {
        kind: CastKind,
        expr: Box<Expr>,
    },
    Isset(Vec<Expr>),
    Empty(Box<Expr>),
    InstanceOf {
        expr: Box<Expr>,
        class: ClassRef,
    },
    Clone(Box<Expr>),
    /// Anything the parser produced that the engine has no rule for
    /// (`eval`, `include`, dynamic member names, ...). Carries a label for logs.
    Unsupported(String),
}

/// The class part of `new X`, `X::m()`, `X::$p`, `X::C`.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassRef {
    Name(String),
    SelfKw,
    Static,
    Parent,
    /// `$className::create()`, `new $class`.
    Expr(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Callee {
    Name(String),
    Expr(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    /// Named argument label (`foo(value: 1)`).
    pub name: Option<String>,
    pub value: Expr,
    pub unpack: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
    pub unpack: bool,
    /// Text of a doc comment attached to the item.
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchArm {
    /// Empty for the `default` arm.
    pub conditions: Vec<Expr>,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClosureUse {
    pub name: String,
    pub by_ref: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Closure {
    pub params: Vec<Param>,
    pub uses: Vec<ClosureUse>,
    pub return_type: Option<TypeHint>,
    pub body: Vec<Stmt>,
    pub is_static: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Spaceship,
    And,
    Or,
    Xor,
    Coalesce,
}

impl BinaryOp {
    /// Comparison and logical operators.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Identical
                | BinaryOp::NotIdentical
                | BinaryOp::Less
                | BinaryOp::LessOrEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterOrEqual
                | BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::Xor
        )
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOp::BitAnd
                | BinaryOp::BitOr
                | BinaryOp::BitXor
                | BinaryOp::ShiftLeft
                | BinaryOp::ShiftRight
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastKind {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
    Unset,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Return(Option<Expr>),
    If {
        condition: Expr,
        then: Vec<Stmt>,
        else_ifs: Vec<ElseIf>,
        otherwise: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        condition: Expr,
    },
    For {
        init: Vec<Expr>,
        condition: Vec<Expr>,
        step: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Foreach {
        subject: Expr,
        key: Option<Expr>,
        value: Expr,
        body: Vec<Stmt>,
    },
    Switch {
        subject: Expr,
        cases: Vec<SwitchCase>,
    },
    Try {
        body: Vec<Stmt>,
        catches: Vec<Catch>,
        finally: Option<Vec<Stmt>>,
    },
    Throw(Expr),
    Echo(Vec<Expr>),
    Unset(Vec<Expr>),
    Block(Vec<Stmt>),
    Break,
    Continue,
    Nop,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElseIf {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub condition: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catch {
    pub types: Vec<String>,
    pub var: Option<String>,
    pub body: Vec<Stmt>,
}
