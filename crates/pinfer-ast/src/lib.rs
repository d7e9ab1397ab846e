//! Syntax tree consumed by the pinfer inference engine.
//!
//! The engine does not parse PHP; an external parser produces these nodes and
//! the per-file [`NameTable`]. Declarations are reference counted so the index
//! can keep method bodies around for lazy analysis.

pub mod builder;
pub mod decl;
pub mod hint;
pub mod names;
pub mod node;

pub use decl::{
    ClassConstDecl, ClassDecl, ClassKind, FunctionDecl, Param, PropertyDecl, SourceFile,
    TemplateDecl, TraitUse, Visibility,
};
pub use hint::{ShapeItem, TypeHint};
pub use names::{NameTable, short_name};
pub use node::{
    Arg, ArrayItem, BinaryOp, Callee, CastKind, Catch, ClassRef, Closure, ClosureUse, ElseIf,
    Expr, MatchArm, Stmt, SwitchCase, UnaryOp,
};
