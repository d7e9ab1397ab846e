//! Shorthand constructors for building trees by hand.
//!
//! Embedders normally get trees from a parser; tests and fixtures use these.

use crate::decl::{
    ClassConstDecl, ClassDecl, ClassKind, FunctionDecl, Param, PropertyDecl, TemplateDecl,
    TraitUse,
};
use crate::hint::TypeHint;
use crate::node::{
    Arg, ArrayItem, BinaryOp, Callee, ClassRef, Closure, ClosureUse, Expr, MatchArm, Stmt,
};
use std::rc::Rc;

pub fn int(value: i64) -> Expr {
    Expr::Int(value)
}

pub fn float(value: f64) -> Expr {
    Expr::Float(value)
}

pub fn string(value: &str) -> Expr {
    Expr::String(value.to_string())
}

pub fn boolean(value: bool) -> Expr {
    Expr::Bool(value)
}

pub fn null() -> Expr {
    Expr::Null
}

pub fn var(name: &str) -> Expr {
    Expr::Variable(name.to_string())
}

pub fn this() -> Expr {
    var("this")
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    Expr::Assign {
        target: Box::new(target),
        value: Box::new(value),
    }
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn coalesce(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Coalesce, left, right)
}

pub fn ternary(condition: Expr, then: Expr, otherwise: Expr) -> Expr {
    Expr::Ternary {
        condition: Box::new(condition),
        then: Some(Box::new(then)),
        otherwise: Box::new(otherwise),
    }
}

/// `$condition ?: $otherwise`
pub fn elvis(condition: Expr, otherwise: Expr) -> Expr {
    Expr::Ternary {
        condition: Box::new(condition),
        then: None,
        otherwise: Box::new(otherwise),
    }
}

pub fn match_expr(subject: Expr, arms: Vec<(Vec<Expr>, Expr)>) -> Expr {
    Expr::Match {
        subject: Box::new(subject),
        arms: arms
            .into_iter()
            .map(|(conditions, body)| MatchArm { conditions, body })
            .collect(),
    }
}

pub fn throw(value: Expr) -> Expr {
    Expr::Throw(Box::new(value))
}

pub fn arg(value: Expr) -> Arg {
    Arg {
        name: None,
        value,
        unpack: false,
    }
}

pub fn named_arg(name: &str, value: Expr) -> Arg {
    Arg {
        name: Some(name.to_string()),
        value,
        unpack: false,
    }
}

fn args(values: Vec<Expr>) -> Vec<Arg> {
    values.into_iter().map(arg).collect()
}

pub fn call(name: &str, values: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Callee::Name(name.to_string()),
        args: args(values),
    }
}

pub fn call_value(callee: Expr, values: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Callee::Expr(Box::new(callee)),
        args: args(values),
    }
}

pub fn method_call(receiver: Expr, name: &str, values: Vec<Expr>) -> Expr {
    Expr::MethodCall {
        receiver: Box::new(receiver),
        name: name.to_string(),
        args: args(values),
        nullsafe: false,
    }
}

pub fn static_call(class: ClassRef, name: &str, values: Vec<Expr>) -> Expr {
    Expr::StaticCall {
        class,
        name: name.to_string(),
        args: args(values),
    }
}

pub fn new_object(class: &str, values: Vec<Expr>) -> Expr {
    Expr::New {
        class: ClassRef::Name(class.to_string()),
        args: args(values),
    }
}

pub fn new_ref(class: ClassRef, values: Vec<Expr>) -> Expr {
    Expr::New {
        class,
        args: args(values),
    }
}

pub fn class_name(name: &str) -> ClassRef {
    ClassRef::Name(name.to_string())
}

pub fn prop(receiver: Expr, name: &str) -> Expr {
    Expr::PropertyFetch {
        receiver: Box::new(receiver),
        name: name.to_string(),
        nullsafe: false,
    }
}

pub fn static_prop(class: ClassRef, name: &str) -> Expr {
    Expr::StaticPropertyFetch {
        class,
        name: name.to_string(),
    }
}

pub fn class_const(class: ClassRef, name: &str) -> Expr {
    Expr::ClassConstFetch {
        class,
        name: name.to_string(),
    }
}

pub fn fetch(target: Expr, key: Expr) -> Expr {
    Expr::ArrayFetch {
        target: Box::new(target),
        key: Some(Box::new(key)),
    }
}

pub fn push(target: Expr) -> Expr {
    Expr::ArrayFetch {
        target: Box::new(target),
        key: None,
    }
}

pub fn item(value: Expr) -> ArrayItem {
    ArrayItem {
        key: None,
        value,
        unpack: false,
        description: None,
    }
}

pub fn keyed(key: Expr, value: Expr) -> ArrayItem {
    ArrayItem {
        key: Some(key),
        value,
        unpack: false,
        description: None,
    }
}

pub fn described(key: Expr, value: Expr, description: &str) -> ArrayItem {
    ArrayItem {
        key: Some(key),
        value,
        unpack: false,
        description: Some(description.to_string()),
    }
}

pub fn array(items: Vec<ArrayItem>) -> Expr {
    Expr::Array(items)
}

pub fn closure(params: Vec<Param>, uses: &[&str], body: Vec<Stmt>) -> Expr {
    Expr::Closure(Rc::new(Closure {
        params,
        uses: uses
            .iter()
            .map(|name| ClosureUse {
                name: (*name).to_string(),
                by_ref: false,
            })
            .collect(),
        return_type: None,
        body,
        is_static: false,
    }))
}

pub fn arrow_fn(params: Vec<Param>, body: Expr) -> Expr {
    Expr::ArrowFunction(Rc::new(Closure {
        params,
        uses: Vec::new(),
        return_type: None,
        body: vec![ret(body)],
        is_static: false,
    }))
}

pub fn expr(value: Expr) -> Stmt {
    Stmt::Expr(value)
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(Some(value))
}

pub fn if_then(condition: Expr, then: Vec<Stmt>) -> Stmt {
    Stmt::If {
        condition,
        then,
        else_ifs: Vec::new(),
        otherwise: None,
    }
}

pub fn if_else(condition: Expr, then: Vec<Stmt>, otherwise: Vec<Stmt>) -> Stmt {
    Stmt::If {
        condition,
        then,
        else_ifs: Vec::new(),
        otherwise: Some(otherwise),
    }
}

pub fn foreach(subject: Expr, key: Option<&str>, value: &str, body: Vec<Stmt>) -> Stmt {
    Stmt::Foreach {
        subject,
        key: key.map(var),
        value: var(value),
        body,
    }
}

pub fn param(name: &str) -> Param {
    Param::new(name)
}

pub fn typed_param(name: &str, hint: TypeHint) -> Param {
    Param {
        type_hint: Some(hint),
        ..Param::new(name)
    }
}

pub fn hint(name: &str) -> TypeHint {
    TypeHint::named(name)
}

/// Fluent builder for [`FunctionDecl`].
pub struct FunctionBuilder {
    decl: FunctionDecl,
}

pub fn function(name: &str) -> FunctionBuilder {
    FunctionBuilder {
        decl: FunctionDecl::new(name),
    }
}

impl FunctionBuilder {
    pub fn param(mut self, param: Param) -> Self {
        self.decl.params.push(param);
        self
    }

    pub fn returns(mut self, hint: TypeHint) -> Self {
        self.decl.return_type = Some(hint);
        self
    }

    pub fn doc_returns(mut self, hint: TypeHint) -> Self {
        self.decl.doc_return = Some(hint);
        self
    }

    pub fn throws(mut self, hint: TypeHint) -> Self {
        self.decl.doc_throws.push(hint);
        self
    }

    pub fn template(mut self, template: TemplateDecl) -> Self {
        self.decl.templates.push(template);
        self
    }

    pub fn is_static(mut self) -> Self {
        self.decl.is_static = true;
        self
    }

    pub fn body(mut self, body: Vec<Stmt>) -> Self {
        self.decl.body = body;
        self
    }

    pub fn build(self) -> FunctionDecl {
        self.decl
    }
}

/// Fluent builder for [`ClassDecl`].
pub struct ClassBuilder {
    decl: ClassDecl,
}

pub fn class(name: &str) -> ClassBuilder {
    ClassBuilder {
        decl: ClassDecl::new(name),
    }
}

pub fn trait_decl(name: &str) -> ClassBuilder {
    let mut decl = ClassDecl::new(name);
    decl.kind = ClassKind::Trait;
    ClassBuilder { decl }
}

impl ClassBuilder {
    pub fn extends(mut self, parent: &str) -> Self {
        self.decl.parent = Some(parent.to_string());
        self
    }

    pub fn extends_with(mut self, parent: &str, args: Vec<TypeHint>) -> Self {
        self.decl.parent = Some(parent.to_string());
        self.decl.extends_args = args;
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.decl.interfaces.push(interface.to_string());
        self
    }

    pub fn uses(mut self, name: &str, type_args: Vec<TypeHint>) -> Self {
        self.decl.traits.push(TraitUse {
            name: name.to_string(),
            type_args,
        });
        self
    }

    pub fn template(mut self, template: TemplateDecl) -> Self {
        self.decl.templates.push(template);
        self
    }

    /// Untyped property without a default.
    pub fn property(mut self, name: &str) -> Self {
        self.decl.properties.push(PropertyDecl::new(name));
        self
    }

    pub fn property_decl(mut self, property: PropertyDecl) -> Self {
        self.decl.properties.push(property);
        self
    }

    pub fn constant(mut self, name: &str, value: Expr) -> Self {
        self.decl.constants.push(ClassConstDecl {
            name: name.to_string(),
            value,
        });
        self
    }

    pub fn method(mut self, method: FunctionDecl) -> Self {
        self.decl.methods.push(Rc::new(method));
        self
    }

    pub fn build(self) -> ClassDecl {
        self.decl
    }
}
