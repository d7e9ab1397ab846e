//! Extension seam.
//!
//! Framework knowledge plugs in here without the engine knowing about any
//! framework. Each capability is a single-method trait returning `None` for
//! "not applicable"; the [`ExtensionsBroker`] asks the registered
//! implementations in registration order and the first answer wins.

mod collection;
mod exceptions;
mod pick;

pub use collection::CollectionMapExtension;
pub use exceptions::HelperExceptions;
pub use pick::PickExtension;

use pinfer_ast::Expr;
use pinfer_common::Atom;
use pinfer_solver::{CallArg, ClassHierarchy, TypeId, TypeInterner};

use crate::context::InferContext;
use crate::options::InferOptions;
use crate::scope::{Scope, ScopeContext};

/// `$receiver->name(args)` on an object of `class`.
#[derive(Clone, Copy, Debug)]
pub struct MethodCallEvent<'a> {
    pub receiver: TypeId,
    pub class: Atom,
    pub name: Atom,
    pub args: &'a [CallArg],
}

/// `Class::name(args)` with a named class.
#[derive(Clone, Copy, Debug)]
pub struct StaticCallEvent<'a> {
    pub class: Atom,
    pub name: Atom,
    pub args: &'a [CallArg],
}

#[derive(Clone, Copy, Debug)]
pub struct FunctionCallEvent<'a> {
    pub name: Atom,
    pub args: &'a [CallArg],
}

#[derive(Clone, Copy, Debug)]
pub struct PropertyFetchEvent {
    pub receiver: TypeId,
    pub class: Atom,
    pub name: Atom,
}

pub trait MethodReturnTypeExtension {
    /// Cheap filter on the receiver's class name.
    fn applies_to(&self, class: &str, ctx: &ExtensionContext<'_>) -> bool {
        let _ = (class, ctx);
        true
    }

    fn method_return_type(
        &self,
        event: &MethodCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId>;
}

pub trait StaticMethodReturnTypeExtension {
    fn static_method_return_type(
        &self,
        event: &StaticCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId>;
}

pub trait FunctionReturnTypeExtension {
    fn function_return_type(
        &self,
        event: &FunctionCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId>;
}

pub trait PropertyTypeExtension {
    fn property_type(&self, event: &PropertyFetchEvent, ctx: &ExtensionContext<'_>)
    -> Option<TypeId>;
}

/// Sees raw expressions before the built-in rules.
pub trait ExpressionTypeExtension {
    fn expression_type(
        &self,
        expr: &Expr,
        scope: &Scope,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId>;
}

/// Exceptions an expression may throw besides explicit `throw`s.
pub trait ExceptionExtension {
    fn exceptions(&self, expr: &Expr, scope: &Scope, ctx: &ExtensionContext<'_>) -> Vec<TypeId>;
}

/// Offered every reference and generic type before built-in resolution.
pub trait ResolvingTypeExtension {
    fn resolving_type(&self, ty: TypeId, ctx: &ExtensionContext<'_>) -> Option<TypeId>;
}

/// What an extension may look at while answering.
pub struct ExtensionContext<'a> {
    infer: &'a InferContext,
    scope: &'a ScopeContext,
}

impl<'a> ExtensionContext<'a> {
    pub fn new(infer: &'a InferContext, scope: &'a ScopeContext) -> Self {
        ExtensionContext { infer, scope }
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.infer.interner()
    }

    pub fn options(&self) -> &'a InferOptions {
        self.infer.options()
    }

    pub fn scope(&self) -> &'a ScopeContext {
        self.scope
    }

    /// Resolve references inside `ty` in the caller's context.
    pub fn resolve(&self, ty: TypeId) -> TypeId {
        self.infer.resolve(self.scope, ty)
    }

    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        let interner = self.interner();
        self.infer.is_subclass_of(
            interner.intern_string(class.trim_start_matches('\\')),
            interner.intern_string(ancestor.trim_start_matches('\\')),
        )
    }

    pub fn class_name(&self, class: Atom) -> String {
        self.interner().resolve_atom(class)
    }

    pub fn format(&self, ty: TypeId) -> String {
        self.infer.format(ty)
    }
}

#[derive(Default)]
pub struct ExtensionsBroker {
    method_return: Vec<Box<dyn MethodReturnTypeExtension>>,
    static_method_return: Vec<Box<dyn StaticMethodReturnTypeExtension>>,
    function_return: Vec<Box<dyn FunctionReturnTypeExtension>>,
    property: Vec<Box<dyn PropertyTypeExtension>>,
    expression: Vec<Box<dyn ExpressionTypeExtension>>,
    exception: Vec<Box<dyn ExceptionExtension>>,
    resolving: Vec<Box<dyn ResolvingTypeExtension>>,
}

impl ExtensionsBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The extensions shipped with the engine.
    pub fn with_builtins(options: &InferOptions) -> Self {
        let mut broker = Self::new();
        broker.register_resolving_type(PickExtension);
        broker.register_method_return_type(CollectionMapExtension::new(&options.collection_class));
        broker.register_exception(HelperExceptions::new());
        broker
    }

    pub fn register_method_return_type(&mut self, extension: impl MethodReturnTypeExtension + 'static) {
        self.method_return.push(Box::new(extension));
    }

    pub fn register_static_method_return_type(
        &mut self,
        extension: impl StaticMethodReturnTypeExtension + 'static,
    ) {
        self.static_method_return.push(Box::new(extension));
    }

    pub fn register_function_return_type(
        &mut self,
        extension: impl FunctionReturnTypeExtension + 'static,
    ) {
        self.function_return.push(Box::new(extension));
    }

    pub fn register_property_type(&mut self, extension: impl PropertyTypeExtension + 'static) {
        self.property.push(Box::new(extension));
    }

    pub fn register_expression_type(&mut self, extension: impl ExpressionTypeExtension + 'static) {
        self.expression.push(Box::new(extension));
    }

    pub fn register_exception(&mut self, extension: impl ExceptionExtension + 'static) {
        self.exception.push(Box::new(extension));
    }

    pub fn register_resolving_type(&mut self, extension: impl ResolvingTypeExtension + 'static) {
        self.resolving.push(Box::new(extension));
    }

    pub fn has_expression_extensions(&self) -> bool {
        !self.expression.is_empty()
    }

    pub fn has_exception_extensions(&self) -> bool {
        !self.exception.is_empty()
    }

    pub fn has_resolving_type_extensions(&self) -> bool {
        !self.resolving.is_empty()
    }

    pub fn method_return_type(
        &self,
        event: &MethodCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        if self.method_return.is_empty() {
            return None;
        }
        let class = ctx.class_name(event.class);
        self.method_return
            .iter()
            .filter(|extension| extension.applies_to(&class, ctx))
            .find_map(|extension| extension.method_return_type(event, ctx))
    }

    pub fn static_method_return_type(
        &self,
        event: &StaticCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        self.static_method_return
            .iter()
            .find_map(|extension| extension.static_method_return_type(event, ctx))
    }

    pub fn function_return_type(
        &self,
        event: &FunctionCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        self.function_return
            .iter()
            .find_map(|extension| extension.function_return_type(event, ctx))
    }

    pub fn property_type(
        &self,
        event: &PropertyFetchEvent,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        self.property
            .iter()
            .find_map(|extension| extension.property_type(event, ctx))
    }

    pub fn expression_type(
        &self,
        expr: &Expr,
        scope: &Scope,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        self.expression
            .iter()
            .find_map(|extension| extension.expression_type(expr, scope, ctx))
    }

    /// Every extension contributes; duplicates are dropped.
    pub fn exceptions(&self, expr: &Expr, scope: &Scope, ctx: &ExtensionContext<'_>) -> Vec<TypeId> {
        let mut thrown = Vec::new();
        for extension in &self.exception {
            for ty in extension.exceptions(expr, scope, ctx) {
                if !thrown.contains(&ty) {
                    thrown.push(ty);
                }
            }
        }
        thrown
    }

    pub fn resolving_type(&self, ty: TypeId, ctx: &ExtensionContext<'_>) -> Option<TypeId> {
        self.resolving
            .iter()
            .find_map(|extension| extension.resolving_type(ty, ctx))
    }
}

#[cfg(test)]
#[path = "../../tests/extensions_tests.rs"]
mod extensions_tests;
