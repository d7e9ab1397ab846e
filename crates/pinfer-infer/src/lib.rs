//! Lazy PHP type inference.
//!
//! Classes and functions are indexed on first request, analysed once and
//! resolved on demand:
//!
//! 1. [`index`]: run-scoped registry, filled from a [`SourceProvider`]
//! 2. [`class_analyzer`]: inheritance, traits, templates and properties
//! 3. [`analyzer`]: body analysis producing types that may hold references
//! 4. [`resolver`]: replaces references, cutting cycles with `unknown`
//!
//! [`Infer`] is the entry point for consumers.

pub mod analyzer;
mod class_analyzer;
pub mod context;
pub mod definition;
pub mod error;
mod expr;
pub mod extensions;
pub mod index;
pub mod options;
pub mod reflection;
pub mod resolver;
pub mod scope;
mod signature;
pub mod source;
mod statements;
pub mod type_hints;

use std::rc::Rc;

use pinfer_ast::{Expr, NameTable};
use pinfer_solver::{TypeId, TypeInterner, instantiate_type};
use tracing::debug;

pub use context::InferContext;
pub use definition::{ClassDefinition, ClassId, FunctionId, FunctionLikeDefinition};
pub use error::InferError;
pub use extensions::ExtensionsBroker;
pub use options::{ConfigError, InferOptions};
pub use scope::{Scope, ScopeContext};
pub use source::{ClassSource, FunctionSource, MemorySources, SourceProvider};

use crate::analyzer::FunctionAnalyzer;

/// One inference run over a set of sources.
pub struct Infer {
    ctx: InferContext,
}

impl Infer {
    /// A run with default options and the builtin extensions.
    pub fn new(sources: impl SourceProvider + 'static) -> Self {
        Self::with_options(sources, InferOptions::default())
    }

    pub fn with_options(sources: impl SourceProvider + 'static, options: InferOptions) -> Self {
        let extensions = ExtensionsBroker::with_builtins(&options);
        Self::with_extensions(sources, options, extensions)
    }

    pub fn with_extensions(
        sources: impl SourceProvider + 'static,
        options: InferOptions,
        extensions: ExtensionsBroker,
    ) -> Self {
        Infer {
            ctx: InferContext::new(Box::new(sources), extensions, options),
        }
    }

    pub fn context(&self) -> &InferContext {
        &self.ctx
    }

    /// Register more extensions. Call before the first query.
    pub fn extensions_mut(&mut self) -> &mut ExtensionsBroker {
        self.ctx.extensions_mut()
    }

    pub fn interner(&self) -> &TypeInterner {
        self.ctx.interner()
    }

    pub fn class(&self, name: &str) -> ClassId {
        self.ctx.get_class(name)
    }

    /// The method's definition plus the class it was asked on, which may
    /// have inherited it.
    fn method_id(&self, class: &str, method: &str) -> Result<(ClassId, FunctionId), InferError> {
        let id = self.ctx.get_class(class);
        self.ctx
            .with_class(id, |def| def.method(self.ctx.interner(), method))
            .map(|fid| (id, fid))
            .ok_or_else(|| InferError::UnknownMethod {
                class: class.trim_start_matches('\\').to_string(),
                method: method.to_string(),
            })
    }

    /// `$this` bound to `class`, with its `@extends` bindings applied.
    fn in_class(&self, class: ClassId, ty: TypeId) -> TypeId {
        let interner = self.ctx.interner();
        let (substitution, context) = self.ctx.with_class(class, |def| {
            (
                def.symbolic_substitution(interner),
                ScopeContext::for_class(def.name, def.parent),
            )
        });
        let ty = instantiate_type(interner, ty, &substitution);
        self.ctx.public_type(&context, ty)
    }

    fn public_return(&self, fid: FunctionId) -> TypeId {
        let return_type = self.ctx.resolve_function(fid);
        self.ctx
            .public_type(&self.ctx.function_context(fid), return_type)
    }

    /// Function type of a free function, e.g. `<TA>(TA): TA`.
    pub fn function_type(&self, name: &str) -> Result<TypeId, InferError> {
        let fid = self.ctx.get_function(name);
        if self.ctx.with_function(fid, |def| def.is_missing()) {
            return Err(InferError::UnknownFunction(
                name.trim_start_matches('\\').to_string(),
            ));
        }
        let return_type = self.public_return(fid);
        Ok(self
            .ctx
            .with_function(fid, |def| def.function_type(self.ctx.interner(), return_type)))
    }

    pub fn method_type(&self, class: &str, method: &str) -> Result<TypeId, InferError> {
        let (class, fid) = self.method_id(class, method)?;
        let return_type = self.ctx.resolve_method_for(fid, class);
        let signature = self
            .ctx
            .with_function(fid, |def| def.function_type(self.ctx.interner(), return_type));
        Ok(self.in_class(class, signature))
    }

    pub fn method_return_type(&self, class: &str, method: &str) -> Result<TypeId, InferError> {
        let (class, fid) = self.method_id(class, method)?;
        let return_type = self.ctx.resolve_method_for(fid, class);
        Ok(self.in_class(class, return_type))
    }

    pub fn property_type(&self, class: &str, property: &str) -> Result<TypeId, InferError> {
        let id = self.ctx.get_class(class);
        let interner = self.ctx.interner();
        let found = self.ctx.with_class(id, |def| {
            def.property(interner, property.trim_start_matches('$'))
                .map(|found| found.ty)
        });
        let Some(ty) = found else {
            return Err(InferError::UnknownProperty {
                class: class.trim_start_matches('\\').to_string(),
                property: property.to_string(),
            });
        };
        Ok(self.in_class(id, ty))
    }

    /// Exceptions a method throws: `@throws`, `throw` statements and what
    /// exception extensions report.
    pub fn method_exceptions(&self, class: &str, method: &str) -> Result<Vec<TypeId>, InferError> {
        let (class, fid) = self.method_id(class, method)?;
        self.ctx.ensure_analyzed(fid);
        let context = self.ctx.function_context(fid);
        let throws = self.ctx.with_function(fid, |def| def.throws.clone());
        let mut resolved: Vec<TypeId> = Vec::with_capacity(throws.len());
        for thrown in throws {
            let thrown = self.ctx.resolve(&context, thrown);
            let thrown = self.in_class(class, thrown);
            if !resolved.contains(&thrown) {
                resolved.push(thrown);
            }
        }
        Ok(resolved)
    }

    /// Type of a free-standing expression, resolved.
    pub fn expression_type(&self, expr: &Expr, names: Rc<NameTable>) -> TypeId {
        let context = ScopeContext::default();
        let mut analyzer = FunctionAnalyzer::new(&self.ctx, Scope::new(context, names));
        let ty = analyzer.infer_expr(expr);
        debug!(unresolved = %self.ctx.format(ty), "expression analyzed");
        self.ctx.public_type(&context, ty)
    }

    /// Resolve every indexed definition.
    pub fn finalize(&self) {
        self.ctx.finalize();
    }

    pub fn format(&self, ty: TypeId) -> String {
        self.ctx.format(ty)
    }
}
