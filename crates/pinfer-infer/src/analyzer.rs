//! Body analysis of function-like definitions.
//!
//! A [`FunctionAnalyzer`] walks one body with a [`Scope`], producing types
//! that may still hold references to other definitions. Expression rules live
//! in `expr.rs`, statement rules in `statements.rs`.

use std::rc::Rc;

use pinfer_ast::{Expr, FunctionDecl, NameTable};
use pinfer_solver::{DepthCounter, RecursionProfile, TypeId, instantiate_type, union_or_single};
use tracing::{debug, debug_span};

use crate::context::InferContext;
use crate::definition::{
    DefinitionState, FunctionFlags, FunctionId, FunctionLikeDefinition, FunctionOrigin,
    SelfOutSource,
};
use crate::scope::{Scope, ScopeContext};

pub struct FunctionAnalyzer<'a> {
    pub(crate) ctx: &'a InferContext,
    pub(crate) scope: Scope,
    pub(crate) returns: Vec<TypeId>,
    pub(crate) throws: Vec<TypeId>,
    pub(crate) self_out: Vec<SelfOutSource>,
    pub(crate) depth: DepthCounter,
}

impl<'a> FunctionAnalyzer<'a> {
    pub fn new(ctx: &'a InferContext, scope: Scope) -> Self {
        FunctionAnalyzer {
            ctx,
            scope,
            returns: Vec::new(),
            throws: Vec::new(),
            self_out: Vec::new(),
            depth: DepthCounter::with_profile(RecursionProfile::Expressions),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Bind parameters and visible templates before walking the body.
    fn seed(&mut self, def: &FunctionLikeDefinition, decl: &FunctionDecl) {
        let interner = self.ctx.interner();
        if let Some(class) = def.class {
            let class_id = self.ctx.get_class(&interner.resolve_atom(class));
            let templates = self.ctx.with_class(class_id, |class| class.templates.clone());
            for template in templates {
                self.scope.add_template(interner, template);
            }
        }
        for template in def.scope_templates.iter().chain(&def.templates) {
            self.scope.add_template(interner, *template);
        }

        for param in &def.params {
            let ty = if param.variadic {
                interner.array(None, param.ty)
            } else {
                param.ty
            };
            self.scope
                .set_variable(&interner.resolve_atom_ref(param.name), ty);
        }

        // Promoted parameters assign their property on construction.
        if decl.name.eq_ignore_ascii_case("__construct") {
            for (param, definition) in decl.params.iter().zip(&def.params) {
                if param.promoted.is_some() {
                    self.record_property_assignment(&param.name, definition.ty);
                }
            }
        }
    }

    /// `$this->name = value`: a self-out contribution when the property is
    /// typed by a class template.
    pub(crate) fn record_property_assignment(&mut self, name: &str, value: TypeId) {
        let Some(class) = self.scope.context.class else {
            return;
        };
        let interner = self.ctx.interner();
        let class_id = self.ctx.get_class(&interner.resolve_atom(class));
        let template = self.ctx.with_class(class_id, |class| {
            class
                .property(interner, name)
                .map(|property| property.ty)
                .filter(|ty| class.is_template(*ty))
        });
        if let Some(template) = template {
            self.self_out
                .push(SelfOutSource::Assignment { template, value });
        }
    }

    /// Union of every `return`; `void` when the body never returns a value.
    pub fn return_type(&self) -> TypeId {
        if self.returns.is_empty() {
            return TypeId::VOID;
        }
        union_or_single(self.ctx.interner(), self.returns.clone())
    }
}

/// Type of a constant expression: a parameter default, property default or
/// class constant.
pub(crate) fn evaluate_initializer(
    ctx: &InferContext,
    context: ScopeContext,
    names: Rc<NameTable>,
    expr: &Expr,
) -> TypeId {
    let mut analyzer = FunctionAnalyzer::new(ctx, Scope::new(context, names));
    analyzer.infer_expr(expr)
}

impl InferContext {
    /// Scope a definition's body and references resolve in.
    pub fn function_context(&self, fid: FunctionId) -> ScopeContext {
        let (class, is_static) = self.with_function(fid, |def| (def.class, def.is_static()));
        let parent = class.and_then(|class| {
            let id = self.get_class(&self.interner().resolve_atom(class));
            self.with_class(id, |def| def.parent)
        });
        ScopeContext {
            class,
            parent,
            called: None,
            function: Some(fid),
            is_static,
        }
    }

    /// Walk the body of a pending definition once.
    pub(crate) fn ensure_analyzed(&self, fid: FunctionId) {
        let def = self.with_function(fid, |def| {
            (def.state == DefinitionState::Pending).then(|| def.clone())
        });
        let Some(def) = def else {
            return;
        };
        let FunctionOrigin::Ast { decl, names } = def.origin.clone() else {
            self.update_function(fid, |def| def.state = DefinitionState::Analyzed);
            return;
        };
        self.update_function(fid, |def| def.state = DefinitionState::Analyzing);

        let interner = self.interner();
        let name = interner.resolve_atom(def.name);
        let _span = debug_span!("analyze", function = %name).entered();

        let context = self.function_context(fid);
        let mut analyzer = FunctionAnalyzer::new(self, Scope::new(context, names));
        analyzer.seed(&def, &decl);
        analyzer.analyze_body(&decl.body);

        let bodiless = def.flags.contains(FunctionFlags::ABSTRACT) && decl.body.is_empty();
        let return_type = if bodiless {
            TypeId::UNKNOWN
        } else {
            analyzer.return_type()
        };
        let substitution = &def.substitution;
        let return_type = instantiate_type(interner, return_type, substitution);
        let throws: Vec<TypeId> = analyzer
            .throws
            .iter()
            .map(|ty| instantiate_type(interner, *ty, substitution))
            .collect();
        let self_out: Vec<SelfOutSource> = analyzer
            .self_out
            .into_iter()
            .map(|source| match source {
                SelfOutSource::Assignment { template, value } => SelfOutSource::Assignment {
                    template: instantiate_type(interner, template, substitution),
                    value: instantiate_type(interner, value, substitution),
                },
                call => call,
            })
            .collect();
        debug!(
            function = %name,
            return_type = %interner.format(return_type),
            self_out = self_out.len(),
            "analyzed"
        );

        self.update_function(fid, |def| {
            def.return_type = return_type;
            def.analyzed_return = return_type;
            for thrown in throws {
                if !def.throws.contains(&thrown) {
                    def.throws.push(thrown);
                }
            }
            def.self_out = self_out;
            def.state = DefinitionState::Analyzed;
        });

        if self.options().resolve_on_analysis {
            self.resolve_function(fid);
        }
    }
}

#[cfg(test)]
#[path = "../tests/analyzer_tests.rs"]
mod analyzer_tests;
