//! Function-like definitions from declarations and reflection signatures.

use std::rc::Rc;

use pinfer_ast::{Expr, FunctionDecl, NameTable};
use pinfer_common::Atom;
use pinfer_solver::{TemplateInfo, TypeId};
use tracing::trace;

use crate::analyzer::evaluate_initializer;
use crate::context::InferContext;
use crate::definition::{
    DefinitionState, FunctionFlags, FunctionLikeDefinition, FunctionOrigin, ParamDefinition,
};
use crate::reflection::{ReflectedFunction, ReflectedMethod, ReflectedParam};
use crate::scope::ScopeContext;
use crate::type_hints::{HintContext, template_name_for};

pub(crate) struct SignatureBuilder<'a> {
    ctx: &'a InferContext,
    class: Option<Atom>,
    parent: Option<Atom>,
    /// Templates hints may name besides the function's own.
    templates: Vec<TypeId>,
}

impl<'a> SignatureBuilder<'a> {
    pub fn new(ctx: &'a InferContext, class: Option<Atom>, parent: Option<Atom>) -> Self {
        SignatureBuilder {
            ctx,
            class,
            parent,
            templates: Vec::new(),
        }
    }

    pub fn with_templates(mut self, templates: &[TypeId]) -> Self {
        self.templates.extend_from_slice(templates);
        self
    }

    fn owner(&self, name: Atom) -> Atom {
        let interner = self.ctx.interner();
        match self.class {
            Some(class) => interner.intern_string(&format!(
                "{}::{}",
                interner.resolve_atom_ref(class),
                interner.resolve_atom_ref(name)
            )),
            None => name,
        }
    }

    fn initializer(&self, names: &Rc<NameTable>, expr: &Expr) -> TypeId {
        let context = ScopeContext {
            class: self.class,
            parent: self.parent,
            called: None,
            function: None,
            is_static: true,
        };
        evaluate_initializer(self.ctx, context, names.clone(), expr)
    }

    /// Definition of a source function or method; the body is analysed later.
    pub fn function(
        &self,
        decl: &Rc<FunctionDecl>,
        names: &Rc<NameTable>,
        name: Atom,
    ) -> FunctionLikeDefinition {
        let interner = self.ctx.interner();
        let owner = self.owner(name);
        let mut hints = HintContext::new(interner, names, self.class, self.parent)
            .with_templates(self.templates.iter().copied());
        let mut templates = hints.declare(&decl.templates, owner);

        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let default = param
                .default
                .as_ref()
                .map(|expr| self.initializer(names, expr));
            let ty = match param.declared_type() {
                // `Foo $x = null` is implicitly nullable.
                Some(hint) if default == Some(TypeId::NULL) => {
                    interner.union2(hints.resolve(hint), TypeId::NULL)
                }
                Some(hint) => hints.resolve(hint),
                None if self.ctx.options().untyped_parameters_as_templates => {
                    let template = interner.template(TemplateInfo {
                        name: interner.intern_string(&template_name_for(&param.name)),
                        owner,
                        bound: None,
                        default,
                    });
                    templates.push(template);
                    template
                }
                None => TypeId::MIXED,
            };
            params.push(ParamDefinition {
                name: interner.intern_string(&param.name),
                ty,
                default,
                variadic: param.variadic,
            });
        }

        let mut def = FunctionLikeDefinition::new(
            name,
            self.class,
            FunctionOrigin::Ast {
                decl: decl.clone(),
                names: names.clone(),
            },
        );
        def.templates = templates;
        def.params = params;
        def.declared_return = decl.declared_return().map(|hint| hints.resolve(hint));
        def.throws = decl
            .doc_throws
            .iter()
            .map(|hint| hints.resolve(hint))
            .collect();
        if decl.is_static {
            def.flags |= FunctionFlags::STATIC;
        }
        if decl.is_abstract {
            def.flags |= FunctionFlags::ABSTRACT;
        }
        trace!(function = %decl.name, params = def.params.len(), "built signature");
        def
    }

    fn reflected_params(&self, hints: &HintContext<'_>, params: &[ReflectedParam]) -> Vec<ParamDefinition> {
        let interner = self.ctx.interner();
        params
            .iter()
            .map(|param| ParamDefinition {
                name: interner.intern_string(&param.name),
                ty: param
                    .type_hint
                    .as_ref()
                    .map(|hint| hints.resolve(hint))
                    .unwrap_or(TypeId::MIXED),
                default: param.has_default.then_some(TypeId::UNKNOWN),
                variadic: param.variadic,
            })
            .collect()
    }

    /// Shallow definition: the declared return is the return type.
    pub fn reflected_method(&self, method: &ReflectedMethod) -> FunctionLikeDefinition {
        let interner = self.ctx.interner();
        let name = interner.intern_string(&method.name);
        let names = NameTable::new();
        let mut hints = HintContext::new(interner, &names, self.class, self.parent)
            .with_templates(self.templates.iter().copied());
        let templates = hints.declare(&method.templates, self.owner(name));
        let declared = method.return_type.as_ref().map(|hint| hints.resolve(hint));

        let mut def = FunctionLikeDefinition::new(name, self.class, FunctionOrigin::Reflection);
        def.templates = templates;
        def.params = self.reflected_params(&hints, &method.params);
        def.declared_return = declared;
        def.return_type = declared.unwrap_or(TypeId::UNKNOWN);
        def.state = DefinitionState::Analyzed;
        def.flags |= FunctionFlags::REFLECTED;
        if method.is_static {
            def.flags |= FunctionFlags::STATIC;
        }
        def
    }

    pub fn reflected_function(&self, function: &ReflectedFunction) -> FunctionLikeDefinition {
        let interner = self.ctx.interner();
        let name = interner.intern_string(function.name.trim_start_matches('\\'));
        let names = NameTable::new();
        let mut hints = HintContext::new(interner, &names, None, None);
        let templates = hints.declare(&function.templates, name);
        let declared = function.return_type.as_ref().map(|hint| hints.resolve(hint));

        let mut def = FunctionLikeDefinition::new(name, None, FunctionOrigin::Reflection);
        def.templates = templates;
        def.params = self.reflected_params(&hints, &function.params);
        def.declared_return = declared;
        def.return_type = declared.unwrap_or(TypeId::UNKNOWN);
        def.state = DefinitionState::Analyzed;
        def.flags |= FunctionFlags::REFLECTED;
        def
    }
}
