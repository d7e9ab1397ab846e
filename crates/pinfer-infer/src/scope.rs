//! Lexical scope of the expression being analysed.

use std::rc::Rc;

use pinfer_ast::NameTable;
use pinfer_common::Atom;
use pinfer_solver::{TypeId, TypeInterner};
use rustc_hash::FxHashMap;

use crate::definition::FunctionId;
use crate::type_hints::HintContext;

/// Where a piece of code lives: enough to bind `self`, `static`, `parent`
/// and `$this`. Also what the resolver needs to resolve a definition's
/// references later.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScopeContext {
    /// Class the code is written in; `self::` binds here.
    pub class: Option<Atom>,
    pub parent: Option<Atom>,
    /// Class the code runs for when it differs from `class` (an inherited
    /// method called on a subclass). `static::` and `$this` bind here.
    pub called: Option<Atom>,
    pub function: Option<FunctionId>,
    pub is_static: bool,
}

impl ScopeContext {
    pub fn for_class(class: Atom, parent: Option<Atom>) -> Self {
        ScopeContext {
            class: Some(class),
            parent,
            called: None,
            function: None,
            is_static: false,
        }
    }

    /// Late static binding for an inherited body.
    pub fn called_as(self, class: Atom) -> Self {
        ScopeContext {
            called: (self.class != Some(class)).then_some(class),
            ..self
        }
    }

    /// Class `static::` and `$this` refer to.
    pub fn late_class(&self) -> Option<Atom> {
        self.called.or(self.class)
    }

    pub fn in_function(self, function: FunctionId, is_static: bool) -> Self {
        ScopeContext {
            function: Some(function),
            is_static,
            ..self
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub context: ScopeContext,
    names: Rc<NameTable>,
    variables: FxHashMap<String, TypeId>,
    templates: FxHashMap<String, TypeId>,
}

impl Scope {
    pub fn new(context: ScopeContext, names: Rc<NameTable>) -> Self {
        Scope {
            context,
            names,
            variables: FxHashMap::default(),
            templates: FxHashMap::default(),
        }
    }

    pub fn names(&self) -> &Rc<NameTable> {
        &self.names
    }

    /// Current type of a variable; `unknown` when never assigned.
    ///
    /// `$this` is the late-bound receiver inside non-static class code.
    pub fn get_variable(&self, name: &str) -> TypeId {
        if let Some(ty) = self.variables.get(name) {
            return *ty;
        }
        if name == "this" && self.context.class.is_some() && !self.context.is_static {
            return TypeId::THIS;
        }
        TypeId::UNKNOWN
    }

    pub fn set_variable(&mut self, name: &str, ty: TypeId) {
        if name == "this" {
            return;
        }
        self.variables.insert(name.to_string(), ty);
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn remove_variable(&mut self, name: &str) {
        self.variables.remove(name);
    }

    pub fn variables(&self) -> &FxHashMap<String, TypeId> {
        &self.variables
    }

    pub fn replace_variables(&mut self, variables: FxHashMap<String, TypeId>) {
        self.variables = variables;
    }

    pub fn add_template(&mut self, interner: &TypeInterner, template: TypeId) {
        if let Some(info) = interner.template_of(template) {
            self.templates
                .insert(interner.resolve_atom(info.name), template);
        }
    }

    pub fn template(&self, name: &str) -> Option<TypeId> {
        self.templates.get(name).copied()
    }

    pub fn resolve_class_name(&self, name: &str) -> String {
        self.names.resolve_class(name)
    }

    pub fn resolve_function_name(&self, name: &str) -> String {
        self.names.resolve_function(name)
    }

    pub fn hint_context<'a>(&'a self, interner: &'a TypeInterner) -> HintContext<'a> {
        HintContext::new(interner, &self.names, self.context.class, self.context.parent)
            .with_templates(self.templates.values().copied())
    }

    /// Fresh variable table sharing names, templates and context.
    pub fn child(&self) -> Scope {
        Scope {
            context: self.context,
            names: self.names.clone(),
            variables: FxHashMap::default(),
            templates: self.templates.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod scope_tests;
