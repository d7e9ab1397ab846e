//! Class definitions: inheritance, templates, properties, traits, methods.
//!
//! A class is registered in the Index as a placeholder before its members
//! are built, so an ancestor cycle (or a member initializer naming the class
//! itself) sees the placeholder instead of recursing.

use std::rc::Rc;

use pinfer_ast::{ClassDecl, ClassKind, NameTable, TraitUse};
use pinfer_common::Atom;
use pinfer_solver::{TemplateInfo, TypeId, TypeSubstitution, instantiate_type};
use rustc_hash::FxHashSet;
use tracing::{debug, debug_span, trace};

use crate::analyzer::evaluate_initializer;
use crate::context::InferContext;
use crate::definition::{
    ClassDefinition, ClassId, ClassOrigin, ClassState, FunctionFlags, PropertyDefinition,
};
use crate::reflection::ReflectedClass;
use crate::scope::ScopeContext;
use crate::signature::SignatureBuilder;
use crate::source::ClassSource;
use crate::type_hints::{HintContext, template_name_for};

pub(crate) struct ClassAnalyzer<'a> {
    ctx: &'a InferContext,
}

impl<'a> ClassAnalyzer<'a> {
    pub fn new(ctx: &'a InferContext) -> Self {
        ClassAnalyzer { ctx }
    }

    pub fn analyze(&self, name: &str) -> ClassId {
        let interner = self.ctx.interner();
        let source = self.ctx.sources().class(name);
        let (canonical, origin) = match &source {
            ClassSource::Ast { decl, names } => (
                decl.name.trim_start_matches('\\').to_string(),
                ClassOrigin::Ast {
                    decl: decl.clone(),
                    names: names.clone(),
                },
            ),
            ClassSource::Reflection(reflected) => (
                reflected.name.trim_start_matches('\\').to_string(),
                ClassOrigin::Reflection(reflected.clone()),
            ),
            ClassSource::Missing => (name.to_string(), ClassOrigin::Missing),
        };
        let atom = interner.intern_string(&canonical);
        let id = self
            .ctx
            .index_mut()
            .insert_class(name, ClassDefinition::new(atom, origin));

        let _span = debug_span!("class_analysis", class = %canonical).entered();
        let mut def = match source {
            ClassSource::Ast { decl, names } => self.build_from_source(id, atom, &decl, &names),
            ClassSource::Reflection(reflected) => self.build_from_reflection(atom, &reflected),
            ClassSource::Missing => {
                debug!(class = %canonical, "class not found, using empty definition");
                ClassDefinition::new(atom, ClassOrigin::Missing)
            }
        };
        def.state = ClassState::Ready;
        debug!(
            class = %canonical,
            templates = def.templates.len(),
            methods = def.methods.len(),
            "class ready"
        );
        self.ctx.index_mut().replace_class(id, def);
        id
    }

    fn parent_definition(&self, parent: Option<Atom>) -> Option<ClassDefinition> {
        let parent = parent?;
        let interner = self.ctx.interner();
        let id = self.ctx.get_class(&interner.resolve_atom(parent));
        Some(self.ctx.with_class(id, |def| def.clone()))
    }

    /// Copy the parent's members and bind its templates to `@extends` args.
    fn inherit(&self, def: &mut ClassDefinition, parent: &ClassDefinition, args: &[TypeId]) {
        let interner = self.ctx.interner();
        let mut bound = TypeSubstitution::new();
        for (index, template) in parent.templates.iter().enumerate() {
            match args.get(index) {
                Some(arg) => bound.insert(*template, *arg),
                None => def.templates.push(*template),
            }
        }
        for (template, value) in parent.ancestor_bindings.iter() {
            def.ancestor_bindings
                .insert(template, instantiate_type(interner, value, &bound));
        }
        for (template, value) in bound.iter() {
            def.ancestor_bindings.insert(template, value);
        }

        def.ancestors.push(parent.name);
        for ancestor in &parent.ancestors {
            if !def.ancestors.contains(ancestor) {
                def.ancestors.push(*ancestor);
            }
        }
        for (name, property) in &parent.properties {
            let mut property = property.clone();
            property.ty = instantiate_type(interner, property.ty, &bound);
            def.properties.insert(*name, property);
        }
        for (name, value) in &parent.constants {
            def.constants.insert(*name, *value);
        }
        for (name, method) in &parent.methods {
            def.methods.insert(*name, *method);
        }
    }

    fn add_interfaces(&self, def: &mut ClassDefinition, interfaces: Vec<String>) {
        let interner = self.ctx.interner();
        for interface in interfaces {
            let atom = interner.intern_string(&interface);
            def.interfaces.push(atom);
            let id = self.ctx.get_class(&interface);
            let inherited = self.ctx.with_class(id, |iface| iface.ancestors.clone());
            for ancestor in std::iter::once(atom).chain(inherited) {
                if !def.ancestors.contains(&ancestor) {
                    def.ancestors.push(ancestor);
                }
            }
        }
    }

    fn build_from_source(
        &self,
        id: ClassId,
        atom: Atom,
        decl: &Rc<ClassDecl>,
        names: &Rc<NameTable>,
    ) -> ClassDefinition {
        let interner = self.ctx.interner();
        let mut def = ClassDefinition::new(
            atom,
            ClassOrigin::Ast {
                decl: decl.clone(),
                names: names.clone(),
            },
        );
        def.kind = decl.kind;
        def.parent = decl
            .parent
            .as_ref()
            .map(|parent| interner.intern_string(&names.resolve_class(parent)));

        let mut hints = HintContext::new(interner, names, Some(atom), def.parent);
        def.templates = hints.declare(&decl.templates, atom);

        if let Some(parent) = self.parent_definition(def.parent) {
            let args: Vec<TypeId> = decl
                .extends_args
                .iter()
                .map(|hint| hints.resolve(hint))
                .collect();
            self.inherit(&mut def, &parent, &args);
        }
        // Unbound inherited templates stay nameable in member hints.
        let hints = hints.with_templates(def.templates.iter().copied());
        let declared_templates = def.templates.clone();

        self.add_interfaces(
            &mut def,
            decl.interfaces
                .iter()
                .map(|interface| names.resolve_class(interface))
                .collect(),
        );

        let context = ScopeContext::for_class(atom, def.parent);
        for constant in &decl.constants {
            let value = evaluate_initializer(self.ctx, context, names.clone(), &constant.value);
            def.constants
                .insert(interner.intern_string(&constant.name), value);
            // Later initializers may read `self::NAME`.
            self.ctx.index_mut().class_mut(id).constants = def.constants.clone();
        }

        for property in &decl.properties {
            let default = property
                .default
                .as_ref()
                .map(|expr| evaluate_initializer(self.ctx, context, names.clone(), expr));
            let ty = match property.declared_type() {
                Some(hint) => hints.resolve(hint),
                None if property.is_static => default.unwrap_or(TypeId::UNKNOWN),
                None => self.property_template(&mut def, &property.name, default),
            };
            let name = interner.intern_string(&property.name);
            def.properties.insert(
                name,
                PropertyDefinition {
                    name,
                    ty,
                    default,
                    is_static: property.is_static,
                    declaring_class: atom,
                },
            );
        }

        if let Some(constructor) = decl.method("__construct") {
            for param in constructor.params.iter().filter(|param| param.promoted.is_some()) {
                let default = param
                    .default
                    .as_ref()
                    .map(|expr| evaluate_initializer(self.ctx, context, names.clone(), expr));
                let ty = match param.declared_type() {
                    Some(hint) => hints.resolve(hint),
                    None => self.property_template(&mut def, &param.name, default),
                };
                let name = interner.intern_string(&param.name);
                def.properties.insert(
                    name,
                    PropertyDefinition {
                        name,
                        ty,
                        default,
                        is_static: false,
                        declaring_class: atom,
                    },
                );
            }
        }

        let mut visited = FxHashSet::default();
        for trait_use in &decl.traits {
            self.compose_trait(&mut def, &hints, &TypeSubstitution::new(), trait_use, &mut visited);
        }

        let builder =
            SignatureBuilder::new(self.ctx, Some(atom), def.parent).with_templates(&declared_templates);
        for method in &decl.methods {
            let mut function = builder.function(method, names, interner.intern_string(&method.name));
            if decl.kind == ClassKind::Interface {
                function.flags |= FunctionFlags::ABSTRACT;
            }
            let key = interner.intern_string(&method.name.to_ascii_lowercase());
            let fid = self.ctx.index_mut().add_function(function);
            def.methods.insert(key, fid);
        }
        def
    }

    /// Untyped property: a fresh class template defaulting to its initializer.
    fn property_template(
        &self,
        def: &mut ClassDefinition,
        property: &str,
        default: Option<TypeId>,
    ) -> TypeId {
        let interner = self.ctx.interner();
        let template = interner.template(TemplateInfo {
            name: interner.intern_string(&template_name_for(property)),
            owner: def.name,
            bound: None,
            default,
        });
        if !def.templates.contains(&template) {
            def.templates.push(template);
        }
        template
    }

    /// Copy a trait's properties and methods into `def`.
    ///
    /// `outer` carries the template arguments of an enclosing trait when
    /// traits use traits.
    fn compose_trait(
        &self,
        def: &mut ClassDefinition,
        hints: &HintContext<'_>,
        outer: &TypeSubstitution,
        trait_use: &TraitUse,
        visited: &mut FxHashSet<String>,
    ) {
        let interner = self.ctx.interner();
        let trait_name = hints.resolve_class_name(&trait_use.name);
        if !visited.insert(trait_name.to_ascii_lowercase()) {
            return;
        }
        let trait_id = self.ctx.get_class(&trait_name);
        let trait_def = self.ctx.with_class(trait_id, |def| def.clone());
        let ClassOrigin::Ast {
            decl: trait_decl,
            names: trait_names,
        } = &trait_def.origin
        else {
            trace!(trait_name = %trait_name, "trait without source, nothing to compose");
            return;
        };

        let declared = &trait_def.templates[..trait_decl.templates.len().min(trait_def.templates.len())];
        let args: Vec<TypeId> = trait_use
            .type_args
            .iter()
            .map(|hint| instantiate_type(interner, hints.resolve(hint), outer))
            .collect();
        let mut substitution = TypeSubstitution::from_args(interner, declared, &args);

        // Untyped trait properties become templates of the using class.
        for property in trait_def.properties.values() {
            let is_property_template = interner
                .template_of(property.ty)
                .is_some_and(|info| info.owner == trait_def.name)
                && !declared.contains(&property.ty);
            if is_property_template {
                let info = interner.template_of(property.ty);
                let default = info.and_then(|info| info.default);
                let name = interner.resolve_atom(property.name);
                let own = self.property_template(def, &name, default);
                substitution.insert(property.ty, own);
            }
        }
        for property in trait_def.properties.values() {
            let mut property = property.clone();
            property.ty = instantiate_type(interner, property.ty, &substitution);
            property.default = property
                .default
                .map(|ty| instantiate_type(interner, ty, &substitution));
            property.declaring_class = def.name;
            def.properties.insert(property.name, property);
        }
        for (name, value) in &trait_def.constants {
            def.constants.insert(*name, *value);
        }

        let trait_hints = HintContext::new(interner, trait_names, Some(def.name), def.parent)
            .with_templates(declared.iter().copied());
        for nested in &trait_decl.traits {
            self.compose_trait(def, &trait_hints, &substitution, nested, visited);
        }

        let builder = SignatureBuilder::new(self.ctx, Some(def.name), def.parent)
            .with_templates(declared);
        for method in &trait_decl.methods {
            let mut function =
                builder.function(method, trait_names, interner.intern_string(&method.name));
            function.flags |= FunctionFlags::FROM_TRAIT;
            function.scope_templates = declared.to_vec();
            function.substitution = substitution.clone();
            function.substitute_signature(interner);
            let key = interner.intern_string(&method.name.to_ascii_lowercase());
            let fid = self.ctx.index_mut().add_function(function);
            def.methods.insert(key, fid);
        }
        debug!(
            class = %interner.resolve_atom_ref(def.name),
            trait_name = %trait_name,
            "composed trait"
        );
    }

    fn build_from_reflection(&self, atom: Atom, reflected: &Rc<ReflectedClass>) -> ClassDefinition {
        let interner = self.ctx.interner();
        let names = NameTable::new();
        let mut def = ClassDefinition::new(atom, ClassOrigin::Reflection(reflected.clone()));
        def.parent = reflected
            .parent
            .as_ref()
            .map(|parent| interner.intern_string(parent.trim_start_matches('\\')));

        let mut hints = HintContext::new(interner, &names, Some(atom), def.parent);
        def.templates = hints.declare(&reflected.templates, atom);
        if let Some(parent) = self.parent_definition(def.parent) {
            let args: Vec<TypeId> = reflected
                .extends_args
                .iter()
                .map(|hint| hints.resolve(hint))
                .collect();
            self.inherit(&mut def, &parent, &args);
        }
        let hints = hints.with_templates(def.templates.iter().copied());
        self.add_interfaces(
            &mut def,
            reflected
                .interfaces
                .iter()
                .map(|interface| interface.trim_start_matches('\\').to_string())
                .collect(),
        );

        for property in &reflected.properties {
            let name = interner.intern_string(&property.name);
            let ty = property
                .type_hint
                .as_ref()
                .map(|hint| hints.resolve(hint))
                .unwrap_or(TypeId::UNKNOWN);
            def.properties.insert(
                name,
                PropertyDefinition {
                    name,
                    ty,
                    default: None,
                    is_static: property.is_static,
                    declaring_class: atom,
                },
            );
        }

        let builder =
            SignatureBuilder::new(self.ctx, Some(atom), def.parent).with_templates(&def.templates);
        for method in &reflected.methods {
            let function = builder.reflected_method(method);
            let key = interner.intern_string(&method.name.to_ascii_lowercase());
            let fid = self.ctx.index_mut().add_function(function);
            def.methods.insert(key, fid);
        }
        def
    }
}

#[cfg(test)]
#[path = "../tests/class_analyzer_tests.rs"]
mod class_analyzer_tests;
