//! Function-like and class definitions.
//!
//! Definitions live in the [`Index`](crate::index::Index) and are addressed
//! by [`FunctionId`] / [`ClassId`]. Holders keep the id, never a copy, so a
//! definition resolved later is observed with its final type everywhere.

use bitflags::bitflags;
use indexmap::IndexMap;
use pinfer_ast::{ClassDecl, ClassKind, FunctionDecl, NameTable};
use pinfer_common::Atom;
use pinfer_solver::{
    CallArg, FunctionShape, ParamInfo, TypeId, TypeInterner, TypeSubstitution, instantiate_type,
};
use std::rc::Rc;

use crate::reflection::ReflectedClass;

/// Handle to a function-like definition (function, method, trait method).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

/// Handle to a class definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefinitionState {
    /// Signature known, body not analysed yet.
    Pending,
    Analyzing,
    /// Return type may still hold references.
    Analyzed,
    Resolving,
    Resolved,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FunctionFlags: u8 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        /// Built from a reflection signature; no body.
        const REFLECTED = 1 << 2;
        /// Copied into a class from a used trait.
        const FROM_TRAIT = 1 << 3;
        /// Placeholder for a name no provider knows.
        const MISSING = 1 << 4;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamDefinition {
    pub name: Atom,
    pub ty: TypeId,
    pub default: Option<TypeId>,
    pub variadic: bool,
}

#[derive(Clone, Debug)]
pub enum FunctionOrigin {
    Ast {
        decl: Rc<FunctionDecl>,
        names: Rc<NameTable>,
    },
    Reflection,
    Missing,
}

/// One contribution of a method to its receiver's class template arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum SelfOutSource {
    /// `$this->prop = <value>` where `prop` is typed by a class template.
    Assignment { template: TypeId, value: TypeId },
    /// `parent::__construct(...)` or `$this->setter(...)`.
    Call {
        parent: bool,
        method: Atom,
        args: Vec<CallArg>,
    },
}

#[derive(Clone, Debug)]
pub struct FunctionLikeDefinition {
    pub name: Atom,
    /// Class the definition belongs to; for trait methods the using class.
    pub class: Option<Atom>,
    pub templates: Vec<TypeId>,
    pub params: Vec<ParamDefinition>,
    pub declared_return: Option<TypeId>,
    /// Inferred type; may hold references until resolved.
    pub return_type: TypeId,
    /// Body type as analysed, kept after resolution for late static binding.
    pub analyzed_return: TypeId,
    pub throws: Vec<TypeId>,
    pub flags: FunctionFlags,
    pub state: DefinitionState,
    pub origin: FunctionOrigin,
    pub self_out: Vec<SelfOutSource>,
    /// Templates visible in the body besides the class's own (trait templates).
    pub scope_templates: Vec<TypeId>,
    /// Applied to the analysed body (trait template arguments).
    pub substitution: TypeSubstitution,
}

impl FunctionLikeDefinition {
    pub fn new(name: Atom, class: Option<Atom>, origin: FunctionOrigin) -> Self {
        FunctionLikeDefinition {
            name,
            class,
            templates: Vec::new(),
            params: Vec::new(),
            declared_return: None,
            return_type: TypeId::UNKNOWN,
            analyzed_return: TypeId::UNKNOWN,
            throws: Vec::new(),
            flags: FunctionFlags::empty(),
            state: DefinitionState::Pending,
            origin,
            self_out: Vec::new(),
            scope_templates: Vec::new(),
            substitution: TypeSubstitution::new(),
        }
    }

    /// Definition for a name nobody provides: no parameters, `unknown` return.
    pub fn missing(name: Atom) -> Self {
        FunctionLikeDefinition {
            flags: FunctionFlags::MISSING,
            state: DefinitionState::Resolved,
            ..Self::new(name, None, FunctionOrigin::Missing)
        }
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(FunctionFlags::STATIC)
    }

    pub fn is_missing(&self) -> bool {
        self.flags.contains(FunctionFlags::MISSING)
    }

    pub fn param_infos(&self) -> Vec<ParamInfo> {
        self.params
            .iter()
            .map(|param| ParamInfo {
                name: param.name,
                ty: param.ty,
                optional: param.default.is_some(),
                variadic: param.variadic,
            })
            .collect()
    }

    /// The function type with the given return type.
    pub fn function_type(&self, interner: &TypeInterner, return_type: TypeId) -> TypeId {
        interner.function(FunctionShape {
            templates: self.templates.clone(),
            params: self.param_infos(),
            return_type,
        })
    }

    /// Apply the trait substitution to the signature.
    pub(crate) fn substitute_signature(&mut self, interner: &TypeInterner) {
        if self.substitution.is_empty() {
            return;
        }
        for param in &mut self.params {
            param.ty = instantiate_type(interner, param.ty, &self.substitution);
        }
        self.declared_return = self
            .declared_return
            .map(|ty| instantiate_type(interner, ty, &self.substitution));
        for thrown in &mut self.throws {
            *thrown = instantiate_type(interner, *thrown, &self.substitution);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDefinition {
    pub name: Atom,
    pub ty: TypeId,
    pub default: Option<TypeId>,
    pub is_static: bool,
    pub declaring_class: Atom,
}

#[derive(Clone, Debug)]
pub enum ClassOrigin {
    Ast {
        decl: Rc<ClassDecl>,
        names: Rc<NameTable>,
    },
    Reflection(Rc<ReflectedClass>),
    Missing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassState {
    /// Registered, members not built yet (ancestor cycles see this).
    Building,
    Ready,
}

#[derive(Clone, Debug)]
pub struct ClassDefinition {
    pub name: Atom,
    pub kind: ClassKind,
    pub parent: Option<Atom>,
    pub interfaces: Vec<Atom>,
    /// Every parent and interface, transitively.
    pub ancestors: Vec<Atom>,
    /// Own templates, then unbound inherited ones, then property templates.
    pub templates: Vec<TypeId>,
    /// Ancestor templates bound by `@extends`, in terms of `templates`.
    pub ancestor_bindings: TypeSubstitution,
    pub properties: IndexMap<Atom, PropertyDefinition>,
    pub constants: IndexMap<Atom, TypeId>,
    /// Keyed by the lowercased method name.
    pub methods: IndexMap<Atom, FunctionId>,
    pub origin: ClassOrigin,
    pub state: ClassState,
}

impl ClassDefinition {
    pub fn new(name: Atom, origin: ClassOrigin) -> Self {
        ClassDefinition {
            name,
            kind: ClassKind::Class,
            parent: None,
            interfaces: Vec::new(),
            ancestors: Vec::new(),
            templates: Vec::new(),
            ancestor_bindings: TypeSubstitution::new(),
            properties: IndexMap::new(),
            constants: IndexMap::new(),
            methods: IndexMap::new(),
            origin,
            state: ClassState::Building,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.origin, ClassOrigin::Missing)
    }

    pub fn method(&self, interner: &TypeInterner, name: &str) -> Option<FunctionId> {
        let key = interner.intern_string(&name.to_ascii_lowercase());
        self.methods.get(&key).copied()
    }

    pub fn property(&self, interner: &TypeInterner, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get(&interner.intern_string(name))
    }

    pub fn is_template(&self, ty: TypeId) -> bool {
        self.templates.contains(&ty)
    }

    /// Substitution for an instance with the given template arguments.
    ///
    /// Missing arguments take the template default, then `unknown`; ancestor
    /// templates bound by `@extends` follow.
    pub fn substitution_for(&self, interner: &TypeInterner, args: &[TypeId]) -> TypeSubstitution {
        let mut substitution = TypeSubstitution::from_args(interner, &self.templates, args);
        self.bind_ancestors(interner, &mut substitution);
        substitution
    }

    /// Substitution inside the class itself: own templates stay symbolic.
    pub fn symbolic_substitution(&self, interner: &TypeInterner) -> TypeSubstitution {
        let mut substitution = TypeSubstitution::new();
        self.bind_ancestors(interner, &mut substitution);
        substitution
    }

    fn bind_ancestors(&self, interner: &TypeInterner, substitution: &mut TypeSubstitution) {
        let bound: Vec<(TypeId, TypeId)> = self
            .ancestor_bindings
            .iter()
            .map(|(template, value)| (template, instantiate_type(interner, value, substitution)))
            .collect();
        for (template, value) in bound {
            if substitution.get(template).is_none() {
                substitution.insert(template, value);
            }
        }
    }

    /// `Foo<args>` for generic classes, `Foo` otherwise.
    pub fn instance_type(&self, interner: &TypeInterner, args: Vec<TypeId>) -> TypeId {
        if self.templates.is_empty() {
            interner.object_atom(self.name)
        } else {
            interner.generic(self.name, args)
        }
    }

    /// Template arguments of a receiver of this class.
    pub fn receiver_args(&self, interner: &TypeInterner, receiver: TypeId) -> Vec<TypeId> {
        let given: Vec<TypeId> = match interner.lookup(receiver) {
            Some(pinfer_solver::TypeData::Generic(id)) => interner.generic_type(id).args.clone(),
            _ => Vec::new(),
        };
        self.templates
            .iter()
            .enumerate()
            .map(|(index, template)| {
                given.get(index).copied().unwrap_or_else(|| {
                    interner
                        .template_of(*template)
                        .and_then(|info| info.default)
                        .unwrap_or(TypeId::UNKNOWN)
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/definition_tests.rs"]
mod definition_tests;
