//! Reference resolution.
//!
//! Body analysis leaves calls, `new` and member fetches as reference types.
//! The resolver replaces them with the types they stand for, analysing and
//! resolving the target definitions on demand. Cycles between definitions are
//! cut by a [`RecursionGuard`]: a re-entrant definition contributes `unknown`,
//! and every definition resolved while such a cycle is open is left
//! unmemoized so the late pass can revisit it.

use pinfer_common::Atom;
use pinfer_solver::visitor::{
    contains_generics, contains_references, contains_this, contains_type_matching, map_children,
};
use pinfer_solver::{
    CallArg, CalleeRef, ClassRefKind, LiteralValue, RecursionGuard, RecursionProfile,
    RecursionResult, ReferenceKind, TypeData, TypeId, TypeInterner, TypeSubstitution,
    infer_templates, instantiate_type, is_accepted_by, substitute_this_type, union_or_single,
};
use std::rc::Rc;
use tracing::{debug, debug_span, trace};

use crate::context::InferContext;
use crate::definition::{ClassId, DefinitionState, FunctionFlags, FunctionId, SelfOutSource};
use crate::extensions::{
    ExtensionContext, FunctionCallEvent, MethodCallEvent, PropertyFetchEvent, StaticCallEvent,
};
use crate::scope::ScopeContext;

/// Definitions currently being resolved, innermost last.
pub(crate) struct ResolutionStack {
    guard: RecursionGuard<FunctionId>,
    frames: Vec<FunctionId>,
    /// Lowest frame a detected cycle re-entered. Frames above it hold
    /// provisional results.
    cycle_floor: Option<usize>,
}

impl ResolutionStack {
    pub fn new(profile: RecursionProfile) -> Self {
        ResolutionStack {
            guard: RecursionGuard::with_profile(profile),
            frames: Vec::new(),
            cycle_floor: None,
        }
    }

    fn enter(&mut self, fid: FunctionId) -> RecursionResult {
        let result = self.guard.enter(fid);
        if result.is_entered() {
            self.frames.push(fid);
        } else if result.is_cycle() {
            if let Some(position) = self.frames.iter().position(|frame| *frame == fid) {
                self.cycle_floor = Some(self.cycle_floor.map_or(position, |floor| floor.min(position)));
            }
        }
        result
    }

    /// Pop `fid`; true when its result is final.
    fn leave(&mut self, fid: FunctionId) -> bool {
        self.guard.leave(fid);
        self.frames.pop();
        let index = self.frames.len();
        match self.cycle_floor {
            Some(floor) if floor < index => false,
            Some(_) => {
                self.cycle_floor = None;
                true
            }
            None => true,
        }
    }
}

/// A class receiver: the class and the template arguments it carries.
struct Receiver {
    class: ClassId,
    args: Vec<TypeId>,
    /// `$this` inside the class: templates stay symbolic.
    is_this: bool,
}

impl InferContext {
    /// Return type of a definition with no references left in it.
    ///
    /// Re-entrant requests (recursion) get `unknown`.
    pub fn resolve_function(&self, fid: FunctionId) -> TypeId {
        self.ensure_analyzed(fid);
        let (state, return_type) = self.with_function(fid, |def| (def.state, def.return_type));
        match state {
            DefinitionState::Resolved => return return_type,
            DefinitionState::Pending | DefinitionState::Analyzing => return TypeId::UNKNOWN,
            DefinitionState::Analyzed | DefinitionState::Resolving => {}
        }

        let entered = self.resolution.borrow_mut().enter(fid);
        if !entered.is_entered() {
            trace!(function = fid.0, result = ?entered, "resolution denied");
            return TypeId::UNKNOWN;
        }
        self.update_function(fid, |def| def.state = DefinitionState::Resolving);

        let name = self.with_function(fid, |def| self.interner().resolve_atom(def.name));
        let _span = debug_span!("resolve", function = %name).entered();
        let context = self.function_context(fid);
        let inferred = self.resolve(&context, return_type);
        let result = self.apply_declared_return(fid, &context, inferred);

        let is_final = self.resolution.borrow_mut().leave(fid);
        debug!(
            function = %name,
            return_type = %self.format(result),
            provisional = !is_final,
            "resolved"
        );
        self.update_function(fid, |def| {
            if is_final {
                def.return_type = result;
                def.state = DefinitionState::Resolved;
            } else {
                def.state = DefinitionState::Analyzed;
            }
        });
        result
    }

    /// Return type of `fid` invoked on an instance of `called`.
    ///
    /// An inherited body that reaches `$this` or `static` is resolved again
    /// with both bound to `called`, so overrides in the subclass are seen.
    /// The definition's own memoized result stays bound to its class.
    pub(crate) fn resolve_method_for(&self, fid: FunctionId, called: ClassId) -> TypeId {
        let resolved = self.resolve_function(fid);
        let interner = self.interner();
        let (declaring, analyzed) = self.with_function(fid, |def| (def.class, def.analyzed_return));
        let Some(declaring) = declaring else {
            return resolved;
        };
        if self.get_class(&interner.resolve_atom(declaring)) == called
            || !is_late_bound(interner, analyzed)
        {
            return resolved;
        }
        if !self.late_binding_guard.borrow_mut().enter((fid, called)).is_entered() {
            return TypeId::UNKNOWN;
        }
        let called_name = self.with_class(called, |def| def.name);
        let context = self.function_context(fid).called_as(called_name);
        let inferred = self.resolve(&context, analyzed);
        let result = self.apply_declared_return(fid, &context, inferred);
        self.late_binding_guard.borrow_mut().leave((fid, called));
        trace!(
            function = fid.0,
            called = %interner.resolve_atom(called_name),
            return_type = %self.format(result),
            "late bound"
        );
        result
    }

    /// The declared return wins when it is a plain primitive, when there is
    /// no body to infer from, or when it does not accept the inferred type.
    fn apply_declared_return(
        &self,
        fid: FunctionId,
        context: &ScopeContext,
        inferred: TypeId,
    ) -> TypeId {
        let (declared, flags) = self.with_function(fid, |def| (def.declared_return, def.flags));
        let Some(declared) = declared else {
            return inferred;
        };
        let declared = self.resolve(context, declared);
        let primitive = matches!(
            declared,
            TypeId::INT | TypeId::FLOAT | TypeId::BOOLEAN | TypeId::STRING
        );
        if primitive
            || flags.contains(FunctionFlags::REFLECTED)
            || inferred == TypeId::UNKNOWN
        {
            return declared;
        }
        if is_accepted_by(self.interner(), self, inferred, declared) {
            inferred
        } else {
            declared
        }
    }

    /// Replace every reference reachable from `ty`, resolving in `context`.
    pub fn resolve(&self, context: &ScopeContext, ty: TypeId) -> TypeId {
        if ty.is_intrinsic() {
            return ty;
        }
        let interner = self.interner();
        let resolving = self.extensions().has_resolving_type_extensions();
        if !contains_references(interner, ty) && !(resolving && contains_generics(interner, ty)) {
            return ty;
        }
        let mapped = map_children(interner, ty, &mut |child| self.resolve(context, child));
        match interner.lookup(mapped) {
            Some(TypeData::Reference(id)) => {
                if resolving {
                    if let Some(result) = self.resolving_extension(context, mapped) {
                        return result;
                    }
                }
                match interner.reference(id) {
                    Some(kind) => self.resolve_reference(context, &kind),
                    None => TypeId::UNKNOWN,
                }
            }
            Some(TypeData::Generic(_)) if resolving => self
                .resolving_extension(context, mapped)
                .unwrap_or(mapped),
            _ => mapped,
        }
    }

    fn resolving_extension(&self, context: &ScopeContext, ty: TypeId) -> Option<TypeId> {
        let extension_context = ExtensionContext::new(self, context);
        let result = self.extensions().resolving_type(ty, &extension_context)?;
        (result != ty).then(|| self.reresolve(context, result))
    }

    /// Resolve a type produced by an extension, which may hold references.
    fn reresolve(&self, context: &ScopeContext, ty: TypeId) -> TypeId {
        if !self.call_depth.borrow_mut().enter() {
            return TypeId::UNKNOWN;
        }
        let result = self.resolve(context, ty);
        self.call_depth.borrow_mut().leave();
        result
    }

    fn resolve_reference(&self, context: &ScopeContext, kind: &ReferenceKind) -> TypeId {
        match kind {
            ReferenceKind::MethodCall {
                receiver,
                name,
                args,
            } => self.for_each_member(*receiver, |member| {
                self.method_call(context, member, *name, args)
            }),
            ReferenceKind::StaticCall { class, name, args } => {
                self.static_call(context, *class, *name, args)
            }
            ReferenceKind::New { class, args } => self.new_object(context, *class, args),
            ReferenceKind::PropertyFetch { receiver, name } => self
                .for_each_member(*receiver, |member| {
                    self.property_fetch(context, member, *name)
                }),
            ReferenceKind::StaticPropertyFetch { class, name } => {
                self.static_property_fetch(context, *class, *name)
            }
            ReferenceKind::CallableCall { callee, args } => match callee {
                CalleeRef::Function(name) => self.function_call(*name, args),
                CalleeRef::Value(callee) => self.for_each_member(*callee, |member| {
                    self.value_call(context, member, args)
                }),
            },
        }
    }

    /// Apply `f` to each non-null member of a receiver union.
    fn for_each_member(&self, ty: TypeId, mut f: impl FnMut(TypeId) -> TypeId) -> TypeId {
        let interner = self.interner();
        let results: Vec<TypeId> = interner
            .union_members(ty)
            .into_iter()
            .filter(|member| *member != TypeId::NULL)
            .map(&mut f)
            .collect();
        if results.is_empty() {
            return TypeId::UNKNOWN;
        }
        union_or_single(interner, results)
    }

    /// Class and template arguments of a receiver type, if it is an object.
    fn receiver(&self, context: &ScopeContext, ty: TypeId) -> Option<Receiver> {
        let interner = self.interner();
        if ty == TypeId::THIS {
            let class = self.get_class(&interner.resolve_atom(context.late_class()?));
            let args = self.with_class(class, |def| def.templates.clone());
            return Some(Receiver {
                class,
                args,
                is_this: true,
            });
        }
        let name = match interner.lookup(ty)? {
            TypeData::Object(name) => name,
            TypeData::Generic(id) => interner.generic_type(id).name,
            _ => return None,
        };
        let class = self.get_class(&interner.resolve_atom(name));
        let args = self.with_class(class, |def| def.receiver_args(interner, ty));
        Some(Receiver {
            class,
            args,
            is_this: false,
        })
    }

    fn receiver_substitution(&self, receiver: &Receiver) -> TypeSubstitution {
        let interner = self.interner();
        self.with_class(receiver.class, |def| {
            if receiver.is_this {
                def.symbolic_substitution(interner)
            } else {
                def.substitution_for(interner, &receiver.args)
            }
        })
    }

    /// Substitution for one call: the method's templates solved from the
    /// arguments, on top of the receiver's class substitution.
    fn call_substitution(
        &self,
        fid: FunctionId,
        class_substitution: &TypeSubstitution,
        args: &[CallArg],
    ) -> TypeSubstitution {
        let interner = self.interner();
        let (templates, mut params) =
            self.with_function(fid, |def| (def.templates.clone(), def.param_infos()));
        for param in &mut params {
            param.ty = instantiate_type(interner, param.ty, class_substitution);
        }
        let mut substitution = infer_templates(interner, &templates, &params, args);
        substitution.extend_missing(class_substitution);
        substitution
    }

    fn method_call(&self, context: &ScopeContext, receiver: TypeId, name: Atom, args: &[CallArg]) -> TypeId {
        let interner = self.interner();
        if let Some(template) = interner.template_of(receiver) {
            return match template.bound {
                Some(bound) => self.method_call(context, bound, name, args),
                None => interner.reference_type(ReferenceKind::MethodCall {
                    receiver,
                    name,
                    args: args.to_vec(),
                }),
            };
        }
        let Some(target) = self.receiver(context, receiver) else {
            return TypeId::UNKNOWN;
        };
        let class_name = self.with_class(target.class, |def| def.name);
        let extension_context = ExtensionContext::new(self, context);
        let event = MethodCallEvent {
            receiver,
            class: class_name,
            name,
            args,
        };
        if let Some(result) = self.extensions().method_return_type(&event, &extension_context) {
            return self.reresolve(context, result);
        }
        self.call_method(&target, receiver, name, args)
    }

    fn call_method(&self, target: &Receiver, receiver: TypeId, name: Atom, args: &[CallArg]) -> TypeId {
        let interner = self.interner();
        let method = interner.resolve_atom(name);
        let Some(fid) = self.with_class(target.class, |def| def.method(interner, &method)) else {
            trace!(method = %method, "method not found");
            return TypeId::UNKNOWN;
        };
        let return_type = self.resolve_method_for(fid, target.class);
        let class_substitution = self.receiver_substitution(target);
        let substitution = self.call_substitution(fid, &class_substitution, args);
        let result = instantiate_type(interner, return_type, &substitution);
        if target.is_this || !contains_this(interner, result) {
            return result;
        }
        let after = self.receiver_after_call(target, fid, &substitution);
        let after = if after == TypeId::THIS { receiver } else { after };
        substitute_this_type(interner, result, after)
    }

    /// The receiver's type after a call whose self-out narrows its template
    /// arguments (constructors, setters, fluent chains).
    fn receiver_after_call(
        &self,
        target: &Receiver,
        fid: FunctionId,
        substitution: &TypeSubstitution,
    ) -> TypeId {
        let interner = self.interner();
        let templates = self.with_class(target.class, |def| def.templates.clone());
        let mut args = target.args.clone();
        for (template, value) in self.collect_self_out(fid).iter() {
            if let Some(position) = templates.iter().position(|candidate| candidate == template) {
                args[position] = instantiate_type(interner, *value, substitution);
            }
        }
        self.with_class(target.class, |def| def.instance_type(interner, args))
    }

    /// Template assignments a call to `fid` makes on its receiver, following
    /// `$this->setter()` and `parent::__construct()` calls. Later writes win.
    pub(crate) fn collect_self_out(&self, fid: FunctionId) -> Rc<[(TypeId, TypeId)]> {
        if let Some(cached) = self.self_out_cache.borrow().get(&fid) {
            return cached.clone();
        }
        self.ensure_analyzed(fid);
        if !self.self_out_guard.borrow_mut().enter(fid).is_entered() {
            return Rc::from(Vec::new());
        }
        let interner = self.interner();
        let sources = self.with_function(fid, |def| def.self_out.clone());
        let context = self.function_context(fid);
        let mut pairs: Vec<(TypeId, TypeId)> = Vec::new();
        let mut assign = |template: TypeId, value: TypeId| {
            pairs.retain(|(existing, _)| *existing != template);
            pairs.push((template, value));
        };
        for source in sources {
            match source {
                SelfOutSource::Assignment { template, value } => {
                    assign(template, self.resolve(&context, value));
                }
                SelfOutSource::Call {
                    parent,
                    method,
                    args,
                } => {
                    let class = if parent { context.parent } else { context.class };
                    let Some(class) = class else {
                        continue;
                    };
                    let Some(target) = self.find_method(class, &interner.resolve_atom(method)) else {
                        continue;
                    };
                    let args: Vec<CallArg> = args
                        .iter()
                        .map(|arg| CallArg {
                            name: arg.name,
                            ty: self.resolve(&context, arg.ty),
                        })
                        .collect();
                    let substitution = self.call_substitution(target, &TypeSubstitution::new(), &args);
                    for (template, value) in self.collect_self_out(target).iter() {
                        assign(*template, instantiate_type(interner, *value, &substitution));
                    }
                }
            }
        }
        self.self_out_guard.borrow_mut().leave(fid);
        let pairs: Rc<[(TypeId, TypeId)]> = Rc::from(pairs);
        self.self_out_cache.borrow_mut().insert(fid, pairs.clone());
        pairs
    }

    /// Class named by a static reference, in the calling context.
    fn static_class(&self, context: &ScopeContext, class: ClassRefKind) -> Option<Atom> {
        match class {
            ClassRefKind::Named(name) => Some(name),
            ClassRefKind::SelfClass => context.class,
            ClassRefKind::StaticClass => context.late_class(),
            ClassRefKind::ParentClass => context.parent,
        }
    }

    fn static_call(&self, context: &ScopeContext, class: ClassRefKind, name: Atom, args: &[CallArg]) -> TypeId {
        let interner = self.interner();
        let Some(class_name) = self.static_class(context, class) else {
            return TypeId::UNKNOWN;
        };
        let class_id = self.get_class(&interner.resolve_atom(class_name));
        let class_name = self.with_class(class_id, |def| def.name);

        let ClassRefKind::Named(_) = class else {
            // self::, static:: and parent:: forward the called class.
            let Some(current) = context.late_class() else {
                return TypeId::UNKNOWN;
            };
            let current = self.get_class(&interner.resolve_atom(current));
            let method = interner.resolve_atom(name);
            let Some(fid) = self.with_class(class_id, |def| def.method(interner, &method)) else {
                return TypeId::UNKNOWN;
            };
            let return_type = self.resolve_method_for(fid, current);
            let class_substitution = self.with_class(current, |def| def.symbolic_substitution(interner));
            let substitution = self.call_substitution(fid, &class_substitution, args);
            return instantiate_type(interner, return_type, &substitution);
        };

        let extension_context = ExtensionContext::new(self, context);
        let event = StaticCallEvent {
            class: class_name,
            name,
            args,
        };
        if let Some(result) = self
            .extensions()
            .static_method_return_type(&event, &extension_context)
        {
            return self.reresolve(context, result);
        }
        let receiver = self.with_class(class_id, |def| {
            let object = interner.object_atom(def.name);
            def.instance_type(interner, def.receiver_args(interner, object))
        });
        let Some(target) = self.receiver(context, receiver) else {
            return TypeId::UNKNOWN;
        };
        self.call_method(&target, receiver, name, args)
    }

    fn new_object(&self, context: &ScopeContext, class: ClassRefKind, args: &[CallArg]) -> TypeId {
        let interner = self.interner();
        let Some(class_name) = self.static_class(context, class) else {
            return TypeId::UNKNOWN;
        };
        let class_id = self.get_class(&interner.resolve_atom(class_name));
        let (templates, ctor) = self.with_class(class_id, |def| {
            (def.templates.clone(), def.method(interner, "__construct"))
        });
        if class == ClassRefKind::StaticClass && templates.is_empty() {
            return TypeId::THIS;
        }
        let Some(ctor) = ctor else {
            return self.with_class(class_id, |def| {
                def.instance_type(interner, def.receiver_args(interner, interner.object_atom(def.name)))
            });
        };
        if templates.is_empty() {
            return self.with_class(class_id, |def| interner.object_atom(def.name));
        }

        // Constructor parameters may be typed by class templates; solve those
        // together with the constructor's own.
        let (own_templates, params) =
            self.with_function(ctor, |def| (def.templates.clone(), def.param_infos()));
        let all_templates: Vec<TypeId> = templates.iter().chain(&own_templates).copied().collect();
        let substitution = infer_templates(interner, &all_templates, &params, args);
        let target = Receiver {
            class: class_id,
            args: templates
                .iter()
                .map(|template| substitution.get(*template).unwrap_or(TypeId::UNKNOWN))
                .collect(),
            is_this: false,
        };
        self.receiver_after_call(&target, ctor, &substitution)
    }

    fn property_fetch(&self, context: &ScopeContext, receiver: TypeId, name: Atom) -> TypeId {
        let interner = self.interner();
        if let Some(template) = interner.template_of(receiver) {
            return match template.bound {
                Some(bound) => self.property_fetch(context, bound, name),
                None => interner.reference_type(ReferenceKind::PropertyFetch { receiver, name }),
            };
        }
        let Some(target) = self.receiver(context, receiver) else {
            return TypeId::UNKNOWN;
        };
        let class_name = self.with_class(target.class, |def| def.name);
        let extension_context = ExtensionContext::new(self, context);
        let event = PropertyFetchEvent {
            receiver,
            class: class_name,
            name,
        };
        if let Some(result) = self.extensions().property_type(&event, &extension_context) {
            return self.reresolve(context, result);
        }
        self.property_of(&target, name)
    }

    fn property_of(&self, target: &Receiver, name: Atom) -> TypeId {
        let interner = self.interner();
        let Some((ty, declaring)) = self.with_class(target.class, |def| {
            def.properties
                .get(&name)
                .map(|property| (property.ty, property.declaring_class))
        }) else {
            return TypeId::UNKNOWN;
        };
        let substitution = self.receiver_substitution(target);
        let ty = instantiate_type(interner, ty, &substitution);
        if !contains_references(interner, ty) {
            return ty;
        }
        let declaring = self.get_class(&interner.resolve_atom(declaring));
        let parent = self.with_class(declaring, |def| def.parent);
        let class = self.with_class(declaring, |def| def.name);
        self.reresolve(&ScopeContext::for_class(class, parent), ty)
    }

    fn static_property_fetch(&self, context: &ScopeContext, class: ClassRefKind, name: Atom) -> TypeId {
        let interner = self.interner();
        let Some(class_name) = self.static_class(context, class) else {
            return TypeId::UNKNOWN;
        };
        let class_id = self.get_class(&interner.resolve_atom(class_name));
        let is_this = !matches!(class, ClassRefKind::Named(_));
        let args = self.with_class(class_id, |def| {
            if is_this {
                def.templates.clone()
            } else {
                def.receiver_args(interner, interner.object_atom(def.name))
            }
        });
        self.property_of(
            &Receiver {
                class: class_id,
                args,
                is_this,
            },
            name,
        )
    }

    fn function_call(&self, name: Atom, args: &[CallArg]) -> TypeId {
        let interner = self.interner();
        let context = ScopeContext::default();
        let extension_context = ExtensionContext::new(self, &context);
        let event = FunctionCallEvent { name, args };
        if let Some(result) = self
            .extensions()
            .function_return_type(&event, &extension_context)
        {
            return self.reresolve(&context, result);
        }
        let fid = self.get_function_with_fallback(&interner.resolve_atom(name));
        let return_type = self.resolve_function(fid);
        let substitution = self.call_substitution(fid, &TypeSubstitution::new(), args);
        instantiate_type(interner, return_type, &substitution)
    }

    /// `$callee(...)`: closures, callable strings and invokable objects.
    fn value_call(&self, context: &ScopeContext, callee: TypeId, args: &[CallArg]) -> TypeId {
        let interner = self.interner();
        match interner.lookup(callee) {
            Some(TypeData::Function(id)) => {
                let shape = interner.function_shape(id);
                let substitution = infer_templates(interner, &shape.templates, &shape.params, args);
                let result = instantiate_type(interner, shape.return_type, &substitution);
                self.reresolve(context, result)
            }
            Some(TypeData::Literal(LiteralValue::String(name))) => {
                let name = interner.resolve_atom(name);
                self.function_call(interner.intern_string(name.trim_start_matches('\\')), args)
            }
            Some(TypeData::Object(_) | TypeData::Generic(_)) | Some(TypeData::This) => {
                let Some(target) = self.receiver(context, callee) else {
                    return TypeId::UNKNOWN;
                };
                self.call_method(&target, callee, interner.intern_string("__invoke"), args)
            }
            _ => TypeId::UNKNOWN,
        }
    }

    /// A type fit to leave the engine: resolved, `$this` bound to the class
    /// instance and no references left.
    pub fn public_type(&self, context: &ScopeContext, ty: TypeId) -> TypeId {
        let interner = self.interner();
        let resolved = self.resolve(context, ty);
        let resolved = if contains_this(interner, resolved) {
            let this = match context.late_class() {
                Some(class) => {
                    let id = self.get_class(&interner.resolve_atom(class));
                    self.with_class(id, |def| def.instance_type(interner, def.templates.clone()))
                }
                None => TypeId::UNKNOWN,
            };
            substitute_this_type(interner, resolved, this)
        } else {
            resolved
        };
        self.erase_references(resolved)
    }

    fn erase_references(&self, ty: TypeId) -> TypeId {
        let interner = self.interner();
        if !contains_references(interner, ty) {
            return ty;
        }
        if let Some(TypeData::Reference(_)) = interner.lookup(ty) {
            return TypeId::UNKNOWN;
        }
        map_children(interner, ty, &mut |child| self.erase_references(child))
    }

    /// Resolve every definition in the index, including those added while
    /// resolving.
    pub fn finalize(&self) {
        let mut done = 0;
        loop {
            let ids = self.index().function_ids();
            if ids.len() == done {
                break;
            }
            for fid in &ids[done..] {
                self.resolve_function(*fid);
            }
            done = ids.len();
        }
        debug!(functions = done, "finalized");
    }
}

/// Whether a body type depends on the class it is called for: it mentions
/// `$this`, or calls through `static::`, `self::` or `parent::` (which
/// forward the called class).
fn is_late_bound(interner: &TypeInterner, ty: TypeId) -> bool {
    if ty.is_intrinsic() {
        return ty == TypeId::THIS;
    }
    contains_this(interner, ty)
        || contains_type_matching(interner, ty, |data| {
            let TypeData::Reference(id) = data else {
                return false;
            };
            matches!(
                interner.reference(*id).as_deref(),
                Some(
                    ReferenceKind::StaticCall {
                        class: ClassRefKind::SelfClass
                            | ClassRefKind::StaticClass
                            | ClassRefKind::ParentClass,
                        ..
                    } | ReferenceKind::New {
                        class: ClassRefKind::StaticClass,
                        ..
                    } | ReferenceKind::StaticPropertyFetch {
                        class: ClassRefKind::StaticClass,
                        ..
                    }
                )
            )
        })
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod resolver_tests;
