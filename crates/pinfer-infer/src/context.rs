//! Shared state of one inference run.
//!
//! `InferContext` owns the interner, the provenance provider, the extension
//! broker and the [`Index`]. Analysis is single-threaded and re-entrant (a
//! resolution may trigger analysis which may trigger resolution), so the
//! mutable parts sit behind `RefCell` and borrows are never held across
//! calls back into the engine.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use pinfer_common::Atom;
use pinfer_solver::{
    ClassHierarchy, DepthCounter, RecursionGuard, RecursionProfile, TypeId, TypeInterner,
};
use rustc_hash::FxHashMap;

use crate::definition::{ClassDefinition, ClassId, FunctionId, FunctionLikeDefinition};
use crate::extensions::ExtensionsBroker;
use crate::index::Index;
use crate::options::InferOptions;
use crate::resolver::ResolutionStack;
use crate::source::SourceProvider;

pub struct InferContext {
    interner: TypeInterner,
    sources: Box<dyn SourceProvider>,
    extensions: ExtensionsBroker,
    options: InferOptions,
    index: RefCell<Index>,
    pub(crate) resolution: RefCell<ResolutionStack>,
    pub(crate) self_out_guard: RefCell<RecursionGuard<FunctionId>>,
    /// Inherited bodies being re-resolved for a subclass.
    pub(crate) late_binding_guard: RefCell<RecursionGuard<(FunctionId, ClassId)>>,
    pub(crate) self_out_cache: RefCell<FxHashMap<FunctionId, Rc<[(TypeId, TypeId)]>>>,
    pub(crate) call_depth: RefCell<DepthCounter>,
}

impl InferContext {
    pub fn new(
        sources: Box<dyn SourceProvider>,
        extensions: ExtensionsBroker,
        options: InferOptions,
    ) -> Self {
        let depth = options.max_resolution_depth;
        let profile = RecursionProfile::Definitions.with_depth(depth);
        InferContext {
            interner: TypeInterner::new(),
            sources,
            extensions,
            options,
            index: RefCell::new(Index::new()),
            resolution: RefCell::new(ResolutionStack::new(profile)),
            self_out_guard: RefCell::new(RecursionGuard::with_profile(profile)),
            late_binding_guard: RefCell::new(RecursionGuard::with_profile(profile)),
            self_out_cache: RefCell::new(FxHashMap::default()),
            call_depth: RefCell::new(DepthCounter::new(depth)),
        }
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    pub fn options(&self) -> &InferOptions {
        &self.options
    }

    pub fn extensions(&self) -> &ExtensionsBroker {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionsBroker {
        &mut self.extensions
    }

    pub fn sources(&self) -> &dyn SourceProvider {
        self.sources.as_ref()
    }

    pub fn index(&self) -> Ref<'_, Index> {
        self.index.borrow()
    }

    pub(crate) fn index_mut(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    /// Read a class definition without keeping the index borrowed.
    pub fn with_class<R>(&self, id: ClassId, f: impl FnOnce(&ClassDefinition) -> R) -> R {
        f(self.index.borrow().class(id))
    }

    pub fn with_function<R>(
        &self,
        id: FunctionId,
        f: impl FnOnce(&FunctionLikeDefinition) -> R,
    ) -> R {
        f(self.index.borrow().function(id))
    }

    pub(crate) fn update_function(&self, id: FunctionId, f: impl FnOnce(&mut FunctionLikeDefinition)) {
        f(self.index.borrow_mut().function_mut(id));
    }

    /// Method of a class by name, building the class if needed.
    pub fn find_method(&self, class: Atom, method: &str) -> Option<FunctionId> {
        let class_name = self.interner.resolve_atom(class);
        let id = self.get_class(&class_name);
        self.with_class(id, |def| def.method(&self.interner, method))
    }

    pub fn format(&self, ty: TypeId) -> String {
        self.interner.format(ty)
    }
}

impl ClassHierarchy for InferContext {
    fn is_subclass_of(&self, class: Atom, ancestor: Atom) -> bool {
        if class == ancestor {
            return true;
        }
        let ancestor_name = self.interner.resolve_atom(ancestor);
        let id = self.get_class(&self.interner.resolve_atom(class));
        self.with_class(id, |def| {
            def.ancestors.iter().any(|name| {
                self.interner
                    .resolve_atom_ref(*name)
                    .eq_ignore_ascii_case(&ancestor_name)
            })
        })
    }
}
