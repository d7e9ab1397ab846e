//! Run-scoped registry of class and function definitions.
//!
//! The Index is populated lazily: a class is built the first time someone
//! asks for it, from source when available, else from a reflection
//! signature, else as a minimal name-only definition. Lookups never fail.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::class_analyzer::ClassAnalyzer;
use crate::context::InferContext;
use crate::definition::{ClassDefinition, ClassId, FunctionId, FunctionLikeDefinition};
use crate::signature::SignatureBuilder;
use crate::source::FunctionSource;

fn name_key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

/// Definition storage. Ids are only ever produced by this index, so lookups
/// by id index directly.
#[derive(Default)]
pub struct Index {
    classes: Vec<ClassDefinition>,
    functions: Vec<FunctionLikeDefinition>,
    class_names: FxHashMap<String, ClassId>,
    function_names: FxHashMap<String, FunctionId>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_names.get(&name_key(name)).copied()
    }

    pub fn function_id(&self, name: &str) -> Option<FunctionId> {
        self.function_names.get(&name_key(name)).copied()
    }

    pub fn class(&self, id: ClassId) -> &ClassDefinition {
        &self.classes[id.0 as usize]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDefinition {
        &mut self.classes[id.0 as usize]
    }

    pub fn function(&self, id: FunctionId) -> &FunctionLikeDefinition {
        &self.functions[id.0 as usize]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionLikeDefinition {
        &mut self.functions[id.0 as usize]
    }

    /// Register a class under its name. An existing registration is kept.
    pub fn insert_class(&mut self, name: &str, def: ClassDefinition) -> ClassId {
        if let Some(id) = self.class_id(name) {
            return id;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(def);
        self.class_names.insert(name_key(name), id);
        id
    }

    pub fn replace_class(&mut self, id: ClassId, def: ClassDefinition) {
        self.classes[id.0 as usize] = def;
    }

    /// Store an anonymous definition (methods are reached through classes).
    pub fn add_function(&mut self, def: FunctionLikeDefinition) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(def);
        id
    }

    pub fn insert_function(&mut self, name: &str, def: FunctionLikeDefinition) -> FunctionId {
        if let Some(id) = self.function_id(name) {
            return id;
        }
        let id = self.add_function(def);
        self.function_names.insert(name_key(name), id);
        id
    }

    /// Snapshot of all function ids; the index may grow while callers walk it.
    pub fn function_ids(&self) -> Vec<FunctionId> {
        (0..self.functions.len() as u32).map(FunctionId).collect()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

impl InferContext {
    /// Class definition for a fully-qualified name, built on first request.
    ///
    /// Never fails: unknown classes get a minimal definition.
    pub fn get_class(&self, name: &str) -> ClassId {
        let name = name.trim_start_matches('\\');
        if let Some(id) = self.index().class_id(name) {
            return id;
        }
        ClassAnalyzer::new(self).analyze(name)
    }

    /// Free function definition for a fully-qualified name.
    ///
    /// Never fails: unknown functions get a definition returning `unknown`.
    pub fn get_function(&self, name: &str) -> FunctionId {
        let name = name.trim_start_matches('\\');
        if let Some(id) = self.index().function_id(name) {
            return id;
        }
        let interner = self.interner();
        let def = match self.sources().function(name) {
            FunctionSource::Ast { decl, names } => {
                debug!(function = %name, "indexing function from source");
                let qualified = interner.intern_string(name);
                SignatureBuilder::new(self, None, None).function(&decl, &names, qualified)
            }
            FunctionSource::Reflection(reflected) => {
                debug!(function = %name, "indexing function from reflection");
                SignatureBuilder::new(self, None, None).reflected_function(&reflected)
            }
            FunctionSource::Missing => {
                debug!(function = %name, "function not found");
                FunctionLikeDefinition::missing(interner.intern_string(name))
            }
        };
        self.index_mut().insert_function(name, def)
    }

    /// Resolve a call target: the namespaced function, else the global one of
    /// the same short name.
    pub fn get_function_with_fallback(&self, name: &str) -> FunctionId {
        let id = self.get_function(name);
        let missing = self.with_function(id, |def| def.is_missing());
        if missing && name.contains('\\') {
            return self.get_function(pinfer_ast::short_name(name));
        }
        id
    }
}

#[cfg(test)]
#[path = "../tests/index_tests.rs"]
mod index_tests;
