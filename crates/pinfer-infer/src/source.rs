//! Provenance of classes and functions.
//!
//! The engine asks one question per name: is there source, a reflection
//! signature, or nothing? Lookups are case-insensitive and take
//! fully-qualified names without a leading backslash.

use crate::reflection::{ReflectedClass, ReflectedFunction};
use pinfer_ast::{ClassDecl, FunctionDecl, NameTable, SourceFile};
use rustc_hash::FxHashMap;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub enum ClassSource {
    Ast {
        decl: Rc<ClassDecl>,
        names: Rc<NameTable>,
    },
    Reflection(Rc<ReflectedClass>),
    Missing,
}

#[derive(Clone, Debug)]
pub enum FunctionSource {
    Ast {
        decl: Rc<FunctionDecl>,
        names: Rc<NameTable>,
    },
    Reflection(Rc<ReflectedFunction>),
    Missing,
}

pub trait SourceProvider {
    fn class(&self, name: &str) -> ClassSource;

    fn function(&self, name: &str) -> FunctionSource;
}

fn lookup_key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

/// In-memory provider for parsed files and reflected signatures.
#[derive(Default)]
pub struct MemorySources {
    classes: FxHashMap<String, ClassSource>,
    functions: FxHashMap<String, FunctionSource>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every class and function declared in a file.
    ///
    /// Function names are qualified with the file's namespace.
    pub fn add_file(&mut self, file: SourceFile) {
        for class in file.classes {
            self.classes.insert(
                lookup_key(&class.name),
                ClassSource::Ast {
                    decl: class.clone(),
                    names: file.names.clone(),
                },
            );
        }
        for function in file.functions {
            let name = match file.names.namespace() {
                Some(namespace) => format!("{namespace}\\{}", function.name),
                None => function.name.clone(),
            };
            self.functions.insert(
                lookup_key(&name),
                FunctionSource::Ast {
                    decl: function.clone(),
                    names: file.names.clone(),
                },
            );
        }
    }

    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.add_file(file);
        self
    }

    pub fn add_reflected_class(&mut self, class: ReflectedClass) {
        self.classes
            .insert(lookup_key(&class.name), ClassSource::Reflection(Rc::new(class)));
    }

    pub fn add_reflected_function(&mut self, function: ReflectedFunction) {
        self.functions.insert(
            lookup_key(&function.name),
            FunctionSource::Reflection(Rc::new(function)),
        );
    }
}

impl SourceProvider for MemorySources {
    fn class(&self, name: &str) -> ClassSource {
        self.classes
            .get(&lookup_key(name))
            .cloned()
            .unwrap_or(ClassSource::Missing)
    }

    fn function(&self, name: &str) -> FunctionSource {
        self.functions
            .get(&lookup_key(name))
            .cloned()
            .unwrap_or(FunctionSource::Missing)
    }
}

#[cfg(test)]
#[path = "../tests/source_tests.rs"]
mod source_tests;
