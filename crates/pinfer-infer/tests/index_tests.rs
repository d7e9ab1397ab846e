use super::*;
use crate::definition::{ClassOrigin, FunctionOrigin};
use crate::extensions::ExtensionsBroker;
use crate::options::InferOptions;
use crate::reflection::ReflectedFunction;
use crate::source::MemorySources;
use pinfer_ast::builder::{function, hint, int, ret};
use pinfer_ast::{NameTable, SourceFile};
use pinfer_solver::TypeId;
use std::rc::Rc;

fn context(sources: MemorySources) -> InferContext {
    InferContext::new(
        Box::new(sources),
        ExtensionsBroker::new(),
        InferOptions::default(),
    )
}

#[test]
fn test_insert_class_keeps_first_registration() {
    let ctx = context(MemorySources::new());
    let interner = ctx.interner();
    let mut index = Index::new();

    let first = index.insert_class(
        "App\\User",
        ClassDefinition::new(interner.intern_string("App\\User"), ClassOrigin::Missing),
    );
    let second = index.insert_class(
        "\\app\\user",
        ClassDefinition::new(interner.intern_string("other"), ClassOrigin::Missing),
    );
    assert_eq!(first, second);
    assert_eq!(index.class_count(), 1);
    assert_eq!(index.class_id("APP\\USER"), Some(first));
}

#[test]
fn test_anonymous_functions_are_not_named() {
    let ctx = context(MemorySources::new());
    let interner = ctx.interner();
    let mut index = Index::new();

    let name = interner.intern_string("run");
    let anonymous = index.add_function(FunctionLikeDefinition::new(
        name,
        None,
        FunctionOrigin::Missing,
    ));
    let named = index.insert_function(
        "run",
        FunctionLikeDefinition::new(name, None, FunctionOrigin::Missing),
    );
    assert_ne!(anonymous, named);
    assert_eq!(index.function_id("run"), Some(named));
    assert_eq!(index.function_ids(), vec![anonymous, named]);
}

#[test]
fn test_get_class_never_fails() {
    let ctx = context(MemorySources::new());

    let id = ctx.get_class("\\Nowhere\\Thing");
    assert_eq!(ctx.get_class("nowhere\\thing"), id);
    ctx.with_class(id, |def| {
        assert!(def.is_missing());
        assert!(def.methods.is_empty());
    });
}

#[test]
fn test_get_function_from_source() {
    let file = SourceFile {
        names: Rc::new(NameTable::new()),
        classes: Vec::new(),
        functions: vec![Rc::new(
            function("answer").body(vec![ret(int(42))]).build(),
        )],
    };
    let ctx = context(MemorySources::new().with_file(file));

    let id = ctx.get_function("answer");
    assert_eq!(ctx.get_function("\\ANSWER"), id);
    ctx.with_function(id, |def| {
        assert!(!def.is_missing());
        assert!(def.params.is_empty());
    });
}

#[test]
fn test_missing_function_returns_unknown() {
    let ctx = context(MemorySources::new());

    let id = ctx.get_function("undefined_helper");
    ctx.with_function(id, |def| {
        assert!(def.is_missing());
        assert_eq!(def.return_type, TypeId::UNKNOWN);
    });
}

#[test]
fn test_namespaced_call_falls_back_to_global() {
    let mut sources = MemorySources::new();
    sources.add_reflected_function(ReflectedFunction::new("strlen", Some(hint("int"))));
    let ctx = context(sources);

    let id = ctx.get_function_with_fallback("App\\strlen");
    assert_eq!(id, ctx.get_function("strlen"));
    ctx.with_function(id, |def| assert_eq!(def.return_type, TypeId::INT));
}
