use super::*;
use crate::extensions::ExtensionsBroker;
use crate::options::InferOptions;
use crate::source::MemorySources;
use pinfer_ast::builder::{
    assign, class, expr, function, hint, if_then, int, new_object, param, prop, ret, string,
    this, var,
};
use pinfer_ast::{ClassDecl, Param, SourceFile, Stmt};

fn context_with(
    options: InferOptions,
    classes: Vec<ClassDecl>,
    functions: Vec<FunctionDecl>,
) -> InferContext {
    let file = SourceFile {
        names: Rc::new(NameTable::new()),
        classes: classes.into_iter().map(Rc::new).collect(),
        functions: functions.into_iter().map(Rc::new).collect(),
    };
    InferContext::new(
        Box::new(MemorySources::new().with_file(file)),
        ExtensionsBroker::new(),
        options,
    )
}

fn analyzed_return(ctx: &InferContext, fid: FunctionId) -> String {
    ctx.ensure_analyzed(fid);
    ctx.with_function(fid, |def| {
        assert_eq!(def.state, DefinitionState::Analyzed);
        ctx.format(def.return_type)
    })
}

#[test]
fn test_returns_are_unioned() {
    let choose = function("choose")
        .param(param("flag"))
        .body(vec![
            if_then(var("flag"), vec![ret(int(1))]),
            ret(string("a")),
        ])
        .build();
    let ctx = context_with(InferOptions::default(), Vec::new(), vec![choose]);

    let fid = ctx.get_function("choose");
    assert_eq!(analyzed_return(&ctx, fid), "int(1)|string(a)");
}

#[test]
fn test_no_return_is_void() {
    let noop = function("noop").body(vec![expr(int(1))]).build();
    let ctx = context_with(InferOptions::default(), Vec::new(), vec![noop]);

    let fid = ctx.get_function("noop");
    assert_eq!(analyzed_return(&ctx, fid), "void");
}

#[test]
fn test_abstract_method_without_body_is_unknown() {
    let mut decl = function("handle").build();
    decl.is_abstract = true;
    let ctx = context_with(
        InferOptions::default(),
        vec![class("Job").method(decl).build()],
        Vec::new(),
    );

    let fid = ctx.find_method(ctx.interner().intern_string("Job"), "handle").unwrap();
    assert_eq!(analyzed_return(&ctx, fid), "unknown");
}

#[test]
fn test_parameters_are_bound_in_body() {
    let identity = function("identity")
        .param(param("a"))
        .body(vec![ret(var("a"))])
        .build();
    let spread = function("spread")
        .param(Param {
            variadic: true,
            type_hint: Some(hint("int")),
            ..param("values")
        })
        .body(vec![ret(var("values"))])
        .build();
    let ctx = context_with(InferOptions::default(), Vec::new(), vec![identity, spread]);

    let fid = ctx.get_function("identity");
    assert_eq!(analyzed_return(&ctx, fid), "TA");
    let fid = ctx.get_function("spread");
    assert_eq!(analyzed_return(&ctx, fid), "array<int>");
}

#[test]
fn test_untyped_parameters_as_mixed() {
    let options = InferOptions {
        untyped_parameters_as_templates: false,
        ..InferOptions::default()
    };
    let identity = function("identity")
        .param(param("a"))
        .body(vec![ret(var("a"))])
        .build();
    let ctx = context_with(options, Vec::new(), vec![identity]);

    let fid = ctx.get_function("identity");
    assert_eq!(analyzed_return(&ctx, fid), "mixed");
    assert!(ctx.with_function(fid, |def| def.templates.is_empty()));
}

#[test]
fn test_constructor_records_self_out() {
    let ctor = function("__construct")
        .param(param("a"))
        .body(vec![expr(assign(prop(this(), "prop"), var("a")))])
        .build();
    let foo = class("Foo").property("prop").method(ctor).build();
    let ctx = context_with(InferOptions::default(), vec![foo], Vec::new());
    let interner = ctx.interner();

    let fid = ctx.find_method(interner.intern_string("Foo"), "__construct").unwrap();
    ctx.ensure_analyzed(fid);
    let self_out = ctx.with_function(fid, |def| def.self_out.clone());
    match self_out.as_slice() {
        [SelfOutSource::Assignment { template, value }] => {
            assert_eq!(ctx.format(*template), "TProp");
            assert_eq!(ctx.format(*value), "TA");
        }
        other => panic!("unexpected self-out: {other:?}"),
    }
}

#[test]
fn test_thrown_types_are_collected() {
    let fail = function("fail")
        .throws(hint("InvalidArgumentException"))
        .body(vec![
            Stmt::Throw(new_object("RuntimeException", Vec::new())),
            Stmt::Throw(new_object("RuntimeException", Vec::new())),
        ])
        .build();
    let ctx = context_with(InferOptions::default(), Vec::new(), vec![fail]);

    let fid = ctx.get_function("fail");
    ctx.ensure_analyzed(fid);
    let thrown: Vec<String> =
        ctx.with_function(fid, |def| def.throws.iter().map(|ty| ctx.format(*ty)).collect());
    assert_eq!(
        thrown,
        vec!["InvalidArgumentException", "(new RuntimeException())"]
    );
}

#[test]
fn test_resolve_on_analysis() {
    let options = InferOptions {
        resolve_on_analysis: true,
        ..InferOptions::default()
    };
    let answer = function("answer").body(vec![ret(int(42))]).build();
    let ctx = context_with(options, Vec::new(), vec![answer]);

    let fid = ctx.get_function("answer");
    ctx.ensure_analyzed(fid);
    ctx.with_function(fid, |def| {
        assert_eq!(def.state, DefinitionState::Resolved);
        assert_eq!(ctx.format(def.return_type), "int(42)");
    });
}

#[test]
fn test_initializer_is_evaluated_in_class_context() {
    let ctx = context_with(
        InferOptions::default(),
        vec![class("Config").build()],
        Vec::new(),
    );
    let context = ScopeContext::for_class(ctx.interner().intern_string("Config"), None);
    let names = Rc::new(NameTable::new());

    let ty = evaluate_initializer(
        &ctx,
        context,
        names,
        &pinfer_ast::builder::class_const(pinfer_ast::builder::class_name("self"), "class"),
    );
    assert_eq!(ctx.format(ty), "string(Config)");
}
