use super::*;
use crate::context::InferContext;
use crate::extensions::ExtensionsBroker;
use crate::options::InferOptions;
use crate::scope::{Scope, ScopeContext};
use crate::source::MemorySources;
use pinfer_ast::builder::{
    array, arrow_fn, assign, binary, class_const, class_name, coalesce, described, elvis, fetch,
    float, int, item, keyed, match_expr, method_call, new_object, null, param, push, string,
    ternary, this, var,
};
use pinfer_ast::{NameTable, Stmt};
use std::rc::Rc;

fn context() -> InferContext {
    InferContext::new(
        Box::new(MemorySources::new()),
        ExtensionsBroker::new(),
        InferOptions::default(),
    )
}

fn analyzer(ctx: &InferContext) -> FunctionAnalyzer<'_> {
    FunctionAnalyzer::new(
        ctx,
        Scope::new(ScopeContext::default(), Rc::new(NameTable::new())),
    )
}

/// Run the assignments, then format the type of `expr`.
fn infer_after(statements: Vec<Expr>, expr: Expr) -> String {
    let ctx = context();
    let mut analyzer = analyzer(&ctx);
    for statement in &statements {
        analyzer.infer_expr(statement);
    }
    let ty = analyzer.infer_expr(&expr);
    ctx.format(ty)
}

fn infer(expr: Expr) -> String {
    infer_after(Vec::new(), expr)
}

#[test]
fn test_literals() {
    assert_eq!(infer(int(42)), "int(42)");
    assert_eq!(infer(string("wow")), "string(wow)");
    assert_eq!(infer(float(1.5)), "float(1.5)");
    assert_eq!(infer(null()), "null");
    assert_eq!(infer(Expr::Interpolated(vec![var("x")])), "string");
}

#[test]
fn test_arithmetic() {
    assert_eq!(infer(binary(BinaryOp::Add, int(1), int(2))), "int");
    assert_eq!(infer(binary(BinaryOp::Div, int(1), int(2))), "int|float");
    assert_eq!(infer(binary(BinaryOp::Mul, float(1.5), int(2))), "float");
    assert_eq!(infer(binary(BinaryOp::Mod, float(1.5), int(2))), "int");
    assert_eq!(infer(binary(BinaryOp::Concat, int(1), string("a"))), "string");
    assert_eq!(infer(binary(BinaryOp::Less, int(1), int(2))), "boolean");
    assert_eq!(infer(binary(BinaryOp::Spaceship, int(1), int(2))), "int");
}

#[test]
fn test_unary() {
    let minus = Expr::Unary {
        op: UnaryOp::Minus,
        operand: Box::new(int(3)),
    };
    assert_eq!(infer(minus), "int(-3)");

    let increment = Expr::Unary {
        op: UnaryOp::PostInc,
        operand: Box::new(var("i")),
    };
    assert_eq!(infer_after(vec![assign(var("i"), int(1)), increment], var("i")), "int");
}

#[test]
fn test_coalesce() {
    assert_eq!(infer(coalesce(var("missing"), string("d"))), "string(d)");

    let nullable = assign(var("a"), ternary(var("c"), null(), int(1)));
    assert_eq!(
        infer_after(vec![nullable], coalesce(var("a"), string("d"))),
        "int(1)|string(d)"
    );

    let row = assign(var("row"), array(vec![keyed(string("a"), int(1))]));
    assert_eq!(
        infer_after(vec![row], coalesce(fetch(var("row"), string("b")), int(0))),
        "int(0)"
    );
}

#[test]
fn test_ternary_and_elvis() {
    assert_eq!(
        infer(ternary(var("c"), int(1), string("a"))),
        "int(1)|string(a)"
    );
    assert_eq!(infer(elvis(string("x"), string("y"))), "string(x)");
    assert_eq!(infer(elvis(int(0), string("y"))), "string(y)");
    assert_eq!(infer(elvis(var("unset"), int(1))), "unknown|int(1)");
}

#[test]
fn test_match_unions_arms() {
    let subject = match_expr(
        var("x"),
        vec![
            (vec![int(1)], string("one")),
            (Vec::new(), string("other")),
        ],
    );
    assert_eq!(infer(subject), "string(one)|string(other)");
}

#[test]
fn test_array_literals() {
    assert_eq!(
        infer(array(vec![item(int(1)), item(string("a"))])),
        "list{int(1), string(a)}"
    );
    assert_eq!(
        infer(array(vec![keyed(string("id"), int(1)), item(int(2))])),
        "array{id: int(1), 0: int(2)}"
    );
    // Numeric string keys are integers.
    assert_eq!(
        infer(array(vec![keyed(string("5"), int(1)), item(int(2))])),
        "array{5: int(1), 6: int(2)}"
    );
    // A non-literal key turns the shape into a generic array.
    assert_eq!(
        infer(array(vec![keyed(var("k"), int(1))])),
        "array<unknown, int(1)>"
    );
}

#[test]
fn test_array_index_past_int_max() {
    let last = infer(array(vec![keyed(int(i64::MAX), int(1)), item(int(2))]));
    assert!(last.starts_with("array<int, "), "{last}");
    assert!(last.contains("int(1)") && last.contains("int(2)"), "{last}");

    let near = infer(array(vec![keyed(int(i64::MAX - 1), int(1)), item(int(2))]));
    assert_eq!(near, format!("array{{{}: int(1), {}: int(2)}}", i64::MAX - 1, i64::MAX));
}

#[test]
fn test_array_writes() {
    let build = vec![
        assign(var("list"), array(Vec::new())),
        assign(push(var("list")), int(1)),
        assign(push(var("list")), int(2)),
    ];
    assert_eq!(infer_after(build, var("list")), "list{int(1), int(2)}");

    let keyed_write = vec![assign(fetch(var("row"), string("a")), int(1))];
    assert_eq!(infer_after(keyed_write, var("row")), "array{a: int(1)}");

    let overwrite = vec![
        assign(var("row"), array(vec![keyed(string("a"), int(1))])),
        assign(fetch(var("row"), string("a")), string("x")),
    ];
    assert_eq!(infer_after(overwrite, var("row")), "array{a: string(x)}");
}

#[test]
fn test_array_reads() {
    let row = assign(
        var("row"),
        array(vec![keyed(string("id"), int(1)), keyed(string("name"), string("x"))]),
    );
    assert_eq!(
        infer_after(vec![row.clone()], fetch(var("row"), string("name"))),
        "string(x)"
    );
    assert_eq!(
        infer_after(vec![row], fetch(var("row"), var("key"))),
        "int(1)|string(x)"
    );
    let text = assign(var("s"), string("abc"));
    assert_eq!(infer_after(vec![text], fetch(var("s"), int(0))), "string");
}

#[test]
fn test_destructuring() {
    let pair = assign(
        array(vec![item(var("a")), item(var("b"))]),
        array(vec![item(int(1)), item(string("x"))]),
    );
    assert_eq!(infer_after(vec![pair.clone()], var("a")), "int(1)");
    assert_eq!(infer_after(vec![pair], var("b")), "string(x)");
}

#[test]
fn test_descriptions_follow_copied_items() {
    let ctx = context();
    let mut analyzer = analyzer(&ctx);
    analyzer.infer_expr(&assign(
        var("source"),
        array(vec![described(string("id"), int(1), "Primary key")]),
    ));
    analyzer.infer_expr(&assign(
        fetch(var("copy"), string("id")),
        fetch(var("source"), string("id")),
    ));

    let interner = ctx.interner();
    let copy = analyzer.scope().get_variable("copy");
    let Some(TypeData::KeyedArray(id)) = interner.lookup(copy) else {
        panic!("expected keyed array, got {}", ctx.format(copy));
    };
    let shape = interner.keyed_array_shape(id);
    let description = shape.items[0].description.map(|atom| interner.resolve_atom(atom));
    assert_eq!(description.as_deref(), Some("Primary key"));
}

#[test]
fn test_calls_become_references() {
    assert_eq!(
        infer(new_object("Foo", vec![int(1)])),
        "(new Foo(int(1)))"
    );
    assert_eq!(
        infer(pinfer_ast::builder::call("strlen", vec![string("a")])),
        "strlen(string(a))"
    );
    assert_eq!(
        infer(pinfer_ast::builder::prop(var("user"), "name")),
        "(unknown)->name"
    );
}

#[test]
fn test_this_calls_record_self_out() {
    let ctx = context();
    let context = ScopeContext::for_class(ctx.interner().intern_string("Foo"), None);
    let mut analyzer =
        FunctionAnalyzer::new(&ctx, Scope::new(context, Rc::new(NameTable::new())));

    let ty = analyzer.infer_expr(&method_call(this(), "setName", vec![string("x")]));
    assert_eq!(ctx.format(ty), "($this)->setName(string(x))");
    assert!(matches!(
        analyzer.self_out.as_slice(),
        [SelfOutSource::Call { parent: false, .. }]
    ));
}

#[test]
fn test_class_constants() {
    let ctx = context();
    let names = NameTable::with_namespace("App");
    let mut analyzer = FunctionAnalyzer::new(
        &ctx,
        Scope::new(ScopeContext::default(), Rc::new(names)),
    );

    let ty = analyzer.infer_expr(&class_const(class_name("User"), "class"));
    assert_eq!(ctx.format(ty), "string(App\\User)");
    let ty = analyzer.infer_expr(&Expr::ConstFetch("PHP_EOL".to_string()));
    assert_eq!(ty, TypeId::STRING);
}

#[test]
fn test_arrow_function_type() {
    assert_eq!(
        infer(arrow_fn(vec![param("x")], var("x"))),
        "<TX>(TX): TX"
    );
    let closure = pinfer_ast::builder::closure(
        vec![param("x")],
        &["y"],
        vec![Stmt::Return(Some(var("y")))],
    );
    assert_eq!(
        infer_after(vec![assign(var("y"), int(3))], closure),
        "<TX>(TX): int(3)"
    );
}

#[test]
fn test_casts() {
    let cast = |kind, value| Expr::Cast {
        kind,
        expr: Box::new(value),
    };
    assert_eq!(infer(cast(CastKind::Int, string("5"))), "int");
    assert_eq!(infer(cast(CastKind::Bool, int(1))), "boolean");
    assert_eq!(infer(cast(CastKind::Array, var("x"))), "array<mixed>");
    assert_eq!(infer(cast(CastKind::Object, var("x"))), "stdClass");
}
