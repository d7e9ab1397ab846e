//! End-to-end inference through the `Infer` facade.

use std::rc::Rc;

use pinfer::ast::builder::{
    array, assign, call, class, class_name, described, elvis, expr, fetch, function, hint,
    if_then, int, keyed, method_call, new_object, param, prop, ret, static_call, string, this,
    trait_decl, var,
};
use pinfer::ast::{
    ClassDecl, Expr, FunctionDecl, NameTable, PropertyDecl, SourceFile, TemplateDecl, TypeHint,
};
use pinfer::infer::reflection::{
    ReflectedClass, ReflectedFunction, ReflectedMethod, ReflectedParam,
};
use pinfer::solver::TypeData;
use pinfer::{Infer, InferError, InferOptions, MemorySources, TypeId};

fn sources(classes: Vec<ClassDecl>, functions: Vec<FunctionDecl>) -> MemorySources {
    pinfer::tracing_config::init_tracing();
    let mut file = SourceFile::new(NameTable::new());
    file.classes = classes.into_iter().map(Rc::new).collect();
    file.functions = functions.into_iter().map(Rc::new).collect();
    MemorySources::new().with_file(file)
}

fn infer(classes: Vec<ClassDecl>, functions: Vec<FunctionDecl>) -> Infer {
    Infer::new(sources(classes, functions))
}

fn expression(infer: &Infer, value: Expr) -> String {
    infer.format(infer.expression_type(&value, Rc::new(NameTable::new())))
}

fn typed_property(name: &str, type_hint: TypeHint) -> PropertyDecl {
    PropertyDecl {
        doc_type: Some(type_hint),
        ..PropertyDecl::new(name)
    }
}

fn foo_with_constructor() -> ClassDecl {
    let ctor = function("__construct")
        .param(param("a"))
        .body(vec![expr(assign(prop(this(), "prop"), var("a")))])
        .build();
    class("Foo").property("prop").method(ctor).build()
}

#[test]
fn test_identity_function() {
    let identity = function("foo")
        .param(param("a"))
        .body(vec![ret(var("a"))])
        .build();
    let infer = infer(Vec::new(), vec![identity]);

    let ty = infer.function_type("foo").unwrap();
    assert_eq!(infer.format(ty), "<TA>(TA): TA");
    assert_eq!(expression(&infer, call("foo", vec![string("wow")])), "string(wow)");
}

#[test]
fn test_method_calling_this_method() {
    let foo = class("Foo")
        .method(
            function("foo")
                .body(vec![ret(method_call(this(), "bar", Vec::new()))])
                .build(),
        )
        .method(function("bar").body(vec![ret(int(2))]).build())
        .build();
    let infer = infer(vec![foo], Vec::new());

    let foo = infer.method_type("Foo", "foo").unwrap();
    let bar = infer.method_type("Foo", "bar").unwrap();
    assert_eq!(infer.format(foo), "(): int(2)");
    assert_eq!(infer.format(bar), "(): int(2)");
}

#[test]
fn test_recursive_method_terminates() {
    let foo = class("Foo")
        .method(
            function("foo")
                .body(vec![
                    if_then(call("cond", Vec::new()), vec![ret(int(1))]),
                    ret(method_call(this(), "foo", Vec::new())),
                ])
                .build(),
        )
        .build();
    let infer = infer(vec![foo], Vec::new());

    let ty = infer.method_type("Foo", "foo").unwrap();
    assert_eq!(infer.format(ty), "(): unknown|int(1)");
}

#[test]
fn test_elvis_operator() {
    let infer = infer(Vec::new(), Vec::new());

    assert_eq!(
        expression(&infer, elvis(call("unknown", Vec::new()), int(1))),
        "unknown|int(1)"
    );
    assert_eq!(expression(&infer, elvis(int(1), int(1))), "int(1)");
    assert_eq!(
        expression(
            &infer,
            elvis(call("unknown", Vec::new()), call("unknown", Vec::new()))
        ),
        "unknown"
    );
}

#[test]
fn test_constructor_assigned_property() {
    let infer = infer(vec![foo_with_constructor()], Vec::new());

    assert_eq!(
        expression(&infer, prop(new_object("Foo", vec![string("wow")]), "prop")),
        "string(wow)"
    );
    assert_eq!(
        expression(&infer, new_object("Foo", vec![int(42)])),
        "Foo<int(42)>"
    );
    // Instantiations are independent of each other.
    assert_eq!(
        expression(&infer, new_object("Foo", vec![string("x")])),
        "Foo<string(x)>"
    );
    let declared = infer.property_type("Foo", "$prop").unwrap();
    assert_eq!(infer.format(declared), "TProp");
}

#[test]
fn test_generic_trait_argument() {
    let holder = trait_decl("HoldsValue")
        .template(TemplateDecl::new("T"))
        .property_decl(typed_property("value", hint("T")))
        .method(
            function("get")
                .doc_returns(hint("T"))
                .body(vec![ret(prop(this(), "value"))])
                .build(),
        )
        .build();
    let user = class("Answer")
        .uses("HoldsValue", vec![TypeHint::IntLiteral(42)])
        .build();
    let infer = infer(vec![holder, user], Vec::new());

    let ty = infer.method_return_type("Answer", "get").unwrap();
    assert_eq!(infer.format(ty), "int(42)");
    let value = infer.property_type("Answer", "value").unwrap();
    assert_eq!(infer.format(value), "int(42)");
}

fn returned_item_description(infer: &Infer, function: &str) -> Option<String> {
    let interner = infer.interner();
    let ty = infer.function_type(function).unwrap();
    let Some(TypeData::Function(id)) = interner.lookup(ty) else {
        panic!("expected a function type");
    };
    let returned = interner.function_shape(id).return_type;
    assert_eq!(infer.format(returned), "array{bar: int(42)}");
    let Some(TypeData::KeyedArray(shape)) = interner.lookup(returned) else {
        panic!("expected a keyed array");
    };
    let description = interner.keyed_array_shape(shape).items[0].description;
    description.map(|atom| interner.resolve_atom(atom))
}

#[test]
fn test_descriptions_survive_copies() {
    let old = || {
        expr(assign(
            var("old"),
            array(vec![described(string("foo"), int(42), "The answer")]),
        ))
    };
    let written = function("written")
        .body(vec![
            old(),
            expr(assign(
                fetch(var("new"), string("bar")),
                fetch(var("old"), string("foo")),
            )),
            ret(var("new")),
        ])
        .build();
    let literal = function("literal")
        .body(vec![
            old(),
            ret(array(vec![keyed(string("bar"), fetch(var("old"), string("foo")))])),
        ])
        .build();
    let infer = infer(Vec::new(), vec![written, literal]);

    assert_eq!(
        returned_item_description(&infer, "written").as_deref(),
        Some("The answer")
    );
    assert_eq!(
        returned_item_description(&infer, "literal").as_deref(),
        Some("The answer")
    );
}

#[test]
fn test_mutual_recursion() {
    let even = function("even")
        .body(vec![ret(call("odd", Vec::new()))])
        .build();
    let odd = function("odd")
        .body(vec![
            if_then(var("done"), vec![ret(string("odd"))]),
            ret(call("even", Vec::new())),
        ])
        .build();
    let infer = infer(Vec::new(), vec![even, odd]);

    let even = infer.function_type("even").unwrap();
    assert_eq!(infer.format(even), "(): unknown|string(odd)");
    infer.finalize();
    let odd = infer.function_type("odd").unwrap();
    assert_eq!(infer.format(odd), "(): unknown|string(odd)");
}

#[test]
fn test_fluent_setters() {
    let builder = class("Query")
        .property("limit")
        .method(
            function("take")
                .param(param("count"))
                .body(vec![
                    expr(assign(prop(this(), "limit"), var("count"))),
                    ret(this()),
                ])
                .build(),
        )
        .build();
    let infer = infer(vec![builder], Vec::new());

    let chained = method_call(new_object("Query", Vec::new()), "take", vec![int(10)]);
    assert_eq!(expression(&infer, chained.clone()), "Query<int(10)>");
    assert_eq!(expression(&infer, prop(chained, "limit")), "int(10)");
}

#[test]
fn test_extends_binds_parent_templates() {
    let base = class("Repository")
        .template(TemplateDecl::new("TModel"))
        .property_decl(typed_property("model", hint("TModel")))
        .method(
            function("first")
                .doc_returns(hint("TModel"))
                .body(vec![ret(prop(this(), "model"))])
                .build(),
        )
        .build();
    let users = class("UserRepository")
        .extends_with("Repository", vec![hint("User")])
        .build();
    let infer = infer(vec![base, users, class("User").build()], Vec::new());

    let ty = infer.method_return_type("UserRepository", "first").unwrap();
    assert_eq!(infer.format(ty), "User");
    let ty = infer.method_return_type("Repository", "first").unwrap();
    assert_eq!(infer.format(ty), "TModel");
    let model = infer.property_type("UserRepository", "model").unwrap();
    assert_eq!(infer.format(model), "User");
}

#[test]
fn test_late_static_binding() {
    let parent = class("P")
        .method(
            function("make")
                .body(vec![ret(static_call(class_name("static"), "value", Vec::new()))])
                .build(),
        )
        .method(
            function("foo")
                .body(vec![ret(method_call(this(), "value", Vec::new()))])
                .build(),
        )
        .method(function("value").body(vec![ret(int(1))]).build())
        .build();
    let child = class("C")
        .extends("P")
        .method(function("value").body(vec![ret(int(2))]).build())
        .build();
    let infer = infer(vec![parent, child], Vec::new());

    let make = infer.method_return_type("C", "make").unwrap();
    assert_eq!(infer.format(make), "int(2)");
    let make = infer.method_return_type("P", "make").unwrap();
    assert_eq!(infer.format(make), "int(1)");
    let foo = method_call(new_object("C", Vec::new()), "foo", Vec::new());
    assert_eq!(expression(&infer, foo), "int(2)");
}

#[test]
fn test_declared_return_policy() {
    let model = class("Model").build();
    let user = class("User").extends("Model").build();
    let service = class("Service")
        .method(
            function("count")
                .returns(hint("int"))
                .body(vec![ret(int(3))])
                .build(),
        )
        .method(
            function("find")
                .returns(hint("Model"))
                .body(vec![ret(new_object("User", Vec::new()))])
                .build(),
        )
        .build();
    let infer = infer(vec![model, user, service], Vec::new());

    let count = infer.method_return_type("Service", "count").unwrap();
    let find = infer.method_return_type("Service", "find").unwrap();
    assert_eq!(count, TypeId::INT);
    assert_eq!(infer.format(find), "User");
}

#[test]
fn test_reflected_dependencies() {
    let mut sources = sources(
        Vec::new(),
        vec![
            function("send")
                .param(pinfer::ast::builder::typed_param("mailer", hint("Vendor\\Mailer")))
                .body(vec![ret(method_call(var("mailer"), "queue", vec![int(5)]))])
                .build(),
            function("measure")
                .body(vec![ret(call("strlen", vec![string("abc")]))])
                .build(),
        ],
    );
    sources.add_reflected_class(
        ReflectedClass::new("Vendor\\Mailer").with_method(
            ReflectedMethod::new("queue", Some(hint("T")))
                .with_template(TemplateDecl::new("T"))
                .with_param(ReflectedParam::new("delay", Some(hint("T")))),
        ),
    );
    sources.add_reflected_function(ReflectedFunction::new("strlen", Some(hint("int"))));
    let infer = Infer::new(sources);

    let send = infer.function_type("send").unwrap();
    assert_eq!(infer.format(send), "(Vendor\\Mailer): int(5)");
    let measure = infer.function_type("measure").unwrap();
    assert_eq!(infer.format(measure), "(): int");
}

#[test]
fn test_thrown_exceptions() {
    let controller = class("Controller")
        .method(
            function("show")
                .throws(hint("NotFound"))
                .body(vec![
                    expr(call("abort", vec![int(404)])),
                    expr(pinfer::ast::builder::throw(new_object("Denied", Vec::new()))),
                ])
                .build(),
        )
        .build();
    let infer = infer(vec![controller], Vec::new());

    let thrown: Vec<String> = infer
        .method_exceptions("Controller", "show")
        .unwrap()
        .into_iter()
        .map(|ty| infer.format(ty))
        .collect();
    assert_eq!(
        thrown,
        vec![
            "NotFound",
            "Symfony\\Component\\HttpKernel\\Exception\\HttpException",
            "Denied",
        ]
    );
}

#[test]
fn test_options_change_inference() {
    let options = InferOptions::from_json(r#"{"untypedParametersAsTemplates": false}"#).unwrap();
    let identity = function("identity")
        .param(param("a"))
        .body(vec![ret(var("a"))])
        .build();
    let infer = Infer::with_options(sources(Vec::new(), vec![identity]), options);

    let ty = infer.function_type("identity").unwrap();
    assert_eq!(infer.format(ty), "(mixed): mixed");
}

#[test]
fn test_unknown_members_are_errors() {
    let infer = infer(vec![class("Empty").build()], Vec::new());

    let err = infer.method_type("\\Empty", "missing").unwrap_err();
    assert_eq!(
        err,
        InferError::UnknownMethod {
            class: "Empty".to_string(),
            method: "missing".to_string(),
        }
    );
    assert_eq!(err.to_string(), "method Empty::missing() is not defined");
    assert!(matches!(
        infer.property_type("Empty", "nope"),
        Err(InferError::UnknownProperty { .. })
    ));
    assert_eq!(
        infer.function_type("nowhere").unwrap_err().to_string(),
        "function nowhere() is not defined"
    );
}
