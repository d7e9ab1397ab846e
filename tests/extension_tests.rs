//! Custom extensions registered through the `Infer` facade.

use std::rc::Rc;

use pinfer::ast::builder::{
    call, class, class_name, expr, function, int, method_call, new_object, prop, ret,
    static_call, string,
};
use pinfer::ast::{ClassDecl, Expr, FunctionDecl, NameTable, SourceFile};
use pinfer::infer::extensions::{
    ExpressionTypeExtension, ExtensionContext, FunctionCallEvent, FunctionReturnTypeExtension,
    MethodCallEvent, MethodReturnTypeExtension, PropertyFetchEvent, PropertyTypeExtension,
    StaticCallEvent, StaticMethodReturnTypeExtension,
};
use pinfer::infer::Scope;
use pinfer::{ExtensionsBroker, Infer, InferOptions, MemorySources, TypeId};

fn sources(classes: Vec<ClassDecl>, functions: Vec<FunctionDecl>) -> MemorySources {
    pinfer::tracing_config::init_tracing();
    let mut file = SourceFile::new(NameTable::new());
    file.classes = classes.into_iter().map(Rc::new).collect();
    file.functions = functions.into_iter().map(Rc::new).collect();
    MemorySources::new().with_file(file)
}

fn expression(infer: &Infer, value: Expr) -> String {
    infer.format(infer.expression_type(&value, Rc::new(NameTable::new())))
}

/// `config('key')` is always a string.
struct ConfigHelper;

impl FunctionReturnTypeExtension for ConfigHelper {
    fn function_return_type(
        &self,
        event: &FunctionCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        (ctx.class_name(event.name) == "config").then_some(TypeId::STRING)
    }
}

/// `Model::query()` returns a builder over the model.
struct QueryBuilder;

impl StaticMethodReturnTypeExtension for QueryBuilder {
    fn static_method_return_type(
        &self,
        event: &StaticCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        let interner = ctx.interner();
        if interner.resolve_atom(event.name) != "query"
            || !ctx.is_subclass_of(&ctx.class_name(event.class), "Model")
        {
            return None;
        }
        Some(interner.generic(
            interner.intern_string("Builder"),
            vec![interner.object_atom(event.class)],
        ))
    }
}

/// Magic attributes: any undeclared property of a model is a string.
struct Attributes;

impl PropertyTypeExtension for Attributes {
    fn property_type(
        &self,
        event: &PropertyFetchEvent,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        ctx.is_subclass_of(&ctx.class_name(event.class), "Model")
            .then_some(TypeId::STRING)
    }
}

/// `APP_VERSION` is a known constant.
struct Constants;

impl ExpressionTypeExtension for Constants {
    fn expression_type(
        &self,
        expr: &Expr,
        _scope: &Scope,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        match expr {
            Expr::ConstFetch(name) if name == "APP_VERSION" => {
                Some(ctx.interner().literal_string("1.2.0"))
            }
            _ => None,
        }
    }
}

/// `->first()` on a builder answers with the builder's model by resolving
/// a reference the extension builds itself.
struct FirstModel;

impl MethodReturnTypeExtension for FirstModel {
    fn applies_to(&self, class: &str, _ctx: &ExtensionContext<'_>) -> bool {
        class == "Builder"
    }

    fn method_return_type(
        &self,
        event: &MethodCallEvent<'_>,
        ctx: &ExtensionContext<'_>,
    ) -> Option<TypeId> {
        let interner = ctx.interner();
        if interner.resolve_atom(event.name) != "first" {
            return None;
        }
        let pinfer::solver::TypeData::Generic(id) = interner.lookup(event.receiver)? else {
            return None;
        };
        let model = interner.generic_type(id).args.first().copied()?;
        Some(interner.union(vec![ctx.resolve(model), TypeId::NULL]))
    }
}

fn models() -> Vec<ClassDecl> {
    vec![
        class("Model").build(),
        class("User").extends("Model").build(),
        class("Invoice").build(),
    ]
}

fn registered(classes: Vec<ClassDecl>, functions: Vec<FunctionDecl>) -> Infer {
    let mut infer = Infer::new(sources(classes, functions));
    let extensions = infer.extensions_mut();
    extensions.register_function_return_type(ConfigHelper);
    extensions.register_static_method_return_type(QueryBuilder);
    extensions.register_property_type(Attributes);
    extensions.register_expression_type(Constants);
    extensions.register_method_return_type(FirstModel);
    infer
}

#[test]
fn test_function_return_extension() {
    let settings = function("settings")
        .body(vec![ret(call("config", vec![string("app.name")]))])
        .build();
    let infer = registered(Vec::new(), vec![settings]);

    let ty = infer.function_type("settings").unwrap();
    assert_eq!(infer.format(ty), "(): string");
}

#[test]
fn test_static_method_extension() {
    let infer = registered(models(), Vec::new());

    assert_eq!(
        expression(&infer, static_call(class_name("User"), "query", Vec::new())),
        "Builder<User>"
    );
    // Not a model: no extension answer and no such method.
    assert_eq!(
        expression(&infer, static_call(class_name("Invoice"), "query", Vec::new())),
        "unknown"
    );
}

#[test]
fn test_extension_results_are_resolved() {
    let infer = registered(models(), Vec::new());

    let first = method_call(
        static_call(class_name("User"), "query", Vec::new()),
        "first",
        Vec::new(),
    );
    assert_eq!(expression(&infer, first), "User|null");
}

#[test]
fn test_property_extension() {
    let infer = registered(models(), Vec::new());

    assert_eq!(
        expression(&infer, prop(new_object("User", Vec::new()), "email")),
        "string"
    );
    assert_eq!(
        expression(&infer, prop(new_object("Invoice", Vec::new()), "email")),
        "unknown"
    );
}

#[test]
fn test_expression_extension_runs_first() {
    let infer = registered(Vec::new(), Vec::new());

    assert_eq!(
        expression(&infer, Expr::ConstFetch("APP_VERSION".to_string())),
        "string(1.2.0)"
    );
    assert_eq!(
        expression(&infer, Expr::ConstFetch("PHP_EOL".to_string())),
        "string"
    );
}

#[test]
fn test_without_builtin_extensions() {
    let guard = function("guard")
        .body(vec![expr(call("abort", vec![int(404)]))])
        .build();
    let controller = class("Controller").method(guard).build();

    let plain = Infer::with_extensions(
        sources(vec![controller.clone()], Vec::new()),
        InferOptions::default(),
        ExtensionsBroker::new(),
    );
    assert!(plain.method_exceptions("Controller", "guard").unwrap().is_empty());

    let builtin = Infer::new(sources(vec![controller], Vec::new()));
    let thrown = builtin.method_exceptions("Controller", "guard").unwrap();
    assert_eq!(thrown.len(), 1);
}
