use super::*;
use crate::definition::DefinitionState;
use crate::extensions::ExtensionsBroker;
use crate::options::InferOptions;
use crate::reflection::{ReflectedClass, ReflectedMethod};
use crate::source::MemorySources;
use pinfer_ast::builder::{
    class, class_const, class_name, function, hint, int, param, string, trait_decl,
};
use pinfer_ast::{Param, PropertyDecl, SourceFile, TemplateDecl, TypeHint, Visibility};

fn context(classes: Vec<ClassDecl>) -> InferContext {
    let file = SourceFile {
        names: Rc::new(NameTable::new()),
        classes: classes.into_iter().map(Rc::new).collect(),
        functions: Vec::new(),
    };
    InferContext::new(
        Box::new(MemorySources::new().with_file(file)),
        ExtensionsBroker::new(),
        InferOptions::default(),
    )
}

fn typed_property(name: &str, type_hint: TypeHint) -> PropertyDecl {
    PropertyDecl {
        doc_type: Some(type_hint),
        ..PropertyDecl::new(name)
    }
}

fn property_type(ctx: &InferContext, class: &str, property: &str) -> String {
    let id = ctx.get_class(class);
    let ty = ctx.with_class(id, |def| {
        def.property(ctx.interner(), property)
            .map(|property| property.ty)
            .unwrap_or(TypeId::NEVER)
    });
    ctx.format(ty)
}

#[test]
fn test_untyped_property_becomes_template() {
    let counter = class("Counter")
        .property_decl(PropertyDecl {
            default: Some(int(0)),
            ..PropertyDecl::new("count")
        })
        .property_decl(typed_property("label", hint("string")))
        .build();
    let ctx = context(vec![counter]);
    let interner = ctx.interner();

    let id = ctx.get_class("Counter");
    ctx.with_class(id, |def| {
        assert_eq!(def.state, ClassState::Ready);
        assert_eq!(def.templates.len(), 1);
        let count = def.property(interner, "count").unwrap();
        assert!(def.is_template(count.ty));
        let info = interner.template_of(count.ty).unwrap();
        assert_eq!(interner.resolve_atom(info.name), "TCount");
        assert_eq!(info.default, Some(interner.literal_int(0)));
        assert_eq!(def.property(interner, "label").unwrap().ty, TypeId::STRING);
    });
}

#[test]
fn test_inherited_members_share_definitions() {
    let base = class("Base")
        .implements("JsonSerializable")
        .method(function("name").build())
        .build();
    let child = class("Child").extends("Base").build();
    let ctx = context(vec![base, child]);
    let interner = ctx.interner();

    let base_id = ctx.get_class("Base");
    let child_id = ctx.get_class("Child");
    let inherited = ctx.with_class(child_id, |def| def.method(interner, "NAME"));
    assert!(inherited.is_some());
    assert_eq!(
        inherited,
        ctx.with_class(base_id, |def| def.method(interner, "name"))
    );
    let ancestors: Vec<String> = ctx.with_class(child_id, |def| {
        def.ancestors.iter().map(|atom| interner.resolve_atom(*atom)).collect()
    });
    assert_eq!(ancestors, vec!["Base", "JsonSerializable"]);
}

#[test]
fn test_extends_binds_parent_templates() {
    let base = class("Box")
        .template(TemplateDecl::new("T"))
        .property_decl(typed_property("item", hint("T")))
        .build();
    let ints = class("IntBox").extends_with("Box", vec![hint("int")]).build();
    let open = class("OpenBox").extends("Box").build();
    let ctx = context(vec![base, ints, open]);

    assert_eq!(property_type(&ctx, "IntBox", "item"), "int");
    let ints = ctx.get_class("IntBox");
    assert!(ctx.with_class(ints, |def| def.templates.is_empty()));

    // Without `@extends` arguments the parent template stays open.
    assert_eq!(property_type(&ctx, "OpenBox", "item"), "T");
    let open = ctx.get_class("OpenBox");
    assert_eq!(ctx.with_class(open, |def| def.templates.len()), 1);
}

#[test]
fn test_trait_arguments_substitute_members() {
    let holder = trait_decl("HoldsValue")
        .template(TemplateDecl::new("T"))
        .property_decl(typed_property("value", hint("T")))
        .method(function("get").doc_returns(hint("T")).build())
        .build();
    let user = class("IntHolder")
        .uses("HoldsValue", vec![hint("int")])
        .build();
    let ctx = context(vec![holder, user]);
    let interner = ctx.interner();

    assert_eq!(property_type(&ctx, "IntHolder", "value"), "int");
    let id = ctx.get_class("IntHolder");
    let get = ctx.with_class(id, |def| def.method(interner, "get")).unwrap();
    ctx.with_function(get, |def| {
        assert!(def.flags.contains(FunctionFlags::FROM_TRAIT));
        assert_eq!(def.declared_return, Some(TypeId::INT));
        assert_eq!(def.class, Some(interner.intern_string("IntHolder")));
        assert_eq!(def.state, DefinitionState::Pending);
    });
}

#[test]
fn test_untyped_trait_property_belongs_to_user() {
    let counts = trait_decl("Counts").property("count").build();
    let user = class("Tally").uses("Counts", Vec::new()).build();
    let ctx = context(vec![counts, user]);
    let interner = ctx.interner();

    let id = ctx.get_class("Tally");
    ctx.with_class(id, |def| {
        let count = def.property(interner, "count").unwrap();
        let info = interner.template_of(count.ty).unwrap();
        assert_eq!(interner.resolve_atom(info.owner), "Tally");
        assert!(def.is_template(count.ty));
        assert_eq!(interner.resolve_atom(count.declaring_class), "Tally");
    });
}

#[test]
fn test_ancestor_cycle_terminates() {
    let a = class("A").extends("B").build();
    let b = class("B").extends("A").build();
    let ctx = context(vec![a, b]);

    let id = ctx.get_class("A");
    ctx.with_class(id, |def| assert_eq!(def.state, ClassState::Ready));
}

#[test]
fn test_constants_see_earlier_constants() {
    let config = class("Config")
        .constant("LIMIT", int(10))
        .constant("MAX", class_const(class_name("self"), "LIMIT"))
        .constant("NAME", string("app"))
        .build();
    let ctx = context(vec![config]);
    let interner = ctx.interner();

    let id = ctx.get_class("Config");
    ctx.with_class(id, |def| {
        let constant = |name: &str| def.constants[&interner.intern_string(name)];
        assert_eq!(constant("MAX"), interner.literal_int(10));
        assert_eq!(interner.format(constant("NAME")), "string(app)");
    });
}

#[test]
fn test_promoted_parameters_are_properties() {
    let ctor = function("__construct")
        .param(Param {
            promoted: Some(Visibility::Private),
            ..param("id")
        })
        .param(Param {
            promoted: Some(Visibility::Public),
            type_hint: Some(hint("string")),
            ..param("name")
        })
        .build();
    let ctx = context(vec![class("Dto").method(ctor).build()]);

    assert_eq!(property_type(&ctx, "Dto", "id"), "TId");
    assert_eq!(property_type(&ctx, "Dto", "name"), "string");
}

#[test]
fn test_interface_methods_are_abstract() {
    let mut contract = class("Contract").method(function("handle").build()).build();
    contract.kind = ClassKind::Interface;
    let ctx = context(vec![contract]);
    let interner = ctx.interner();

    let id = ctx.get_class("Contract");
    let handle = ctx.with_class(id, |def| def.method(interner, "handle")).unwrap();
    assert!(ctx.with_function(handle, |def| def.flags.contains(FunctionFlags::ABSTRACT)));
}

#[test]
fn test_reflected_class() {
    let mut sources = MemorySources::new();
    sources.add_reflected_class(
        ReflectedClass::new("Vendor\\Client")
            .with_property("timeout", Some(hint("int")))
            .with_method(ReflectedMethod::new("send", Some(hint("bool")))),
    );
    let ctx = InferContext::new(
        Box::new(sources),
        ExtensionsBroker::new(),
        InferOptions::default(),
    );
    let interner = ctx.interner();

    assert_eq!(property_type(&ctx, "\\Vendor\\Client", "timeout"), "int");
    let id = ctx.get_class("Vendor\\Client");
    let send = ctx.with_class(id, |def| def.method(interner, "send")).unwrap();
    ctx.with_function(send, |def| {
        assert!(def.flags.contains(FunctionFlags::REFLECTED));
        assert_eq!(def.return_type, TypeId::BOOLEAN);
        assert_eq!(def.state, DefinitionState::Analyzed);
    });
}
