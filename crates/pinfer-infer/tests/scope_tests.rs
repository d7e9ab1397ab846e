use super::*;
use pinfer_solver::TemplateInfo;

fn class_scope(interner: &TypeInterner, is_static: bool) -> Scope {
    let context = ScopeContext {
        is_static,
        ..ScopeContext::for_class(interner.intern_string("App\\Foo"), None)
    };
    Scope::new(context, Rc::new(NameTable::with_namespace("App")))
}

#[test]
fn test_unassigned_variable_is_unknown() {
    let scope = Scope::new(ScopeContext::default(), Rc::new(NameTable::new()));
    assert_eq!(scope.get_variable("missing"), TypeId::UNKNOWN);
    assert!(!scope.has_variable("missing"));
}

#[test]
fn test_this_in_class_code() {
    let interner = TypeInterner::new();

    let scope = class_scope(&interner, false);
    assert_eq!(scope.get_variable("this"), TypeId::THIS);

    let static_scope = class_scope(&interner, true);
    assert_eq!(static_scope.get_variable("this"), TypeId::UNKNOWN);

    let free = Scope::new(ScopeContext::default(), Rc::new(NameTable::new()));
    assert_eq!(free.get_variable("this"), TypeId::UNKNOWN);
}

#[test]
fn test_this_cannot_be_reassigned() {
    let interner = TypeInterner::new();
    let mut scope = class_scope(&interner, false);
    scope.set_variable("this", TypeId::INT);
    assert_eq!(scope.get_variable("this"), TypeId::THIS);
}

#[test]
fn test_child_keeps_templates_not_variables() {
    let interner = TypeInterner::new();
    let mut scope = class_scope(&interner, false);
    let template = interner.template(TemplateInfo {
        name: interner.intern_string("T"),
        owner: interner.intern_string("App\\Foo"),
        bound: None,
        default: None,
    });
    scope.add_template(&interner, template);
    scope.set_variable("a", TypeId::INT);

    let child = scope.child();
    assert_eq!(child.template("T"), Some(template));
    assert!(!child.has_variable("a"));
    assert_eq!(child.context, scope.context);
    assert_eq!(
        child.hint_context(&interner).resolve(&pinfer_ast::TypeHint::named("T")),
        template
    );
}

#[test]
fn test_name_resolution_uses_namespace() {
    let interner = TypeInterner::new();
    let scope = class_scope(&interner, false);
    assert_eq!(scope.resolve_class_name("Bar"), "App\\Bar");
    assert_eq!(scope.resolve_function_name("helper"), "App\\helper");
    assert_eq!(scope.resolve_function_name("\\strlen"), "strlen");
}

#[test]
fn test_remove_and_replace_variables() {
    let mut scope = Scope::new(ScopeContext::default(), Rc::new(NameTable::new()));
    scope.set_variable("a", TypeId::INT);
    scope.set_variable("b", TypeId::STRING);
    scope.remove_variable("a");
    assert!(!scope.has_variable("a"));

    let mut replacement = FxHashMap::default();
    replacement.insert("c".to_string(), TypeId::FLOAT);
    scope.replace_variables(replacement);
    assert_eq!(scope.variables().len(), 1);
    assert_eq!(scope.get_variable("c"), TypeId::FLOAT);
}
