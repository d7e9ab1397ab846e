use super::*;

fn template(interner: &TypeInterner, name: &str, default: Option<TypeId>) -> TypeId {
    interner.template(TemplateInfo {
        name: interner.intern_string(name),
        owner: interner.intern_string("foo"),
        bound: None,
        default,
    })
}

fn param(interner: &TypeInterner, name: &str, ty: TypeId) -> ParamInfo {
    ParamInfo {
        name: interner.intern_string(name),
        ty,
        optional: false,
        variadic: false,
    }
}

#[test]
fn test_solve_direct_template() {
    let interner = TypeInterner::new();

    let t = template(&interner, "TA", None);
    let wow = interner.literal_string("wow");
    let subst = infer_templates(&interner, &[t], &[param(&interner, "a", t)], &[CallArg::positional(wow)]);
    assert_eq!(subst.get(t), Some(wow));
}

#[test]
fn test_solve_through_nullable() {
    let interner = TypeInterner::new();

    let t = template(&interner, "T", None);
    let foo = interner.object("Foo");
    let declared = interner.union2(t, TypeId::NULL);
    let actual = interner.union2(foo, TypeId::NULL);

    let mut solver = TemplateSolver::new(&interner);
    assert_eq!(solver.solve(declared, actual, t), Some(foo));
}

#[test]
fn test_solve_is_deterministic_with_extra_union_members() {
    let interner = TypeInterner::new();

    let t = template(&interner, "T", None);
    let foo = interner.object("Foo");
    let declared = interner.union3(TypeId::INT, t, TypeId::STRING);

    let mut solver = TemplateSolver::new(&interner);
    assert_eq!(solver.solve(declared, foo, t), Some(foo));
    assert_eq!(solver.solve(declared, TypeId::INT, t), None);
}

#[test]
fn test_solve_array_value() {
    let interner = TypeInterner::new();

    let t = template(&interner, "T", None);
    let declared = interner.array(None, t);
    let one = interner.literal_int(1);
    let two = interner.literal_int(2);
    let list = interner.keyed_array(
        vec![ArrayItemType::new(None, one), ArrayItemType::new(None, two)],
        true,
    );

    let mut solver = TemplateSolver::new(&interner);
    let solution = solver.solve(declared, list, t);
    assert_eq!(solution.map(|ty| interner.format(ty)), Some("int(1)|int(2)".to_string()));
}

#[test]
fn test_solve_iterable_generic_key_and_value() {
    let interner = TypeInterner::new();

    let k = template(&interner, "K", None);
    let v = template(&interner, "V", None);
    let declared = interner.generic(interner.intern_string("iterable"), vec![k, v]);
    let actual = interner.array(Some(TypeId::STRING), TypeId::FLOAT);

    let mut solver = TemplateSolver::new(&interner);
    assert_eq!(solver.solve(declared, actual, k), Some(TypeId::STRING));
    assert_eq!(solver.solve(declared, actual, v), Some(TypeId::FLOAT));
}

#[test]
fn test_solve_same_generic_arguments() {
    let interner = TypeInterner::new();

    let t = template(&interner, "T", None);
    let name = interner.intern_string("Collection");
    let declared = interner.generic(name, vec![TypeId::INT, t]);
    let actual = interner.generic(name, vec![TypeId::INT, interner.object("User")]);

    let mut solver = TemplateSolver::new(&interner);
    assert_eq!(solver.solve(declared, actual, t), Some(interner.object("User")));
}

#[test]
fn test_solve_callback_return() {
    let interner = TypeInterner::new();

    let t = template(&interner, "T", None);
    let declared = interner.function(FunctionShape {
        templates: vec![],
        params: vec![],
        return_type: t,
    });
    let actual = interner.function(FunctionShape {
        templates: vec![],
        params: vec![],
        return_type: interner.literal_int(7),
    });

    let mut solver = TemplateSolver::new(&interner);
    assert_eq!(solver.solve(declared, actual, t), Some(interner.literal_int(7)));
}

#[test]
fn test_unsolved_uses_default_then_unknown() {
    let interner = TypeInterner::new();

    let a = template(&interner, "A", Some(TypeId::INT));
    let b = template(&interner, "B", None);
    let subst = infer_templates(
        &interner,
        &[a, b],
        &[param(&interner, "a", a), param(&interner, "b", b)],
        &[],
    );
    assert_eq!(subst.get(a), Some(TypeId::INT));
    assert_eq!(subst.get(b), Some(TypeId::UNKNOWN));
}

#[test]
fn test_named_arguments_bind_by_name() {
    let interner = TypeInterner::new();

    let a = template(&interner, "A", None);
    let b = template(&interner, "B", None);
    let params = [param(&interner, "first", a), param(&interner, "second", b)];
    let args = [CallArg {
        name: Some(interner.intern_string("second")),
        ty: TypeId::STRING,
    }];

    assert_eq!(match_arguments(&params, &args), vec![(1, TypeId::STRING)]);
    let subst = infer_templates(&interner, &[a, b], &params, &args);
    assert_eq!(subst.get(b), Some(TypeId::STRING));
    assert_eq!(subst.get(a), Some(TypeId::UNKNOWN));
}

#[test]
fn test_variadic_collects_all_arguments() {
    let interner = TypeInterner::new();

    let t = template(&interner, "T", None);
    let params = [ParamInfo {
        variadic: true,
        ..param(&interner, "items", t)
    }];
    let args = [
        CallArg::positional(TypeId::INT),
        CallArg::positional(TypeId::STRING),
    ];

    assert_eq!(match_arguments(&params, &args), vec![(0, TypeId::INT), (0, TypeId::STRING)]);
    let subst = infer_templates(&interner, &[t], &params, &args);
    assert_eq!(subst.get(t).map(|ty| interner.format(ty)), Some("int|string".to_string()));
}
