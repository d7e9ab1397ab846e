use super::*;
use rustc_hash::FxHashMap;

struct TestHierarchy {
    parents: FxHashMap<Atom, Atom>,
}

impl ClassHierarchy for TestHierarchy {
    fn is_subclass_of(&self, class: Atom, ancestor: Atom) -> bool {
        let mut current = Some(class);
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.parents.get(&name).copied();
        }
        false
    }
}

#[test]
fn test_literals_accepted_by_primitive() {
    let interner = TypeInterner::new();

    assert!(is_accepted_by(&interner, &FlatHierarchy, interner.literal_int(1), TypeId::INT));
    assert!(is_accepted_by(&interner, &FlatHierarchy, interner.literal_int(1), TypeId::FLOAT));
    assert!(is_accepted_by(&interner, &FlatHierarchy, TypeId::INT, TypeId::FLOAT));
    assert!(!is_accepted_by(&interner, &FlatHierarchy, TypeId::STRING, TypeId::INT));
}

#[test]
fn test_unknown_only_accepted_by_mixed() {
    let interner = TypeInterner::new();

    assert!(is_accepted_by(&interner, &FlatHierarchy, TypeId::UNKNOWN, TypeId::MIXED));
    assert!(!is_accepted_by(&interner, &FlatHierarchy, TypeId::UNKNOWN, TypeId::INT));
    assert!(is_accepted_by(&interner, &FlatHierarchy, TypeId::NEVER, TypeId::INT));
}

#[test]
fn test_unions() {
    let interner = TypeInterner::new();

    let int_or_null = interner.union2(TypeId::INT, TypeId::NULL);
    assert!(is_accepted_by(&interner, &FlatHierarchy, TypeId::NULL, int_or_null));
    assert!(is_accepted_by(&interner, &FlatHierarchy, interner.literal_int(3), int_or_null));
    let int_or_string = interner.union2(TypeId::INT, TypeId::STRING);
    assert!(!is_accepted_by(&interner, &FlatHierarchy, int_or_string, int_or_null));
}

#[test]
fn test_objects_by_hierarchy() {
    let interner = TypeInterner::new();

    let model = interner.intern_string("Model");
    let user = interner.intern_string("User");
    let mut parents = FxHashMap::default();
    parents.insert(user, model);
    let hierarchy = TestHierarchy { parents };

    let user_ty = interner.object_atom(user);
    let model_ty = interner.object_atom(model);
    assert!(is_accepted_by(&interner, &hierarchy, user_ty, model_ty));
    assert!(!is_accepted_by(&interner, &hierarchy, model_ty, user_ty));
    assert!(is_accepted_by(&interner, &hierarchy, user_ty, interner.object("object")));

    let generic_user = interner.generic(user, vec![TypeId::INT]);
    assert!(is_accepted_by(&interner, &hierarchy, generic_user, model_ty));
}

#[test]
fn test_arrays() {
    let interner = TypeInterner::new();

    let list = interner.keyed_array(
        vec![ArrayItemType::new(None, interner.literal_int(1))],
        true,
    );
    assert!(is_accepted_by(&interner, &FlatHierarchy, list, interner.array(None, TypeId::INT)));
    assert!(!is_accepted_by(&interner, &FlatHierarchy, list, interner.array(None, TypeId::STRING)));

    let empty = interner.keyed_array(vec![], true);
    assert!(is_accepted_by(&interner, &FlatHierarchy, empty, interner.array(None, TypeId::STRING)));
}

#[test]
fn test_function_accepted_by_closure() {
    let interner = TypeInterner::new();

    let function = interner.function(FunctionShape {
        templates: vec![],
        params: vec![],
        return_type: TypeId::INT,
    });
    assert!(is_accepted_by(&interner, &FlatHierarchy, function, interner.object("Closure")));
    assert!(!is_accepted_by(&interner, &FlatHierarchy, function, interner.object("Foo")));
}
