//! Type interning.
//!
//! Every `TypeData` is stored once and named by a `TypeId`. Equal structures
//! get the same id, so type equality is an integer comparison, and ids are
//! immutable: substituting into a generic produces a new id and leaves every
//! holder of the original untouched.

use crate::types::*;
use pinfer_common::{Atom, AtomTable};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

/// Deduplicating store: equal values share one index.
struct Pool<T: ?Sized> {
    values: Vec<Arc<T>>,
    index: FxHashMap<Arc<T>, u32>,
}

impl<T: ?Sized + Eq + Hash> Pool<T> {
    fn new() -> Self {
        Pool {
            values: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    fn find(&self, value: &T) -> Option<u32> {
        self.index.get(value).copied()
    }

    fn add(&mut self, value: Arc<T>) -> u32 {
        let id = self.values.len() as u32;
        self.values.push(Arc::clone(&value));
        self.index.insert(value, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.values.get(id as usize).cloned()
    }
}

impl<T: Eq + Hash> Pool<T> {
    fn intern(&mut self, value: T) -> u32 {
        match self.find(&value) {
            Some(id) => id,
            None => self.add(Arc::new(value)),
        }
    }
}

impl<T: Eq + Hash> Pool<[T]> {
    /// Index 0 holds the empty list.
    fn with_empty() -> Self {
        let mut pool = Self::new();
        pool.add(Arc::from(Vec::new()));
        pool
    }

    fn intern_slice(&mut self, values: Vec<T>) -> u32 {
        match self.find(values.as_slice()) {
            Some(id) => id,
            None => self.add(Arc::from(values)),
        }
    }
}

// Writers never leave a pool half-updated, so a poisoned lock is still usable.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Type interning table.
///
/// Behind `RwLock`s so one interner can back several analysis runs.
pub struct TypeInterner {
    /// Class names, member names and string literal values.
    pub string_interner: AtomTable,
    types: RwLock<Pool<TypeData>>,
    type_lists: RwLock<Pool<[TypeId]>>,
    keyed_arrays: RwLock<Pool<KeyedArrayShape>>,
    generics: RwLock<Pool<GenericType>>,
    function_shapes: RwLock<Pool<FunctionShape>>,
    templates: RwLock<Pool<TemplateInfo>>,
    references: RwLock<Pool<ReferenceKind>>,
}

impl TypeInterner {
    pub fn new() -> Self {
        TypeInterner {
            string_interner: AtomTable::with_php_names(),
            types: RwLock::new(Pool::new()),
            type_lists: RwLock::new(Pool::with_empty()),
            keyed_arrays: RwLock::new(Pool::new()),
            generics: RwLock::new(Pool::new()),
            function_shapes: RwLock::new(Pool::new()),
            templates: RwLock::new(Pool::new()),
            references: RwLock::new(Pool::new()),
        }
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.string_interner.resolve(atom).to_string()
    }

    pub fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        read(&self.type_lists)
            .get(id.0)
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn keyed_array_shape(&self, id: KeyedArrayId) -> Arc<KeyedArrayShape> {
        read(&self.keyed_arrays).get(id.0).unwrap_or_else(|| {
            Arc::new(KeyedArrayShape {
                items: Vec::new(),
                is_list: true,
            })
        })
    }

    pub fn generic_type(&self, id: GenericId) -> Arc<GenericType> {
        read(&self.generics).get(id.0).unwrap_or_else(|| {
            Arc::new(GenericType {
                name: Atom::NONE,
                args: Vec::new(),
            })
        })
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        read(&self.function_shapes).get(id.0).unwrap_or_else(|| {
            Arc::new(FunctionShape {
                templates: Vec::new(),
                params: Vec::new(),
                return_type: TypeId::UNKNOWN,
            })
        })
    }

    pub fn template_info(&self, id: TemplateId) -> Arc<TemplateInfo> {
        read(&self.templates).get(id.0).unwrap_or_else(|| {
            Arc::new(TemplateInfo {
                name: Atom::NONE,
                owner: Atom::NONE,
                bound: None,
                default: None,
            })
        })
    }

    /// `None` only for ids this interner never produced.
    pub fn reference(&self, id: ReferenceId) -> Option<Arc<ReferenceKind>> {
        read(&self.references).get(id.0)
    }

    pub fn intern(&self, key: TypeData) -> TypeId {
        if let Some(id) = builtin_id(&key) {
            return id;
        }
        if let Some(index) = read(&self.types).find(&key) {
            return TypeId(TypeId::FIRST_USER + index);
        }
        let mut types = write(&self.types);
        // Another writer may have stored the key since the read.
        let index = match types.find(&key) {
            Some(index) => index,
            None => types.add(Arc::new(key)),
        };
        TypeId(TypeId::FIRST_USER + index)
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_intrinsic() {
            return builtin_data(id);
        }
        let index = id.0 - TypeId::FIRST_USER;
        read(&self.types).get(index).map(|data| TypeData::clone(&data))
    }

    /// Number of interned non-builtin types.
    pub fn len(&self) -> usize {
        read(&self.types).values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn literal_int(&self, value: i64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Int(value)))
    }

    pub fn literal_float(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Float(OrderedFloat(value))))
    }

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        if value { TypeId::TRUE } else { TypeId::FALSE }
    }

    pub fn object(&self, class_name: &str) -> TypeId {
        let atom = self.intern_string(class_name);
        self.intern(TypeData::Object(atom))
    }

    pub fn object_atom(&self, class_name: Atom) -> TypeId {
        self.intern(TypeData::Object(class_name))
    }

    pub fn generic(&self, name: Atom, args: Vec<TypeId>) -> TypeId {
        let id = {
            let mut generics = write(&self.generics);
            GenericId(generics.intern(GenericType { name, args }))
        };
        self.intern(TypeData::Generic(id))
    }

    /// `array<V>`, or `array<K, V>` when a key type is known.
    pub fn array(&self, key: Option<TypeId>, value: TypeId) -> TypeId {
        self.intern(TypeData::Array { key, value })
    }

    pub fn keyed_array(&self, items: Vec<ArrayItemType>, is_list: bool) -> TypeId {
        let id = {
            let mut shapes = write(&self.keyed_arrays);
            KeyedArrayId(shapes.intern(KeyedArrayShape { items, is_list }))
        };
        self.intern(TypeData::KeyedArray(id))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let id = {
            let mut shapes = write(&self.function_shapes);
            FunctionShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Function(id))
    }

    pub fn template(&self, info: TemplateInfo) -> TypeId {
        let id = {
            let mut templates = write(&self.templates);
            TemplateId(templates.intern(info))
        };
        self.intern(TypeData::Template(id))
    }

    pub fn reference_type(&self, kind: ReferenceKind) -> TypeId {
        let id = {
            let mut references = write(&self.references);
            ReferenceId(references.intern(kind))
        };
        self.intern(TypeData::Reference(id))
    }

    // =========================================================================
    // Unions
    // =========================================================================

    /// Intern a union type, flattening and deduplicating members.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    pub fn union3(&self, first: TypeId, second: TypeId, third: TypeId) -> TypeId {
        self.union_from_iter([first, second, third])
    }

    fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut iter = members.into_iter();
        let Some(first) = iter.next() else {
            return TypeId::NEVER;
        };
        let Some(second) = iter.next() else {
            return first;
        };

        let mut flat: TypeListBuffer = SmallVec::new();
        self.push_union_member(&mut flat, first);
        self.push_union_member(&mut flat, second);
        for member in iter {
            self.push_union_member(&mut flat, member);
        }

        self.normalize_union(flat)
    }

    fn push_union_member(&self, flat: &mut TypeListBuffer, member: TypeId) {
        if let Some(TypeData::Union(inner)) = self.lookup(member) {
            flat.extend(self.type_list(inner).iter().copied());
        } else {
            flat.push(member);
        }
    }

    /// Members keep their first-seen order; `unknown` is hoisted to the
    /// front so partially inferred unions read `unknown|...`.
    fn normalize_union(&self, mut flat: TypeListBuffer) -> TypeId {
        let mut seen = FxHashSet::default();
        flat.retain(|id| seen.insert(*id));

        if flat.len() > 1 {
            flat.retain(|id| *id != TypeId::NEVER);
        }
        if flat.is_empty() {
            return TypeId::NEVER;
        }
        if flat.len() == 1 {
            return flat[0];
        }

        // `mixed` swallows everything it can describe; `unknown` stays visible.
        if flat.contains(&TypeId::MIXED) {
            flat.retain(|id| *id == TypeId::MIXED || *id == TypeId::UNKNOWN);
        }

        // int(1)|int => int, true|boolean => boolean
        self.absorb_literals_into_primitives(&mut flat);

        if let Some(pos) = flat.iter().position(|id| *id == TypeId::UNKNOWN)
            && pos > 0
        {
            flat.remove(pos);
            flat.insert(0, TypeId::UNKNOWN);
        }

        if flat.len() == 1 {
            return flat[0];
        }

        let list_id = {
            let mut lists = write(&self.type_lists);
            TypeListId(lists.intern_slice(flat.into_vec()))
        };
        self.intern(TypeData::Union(list_id))
    }

    fn absorb_literals_into_primitives(&self, flat: &mut TypeListBuffer) {
        let has = |primitive: TypeId| flat.contains(&primitive);
        let (has_int, has_float, has_string, has_bool) = (
            has(TypeId::INT),
            has(TypeId::FLOAT),
            has(TypeId::STRING),
            has(TypeId::BOOLEAN),
        );
        if !(has_int || has_float || has_string || has_bool) {
            return;
        }
        flat.retain(|id| match self.lookup(*id) {
            Some(TypeData::Literal(literal)) => match literal.primitive() {
                TypeId::INT => !has_int,
                TypeId::FLOAT => !has_float,
                TypeId::STRING => !has_string,
                TypeId::BOOLEAN => !has_bool,
                _ => true,
            },
            _ => true,
        });
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Union members, or the type itself for non-unions.
    pub fn union_members(&self, ty: TypeId) -> Vec<TypeId> {
        match self.lookup(ty) {
            Some(TypeData::Union(list)) => self.type_list(list).to_vec(),
            _ => vec![ty],
        }
    }

    pub fn is_union(&self, ty: TypeId) -> bool {
        matches!(self.lookup(ty), Some(TypeData::Union(_)))
    }

    pub fn literal_value(&self, ty: TypeId) -> Option<LiteralValue> {
        match self.lookup(ty) {
            Some(TypeData::Literal(value)) => Some(value),
            _ => None,
        }
    }

    pub fn template_of(&self, ty: TypeId) -> Option<Arc<TemplateInfo>> {
        match self.lookup(ty) {
            Some(TypeData::Template(id)) => Some(self.template_info(id)),
            _ => None,
        }
    }

    pub fn is_template(&self, ty: TypeId) -> bool {
        matches!(self.lookup(ty), Some(TypeData::Template(_)))
    }

    /// Class name of an object or generic type.
    pub fn class_name_of(&self, ty: TypeId) -> Option<Atom> {
        match self.lookup(ty)? {
            TypeData::Object(name) => Some(name),
            TypeData::Generic(id) => Some(self.generic_type(id).name),
            _ => None,
        }
    }

    /// Remove `null` from a type (`?Foo` => `Foo`).
    pub fn remove_null(&self, ty: TypeId) -> TypeId {
        if ty == TypeId::NULL {
            return TypeId::NEVER;
        }
        match self.lookup(ty) {
            Some(TypeData::Union(list)) => self.union(
                self.type_list(list)
                    .iter()
                    .copied()
                    .filter(|member| *member != TypeId::NULL)
                    .collect(),
            ),
            _ => ty,
        }
    }

    /// Set-based sameness: unions compare regardless of member order.
    pub fn are_types_same(&self, left: TypeId, right: TypeId) -> bool {
        if left == right {
            return true;
        }
        match (self.lookup(left), self.lookup(right)) {
            (Some(TypeData::Union(a)), Some(TypeData::Union(b))) => {
                let a = self.type_list(a);
                let b = self.type_list(b);
                a.len() == b.len() && a.iter().all(|member| b.contains(member))
            }
            _ => false,
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys with a fixed id below `TypeId::FIRST_USER`.
fn builtin_id(key: &TypeData) -> Option<TypeId> {
    match key {
        TypeData::Intrinsic(kind) => Some(kind.to_type_id()),
        TypeData::Literal(LiteralValue::Boolean(true)) => Some(TypeId::TRUE),
        TypeData::Literal(LiteralValue::Boolean(false)) => Some(TypeId::FALSE),
        TypeData::This => Some(TypeId::THIS),
        _ => None,
    }
}

fn builtin_data(id: TypeId) -> Option<TypeData> {
    let data = match id {
        TypeId::TRUE => TypeData::Literal(LiteralValue::Boolean(true)),
        TypeId::FALSE => TypeData::Literal(LiteralValue::Boolean(false)),
        TypeId::THIS => TypeData::This,
        _ => TypeData::Intrinsic(match id {
            TypeId::UNKNOWN => IntrinsicKind::Unknown,
            TypeId::MIXED => IntrinsicKind::Mixed,
            TypeId::NEVER => IntrinsicKind::Never,
            TypeId::VOID => IntrinsicKind::Void,
            TypeId::NULL => IntrinsicKind::Null,
            TypeId::INT => IntrinsicKind::Int,
            TypeId::FLOAT => IntrinsicKind::Float,
            TypeId::STRING => IntrinsicKind::String,
            TypeId::BOOLEAN => IntrinsicKind::Boolean,
            _ => return None,
        }),
    };
    Some(data)
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod intern_tests;
