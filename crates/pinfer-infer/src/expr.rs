//! Expression rules of the body analyzer.
//!
//! Literal and operator expressions get their type directly. Calls, `new`
//! and member fetches become reference types carrying the evaluated argument
//! types; the resolver answers them later.

use pinfer_ast::{Arg, ArrayItem, BinaryOp, Callee, CastKind, ClassRef, Closure, Expr, UnaryOp};
use pinfer_common::Atom;
use pinfer_solver::utils::iterable_key_value;
use pinfer_solver::visitor::contains_references;
use pinfer_solver::{
    ArrayItemType, ArrayKey, CallArg, CalleeRef, ClassRefKind, FunctionShape, KeyedArrayShape,
    LiteralValue, ParamInfo, ReferenceKind, TemplateInfo, TypeData, TypeId, union_or_single,
    widen_literal, widen_type,
};
use tracing::trace;

use crate::analyzer::FunctionAnalyzer;
use crate::definition::SelfOutSource;
use crate::extensions::ExtensionContext;
use crate::type_hints::template_name_for;

fn is_this_variable(expr: &Expr) -> bool {
    matches!(expr, Expr::Variable(name) if name == "this")
}

fn keyed_item<'s>(shape: &'s KeyedArrayShape, key: &ArrayKey) -> Option<&'s ArrayItemType> {
    match key {
        ArrayKey::Int(index) if shape.is_list => usize::try_from(*index)
            .ok()
            .and_then(|index| shape.items.get(index)),
        _ => shape.item(key),
    }
}

/// Next implicit list index, advancing the counter. `None` past `PHP_INT_MAX`.
fn take_index(next_index: &mut Option<i64>) -> Option<i64> {
    let index = (*next_index)?;
    *next_index = index.checked_add(1);
    Some(index)
}

impl FunctionAnalyzer<'_> {
    pub fn infer_expr(&mut self, expr: &Expr) -> TypeId {
        if !self.depth.enter() {
            return TypeId::UNKNOWN;
        }
        let ty = self.infer_expr_inner(expr);
        self.depth.leave();
        ty
    }

    fn infer_expr_inner(&mut self, expr: &Expr) -> TypeId {
        let broker = self.ctx.extensions();
        if broker.has_exception_extensions() {
            let context = ExtensionContext::new(self.ctx, &self.scope.context);
            let thrown = broker.exceptions(expr, &self.scope, &context);
            self.throws.extend(thrown);
        }
        if broker.has_expression_extensions() {
            let context = ExtensionContext::new(self.ctx, &self.scope.context);
            if let Some(ty) = broker.expression_type(expr, &self.scope, &context) {
                return ty;
            }
        }

        let interner = self.ctx.interner();
        match expr {
            Expr::Int(value) => interner.literal_int(*value),
            Expr::Float(value) => interner.literal_float(*value),
            Expr::String(value) => interner.literal_string(value),
            Expr::Bool(value) => interner.literal_boolean(*value),
            Expr::Null => TypeId::NULL,
            Expr::Interpolated(parts) => {
                for part in parts {
                    self.infer_expr(part);
                }
                TypeId::STRING
            }
            Expr::Array(items) => self.array_literal(items),
            Expr::Variable(name) => self.scope.get_variable(name),
            Expr::Assign { target, value } => {
                let (ty, description) = self.infer_with_description(value);
                self.assign_to(target, ty, description);
                ty
            }
            Expr::AssignOp { op, target, value } => self.assign_op(*op, target, value),
            Expr::Binary { op, left, right } => self.binary(*op, left, right),
            Expr::Unary { op, operand } => self.unary(*op, operand),
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => self.ternary(condition, then.as_deref(), otherwise),
            Expr::Match { subject, arms } => {
                self.infer_expr(subject);
                let mut results = Vec::with_capacity(arms.len());
                for arm in arms {
                    for condition in &arm.conditions {
                        self.infer_expr(condition);
                    }
                    results.push(self.infer_expr(&arm.body));
                }
                union_or_single(interner, results)
            }
            Expr::Throw(value) => {
                let thrown = self.infer_expr(value);
                self.throws.push(thrown);
                TypeId::VOID
            }
            Expr::New { class, args } => {
                let args = self.call_args(args);
                match self.class_ref(class) {
                    Some(class) => interner.reference_type(ReferenceKind::New { class, args }),
                    None => TypeId::UNKNOWN,
                }
            }
            Expr::MethodCall {
                receiver,
                name,
                args,
                nullsafe,
            } => {
                let receiver_type = self.infer_expr(receiver);
                let args = self.call_args(args);
                let name = interner.intern_string(name);
                if is_this_variable(receiver) {
                    self.self_out.push(SelfOutSource::Call {
                        parent: false,
                        method: name,
                        args: args.clone(),
                    });
                }
                let reference = interner.reference_type(ReferenceKind::MethodCall {
                    receiver: receiver_type,
                    name,
                    args,
                });
                self.nullsafe(reference, *nullsafe)
            }
            Expr::StaticCall { class, name, args } => {
                let args = self.call_args(args);
                let Some(class) = self.class_ref(class) else {
                    return TypeId::UNKNOWN;
                };
                let name = interner.intern_string(name);
                if class == ClassRefKind::ParentClass
                    && interner.resolve_atom_ref(name).eq_ignore_ascii_case("__construct")
                {
                    self.self_out.push(SelfOutSource::Call {
                        parent: true,
                        method: name,
                        args: args.clone(),
                    });
                }
                interner.reference_type(ReferenceKind::StaticCall { class, name, args })
            }
            Expr::PropertyFetch {
                receiver,
                name,
                nullsafe,
            } => {
                let receiver = self.infer_expr(receiver);
                let reference = interner.reference_type(ReferenceKind::PropertyFetch {
                    receiver,
                    name: interner.intern_string(name),
                });
                self.nullsafe(reference, *nullsafe)
            }
            Expr::StaticPropertyFetch { class, name } => match self.class_ref(class) {
                Some(class) => interner.reference_type(ReferenceKind::StaticPropertyFetch {
                    class,
                    name: interner.intern_string(name.trim_start_matches('$')),
                }),
                None => TypeId::UNKNOWN,
            },
            Expr::ClassConstFetch { class, name } => self.class_constant(class, name),
            Expr::ConstFetch(name) => global_constant(name),
            Expr::Call { callee, args } => {
                let callee = match callee {
                    Callee::Name(name) => CalleeRef::Function(
                        interner.intern_string(&self.scope.resolve_function_name(name)),
                    ),
                    Callee::Expr(value) => CalleeRef::Value(self.infer_expr(value)),
                };
                let args = self.call_args(args);
                interner.reference_type(ReferenceKind::CallableCall { callee, args })
            }
            Expr::ArrayFetch { target, key } => {
                let container = self.infer_expr(target);
                let key = key.as_ref().map(|key| self.infer_expr(key));
                self.read_array(container, key).unwrap_or(TypeId::UNKNOWN)
            }
            Expr::Closure(closure) => self.closure_type(closure, false),
            Expr::ArrowFunction(closure) => self.closure_type(closure, true),
            Expr::Cast { kind, expr } => {
                let operand = self.infer_expr(expr);
                match kind {
                    CastKind::Int => TypeId::INT,
                    CastKind::Float => TypeId::FLOAT,
                    CastKind::String => TypeId::STRING,
                    CastKind::Bool => TypeId::BOOLEAN,
                    CastKind::Array => match interner.lookup(operand) {
                        Some(TypeData::Array { .. } | TypeData::KeyedArray(_)) => operand,
                        _ => interner.array(None, TypeId::MIXED),
                    },
                    CastKind::Object => interner.object("stdClass"),
                    CastKind::Unset => TypeId::NULL,
                }
            }
            Expr::Isset(values) => {
                for value in values {
                    self.infer_expr(value);
                }
                TypeId::BOOLEAN
            }
            Expr::Empty(value) | Expr::InstanceOf { expr: value, .. } => {
                self.infer_expr(value);
                TypeId::BOOLEAN
            }
            Expr::Clone(value) => self.infer_expr(value),
            Expr::Unsupported(label) => {
                trace!(label = %label, "no rule for expression");
                TypeId::UNKNOWN
            }
        }
    }

    fn nullsafe(&self, ty: TypeId, nullsafe: bool) -> TypeId {
        if nullsafe {
            self.ctx.interner().union2(ty, TypeId::NULL)
        } else {
            ty
        }
    }

    pub(crate) fn call_args(&mut self, args: &[Arg]) -> Vec<CallArg> {
        let interner = self.ctx.interner();
        args.iter()
            .map(|arg| CallArg {
                name: arg.name.as_deref().map(|name| interner.intern_string(name)),
                ty: self.infer_expr(&arg.value),
            })
            .collect()
    }

    pub(crate) fn class_ref(&mut self, class: &ClassRef) -> Option<ClassRefKind> {
        let interner = self.ctx.interner();
        match class {
            ClassRef::Name(name) => Some(match name.to_ascii_lowercase().as_str() {
                "self" => ClassRefKind::SelfClass,
                "static" => ClassRefKind::StaticClass,
                "parent" => ClassRefKind::ParentClass,
                _ => ClassRefKind::Named(
                    interner.intern_string(&self.scope.resolve_class_name(name)),
                ),
            }),
            ClassRef::SelfKw => Some(ClassRefKind::SelfClass),
            ClassRef::Static => Some(ClassRefKind::StaticClass),
            ClassRef::Parent => Some(ClassRefKind::ParentClass),
            ClassRef::Expr(value) => {
                let ty = self.infer_expr(value);
                if ty == TypeId::THIS {
                    return Some(ClassRefKind::StaticClass);
                }
                match interner.literal_value(ty) {
                    Some(LiteralValue::String(name)) => {
                        let name = interner.resolve_atom(name);
                        Some(ClassRefKind::Named(
                            interner.intern_string(name.trim_start_matches('\\')),
                        ))
                    }
                    _ => interner.class_name_of(ty).map(ClassRefKind::Named),
                }
            }
        }
    }

    fn class_constant(&mut self, class: &ClassRef, name: &str) -> TypeId {
        let interner = self.ctx.interner();
        let kind = self.class_ref(class);
        let lexical = match kind {
            Some(ClassRefKind::Named(atom)) => Some(atom),
            Some(ClassRefKind::SelfClass | ClassRefKind::StaticClass) => self.scope.context.class,
            Some(ClassRefKind::ParentClass) => self.scope.context.parent,
            None => None,
        };
        if name.eq_ignore_ascii_case("class") {
            return match (kind, lexical) {
                (Some(ClassRefKind::StaticClass), _) | (_, None) => TypeId::STRING,
                (_, Some(atom)) => interner.literal_string(&interner.resolve_atom_ref(atom)),
            };
        }
        let Some(class) = lexical else {
            return TypeId::UNKNOWN;
        };
        let class_id = self.ctx.get_class(&interner.resolve_atom(class));
        let constant = interner.intern_string(name);
        self.ctx.with_class(class_id, |def| match def.constants.get(&constant) {
            Some(value) => *value,
            // Enum cases are instances of the enum.
            None if def.kind == pinfer_ast::ClassKind::Enum => interner.object_atom(def.name),
            None => TypeId::UNKNOWN,
        })
    }

    fn binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> TypeId {
        if op == BinaryOp::Coalesce {
            return self.coalesce(left, right);
        }
        let left = self.infer_expr(left);
        let right = self.infer_expr(right);
        if op.is_boolean() {
            return TypeId::BOOLEAN;
        }
        match op {
            BinaryOp::Concat => TypeId::STRING,
            BinaryOp::Spaceship => TypeId::INT,
            _ if op.is_bitwise() => TypeId::INT,
            _ => self.arithmetic(op, left, right),
        }
    }

    pub(crate) fn arithmetic(&self, op: BinaryOp, left: TypeId, right: TypeId) -> TypeId {
        let interner = self.ctx.interner();
        let left = widen_literal(interner, left);
        let right = widen_literal(interner, right);
        let is_number = |ty: TypeId| ty == TypeId::INT || ty == TypeId::FLOAT;
        if op == BinaryOp::Add
            && matches!(
                interner.lookup(left),
                Some(TypeData::Array { .. } | TypeData::KeyedArray(_))
            )
        {
            return left;
        }
        match op {
            BinaryOp::Mod => TypeId::INT,
            BinaryOp::Div if left == TypeId::FLOAT || right == TypeId::FLOAT => TypeId::FLOAT,
            BinaryOp::Div => interner.union2(TypeId::INT, TypeId::FLOAT),
            _ if left == TypeId::INT && right == TypeId::INT => TypeId::INT,
            _ if is_number(left) && is_number(right) => TypeId::FLOAT,
            _ => interner.union2(TypeId::INT, TypeId::FLOAT),
        }
    }

    /// `left ?? right`: a left side that is certainly absent contributes nothing.
    fn coalesce(&mut self, left: &Expr, right: &Expr) -> TypeId {
        let interner = self.ctx.interner();
        let left = match left {
            Expr::Variable(name) if name != "this" && !self.scope.has_variable(name) => None,
            Expr::ArrayFetch {
                target,
                key: Some(key),
            } => {
                let container = self.infer_expr(target);
                let key = self.infer_expr(key);
                self.read_array(container, Some(key))
            }
            _ => Some(self.infer_expr(left)),
        };
        let right = self.infer_expr(right);
        match left.map(|left| interner.remove_null(left)) {
            Some(left) if left != TypeId::NEVER => interner.union2(left, right),
            _ => right,
        }
    }

    fn assign_op(&mut self, op: BinaryOp, target: &Expr, value: &Expr) -> TypeId {
        let interner = self.ctx.interner();
        let current = match target {
            Expr::Variable(name) if !self.scope.has_variable(name) => None,
            _ => Some(self.infer_expr(target)),
        };
        let value = self.infer_expr(value);
        let result = match op {
            BinaryOp::Coalesce => match current.map(|current| interner.remove_null(current)) {
                Some(current) if current != TypeId::NEVER => interner.union2(current, value),
                _ => value,
            },
            BinaryOp::Concat => TypeId::STRING,
            _ if op.is_bitwise() => TypeId::INT,
            _ => self.arithmetic(op, current.unwrap_or(TypeId::NULL), value),
        };
        self.assign_to(target, result, None);
        result
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr) -> TypeId {
        let interner = self.ctx.interner();
        let numeric = |ty: TypeId| {
            let ty = widen_literal(interner, ty);
            if ty == TypeId::INT || ty == TypeId::FLOAT {
                ty
            } else {
                interner.union2(TypeId::INT, TypeId::FLOAT)
            }
        };
        match op {
            UnaryOp::Not => {
                self.infer_expr(operand);
                TypeId::BOOLEAN
            }
            UnaryOp::BitNot => {
                self.infer_expr(operand);
                TypeId::INT
            }
            UnaryOp::Minus => {
                let ty = self.infer_expr(operand);
                match interner.literal_value(ty) {
                    Some(LiteralValue::Int(value)) => value
                        .checked_neg()
                        .map(|negated| interner.literal_int(negated))
                        .unwrap_or(TypeId::INT),
                    Some(LiteralValue::Float(value)) => interner.literal_float(-value.0),
                    _ => numeric(ty),
                }
            }
            UnaryOp::Plus => {
                let ty = self.infer_expr(operand);
                numeric(ty)
            }
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                let current = self.infer_expr(operand);
                let widened = widen_literal(interner, current);
                let updated = if widened == TypeId::UNKNOWN || widened == TypeId::NULL {
                    TypeId::INT
                } else if widened == TypeId::STRING {
                    TypeId::STRING
                } else {
                    numeric(widened)
                };
                self.assign_to(operand, updated, None);
                match op {
                    UnaryOp::PreInc | UnaryOp::PreDec => updated,
                    _ => current,
                }
            }
        }
    }

    fn ternary(&mut self, condition: &Expr, then: Option<&Expr>, otherwise: &Expr) -> TypeId {
        let interner = self.ctx.interner();
        let condition = self.infer_expr(condition);
        match then {
            Some(then) => {
                let then = self.infer_expr(then);
                let otherwise = self.infer_expr(otherwise);
                interner.union2(then, otherwise)
            }
            None => {
                let otherwise = self.infer_expr(otherwise);
                match self.truthiness(condition) {
                    Some(true) => condition,
                    Some(false) => otherwise,
                    None => interner.union2(condition, otherwise),
                }
            }
        }
    }

    /// Compile-time truthiness of a type, when it has one.
    pub(crate) fn truthiness(&self, ty: TypeId) -> Option<bool> {
        let interner = self.ctx.interner();
        if ty == TypeId::NULL {
            return Some(false);
        }
        match interner.lookup(ty)? {
            TypeData::Literal(LiteralValue::Boolean(value)) => Some(value),
            TypeData::Literal(LiteralValue::Int(value)) => Some(value != 0),
            TypeData::Literal(LiteralValue::Float(value)) => Some(value.0 != 0.0),
            TypeData::Literal(LiteralValue::String(atom)) => {
                let value = interner.resolve_atom_ref(atom);
                Some(!value.is_empty() && &*value != "0")
            }
            TypeData::KeyedArray(id) => {
                let shape = interner.keyed_array_shape(id);
                if shape.items.is_empty() {
                    Some(false)
                } else if shape.items.iter().any(|item| !item.optional) {
                    Some(true)
                } else {
                    None
                }
            }
            TypeData::Object(_) | TypeData::Generic(_) | TypeData::Function(_) => Some(true),
            _ => None,
        }
    }

    fn array_key_of(&self, ty: TypeId) -> Option<ArrayKey> {
        let interner = self.ctx.interner();
        match interner.literal_value(ty)? {
            LiteralValue::Int(value) => Some(ArrayKey::Int(value)),
            LiteralValue::String(atom) => {
                let value = interner.resolve_atom_ref(atom);
                match value.parse::<i64>() {
                    Ok(index) if index.to_string() == *value => Some(ArrayKey::Int(index)),
                    _ => Some(ArrayKey::String(atom)),
                }
            }
            LiteralValue::Boolean(value) => Some(ArrayKey::Int(i64::from(value))),
            LiteralValue::Float(_) => None,
        }
    }

    fn array_literal(&mut self, items: &[ArrayItem]) -> TypeId {
        let interner = self.ctx.interner();
        let has_keys = items.iter().any(|item| item.key.is_some());
        let mut result: Vec<ArrayItemType> = Vec::with_capacity(items.len());
        // `None` once an index past `PHP_INT_MAX` would be needed.
        let mut next_index = Some(0i64);
        // Keys and values of items whose key is not a literal.
        let mut loose_keys: Vec<TypeId> = Vec::new();
        let mut loose_values: Vec<TypeId> = Vec::new();

        for item in items {
            let (value, carried) = self.infer_with_description(&item.value);
            let description = item
                .description
                .as_deref()
                .map(|text| interner.intern_string(text))
                .or(carried);
            if item.unpack {
                match interner.lookup(value) {
                    Some(TypeData::KeyedArray(id)) if interner.keyed_array_shape(id).is_list => {
                        for spread in interner.keyed_array_shape(id).items.iter() {
                            let key = if has_keys {
                                let Some(index) = take_index(&mut next_index) else {
                                    loose_keys.push(TypeId::INT);
                                    loose_values.push(spread.value);
                                    continue;
                                };
                                Some(ArrayKey::Int(index))
                            } else {
                                None
                            };
                            result.push(ArrayItemType {
                                key,
                                ..spread.clone()
                            });
                        }
                    }
                    _ => {
                        let (key, value) = iterable_key_value(interner, value)
                            .unwrap_or((TypeId::INT, TypeId::UNKNOWN));
                        loose_keys.push(key);
                        loose_values.push(value);
                    }
                }
                continue;
            }
            let key = match &item.key {
                None if has_keys => match take_index(&mut next_index) {
                    Some(index) => Some(ArrayKey::Int(index)),
                    None => {
                        loose_keys.push(TypeId::INT);
                        loose_values.push(value);
                        continue;
                    }
                },
                None => None,
                Some(key_expr) => {
                    let key_type = self.infer_expr(key_expr);
                    match self.array_key_of(key_type) {
                        Some(key) => {
                            if let ArrayKey::Int(index) = key {
                                next_index = next_index
                                    .zip(index.checked_add(1))
                                    .map(|(next, after)| next.max(after));
                            }
                            Some(key)
                        }
                        None => {
                            loose_keys.push(widen_literal(interner, key_type));
                            loose_values.push(value);
                            continue;
                        }
                    }
                }
            };
            if let Some(key) = key {
                if let Some(existing) = result.iter_mut().find(|item| item.key == Some(key)) {
                    existing.value = value;
                    existing.description = description.or(existing.description);
                    continue;
                }
            }
            result.push(ArrayItemType {
                key,
                value,
                optional: false,
                description,
            });
        }

        if loose_keys.is_empty() {
            return interner.keyed_array(result, !has_keys);
        }
        let shape = interner.keyed_array(result, !has_keys);
        if let Some((key, value)) = iterable_key_value(interner, shape) {
            if key != TypeId::NEVER {
                loose_keys.push(widen_type(interner, key));
                loose_values.push(value);
            }
        }
        interner.array(
            Some(union_or_single(interner, loose_keys)),
            union_or_single(interner, loose_values),
        )
    }

    /// Element type of `container[key]`. `None` when the key is certainly
    /// absent from a keyed array.
    pub(crate) fn read_array(&self, container: TypeId, key: Option<TypeId>) -> Option<TypeId> {
        let interner = self.ctx.interner();
        if container == TypeId::STRING {
            return Some(TypeId::STRING);
        }
        match interner.lookup(container) {
            Some(TypeData::KeyedArray(id)) => {
                let shape = interner.keyed_array_shape(id);
                match key.and_then(|key| self.array_key_of(key)) {
                    Some(key) => keyed_item(&shape, &key).map(|item| item.value),
                    None if shape.items.is_empty() => None,
                    None => iterable_key_value(interner, container).map(|(_, value)| value),
                }
            }
            Some(TypeData::Array { value, .. }) => Some(value),
            Some(TypeData::Union(list)) => {
                let values: Vec<TypeId> = interner
                    .type_list(list)
                    .iter()
                    .filter(|member| **member != TypeId::NULL)
                    .filter_map(|member| self.read_array(*member, key))
                    .collect();
                (!values.is_empty()).then(|| union_or_single(interner, values))
            }
            Some(TypeData::Literal(LiteralValue::String(_))) => Some(TypeId::STRING),
            _ => Some(
                iterable_key_value(interner, container)
                    .map(|(_, value)| value)
                    .unwrap_or(TypeId::UNKNOWN),
            ),
        }
    }

    /// Type of an assigned value plus the doc description of the keyed item
    /// it was read from.
    fn infer_with_description(&mut self, value: &Expr) -> (TypeId, Option<Atom>) {
        let Expr::ArrayFetch {
            target,
            key: Some(key),
        } = value
        else {
            return (self.infer_expr(value), None);
        };
        let interner = self.ctx.interner();
        let container = self.infer_expr(target);
        let key = self.infer_expr(key);
        let ty = self.read_array(container, Some(key)).unwrap_or(TypeId::UNKNOWN);
        let description = match (interner.lookup(container), self.array_key_of(key)) {
            (Some(TypeData::KeyedArray(id)), Some(key)) => {
                keyed_item(&interner.keyed_array_shape(id), &key).and_then(|item| item.description)
            }
            _ => None,
        };
        (ty, description)
    }

    pub(crate) fn assign_to(&mut self, target: &Expr, ty: TypeId, description: Option<Atom>) {
        let interner = self.ctx.interner();
        match target {
            Expr::Variable(name) => self.scope.set_variable(name, ty),
            Expr::ArrayFetch {
                target: container,
                key,
            } => {
                let current = self.infer_expr(container);
                let key = key.as_ref().map(|key| self.infer_expr(key));
                if let Some(updated) = self.array_write(current, key, ty, description) {
                    self.assign_to(container, updated, None);
                }
            }
            Expr::PropertyFetch { receiver, name, .. } if is_this_variable(receiver) => {
                self.record_property_assignment(name, ty);
            }
            // `[$a, $b] = ...` and `['x' => $x] = ...`
            Expr::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    let key = match &item.key {
                        Some(key) => self.infer_expr(key),
                        None => interner.literal_int(index as i64),
                    };
                    let value = self.read_array(ty, Some(key)).unwrap_or(TypeId::UNKNOWN);
                    self.assign_to(&item.value, value, None);
                }
            }
            _ => {}
        }
    }

    /// The container after `container[key] = value`; `None` when the
    /// container is not an array the analyzer tracks.
    fn array_write(
        &self,
        current: TypeId,
        key: Option<TypeId>,
        value: TypeId,
        description: Option<Atom>,
    ) -> Option<TypeId> {
        let interner = self.ctx.interner();
        if current == TypeId::UNKNOWN || current == TypeId::NULL {
            let empty = KeyedArrayShape {
                items: Vec::new(),
                is_list: true,
            };
            return Some(self.write_keyed(current, &empty, key, value, description));
        }
        match interner.lookup(current)? {
            TypeData::KeyedArray(id) => {
                let shape = interner.keyed_array_shape(id);
                Some(self.write_keyed(current, &shape, key, value, description))
            }
            TypeData::Array {
                key: array_key,
                value: array_value,
            } => {
                let key = match (array_key, key) {
                    (Some(existing), Some(key)) => {
                        Some(interner.union2(existing, widen_literal(interner, key)))
                    }
                    (existing, _) => existing,
                };
                Some(interner.array(key, interner.union2(array_value, value)))
            }
            _ => None,
        }
    }

    fn write_keyed(
        &self,
        current: TypeId,
        shape: &KeyedArrayShape,
        key: Option<TypeId>,
        value: TypeId,
        description: Option<Atom>,
    ) -> TypeId {
        let interner = self.ctx.interner();
        let mut items = shape.items.clone();
        let new_item = |key| ArrayItemType {
            key,
            value,
            optional: false,
            description,
        };
        let Some(key_type) = key else {
            if shape.is_list {
                items.push(new_item(None));
                return interner.keyed_array(items, true);
            }
            let next = items
                .iter()
                .filter_map(|item| match item.key {
                    Some(ArrayKey::Int(index)) => Some(index.saturating_add(1)),
                    _ => None,
                })
                .max()
                .unwrap_or(0);
            items.push(new_item(Some(ArrayKey::Int(next))));
            return interner.keyed_array(items, false);
        };

        let Some(array_key) = self.array_key_of(key_type) else {
            let (existing_key, existing_value) = if shape.items.is_empty() {
                (TypeId::NEVER, TypeId::NEVER)
            } else {
                iterable_key_value(interner, current).unwrap_or((TypeId::NEVER, TypeId::NEVER))
            };
            return interner.array(
                Some(widen_type(interner, interner.union2(existing_key, key_type))),
                interner.union2(existing_value, value),
            );
        };

        if shape.is_list {
            if let ArrayKey::Int(index) = array_key {
                if let Ok(position) = usize::try_from(index) {
                    if position < items.len() {
                        items[position].value = value;
                        items[position].description = description.or(items[position].description);
                        return interner.keyed_array(items, true);
                    }
                    if position == items.len() {
                        items.push(new_item(None));
                        return interner.keyed_array(items, true);
                    }
                }
            }
            for (index, item) in items.iter_mut().enumerate() {
                item.key = Some(ArrayKey::Int(index as i64));
            }
        }
        match items.iter_mut().find(|item| item.key == Some(array_key)) {
            Some(existing) => {
                existing.value = value;
                existing.optional = false;
                existing.description = description.or(existing.description);
            }
            None => items.push(new_item(Some(array_key))),
        }
        interner.keyed_array(items, false)
    }

    fn closure_type(&mut self, closure: &Closure, arrow: bool) -> TypeId {
        let interner = self.ctx.interner();
        let owner = interner.intern_string("{closure}");
        let mut scope = self.scope.child();
        if closure.is_static {
            scope.context.is_static = true;
        }
        if arrow {
            scope.replace_variables(self.scope.variables().clone());
        } else {
            for captured in &closure.uses {
                if self.scope.has_variable(&captured.name) {
                    scope.set_variable(&captured.name, self.scope.get_variable(&captured.name));
                }
            }
        }

        let hints = self.scope.hint_context(interner);
        let mut templates = Vec::new();
        let mut params = Vec::with_capacity(closure.params.len());
        for param in &closure.params {
            let ty = match param.declared_type() {
                Some(hint) => hints.resolve(hint),
                None if self.ctx.options().untyped_parameters_as_templates => {
                    let template = interner.template(TemplateInfo {
                        name: interner.intern_string(&template_name_for(&param.name)),
                        owner,
                        bound: None,
                        default: None,
                    });
                    templates.push(template);
                    template
                }
                None => TypeId::MIXED,
            };
            params.push(ParamInfo {
                name: interner.intern_string(&param.name),
                ty,
                optional: param.default.is_some(),
                variadic: param.variadic,
            });
            let bound = if param.variadic {
                interner.array(None, ty)
            } else {
                ty
            };
            scope.set_variable(&param.name, bound);
        }
        let declared = closure.return_type.as_ref().map(|hint| hints.resolve(hint));
        drop(hints);

        let mut body = FunctionAnalyzer::new(self.ctx, scope);
        body.analyze_body(&closure.body);
        if !arrow {
            for captured in closure.uses.iter().filter(|captured| captured.by_ref) {
                if body.scope.has_variable(&captured.name) {
                    let updated = body.scope.get_variable(&captured.name);
                    self.scope.set_variable(&captured.name, updated);
                }
            }
        }
        let return_type = declared.unwrap_or_else(|| body.return_type());
        trace!(
            params = params.len(),
            unresolved = contains_references(interner, return_type),
            "closure"
        );
        interner.function(FunctionShape {
            templates,
            params,
            return_type,
        })
    }
}

fn global_constant(name: &str) -> TypeId {
    match name.trim_start_matches('\\').to_ascii_uppercase().as_str() {
        "TRUE" => TypeId::TRUE,
        "FALSE" => TypeId::FALSE,
        "NULL" => TypeId::NULL,
        "PHP_EOL" | "PHP_VERSION" | "PHP_OS" | "PHP_OS_FAMILY" | "DIRECTORY_SEPARATOR"
        | "PATH_SEPARATOR" => TypeId::STRING,
        "PHP_INT_MAX" | "PHP_INT_MIN" | "PHP_INT_SIZE" | "PHP_MAJOR_VERSION"
        | "PHP_MINOR_VERSION" | "E_ALL" | "E_ERROR" | "E_WARNING" | "E_NOTICE"
        | "JSON_THROW_ON_ERROR" | "JSON_PRETTY_PRINT" | "SORT_REGULAR" => TypeId::INT,
        "PHP_FLOAT_EPSILON" | "PHP_FLOAT_MAX" | "PHP_FLOAT_MIN" | "M_PI" | "M_E" | "NAN"
        | "INF" => TypeId::FLOAT,
        _ => TypeId::UNKNOWN,
    }
}

#[cfg(test)]
#[path = "../tests/expr_tests.rs"]
mod expr_tests;
