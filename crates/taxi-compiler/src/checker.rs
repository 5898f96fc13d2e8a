//! Type assignability.
//!
//! `is_assignable` is an ordered rule chain; the first rule that decides
//! wins. Parameterized types are covariant: `Array<Dog>` is assignable to
//! `Array<Animal>` when `Dog` inherits `Animal`, never the reverse.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::primitives::PrimitiveType;
use crate::types::{GenericKind, GenericType, Type, TypeArena, TypeId, Value};

#[derive(Debug, Clone, Copy)]
pub struct TypeChecker<'a> {
    arena: &'a TypeArena,
}

impl<'a> TypeChecker<'a> {
    pub fn new(arena: &'a TypeArena) -> Self {
        Self { arena }
    }

    pub fn is_assignable_to(&self, value: TypeId, target: TypeId) -> bool {
        self.is_assignable(value, target, true)
    }

    pub fn is_assignable(&self, value: TypeId, target: TypeId, consider_type_parameters: bool) -> bool {
        let arena = self.arena;
        let value = arena.resolve_aliases(value);
        let target = arena.resolve_aliases(target);

        if self.resolves_same_as(value, target, consider_type_parameters) {
            return true;
        }

        if let Type::Enum(enum_type) = &arena[target] {
            let bare = [PrimitiveType::String.type_id(), enum_type.base_primitive().type_id()];
            return bare.contains(&value) || arena.inherits(value, target);
        }

        // Naked primitives may be assigned to anything narrowing them.
        if let Type::Primitive(primitive) = arena[value] {
            if arena.base_primitive(target) == Some(primitive) {
                return true;
            }
        }

        if matches!(arena[value], Type::TypeArgument(_)) || matches!(arena[target], Type::TypeArgument(_)) {
            return true;
        }

        if let Type::Lambda(lambda) = &arena[target] {
            return self.is_assignable(value, lambda.return_type, consider_type_parameters);
        }

        if consider_type_parameters {
            if let (Some((value_base, value_args)), Some((target_base, target_args))) =
                (self.declared_generic(value), self.declared_generic(target))
            {
                if value_base != target_base {
                    return self.generic_inherits(value_base, value_args, target_base, target_args);
                }
            }
        }

        let value_params = arena.type_parameters(value);
        let target_params = arena.type_parameters(target);
        if consider_type_parameters && value_params.len() != target_params.len() {
            return false;
        }

        if consider_type_parameters && !value_params.is_empty() {
            if !self.is_assignable(value, target, false) {
                return false;
            }
            return value_params
                .iter()
                .zip(&target_params)
                .all(|(v, t)| self.is_assignable_to(*v, *t));
        }

        arena.inherits(value, target)
    }

    fn declared_generic(&self, id: TypeId) -> Option<(TypeId, &'a [TypeId])> {
        let arena: &'a TypeArena = self.arena;
        match arena.get(id) {
            Type::Generic(GenericType {
                kind: GenericKind::Declared(base),
                parameters,
                ..
            }) => Some((arena.resolve_aliases(*base), parameters.as_slice())),
            _ => None,
        }
    }

    /// Walk the supertypes declared by generic `base`, substituting `args` for
    /// its type parameters, until a parameterization of `target_base` is found
    /// whose arguments accept the substituted ones.
    fn generic_inherits(&self, base: TypeId, args: &[TypeId], target_base: TypeId, target_args: &[TypeId]) -> bool {
        let arena = self.arena;
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([(base, args.to_vec())]);
        while let Some((base, args)) = queue.pop_front() {
            if !seen.insert(base) {
                continue;
            }
            let params = arena.type_parameters(base);
            for inherited in arena.inherits_from(base) {
                let Some((next, inherited_args)) = self.declared_generic(inherited) else {
                    continue;
                };
                let substituted: Vec<TypeId> = inherited_args
                    .iter()
                    .map(|arg| {
                        params
                            .iter()
                            .position(|p| p == arg)
                            .and_then(|i| args.get(i).copied())
                            .unwrap_or(*arg)
                    })
                    .collect();
                if next != target_base {
                    queue.push_back((next, substituted));
                } else if substituted.len() == target_args.len()
                    && substituted
                        .iter()
                        .zip(target_args)
                        .all(|(v, t)| self.is_assignable_to(*v, *t))
                {
                    return true;
                }
            }
        }
        false
    }

    /// Whether a literal may initialise or constrain a value of `target`.
    /// Int literals widen into decimal types and anything fits `Any`.
    pub fn accepts_literal(&self, value: &Value, target: TypeId) -> bool {
        if self.arena.resolve_aliases(target) == PrimitiveType::Any.type_id() {
            return true;
        }
        if self.is_assignable_to(value.primitive().type_id(), target) {
            return true;
        }
        matches!(value, Value::Int(_))
            && matches!(
                self.arena.base_primitive(target),
                Some(PrimitiveType::Decimal | PrimitiveType::Double)
            )
    }

    /// Same qualified name once aliases are stripped, and (optionally) the
    /// same parameters pairwise.
    pub fn resolves_same_as(&self, a: TypeId, b: TypeId, consider_type_parameters: bool) -> bool {
        let arena = self.arena;
        let a = arena.resolve_aliases(a);
        let b = arena.resolve_aliases(b);
        if a == b {
            return true;
        }

        let a_params = arena.type_parameters(a);
        let b_params = arena.type_parameters(b);
        if consider_type_parameters && a_params.len() != b_params.len() {
            return false;
        }

        let same_name =
            arena.qualified_name(a).fully_qualified_name() == arena.qualified_name(b).fully_qualified_name();
        same_name
            && (!consider_type_parameters
                || a_params
                    .iter()
                    .zip(&b_params)
                    .all(|(x, y)| self.resolves_same_as(*x, *y, true)))
    }
}
