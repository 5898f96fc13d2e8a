//! Name-keyed store of the types of one compilation.
//!
//! Declared types are registered by fully qualified name. A name may be
//! registered as an undefined stub first (forward references) and filled in
//! later; the id handed out for the stub stays valid. Parameterized generics
//! and lambda types are interned by their parameterized name instead.

use rustc_hash::FxHashMap;
use taxi_common::span::Span;

use crate::error::CompileErrorKind;
use crate::name::QualifiedName;
use crate::primitives::{Builtin, TAXI_NAMESPACE, VOID_ID};
use crate::types::{GenericKind, GenericType, LambdaType, ObjectType, Type, TypeArena, TypeArgument, TypeId, TypeInfo};

/// The first place an undefined name was referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub source: usize,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct TypeRegistry {
    arena: TypeArena,
    names: FxHashMap<String, TypeId>,
    /// Declared types in registration order.
    declared: Vec<TypeId>,
    interned: FxHashMap<String, TypeId>,
    first_references: FxHashMap<TypeId, Reference>,
}

/// Primitives and `Void` resolve to their reserved ids.
fn reserved_id(name: &str) -> Option<TypeId> {
    match Builtin::lookup(name)? {
        Builtin::Primitive(primitive) => Some(primitive.type_id()),
        Builtin::Void => Some(VOID_ID),
        Builtin::Generic(_) => None,
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut Type {
        self.arena.get_mut(id)
    }

    /// Return the type registered under `name`, creating an undefined object
    /// stub when there is none. Records `reference` as the first use of a
    /// still-undefined name.
    pub fn get_or_create(&mut self, name: &str, reference: Option<Reference>) -> TypeId {
        if let Some(id) = reserved_id(name) {
            return id;
        }
        let id = match self.names.get(name) {
            Some(&id) => id,
            None => self.insert(Type::Object(ObjectType::stub(QualifiedName::from_fully_qualified(name)))),
        };
        if let Some(reference) = reference {
            if !self.arena[id].is_defined() {
                self.first_references.entry(id).or_insert(reference);
            }
        }
        id
    }

    /// Insert a declared type, or merge it into the one already registered
    /// under its name. Two definitions of one name are a redefinition.
    pub fn register(&mut self, ty: Type) -> Result<TypeId, CompileErrorKind> {
        let name = ty.qualified_name().fully_qualified_name();
        let Some(&id) = self.names.get(&name) else {
            return Ok(self.insert(ty));
        };

        let existing = self.arena.get_mut(id);
        let merged = match (existing, ty) {
            (Type::Object(existing), Type::Object(new)) => existing.merge(new),
            (Type::Enum(existing), Type::Enum(new)) => existing.merge(new),
            (Type::Alias(existing), Type::Alias(new)) => existing.merge(new),
            (Type::Annotation(existing), Type::Annotation(new)) => existing.merge(new),
            (Type::Union(existing), Type::Union(new)) => existing.merge(new),
            // A stub of one kind is replaced in place by a declaration of another.
            (existing, new) => match (existing.is_defined(), new.is_defined()) {
                (true, true) => Err(()),
                (true, false) => Ok(()),
                (false, _) => {
                    *existing = new;
                    Ok(())
                }
            },
        };

        merged.map(|()| id).map_err(|()| CompileErrorKind::Redefinition {
            kind: self.arena[id].kind_name(),
            name,
        })
    }

    /// Look up a name: reserved ids first, then declared and interned types.
    pub fn get_type(&self, name: &str) -> Result<TypeId, CompileErrorKind> {
        reserved_id(name)
            .or_else(|| self.lookup(name))
            .or_else(|| self.interned.get(name).copied())
            .ok_or_else(|| CompileErrorKind::UnresolvedType(name.to_string()))
    }

    /// A declared type by fully qualified name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        reserved_id(name).is_some() || self.names.contains_key(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        match self.get_type(name) {
            Ok(id) => self.arena[id].is_defined(),
            Err(_) => false,
        }
    }

    /// The interned parameterization of a built-in or declared generic.
    pub fn intern_generic(&mut self, kind: GenericKind, parameters: Vec<TypeId>) -> TypeId {
        let base = match kind {
            GenericKind::Builtin(generic) => generic.qualified_name(),
            GenericKind::Declared(id) => self.arena.qualified_name(id).clone(),
        };
        let name = base.with_parameters(self.parameter_names(&parameters));
        self.intern(name, |name| {
            Type::Generic(GenericType {
                kind,
                name,
                parameters,
            })
        })
    }

    /// The interned function type `(parameters) -> return_type`.
    pub fn intern_lambda(&mut self, parameters: Vec<TypeId>, return_type: TypeId) -> TypeId {
        let mut names = self.parameter_names(&parameters);
        names.push(self.arena.qualified_name(return_type).clone());
        let name = QualifiedName::new(TAXI_NAMESPACE, "Lambda").with_parameters(names);
        self.intern(name, |name| {
            Type::Lambda(LambdaType {
                name,
                parameters,
                return_type,
            })
        })
    }

    /// A fresh placeholder for type parameter `name` of `declared_by`.
    pub fn new_type_argument(&mut self, name: &str, declared_by: &QualifiedName) -> TypeId {
        self.arena.alloc(Type::TypeArgument(TypeArgument {
            name: QualifiedName::new(declared_by.fully_qualified_name(), name),
            declared_by: declared_by.clone(),
        }))
    }

    /// One `Unresolved type` error per declared name that never received a
    /// definition, with the first place it was referenced.
    pub fn assert_all_types_resolved(&self) -> Vec<(CompileErrorKind, Option<Reference>)> {
        self.declared
            .iter()
            .filter(|id| !self.arena[**id].is_defined())
            .map(|id| {
                let name = self.arena.qualified_name(*id).fully_qualified_name();
                (
                    CompileErrorKind::UnresolvedType(name),
                    self.first_references.get(id).copied(),
                )
            })
            .collect()
    }

    /// Declared types in registration order.
    pub fn declared_types(&self) -> &[TypeId] {
        &self.declared
    }

    pub(crate) fn into_parts(self) -> (TypeArena, FxHashMap<String, TypeId>, Vec<TypeId>, FxHashMap<String, TypeId>) {
        (self.arena, self.names, self.declared, self.interned)
    }

    fn insert(&mut self, ty: Type) -> TypeId {
        let name = ty.qualified_name().fully_qualified_name();
        let id = self.arena.alloc(ty);
        self.names.insert(name, id);
        self.declared.push(id);
        id
    }

    fn intern(&mut self, name: QualifiedName, build: impl FnOnce(QualifiedName) -> Type) -> TypeId {
        let key = name.parameterized_name();
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }
        let id = self.arena.alloc(build(name));
        self.interned.insert(key, id);
        id
    }

    fn parameter_names(&self, parameters: &[TypeId]) -> Vec<QualifiedName> {
        parameters
            .iter()
            .map(|p| self.arena.qualified_name(*p).clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{BuiltinGeneric, PrimitiveType};
    use crate::types::{EnumDefinition, EnumType, CompilationUnit};

    fn enum_def() -> EnumDefinition {
        EnumDefinition {
            values: Vec::new(),
            annotations: Vec::new(),
            inherits_from: Vec::new(),
            base_primitive: PrimitiveType::String,
            type_doc: None,
            source: CompilationUnit {
                source_name: "t.taxi".to_string(),
                span: Span::new(0, 1),
            },
        }
    }

    #[test]
    fn primitives_short_circuit() {
        let mut registry = TypeRegistry::new();
        assert_eq!(registry.get_or_create("String", None), PrimitiveType::String.type_id());
        assert_eq!(registry.get_type("lang.taxi.Int"), Ok(PrimitiveType::Int.type_id()));
        assert!(registry.declared_types().is_empty());
    }

    #[test]
    fn stub_identity_survives_definition() {
        let mut registry = TypeRegistry::new();
        let stub = registry.get_or_create("com.Color", None);
        assert!(!registry.is_defined("com.Color"));

        let defined = EnumType::defined(QualifiedName::new("com", "Color"), enum_def());
        assert_eq!(registry.register(Type::Enum(defined)), Ok(stub));
        assert!(registry.is_defined("com.Color"));
        assert!(matches!(registry.arena()[stub], Type::Enum(_)));
    }

    #[test]
    fn second_definition_is_a_redefinition() {
        let mut registry = TypeRegistry::new();
        let name = QualifiedName::new("", "Color");
        registry
            .register(Type::Enum(EnumType::defined(name.clone(), enum_def())))
            .unwrap();
        let err = registry
            .register(Type::Enum(EnumType::defined(name, enum_def())))
            .unwrap_err();
        assert_eq!(err.to_string(), "Attempt to redefine enum Color");
    }

    #[test]
    fn unresolved_names_report_first_reference() {
        let mut registry = TypeRegistry::new();
        let first = Reference { source: 0, span: Span::new(4, 7) };
        registry.get_or_create("Bar", Some(first));
        registry.get_or_create("Bar", Some(Reference { source: 1, span: Span::new(0, 3) }));

        let unresolved = registry.assert_all_types_resolved();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].0.to_string(), "Unresolved type: Bar");
        assert_eq!(unresolved[0].1, Some(first));
    }

    #[test]
    fn generics_are_interned_by_parameterized_name() {
        let mut registry = TypeRegistry::new();
        let string = PrimitiveType::String.type_id();
        let a = registry.intern_generic(GenericKind::Builtin(BuiltinGeneric::Array), vec![string]);
        let b = registry.intern_generic(GenericKind::Builtin(BuiltinGeneric::Array), vec![string]);
        assert_eq!(a, b);
        assert_eq!(registry.get_type("lang.taxi.Array<lang.taxi.String>"), Ok(a));
    }
}
