//! The result of a compilation.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde_json::{json, Value as Json};

use crate::checker::TypeChecker;
use crate::name::QualifiedName;
use crate::primitives::{Builtin, VOID_ID};
use crate::registry::TypeRegistry;
use crate::services::Service;
use crate::types::{EnumType, ObjectType, Type, TypeAlias, TypeArena, TypeId};

/// Every declared type and service of one compilation. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Document {
    arena: TypeArena,
    names: FxHashMap<String, TypeId>,
    declared: Vec<TypeId>,
    interned: FxHashMap<String, TypeId>,
    services: Vec<Service>,
}

/// The types and services of one namespace.
#[derive(Debug, Clone)]
pub struct NamespacedDocument<'a> {
    pub namespace: String,
    pub types: Vec<(TypeId, &'a Type)>,
    pub services: Vec<&'a Service>,
}

impl Document {
    pub(crate) fn new(registry: TypeRegistry, services: Vec<Service>) -> Self {
        let (arena, names, declared, interned) = registry.into_parts();
        Self {
            arena,
            names,
            declared,
            interned,
            services,
        }
    }

    /// A document with no declarations, returned when compilation stopped early.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn checker(&self) -> TypeChecker<'_> {
        TypeChecker::new(&self.arena)
    }

    /// Declared types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &Type)> + '_ {
        self.declared.iter().map(|id| (*id, &self.arena[*id]))
    }

    /// Resolve a fully qualified name. Built-ins resolve by simple name, and
    /// parameterized names (`lang.taxi.Array<Person>`, `Person[]`) resolve
    /// when that parameterization was used somewhere in the sources.
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        match Builtin::lookup(name) {
            Some(Builtin::Primitive(primitive)) => return Some(primitive.type_id()),
            Some(Builtin::Void) => return Some(VOID_ID),
            _ => {}
        }
        if let Some(id) = self.names.get(name).or_else(|| self.interned.get(name)) {
            return Some(*id);
        }
        let parsed = QualifiedName::parse(name).ok()?;
        self.interned
            .get(&self.canonical(&parsed).parameterized_name())
            .copied()
    }

    /// The type named `name`; see [`Document::type_id`].
    pub fn type_named(&self, name: &str) -> Option<&Type> {
        self.type_id(name).map(|id| &self.arena[id])
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.type_named(name)?.as_object()
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.type_named(name)?.as_enum()
    }

    pub fn type_alias(&self, name: &str) -> Option<&TypeAlias> {
        self.type_named(name)?.as_alias()
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.type_id(name).is_some()
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| s.name.fully_qualified_name() == name)
    }

    pub fn contains_service(&self, name: &str) -> bool {
        self.service(name).is_some()
    }

    pub fn display_name(&self, id: TypeId) -> String {
        self.arena.display_name(id)
    }

    /// Split into one document per namespace, in namespace order.
    pub fn to_namespaced_docs(&self) -> Vec<NamespacedDocument<'_>> {
        fn entry<'m, 'a>(
            map: &'m mut BTreeMap<String, NamespacedDocument<'a>>,
            namespace: &str,
        ) -> &'m mut NamespacedDocument<'a> {
            map.entry(namespace.to_string()).or_insert_with(|| NamespacedDocument {
                namespace: namespace.to_string(),
                types: Vec::new(),
                services: Vec::new(),
            })
        }

        let mut by_namespace = BTreeMap::new();
        for (id, ty) in self.types() {
            let namespace = &self.arena.qualified_name(id).namespace;
            entry(&mut by_namespace, namespace).types.push((id, ty));
        }
        for service in &self.services {
            entry(&mut by_namespace, &service.name.namespace).services.push(service);
        }
        by_namespace.into_values().collect()
    }

    /// A JSON outline of every declared type and service.
    pub fn summary(&self) -> Json {
        let types: Vec<Json> = self.types().map(|(id, ty)| self.type_summary(id, ty)).collect();
        let services: Vec<Json> = self
            .services
            .iter()
            .map(|service| {
                let operations: Vec<Json> = service
                    .operations
                    .iter()
                    .map(|op| {
                        let parameters: Vec<Json> = op
                            .parameters
                            .iter()
                            .map(|p| json!({ "name": p.name, "type": self.display_name(p.type_id) }))
                            .collect();
                        json!({
                            "name": op.name,
                            "parameters": parameters,
                            "returnType": self.display_name(op.return_type),
                        })
                    })
                    .collect();
                json!({ "name": service.name.fully_qualified_name(), "operations": operations })
            })
            .collect();
        json!({ "types": types, "services": services })
    }

    fn type_summary(&self, id: TypeId, ty: &Type) -> Json {
        let mut summary = json!({
            "name": self.display_name(id),
            "kind": ty.kind_name(),
        });
        match ty {
            Type::Object(object) => {
                let fields: Vec<Json> = object
                    .fields()
                    .iter()
                    .map(|f| {
                        json!({
                            "name": f.name,
                            "type": self.display_name(f.type_id),
                            "nullable": f.nullable,
                        })
                    })
                    .collect();
                let inherits: Vec<String> = self
                    .arena
                    .inherits_from(id)
                    .into_iter()
                    .map(|parent| self.display_name(parent))
                    .collect();
                summary["fields"] = json!(fields);
                summary["inherits"] = json!(inherits);
            }
            Type::Enum(enum_type) => {
                let values: Vec<String> = enum_type.values().into_iter().map(|v| v.name).collect();
                summary["values"] = json!(values);
            }
            Type::Alias(alias) => {
                if let Some(target) = alias.aliased_type() {
                    summary["aliasedType"] = json!(self.display_name(target));
                }
            }
            _ => {}
        }
        summary
    }

    /// Rewrite unqualified built-in names so a written name matches the
    /// interned key.
    fn canonical(&self, name: &QualifiedName) -> QualifiedName {
        let base = if name.namespace.is_empty() {
            match Builtin::lookup(&name.type_name) {
                Some(Builtin::Primitive(p)) => p.qualified_name().clone(),
                Some(Builtin::Generic(g)) => g.qualified_name(),
                Some(Builtin::Void) | None => name.clone(),
            }
        } else {
            name.clone()
        };
        let parameters = name.parameters.iter().map(|p| self.canonical(p)).collect();
        base.with_parameters(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn document_is_shareable() {
        assert_send_sync::<Document>();
    }

    #[test]
    fn empty_document_knows_builtins_only() {
        let doc = Document::empty();
        assert_eq!(doc.types().count(), 0);
        assert!(doc.contains_type("String"));
        assert!(doc.contains_type("lang.taxi.Int"));
        assert!(!doc.contains_type("Person"));
    }

    #[test]
    fn parameterized_lookup_accepts_sugar() {
        let doc = Compiler::from_source("type Person { friends : Person[] }")
            .compile()
            .unwrap();
        let array = doc.type_id("lang.taxi.Array<Person>").unwrap();
        assert_eq!(doc.type_id("Person[]"), Some(array));
        assert_eq!(doc.type_id("Array<Person>"), Some(array));
        assert_eq!(doc.object_type("Person").unwrap().field("friends").unwrap().type_id, array);
    }

    #[test]
    fn namespaced_docs_group_by_namespace() {
        let doc = Compiler::new()
            .with_source("a.taxi", "namespace b.x\ntype One\nservice S { operation go() }")
            .with_source("b.taxi", "namespace a.y\ntype Two\ntype Three")
            .compile()
            .unwrap();
        let docs = doc.to_namespaced_docs();
        let summary: Vec<(&str, usize, usize)> = docs
            .iter()
            .map(|d| (d.namespace.as_str(), d.types.len(), d.services.len()))
            .collect();
        assert_eq!(summary, vec![("a.y", 2, 0), ("b.x", 1, 1)]);
    }
}
