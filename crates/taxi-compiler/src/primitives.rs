//! Built-in types of the `lang.taxi` namespace.
//!
//! Primitives and `Void` occupy reserved ids at the front of every arena, so
//! they resolve without touching the registry. The built-in generics
//! (`Array`, `Map`, `Stream`, `TypeReference`) are interned on demand per
//! parameterization.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::name::QualifiedName;
use crate::types::TypeId;

pub const TAXI_NAMESPACE: &str = "lang.taxi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveType {
    Boolean,
    String,
    Int,
    Decimal,
    Date,
    Time,
    DateTime,
    Instant,
    Any,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 10] = [
        PrimitiveType::Boolean,
        PrimitiveType::String,
        PrimitiveType::Int,
        PrimitiveType::Decimal,
        PrimitiveType::Date,
        PrimitiveType::Time,
        PrimitiveType::DateTime,
        PrimitiveType::Instant,
        PrimitiveType::Any,
        PrimitiveType::Double,
    ];

    /// The simple name used in source, e.g. `String`.
    pub fn declaration(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::String => "String",
            PrimitiveType::Int => "Int",
            PrimitiveType::Decimal => "Decimal",
            PrimitiveType::Date => "Date",
            PrimitiveType::Time => "Time",
            PrimitiveType::DateTime => "DateTime",
            PrimitiveType::Instant => "Instant",
            PrimitiveType::Any => "Any",
            PrimitiveType::Double => "Double",
        }
    }

    pub fn type_doc(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Represents a value which is either `true` or `false`.",
            PrimitiveType::String => "A collection of characters.",
            PrimitiveType::Int => "A signed integer - ie. a whole number (positive or negative), with no decimal places",
            PrimitiveType::Decimal => "A signed decimal number - ie., a whole number with decimal places.",
            PrimitiveType::Date => "A date, without a time or timezone.",
            PrimitiveType::Time => "Time only, excluding the date part",
            PrimitiveType::DateTime => "A date and time, without a timezone.",
            PrimitiveType::Instant => "A point in time, with date, time and timezone.",
            PrimitiveType::Any => "Can be anything.  Try to avoid using 'Any' as it's not descriptive - favour using a strongly typed approach instead",
            PrimitiveType::Double => "Represents a double-precision 64-bit IEEE 754 floating point number.",
        }
    }

    pub fn qualified_name(self) -> &'static QualifiedName {
        &PRIMITIVE_NAMES[self as usize]
    }

    /// Reserved arena slot.
    pub fn type_id(self) -> TypeId {
        TypeId::from_index(self as usize)
    }

    /// Inverse of [`PrimitiveType::type_id`].
    pub fn from_type_id(id: TypeId) -> Option<Self> {
        Self::ALL.get(id.index()).copied()
    }
}

/// Reserved id of `lang.taxi.Void`, directly after the primitives.
pub const VOID_ID: TypeId = TypeId::from_index(PrimitiveType::ALL.len());

/// Number of reserved arena slots.
pub const RESERVED_IDS: usize = PrimitiveType::ALL.len() + 1;

pub static VOID_NAME: LazyLock<QualifiedName> =
    LazyLock::new(|| QualifiedName::new(TAXI_NAMESPACE, "Void"));

static PRIMITIVE_NAMES: LazyLock<Vec<QualifiedName>> = LazyLock::new(|| {
    PrimitiveType::ALL
        .iter()
        .map(|p| QualifiedName::new(TAXI_NAMESPACE, p.declaration()))
        .collect()
});

/// Built-in generic type constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuiltinGeneric {
    Array,
    Map,
    Stream,
    TypeReference,
}

impl BuiltinGeneric {
    pub const ALL: [BuiltinGeneric; 4] = [
        BuiltinGeneric::Array,
        BuiltinGeneric::Map,
        BuiltinGeneric::Stream,
        BuiltinGeneric::TypeReference,
    ];

    pub fn declaration(self) -> &'static str {
        match self {
            BuiltinGeneric::Array => "Array",
            BuiltinGeneric::Map => "Map",
            BuiltinGeneric::Stream => "Stream",
            BuiltinGeneric::TypeReference => "TypeReference",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            BuiltinGeneric::Map => 2,
            _ => 1,
        }
    }

    pub fn qualified_name(self) -> QualifiedName {
        QualifiedName::new(TAXI_NAMESPACE, self.declaration())
    }
}

/// Anything in `lang.taxi` a type reference can name directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Primitive(PrimitiveType),
    Void,
    Generic(BuiltinGeneric),
}

impl Builtin {
    /// Look up a built-in by simple name (`String`) or qualified name
    /// (`lang.taxi.String`).
    pub fn lookup(name: &str) -> Option<Builtin> {
        BUILTINS.get(name).copied()
    }
}

static BUILTINS: LazyLock<FxHashMap<String, Builtin>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    let mut insert = |simple: &str, builtin: Builtin| {
        table.insert(simple.to_string(), builtin);
        table.insert(format!("{TAXI_NAMESPACE}.{simple}"), builtin);
    };
    for primitive in PrimitiveType::ALL {
        insert(primitive.declaration(), Builtin::Primitive(primitive));
    }
    insert("Void", Builtin::Void);
    for generic in BuiltinGeneric::ALL {
        insert(generic.declaration(), Builtin::Generic(generic));
    }
    table
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_simple_and_qualified_name() {
        assert_eq!(
            Builtin::lookup("String"),
            Some(Builtin::Primitive(PrimitiveType::String))
        );
        assert_eq!(
            Builtin::lookup("lang.taxi.Decimal"),
            Some(Builtin::Primitive(PrimitiveType::Decimal))
        );
        assert_eq!(Builtin::lookup("Void"), Some(Builtin::Void));
        assert_eq!(
            Builtin::lookup("Map"),
            Some(Builtin::Generic(BuiltinGeneric::Map))
        );
        assert_eq!(Builtin::lookup("Person"), None);
    }

    #[test]
    fn reserved_ids_round_trip() {
        for primitive in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_type_id(primitive.type_id()), Some(primitive));
        }
        assert_eq!(PrimitiveType::from_type_id(VOID_ID), None);
        assert_eq!(
            PrimitiveType::Int.qualified_name().fully_qualified_name(),
            "lang.taxi.Int"
        );
    }
}
