//! The compiled type model.
//!
//! Every type lives in a [`TypeArena`] and is addressed by a [`TypeId`].
//! Declared types ([`ObjectType`], [`EnumType`], [`TypeAlias`],
//! [`AnnotationType`], [`UnionType`]) are [`UserType`]s: they start as an
//! undefined stub when first named, receive their definition exactly once,
//! and then accumulate extensions. Because references are ids, a forward
//! reference to a stub and the later defined type are the same value.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::Serialize;
use taxi_common::span::Span;

use crate::constraints::Constraint;
use crate::name::QualifiedName;
use crate::primitives::{BuiltinGeneric, PrimitiveType, RESERVED_IDS, VOID_ID, VOID_NAME};

// ── Ids and provenance ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(u32);

impl TypeId {
    pub const fn from_index(index: usize) -> Self {
        TypeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a declaration or extension was compiled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationUnit {
    pub source_name: String,
    pub span: Span,
}

// ── Values, annotations, accessors ─────────────────────────────────────

/// A literal as it appears in annotations, defaults and constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Decimal(f64),
    Bool(bool),
}

impl Value {
    /// The primitive type a literal of this kind has.
    pub fn primitive(&self) -> PrimitiveType {
        match self {
            Value::String(_) => PrimitiveType::String,
            Value::Int(_) => PrimitiveType::Int,
            Value::Decimal(_) => PrimitiveType::Decimal,
            Value::Bool(_) => PrimitiveType::Boolean,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "'{s}'"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// An annotation usage: `@Http(method = 'POST')`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Qualified name when it resolves to a declared annotation type,
    /// otherwise the name as written.
    pub name: String,
    #[serde(skip)]
    pub type_id: Option<TypeId>,
    /// Parameters in declaration order. A positional argument is named `value`.
    pub parameters: Vec<(String, Value)>,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Modifier {
    Closed,
    Parameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldModifier {
    Closed,
}

/// How a field's value is read from a source document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Accessor {
    Xpath(String),
    JsonPath(String),
    Column(u32),
    Destructured(Vec<(String, Accessor)>),
}

// ── Fields ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub type_id: TypeId,
    pub nullable: bool,
    pub modifiers: Vec<FieldModifier>,
    pub annotations: Vec<Annotation>,
    pub constraints: Vec<Constraint>,
    pub accessor: Option<Accessor>,
    pub default_value: Option<Value>,
    pub type_doc: Option<String>,
}

impl Field {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.name == name || a.simple_name() == name)
    }
}

// ── User types ─────────────────────────────────────────────────────────

/// A declared type: a name, a definition set once, and extensions appended
/// after the definition exists.
#[derive(Debug, Clone)]
pub struct UserType<D, E> {
    name: QualifiedName,
    definition: Option<D>,
    extensions: Vec<E>,
}

impl<D, E> UserType<D, E> {
    pub fn stub(name: QualifiedName) -> Self {
        Self {
            name,
            definition: None,
            extensions: Vec::new(),
        }
    }

    pub fn defined(name: QualifiedName, definition: D) -> Self {
        Self {
            name,
            definition: Some(definition),
            extensions: Vec::new(),
        }
    }

    pub fn with_extension(name: QualifiedName, extension: E) -> Self {
        Self {
            name,
            definition: None,
            extensions: vec![extension],
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn definition(&self) -> Option<&D> {
        self.definition.as_ref()
    }

    pub(crate) fn definition_mut(&mut self) -> Option<&mut D> {
        self.definition.as_mut()
    }

    pub fn is_defined(&self) -> bool {
        self.definition.is_some()
    }

    pub fn extensions(&self) -> &[E] {
        &self.extensions
    }

    /// Fold `other` into `self`: fill a missing definition and append
    /// extensions. Fails when both sides carry a definition.
    pub(crate) fn merge(&mut self, other: UserType<D, E>) -> Result<(), ()> {
        if self.definition.is_some() && other.definition.is_some() {
            return Err(());
        }
        if other.definition.is_some() {
            self.definition = other.definition;
        }
        self.extensions.extend(other.extensions);
        Ok(())
    }
}

pub type ObjectType = UserType<ObjectTypeDefinition, ObjectTypeExtension>;
pub type EnumType = UserType<EnumDefinition, EnumExtension>;
pub type TypeAlias = UserType<TypeAliasDefinition, TypeAliasExtension>;
pub type AnnotationType = UserType<AnnotationTypeDefinition, Infallible>;
pub type UnionType = UserType<UnionTypeDefinition, Infallible>;

#[derive(Debug, Clone)]
pub struct ObjectTypeDefinition {
    pub fields: Vec<Field>,
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub inherits_from: Vec<TypeId>,
    pub type_parameters: Vec<TypeId>,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

#[derive(Debug, Clone)]
pub struct ObjectTypeExtension {
    pub annotations: Vec<Annotation>,
    pub field_extensions: Vec<FieldExtension>,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

#[derive(Debug, Clone)]
pub struct FieldExtension {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub refined_type: Option<TypeId>,
    pub default_value: Option<Value>,
    pub type_doc: Option<String>,
}

impl ObjectType {
    /// Declared fields with every extension applied.
    pub fn fields(&self) -> Vec<Field> {
        self.definition()
            .map(|def| def.fields.iter().map(|f| self.extended_field(f)).collect())
            .unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<Field> {
        self.definition()?
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| self.extended_field(f))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.definition()
            .is_some_and(|def| def.fields.iter().any(|f| f.name == name))
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        let declared = self.definition().map(|d| d.annotations.as_slice()).unwrap_or_default();
        declared
            .iter()
            .chain(self.extensions().iter().flat_map(|e| e.annotations.iter()))
            .cloned()
            .collect()
    }

    /// The latest doc: extensions override the declaration.
    pub fn type_doc(&self) -> Option<String> {
        self.extensions()
            .iter()
            .rev()
            .find_map(|e| e.type_doc.clone())
            .or_else(|| self.definition().and_then(|d| d.type_doc.clone()))
    }

    pub fn modifiers(&self) -> &[Modifier] {
        self.definition().map(|d| d.modifiers.as_slice()).unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.modifiers().contains(&Modifier::Closed)
    }

    /// The refinement already applied to `field`, if any.
    pub fn refinement_of(&self, field: &str) -> Option<TypeId> {
        self.extensions()
            .iter()
            .flat_map(|e| e.field_extensions.iter())
            .filter(|fe| fe.name == field)
            .find_map(|fe| fe.refined_type)
    }

    fn extended_field(&self, field: &Field) -> Field {
        let mut field = field.clone();
        for ext in self.extensions().iter().flat_map(|e| e.field_extensions.iter()) {
            if ext.name != field.name {
                continue;
            }
            field.annotations.extend(ext.annotations.iter().cloned());
            if let Some(refined) = ext.refined_type {
                field.type_id = refined;
            }
            if ext.default_value.is_some() {
                field.default_value = ext.default_value.clone();
            }
            if ext.type_doc.is_some() {
                field.type_doc = ext.type_doc.clone();
            }
        }
        field
    }
}

#[derive(Debug, Clone)]
pub struct EnumDefinition {
    pub values: Vec<EnumValue>,
    pub annotations: Vec<Annotation>,
    pub inherits_from: Vec<TypeId>,
    /// `Int` when every value is an int literal, otherwise `String`.
    pub base_primitive: PrimitiveType,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

impl EnumDefinition {
    pub fn derive_base_primitive(values: &[EnumValue]) -> PrimitiveType {
        if !values.is_empty() && values.iter().all(|v| matches!(v.value, Value::Int(_))) {
            PrimitiveType::Int
        } else {
            PrimitiveType::String
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    /// The literal in `A(1)`; the value's own name when none is written.
    pub value: Value,
    pub annotations: Vec<Annotation>,
    /// Equivalent values of other enums as `Enum.VALUE`, closed over
    /// symmetry and transitivity.
    pub synonyms: Vec<String>,
    pub type_doc: Option<String>,
}

impl EnumValue {
    pub fn new(name: String, value: Option<Value>) -> Self {
        let value = value.unwrap_or_else(|| Value::String(name.clone()));
        Self {
            name,
            value,
            annotations: Vec::new(),
            synonyms: Vec::new(),
            type_doc: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnumExtension {
    pub annotations: Vec<Annotation>,
    pub values: Vec<EnumValue>,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

impl EnumType {
    /// Declared values with extension annotations and docs applied.
    pub fn values(&self) -> Vec<EnumValue> {
        let Some(def) = self.definition() else {
            return Vec::new();
        };
        def.values
            .iter()
            .map(|value| {
                let mut value = value.clone();
                for ext in self.extensions().iter().flat_map(|e| e.values.iter()) {
                    if ext.name == value.name {
                        value.annotations.extend(ext.annotations.iter().cloned());
                        if ext.type_doc.is_some() {
                            value.type_doc = ext.type_doc.clone();
                        }
                    }
                }
                value
            })
            .collect()
    }

    pub fn value(&self, name: &str) -> Option<EnumValue> {
        self.values().into_iter().find(|v| v.name == name)
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.definition()
            .is_some_and(|def| def.values.iter().any(|v| v.name == name))
    }

    pub fn base_primitive(&self) -> PrimitiveType {
        self.definition()
            .map(|d| d.base_primitive)
            .unwrap_or(PrimitiveType::String)
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        let declared = self.definition().map(|d| d.annotations.as_slice()).unwrap_or_default();
        declared
            .iter()
            .chain(self.extensions().iter().flat_map(|e| e.annotations.iter()))
            .cloned()
            .collect()
    }

    pub fn type_doc(&self) -> Option<String> {
        self.extensions()
            .iter()
            .rev()
            .find_map(|e| e.type_doc.clone())
            .or_else(|| self.definition().and_then(|d| d.type_doc.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct TypeAliasDefinition {
    pub aliased_type: TypeId,
    pub annotations: Vec<Annotation>,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

#[derive(Debug, Clone)]
pub struct TypeAliasExtension {
    pub annotations: Vec<Annotation>,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

impl TypeAlias {
    pub fn aliased_type(&self) -> Option<TypeId> {
        self.definition().map(|d| d.aliased_type)
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        let declared = self.definition().map(|d| d.annotations.as_slice()).unwrap_or_default();
        declared
            .iter()
            .chain(self.extensions().iter().flat_map(|e| e.annotations.iter()))
            .cloned()
            .collect()
    }

    pub fn type_doc(&self) -> Option<String> {
        self.extensions()
            .iter()
            .rev()
            .find_map(|e| e.type_doc.clone())
            .or_else(|| self.definition().and_then(|d| d.type_doc.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct AnnotationTypeDefinition {
    pub fields: Vec<Field>,
    pub annotations: Vec<Annotation>,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

#[derive(Debug, Clone)]
pub struct UnionTypeDefinition {
    pub types: Vec<TypeId>,
    pub annotations: Vec<Annotation>,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

// ── Structural types ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericKind {
    Builtin(BuiltinGeneric),
    /// A parameterization of a declared `type Box<T>`.
    Declared(TypeId),
}

/// An interned parameterization such as `lang.taxi.Array<com.Foo>`.
#[derive(Debug, Clone)]
pub struct GenericType {
    pub kind: GenericKind,
    pub name: QualifiedName,
    pub parameters: Vec<TypeId>,
}

/// An unbound type parameter, `T` inside `type Box<T>`.
#[derive(Debug, Clone)]
pub struct TypeArgument {
    pub name: QualifiedName,
    pub declared_by: QualifiedName,
}

/// A function type `(A, B) -> C`.
#[derive(Debug, Clone)]
pub struct LambdaType {
    pub name: QualifiedName,
    pub parameters: Vec<TypeId>,
    pub return_type: TypeId,
}

// ── The Type enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Type {
    Primitive(PrimitiveType),
    Void,
    Object(ObjectType),
    Enum(EnumType),
    Alias(TypeAlias),
    Annotation(AnnotationType),
    Union(UnionType),
    Generic(GenericType),
    TypeArgument(TypeArgument),
    Lambda(LambdaType),
}

/// What every type kind can report about itself without the arena.
pub trait TypeInfo {
    fn qualified_name(&self) -> &QualifiedName;

    fn inherits_from(&self) -> Vec<TypeId> {
        Vec::new()
    }

    fn type_parameters(&self) -> Vec<TypeId> {
        Vec::new()
    }

    fn provenance(&self) -> Option<&CompilationUnit> {
        None
    }
}

impl TypeInfo for PrimitiveType {
    fn qualified_name(&self) -> &QualifiedName {
        PrimitiveType::qualified_name(*self)
    }
}

impl TypeInfo for ObjectType {
    fn qualified_name(&self) -> &QualifiedName {
        self.name()
    }

    fn inherits_from(&self) -> Vec<TypeId> {
        self.definition().map(|d| d.inherits_from.clone()).unwrap_or_default()
    }

    fn type_parameters(&self) -> Vec<TypeId> {
        self.definition().map(|d| d.type_parameters.clone()).unwrap_or_default()
    }

    fn provenance(&self) -> Option<&CompilationUnit> {
        self.definition().map(|d| &d.source)
    }
}

impl TypeInfo for EnumType {
    fn qualified_name(&self) -> &QualifiedName {
        self.name()
    }

    fn inherits_from(&self) -> Vec<TypeId> {
        self.definition().map(|d| d.inherits_from.clone()).unwrap_or_default()
    }

    fn provenance(&self) -> Option<&CompilationUnit> {
        self.definition().map(|d| &d.source)
    }
}

impl TypeInfo for TypeAlias {
    fn qualified_name(&self) -> &QualifiedName {
        self.name()
    }

    fn provenance(&self) -> Option<&CompilationUnit> {
        self.definition().map(|d| &d.source)
    }
}

impl TypeInfo for AnnotationType {
    fn qualified_name(&self) -> &QualifiedName {
        self.name()
    }

    fn provenance(&self) -> Option<&CompilationUnit> {
        self.definition().map(|d| &d.source)
    }
}

impl TypeInfo for UnionType {
    fn qualified_name(&self) -> &QualifiedName {
        self.name()
    }

    fn provenance(&self) -> Option<&CompilationUnit> {
        self.definition().map(|d| &d.source)
    }
}

/// A declared parameterization reports no supertypes of its own: `SubBox<Dog>`
/// inherits `Box<Dog>` only after substituting its arguments into the base's
/// declaration, which [`crate::checker::TypeChecker`] does when comparing.
impl TypeInfo for GenericType {
    fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }

    fn type_parameters(&self) -> Vec<TypeId> {
        self.parameters.clone()
    }
}

impl TypeInfo for TypeArgument {
    fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }
}

impl TypeInfo for LambdaType {
    fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }

    fn type_parameters(&self) -> Vec<TypeId> {
        let mut params = self.parameters.clone();
        params.push(self.return_type);
        params
    }
}

macro_rules! delegate {
    ($self:ident, $it:ident => $body:expr, void => $void:expr) => {
        match $self {
            Type::Primitive($it) => $body,
            Type::Void => $void,
            Type::Object($it) => $body,
            Type::Enum($it) => $body,
            Type::Alias($it) => $body,
            Type::Annotation($it) => $body,
            Type::Union($it) => $body,
            Type::Generic($it) => $body,
            Type::TypeArgument($it) => $body,
            Type::Lambda($it) => $body,
        }
    };
}

impl TypeInfo for Type {
    fn qualified_name(&self) -> &QualifiedName {
        delegate!(self, it => it.qualified_name(), void => &*VOID_NAME)
    }

    fn inherits_from(&self) -> Vec<TypeId> {
        delegate!(self, it => it.inherits_from(), void => Vec::new())
    }

    fn type_parameters(&self) -> Vec<TypeId> {
        delegate!(self, it => it.type_parameters(), void => Vec::new())
    }

    fn provenance(&self) -> Option<&CompilationUnit> {
        delegate!(self, it => it.provenance(), void => None)
    }
}

impl Type {
    /// Word used for this kind in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Primitive(_) => "primitive",
            Type::Void => "void",
            Type::Object(_) => "type",
            Type::Enum(_) => "enum",
            Type::Alias(_) => "type alias",
            Type::Annotation(_) => "annotation",
            Type::Union(_) => "union type",
            Type::Generic(_) => "generic type",
            Type::TypeArgument(_) => "type argument",
            Type::Lambda(_) => "lambda type",
        }
    }

    /// Declared types report whether their definition is present; every
    /// other kind is always defined.
    pub fn is_defined(&self) -> bool {
        match self {
            Type::Object(t) => t.is_defined(),
            Type::Enum(t) => t.is_defined(),
            Type::Alias(t) => t.is_defined(),
            Type::Annotation(t) => t.is_defined(),
            Type::Union(t) => t.is_defined(),
            _ => true,
        }
    }

    pub fn is_user_type(&self) -> bool {
        matches!(
            self,
            Type::Object(_) | Type::Enum(_) | Type::Alias(_) | Type::Annotation(_) | Type::Union(_)
        )
    }

    /// The declared doc comment with extension docs applied.
    pub fn type_doc(&self) -> Option<String> {
        match self {
            Type::Primitive(p) => Some(p.type_doc().to_string()),
            Type::Object(t) => t.type_doc(),
            Type::Enum(t) => t.type_doc(),
            Type::Alias(t) => t.type_doc(),
            Type::Annotation(t) => t.definition().and_then(|d| d.type_doc.clone()),
            Type::Union(t) => t.definition().and_then(|d| d.type_doc.clone()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            Type::Enum(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&TypeAlias> {
        match self {
            Type::Alias(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationType> {
        match self {
            Type::Annotation(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            Type::Union(t) => Some(t),
            _ => None,
        }
    }
}

// ── Arena ──────────────────────────────────────────────────────────────

/// Owner of every type in one compilation. Primitives and `Void` sit at
/// reserved ids; everything else is appended.
#[derive(Debug, Clone)]
pub struct TypeArena {
    types: Vec<Type>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(RESERVED_IDS + 64);
        types.extend(PrimitiveType::ALL.iter().map(|p| Type::Primitive(*p)));
        types.push(Type::Void);
        debug_assert_eq!(types.len(), RESERVED_IDS);
        debug_assert!(matches!(types[VOID_ID.index()], Type::Void));
        Self { types }
    }

    pub(crate) fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> + '_ {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| (TypeId::from_index(i), ty))
    }

    pub fn qualified_name(&self, id: TypeId) -> &QualifiedName {
        self.get(id).qualified_name()
    }

    /// `lang.taxi.Array<com.Foo>` style display name.
    pub fn display_name(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Generic(_) | Type::Lambda(_) => self.qualified_name(id).parameterized_name(),
            ty => ty.qualified_name().fully_qualified_name(),
        }
    }

    pub fn inherits_from(&self, id: TypeId) -> Vec<TypeId> {
        self.get(id).inherits_from()
    }

    pub fn type_parameters(&self, id: TypeId) -> Vec<TypeId> {
        self.get(id).type_parameters()
    }

    /// Follow alias chains to the first non-alias type. An undefined alias
    /// or an alias cycle stops where it is.
    pub fn resolve_aliases(&self, id: TypeId) -> TypeId {
        let mut seen = FxHashSet::default();
        let mut current = id;
        while let Type::Alias(alias) = self.get(current) {
            match alias.aliased_type() {
                Some(next) if seen.insert(current) => current = next,
                _ => break,
            }
        }
        current
    }

    /// Transitive supertypes of `id`, excluding `id` itself, in breadth-first
    /// order. Aliases contribute their aliased type.
    pub fn all_inherited_types(&self, id: TypeId) -> Vec<TypeId> {
        self.closure(id, |ty| {
            let mut edges = ty.inherits_from();
            if let Type::Alias(alias) = ty {
                edges.extend(alias.aliased_type());
            }
            edges
        })
    }

    /// Whether `value` is `target` or has it among its supertypes, comparing
    /// alias-resolved ids.
    pub fn inherits(&self, value: TypeId, target: TypeId) -> bool {
        let target = self.resolve_aliases(target);
        if self.resolve_aliases(value) == target {
            return true;
        }
        self.all_inherited_types(value)
            .into_iter()
            .any(|ancestor| self.resolve_aliases(ancestor) == target)
    }

    /// The primitive a type ultimately narrows. Enums narrow the primitive
    /// derived from their values.
    pub fn base_primitive(&self, id: TypeId) -> Option<PrimitiveType> {
        std::iter::once(id)
            .chain(self.all_inherited_types(id))
            .find_map(|candidate| match self.get(candidate) {
                Type::Primitive(p) => Some(*p),
                Type::Enum(e) => Some(e.base_primitive()),
                _ => None,
            })
    }

    /// Fields of an object type including inherited ones. A field declared
    /// closer to `id` hides an inherited one of the same name.
    pub fn all_fields(&self, id: TypeId) -> Vec<Field> {
        let mut names = FxHashSet::default();
        let mut fields = Vec::new();
        for candidate in std::iter::once(id).chain(self.all_inherited_types(id)) {
            if let Type::Object(object) = self.get(candidate) {
                for field in object.fields() {
                    if names.insert(field.name.clone()) {
                        fields.push(field);
                    }
                }
            }
        }
        fields
    }

    pub fn field(&self, id: TypeId, name: &str) -> Option<Field> {
        self.all_fields(id).into_iter().find(|f| f.name == name)
    }

    /// Breadth-first closure over `edges`, safe against cycles.
    fn closure(&self, start: TypeId, edges: impl Fn(&Type) -> Vec<TypeId>) -> Vec<TypeId> {
        let mut seen = FxHashSet::default();
        seen.insert(start);
        let mut queue: VecDeque<TypeId> = edges(self.get(start)).into();
        let mut result = Vec::new();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            result.push(next);
            queue.extend(edges(self.get(next)));
        }
        result
    }
}

impl std::ops::Index<TypeId> for TypeArena {
    type Output = Type;

    fn index(&self, id: TypeId) -> &Type {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> CompilationUnit {
        CompilationUnit {
            source_name: "test.taxi".to_string(),
            span: Span::new(0, 0),
        }
    }

    fn object(name: &str, inherits_from: Vec<TypeId>) -> Type {
        Type::Object(ObjectType::defined(
            QualifiedName::from_fully_qualified(name),
            ObjectTypeDefinition {
                fields: Vec::new(),
                annotations: Vec::new(),
                modifiers: Vec::new(),
                inherits_from,
                type_parameters: Vec::new(),
                type_doc: None,
                source: unit(),
            },
        ))
    }

    #[test]
    fn reserved_slots() {
        let arena = TypeArena::new();
        assert_eq!(arena.len(), RESERVED_IDS);
        assert!(matches!(arena[PrimitiveType::String.type_id()], Type::Primitive(PrimitiveType::String)));
        assert_eq!(arena.qualified_name(VOID_ID).fully_qualified_name(), "lang.taxi.Void");
    }

    #[test]
    fn inheritance_closure_survives_cycles() {
        let mut arena = TypeArena::new();
        let a = arena.alloc(Type::Object(ObjectType::stub(QualifiedName::new("", "A"))));
        let b = arena.alloc(object("B", vec![a]));
        *arena.get_mut(a) = object("A", vec![b]);

        assert_eq!(arena.all_inherited_types(a), vec![b]);
        assert_eq!(arena.all_inherited_types(b), vec![a]);
        assert!(arena.inherits(a, b));
    }

    #[test]
    fn base_primitive_through_inheritance() {
        let mut arena = TypeArena::new();
        let name = arena.alloc(object("Name", vec![PrimitiveType::String.type_id()]));
        let first_name = arena.alloc(object("FirstName", vec![name]));
        assert_eq!(arena.base_primitive(first_name), Some(PrimitiveType::String));

        let plain = arena.alloc(object("Plain", vec![]));
        assert_eq!(arena.base_primitive(plain), None);
    }

    #[test]
    fn enum_base_primitive_follows_its_values() {
        let enum_of = |name: &str, values: Vec<EnumValue>| {
            Type::Enum(EnumType::defined(
                QualifiedName::from_fully_qualified(name),
                EnumDefinition {
                    base_primitive: EnumDefinition::derive_base_primitive(&values),
                    values,
                    annotations: Vec::new(),
                    inherits_from: Vec::new(),
                    type_doc: None,
                    source: unit(),
                },
            ))
        };
        let mut arena = TypeArena::new();
        let numbers = arena.alloc(enum_of(
            "Numbers",
            vec![
                EnumValue::new("ONE".to_string(), Some(Value::Int(1))),
                EnumValue::new("TWO".to_string(), Some(Value::Int(2))),
            ],
        ));
        let mixed = arena.alloc(enum_of(
            "Mixed",
            vec![
                EnumValue::new("ONE".to_string(), Some(Value::Int(1))),
                EnumValue::new("TWO".to_string(), None),
            ],
        ));
        let empty = arena.alloc(enum_of("Empty", Vec::new()));

        assert_eq!(arena.base_primitive(numbers), Some(PrimitiveType::Int));
        assert_eq!(arena.base_primitive(mixed), Some(PrimitiveType::String));
        assert_eq!(arena.base_primitive(empty), Some(PrimitiveType::String));
    }

    #[test]
    fn merge_rejects_second_definition() {
        let mut stub: ObjectType = ObjectType::stub(QualifiedName::new("", "A"));
        let Type::Object(defined) = object("A", vec![]) else { unreachable!() };
        assert!(stub.merge(defined.clone()).is_ok());
        assert!(stub.is_defined());
        assert!(stub.merge(defined).is_err());
    }
}
