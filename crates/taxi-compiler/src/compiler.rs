//! The compilation pipeline.
//!
//! Sources are parsed and collated, then compiled in four phases over the
//! full declaration set:
//!
//! 1. stub creation: every declared name is registered undefined;
//! 2. declaration compilation: bodies are compiled, lazily and at most once
//!    per declaration, so resolving one type may compile another first.
//!    Field constraints and enum synonyms are checked once every declaration
//!    has been compiled;
//! 3. extension merging: extensions are validated and appended to their
//!    (now defined) base types, whichever source they came from;
//! 4. service compilation.
//!
//! Names still undefined afterwards are reported as unresolved.

use std::panic::{self, AssertUnwindSafe};

use rustc_hash::{FxHashMap, FxHashSet};
use taxi_common::span::Span;
use taxi_parser::ast::item::{EnumDecl, EnumExtension, Field as FieldNode, TypeAliasExtension, TypeDecl, TypeExtension};
use taxi_parser::ast::types::{Accessor as AccessorNode, Annotation as AnnotationNode, ConstraintList, Literal, TypeExpr, TypeRef};
use taxi_parser::ast::{AstNode, HasDocsAndAnnotations, HasIdent};
use tracing::{debug, error, instrument, trace};

use crate::checker::TypeChecker;
use crate::collator::{self, span_of, Declarations, RawDeclaration, RawExtension, RawExtensionKind, RawKind, Scope, SourceInfo};
use crate::constraints::{literal_value, Constraint, ConstraintConverter, ConstraintTarget, RawConstraint};
use crate::document::Document;
use crate::error::{CompilationError, CompilationException, CompileErrorKind, Severity};
use crate::name::{qualify, QualifiedName};
use crate::primitives::{Builtin, BuiltinGeneric, PrimitiveType, VOID_ID};
use crate::registry::{Reference, TypeRegistry};
use crate::services::Service;
use crate::synonyms::DeclaredSynonyms;
use crate::types::{
    Accessor, Annotation, AnnotationType, AnnotationTypeDefinition, CompilationUnit, EnumDefinition, EnumExtension as EnumTypeExtension,
    EnumType, EnumValue, Field, FieldExtension, FieldModifier, GenericKind, Modifier, ObjectType, ObjectTypeDefinition,
    ObjectTypeExtension, Type, TypeAlias, TypeAliasDefinition, TypeAliasExtension as AliasTypeExtension, TypeId, UnionType,
    UnionTypeDefinition, Value,
};

/// Name given to a source added without one.
pub const UNNAMED_SOURCE: &str = "<unknown>";

/// A set of named sources to compile together.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    sources: Vec<(String, String)>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_source(text: impl Into<String>) -> Self {
        Self::new().with_source(UNNAMED_SOURCE, text)
    }

    pub fn with_source(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.add_source(name, text);
        self
    }

    pub fn add_source(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.sources.push((name.into(), text.into()));
    }

    /// Compile, failing if any error-severity diagnostic was produced.
    pub fn compile(&self) -> Result<Document, CompilationException> {
        let (messages, document) = self.compile_with_messages();
        let errors: Vec<_> = messages.into_iter().filter(CompilationError::is_error).collect();
        if errors.is_empty() {
            Ok(document)
        } else {
            Err(CompilationException::new(errors))
        }
    }

    /// Compile and return every diagnostic (errors, warnings, info) along
    /// with whatever document could be assembled.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub fn compile_with_messages(&self) -> (Vec<CompilationError>, Document) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(%message, "compiler panicked");
                let source = self.sources.first().map(|(name, _)| name.as_str()).unwrap_or(UNNAMED_SOURCE);
                let diagnostic = CompilationError::unlocated(CompileErrorKind::Internal(message), source);
                (vec![diagnostic], Document::empty())
            }
        }
    }

    fn run(&self) -> (Vec<CompilationError>, Document) {
        let mut infos = Vec::with_capacity(self.sources.len());
        let mut syntax_errors = Vec::new();
        let mut declarations = Declarations::default();

        for (index, (name, text)) in self.sources.iter().enumerate() {
            let parse = taxi_parser::parse(text);
            let info = SourceInfo::new(name, text);
            for err in parse.errors() {
                syntax_errors.push(CompilationError::new(
                    CompileErrorKind::Syntax(err.message.clone()),
                    Severity::Error,
                    name,
                    &info.index,
                    err.span,
                ));
            }
            if parse.ok() {
                declarations.append(collator::collect(index, &parse.tree()));
            }
            infos.push(info);
        }

        if !syntax_errors.is_empty() {
            debug!(errors = syntax_errors.len(), "syntax errors, skipping semantic phases");
            return (syntax_errors, Document::empty());
        }
        TypeCompiler::new(infos, declarations).compile()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompileState {
    Pending,
    InProgress,
    Done,
}

/// A field's constraint list, converted once phase 2 has compiled every
/// declaration.
struct DeferredConstraints {
    declaration: usize,
    owner: String,
    field: String,
    list: ConstraintList,
    context: TypeId,
    scope: Scope,
}

/// State of one compile pass. Owns a fresh registry.
pub(crate) struct TypeCompiler {
    pub(crate) sources: Vec<SourceInfo>,
    pub(crate) declarations: Declarations,
    pub(crate) registry: TypeRegistry,
    pub(crate) services: Vec<Service>,
    pub(crate) diagnostics: Vec<CompilationError>,
    pub(crate) synonyms: Vec<DeclaredSynonyms>,
    raw_by_name: FxHashMap<String, Vec<usize>>,
    state: Vec<CompileState>,
    type_arguments: Vec<FxHashMap<String, TypeId>>,
    deferred_constraints: Vec<DeferredConstraints>,
}

impl TypeCompiler {
    fn new(sources: Vec<SourceInfo>, declarations: Declarations) -> Self {
        let mut raw_by_name: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (index, decl) in declarations.types.iter().enumerate() {
            raw_by_name.entry(decl.name.clone()).or_default().push(index);
        }
        let state = vec![CompileState::Pending; declarations.types.len()];
        Self {
            sources,
            declarations,
            registry: TypeRegistry::new(),
            services: Vec::new(),
            diagnostics: Vec::new(),
            synonyms: Vec::new(),
            raw_by_name,
            state,
            type_arguments: Vec::new(),
            deferred_constraints: Vec::new(),
        }
    }

    fn compile(mut self) -> (Vec<CompilationError>, Document) {
        debug!(
            types = self.declarations.types.len(),
            extensions = self.declarations.extensions.len(),
            services = self.declarations.services.len(),
            "compiling declarations"
        );

        self.create_stubs();
        debug!("phase 2: declarations");
        for index in 0..self.declarations.types.len() {
            if self.state[index] == CompileState::Pending {
                self.compile_declaration(index);
            }
        }
        self.compile_field_constraints();
        self.resolve_synonyms();
        debug!("phase 3: extensions");
        self.apply_extensions();
        debug!("phase 4: services");
        self.compile_services();
        self.report_unresolved();

        let document = Document::new(self.registry, self.services);
        (self.diagnostics, document)
    }

    // ── Diagnostics ────────────────────────────────────────────────────

    pub(crate) fn report(&mut self, kind: CompileErrorKind, source: usize, span: Span) {
        self.report_with_severity(kind, Severity::Error, source, span);
    }

    pub(crate) fn report_with_severity(&mut self, kind: CompileErrorKind, severity: Severity, source: usize, span: Span) {
        let info = &self.sources[source];
        self.diagnostics
            .push(CompilationError::new(kind, severity, &info.name, &info.index, span));
    }

    fn report_unresolved(&mut self) {
        for (kind, reference) in self.registry.assert_all_types_resolved() {
            match reference {
                Some(Reference { source, span }) => self.report(kind, source, span),
                None => {
                    let source = self.sources.first().map(|s| s.name.as_str()).unwrap_or(UNNAMED_SOURCE);
                    let diagnostic = CompilationError::unlocated(kind, source);
                    self.diagnostics.push(diagnostic);
                }
            }
        }
    }

    pub(crate) fn unit(&self, scope: &Scope, span: Span) -> CompilationUnit {
        CompilationUnit {
            source_name: self.sources[scope.source].name.clone(),
            span,
        }
    }

    // ── Phase 1 ────────────────────────────────────────────────────────

    fn create_stubs(&mut self) {
        debug!("phase 1: stubs");
        let stubs: Vec<(Type, usize, Span)> = self
            .declarations
            .types
            .iter()
            .map(|decl| {
                let name = QualifiedName::from_fully_qualified(&decl.name);
                let stub = match decl.kind {
                    RawKind::Object(_) => Type::Object(ObjectType::stub(name)),
                    RawKind::Union(_) => Type::Union(UnionType::stub(name)),
                    RawKind::Enum(_) => Type::Enum(EnumType::stub(name)),
                    RawKind::Alias(_) | RawKind::InlineAlias(_) => Type::Alias(TypeAlias::stub(name)),
                    RawKind::Annotation(_) => Type::Annotation(AnnotationType::stub(name)),
                };
                (stub, decl.scope.source, decl.span)
            })
            .collect();
        for (stub, source, span) in stubs {
            if let Err(kind) = self.registry.register(stub) {
                self.report(kind, source, span);
            }
        }
    }

    // ── Phase 2 ────────────────────────────────────────────────────────

    fn compile_declaration(&mut self, index: usize) {
        self.state[index] = CompileState::InProgress;
        let decl = self.declarations.types[index].clone();
        trace!(name = %decl.name, "compiling declaration");

        let compiled = match &decl.kind {
            RawKind::Object(node) => Some(self.compile_object(index, &decl, node)),
            RawKind::Enum(node) => Some(self.compile_enum(index, &decl, node)),
            RawKind::Alias(node) => {
                let aliased = node.aliased_type();
                Some(self.compile_alias(&decl, aliased.as_ref(), node.annotations(), node.doc()))
            }
            RawKind::InlineAlias(target) => {
                // Repeating an inline alias is harmless.
                if self.registry.is_defined(&decl.name) {
                    None
                } else {
                    Some(self.compile_alias(&decl, Some(target), Vec::new(), None))
                }
            }
            RawKind::Annotation(node) => {
                let fields = match node.body() {
                    Some(body) => self.compile_fields(index, body.fields(), &decl.scope, &decl.name),
                    None => Vec::new(),
                };
                let annotations = self.compile_annotations(&node.annotations(), &decl.scope);
                Some(Type::Annotation(AnnotationType::defined(
                    QualifiedName::from_fully_qualified(&decl.name),
                    AnnotationTypeDefinition {
                        fields,
                        annotations,
                        type_doc: node.doc(),
                        source: self.unit(&decl.scope, decl.span),
                    },
                )))
            }
            RawKind::Union(node) => {
                let types = node
                    .members()
                    .iter()
                    .map(|member| self.resolve_type_expr(member, &decl.scope))
                    .collect();
                let annotations = self.compile_annotations(&node.annotations(), &decl.scope);
                Some(Type::Union(UnionType::defined(
                    QualifiedName::from_fully_qualified(&decl.name),
                    UnionTypeDefinition {
                        types,
                        annotations,
                        type_doc: node.doc(),
                        source: self.unit(&decl.scope, decl.span),
                    },
                )))
            }
        };

        if let Some(ty) = compiled {
            if let Err(kind) = self.registry.register(ty) {
                self.report(kind, decl.scope.source, decl.span);
                self.discard_deferred(index);
            }
        }
        self.state[index] = CompileState::Done;
    }

    /// Drop work recorded by a declaration that `register` rejected.
    fn discard_deferred(&mut self, index: usize) {
        self.deferred_constraints.retain(|d| d.declaration != index);
        self.synonyms.retain(|s| s.declaration != index);
    }

    /// Compile the pending declaration of `name` now, if there is one.
    pub(crate) fn ensure_compiled(&mut self, name: &str) {
        if self.registry.is_defined(name) {
            return;
        }
        let next = self
            .raw_by_name
            .get(name)
            .and_then(|indices| indices.iter().copied().find(|&i| self.state[i] != CompileState::Done));
        if let Some(index) = next {
            if self.state[index] == CompileState::Pending {
                self.compile_declaration(index);
            }
        }
    }

    fn ensure_compiled_id(&mut self, id: TypeId) {
        let target = self.registry.arena().resolve_aliases(id);
        if !self.registry.arena()[target].is_user_type() {
            return;
        }
        let name = self.registry.arena().qualified_name(target).fully_qualified_name();
        self.ensure_compiled(&name);
    }

    fn compile_object(&mut self, index: usize, decl: &RawDeclaration, node: &TypeDecl) -> Type {
        let name = QualifiedName::from_fully_qualified(&decl.name);
        let scope = &decl.scope;

        let mut arguments = FxHashMap::default();
        let mut type_parameters = Vec::new();
        for param in node.type_params() {
            let id = self.registry.new_type_argument(&param, &name);
            arguments.insert(param, id);
            type_parameters.push(id);
        }
        self.type_arguments.push(arguments);

        let mut inherits_from = Vec::new();
        for expr in node.inherits() {
            let id = self.resolve_type_expr(&expr, scope);
            if let Type::Enum(inherited) = &self.registry.arena()[id] {
                let message = format!("Type {} cannot inherit from enum {}", decl.name, inherited.name());
                self.report(CompileErrorKind::InvalidDeclaration(message), scope.source, span_of(expr.range()));
                continue;
            }
            inherits_from.push(id);
        }

        let annotations = self.compile_annotations(&node.annotations(), scope);
        let fields = match node.body() {
            Some(body) => self.compile_fields(index, body.fields(), scope, &decl.name),
            None => Vec::new(),
        };
        self.type_arguments.pop();

        let mut modifiers = Vec::new();
        if node.is_closed() {
            modifiers.push(Modifier::Closed);
        }
        if node.is_parameter() {
            modifiers.push(Modifier::Parameter);
        }

        Type::Object(ObjectType::defined(
            name,
            ObjectTypeDefinition {
                fields,
                annotations,
                modifiers,
                inherits_from,
                type_parameters,
                type_doc: node.doc(),
                source: self.unit(scope, decl.span),
            },
        ))
    }

    fn compile_fields(
        &mut self,
        declaration: usize,
        nodes: impl Iterator<Item = FieldNode>,
        scope: &Scope,
        owner: &str,
    ) -> Vec<Field> {
        let mut fields: Vec<Field> = Vec::new();
        for node in nodes {
            let Some(ident) = node.ident() else {
                continue;
            };
            let name = ident.text().to_string();
            let span = span_of(ident.text_range());
            if fields.iter().any(|f| f.name == name) {
                let message = format!("Field {name} is declared more than once on type {owner}");
                self.report(CompileErrorKind::InvalidDeclaration(message), scope.source, span);
                continue;
            }
            let Some(expr) = node.type_expr() else {
                continue;
            };

            let type_id = self.resolve_type_expr(&expr, scope);
            let annotations = self.compile_annotations(&node.annotations(), scope);
            if let Some(list) = node.constraints() {
                self.deferred_constraints.push(DeferredConstraints {
                    declaration,
                    owner: owner.to_string(),
                    field: name.clone(),
                    list,
                    context: type_id,
                    scope: scope.clone(),
                });
            }
            let accessor = node.accessor().and_then(|a| self.compile_accessor(&a, scope));
            let default_value = node
                .default_value()
                .and_then(|literal| self.compile_default(&literal, type_id, &name, scope));
            let modifiers = if node.is_closed() { vec![FieldModifier::Closed] } else { Vec::new() };

            fields.push(Field {
                name,
                type_id,
                nullable: expr.is_nullable(),
                modifiers,
                annotations,
                constraints: Vec::new(),
                accessor,
                default_value,
                type_doc: node.doc(),
            });
        }
        fields
    }

    /// Convert the field constraints deferred during phase 2 and store them
    /// on their fields.
    fn compile_field_constraints(&mut self) {
        let deferred = std::mem::take(&mut self.deferred_constraints);
        for pending in deferred {
            let constraints =
                self.compile_constraints(&pending.list, pending.context, ConstraintTarget::Field, &[], &pending.scope);
            let Some(owner) = self.registry.lookup(&pending.owner) else {
                continue;
            };
            let fields = match self.registry.get_mut(owner) {
                Type::Object(object) => object.definition_mut().map(|d| &mut d.fields),
                Type::Annotation(annotation) => annotation.definition_mut().map(|d| &mut d.fields),
                _ => None,
            };
            if let Some(field) = fields.and_then(|fields| fields.iter_mut().find(|f| f.name == pending.field)) {
                field.constraints = constraints;
            }
        }
    }

    fn compile_accessor(&mut self, node: &AccessorNode, scope: &Scope) -> Option<Accessor> {
        if let Some(destructured) = node.destructured() {
            let mut fields = Vec::new();
            for field in destructured.fields() {
                let (Some(ident), Some(inner)) = (field.ident(), field.accessor()) else {
                    continue;
                };
                if let Some(accessor) = self.compile_accessor(&inner, scope) {
                    fields.push((ident.text().to_string(), accessor));
                }
            }
            return Some(Accessor::Destructured(fields));
        }

        let function = node.function()?;
        let argument = node.argument()?;
        let span = span_of(node.range());
        match function.text() {
            "xpath" => Some(Accessor::Xpath(argument.text())),
            "jsonPath" => Some(Accessor::JsonPath(argument.text())),
            "column" => match argument.text().parse::<u32>() {
                Ok(index) => Some(Accessor::Column(index)),
                Err(_) => {
                    let message = format!("column() expects a column index, found {}", argument.text());
                    self.report(CompileErrorKind::InvalidDeclaration(message), scope.source, span);
                    None
                }
            },
            other => {
                let message = format!("Unknown accessor {other}. Expected xpath, jsonPath or column");
                self.report(CompileErrorKind::InvalidDeclaration(message), scope.source, span);
                None
            }
        }
    }

    fn compile_default(&mut self, literal: &Literal, target: TypeId, field: &str, scope: &Scope) -> Option<Value> {
        let value = literal_value(literal.kind()?, &literal.text())?;
        self.ensure_compiled_id(target);
        let arena = self.registry.arena();
        let checkable = arena[arena.resolve_aliases(target)].is_defined();
        if checkable && !TypeChecker::new(arena).accepts_literal(&value, target) {
            let message = format!(
                "Default value {value} is not assignable to field {field} of type {}",
                arena.display_name(target)
            );
            self.report(
                CompileErrorKind::InvalidDeclaration(message),
                scope.source,
                span_of(literal.range()),
            );
            return None;
        }
        Some(value)
    }

    fn compile_enum(&mut self, index: usize, decl: &RawDeclaration, node: &EnumDecl) -> Type {
        let mut inherits_from = Vec::new();
        for expr in node.inherits() {
            let id = self.resolve_type_expr(&expr, &decl.scope);
            let arena = self.registry.arena();
            let name = arena.qualified_name(id).fully_qualified_name();
            let undeclared = !arena[id].is_defined() && !self.raw_by_name.contains_key(&name);
            if !matches!(arena[id], Type::Enum(_)) && !undeclared {
                let message = "An Enum can only inherit from an Enum".to_string();
                self.report(CompileErrorKind::InvalidDeclaration(message), decl.scope.source, span_of(expr.range()));
                continue;
            }
            inherits_from.push(id);
        }

        let mut values: Vec<EnumValue> = Vec::new();
        for value in node.values() {
            let Some(ident) = value.ident() else {
                continue;
            };
            let name = ident.text().to_string();
            if values.iter().any(|v| v.name == name) {
                let message = format!("Enum value {name} is declared more than once on enum {}", decl.name);
                self.report(
                    CompileErrorKind::InvalidDeclaration(message),
                    decl.scope.source,
                    span_of(ident.text_range()),
                );
                continue;
            }
            let targets: Vec<(String, Span)> = value
                .synonyms()
                .iter()
                .map(|path| (path.text(), span_of(path.range())))
                .collect();
            if !targets.is_empty() {
                self.synonyms.push(DeclaredSynonyms {
                    declaration: index,
                    enum_name: decl.name.clone(),
                    value: name.clone(),
                    targets,
                    scope: decl.scope.clone(),
                });
            }
            let literal = value.value().and_then(|lit| literal_value(lit.kind()?, &lit.text()));
            let mut enum_value = EnumValue::new(name, literal);
            enum_value.annotations = self.compile_annotations(&value.annotations(), &decl.scope);
            enum_value.type_doc = value.doc();
            values.push(enum_value);
        }

        let annotations = self.compile_annotations(&node.annotations(), &decl.scope);
        Type::Enum(EnumType::defined(
            QualifiedName::from_fully_qualified(&decl.name),
            EnumDefinition {
                base_primitive: EnumDefinition::derive_base_primitive(&values),
                values,
                annotations,
                inherits_from,
                type_doc: node.doc(),
                source: self.unit(&decl.scope, decl.span),
            },
        ))
    }

    fn compile_alias(
        &mut self,
        decl: &RawDeclaration,
        aliased: Option<&TypeExpr>,
        annotations: Vec<AnnotationNode>,
        type_doc: Option<String>,
    ) -> Type {
        let mut aliased_type = match aliased {
            Some(expr) => self.resolve_type_expr(expr, &decl.scope),
            None => PrimitiveType::Any.type_id(),
        };
        if self.alias_chain_reaches(aliased_type, &decl.name) {
            let message = format!("Type alias {} has a circular reference", decl.name);
            self.report(CompileErrorKind::InvalidDeclaration(message), decl.scope.source, decl.span);
            aliased_type = PrimitiveType::Any.type_id();
        }
        let annotations = self.compile_annotations(&annotations, &decl.scope);
        Type::Alias(TypeAlias::defined(
            QualifiedName::from_fully_qualified(&decl.name),
            TypeAliasDefinition {
                aliased_type,
                annotations,
                type_doc,
                source: self.unit(&decl.scope, decl.span),
            },
        ))
    }

    /// Whether following aliases from `start` arrives back at `name`.
    fn alias_chain_reaches(&self, start: TypeId, name: &str) -> bool {
        let arena = self.registry.arena();
        let mut seen = FxHashSet::default();
        let mut current = start;
        loop {
            if arena.qualified_name(current).fully_qualified_name() == name {
                return true;
            }
            match arena[current].as_alias().and_then(TypeAlias::aliased_type) {
                Some(next) if seen.insert(current) => current = next,
                _ => return false,
            }
        }
    }

    // ── Annotations and constraints ────────────────────────────────────

    pub(crate) fn compile_annotations(&mut self, nodes: &[AnnotationNode], scope: &Scope) -> Vec<Annotation> {
        let mut annotations = Vec::new();
        for node in nodes {
            let Some(path) = node.path() else {
                continue;
            };
            let written = path.text();
            let qualified = self.qualify_reference(&written, scope);
            let type_id = self
                .registry
                .lookup(&qualified)
                .filter(|id| matches!(self.registry.arena()[*id], Type::Annotation(_)));

            let mut parameters = Vec::new();
            for arg in node.args() {
                let Some(value) = arg.value().and_then(|lit| literal_value(lit.kind()?, &lit.text())) else {
                    continue;
                };
                let name = arg.ident().map(|t| t.text().to_string()).unwrap_or_else(|| "value".to_string());
                parameters.push((name, value));
            }

            if type_id.is_some() {
                self.ensure_compiled(&qualified);
                self.check_annotation_parameters(&qualified, &parameters, scope, span_of(node.range()));
            }

            annotations.push(Annotation {
                name: if type_id.is_some() { qualified } else { written },
                type_id,
                parameters,
            });
        }
        annotations
    }

    /// Warn about parameters a declared annotation type has no field for.
    fn check_annotation_parameters(&mut self, name: &str, parameters: &[(String, Value)], scope: &Scope, span: Span) {
        let Some(Type::Annotation(annotation)) = self.registry.lookup(name).map(|id| &self.registry.arena()[id]) else {
            return;
        };
        let Some(definition) = annotation.definition() else {
            return;
        };
        let unknown: Vec<String> = parameters
            .iter()
            .filter(|(param, _)| !definition.fields.iter().any(|f| &f.name == param))
            .map(|(param, _)| param.clone())
            .collect();
        for param in unknown {
            let message = format!("Annotation {name} does not declare a parameter named {param}");
            self.report_with_severity(CompileErrorKind::InvalidDeclaration(message), Severity::Warning, scope.source, span);
        }
    }

    pub(crate) fn compile_constraints(
        &mut self,
        list: &ConstraintList,
        context: TypeId,
        target: ConstraintTarget,
        parameters: &[(String, TypeId)],
        scope: &Scope,
    ) -> Vec<Constraint> {
        let mut raw = Vec::new();
        for node in list.constraints() {
            match RawConstraint::from_node(&node) {
                Some(constraint) => raw.push(constraint),
                None => self.report(
                    CompileErrorKind::Internal(format!("unrecognised constraint `{}`", node.syntax().text())),
                    scope.source,
                    span_of(node.range()),
                ),
            }
        }

        let converter = ConstraintConverter::new(self.registry.arena(), parameters, target);
        let (constraints, errors) = converter.convert_all(raw, context);
        for (kind, span) in errors {
            self.report(kind, scope.source, span);
        }
        constraints
    }

    // ── Type references ────────────────────────────────────────────────

    pub(crate) fn resolve_type_expr(&mut self, expr: &TypeExpr, scope: &Scope) -> TypeId {
        match expr {
            TypeExpr::Ref(type_ref) => self.resolve_type_ref(type_ref, scope),
            TypeExpr::Lambda(lambda) => {
                let parameters = lambda
                    .params()
                    .iter()
                    .map(|param| self.resolve_type_expr(param, scope))
                    .collect();
                let return_type = match lambda.return_type() {
                    Some(ret) => self.resolve_type_expr(&ret, scope),
                    None => VOID_ID,
                };
                self.registry.intern_lambda(parameters, return_type)
            }
        }
    }

    fn resolve_type_ref(&mut self, type_ref: &TypeRef, scope: &Scope) -> TypeId {
        let Some(path) = type_ref.path() else {
            return PrimitiveType::Any.type_id();
        };
        let name = path.text();
        let span = span_of(path.range());
        let args: Vec<TypeId> = type_ref
            .type_args()
            .iter()
            .map(|arg| self.resolve_type_expr(arg, scope))
            .collect();

        let mut id = self.resolve_named(&name, args, scope, span);
        for _ in 0..type_ref.array_depth() {
            id = self
                .registry
                .intern_generic(GenericKind::Builtin(BuiltinGeneric::Array), vec![id]);
        }
        id
    }

    /// Resolve a written name with its explicit type arguments: in-scope type
    /// argument, then built-ins, then the namespace-qualified name with the
    /// root namespace as fallback.
    fn resolve_named(&mut self, name: &str, args: Vec<TypeId>, scope: &Scope, span: Span) -> TypeId {
        if !name.contains('.') {
            if let Some(id) = self.type_argument(name) {
                self.check_arity(name, 0, args.len(), scope, span);
                return id;
            }
        }

        if let Some(builtin) = Builtin::lookup(name) {
            return match builtin {
                Builtin::Primitive(primitive) => {
                    self.check_arity(name, 0, args.len(), scope, span);
                    primitive.type_id()
                }
                Builtin::Void => {
                    self.check_arity(name, 0, args.len(), scope, span);
                    VOID_ID
                }
                Builtin::Generic(generic) => {
                    if self.check_arity(name, generic.arity(), args.len(), scope, span) {
                        self.registry.intern_generic(GenericKind::Builtin(generic), args)
                    } else {
                        PrimitiveType::Any.type_id()
                    }
                }
            };
        }

        let qualified = self.qualify_reference(name, scope);
        let base = self.registry.get_or_create(
            &qualified,
            Some(Reference {
                source: scope.source,
                span,
            }),
        );
        if args.is_empty() {
            return base;
        }

        let declared = self.declared_type_params(&qualified);
        if let Some(expected) = declared {
            if !self.check_arity(&qualified, expected, args.len(), scope, span) {
                return base;
            }
        }
        self.registry.intern_generic(GenericKind::Declared(base), args)
    }

    fn check_arity(&mut self, name: &str, expected: usize, actual: usize, scope: &Scope, span: Span) -> bool {
        if expected == actual {
            return true;
        }
        self.report(
            CompileErrorKind::InvalidGenericArity {
                name: name.to_string(),
                expected,
                actual,
            },
            scope.source,
            span,
        );
        false
    }

    fn type_argument(&self, name: &str) -> Option<TypeId> {
        self.type_arguments
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Type parameter count of a declared (not necessarily compiled) type.
    fn declared_type_params(&self, name: &str) -> Option<usize> {
        let index = *self.raw_by_name.get(name)?.first()?;
        Some(self.declarations.types[index].type_params().len())
    }

    fn is_known(&self, name: &str) -> bool {
        self.registry.contains(name) || self.raw_by_name.contains_key(name)
    }

    pub(crate) fn qualify_reference(&self, name: &str, scope: &Scope) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        let qualified = qualify(&scope.namespace, name);
        if scope.namespace.is_empty() || self.is_known(&qualified) || !self.is_known(name) {
            qualified
        } else {
            name.to_string()
        }
    }

    // ── Phase 3 ────────────────────────────────────────────────────────

    fn apply_extensions(&mut self) {
        let extensions = self.declarations.extensions.clone();
        for mut ext in extensions {
            ext.name = self.qualify_reference(&ext.written, &ext.scope);
            let ext = &ext;
            trace!(name = %ext.name, "applying extension");
            let base = self
                .registry
                .lookup(&ext.name)
                .filter(|id| self.registry.arena()[*id].is_defined());
            let Some(base) = base else {
                let message = format!("cannot extend {} as it is not defined", ext.name);
                self.report(CompileErrorKind::InvalidExtension(message), ext.scope.source, ext.span);
                continue;
            };

            let extended = match &ext.kind {
                RawExtensionKind::Type(node) => self.extend_object(base, ext, node),
                RawExtensionKind::Enum(node) => self.extend_enum(base, ext, node),
                RawExtensionKind::Alias(node) => self.extend_alias(base, ext, node),
            };
            if let Some(ty) = extended {
                if let Err(kind) = self.registry.register(ty) {
                    self.report(kind, ext.scope.source, ext.span);
                }
            }
        }
    }

    fn wrong_extension_target(&mut self, base: TypeId, ext: &RawExtension, expected: &str) {
        let kind = self.registry.arena()[base].kind_name();
        let message = format!("{expected} cannot target {} (declared as {kind})", ext.name);
        self.report(CompileErrorKind::InvalidExtension(message), ext.scope.source, ext.span);
    }

    fn extend_object(&mut self, base: TypeId, ext: &RawExtension, node: &TypeExtension) -> Option<Type> {
        let Type::Object(object) = &self.registry.arena()[base] else {
            self.wrong_extension_target(base, ext, "a type extension");
            return None;
        };
        let object = object.clone();
        let scope = &ext.scope;

        let mut field_extensions: Vec<FieldExtension> = Vec::new();
        for field_node in node.fields() {
            let Some(ident) = field_node.ident() else {
                continue;
            };
            let field_name = ident.text().to_string();
            let span = span_of(ident.text_range());
            let Some(field) = object.field(&field_name) else {
                let message = format!(
                    "cannot extend field {field_name} of {} as it does not exist. Extensions may not add fields",
                    ext.name
                );
                self.report(CompileErrorKind::InvalidExtension(message), scope.source, span);
                continue;
            };

            let refined_type = match field_node.refined_type() {
                Some(expr) => {
                    let refined = self.resolve_type_expr(&expr, scope);
                    let previous = object.refinement_of(&field_name).or_else(|| {
                        field_extensions
                            .iter()
                            .filter(|fe| fe.name == field_name)
                            .find_map(|fe| fe.refined_type)
                    });
                    let arena = self.registry.arena();
                    if let Some(previous) = previous {
                        let message = format!(
                            "Cannot refine field {field_name} to {} as it has already been refined to {}",
                            arena.display_name(refined),
                            arena.display_name(previous)
                        );
                        self.report(CompileErrorKind::InvalidExtension(message), scope.source, span);
                        continue;
                    }
                    if !TypeChecker::new(arena).is_assignable_to(refined, field.type_id) {
                        let message = format!(
                            "Cannot refine field {field_name} to {} as it is not assignable to {}",
                            arena.display_name(refined),
                            arena.display_name(field.type_id)
                        );
                        self.report(CompileErrorKind::InvalidExtension(message), scope.source, span);
                        continue;
                    }
                    Some(refined)
                }
                None => None,
            };

            let field_type = refined_type.unwrap_or(field.type_id);
            let default_value = field_node
                .default_value()
                .and_then(|literal| self.compile_default(&literal, field_type, &field_name, scope));
            let annotations = self.compile_annotations(&field_node.annotations(), scope);
            field_extensions.push(FieldExtension {
                name: field_name,
                annotations,
                refined_type,
                default_value,
                type_doc: field_node.doc(),
            });
        }

        let annotations = self.compile_annotations(&node.annotations(), scope);
        let extension = ObjectTypeExtension {
            annotations,
            field_extensions,
            type_doc: node.doc(),
            source: self.unit(scope, ext.span),
        };
        Some(Type::Object(ObjectType::with_extension(object.name().clone(), extension)))
    }

    fn extend_enum(&mut self, base: TypeId, ext: &RawExtension, node: &EnumExtension) -> Option<Type> {
        let Type::Enum(enum_type) = &self.registry.arena()[base] else {
            self.wrong_extension_target(base, ext, "an enum extension");
            return None;
        };
        let enum_type = enum_type.clone();

        let added: Vec<String> = node
            .values()
            .filter_map(|value| value.ident())
            .map(|ident| ident.text().to_string())
            .filter(|name| !enum_type.has_value(name))
            .collect();
        if !added.is_empty() {
            let message = format!(
                "cannot modify members of enum {}. An extension attempted to add new members: {}",
                ext.name,
                added.join(", ")
            );
            self.report(CompileErrorKind::InvalidExtension(message), ext.scope.source, ext.span);
            return None;
        }

        let mut values = Vec::new();
        for value in node.values() {
            let Some(ident) = value.ident() else {
                continue;
            };
            let mut extended = EnumValue::new(ident.text().to_string(), None);
            extended.annotations = self.compile_annotations(&value.annotations(), &ext.scope);
            extended.type_doc = value.doc();
            values.push(extended);
        }
        let annotations = self.compile_annotations(&node.annotations(), &ext.scope);
        let extension = EnumTypeExtension {
            annotations,
            values,
            type_doc: node.doc(),
            source: self.unit(&ext.scope, ext.span),
        };
        Some(Type::Enum(EnumType::with_extension(enum_type.name().clone(), extension)))
    }

    fn extend_alias(&mut self, base: TypeId, ext: &RawExtension, node: &TypeAliasExtension) -> Option<Type> {
        let Type::Alias(alias) = &self.registry.arena()[base] else {
            self.wrong_extension_target(base, ext, "a type alias extension");
            return None;
        };
        let name = alias.name().clone();
        let annotations = self.compile_annotations(&node.annotations(), &ext.scope);
        let extension = AliasTypeExtension {
            annotations,
            type_doc: node.doc(),
            source: self.unit(&ext.scope, ext.span),
        };
        Some(Type::Alias(TypeAlias::with_extension(name, extension)))
    }
}
