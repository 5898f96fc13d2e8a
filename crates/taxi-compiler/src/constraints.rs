//! Constraints on fields, parameters and operation return types.
//!
//! A constraint list is read into [`RawConstraint`]s first, then each one is
//! validated against its context type and turned into a [`Constraint`].

use std::fmt;

use serde::Serialize;
use taxi_common::span::Span;
use taxi_parser::ast::types::{Constraint as ConstraintNode, LiteralKind};

use crate::checker::TypeChecker;
use crate::collator::span_of;
use crate::error::CompileErrorKind;
use crate::types::{Type, TypeArena, TypeId, Value};

/// A dotted reference into a parameter or field: `source.currency`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AttributePath {
    pub segments: Vec<String>,
}

impl AttributePath {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn rest(&self) -> &[String] {
        self.segments.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Constraint {
    /// `currency = 'GBP'`
    ConstantValue { field: String, value: Value },
    /// `currency = target.currency`
    ValueFromParameterPath { field: String, path: AttributePath },
    /// `from source`
    ReturnDerivedFromInput { path: AttributePath },
}

/// A constraint as written, before validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawConstraint {
    ConstantValue { field: String, value: Value, span: Span },
    ParameterPath { field: String, path: AttributePath, span: Span },
    ReturnFrom { path: AttributePath, span: Span },
}

impl RawConstraint {
    /// `None` when the node fits no known constraint form.
    pub(crate) fn from_node(node: &ConstraintNode) -> Option<Self> {
        let lead = node.lead()?.text().to_string();
        let span = span_of(node.range());
        if !node.has_eq() {
            return match (lead.as_str(), node.path()) {
                ("from", Some(path)) => Some(RawConstraint::ReturnFrom {
                    path: AttributePath::new(path.segments()),
                    span,
                }),
                _ => None,
            };
        }
        if let Some(literal) = node.literal() {
            return Some(RawConstraint::ConstantValue {
                field: lead,
                value: literal_value(literal.kind()?, &literal.text())?,
                span,
            });
        }
        node.path().map(|path| RawConstraint::ParameterPath {
            field: lead,
            path: AttributePath::new(path.segments()),
            span,
        })
    }

    pub(crate) fn span(&self) -> Span {
        match self {
            RawConstraint::ConstantValue { span, .. }
            | RawConstraint::ParameterPath { span, .. }
            | RawConstraint::ReturnFrom { span, .. } => *span,
        }
    }
}

/// Convert literal source text to a value of the given kind.
pub(crate) fn literal_value(kind: LiteralKind, text: &str) -> Option<Value> {
    match kind {
        LiteralKind::String => Some(Value::String(text.to_string())),
        LiteralKind::Int => text.parse().ok().map(Value::Int),
        LiteralKind::Decimal => text.parse().ok().map(Value::Decimal),
        LiteralKind::Bool => Some(Value::Bool(text == "true")),
    }
}

/// Where a constraint list appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintTarget {
    Field,
    Parameter,
    ReturnType,
}

pub(crate) struct ConstraintConverter<'a> {
    arena: &'a TypeArena,
    parameters: &'a [(String, TypeId)],
    target: ConstraintTarget,
}

impl<'a> ConstraintConverter<'a> {
    pub(crate) fn new(arena: &'a TypeArena, parameters: &'a [(String, TypeId)], target: ConstraintTarget) -> Self {
        Self {
            arena,
            parameters,
            target,
        }
    }

    /// Convert every raw constraint against `context`. Derivations come first
    /// in the result; failures are returned with their spans.
    pub(crate) fn convert_all(
        &self,
        raw: Vec<RawConstraint>,
        context: TypeId,
    ) -> (Vec<Constraint>, Vec<(CompileErrorKind, Span)>) {
        let (derivations, attributes): (Vec<_>, Vec<_>) = raw
            .into_iter()
            .partition(|c| matches!(c, RawConstraint::ReturnFrom { .. }));

        let mut constraints = Vec::new();
        let mut errors = Vec::new();
        for raw in derivations.into_iter().chain(attributes) {
            let span = raw.span();
            match self.convert(raw, context) {
                Ok(constraint) => constraints.push(constraint),
                Err(err) => errors.push((err, span)),
            }
        }
        (constraints, errors)
    }

    pub(crate) fn convert(&self, raw: RawConstraint, context: TypeId) -> Result<Constraint, CompileErrorKind> {
        let checker = TypeChecker::new(self.arena);
        match raw {
            RawConstraint::ConstantValue { field, value, .. } => {
                let field_type = self.constrained_field(context, &field)?;
                if self.is_checkable(field_type) && !checker.accepts_literal(&value, field_type) {
                    return Err(CompileErrorKind::InvalidConstraint(format!(
                        "Constraint value {value} is not assignable to field {field} of type {}",
                        self.arena.display_name(field_type)
                    )));
                }
                Ok(Constraint::ConstantValue { field, value })
            }
            RawConstraint::ParameterPath { field, path, .. } => {
                let field_type = self.constrained_field(context, &field)?;
                if !self.parameters.is_empty() {
                    let path_type = self.resolve_path(&path)?;
                    if self.is_checkable(field_type)
                        && self.is_checkable(path_type)
                        && !checker.is_assignable_to(path_type, field_type)
                    {
                        return Err(CompileErrorKind::InvalidConstraint(format!(
                            "Cannot assign {path} of type {} to field {field} of type {}",
                            self.arena.display_name(path_type),
                            self.arena.display_name(field_type)
                        )));
                    }
                }
                Ok(Constraint::ValueFromParameterPath { field, path })
            }
            RawConstraint::ReturnFrom { path, .. } => {
                if self.target != ConstraintTarget::ReturnType {
                    return Err(CompileErrorKind::InvalidConstraint(
                        "`from` constraints are only valid on operation return types".to_string(),
                    ));
                }
                self.resolve_path(&path)?;
                Ok(Constraint::ReturnDerivedFromInput { path })
            }
        }
    }

    /// The type of `field` on the (alias-stripped) object context.
    fn constrained_field(&self, context: TypeId, field: &str) -> Result<TypeId, CompileErrorKind> {
        let context = self.arena.resolve_aliases(context);
        match &self.arena[context] {
            Type::Object(object) if !object.is_defined() => Err(CompileErrorKind::InvalidConstraint(format!(
                "Cannot constrain field {field} of {} as it is not defined",
                object.name()
            ))),
            Type::Object(_) => self
                .arena
                .field(context, field)
                .map(|f| f.type_id)
                .ok_or_else(|| CompileErrorKind::InvalidConstraint(format!("No field named {field} was found"))),
            _ => Err(CompileErrorKind::InvalidConstraint(
                "Constraints are only supported on Object types.".to_string(),
            )),
        }
    }

    /// Walk a parameter path to the type it names.
    fn resolve_path(&self, path: &AttributePath) -> Result<TypeId, CompileErrorKind> {
        let first = path.first().unwrap_or_default();
        let mut current = self
            .parameters
            .iter()
            .find(|(name, _)| name == first)
            .map(|(_, id)| *id)
            .ok_or_else(|| {
                CompileErrorKind::InvalidConstraint(format!(
                    "Cannot resolve {path}: there is no parameter named {first}"
                ))
            })?;
        for segment in path.rest() {
            current = self
                .arena
                .field(current, segment)
                .map(|f| f.type_id)
                .ok_or_else(|| {
                    CompileErrorKind::InvalidConstraint(format!(
                        "No field named {segment} was found on type {}",
                        self.arena.display_name(current)
                    ))
                })?;
        }
        Ok(current)
    }

    /// Undefined types have already produced their own diagnostic.
    fn is_checkable(&self, id: TypeId) -> bool {
        self.arena[self.arena.resolve_aliases(id)].is_defined()
    }
}
