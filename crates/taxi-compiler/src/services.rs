//! Services and their operations.

use serde::Serialize;
use taxi_parser::ast::item::Operation as OperationNode;
use taxi_parser::ast::{HasDocsAndAnnotations, HasIdent};
use tracing::trace;

use crate::collator::{RawService, Scope};
use crate::compiler::TypeCompiler;
use crate::constraints::{Constraint, ConstraintTarget};
use crate::error::CompileErrorKind;
use crate::name::QualifiedName;
use crate::primitives::VOID_ID;
use crate::types::{Annotation, CompilationUnit, TypeId};

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub name: QualifiedName,
    pub operations: Vec<Operation>,
    pub annotations: Vec<Annotation>,
    pub type_doc: Option<String>,
    pub source: CompilationUnit,
}

impl Service {
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub parameters: Vec<Parameter>,
    /// `Void` when no return type is written.
    pub return_type: TypeId,
    /// Present only when the return type carries constraints.
    pub contract: Option<OperationContract>,
    pub type_doc: Option<String>,
}

impl Operation {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    /// Parameters may be declared by type alone.
    pub name: Option<String>,
    pub type_id: TypeId,
    pub nullable: bool,
    pub annotations: Vec<Annotation>,
    pub constraints: Vec<Constraint>,
}

/// What an operation promises about its result.
#[derive(Debug, Clone, Serialize)]
pub struct OperationContract {
    pub return_type: TypeId,
    pub return_type_constraints: Vec<Constraint>,
}

impl TypeCompiler {
    pub(crate) fn compile_services(&mut self) {
        let raw = std::mem::take(&mut self.declarations.services);
        for service in &raw {
            if self.services.iter().any(|s| s.name.fully_qualified_name() == service.name) {
                self.report(
                    CompileErrorKind::Redefinition {
                        kind: "service",
                        name: service.name.clone(),
                    },
                    service.scope.source,
                    service.span,
                );
                continue;
            }
            let compiled = self.compile_service(service);
            self.services.push(compiled);
        }
        self.declarations.services = raw;
    }

    fn compile_service(&mut self, service: &RawService) -> Service {
        trace!(name = %service.name, "compiling service");
        let operations = service
            .decl
            .operations()
            .filter_map(|op| self.compile_operation(&op, &service.scope))
            .collect();
        let annotations = self.compile_annotations(&service.decl.annotations(), &service.scope);
        Service {
            name: QualifiedName::from_fully_qualified(&service.name),
            operations,
            annotations,
            type_doc: service.decl.doc(),
            source: self.unit(&service.scope, service.span),
        }
    }

    fn compile_operation(&mut self, node: &OperationNode, scope: &Scope) -> Option<Operation> {
        let name = node.ident()?.text().to_string();
        let params = node.params();

        // Types first: constraints may reference any parameter by name.
        let mut typed = Vec::with_capacity(params.len());
        for param in &params {
            let Some(expr) = param.type_expr() else {
                continue;
            };
            let type_id = self.resolve_type_expr(&expr, scope);
            typed.push((param, expr.is_nullable(), type_id));
        }
        let scope_params: Vec<(String, TypeId)> = typed
            .iter()
            .filter_map(|(param, _, id)| Some((param.ident()?.text().to_string(), *id)))
            .collect();

        let mut parameters = Vec::with_capacity(typed.len());
        for (param, nullable, type_id) in typed {
            let constraints = match param.constraints() {
                Some(list) => self.compile_constraints(&list, type_id, ConstraintTarget::Parameter, &scope_params, scope),
                None => Vec::new(),
            };
            parameters.push(Parameter {
                name: param.ident().map(|t| t.text().to_string()),
                type_id,
                nullable,
                annotations: self.compile_annotations(&param.annotations(), scope),
                constraints,
            });
        }

        let (return_type, contract) = match node.return_type() {
            Some(ret) => {
                let return_type = match ret.type_expr() {
                    Some(expr) => self.resolve_type_expr(&expr, scope),
                    None => VOID_ID,
                };
                let contract = ret.constraints().map(|list| {
                    let constraints =
                        self.compile_constraints(&list, return_type, ConstraintTarget::ReturnType, &scope_params, scope);
                    OperationContract {
                        return_type,
                        return_type_constraints: constraints,
                    }
                });
                (return_type, contract)
            }
            None => (VOID_ID, None),
        };

        Some(Operation {
            name,
            annotations: self.compile_annotations(&node.annotations(), scope),
            parameters,
            return_type,
            contract,
            type_doc: node.doc(),
        })
    }
}
