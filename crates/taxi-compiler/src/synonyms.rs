//! Enum value synonyms.
//!
//! `A synonym of Other.B` links two enum values. Links are symmetric and
//! transitive: once every enum is compiled, each linked value lists every
//! value reachable from it, whichever side declared the link.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use taxi_common::span::Span;
use tracing::debug;

use crate::collator::Scope;
use crate::compiler::TypeCompiler;
use crate::error::CompileErrorKind;
use crate::types::Type;

/// Synonyms written on one enum value.
#[derive(Debug, Clone)]
pub(crate) struct DeclaredSynonyms {
    pub declaration: usize,
    pub enum_name: String,
    pub value: String,
    /// `Foo.A` or `com.x.Foo.A`, as written.
    pub targets: Vec<(String, Span)>,
    pub scope: Scope,
}

/// Undirected graph over `Enum.VALUE` names.
#[derive(Debug, Default)]
struct SynonymGraph {
    edges: FxHashMap<String, Vec<String>>,
}

impl SynonymGraph {
    fn link(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        self.edges.entry(a.to_string()).or_default().push(b.to_string());
        self.edges.entry(b.to_string()).or_default().push(a.to_string());
    }

    /// Every value reachable from `start`, nearest first, excluding `start`.
    fn reachable(&self, start: &str) -> Vec<String> {
        let mut seen = FxHashSet::default();
        seen.insert(start);
        let mut queue: VecDeque<&str> = self.neighbours(start).collect();
        let mut result = Vec::new();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            result.push(next.to_string());
            queue.extend(self.neighbours(next));
        }
        result
    }

    fn neighbours<'a>(&'a self, value: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges.get(value).into_iter().flatten().map(String::as_str)
    }
}

impl TypeCompiler {
    /// Validate every declared synonym and store the closed synonym sets on
    /// the enum values.
    pub(crate) fn resolve_synonyms(&mut self) {
        let declared = std::mem::take(&mut self.synonyms);
        if declared.is_empty() {
            return;
        }

        let mut graph = SynonymGraph::default();
        for entry in &declared {
            let value = format!("{}.{}", entry.enum_name, entry.value);
            for (written, span) in &entry.targets {
                match self.resolve_synonym(written, &entry.scope) {
                    Ok(target) => graph.link(&value, &target),
                    Err(kind) => self.report(kind, entry.scope.source, *span),
                }
            }
        }
        debug!(values = graph.edges.len(), "linking enum synonyms");

        let linked: Vec<(String, Vec<String>)> = graph
            .edges
            .keys()
            .map(|value| (value.clone(), graph.reachable(value)))
            .collect();
        for (value, synonyms) in linked {
            if let Some((enum_name, value)) = value.rsplit_once('.') {
                self.set_synonyms(enum_name, value, synonyms);
            }
        }
    }

    /// Qualify `Enum.VALUE` and check that the enum declares the value.
    fn resolve_synonym(&self, written: &str, scope: &Scope) -> Result<String, CompileErrorKind> {
        let Some((enum_name, value)) = written.rsplit_once('.') else {
            return Err(CompileErrorKind::InvalidDeclaration(format!(
                "Synonym {written} must name an enum value as Enum.VALUE"
            )));
        };
        let qualified = self.qualify_reference(enum_name, scope);
        let enum_type = self
            .registry
            .lookup(&qualified)
            .and_then(|id| self.registry.arena()[id].as_enum());
        match enum_type {
            Some(enum_type) if enum_type.has_value(value) => Ok(format!("{qualified}.{value}")),
            Some(_) => Err(CompileErrorKind::InvalidDeclaration(format!(
                "{value} is not defined on type {qualified}"
            ))),
            None => Err(CompileErrorKind::InvalidDeclaration(format!("{qualified} is not an Enum"))),
        }
    }

    fn set_synonyms(&mut self, enum_name: &str, value: &str, synonyms: Vec<String>) {
        let Some(id) = self.registry.lookup(enum_name) else {
            return;
        };
        let Type::Enum(enum_type) = self.registry.get_mut(id) else {
            return;
        };
        let declared = enum_type
            .definition_mut()
            .and_then(|def| def.values.iter_mut().find(|v| v.name == value));
        if let Some(declared) = declared {
            declared.synonyms = synonyms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reachable_is_symmetric_and_transitive() {
        let mut graph = SynonymGraph::default();
        graph.link("A.X", "B.X");
        graph.link("B.X", "C.X");
        graph.link("C.X", "C.X");

        assert_eq!(graph.reachable("A.X"), vec!["B.X", "C.X"]);
        assert_eq!(graph.reachable("C.X"), vec!["B.X", "A.X"]);
        assert!(graph.reachable("D.X").is_empty());
    }
}
