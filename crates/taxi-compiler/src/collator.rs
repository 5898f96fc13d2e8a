//! Declaration collation.
//!
//! One walk over each parsed source buckets its declarations into types,
//! extensions and services, tracking the active namespace and qualifying
//! declared names. Buckets from several sources are concatenated before any
//! compilation happens.

use rowan::TextRange;
use taxi_common::span::{LineIndex, Span};
use taxi_parser::ast::item::{
    AnnotationDecl, EnumDecl, EnumExtension, Item, ServiceDecl, SourceFile, TypeAliasDecl,
    TypeAliasExtension, TypeDecl, TypeExtension, UnionDecl,
};
use taxi_parser::ast::types::TypeExpr;
use taxi_parser::ast::{HasIdent, HasName};

use crate::name::qualify;

pub(crate) fn span_of(range: TextRange) -> Span {
    Span::new(range.start().into(), range.end().into())
}

/// A named source text and its line index.
#[derive(Debug, Clone)]
pub(crate) struct SourceInfo {
    pub name: String,
    pub index: LineIndex,
}

impl SourceInfo {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            index: LineIndex::new(text),
        }
    }
}

/// Namespace and source a declaration's references resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Scope {
    pub namespace: String,
    pub source: usize,
}

#[derive(Debug, Clone)]
pub(crate) enum RawKind {
    Object(TypeDecl),
    Union(UnionDecl),
    Enum(EnumDecl),
    Alias(TypeAliasDecl),
    /// `code : CountryCode as String` declares `CountryCode`.
    InlineAlias(TypeExpr),
    Annotation(AnnotationDecl),
}

#[derive(Debug, Clone)]
pub(crate) struct RawDeclaration {
    pub name: String,
    pub scope: Scope,
    pub span: Span,
    pub kind: RawKind,
}

impl RawDeclaration {
    /// Declared type parameter names; only object types have any.
    pub fn type_params(&self) -> Vec<String> {
        match &self.kind {
            RawKind::Object(decl) => decl.type_params(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum RawExtensionKind {
    Type(TypeExtension),
    Enum(EnumExtension),
    Alias(TypeAliasExtension),
}

#[derive(Debug, Clone)]
pub(crate) struct RawExtension {
    /// Qualified against the extension's namespace. The compiler re-resolves
    /// `written` with the root-namespace fallback once all names are known.
    pub name: String,
    pub written: String,
    pub scope: Scope,
    pub span: Span,
    pub kind: RawExtensionKind,
}

#[derive(Debug, Clone)]
pub(crate) struct RawService {
    pub name: String,
    pub scope: Scope,
    pub span: Span,
    pub decl: ServiceDecl,
}

#[derive(Debug, Default)]
pub(crate) struct Declarations {
    pub types: Vec<RawDeclaration>,
    pub extensions: Vec<RawExtension>,
    pub services: Vec<RawService>,
}

impl Declarations {
    pub fn append(&mut self, other: Declarations) {
        self.types.extend(other.types);
        self.extensions.extend(other.extensions);
        self.services.extend(other.services);
    }
}

/// Bucket the declarations of one parsed source.
pub(crate) fn collect(source: usize, file: &SourceFile) -> Declarations {
    let mut collator = Collator {
        source,
        namespace: String::new(),
        declarations: Declarations::default(),
    };
    collator.visit_items(file.items());
    collator.declarations
}

struct Collator {
    source: usize,
    namespace: String,
    declarations: Declarations,
}

impl Collator {
    fn visit_items(&mut self, items: impl Iterator<Item = Item>) {
        for item in items {
            self.visit_item(item);
        }
    }

    fn visit_item(&mut self, item: Item) {
        match item {
            Item::Namespace(ns) => {
                let path = ns.path().map(|p| p.text()).unwrap_or_default();
                match ns.body() {
                    Some(body) => {
                        let outer = std::mem::replace(&mut self.namespace, path);
                        self.visit_items(body.items());
                        self.namespace = outer;
                    }
                    None => self.namespace = path,
                }
            }
            Item::Type(decl) => {
                if let Some((name, span)) = self.declared_name(&decl) {
                    self.collect_inline_aliases(&decl);
                    self.push_type(name, span, RawKind::Object(decl));
                }
            }
            Item::Union(decl) => {
                if let Some((name, span)) = self.declared_name(&decl) {
                    self.push_type(name, span, RawKind::Union(decl));
                }
            }
            Item::Enum(decl) => {
                if let Some((name, span)) = self.declared_name(&decl) {
                    self.push_type(name, span, RawKind::Enum(decl));
                }
            }
            Item::Alias(decl) => {
                if let Some((name, span)) = self.declared_name(&decl) {
                    self.push_type(name, span, RawKind::Alias(decl));
                }
            }
            Item::AnnotationType(decl) => {
                if let Some((name, span)) = self.declared_name(&decl) {
                    self.push_type(name, span, RawKind::Annotation(decl));
                }
            }
            Item::TypeExtension(ext) => {
                if let Some((written, span)) = self.written_name(&ext) {
                    self.push_extension(written, span, RawExtensionKind::Type(ext));
                }
            }
            Item::EnumExtension(ext) => {
                if let Some((written, span)) = self.written_name(&ext) {
                    self.push_extension(written, span, RawExtensionKind::Enum(ext));
                }
            }
            Item::AliasExtension(ext) => {
                if let Some((written, span)) = self.written_name(&ext) {
                    self.push_extension(written, span, RawExtensionKind::Alias(ext));
                }
            }
            Item::Service(decl) => {
                if let Some((name, span)) = self.declared_name(&decl) {
                    self.declarations.services.push(RawService {
                        name,
                        scope: self.scope(),
                        span,
                        decl,
                    });
                }
            }
        }
    }

    /// Fields written `name : Alias as Target` declare `Alias`.
    fn collect_inline_aliases(&mut self, decl: &TypeDecl) {
        let Some(body) = decl.body() else {
            return;
        };
        for field in body.fields() {
            let (Some(TypeExpr::Ref(alias)), Some(target)) = (field.type_expr(), field.inline_alias()) else {
                continue;
            };
            let Some(path) = alias.path() else {
                continue;
            };
            if field.ident().is_none() {
                continue;
            }
            let name = self.qualify_declared(&path.text());
            self.push_type(name, span_of(path.range()), RawKind::InlineAlias(target));
        }
    }

    fn declared_name(&self, node: &impl HasName) -> Option<(String, Span)> {
        self.written_name(node)
            .map(|(text, span)| (self.qualify_declared(&text), span))
    }

    fn written_name(&self, node: &impl HasName) -> Option<(String, Span)> {
        let name = node.name()?;
        let text = name.text();
        if text.is_empty() {
            return None;
        }
        Some((text, span_of(name.range())))
    }

    /// Dotted declared names are already qualified.
    fn qualify_declared(&self, name: &str) -> String {
        if name.contains('.') {
            name.to_string()
        } else {
            qualify(&self.namespace, name)
        }
    }

    fn scope(&self) -> Scope {
        Scope {
            namespace: self.namespace.clone(),
            source: self.source,
        }
    }

    fn push_type(&mut self, name: String, span: Span, kind: RawKind) {
        let scope = self.scope();
        self.declarations.types.push(RawDeclaration { name, scope, span, kind });
    }

    fn push_extension(&mut self, written: String, span: Span, kind: RawExtensionKind) {
        let scope = self.scope();
        let name = self.qualify_declared(&written);
        self.declarations.extensions.push(RawExtension {
            name,
            written,
            scope,
            span,
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_source(src: &str) -> Declarations {
        let parse = taxi_parser::parse(src);
        assert!(parse.ok(), "{:?}", parse.errors());
        collect(0, &parse.tree())
    }

    fn type_names(decls: &Declarations) -> Vec<&str> {
        decls.types.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn block_namespace_is_scoped() {
        let decls = collect_source("namespace com.acme {\n  type A\n}\ntype B");
        assert_eq!(type_names(&decls), vec!["com.acme.A", "B"]);
        assert_eq!(decls.types[1].scope.namespace, "");
    }

    #[test]
    fn statement_namespace_applies_to_rest_of_file() {
        let decls = collect_source("type A\nnamespace org.x\ntype B\nenum C { X }\ntype com.Full");
        assert_eq!(type_names(&decls), vec!["A", "org.x.B", "org.x.C", "com.Full"]);
    }

    #[test]
    fn buckets_extensions_services_and_inline_aliases() {
        let decls = collect_source(
            "namespace n\ntype Person { code : CountryCode as String }\ntype extension Person {}\nservice S { operation a() }",
        );
        assert_eq!(type_names(&decls), vec!["n.CountryCode", "n.Person"]);
        assert!(matches!(decls.types[0].kind, RawKind::InlineAlias(_)));
        assert_eq!(decls.extensions[0].name, "n.Person");
        assert_eq!(decls.extensions[0].written, "Person");
        assert_eq!(decls.services[0].name, "n.S");
    }
}
