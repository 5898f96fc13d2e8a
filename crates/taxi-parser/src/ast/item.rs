//! Typed AST nodes for the source file, namespaces and declarations.

use rowan::TextRange;

use crate::ast::types::{Accessor, ConstraintList, Literal, Path, TypeExpr};
use crate::ast::{
    ast_node, child_node, child_nodes, child_token, dotted_text, AstNode, HasDocsAndAnnotations,
    HasIdent, HasName,
};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

// ── Source file and namespaces ─────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    /// Top-level items in source order.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.syntax.children().filter_map(Item::cast)
    }
}

ast_node!(NamespaceDecl, NAMESPACE_DECL);

impl NamespaceDecl {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    /// The braced body. `None` for the rest-of-file form.
    pub fn body(&self) -> Option<NamespaceBody> {
        child_node(&self.syntax)
    }
}

ast_node!(NamespaceBody, NAMESPACE_BODY);

impl NamespaceBody {
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.syntax.children().filter_map(Item::cast)
    }
}

/// Any item that can appear at the top level or inside a namespace block.
#[derive(Debug, Clone)]
pub enum Item {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
    Union(UnionDecl),
    Enum(EnumDecl),
    Alias(TypeAliasDecl),
    AnnotationType(AnnotationDecl),
    TypeExtension(TypeExtension),
    EnumExtension(EnumExtension),
    AliasExtension(TypeAliasExtension),
    Service(ServiceDecl),
}

impl Item {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let item = match node.kind() {
            SyntaxKind::NAMESPACE_DECL => Item::Namespace(NamespaceDecl { syntax: node }),
            SyntaxKind::TYPE_DECL => Item::Type(TypeDecl { syntax: node }),
            SyntaxKind::UNION_DECL => Item::Union(UnionDecl { syntax: node }),
            SyntaxKind::ENUM_DECL => Item::Enum(EnumDecl { syntax: node }),
            SyntaxKind::TYPE_ALIAS_DECL => Item::Alias(TypeAliasDecl { syntax: node }),
            SyntaxKind::ANNOTATION_DECL => Item::AnnotationType(AnnotationDecl { syntax: node }),
            SyntaxKind::TYPE_EXTENSION => Item::TypeExtension(TypeExtension { syntax: node }),
            SyntaxKind::ENUM_EXTENSION => Item::EnumExtension(EnumExtension { syntax: node }),
            SyntaxKind::TYPE_ALIAS_EXTENSION => {
                Item::AliasExtension(TypeAliasExtension { syntax: node })
            }
            SyntaxKind::SERVICE_DECL => Item::Service(ServiceDecl { syntax: node }),
            _ => return None,
        };
        Some(item)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Item::Namespace(it) => it.syntax(),
            Item::Type(it) => it.syntax(),
            Item::Union(it) => it.syntax(),
            Item::Enum(it) => it.syntax(),
            Item::Alias(it) => it.syntax(),
            Item::AnnotationType(it) => it.syntax(),
            Item::TypeExtension(it) => it.syntax(),
            Item::EnumExtension(it) => it.syntax(),
            Item::AliasExtension(it) => it.syntax(),
            Item::Service(it) => it.syntax(),
        }
    }
}

// ── Names ──────────────────────────────────────────────────────────────

ast_node!(Name, NAME);

impl Name {
    /// The declared name as written, e.g. `Person` or `com.acme.Person`.
    pub fn text(&self) -> String {
        dotted_text(&self.syntax)
    }

    pub fn range(&self) -> TextRange {
        self.syntax.text_range()
    }
}

// ── Object types ───────────────────────────────────────────────────────

ast_node!(TypeDecl, TYPE_DECL);

impl HasDocsAndAnnotations for TypeDecl {}
impl HasName for TypeDecl {}

impl TypeDecl {
    pub fn is_closed(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::CLOSED_KW).is_some()
    }

    pub fn is_parameter(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::PARAMETER_KW).is_some()
    }

    /// Declared type parameter names, e.g. `T` in `type Box<T>`.
    pub fn type_params(&self) -> Vec<String> {
        child_node::<TypeParamList>(&self.syntax)
            .map(|list| {
                list.syntax
                    .children()
                    .filter(|n| n.kind() == SyntaxKind::TYPE_PARAM)
                    .map(|n| dotted_text(&n))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn inherits(&self) -> Vec<TypeExpr> {
        child_node::<InheritsClause>(&self.syntax)
            .map(|clause| clause.types())
            .unwrap_or_default()
    }

    /// `None` for body-less declarations like `type Name inherits String`.
    pub fn body(&self) -> Option<TypeBody> {
        child_node(&self.syntax)
    }
}

ast_node!(TypeParamList, TYPE_PARAM_LIST);

ast_node!(InheritsClause, INHERITS_CLAUSE);

impl InheritsClause {
    pub fn types(&self) -> Vec<TypeExpr> {
        self.syntax.children().filter_map(TypeExpr::cast).collect()
    }
}

ast_node!(TypeBody, TYPE_BODY);

impl TypeBody {
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Field, FIELD);

impl HasDocsAndAnnotations for Field {}
impl HasIdent for Field {}

impl Field {
    pub fn is_closed(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::CLOSED_KW).is_some()
    }

    pub fn type_expr(&self) -> Option<TypeExpr> {
        self.syntax.children().find_map(TypeExpr::cast)
    }

    pub fn constraints(&self) -> Option<ConstraintList> {
        child_node(&self.syntax)
    }

    /// The aliased type of `code : CountryCode as String`.
    pub fn inline_alias(&self) -> Option<TypeExpr> {
        child_node::<InlineAlias>(&self.syntax)
            .and_then(|alias| alias.syntax.children().find_map(TypeExpr::cast))
    }

    pub fn accessor(&self) -> Option<Accessor> {
        child_node(&self.syntax)
    }

    pub fn default_value(&self) -> Option<Literal> {
        child_node::<DefaultValue>(&self.syntax).and_then(|d| d.value())
    }
}

ast_node!(InlineAlias, INLINE_ALIAS);

ast_node!(DefaultValue, DEFAULT_VALUE);

impl DefaultValue {
    pub fn value(&self) -> Option<Literal> {
        child_node(&self.syntax)
    }
}

// ── Unions, enums, aliases, annotation types ───────────────────────────

ast_node!(UnionDecl, UNION_DECL);

impl HasDocsAndAnnotations for UnionDecl {}
impl HasName for UnionDecl {}

impl UnionDecl {
    pub fn members(&self) -> Vec<TypeExpr> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::UNION_MEMBERS)
            .map(|members| members.children().filter_map(TypeExpr::cast).collect())
            .unwrap_or_default()
    }
}

ast_node!(EnumDecl, ENUM_DECL);

impl HasDocsAndAnnotations for EnumDecl {}
impl HasName for EnumDecl {}

impl EnumDecl {
    pub fn values(&self) -> impl Iterator<Item = EnumValue> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn inherits(&self) -> Vec<TypeExpr> {
        child_node::<InheritsClause>(&self.syntax)
            .map(|clause| clause.types())
            .unwrap_or_default()
    }
}

ast_node!(EnumValue, ENUM_VALUE);

impl HasDocsAndAnnotations for EnumValue {}
impl HasIdent for EnumValue {}

impl EnumValue {
    /// The literal of `NAME('value')`; `None` when the value is the name.
    pub fn value(&self) -> Option<Literal> {
        child_node(&self.syntax)
    }

    /// Enum value references after `synonym of`, e.g. `Country.NZ`.
    pub fn synonyms(&self) -> Vec<Path> {
        child_node::<EnumSynonyms>(&self.syntax)
            .map(|synonyms| child_nodes(&synonyms.syntax).collect())
            .unwrap_or_default()
    }
}

ast_node!(EnumSynonyms, ENUM_SYNONYMS);

ast_node!(TypeAliasDecl, TYPE_ALIAS_DECL);

impl HasDocsAndAnnotations for TypeAliasDecl {}
impl HasName for TypeAliasDecl {}

impl TypeAliasDecl {
    pub fn aliased_type(&self) -> Option<TypeExpr> {
        self.syntax.children().find_map(TypeExpr::cast)
    }
}

ast_node!(AnnotationDecl, ANNOTATION_DECL);

impl HasDocsAndAnnotations for AnnotationDecl {}
impl HasName for AnnotationDecl {}

impl AnnotationDecl {
    pub fn body(&self) -> Option<TypeBody> {
        child_node(&self.syntax)
    }
}

// ── Extensions ─────────────────────────────────────────────────────────

ast_node!(TypeExtension, TYPE_EXTENSION);

impl HasDocsAndAnnotations for TypeExtension {}
impl HasName for TypeExtension {}

impl TypeExtension {
    pub fn fields(&self) -> impl Iterator<Item = FieldExtension> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(FieldExtension, FIELD_EXTENSION);

impl HasDocsAndAnnotations for FieldExtension {}
impl HasIdent for FieldExtension {}

impl FieldExtension {
    /// The narrowed type of `field : Refined`.
    pub fn refined_type(&self) -> Option<TypeExpr> {
        self.syntax.children().find_map(TypeExpr::cast)
    }

    pub fn default_value(&self) -> Option<Literal> {
        child_node::<DefaultValue>(&self.syntax).and_then(|d| d.value())
    }
}

ast_node!(EnumExtension, ENUM_EXTENSION);

impl HasDocsAndAnnotations for EnumExtension {}
impl HasName for EnumExtension {}

impl EnumExtension {
    pub fn values(&self) -> impl Iterator<Item = EnumValue> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(TypeAliasExtension, TYPE_ALIAS_EXTENSION);

impl HasDocsAndAnnotations for TypeAliasExtension {}
impl HasName for TypeAliasExtension {}

// ── Services ───────────────────────────────────────────────────────────

ast_node!(ServiceDecl, SERVICE_DECL);

impl HasDocsAndAnnotations for ServiceDecl {}
impl HasName for ServiceDecl {}

impl ServiceDecl {
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Operation, OPERATION);

impl HasDocsAndAnnotations for Operation {}
impl HasIdent for Operation {}

impl Operation {
    pub fn params(&self) -> Vec<Param> {
        child_node::<ParamList>(&self.syntax)
            .map(|list| child_nodes(&list.syntax).collect())
            .unwrap_or_default()
    }

    pub fn return_type(&self) -> Option<ReturnType> {
        child_node(&self.syntax)
    }
}

ast_node!(ParamList, PARAM_LIST);

ast_node!(Param, PARAM);

impl HasDocsAndAnnotations for Param {}
impl HasIdent for Param {}

impl Param {
    pub fn type_expr(&self) -> Option<TypeExpr> {
        self.syntax.children().find_map(TypeExpr::cast)
    }

    pub fn constraints(&self) -> Option<ConstraintList> {
        child_node(&self.syntax)
    }
}

ast_node!(ReturnType, RETURN_TYPE);

impl ReturnType {
    pub fn type_expr(&self) -> Option<TypeExpr> {
        self.syntax.children().find_map(TypeExpr::cast)
    }

    pub fn constraints(&self) -> Option<ConstraintList> {
        child_node(&self.syntax)
    }
}
