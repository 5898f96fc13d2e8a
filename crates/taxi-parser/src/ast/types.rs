//! Typed AST nodes for type expressions, annotations, literals, accessors
//! and constraints.

use rowan::TextRange;

use crate::ast::{ast_node, child_node, child_nodes, child_token, dotted_text, AstNode, HasIdent};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

// ── Paths ──────────────────────────────────────────────────────────────

ast_node!(Path, PATH);

impl Path {
    /// The path as written: `com.acme.Person`, `source.currency`.
    pub fn text(&self) -> String {
        dotted_text(&self.syntax)
    }

    pub fn segments(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .collect()
    }

    pub fn range(&self) -> TextRange {
        self.syntax.text_range()
    }
}

// ── Type expressions ───────────────────────────────────────────────────

/// Either a named type reference or a lambda type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Ref(TypeRef),
    Lambda(LambdaType),
}

impl TypeExpr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::TYPE_REF => Some(TypeExpr::Ref(TypeRef { syntax: node })),
            SyntaxKind::LAMBDA_TYPE => Some(TypeExpr::Lambda(LambdaType { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            TypeExpr::Ref(it) => it.syntax(),
            TypeExpr::Lambda(it) => it.syntax(),
        }
    }

    pub fn range(&self) -> TextRange {
        self.syntax().text_range()
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            TypeExpr::Ref(it) => it.is_nullable(),
            TypeExpr::Lambda(_) => false,
        }
    }
}

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    /// Explicit `<A, B>` arguments, empty when absent.
    pub fn type_args(&self) -> Vec<TypeExpr> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::TYPE_ARG_LIST)
            .map(|list| list.children().filter_map(TypeExpr::cast).collect())
            .unwrap_or_default()
    }

    /// Number of `[]` suffixes: `Foo[][]` is 2.
    pub fn array_depth(&self) -> usize {
        self.syntax
            .children_with_tokens()
            .filter(|it| it.kind() == SyntaxKind::L_BRACKET)
            .count()
    }

    pub fn is_nullable(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::QUESTION).is_some()
    }
}

ast_node!(LambdaType, LAMBDA_TYPE);

impl LambdaType {
    fn arrow(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::ARROW)
    }

    pub fn params(&self) -> Vec<TypeExpr> {
        let arrow_start = self.arrow().map(|a| a.text_range().start());
        self.syntax
            .children()
            .filter_map(TypeExpr::cast)
            .filter(|t| arrow_start.map_or(true, |start| t.range().start() < start))
            .collect()
    }

    pub fn return_type(&self) -> Option<TypeExpr> {
        let arrow_start = self.arrow()?.text_range().start();
        self.syntax
            .children()
            .filter_map(TypeExpr::cast)
            .find(|t| t.range().start() > arrow_start)
    }
}

// ── Annotations ────────────────────────────────────────────────────────

ast_node!(Annotation, ANNOTATION);

impl Annotation {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    pub fn args(&self) -> Vec<AnnotationArg> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::ANNOTATION_ARG_LIST)
            .map(|list| child_nodes(&list).collect())
            .unwrap_or_default()
    }

    pub fn range(&self) -> TextRange {
        self.syntax.text_range()
    }
}

ast_node!(AnnotationArg, ANNOTATION_ARG);

impl HasIdent for AnnotationArg {}

impl AnnotationArg {
    pub fn value(&self) -> Option<Literal> {
        child_node(&self.syntax)
    }
}

// ── Literals ───────────────────────────────────────────────────────────

ast_node!(Literal, LITERAL);

/// The lexical class of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Int,
    Decimal,
    Bool,
}

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind().is_literal())
    }

    pub fn kind(&self) -> Option<LiteralKind> {
        let kind = match self.token()?.kind() {
            SyntaxKind::STRING_LITERAL => LiteralKind::String,
            SyntaxKind::INT_LITERAL => LiteralKind::Int,
            SyntaxKind::DECIMAL_LITERAL => LiteralKind::Decimal,
            SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => LiteralKind::Bool,
            _ => return None,
        };
        Some(kind)
    }

    /// Token text, with string quotes removed and escapes resolved.
    pub fn text(&self) -> String {
        match (self.kind(), self.token()) {
            (Some(LiteralKind::String), Some(token)) => taxi_lexer::unquote(token.text()),
            (_, Some(token)) => token.text().to_string(),
            (_, None) => String::new(),
        }
    }

    pub fn range(&self) -> TextRange {
        self.syntax.text_range()
    }
}

// ── Accessors ──────────────────────────────────────────────────────────

ast_node!(Accessor, ACCESSOR);

impl Accessor {
    /// `xpath`, `jsonPath` or `column`; `None` for destructured accessors.
    pub fn function(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn argument(&self) -> Option<Literal> {
        child_node(&self.syntax)
    }

    pub fn destructured(&self) -> Option<DestructuredAccessor> {
        child_node(&self.syntax)
    }

    pub fn range(&self) -> TextRange {
        self.syntax.text_range()
    }
}

ast_node!(DestructuredAccessor, DESTRUCTURED_ACCESSOR);

impl DestructuredAccessor {
    pub fn fields(&self) -> impl Iterator<Item = AccessorField> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(AccessorField, ACCESSOR_FIELD);

impl HasIdent for AccessorField {}

impl AccessorField {
    pub fn accessor(&self) -> Option<Accessor> {
        child_node(&self.syntax)
    }
}

// ── Constraints ────────────────────────────────────────────────────────

ast_node!(ConstraintList, CONSTRAINT_LIST);

impl ConstraintList {
    pub fn constraints(&self) -> impl Iterator<Item = Constraint> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(Constraint, CONSTRAINT);

impl Constraint {
    /// The leading identifier: the constrained field, or the `from` keyword
    /// of a derivation.
    pub fn lead(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn has_eq(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::EQ).is_some()
    }

    pub fn literal(&self) -> Option<Literal> {
        child_node(&self.syntax)
    }

    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    pub fn range(&self) -> TextRange {
        self.syntax.text_range()
    }
}
