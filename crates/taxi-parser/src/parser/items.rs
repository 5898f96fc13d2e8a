//! Declaration parsing: namespaces, types, enums, aliases, annotations,
//! unions, extensions and services.

use super::types::{parse_annotations, parse_constraint_list, parse_literal, parse_path, parse_type_expr};
use super::{MarkOpened, Parser};
use crate::syntax_kind::SyntaxKind;

/// Tokens that may start a declaration.
const DECLARATION_START: &[SyntaxKind] = &[
    SyntaxKind::DOC_COMMENT,
    SyntaxKind::AT,
    SyntaxKind::CLOSED_KW,
    SyntaxKind::PARAMETER_KW,
    SyntaxKind::TYPE_KW,
    SyntaxKind::ENUM_KW,
    SyntaxKind::ANNOTATION_KW,
    SyntaxKind::SERVICE_KW,
];

pub(crate) fn parse_item(p: &mut Parser) {
    if p.at(SyntaxKind::NAMESPACE_KW) {
        parse_namespace(p);
    } else if p.at_any(DECLARATION_START) {
        parse_declaration(p);
    } else {
        p.advance_with_error("expected a declaration (`type`, `enum`, `annotation`, `service` or `namespace`)");
    }
}

/// `namespace a.b { items }` or `namespace a.b`. The second form leaves the
/// following items as siblings; the collator applies it to the rest of the file.
fn parse_namespace(p: &mut Parser) {
    let m = p.open();
    p.advance(); // NAMESPACE_KW

    if p.at(SyntaxKind::IDENT) {
        parse_path(p);
    } else {
        p.error("expected namespace name");
    }

    if !p.has_error() && p.at(SyntaxKind::L_BRACE) {
        let body = p.open();
        let brace_span = p.current_span();
        p.advance(); // {
        while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            parse_item(p);
        }
        if !p.eat(SyntaxKind::R_BRACE) {
            p.error_with_related(
                "expected `}` to close namespace",
                brace_span,
                "namespace opened here",
            );
        }
        p.close(body, SyntaxKind::NAMESPACE_BODY);
    }

    p.close(m, SyntaxKind::NAMESPACE_DECL);
}

/// Doc comment, annotations and modifiers, then the keyword-specific part.
fn parse_declaration(p: &mut Parser) {
    let m = p.open();
    p.eat(SyntaxKind::DOC_COMMENT);
    parse_annotations(p);
    while p.at_any(&[SyntaxKind::CLOSED_KW, SyntaxKind::PARAMETER_KW]) {
        p.advance();
    }
    if p.has_error() {
        p.close(m, SyntaxKind::ERROR_NODE);
        return;
    }

    match (p.current(), p.nth(1), p.nth(2)) {
        (SyntaxKind::TYPE_KW, SyntaxKind::ALIAS_KW, SyntaxKind::EXTENSION_KW) => {
            parse_alias_extension(p, m)
        }
        (SyntaxKind::TYPE_KW, SyntaxKind::ALIAS_KW, _) => parse_alias(p, m),
        (SyntaxKind::TYPE_KW, SyntaxKind::EXTENSION_KW, _) => parse_type_extension(p, m),
        (SyntaxKind::TYPE_KW, _, _) => parse_type(p, m),
        (SyntaxKind::ENUM_KW, SyntaxKind::EXTENSION_KW, _) => parse_enum_extension(p, m),
        (SyntaxKind::ENUM_KW, _, _) => parse_enum(p, m),
        (SyntaxKind::ANNOTATION_KW, _, _) => parse_annotation_type(p, m),
        (SyntaxKind::SERVICE_KW, _, _) => parse_service(p, m),
        _ => {
            p.error("expected `type`, `enum`, `annotation` or `service`");
            p.close(m, SyntaxKind::ERROR_NODE);
        }
    }
}

/// A declared name: `Person` or `com.acme.Person`.
fn parse_name(p: &mut Parser, what: &str) {
    let m = p.open();
    if p.expect(SyntaxKind::IDENT, what) {
        while p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
            p.advance();
            p.advance();
        }
    }
    p.close(m, SyntaxKind::NAME);
}

// ── Types and unions ───────────────────────────────────────────────────

/// `type Name<T> inherits A { fields }`, `type Name inherits String`, or a
/// union `type Name = A | B`.
fn parse_type(p: &mut Parser, m: MarkOpened) {
    p.advance(); // TYPE_KW
    parse_name(p, "type name");

    if !p.has_error() && p.at(SyntaxKind::LT) {
        parse_type_param_list(p);
    }
    if !p.has_error() && p.at(SyntaxKind::INHERITS_KW) {
        parse_inherits(p);
    }

    if !p.has_error() && p.at(SyntaxKind::EQ) {
        p.advance(); // =
        let members = p.open();
        parse_type_expr(p);
        while !p.has_error() && p.eat(SyntaxKind::BAR) {
            parse_type_expr(p);
        }
        p.close(members, SyntaxKind::UNION_MEMBERS);
        p.close(m, SyntaxKind::UNION_DECL);
        return;
    }

    if !p.has_error() && p.at(SyntaxKind::L_BRACE) {
        parse_type_body(p);
    }
    p.close(m, SyntaxKind::TYPE_DECL);
}

fn parse_type_param_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // <
    loop {
        let param = p.open();
        p.expect(SyntaxKind::IDENT, "type parameter name");
        p.close(param, SyntaxKind::TYPE_PARAM);
        if p.has_error() || !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::GT, "`>` to close type parameters");
    p.close(m, SyntaxKind::TYPE_PARAM_LIST);
}

fn parse_inherits(p: &mut Parser) {
    let m = p.open();
    p.advance(); // INHERITS_KW
    parse_type_expr(p);
    while !p.has_error() && p.eat(SyntaxKind::COMMA) {
        parse_type_expr(p);
    }
    p.close(m, SyntaxKind::INHERITS_CLAUSE);
}

/// `{ field* }`. Commas between fields are optional.
fn parse_type_body(p: &mut Parser) {
    let m = p.open();
    let brace_span = p.current_span();
    p.advance(); // {

    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        parse_field(p);
        p.eat(SyntaxKind::COMMA);
    }

    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related("expected `}` to close type body", brace_span, "body opened here");
    }
    p.close(m, SyntaxKind::TYPE_BODY);
}

/// `[[doc]] @Ann closed name : Type(constraints) as Alias by accessor = default`
fn parse_field(p: &mut Parser) {
    let m = p.open();
    p.eat(SyntaxKind::DOC_COMMENT);
    parse_annotations(p);
    p.eat(SyntaxKind::CLOSED_KW);

    if !p.expect(SyntaxKind::IDENT, "field name") || !p.expect(SyntaxKind::COLON, "`:` after field name") {
        p.close(m, SyntaxKind::FIELD);
        return;
    }

    parse_type_expr(p);
    if !p.has_error() && p.at(SyntaxKind::L_PAREN) {
        parse_constraint_list(p);
    }
    if !p.has_error() && p.at(SyntaxKind::AS_KW) {
        let alias = p.open();
        p.advance(); // as
        parse_type_expr(p);
        p.close(alias, SyntaxKind::INLINE_ALIAS);
    }
    if !p.has_error() && p.at(SyntaxKind::BY_KW) {
        parse_accessor(p);
    }
    if !p.has_error() && p.at(SyntaxKind::EQ) {
        parse_default_value(p);
    }
    p.close(m, SyntaxKind::FIELD);
}

/// `by xpath("/a")`, `by column(2)` or `by { name by xpath("/n") }`.
fn parse_accessor(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::BY_KW, "`by`");

    if p.at(SyntaxKind::L_BRACE) {
        let destructured = p.open();
        let brace_span = p.current_span();
        p.advance(); // {
        while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            let field = p.open();
            if p.expect(SyntaxKind::IDENT, "field name") {
                parse_accessor(p);
            }
            p.close(field, SyntaxKind::ACCESSOR_FIELD);
            p.eat(SyntaxKind::COMMA);
        }
        if !p.eat(SyntaxKind::R_BRACE) {
            p.error_with_related(
                "expected `}` to close destructured accessor",
                brace_span,
                "accessor opened here",
            );
        }
        p.close(destructured, SyntaxKind::DESTRUCTURED_ACCESSOR);
    } else if p.expect(SyntaxKind::IDENT, "accessor (`xpath`, `jsonPath` or `column`)")
        && p.expect(SyntaxKind::L_PAREN, "`(`")
    {
        parse_literal(p);
        p.expect(SyntaxKind::R_PAREN, "`)`");
    }

    p.close(m, SyntaxKind::ACCESSOR);
}

fn parse_default_value(p: &mut Parser) {
    let m = p.open();
    p.advance(); // =
    parse_literal(p);
    p.close(m, SyntaxKind::DEFAULT_VALUE);
}

// ── Enums ──────────────────────────────────────────────────────────────

fn parse_enum(p: &mut Parser, m: MarkOpened) {
    p.advance(); // ENUM_KW
    parse_name(p, "enum name");
    if !p.has_error() && p.at(SyntaxKind::INHERITS_KW) {
        parse_inherits(p);
    }
    if !p.has_error() {
        parse_enum_body(p, true);
    }
    p.close(m, SyntaxKind::ENUM_DECL);
}

/// `{ A, @Ann B }`. Shared by enum declarations and enum extensions; only
/// declarations may give values (`A(1)`) and synonyms.
fn parse_enum_body(p: &mut Parser, declaration: bool) {
    let brace_span = p.current_span();
    if !p.expect(SyntaxKind::L_BRACE, "`{`") {
        return;
    }
    while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        let value = p.open();
        p.eat(SyntaxKind::DOC_COMMENT);
        parse_annotations(p);
        if p.expect(SyntaxKind::IDENT, "enum value") && declaration {
            if p.eat(SyntaxKind::L_PAREN) {
                parse_literal(p);
                p.expect(SyntaxKind::R_PAREN, "`)` after the enum value");
            }
            if !p.has_error() && p.at_contextual("synonym") {
                parse_enum_synonyms(p);
            }
        }
        p.close(value, SyntaxKind::ENUM_VALUE);
        p.eat(SyntaxKind::COMMA);
    }
    if !p.eat(SyntaxKind::R_BRACE) {
        p.error_with_related("expected `}` to close enum", brace_span, "enum opened here");
    }
}

/// `synonym of Other.VALUE` or `synonym of [A.X, B.Y]`
fn parse_enum_synonyms(p: &mut Parser) {
    let m = p.open();
    p.advance(); // synonym
    if !p.at_contextual("of") {
        p.error("expected `of` after `synonym`");
        p.close(m, SyntaxKind::ENUM_SYNONYMS);
        return;
    }
    p.advance(); // of
    if p.at(SyntaxKind::L_BRACKET) {
        let bracket_span = p.current_span();
        p.advance(); // [
        while !p.at(SyntaxKind::R_BRACKET) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            parse_path(p);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        if !p.has_error() && !p.eat(SyntaxKind::R_BRACKET) {
            p.error_with_related("expected `]` to close synonyms", bracket_span, "synonyms opened here");
        }
    } else {
        parse_path(p);
    }
    p.close(m, SyntaxKind::ENUM_SYNONYMS);
}

// ── Aliases and annotation types ───────────────────────────────────────

/// `type alias Name as Type`
fn parse_alias(p: &mut Parser, m: MarkOpened) {
    p.advance(); // TYPE_KW
    p.advance(); // ALIAS_KW
    parse_name(p, "alias name");
    if !p.has_error() && p.expect(SyntaxKind::AS_KW, "`as` followed by the aliased type") {
        parse_type_expr(p);
    }
    p.close(m, SyntaxKind::TYPE_ALIAS_DECL);
}

/// `annotation Name { fields }`. The body is optional.
fn parse_annotation_type(p: &mut Parser, m: MarkOpened) {
    p.advance(); // ANNOTATION_KW
    parse_name(p, "annotation name");
    if !p.has_error() && p.at(SyntaxKind::L_BRACE) {
        parse_type_body(p);
    }
    p.close(m, SyntaxKind::ANNOTATION_DECL);
}

// ── Extensions ─────────────────────────────────────────────────────────

/// `type extension Name { @Ann field, other : Refined = 'x' }`
fn parse_type_extension(p: &mut Parser, m: MarkOpened) {
    p.advance(); // TYPE_KW
    p.advance(); // EXTENSION_KW
    parse_name(p, "type name");

    let brace_span = p.current_span();
    if !p.has_error() && p.expect(SyntaxKind::L_BRACE, "`{`") {
        while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            let field = p.open();
            p.eat(SyntaxKind::DOC_COMMENT);
            parse_annotations(p);
            p.expect(SyntaxKind::IDENT, "field name");
            if !p.has_error() && p.eat(SyntaxKind::COLON) {
                parse_type_expr(p);
                if !p.has_error() && p.at(SyntaxKind::EQ) {
                    parse_default_value(p);
                }
            }
            p.close(field, SyntaxKind::FIELD_EXTENSION);
            p.eat(SyntaxKind::COMMA);
        }
        if !p.eat(SyntaxKind::R_BRACE) {
            p.error_with_related("expected `}` to close extension", brace_span, "extension opened here");
        }
    }
    p.close(m, SyntaxKind::TYPE_EXTENSION);
}

fn parse_enum_extension(p: &mut Parser, m: MarkOpened) {
    p.advance(); // ENUM_KW
    p.advance(); // EXTENSION_KW
    parse_name(p, "enum name");
    if !p.has_error() {
        parse_enum_body(p, false);
    }
    p.close(m, SyntaxKind::ENUM_EXTENSION);
}

/// `type alias extension Name`, optionally followed by an empty `{ }`.
fn parse_alias_extension(p: &mut Parser, m: MarkOpened) {
    p.advance(); // TYPE_KW
    p.advance(); // ALIAS_KW
    p.advance(); // EXTENSION_KW
    parse_name(p, "alias name");
    if !p.has_error() && p.eat(SyntaxKind::L_BRACE) {
        p.expect(SyntaxKind::R_BRACE, "`}`: alias extensions may only add annotations and docs");
    }
    p.close(m, SyntaxKind::TYPE_ALIAS_EXTENSION);
}

// ── Services ───────────────────────────────────────────────────────────

fn parse_service(p: &mut Parser, m: MarkOpened) {
    p.advance(); // SERVICE_KW
    parse_name(p, "service name");

    let brace_span = p.current_span();
    if !p.has_error() && p.expect(SyntaxKind::L_BRACE, "`{`") {
        while !p.at(SyntaxKind::R_BRACE) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            parse_operation(p);
        }
        if !p.eat(SyntaxKind::R_BRACE) {
            p.error_with_related("expected `}` to close service", brace_span, "service opened here");
        }
    }
    p.close(m, SyntaxKind::SERVICE_DECL);
}

/// `[[doc]] @Ann operation name(params) : ReturnType(constraints)`
fn parse_operation(p: &mut Parser) {
    let m = p.open();
    p.eat(SyntaxKind::DOC_COMMENT);
    parse_annotations(p);

    if p.expect(SyntaxKind::OPERATION_KW, "`operation`") && p.expect(SyntaxKind::IDENT, "operation name") {
        parse_param_list(p);
        if !p.has_error() && p.at(SyntaxKind::COLON) {
            let ret = p.open();
            p.advance(); // :
            parse_type_expr(p);
            if !p.has_error() && p.at(SyntaxKind::L_PAREN) {
                parse_constraint_list(p);
            }
            p.close(ret, SyntaxKind::RETURN_TYPE);
        }
    }
    p.close(m, SyntaxKind::OPERATION);
}

fn parse_param_list(p: &mut Parser) {
    let m = p.open();
    if p.expect(SyntaxKind::L_PAREN, "`(` to start parameters") {
        while !p.at(SyntaxKind::R_PAREN) && !p.at(SyntaxKind::EOF) && !p.has_error() {
            parse_param(p);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        p.expect(SyntaxKind::R_PAREN, "`)` to close parameters");
    }
    p.close(m, SyntaxKind::PARAM_LIST);
}

/// `@Ann name : Type(constraints)`; the name is optional.
fn parse_param(p: &mut Parser) {
    let m = p.open();
    parse_annotations(p);
    if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::COLON {
        p.advance(); // name
        p.advance(); // :
    }
    parse_type_expr(p);
    if !p.has_error() && p.at(SyntaxKind::L_PAREN) {
        parse_constraint_list(p);
    }
    p.close(m, SyntaxKind::PARAM);
}
