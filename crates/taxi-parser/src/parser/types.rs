//! Type expressions, annotations, literals and constraints.

use super::Parser;
use crate::syntax_kind::SyntaxKind;

/// A dotted path: `com.acme.Person` or `source.currency`.
pub(crate) fn parse_path(p: &mut Parser) {
    let m = p.open();
    if p.expect(SyntaxKind::IDENT, "a name") {
        while p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
            p.advance();
            p.advance();
        }
    }
    p.close(m, SyntaxKind::PATH);
}

/// A type reference `Name<Args>[]?` or a lambda type `(A, B) -> C`.
pub(crate) fn parse_type_expr(p: &mut Parser) {
    match p.current() {
        SyntaxKind::L_PAREN => parse_lambda_type(p),
        SyntaxKind::IDENT => parse_type_ref(p),
        _ => p.error("expected a type"),
    }
}

fn parse_type_ref(p: &mut Parser) {
    let m = p.open();
    parse_path(p);

    if !p.has_error() && p.at(SyntaxKind::LT) {
        let args = p.open();
        p.advance(); // <
        parse_type_expr(p);
        while !p.has_error() && p.eat(SyntaxKind::COMMA) {
            parse_type_expr(p);
        }
        p.expect(SyntaxKind::GT, "`>` to close type arguments");
        p.close(args, SyntaxKind::TYPE_ARG_LIST);
    }

    // `Foo[]` sugar, possibly repeated.
    while !p.has_error() && p.at(SyntaxKind::L_BRACKET) && p.nth(1) == SyntaxKind::R_BRACKET {
        p.advance();
        p.advance();
    }
    p.eat(SyntaxKind::QUESTION);

    p.close(m, SyntaxKind::TYPE_REF);
}

fn parse_lambda_type(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    while !p.at(SyntaxKind::R_PAREN) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        parse_type_expr(p);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    if p.expect(SyntaxKind::R_PAREN, "`)` to close lambda parameters")
        && p.expect(SyntaxKind::ARROW, "`->` followed by the lambda return type")
    {
        parse_type_expr(p);
    }
    p.close(m, SyntaxKind::LAMBDA_TYPE);
}

// ── Annotations and literals ───────────────────────────────────────────

/// Zero or more `@Name(args)` annotations.
pub(crate) fn parse_annotations(p: &mut Parser) {
    while p.at(SyntaxKind::AT) && !p.has_error() {
        let m = p.open();
        p.advance(); // @
        parse_path(p);
        if !p.has_error() && p.at(SyntaxKind::L_PAREN) {
            let args = p.open();
            p.advance(); // (
            while !p.at(SyntaxKind::R_PAREN) && !p.at(SyntaxKind::EOF) && !p.has_error() {
                let arg = p.open();
                // `@Ann('x')` is shorthand for `@Ann(value = 'x')`.
                if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::EQ {
                    p.advance();
                    p.advance();
                }
                parse_literal(p);
                p.close(arg, SyntaxKind::ANNOTATION_ARG);
                if !p.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            p.expect(SyntaxKind::R_PAREN, "`)` to close annotation arguments");
            p.close(args, SyntaxKind::ANNOTATION_ARG_LIST);
        }
        p.close(m, SyntaxKind::ANNOTATION);
    }
}

pub(crate) fn parse_literal(p: &mut Parser) {
    if p.current().is_literal() {
        let m = p.open();
        p.advance();
        p.close(m, SyntaxKind::LITERAL);
    } else {
        p.error("expected a literal (string, number, `true` or `false`)");
    }
}

// ── Constraints ────────────────────────────────────────────────────────

/// `(field = 'x', field = param.path, from param)`
pub(crate) fn parse_constraint_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    while !p.at(SyntaxKind::R_PAREN) && !p.at(SyntaxKind::EOF) && !p.has_error() {
        parse_constraint(p);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN, "`)` to close constraints");
    p.close(m, SyntaxKind::CONSTRAINT_LIST);
}

fn parse_constraint(p: &mut Parser) {
    let m = p.open();
    if p.at_contextual("from") && p.nth(1) == SyntaxKind::IDENT {
        p.advance(); // from
        parse_path(p);
    } else if p.expect(SyntaxKind::IDENT, "constrained field name")
        && p.expect(SyntaxKind::EQ, "`=` in constraint")
    {
        if p.current().is_literal() {
            parse_literal(p);
        } else if p.at(SyntaxKind::IDENT) {
            parse_path(p);
        } else {
            p.error("expected a literal or a parameter path");
        }
    }
    p.close(m, SyntaxKind::CONSTRAINT);
}
