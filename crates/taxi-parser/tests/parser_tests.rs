use taxi_parser::ast::item::{Item, SourceFile};
use taxi_parser::ast::types::{LiteralKind, TypeExpr};
use taxi_parser::ast::{HasDocsAndAnnotations, HasIdent, HasName};
use taxi_parser::parse;

// ── Helpers ────────────────────────────────────────────────────────────

/// Parse source that is expected to be valid and return its typed root.
fn parse_ok(src: &str) -> SourceFile {
    let parse = parse(src);
    assert!(parse.ok(), "unexpected errors: {:?}", parse.errors());
    parse.tree()
}

fn only_item(src: &str) -> Item {
    let items: Vec<_> = parse_ok(src).items().collect();
    assert_eq!(items.len(), 1, "expected one item, got {items:?}");
    items.into_iter().next().unwrap()
}

fn type_ref_text(expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::Ref(r) => r.path().unwrap().text(),
        TypeExpr::Lambda(_) => "<lambda>".to_string(),
    }
}

// ── Object types ───────────────────────────────────────────────────────

#[test]
fn test_type_with_fields() {
    let Item::Type(decl) = only_item(
        "[[ A person ]]\n@Entity\nclosed type Person inherits Party {\n  @Id id : PersonId\n  name : String?\n  tags : Tag[]\n}",
    ) else {
        panic!("expected a type declaration");
    };

    assert_eq!(decl.name().unwrap().text(), "Person");
    assert_eq!(decl.doc().as_deref(), Some("A person"));
    assert_eq!(decl.annotations()[0].path().unwrap().text(), "Entity");
    assert!(decl.is_closed());
    assert!(!decl.is_parameter());
    assert_eq!(type_ref_text(&decl.inherits()[0]), "Party");

    let fields: Vec<_> = decl.body().unwrap().fields().collect();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].ident().unwrap().text(), "id");
    assert_eq!(fields[0].annotations().len(), 1);
    assert!(fields[1].type_expr().unwrap().is_nullable());
    let TypeExpr::Ref(tags) = fields[2].type_expr().unwrap() else {
        panic!("expected a named type");
    };
    assert_eq!(tags.array_depth(), 1);
}

#[test]
fn test_bodyless_type_and_generic_params() {
    let items: Vec<_> = parse_ok("type Name inherits String\ntype Box<T> { value : T }").items().collect();
    let Item::Type(name) = &items[0] else { panic!() };
    assert!(name.body().is_none());
    let Item::Type(boxed) = &items[1] else { panic!() };
    assert_eq!(boxed.type_params(), vec!["T".to_string()]);
}

#[test]
fn test_field_extras() {
    let Item::Type(decl) = only_item(
        "type Trade {\n  code : CountryCode as String\n  price : Decimal by jsonPath('$.price')\n  nested : Inner by { a by xpath('/a') }\n  status : Status = 'OPEN'\n  fn : (String, Int) -> Boolean\n  values : Map<String, Array<Int>>\n}",
    ) else {
        panic!("expected a type declaration");
    };
    let fields: Vec<_> = decl.body().unwrap().fields().collect();

    assert_eq!(type_ref_text(&fields[0].inline_alias().unwrap()), "String");

    let accessor = fields[1].accessor().unwrap();
    assert_eq!(accessor.function().unwrap().text(), "jsonPath");
    assert_eq!(accessor.argument().unwrap().text(), "$.price");

    let destructured = fields[2].accessor().unwrap().destructured().unwrap();
    let inner: Vec<_> = destructured.fields().collect();
    assert_eq!(inner[0].ident().unwrap().text(), "a");

    let default = fields[3].default_value().unwrap();
    assert_eq!(default.kind(), Some(LiteralKind::String));
    assert_eq!(default.text(), "OPEN");

    let TypeExpr::Lambda(lambda) = fields[4].type_expr().unwrap() else {
        panic!("expected a lambda type");
    };
    assert_eq!(lambda.params().len(), 2);
    assert_eq!(type_ref_text(&lambda.return_type().unwrap()), "Boolean");

    let TypeExpr::Ref(map) = fields[5].type_expr().unwrap() else { panic!() };
    let args = map.type_args();
    assert_eq!(args.len(), 2);
    let TypeExpr::Ref(array) = &args[1] else { panic!() };
    assert_eq!(array.type_args().len(), 1);
}

// ── Other declarations ─────────────────────────────────────────────────

#[test]
fn test_enum_alias_union_annotation() {
    let items: Vec<_> = parse_ok(
        "enum Color { RED, @Deprecated GREEN }\ntype alias Names as Name[]\ntype Pet = Dog | Cat\nannotation Audit { reason : String? }",
    )
    .items()
    .collect();
    assert_eq!(items.len(), 4);

    let Item::Enum(color) = &items[0] else { panic!() };
    let values: Vec<_> = color.values().collect();
    assert_eq!(values.len(), 2);
    assert_eq!(values[1].annotations().len(), 1);

    let Item::Alias(alias) = &items[1] else { panic!() };
    assert_eq!(type_ref_text(&alias.aliased_type().unwrap()), "Name");

    let Item::Union(pet) = &items[2] else { panic!() };
    assert_eq!(pet.members().len(), 2);

    let Item::AnnotationType(audit) = &items[3] else { panic!() };
    assert_eq!(audit.body().unwrap().fields().count(), 1);
}

#[test]
fn test_enum_values_synonyms_and_inheritance() {
    let Item::Enum(decl) = only_item(
        "enum Bar inherits Base {\n  ONE(1),\n  TWO('two') synonym of Foo.TWO,\n  THREE synonym of [Foo.THREE, Baz.TRES]\n}",
    ) else {
        panic!("expected an enum declaration");
    };

    assert_eq!(decl.inherits().len(), 1);
    assert_eq!(type_ref_text(&decl.inherits()[0]), "Base");

    let values: Vec<_> = decl.values().collect();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0].ident().unwrap().text(), "ONE");
    assert_eq!(values[0].value().unwrap().kind(), Some(LiteralKind::Int));
    assert_eq!(values[1].value().unwrap().text(), "two");
    let synonyms = |i: usize| -> Vec<String> { values[i].synonyms().iter().map(|p| p.text()).collect() };
    assert_eq!(synonyms(1), vec!["Foo.TWO"]);
    assert_eq!(values[2].ident().unwrap().text(), "THREE");
    assert!(values[2].value().is_none());
    assert_eq!(synonyms(2), vec!["Foo.THREE", "Baz.TRES"]);
}

#[test]
fn test_enum_synonym_needs_of() {
    let parse = parse("enum Bar { A synonym Foo.A }");
    assert!(!parse.ok());
    insta::assert_snapshot!(parse.errors()[0].message, @"expected `of` after `synonym`");
}

#[test]
fn test_extensions() {
    let items: Vec<_> = parse_ok(
        "type extension Person { @Deprecated name, age : Age = 3 }\nenum extension Color { @Primary RED }\n@Note type alias extension Names",
    )
    .items()
    .collect();

    let Item::TypeExtension(ext) = &items[0] else { panic!() };
    let fields: Vec<_> = ext.fields().collect();
    assert_eq!(fields[0].ident().unwrap().text(), "name");
    assert!(fields[0].refined_type().is_none());
    assert_eq!(type_ref_text(&fields[1].refined_type().unwrap()), "Age");
    assert_eq!(fields[1].default_value().unwrap().kind(), Some(LiteralKind::Int));

    assert!(matches!(items[1], Item::EnumExtension(_)));
    let Item::AliasExtension(alias_ext) = &items[2] else { panic!() };
    assert_eq!(alias_ext.annotations().len(), 1);
}

#[test]
fn test_service_with_constraints() {
    let Item::Service(service) = only_item(
        "service Converter {\n  @Http(method = 'POST', retries = 2)\n  operation convert(@Body source : Money(currency = 'GBP'), target : Currency) : Money(from source, currency = target)\n  operation ping()\n}",
    ) else {
        panic!("expected a service");
    };
    let ops: Vec<_> = service.operations().collect();
    assert_eq!(ops.len(), 2);

    let convert = &ops[0];
    assert_eq!(convert.ident().unwrap().text(), "convert");
    let args = convert.annotations()[0].args();
    assert_eq!(args[0].ident().unwrap().text(), "method");
    assert_eq!(args[1].value().unwrap().kind(), Some(LiteralKind::Int));

    let params = convert.params();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].ident().unwrap().text(), "source");
    let constraint = params[0].constraints().unwrap().constraints().next().unwrap();
    assert_eq!(constraint.lead().unwrap().text(), "currency");
    assert_eq!(constraint.literal().unwrap().text(), "GBP");

    let ret = convert.return_type().unwrap();
    let constraints: Vec<_> = ret.constraints().unwrap().constraints().collect();
    assert_eq!(constraints[0].lead().unwrap().text(), "from");
    assert!(!constraints[0].has_eq());
    assert_eq!(constraints[0].path().unwrap().text(), "source");
    assert_eq!(constraints[1].path().unwrap().segments(), vec!["target".to_string()]);

    assert!(ops[1].return_type().is_none());
}

// ── Namespaces ─────────────────────────────────────────────────────────

#[test]
fn test_namespace_forms() {
    let items: Vec<_> = parse_ok("namespace com.acme {\n  type A\n}\nnamespace org.other\ntype B").items().collect();
    assert_eq!(items.len(), 3);

    let Item::Namespace(block) = &items[0] else { panic!() };
    assert_eq!(block.path().unwrap().text(), "com.acme");
    assert_eq!(block.body().unwrap().items().count(), 1);

    let Item::Namespace(statement) = &items[1] else { panic!() };
    assert!(statement.body().is_none());
    assert!(matches!(items[2], Item::Type(_)));
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn test_unclosed_body_reports_related_span() {
    let parse = parse("type A {\n  name : String\n");
    assert_eq!(parse.errors().len(), 1);
    let err = &parse.errors()[0];
    assert_eq!(err.message, "expected `}` to close type body");
    let (related, span) = err.related.clone().unwrap();
    assert_eq!(related, "body opened here");
    assert_eq!((span.start, span.end), (7, 8));
}

#[test]
fn test_missing_field_type() {
    let parse = parse("type A { name : }");
    insta::assert_snapshot!(parse.errors()[0].message, @"expected a type");
}

#[test]
fn test_lex_errors_are_reported_first() {
    let parse = parse("type A # {}\ntype");
    assert_eq!(parse.errors()[0].message, "unexpected character: '#'");
}

#[test]
fn test_comments_are_ignored() {
    let items: Vec<_> = parse_ok("// leading\ntype A { /* inline */ a : String }").items().collect();
    assert_eq!(items.len(), 1);
}
