use rstest::rstest;
use sqwrl::{Atom, ErrorCode, Literal, Term, parse_query, parse_rule};

#[rstest]
#[case(r#"Person(?p) ^ hasAge(?p, ?a) ^ swrlb:greaterThan(?a, "17"^^xsd:long) -> Adult(?p)"#)]
#[case(r#"hasName(?p, "Ann \"A\"") ^ sameAs(?p, ?q) ^ differentFrom(?q, bob) -> knows(?p, bob)"#)]
#[case(r#"temporal:before("2020-01-01"^^xsd:date, ?d, "Days") ^ swrlb:equal(?x, 2.5) -> A(?x)"#)]
fn rules_render_back_to_equal_rules(#[case] text: &str) {
    let rule = parse_rule(text).unwrap();
    assert_eq!(parse_rule(&rule.to_string()).unwrap(), rule);
}

#[rstest]
fn queries_keep_their_clauses() {
    let text = "hasAlias(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ^ sqwrl:groupBy(?s, ?p) ˚ sqwrl:size(?n, ?s) \
                -> sqwrl:select(?p, ?n) ^ sqwrl:orderByDescending(?n)";
    let query = parse_query(text).unwrap();
    let rendered = query.to_string();
    assert_eq!(rendered.matches('˚').count(), 2);
    assert_eq!(parse_query(&rendered).unwrap(), query);
}

#[rstest]
#[case("42", Literal::Int(42))]
#[case("99999999999", Literal::Integer(99_999_999_999))]
#[case("true", Literal::Boolean(true))]
#[case(r#""x""#, Literal::string("x"))]
#[case(r#""7"^^xsd:unsignedByte"#, Literal::UnsignedByte(7))]
fn bare_and_typed_literals(#[case] token: &str, #[case] expected: Literal) {
    let rule = parse_rule(&format!("p(?x, {token}) -> A(?x)")).unwrap();
    let Atom::Property { object: Term::Literal(lit), .. } = &rule.body[0] else {
        panic!("expected a property atom with a literal object");
    };
    assert_eq!(lit, &expected);
}

#[rstest]
#[case("A(?x) ->")]
#[case("A(?x) ˚ B(?x) -> C(?x)")]
#[case("A(?x, ?y, ?z) -> B(?x)")]
fn malformed_rules(#[case] text: &str) {
    assert_eq!(parse_rule(text).unwrap_err().code, ErrorCode::Syntax);
}
