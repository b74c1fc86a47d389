use rstest::rstest;
use sqwrl::{Axiom, Datatype, ErrorCode, Literal, MemoryOntology, QueryEngine};

fn people() -> MemoryOntology {
    ["p1", "p2"]
        .into_iter()
        .map(|p| Axiom::ClassAssertion { class: "Person".into(), individual: p.into() })
        .collect()
}

fn single(onto: &MemoryOntology, query: &str) -> Literal {
    let mut result = QueryEngine::new(onto).run_text(query).unwrap();
    assert_eq!(result.row_count(), 1, "{query}");
    assert!(result.next());
    result.get_literal(0).unwrap().clone()
}

#[rstest]
#[case(r#"swrlb:add(?r, "2"^^xsd:byte, "3"^^xsd:short) -> sqwrl:select(?r)"#, Datatype::Short)]
#[case(r#"swrlb:add(?r, "2"^^xsd:int, "3"^^xsd:long) -> sqwrl:select(?r)"#, Datatype::Long)]
#[case(r#"swrlb:multiply(?r, "2"^^xsd:unsignedByte, "3"^^xsd:int) -> sqwrl:select(?r)"#, Datatype::Int)]
#[case(r#"swrlb:add(?r, "2.5"^^xsd:decimal, 1) -> sqwrl:select(?r)"#, Datatype::Decimal)]
#[case(r#"swrlb:add(?r, "2"^^xsd:float, "1"^^xsd:decimal) -> sqwrl:select(?r)"#, Datatype::Float)]
#[case(r#"swrlb:add(?r, "2"^^xsd:float, "1"^^xsd:double) -> sqwrl:select(?r)"#, Datatype::Double)]
fn arithmetic_results_take_the_widened_type(#[case] query: &str, #[case] expected: Datatype) {
    assert_eq!(single(&MemoryOntology::new(), query).datatype(), expected);
}

#[rstest]
fn unbound_output_is_computed() {
    let r = single(&MemoryOntology::new(), "swrlb:add(?r, 2, 2) -> sqwrl:select(?r)");
    assert_eq!(r, Literal::Int(4));
}

#[rstest]
#[case("Person(?p) ^ swrlb:add(4, 2, 2) -> sqwrl:select(?p)", 2)]
#[case("Person(?p) ^ swrlb:add(5, 2, 2) -> sqwrl:select(?p)", 0)]
#[case("Person(?p) ^ swrlb:lessThan(3, 2) -> sqwrl:select(?p)", 0)]
#[case("Person(?p) ^ swrlb:add(?x, 2, 2) ^ swrlb:multiply(?x, 2, 2) -> sqwrl:select(?p)", 2)]
fn bound_outputs_act_as_filters(#[case] query: &str, #[case] rows: usize) {
    let onto = people();
    let result = QueryEngine::new(&onto).run_text(query).unwrap();
    assert_eq!(result.row_count(), rows);
}

#[rstest]
#[case(r#"swrlb:add("100"^^xsd:byte, 100, 100) -> sqwrl:select(1)"#)]
#[case("swrlb:add(5, 2.5, 2.0) -> sqwrl:select(1)")]
fn unrepresentable_results_fail_the_match(#[case] query: &str) {
    let result = QueryEngine::new(&MemoryOntology::new()).run_text(query).unwrap();
    assert_eq!(result.row_count(), 0, "{query}");
}

#[rstest]
fn cascaded_output_filters_matches() {
    let onto: MemoryOntology = [("p1", 20), ("p2", 21)]
        .into_iter()
        .map(|(p, age)| Axiom::DataPropertyAssertion {
            property: "hasAge".into(),
            subject: p.into(),
            value: Literal::Int(age),
        })
        .collect();
    let mut result = QueryEngine::new(&onto)
        .run_text("hasAge(?p, ?a) ^ swrlb:divide(10, ?a, 2.0) -> sqwrl:select(?p)")
        .unwrap();
    assert_eq!(result.row_count(), 1);
    assert!(result.next());
    assert_eq!(result.get_named_individual("p").unwrap().name, "p1");
}

#[rstest]
#[case(r#"swrlb:add(?r, "127"^^xsd:byte, "1"^^xsd:byte) -> sqwrl:select(?r)"#, ErrorCode::Overflow)]
#[case("swrlb:divide(?r, 1, 0) -> sqwrl:select(?r)", ErrorCode::DivisionByZero)]
#[case(r#"swrlb:add(?r, "a", 1) -> sqwrl:select(?r)"#, ErrorCode::TypeError)]
#[case("swrlb:add(?r, ?a, 1) -> sqwrl:select(?r)", ErrorCode::UnresolvedArguments)]
#[case("swrlb:subtract(?r, 1) -> sqwrl:select(?r)", ErrorCode::WrongArity)]
#[case("swrlb:frobnicate(?r) -> sqwrl:select(?r)", ErrorCode::UnknownBuiltIn)]
fn contract_violations_are_errors(#[case] query: &str, #[case] code: ErrorCode) {
    let err = QueryEngine::new(&MemoryOntology::new()).run_text(query).unwrap_err();
    assert_eq!(err.code, code, "{query}: {err}");
}

#[rstest]
fn tokenize_yields_one_row_per_token() {
    let onto = MemoryOntology::new();
    let mut result = QueryEngine::new(&onto)
        .run_text(r#"swrlb:tokenize(?t, "a,b,,c", ",") -> sqwrl:select(?t)"#)
        .unwrap();
    let mut tokens = Vec::new();
    while result.next() {
        tokens.push(result.get_literal("t").unwrap().lexical());
    }
    assert_eq!(tokens, ["a", "b", "c"]);
}

#[rstest]
#[case(r#"swrlb:stringConcat(?r, "ab", 1, "c") -> sqwrl:select(?r)"#, "ab1c")]
#[case(r#"swrlb:substring(?r, "hello", 2, 3) -> sqwrl:select(?r)"#, "ell")]
#[case(r#"swrlb:normalizeSpace(?r, "  a   b ") -> sqwrl:select(?r)"#, "a b")]
#[case(r##"swrlb:replace(?r, "a1b22", "[0-9]+", "#") -> sqwrl:select(?r)"##, "a#b#")]
#[case(r#"swrlb:upperCase(?r, "sqwrl") -> sqwrl:select(?r)"#, "SQWRL")]
fn string_built_ins(#[case] query: &str, #[case] expected: &str) {
    assert_eq!(single(&MemoryOntology::new(), query), Literal::string(expected));
}

#[rstest]
fn eval_reads_trailing_variables_by_name() {
    let r = single(
        &MemoryOntology::new(),
        r#"swrlb:add(?x, 1, 2) ^ swrlb:add(?y, 2, 2) ^ swrlm:eval(?r, "x * y + 1", ?x, ?y) -> sqwrl:select(?r)"#,
    );
    assert_eq!(r, Literal::Double(13.0));
}

#[rstest]
#[case(r#"swrlb:addYearMonthDurationToDate(?r, "2020-01-31"^^xsd:date, "P1M"^^xsd:duration) -> sqwrl:select(?r)"#, "2020-02-29")]
#[case(r#"swrlb:subtractDates(?r, "2020-03-01"^^xsd:date, "2020-02-01"^^xsd:date) -> sqwrl:select(?r)"#, "P29D")]
#[case(r#"temporal:add(?r, "2020-01-01"^^xsd:date, 2, "Days") -> sqwrl:select(?r)"#, "2020-01-03")]
fn temporal_arithmetic(#[case] query: &str, #[case] expected: &str) {
    assert_eq!(single(&MemoryOntology::new(), query).lexical(), expected);
}

#[rstest]
fn allen_relations_filter() {
    let onto = people();
    let before = r#"Person(?p) ^ temporal:before("2020-01-01"^^xsd:date, "2020-06-01"^^xsd:date) -> sqwrl:select(?p)"#;
    let after = r#"Person(?p) ^ temporal:after("2020-01-01"^^xsd:date, "2020-06-01"^^xsd:date) -> sqwrl:select(?p)"#;
    assert_eq!(QueryEngine::new(&onto).run_text(before).unwrap().row_count(), 2);
    assert_eq!(QueryEngine::new(&onto).run_text(after).unwrap().row_count(), 0);
}
