use rstest::rstest;
use sqwrl::{Axiom, ErrorCode, Literal, MemoryOntology, QueryEngine, QueryResult, Value};

fn data(property: &str, subject: &str, value: Literal) -> Axiom {
    Axiom::DataPropertyAssertion { property: property.into(), subject: subject.into(), value }
}

fn aliases() -> MemoryOntology {
    [
        data("hasAlias", "p1", Literal::string("Bob")),
        data("hasAlias", "p2", Literal::string("Fred")),
        data("hasAlias", "p2", Literal::string("Freddy")),
    ]
    .into_iter()
    .collect()
}

fn ages() -> MemoryOntology {
    [("p1", 20), ("p2", 10), ("p3", 30)]
        .into_iter()
        .map(|(p, age)| data("hasAge", p, Literal::Byte(age)))
        .collect()
}

fn tags() -> MemoryOntology {
    [("a", "A"), ("b", "A"), ("c", "B")]
        .into_iter()
        .map(|(s, tag)| data("hasTag", s, Literal::string(tag)))
        .collect()
}

fn run(onto: &MemoryOntology, query: &str) -> QueryResult {
    QueryEngine::new(onto).run_text(query).unwrap_or_else(|e| panic!("{query}: {e}"))
}

fn column(result: &QueryResult, index: usize) -> Vec<String> {
    result
        .rows()
        .iter()
        .map(|row| match &row[index] {
            Value::Literal(l) => l.lexical(),
            other => other.to_string(),
        })
        .collect()
}

#[rstest]
#[case("makeSet", "2")]
#[case("makeBag", "3")]
fn sets_drop_duplicates_and_bags_keep_them(#[case] make: &str, #[case] size: &str) {
    let query = format!("hasTag(?x, ?t) ˚ sqwrl:{make}(?s, ?t) ˚ sqwrl:size(?n, ?s) -> sqwrl:select(?n)");
    let result = run(&tags(), &query);
    assert_eq!(column(&result, 0), [size]);
}

#[rstest]
#[case("makeSet", "2")]
#[case("makeBag", "3")]
fn repeated_make_atoms_in_one_match(#[case] make: &str, #[case] size: &str) {
    let query = format!(
        r#"hasTag(?x, ?t) ^ swrlb:equal(?t, "B") ˚ sqwrl:{make}(?s, "A") ^ sqwrl:{make}(?s, "A") ^ sqwrl:{make}(?s, "B") ˚ sqwrl:size(?n, ?s) -> sqwrl:select(?n)"#
    );
    let result = run(&tags(), &query);
    assert_eq!(column(&result, 0), [size]);
}

#[rstest]
fn bag_equality_ignores_order() {
    let onto: MemoryOntology = [
        data("p", "x", Literal::Int(1)),
        data("p", "y", Literal::Int(2)),
        data("q", "x", Literal::Int(2)),
        data("q", "y", Literal::Int(1)),
    ]
    .into_iter()
    .collect();
    let equal = run(
        &onto,
        "p(?i, ?v) ^ q(?i, ?w) ˚ sqwrl:makeBag(?b1, ?v) ^ sqwrl:makeBag(?b2, ?w) ˚ sqwrl:equal(?b1, ?b2) -> sqwrl:select(?b1)",
    );
    assert_eq!(equal.row_count(), 1);
}

#[rstest]
fn group_by_yields_one_row_per_key() {
    let result = run(
        &aliases(),
        "hasAlias(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ^ sqwrl:groupBy(?s, ?p) ˚ sqwrl:size(?n, ?s) -> sqwrl:select(?p, ?n)",
    );
    assert_eq!(column(&result, 0), ["p1", "p2"]);
    assert_eq!(column(&result, 1), ["1", "2"]);
}

#[rstest]
fn group_by_over_no_matches_yields_no_rows() {
    let result = run(
        &MemoryOntology::new(),
        "hasAlias(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ^ sqwrl:groupBy(?s, ?p) ˚ sqwrl:size(?n, ?s) -> sqwrl:select(?p, ?n)",
    );
    assert!(result.is_empty());
}

#[rstest]
#[case("sqwrl:first(?r, ?s)", "z")]
#[case("sqwrl:last(?r, ?s)", "a")]
#[case("sqwrl:nth(?r, ?s, 2)", "m")]
fn individual_collections_keep_insertion_order(#[case] operator: &str, #[case] expected: &str) {
    let onto: MemoryOntology = [("z", 1), ("m", 2), ("a", 3)]
        .into_iter()
        .map(|(p, age)| data("hasAge", p, Literal::Int(age)))
        .collect();
    let query = format!("hasAge(?p, ?v) ˚ sqwrl:makeBag(?s, ?p) ˚ {operator} -> sqwrl:select(?r)");
    let result = run(&onto, &query);
    assert_eq!(column(&result, 0), [expected]);
}

#[rstest]
fn element_enumerates_a_collection() {
    let result = run(
        &aliases(),
        "hasAlias(?p, ?a) ˚ sqwrl:makeSet(?s, ?a) ˚ sqwrl:element(?e, ?s) -> sqwrl:select(?e) ^ sqwrl:orderBy(?e)",
    );
    assert_eq!(column(&result, 0), ["Bob", "Fred", "Freddy"]);
}

#[rstest]
#[case("sqwrl:min(?r, ?s)", 10.0)]
#[case("sqwrl:max(?r, ?s)", 30.0)]
#[case("sqwrl:sum(?r, ?s)", 60.0)]
#[case("sqwrl:avg(?r, ?s)", 20.0)]
#[case("sqwrl:median(?r, ?s)", 20.0)]
#[case("sqwrl:first(?r, ?s)", 10.0)]
#[case("sqwrl:nthLast(?r, ?s, 1)", 30.0)]
fn aggregates_over_a_bag(#[case] operator: &str, #[case] expected: f64) {
    let query = format!("hasAge(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ˚ {operator} -> sqwrl:select(?r)");
    let result = run(&ages(), &query);
    assert_eq!(result.row_count(), 1);
    let value = result.rows()[0][0].as_literal().and_then(Literal::as_f64);
    assert_eq!(value, Some(expected));
}

#[rstest]
fn out_of_range_position_has_no_solution() {
    let query = "hasAge(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ˚ sqwrl:nth(?r, ?s, 4) -> sqwrl:select(?r)";
    assert_eq!(run(&ages(), query).row_count(), 0);
}

#[rstest]
fn min_over_strings_is_a_collection_type_error() {
    let err = QueryEngine::new(&aliases())
        .run_text("hasAlias(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ˚ sqwrl:min(?m, ?s) -> sqwrl:select(?m)")
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CollectionType);
}

#[rstest]
#[case("hasAlias(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ^ sqwrl:groupBy(?s) -> sqwrl:select(?p)", "groupBy must have at least two arguments")]
#[case(
    "hasAlias(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ^ sqwrl:groupBy(?s, ?q) -> sqwrl:select(?p)",
    "unbound group argument passed to groupBy for collection s"
)]
#[case(
    "hasAlias(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ^ sqwrl:groupBy(?t, ?p) -> sqwrl:select(?p)",
    "groupBy applied to undefined collection t"
)]
fn group_by_contract_violations(#[case] query: &str, #[case] message: &str) {
    let err = QueryEngine::new(&aliases()).run_text(query).unwrap_err();
    assert_eq!(err.code, ErrorCode::GroupBy);
    assert_eq!(err.message, message);
}

#[rstest]
fn collection_operators_outside_construction_are_rejected() {
    let err = QueryEngine::new(&aliases())
        .run_text("hasAlias(?p, ?a) ^ sqwrl:makeBag(?s, ?a) -> sqwrl:select(?p)")
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Syntax);
}

#[rstest]
#[case("orderBy", ["p2", "p1", "p3"], ["10", "20", "30"])]
#[case("orderByDescending", ["p3", "p1", "p2"], ["30", "20", "10"])]
fn ordering_is_by_the_named_column(#[case] op: &str, #[case] people: [&str; 3], #[case] values: [&str; 3]) {
    let result = run(&ages(), &format!("hasAge(?p, ?age) -> sqwrl:select(?p, ?age) ^ sqwrl:{op}(?age)"));
    assert_eq!(column(&result, 0), people);
    assert_eq!(column(&result, 1), values);
}

#[rstest]
fn limit_applies_after_ordering() {
    let result = run(&ages(), "hasAge(?p, ?age) -> sqwrl:select(?p) ^ sqwrl:orderBy(?age) ^ sqwrl:limit(2)");
    assert_eq!(column(&result, 0), ["p2", "p1"]);
}

#[rstest]
fn select_distinct_drops_repeated_rows() {
    let result = run(&tags(), "hasTag(?x, ?t) -> sqwrl:selectDistinct(?t)");
    assert_eq!(column(&result, 0), ["A", "B"]);
}

#[rstest]
fn head_aggregates_group_by_selected_columns() {
    let result = run(&aliases(), "hasAlias(?p, ?a) -> sqwrl:select(?p) ^ sqwrl:count(?a) ^ sqwrl:columnNames(\"person\", \"aliases\")");
    assert_eq!(result.column_names(), ["person", "aliases"]);
    assert_eq!(column(&result, 1), ["1", "2"]);
}

#[rstest]
fn named_accessors_check_the_value_kind() {
    let mut result = run(&ages(), "hasAge(?p, ?age) -> sqwrl:select(?p, ?age) ^ sqwrl:orderBy(?age)");
    assert!(result.next());
    assert_eq!(result.get_named_individual("p").unwrap().name, "p2");
    assert_eq!(result.get_literal("age").unwrap(), &Literal::Byte(10));
    assert_eq!(result.get_class("p").unwrap_err().code, ErrorCode::TypeError);
}
