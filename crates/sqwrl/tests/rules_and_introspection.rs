use rstest::rstest;
use sqwrl::consts::MINTED_PREFIX;
use sqwrl::{
    Axiom, ErrorCode, EvaluationOptionsBuilder, Literal, MemoryOntology, Ontology, QueryEngine, RuleEngine, parse_rule,
};

fn class(class: &str, individual: &str) -> Axiom {
    Axiom::ClassAssertion { class: class.into(), individual: individual.into() }
}

fn object(property: &str, subject: &str, object: &str) -> Axiom {
    Axiom::ObjectPropertyAssertion { property: property.into(), subject: subject.into(), object: object.into() }
}

fn family() -> MemoryOntology {
    [
        class("Person", "a"),
        class("Person", "b"),
        object("hasParent", "a", "b"),
        object("hasParent", "b", "c"),
        object("hasParent", "c", "d"),
        Axiom::SubClassOf { sub: "Student".into(), sup: "Person".into() },
        Axiom::SameIndividual("a".into(), "alpha".into()),
        Axiom::TransitiveObjectProperty("hasAncestor".into()),
    ]
    .into_iter()
    .collect()
}

fn names(onto: &MemoryOntology, query: &str) -> Vec<String> {
    let result = QueryEngine::new(onto).run_text(query).unwrap();
    result.rows().iter().map(|r| r[0].to_string()).collect()
}

#[rstest]
#[case("abox:caa(Person, ?i) -> sqwrl:select(?i)", &["a", "b"])]
#[case("abox:opaa(a, ?p, ?o) -> sqwrl:select(?o)", &["b"])]
#[case("abox:sia(alpha, ?x) -> sqwrl:select(?x)", &["a"])]
#[case("tbox:sca(?sub, Person) -> sqwrl:select(?sub)", &["Student"])]
#[case("tbox:cd(?c) -> sqwrl:select(?c) ^ sqwrl:orderBy(?c)", &["Person", "Student"])]
#[case("rbox:topa(?p) -> sqwrl:select(?p)", &["hasAncestor"])]
fn introspection_enumerates_axioms(#[case] query: &str, #[case] expected: &[&str]) {
    assert_eq!(names(&family(), query), expected);
}

#[rstest]
fn same_as_is_symmetric_and_reflexive() {
    let onto = family();
    let query = "Person(?p) ^ sameAs(?p, ?q) -> sqwrl:select(?q) ^ sqwrl:orderBy(?q)";
    assert_eq!(names(&onto, query), ["a", "alpha", "b"]);
}

#[rstest]
fn rules_run_to_a_fixpoint() {
    let mut onto = family();
    let rules = [
        parse_rule("hasParent(?x, ?y) -> hasAncestor(?x, ?y)").unwrap(),
        parse_rule("hasAncestor(?x, ?y) ^ hasParent(?y, ?z) -> hasAncestor(?x, ?z)").unwrap(),
    ];
    let report = RuleEngine::new().infer(&mut onto, &rules).unwrap();
    assert!(report.reached_fixpoint);
    assert_eq!(report.inferred.len(), 6);
    assert!(onto.contains(&object("hasAncestor", "a", "d")));
}

#[rstest]
fn iteration_bound_stops_inference() {
    let mut onto = family();
    let rules = [
        parse_rule("hasParent(?x, ?y) -> hasAncestor(?x, ?y)").unwrap(),
        parse_rule("hasAncestor(?x, ?y) ^ hasParent(?y, ?z) -> hasAncestor(?x, ?z)").unwrap(),
    ];
    let engine = RuleEngine::with_options(EvaluationOptionsBuilder::new().with_max_rule_iterations(1).build());
    let report = engine.infer(&mut onto, &rules).unwrap();
    assert!(!report.reached_fixpoint);
    assert_eq!(report.iterations, 1);
}

#[rstest]
fn built_ins_filter_rule_matches() {
    let mut onto: MemoryOntology = [
        Axiom::DataPropertyAssertion { property: "hasAge".into(), subject: "a".into(), value: Literal::Int(30) },
        Axiom::DataPropertyAssertion { property: "hasAge".into(), subject: "b".into(), value: Literal::Int(12) },
    ]
    .into_iter()
    .collect();
    let rule = parse_rule("hasAge(?p, ?age) ^ swrlb:greaterThan(?age, 17) -> Adult(?p)").unwrap();
    let report = RuleEngine::new().infer(&mut onto, &[rule]).unwrap();
    assert_eq!(report.inferred, [class("Adult", "a")]);
}

#[rstest]
fn minted_individuals_are_stable_across_rounds() {
    let mut onto = family();
    let rule = parse_rule("Person(?p) ^ swrlx:makeOWLThing(?x, ?p) -> Passport(?x) ^ holder(?x, ?p)").unwrap();
    let report = RuleEngine::new().infer(&mut onto, &[rule]).unwrap();
    assert!(report.reached_fixpoint);
    let passports = onto
        .axioms()
        .filter(|a| matches!(a, Axiom::ClassAssertion { class, individual } if class == "Passport" && individual.starts_with(MINTED_PREFIX)))
        .count();
    assert_eq!(passports, 2);
}

#[rstest]
fn failing_built_ins_abandon_only_their_match() {
    let mut onto: MemoryOntology = [
        Axiom::DataPropertyAssertion { property: "code".into(), subject: "a".into(), value: Literal::Int(4) },
        Axiom::DataPropertyAssertion { property: "code".into(), subject: "b".into(), value: Literal::string("x") },
    ]
    .into_iter()
    .collect();
    let rule = parse_rule("code(?p, ?c) ^ swrlb:add(?n, ?c, 1) -> next(?p, ?n)").unwrap();
    let report = RuleEngine::new().infer(&mut onto, &[rule]).unwrap();
    assert_eq!(report.inferred.len(), 1);
    assert!(!report.abandoned.is_empty());
    assert!(report.abandoned.iter().all(|e| e.code == ErrorCode::TypeError));
}
