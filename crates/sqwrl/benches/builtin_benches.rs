use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sqwrl::{Axiom, Literal, MemoryOntology, QueryEngine, parse_query};
use std::hint::black_box;

fn ages(n: usize) -> MemoryOntology {
    (0..n)
        .map(|i| Axiom::DataPropertyAssertion {
            property: "hasAge".into(),
            subject: format!("p{i}").into(),
            value: Literal::Int((i % 90) as i32),
        })
        .collect()
}

fn sample_queries() -> Vec<&'static str> {
    vec![
        "hasAge(?p, ?a) ^ swrlb:add(?b, ?a, 1, \"2\"^^xsd:long) -> sqwrl:select(?p, ?b)",
        "hasAge(?p, ?a) ^ swrlb:greaterThan(?a, 40) -> sqwrl:select(?p)",
        "hasAge(?p, ?a) ^ swrlb:stringConcat(?s, ?p, \"-\", ?a) -> sqwrl:select(?s)",
    ]
}

fn benchmark_parser(c: &mut Criterion) {
    let queries = sample_queries();
    c.bench_function("parser/parse_query", |b| {
        b.iter(|| {
            for q in &queries {
                black_box(parse_query(black_box(q)).expect("parse failure"));
            }
        })
    });
}

fn benchmark_dispatch(c: &mut Criterion) {
    let onto = ages(500);
    let engine = QueryEngine::new(&onto);
    let mut group = c.benchmark_group("dispatch");
    for (i, q) in sample_queries().into_iter().enumerate() {
        let query = parse_query(q).expect("parse failure");
        group.bench_with_input(BenchmarkId::from_parameter(i), &query, |b, query| {
            b.iter(|| black_box(engine.run(query).expect("query failure")))
        });
    }
    group.finish();
}

fn benchmark_collections(c: &mut Criterion) {
    let mut group = c.benchmark_group("collections");
    for n in [100usize, 1_000] {
        let onto = ages(n);
        let engine = QueryEngine::new(&onto);
        let query = parse_query(
            "hasAge(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ˚ sqwrl:avg(?avg, ?s) ^ sqwrl:median(?m, ?s) -> sqwrl:select(?avg, ?m)",
        )
        .expect("parse failure");
        group.bench_with_input(BenchmarkId::new("aggregate", n), &query, |b, query| {
            b.iter(|| black_box(engine.run(query).expect("query failure")))
        });
        let grouped = parse_query(
            "hasAge(?p, ?a) ˚ sqwrl:makeSet(?s, ?p) ^ sqwrl:groupBy(?s, ?a) ˚ sqwrl:size(?n, ?s) -> sqwrl:select(?a, ?n)",
        )
        .expect("parse failure");
        group.bench_with_input(BenchmarkId::new("group_by", n), &grouped, |b, query| {
            b.iter(|| black_box(engine.run(query).expect("query failure")))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_parser, benchmark_dispatch, benchmark_collections);
criterion_main!(benches);
