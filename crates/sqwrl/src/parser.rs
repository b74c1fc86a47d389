use crate::engine::runtime::{Error, ErrorCode};
use crate::literal::{Datatype, Literal};
use crate::model::{BuiltInName, Library, Variable};
use compact_str::CompactString;
use pest::Parser;
use pest::iterators::Pair;
use std::sync::Arc;

pub mod ast;

use ast::{Atom, Query, Rule as SwrlRule, Term};

#[derive(pest_derive::Parser)]
#[grammar = "parser/rule.pest"]
pub struct RuleParser;

fn syntax(message: impl Into<String>) -> Error {
    Error::from_code(ErrorCode::Syntax, message)
}

impl RuleParser {
    /// Parse into body clauses and head atoms.
    fn parse_statement(input: &str) -> Result<(Vec<Vec<Atom>>, Vec<Atom>), Error> {
        let mut pairs = Self::parse(Rule::statement, input).map_err(|e| {
            syntax(format!("malformed rule or query text\n{e}"))
                .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
        })?;
        let statement = pairs.next().ok_or_else(|| syntax("empty input"))?;
        let mut clauses = Vec::new();
        let mut head = Vec::new();
        for pair in statement.into_inner() {
            match pair.as_rule() {
                Rule::body => {
                    for clause in pair.into_inner() {
                        clauses.push(clause.into_inner().map(build_atom).collect::<Result<Vec<_>, _>>()?);
                    }
                }
                Rule::head => {
                    head = pair.into_inner().map(build_atom).collect::<Result<Vec<_>, _>>()?;
                }
                _ => {}
            }
        }
        Ok((clauses, head))
    }

    pub fn parse_rule(input: &str) -> Result<SwrlRule, Error> {
        let (mut clauses, head) = Self::parse_statement(input)?;
        if clauses.len() != 1 {
            return Err(syntax("a rule body cannot contain collection clauses"));
        }
        if head.is_empty() {
            return Err(syntax("a rule needs at least one head atom"));
        }
        Ok(SwrlRule { body: clauses.remove(0), head })
    }

    pub fn parse_query(input: &str) -> Result<Query, Error> {
        let (clauses, head) = Self::parse_statement(input)?;
        if clauses.len() > 3 {
            return Err(syntax(format!(
                "a query body has at most three clauses, found {}",
                clauses.len()
            )));
        }
        Ok(Query { clauses, head })
    }
}

pub fn parse_rule(input: &str) -> Result<SwrlRule, Error> {
    RuleParser::parse_rule(input)
}

pub fn parse_query(input: &str) -> Result<Query, Error> {
    RuleParser::parse_query(input)
}

fn build_atom(pair: Pair<'_, Rule>) -> Result<Atom, Error> {
    let mut inner = pair.into_inner();
    let predicate = inner.next().ok_or_else(|| syntax("atom without predicate"))?.as_str();
    let args = inner.map(build_term).collect::<Result<Vec<_>, _>>()?;

    if let Some((prefix, local)) = predicate.split_once(':') {
        let library = Library::from_prefix(prefix).ok_or_else(|| {
            syntax(format!("unknown built-in library prefix '{prefix}' in {predicate}"))
        })?;
        return Ok(Atom::BuiltIn { name: BuiltInName::new(library, local), args });
    }

    let mut args = args.into_iter();
    match (predicate, args.next(), args.next(), args.next()) {
        ("sameAs", Some(a), Some(b), None) => Ok(Atom::SameAs(a, b)),
        ("differentFrom", Some(a), Some(b), None) => Ok(Atom::DifferentFrom(a, b)),
        (class, Some(arg), None, None) => Ok(Atom::Class { class: class.into(), arg }),
        (property, Some(subject), Some(object), None) => Ok(Atom::Property {
            property: property.into(),
            subject,
            object,
        }),
        _ => Err(syntax(format!("atom {predicate} must have one or two arguments"))),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn string_content(pair: Pair<'_, Rule>) -> String {
    pair.into_inner().next().map(|p| unescape(p.as_str())).unwrap_or_default()
}

fn build_term(pair: Pair<'_, Rule>) -> Result<Term, Error> {
    Ok(match pair.as_rule() {
        Rule::variable => Term::Variable(Variable::new(pair.as_str())),
        Rule::string => Term::Literal(Literal::String(string_content(pair))),
        Rule::number => Term::Literal(Literal::infer(pair.as_str())?),
        Rule::boolean => Term::Literal(Literal::Boolean(pair.as_str() == "true")),
        Rule::name => Term::Name(CompactString::from(pair.as_str())),
        Rule::typed_literal => {
            let mut inner = pair.into_inner();
            let (Some(text), Some(datatype)) = (inner.next(), inner.next()) else {
                return Err(syntax("typed literal without datatype"));
            };
            let dt_name = datatype.as_str();
            let dt = Datatype::from_short_name(dt_name)
                .ok_or_else(|| syntax(format!("unknown datatype {dt_name}")))?;
            Term::Literal(Literal::parse(&string_content(text), dt)?)
        }
        other => return Err(syntax(format!("unexpected {other:?} in argument list"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn typed_literal_renders_bare() {
        let rule = parse_rule(r#"hasAge(p1, "23"^^xsd:int) -> Adult(p1)"#).unwrap();
        assert_eq!(rule.to_string(), "hasAge(p1, 23) -> Adult(p1)");
    }

    #[rstest]
    fn unknown_prefix_is_a_syntax_error() {
        let err = parse_rule("foo:bar(?x) -> A(?x)").unwrap_err();
        assert_eq!(err.code, ErrorCode::Syntax);
    }

    #[rstest]
    fn invalid_typed_literal_reports_iri() {
        let err = parse_rule(r#"hasAge(?p, "abc"^^xsd:int) -> A(?p)"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLiteral);
        assert_eq!(
            err.message,
            "literal value 'abc' is not a valid http://www.w3.org/2001/XMLSchema#int"
        );
    }

    #[rstest]
    fn query_clauses_split_on_ring() {
        let q = parse_query(
            "hasAlias(?p, ?a) ˚ sqwrl:makeBag(?s, ?a) ^ sqwrl:groupBy(?s, ?p) ˚ sqwrl:size(?n, ?s) -> sqwrl:select(?p, ?n)",
        )
        .unwrap();
        assert_eq!(q.clauses.len(), 3);
        assert_eq!(q.construction().map(<[Atom]>::len), Some(2));
        assert_eq!(q.head.len(), 1);
    }
}
