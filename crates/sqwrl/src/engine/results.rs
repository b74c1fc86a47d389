//! Query result assembly and access.
//!
//! The head of a query describes the table: `select`/`selectDistinct`
//! columns, head aggregates, `columnNames`, ordering and `limit`. Assembly
//! turns the final binding environments into rows in this order: aggregate
//! grouping, distinct, ordering, limits, then a uniformity check over every
//! column.

use super::aggregate::{self, AggregateFn};
use super::bindings::Bindings;
use super::collections::Collection;
use super::options::EvaluationOptions;
use super::runtime::{Error, ErrorCode};
use crate::literal::Literal;
use crate::model::{Entity, EntityKind, Library, Value, Variable};
use crate::parser::ast::{Atom, Term};
use core::cmp::Ordering;
use itertools::Itertools;
use std::sync::Arc;

pub type ResultValue = Value;

fn structure(message: impl Into<String>) -> Error {
    Error::from_code(ErrorCode::ResultStructure, message)
}

fn syntax(message: impl Into<String>) -> Error {
    Error::from_code(ErrorCode::Syntax, message)
}

#[derive(Debug, Clone)]
enum Source {
    Variable(Variable),
    Constant(Value),
    Aggregate(AggregateFn, Variable),
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    source: Source,
}

impl Column {
    fn refers_to(&self, var: &Variable) -> bool {
        match &self.source {
            Source::Variable(v) | Source::Aggregate(_, v) => v == var,
            Source::Constant(_) => false,
        }
    }
}

/// What a query head asks for.
#[derive(Debug, Default)]
struct Plan {
    columns: Vec<Column>,
    distinct: bool,
    /// Column index and whether it sorts descending.
    order: Vec<(usize, bool)>,
    limit: Option<usize>,
}

impl Plan {
    fn from_head(head: &[Atom]) -> Result<Self, Error> {
        let mut plan = Plan::default();
        let mut names: Vec<String> = Vec::new();
        let mut order_vars: Vec<(Variable, bool)> = Vec::new();

        for atom in head {
            let Some(name) = atom.built_in_name().filter(|n| n.library == Library::Sqwrl) else {
                return Err(syntax(format!("{atom} cannot appear in a query head")));
            };
            let Atom::BuiltIn { args, .. } = atom else { continue };
            match name.local.as_str() {
                local @ ("select" | "selectDistinct") => {
                    plan.distinct |= local == "selectDistinct";
                    for term in args {
                        plan.columns.push(match term {
                            Term::Variable(v) => Column { name: v.name().to_owned(), source: Source::Variable(v.clone()) },
                            Term::Literal(l) => {
                                Column { name: l.lexical(), source: Source::Constant(Value::Literal(l.clone())) }
                            }
                            Term::Name(n) => Column {
                                name: n.to_string(),
                                source: Source::Constant(Value::Entity(Entity::individual(n.clone()))),
                            },
                        });
                    }
                }
                "columnNames" => {
                    for term in args {
                        match term {
                            Term::Literal(l) => names.push(l.as_str().map_or_else(|| l.lexical(), str::to_owned)),
                            other => return Err(syntax(format!("column name {other} must be a string literal"))),
                        }
                    }
                }
                local @ ("orderBy" | "orderByDescending") => {
                    for term in args {
                        let Term::Variable(v) = term else {
                            return Err(syntax(format!("{atom} only accepts variables")));
                        };
                        order_vars.push((v.clone(), local == "orderByDescending"));
                    }
                }
                "limit" => {
                    let n = match args.as_slice() {
                        [Term::Literal(l)] => l.as_i128().and_then(|n| usize::try_from(n).ok()),
                        _ => None,
                    };
                    plan.limit = Some(n.ok_or_else(|| syntax(format!("{atom} needs one non-negative integer")))?);
                }
                local => {
                    let Some(func) = AggregateFn::from_local_name(local) else {
                        return Err(syntax(format!("{name} is not a query head operator")));
                    };
                    let [Term::Variable(v)] = args.as_slice() else {
                        return Err(syntax(format!("head aggregate {atom} takes exactly one variable")));
                    };
                    plan.columns.push(Column {
                        name: format!("{}({})", func.local_name(), v.name()),
                        source: Source::Aggregate(func, v.clone()),
                    });
                }
            }
        }

        if plan.columns.is_empty() {
            return Err(syntax("a query head must select at least one column"));
        }
        if names.len() > plan.columns.len() {
            return Err(structure(format!(
                "{} column names given for {} columns",
                names.len(),
                plan.columns.len()
            )));
        }
        for (column, name) in plan.columns.iter_mut().zip(names) {
            column.name = name;
        }
        for (var, descending) in order_vars {
            let index = plan
                .columns
                .iter()
                .position(|c| c.refers_to(&var))
                .ok_or_else(|| structure(format!("ordering variable {var} is not a selected column")))?;
            plan.order.push((index, descending));
        }
        Ok(plan)
    }

    fn has_aggregates(&self) -> bool {
        self.columns.iter().any(|c| matches!(c.source, Source::Aggregate(..)))
    }

    fn raw_row(&self, env: &Bindings) -> Result<Vec<Value>, Error> {
        self.columns
            .iter()
            .map(|column| match &column.source {
                Source::Constant(value) => Ok(value.clone()),
                Source::Variable(v) | Source::Aggregate(_, v) => env.get(v).cloned().ok_or_else(|| {
                    Error::from_code(ErrorCode::UnboundVariable, format!("selected variable {v} is not bound"))
                }),
            })
            .collect()
    }

    /// Group rows on the non-aggregated columns and replace the aggregated
    /// ones with their aggregate over each group.
    fn aggregate(&self, rows: Vec<Vec<Value>>) -> Result<Vec<Vec<Value>>, Error> {
        let keys: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !matches!(self.columns[i].source, Source::Aggregate(..)))
            .collect();
        let mut groups: Vec<(Vec<Value>, Vec<Vec<Value>>)> = Vec::new();
        for row in rows {
            let key: Vec<Value> = keys.iter().map(|&i| row[i].clone()).collect();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(row),
                None => groups.push((key, vec![row])),
            }
        }
        // Aggregates without any grouping column still yield one row.
        if groups.is_empty() && keys.is_empty() {
            groups.push((Vec::new(), Vec::new()));
        }

        let mut out = Vec::with_capacity(groups.len());
        'groups: for (key, members) in groups {
            let mut key = key.into_iter();
            let mut row = Vec::with_capacity(self.columns.len());
            for (i, column) in self.columns.iter().enumerate() {
                match &column.source {
                    Source::Aggregate(func, _) => {
                        let values: Vec<Value> = members.iter().map(|m| m[i].clone()).collect();
                        match aggregate::compute(*func, &values, &column.name)? {
                            Some(l) => row.push(Value::Literal(l)),
                            None => continue 'groups,
                        }
                    }
                    _ => row.extend(key.next()),
                }
            }
            out.push(row);
        }
        Ok(out)
    }

    fn sort(&self, rows: &mut [Vec<Value>]) -> Result<(), Error> {
        if self.order.is_empty() {
            return Ok(());
        }
        let mut failure = None;
        rows.sort_by(|a, b| {
            for &(i, descending) in &self.order {
                match a[i].compare(&b[i]) {
                    Ok(Ordering::Equal) => {}
                    Ok(o) if descending => return o.reverse(),
                    Ok(o) => return o,
                    Err(e) => {
                        failure.get_or_insert(e);
                        return Ordering::Equal;
                    }
                }
            }
            Ordering::Equal
        });
        failure.map_or(Ok(()), Err)
    }

    fn check_uniform(&self, rows: &[Vec<Value>]) -> Result<(), Error> {
        for (i, column) in self.columns.iter().enumerate() {
            let mut kinds = rows.iter().map(|r| value_category(&r[i]));
            if let Some(first) = kinds.next()
                && let Some(other) = kinds.find(|k| *k != first)
            {
                return Err(structure(format!(
                    "column {} holds both {first} and {other} values",
                    column.name
                )));
            }
        }
        Ok(())
    }
}

fn value_category(value: &Value) -> &'static str {
    match value {
        Value::Literal(_) => "literal",
        Value::Entity(e) => match e.kind {
            EntityKind::Class => "class",
            EntityKind::ObjectProperty => "object property",
            EntityKind::DataProperty => "data property",
            _ => "individual",
        },
        Value::Collection(_) => "collection",
    }
}

/// Build the result table for `head` from the final environments.
pub(crate) fn assemble(head: &[Atom], envs: Vec<Bindings>, options: &EvaluationOptions) -> Result<QueryResult, Error> {
    let plan = Plan::from_head(head)?;
    let mut rows = envs.iter().map(|env| plan.raw_row(env)).collect::<Result<Vec<_>, _>>()?;
    if plan.has_aggregates() {
        rows = plan.aggregate(rows)?;
    }
    if plan.distinct {
        rows = rows.into_iter().unique().collect();
    }
    plan.sort(&mut rows)?;
    for limit in [plan.limit, options.result_limit].into_iter().flatten() {
        rows.truncate(limit);
    }
    plan.check_uniform(&rows)?;
    Ok(QueryResult {
        columns: plan.columns.into_iter().map(|c| c.name).collect(),
        rows,
        current: None,
    })
}

/// A column reference: position or name.
pub trait ColumnRef {
    fn index_in(&self, columns: &[String]) -> Option<usize>;
}

impl ColumnRef for usize {
    fn index_in(&self, columns: &[String]) -> Option<usize> {
        (*self < columns.len()).then_some(*self)
    }
}

impl ColumnRef for &str {
    fn index_in(&self, columns: &[String]) -> Option<usize> {
        columns.iter().position(|c| c == self)
    }
}

/// Rows of a query result with a forward-only cursor.
///
/// ```ignore
/// let mut result = engine.run_text("Person(?p) ^ hasAge(?p, ?a) -> sqwrl:select(?p, ?a)")?;
/// while result.next() {
///     println!("{} {}", result.get_named_individual("p")?, result.get_literal(1)?);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<ResultValue>>,
    current: Option<usize>,
}

impl QueryResult {
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<ResultValue>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<ResultValue>> {
        self.rows
    }

    /// Move to the next row. Returns `false` once the rows are exhausted;
    /// the cursor never moves backwards.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let next = self.current.map_or(0, |i| i + 1);
        if next < self.rows.len() {
            self.current = Some(next);
            true
        } else {
            self.current = Some(self.rows.len());
            false
        }
    }

    pub fn get_value(&self, column: impl ColumnRef) -> Result<&ResultValue, Error> {
        let row = self
            .current
            .and_then(|i| self.rows.get(i))
            .ok_or_else(|| structure("no current row"))?;
        let index = column
            .index_in(&self.columns)
            .ok_or_else(|| structure("no such column in the result"))?;
        Ok(&row[index])
    }

    pub fn get_literal(&self, column: impl ColumnRef) -> Result<&Literal, Error> {
        match self.get_value(column)? {
            Value::Literal(l) => Ok(l),
            other => Err(Error::type_error(format!("expected a literal, got {}", other.kind_name()))),
        }
    }

    fn get_entity(&self, column: impl ColumnRef, kind: EntityKind) -> Result<&Entity, Error> {
        match self.get_value(column)? {
            Value::Entity(e) if e.kind == kind => Ok(e),
            other => Err(Error::type_error(format!("expected {kind}, got {}", other.kind_name()))),
        }
    }

    pub fn get_class(&self, column: impl ColumnRef) -> Result<&Entity, Error> {
        self.get_entity(column, EntityKind::Class)
    }

    pub fn get_named_individual(&self, column: impl ColumnRef) -> Result<&Entity, Error> {
        self.get_entity(column, EntityKind::NamedIndividual)
    }

    pub fn get_object_property(&self, column: impl ColumnRef) -> Result<&Entity, Error> {
        self.get_entity(column, EntityKind::ObjectProperty)
    }

    pub fn get_data_property(&self, column: impl ColumnRef) -> Result<&Entity, Error> {
        self.get_entity(column, EntityKind::DataProperty)
    }

    pub fn get_collection(&self, column: impl ColumnRef) -> Result<&Arc<Collection>, Error> {
        match self.get_value(column)? {
            Value::Collection(c) => Ok(c),
            other => Err(Error::type_error(format!("expected a collection, got {}", other.kind_name()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_query;
    use rstest::rstest;

    fn head(text: &str) -> Vec<Atom> {
        parse_query(text).unwrap().head
    }

    fn env(pairs: &[(&str, i32)]) -> Bindings {
        pairs
            .iter()
            .map(|(n, v)| (Variable::new(n), Value::Literal(Literal::Int(*v))))
            .collect()
    }

    #[rstest]
    fn head_aggregates_group_on_other_columns() {
        let h = head("A(?g) -> sqwrl:select(?g) ^ sqwrl:sum(?v) ^ sqwrl:count(?v)");
        let envs = vec![env(&[("g", 1), ("v", 2)]), env(&[("g", 2), ("v", 5)]), env(&[("g", 1), ("v", 3)])];
        let result = assemble(&h, envs, &EvaluationOptions::default()).unwrap();
        assert_eq!(result.column_names(), ["g", "sum(v)", "count(v)"]);
        let sums: Vec<String> = result.rows().iter().map(|r| r[1].to_string()).collect();
        assert_eq!(sums, ["5", "5"]);
        assert_eq!(result.rows()[0][2], Value::Literal(Literal::Int(2)));
    }

    #[rstest]
    fn column_names_override_defaults() {
        let h = head(r#"A(?x) -> sqwrl:select(?x) ^ sqwrl:columnNames("value")"#);
        let result = assemble(&h, vec![env(&[("x", 1)])], &EvaluationOptions::default()).unwrap();
        assert_eq!(result.column_names(), ["value"]);
    }

    #[rstest]
    fn cursor_moves_forward_only() {
        let h = head("A(?x) -> sqwrl:select(?x) ^ sqwrl:orderByDescending(?x)");
        let envs = vec![env(&[("x", 1)]), env(&[("x", 3)])];
        let mut result = assemble(&h, envs, &EvaluationOptions::default()).unwrap();
        assert!(result.get_value(0).is_err());
        assert!(result.next());
        assert_eq!(result.get_literal("x").unwrap(), &Literal::Int(3));
        assert!(result.next());
        assert!(!result.next());
        assert!(!result.next());
    }

    #[rstest]
    #[case("A(?x) -> sqwrl:select(?x) ^ sqwrl:orderBy(?y)", ErrorCode::ResultStructure)]
    #[case("A(?x) -> B(?x)", ErrorCode::Syntax)]
    #[case("A(?x) -> sqwrl:limit(2)", ErrorCode::Syntax)]
    fn malformed_heads_are_rejected(#[case] text: &str, #[case] code: ErrorCode) {
        let err = assemble(&head(text), Vec::new(), &EvaluationOptions::default()).unwrap_err();
        assert_eq!(err.code, code);
    }
}
