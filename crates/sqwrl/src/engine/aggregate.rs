//! Aggregates over a list of values, shared by the collection built-ins
//! (`sqwrl:sum(?r, ?bag)`) and head aggregates (`sqwrl:sum(?col)`).

use super::runtime::{Error, ErrorCode};
use crate::literal::{ArithOp, Datatype, Literal, arithmetic, numeric::widen_all};
use crate::model::Value;
use core::fmt;
use rust_decimal::Decimal;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFn {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
    Median,
}

impl AggregateFn {
    pub fn from_local_name(local: &str) -> Option<Self> {
        Some(match local {
            "count" => AggregateFn::Count,
            "countDistinct" => AggregateFn::CountDistinct,
            "sum" => AggregateFn::Sum,
            "avg" => AggregateFn::Avg,
            "min" => AggregateFn::Min,
            "max" => AggregateFn::Max,
            "median" => AggregateFn::Median,
            _ => return None,
        })
    }

    pub fn local_name(self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::CountDistinct => "countDistinct",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Median => "median",
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sqwrl:{}", self.local_name())
    }
}

/// Compute `func` over `values`. `source` names the collection or column in
/// error messages. `Ok(None)` means the aggregate is undefined for an empty
/// input (everything except `count`, `countDistinct` and `sum`).
pub fn compute(func: AggregateFn, values: &[Value], source: &str) -> Result<Option<Literal>, Error> {
    match func {
        AggregateFn::Count => Ok(Some(count_literal(values.len()))),
        AggregateFn::CountDistinct => {
            let distinct: HashSet<&Value> = values.iter().collect();
            Ok(Some(count_literal(distinct.len())))
        }
        _ => {
            let numbers = numeric_elements(func, values, source)?;
            match func {
                AggregateFn::Sum => sum(&numbers).map(Some),
                AggregateFn::Avg => avg(&numbers),
                AggregateFn::Min => extreme(&numbers, std::cmp::Ordering::Less),
                AggregateFn::Max => extreme(&numbers, std::cmp::Ordering::Greater),
                _ => median(&numbers),
            }
        }
    }
}

fn count_literal(n: usize) -> Literal {
    i32::try_from(n).map_or(Literal::Long(n as i64), Literal::Int)
}

fn numeric_elements<'a>(func: AggregateFn, values: &'a [Value], source: &str) -> Result<Vec<&'a Literal>, Error> {
    values
        .iter()
        .map(|v| {
            v.as_literal().filter(|l| l.is_numeric()).ok_or_else(|| {
                Error::from_code(
                    ErrorCode::CollectionType,
                    format!("{func} requires numeric values but {source} contains {}", v.kind_name()),
                )
            })
        })
        .collect()
}

fn join_type(numbers: &[&Literal]) -> Result<Option<Datatype>, Error> {
    widen_all(numbers.iter().map(|l| l.datatype()))
}

fn sum(numbers: &[&Literal]) -> Result<Literal, Error> {
    let Some((first, rest)) = numbers.split_first() else {
        return Ok(Literal::Int(0));
    };
    rest.iter().try_fold((*first).clone(), |acc, n| arithmetic(ArithOp::Add, &acc, n))
}

/// Integral and decimal inputs average to `xsd:decimal`; floating inputs
/// keep their type.
fn mean_of(total: &Literal, count: usize) -> Result<Literal, Error> {
    let divisor = Literal::Decimal(Decimal::from(count as u64));
    if total.datatype().is_floating() {
        arithmetic(ArithOp::Divide, total, &divisor)
    } else {
        arithmetic(ArithOp::Divide, &total.cast_to(Datatype::Decimal)?, &divisor)
    }
}

fn avg(numbers: &[&Literal]) -> Result<Option<Literal>, Error> {
    if numbers.is_empty() {
        return Ok(None);
    }
    mean_of(&sum(numbers)?, numbers.len()).map(Some)
}

fn extreme(numbers: &[&Literal], wanted: std::cmp::Ordering) -> Result<Option<Literal>, Error> {
    let Some(join) = join_type(numbers)? else {
        return Ok(None);
    };
    let mut best = numbers[0];
    for n in &numbers[1..] {
        if n.compare(best)? == wanted {
            best = n;
        }
    }
    best.cast_to(join).map(Some)
}

fn median(numbers: &[&Literal]) -> Result<Option<Literal>, Error> {
    let Some(join) = join_type(numbers)? else {
        return Ok(None);
    };
    let mut sorted: Vec<&Literal> = numbers.to_vec();
    let mut failure = None;
    sorted.sort_by(|a, b| {
        a.compare(b).unwrap_or_else(|e| {
            failure.get_or_insert(e);
            std::cmp::Ordering::Equal
        })
    });
    if let Some(e) = failure {
        return Err(e);
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        return sorted[mid].cast_to(join).map(Some);
    }
    let pair = arithmetic(ArithOp::Add, sorted[mid - 1], sorted[mid])?;
    mean_of(&pair, 2).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ints(vs: &[i32]) -> Vec<Value> {
        vs.iter().map(|v| Value::Literal(Literal::Int(*v))).collect()
    }

    fn dec(s: &str) -> Literal {
        Literal::parse(s, Datatype::Decimal).unwrap()
    }

    #[rstest]
    #[case(AggregateFn::Sum, &[1, 2, 3], Some(Literal::Int(6)))]
    #[case(AggregateFn::Sum, &[], Some(Literal::Int(0)))]
    #[case(AggregateFn::Min, &[5, 2, 9], Some(Literal::Int(2)))]
    #[case(AggregateFn::Max, &[5, 2, 9], Some(Literal::Int(9)))]
    #[case(AggregateFn::Max, &[], None)]
    #[case(AggregateFn::Median, &[5, 2, 9], Some(Literal::Int(5)))]
    #[case(AggregateFn::Count, &[1, 1], Some(Literal::Int(2)))]
    #[case(AggregateFn::CountDistinct, &[1, 1], Some(Literal::Int(1)))]
    fn aggregates_over_ints(#[case] func: AggregateFn, #[case] input: &[i32], #[case] expected: Option<Literal>) {
        assert_eq!(compute(func, &ints(input), "test").unwrap(), expected);
    }

    #[rstest]
    fn even_median_and_avg_are_decimal() {
        assert_eq!(compute(AggregateFn::Median, &ints(&[1, 2, 3, 4]), "c").unwrap(), Some(dec("2.5")));
        assert_eq!(compute(AggregateFn::Avg, &ints(&[1, 2]), "c").unwrap(), Some(dec("1.5")));
    }

    #[rstest]
    fn min_result_is_widened() {
        let values = vec![Value::Literal(Literal::Byte(3)), Value::Literal(Literal::Double(7.5))];
        assert_eq!(compute(AggregateFn::Min, &values, "c").unwrap(), Some(Literal::Double(3.0)));
    }

    #[rstest]
    fn strings_are_not_aggregatable() {
        let values = vec![Value::Literal(Literal::string("Bob"))];
        let err = compute(AggregateFn::Min, &values, "collection names").unwrap_err();
        assert_eq!(err.code, ErrorCode::CollectionType);
    }
}
