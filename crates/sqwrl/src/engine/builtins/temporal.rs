//! `temporal:` library: granule arithmetic and Allen interval relations.
//!
//! Instants are accepted wherever intervals are and behave as intervals whose
//! start and end coincide. Every operand is truncated to the requested
//! granularity (milliseconds by default) before it is compared.

use super::common::{granularity, instant};
use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::runtime::{CallCtx, Error};
use crate::literal::temporal::{add_granules, granules_between, truncate};
use crate::literal::{Granularity, Literal};
use chrono::NaiveDateTime;

pub(super) const ALLEN_RELATIONS: [&str; 13] = [
    "equals",
    "before",
    "after",
    "meets",
    "metBy",
    "overlaps",
    "overlappedBy",
    "contains",
    "during",
    "starts",
    "startedBy",
    "finishes",
    "finishedBy",
];

/// `add(?r, t, n, granularity)`. A date stays a date when the unit is a day
/// or coarser.
pub(super) fn add_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let g = granularity(inv, 3)?;
    let shifted = add_granules(instant(inv, 1)?, inv.integer(2)?, g)?;
    let keep_date = matches!(inv.literal(1)?, Literal::Date(_))
        && matches!(g, Granularity::Years | Granularity::Months | Granularity::Days);
    if keep_date {
        inv.with_result(Literal::Date(shifted.date()))
    } else {
        inv.with_result(Literal::DateTime(shifted))
    }
}

/// `duration(?n, start, end, granularity)`: whole granules from start to end.
pub(super) fn duration_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let g = granularity(inv, 3)?;
    let n = granules_between(instant(inv, 1)?, instant(inv, 2)?, g);
    inv.with_result(Literal::Long(n))
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Interval {
    fn new(start: NaiveDateTime, end: NaiveDateTime, g: Granularity) -> Self {
        Interval { start: truncate(start, g), end: truncate(end, g) }
    }
}

fn relation_holds(relation: &str, a: Interval, b: Interval) -> Option<bool> {
    Some(match relation {
        "equals" => a.start == b.start && a.end == b.end,
        "before" => a.end < b.start,
        "after" => b.end < a.start,
        "meets" => a.end == b.start,
        "metBy" => b.end == a.start,
        "overlaps" => a.start < b.start && b.start < a.end && a.end < b.end,
        "overlappedBy" => b.start < a.start && a.start < b.end && b.end < a.end,
        "contains" => a.start < b.start && b.end < a.end,
        "during" => b.start < a.start && a.end < b.end,
        "starts" => a.start == b.start && a.end < b.end,
        "startedBy" => a.start == b.start && b.end < a.end,
        "finishes" => a.end == b.end && b.start < a.start,
        "finishedBy" => a.end == b.end && a.start < b.start,
        _ => return None,
    })
}

pub(super) fn allen_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let (a, b) = match inv.arity() {
        2 | 3 => {
            let g = if inv.arity() == 3 { granularity(inv, 2)? } else { Granularity::Milliseconds };
            let (x, y) = (instant(inv, 0)?, instant(inv, 1)?);
            (Interval::new(x, x, g), Interval::new(y, y, g))
        }
        _ => {
            let g = if inv.arity() == 5 { granularity(inv, 4)? } else { Granularity::Milliseconds };
            (
                Interval::new(instant(inv, 0)?, instant(inv, 1)?, g),
                Interval::new(instant(inv, 2)?, instant(inv, 3)?, g),
            )
        }
    };
    for interval in [a, b] {
        if interval.end < interval.start {
            return Err(Error::invalid_argument(format!(
                "{} received an interval ending at {} before it starts at {}",
                inv.name, interval.end, interval.start
            )));
        }
    }
    let holds = relation_holds(&inv.name.local, a, b)
        .ok_or_else(|| Error::invalid_argument(format!("{} is not an Allen relation", inv.name)))?;
    Ok(Outcome::Holds(holds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn span(a: &str, b: &str) -> Interval {
        Interval::new(at(a), at(b), Granularity::Milliseconds)
    }

    #[rstest]
    #[case("before", false)]
    #[case("overlaps", true)]
    #[case("during", false)]
    #[case("meets", false)]
    fn relations_between_intervals(#[case] relation: &str, #[case] expected: bool) {
        let a = span("2020-01-01T00:00:00", "2020-03-01T00:00:00");
        let b = span("2020-02-01T00:00:00", "2020-04-01T00:00:00");
        assert_eq!(relation_holds(relation, a, b), Some(expected));
    }

    #[rstest]
    fn every_registered_relation_is_known() {
        let a = span("2020-01-01T00:00:00", "2020-01-02T00:00:00");
        for relation in ALLEN_RELATIONS {
            assert!(relation_holds(relation, a, a).is_some(), "{relation}");
        }
    }

    #[rstest]
    fn coarse_granularity_makes_instants_equal() {
        let x = at("2020-05-01T10:00:00");
        let y = at("2020-05-01T18:30:00");
        let a = Interval::new(x, x, Granularity::Days);
        let b = Interval::new(y, y, Granularity::Days);
        assert_eq!(relation_holds("equals", a, b), Some(true));
    }
}
