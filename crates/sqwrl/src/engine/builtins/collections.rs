//! `sqwrl` collection built-ins.
//!
//! `makeBag`, `makeSet` and `groupBy` write into the evaluation's
//! [`CollectionStore`](crate::engine::collections::CollectionStore) and are
//! only legal in the construction clause. Everything else reads collections
//! that the consumption environment has already bound to variables.

use super::common::int_value;
use crate::engine::aggregate::{self, AggregateFn};
use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::collections::{Collection, CollectionKind};
use crate::engine::runtime::{CallCtx, Error, ErrorCode, Phase};
use crate::model::{Value, Variable};
use std::sync::Arc;

fn construction_only(ctx: &CallCtx<'_>, inv: &Invocation<'_>) -> Result<(), Error> {
    if ctx.phase == Phase::Construction {
        Ok(())
    } else {
        Err(Error::from_code(
            ErrorCode::Syntax,
            format!("{} may only appear in the collection construction clause", inv.name),
        ))
    }
}

fn make(ctx: &mut CallCtx<'_>, inv: &Invocation<'_>, kind: CollectionKind) -> Result<Outcome, Error> {
    construction_only(ctx, inv)?;
    let name = inv.collection_name(0)?;
    let element = inv.value(1)?.clone();
    ctx.state.collections.insert(name, kind, element)?;
    Ok(Outcome::Holds(true))
}

pub(super) fn make_bag_fn(ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    make(ctx, inv, CollectionKind::Bag)
}

pub(super) fn make_set_fn(ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    make(ctx, inv, CollectionKind::Set)
}

/// `groupBy(?c, ?k1, ...)` keys the elements this match added to `?c` by the
/// current values of the key arguments.
pub(super) fn group_by_fn(ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    construction_only(ctx, inv)?;
    if inv.arity() < 2 {
        return Err(Error::from_code(ErrorCode::GroupBy, "groupBy must have at least two arguments"));
    }
    let name = inv.collection_name(0)?;
    if !ctx.state.collections.contains(name) {
        return Err(Error::from_code(
            ErrorCode::GroupBy,
            format!("groupBy applied to undefined collection {name}"),
        ));
    }
    let mut vars = Vec::with_capacity(inv.arity() - 1);
    let mut key = Vec::with_capacity(inv.arity() - 1);
    for (i, arg) in inv.args.iter().enumerate().skip(1) {
        let Some(value) = arg.value() else {
            return Err(Error::from_code(
                ErrorCode::GroupBy,
                format!("unbound group argument passed to groupBy for collection {name}"),
            ));
        };
        vars.push(arg.variable().cloned().unwrap_or_else(|| Variable::new(&format!("group{i}"))));
        key.push(value.clone());
    }
    ctx.state.collections.group_pending(name, vars, key)?;
    Ok(Outcome::Holds(true))
}

pub(super) fn size_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(int_value(inv.collection(1)?.len()))
}

pub(super) fn is_empty_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(inv.collection(0)?.is_empty()))
}

pub(super) fn not_empty_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(!inv.collection(0)?.is_empty()))
}

/// `element(?e, ?c)` yields one solution per element.
pub(super) fn element_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_results(inv.collection(1)?.elements().iter().cloned())
}

pub(super) fn not_element_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let c = inv.collection(1)?;
    Ok(Outcome::Holds(!c.contains_value(inv.value(0)?)))
}

pub(super) fn contains_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let c = inv.collection(0)?;
    Ok(Outcome::Holds(c.contains_value(inv.value(1)?)))
}

pub(super) fn not_contains_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let c = inv.collection(0)?;
    Ok(Outcome::Holds(!c.contains_value(inv.value(1)?)))
}

fn aggregate_over(inv: &Invocation<'_>, func: AggregateFn) -> Result<Outcome, Error> {
    let c = inv.collection(1)?;
    match aggregate::compute(func, c.elements(), c.name())? {
        Some(result) => inv.with_result(result),
        None => Ok(Outcome::none()),
    }
}

pub(super) fn min_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    aggregate_over(inv, AggregateFn::Min)
}

pub(super) fn max_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    aggregate_over(inv, AggregateFn::Max)
}

pub(super) fn sum_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    aggregate_over(inv, AggregateFn::Sum)
}

pub(super) fn avg_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    aggregate_over(inv, AggregateFn::Avg)
}

pub(super) fn median_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    aggregate_over(inv, AggregateFn::Median)
}

/// Element at a 1-based position of the positional order; counted from the
/// end when `from_end` is set. Out of range means no solution.
fn positional(inv: &Invocation<'_>, n: i64, from_end: bool) -> Result<Outcome, Error> {
    let c = inv.collection(1)?;
    let ordered = c.positional_order();
    let index = usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|&i| i < ordered.len())
        .map(|i| if from_end { ordered.len() - 1 - i } else { i });
    match index {
        Some(i) => inv.with_result(ordered[i].clone()),
        None => Ok(Outcome::none()),
    }
}

pub(super) fn first_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    positional(inv, 1, false)
}

pub(super) fn last_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    positional(inv, 1, true)
}

pub(super) fn nth_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    positional(inv, inv.integer(2)?, false)
}

pub(super) fn nth_last_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    positional(inv, inv.integer(2)?, true)
}

pub(super) fn equal_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(inv.collection(0)?.same_contents(inv.collection(1)?)))
}

pub(super) fn not_equal_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(!inv.collection(0)?.same_contents(inv.collection(1)?)))
}

fn intersects(inv: &Invocation<'_>) -> Result<bool, Error> {
    let (a, b) = (inv.collection(0)?, inv.collection(1)?);
    Ok(a.elements().iter().any(|e| b.contains_value(e)))
}

pub(super) fn intersects_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(intersects(inv)?))
}

pub(super) fn not_intersects_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(!intersects(inv)?))
}

fn combine(
    inv: &Invocation<'_>,
    op: fn(&Collection, &Collection, &str) -> Collection,
) -> Result<Outcome, Error> {
    let name = inv.collection_name(0)?;
    let result = op(&**inv.collection(1)?, &**inv.collection(2)?, name);
    inv.with_result(Value::Collection(Arc::new(result)))
}

pub(super) fn intersection_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    combine(inv, Collection::intersection)
}

pub(super) fn union_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    combine(inv, Collection::union)
}

pub(super) fn difference_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    combine(inv, Collection::difference)
}
