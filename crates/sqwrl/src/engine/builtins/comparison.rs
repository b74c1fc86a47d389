use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::runtime::{CallCtx, Error};
use std::cmp::Ordering;

pub(super) fn equal_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(inv.value(0)?.value_eq(inv.value(1)?)))
}

pub(super) fn not_equal_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(!inv.value(0)?.value_eq(inv.value(1)?)))
}

// Ordering mismatches between incomparable datatypes are type errors, not
// false results.
fn ordered(inv: &Invocation<'_>, accept: impl Fn(Ordering) -> bool) -> Result<Outcome, Error> {
    let ord = inv.value(0)?.compare(inv.value(1)?)?;
    Ok(Outcome::Holds(accept(ord)))
}

pub(super) fn less_than_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    ordered(inv, Ordering::is_lt)
}

pub(super) fn less_than_or_equal_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    ordered(inv, Ordering::is_le)
}

pub(super) fn greater_than_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    ordered(inv, Ordering::is_gt)
}

pub(super) fn greater_than_or_equal_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    ordered(inv, Ordering::is_ge)
}
