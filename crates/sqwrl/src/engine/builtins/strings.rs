//! `swrlb` string built-ins. Positions are counted in characters, not bytes,
//! and `substring` follows the 1-based XPath convention.

use super::common::{int_value, lexical, string_value};
use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::runtime::{CallCtx, Error};
use itertools::Itertools;

fn holds(value: bool) -> Result<Outcome, Error> {
    Ok(Outcome::Holds(value))
}

fn optional_flags<'a>(inv: &Invocation<'a>, i: usize) -> Result<&'a str, Error> {
    if inv.arity() > i { inv.text(i) } else { Ok("") }
}

pub(super) fn string_equal_ignore_case_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    holds(inv.text(0)?.to_lowercase() == inv.text(1)?.to_lowercase())
}

pub(super) fn string_concat_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let parts: Vec<String> = (1..inv.arity()).map(|i| lexical(inv, i)).collect::<Result<_, _>>()?;
    inv.with_result(string_value(parts.concat()))
}

pub(super) fn substring_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let text = inv.text(1)?;
    let start = inv.integer(2)?;
    let end = if inv.arity() > 3 {
        Some(start.saturating_add(inv.integer(3)?))
    } else {
        None
    };
    let out: String = text
        .chars()
        .zip(1_i64..)
        .filter(|(_, pos)| *pos >= start && end.is_none_or(|e| *pos < e))
        .map(|(c, _)| c)
        .collect();
    inv.with_result(string_value(out))
}

pub(super) fn string_length_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(int_value(inv.text(1)?.chars().count()))
}

pub(super) fn normalize_space_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(string_value(inv.text(1)?.split_whitespace().join(" ")))
}

pub(super) fn upper_case_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(string_value(inv.text(1)?.to_uppercase()))
}

pub(super) fn lower_case_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(string_value(inv.text(1)?.to_lowercase()))
}

/// `translate(?r, s, from, to)`: characters of `from` map to the character
/// at the same index of `to`, or are removed when `to` is shorter.
pub(super) fn translate_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let from: Vec<char> = inv.text(2)?.chars().collect();
    let to: Vec<char> = inv.text(3)?.chars().collect();
    let out: String = inv
        .text(1)?
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(idx) => to.get(idx).copied(),
            None => Some(c),
        })
        .collect();
    inv.with_result(string_value(out))
}

pub(super) fn contains_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    holds(inv.text(0)?.contains(inv.text(1)?))
}

pub(super) fn contains_ignore_case_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    holds(inv.text(0)?.to_lowercase().contains(&inv.text(1)?.to_lowercase()))
}

pub(super) fn starts_with_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    holds(inv.text(0)?.starts_with(inv.text(1)?))
}

pub(super) fn ends_with_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    holds(inv.text(0)?.ends_with(inv.text(1)?))
}

pub(super) fn substring_before_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    let (text, sep) = (inv.text(1)?, inv.text(2)?);
    let before = text.split_once(sep).map_or("", |(b, _)| b);
    inv.with_result(string_value(before))
}

pub(super) fn substring_after_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    let (text, sep) = (inv.text(1)?, inv.text(2)?);
    let after = text.split_once(sep).map_or("", |(_, a)| a);
    inv.with_result(string_value(after))
}

pub(super) fn matches_fn(ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let flags = optional_flags(inv, 2)?;
    holds(ctx.regex.matches(inv.text(1)?, flags, inv.text(0)?)?)
}

pub(super) fn replace_fn(ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let flags = optional_flags(inv, 4)?;
    let out = ctx.regex.replace(inv.text(2)?, flags, inv.text(1)?, inv.text(3)?)?;
    inv.with_result(string_value(out))
}

/// One solution per non-empty token.
pub(super) fn tokenize_fn(ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let flags = optional_flags(inv, 3)?;
    let tokens = ctx.regex.tokenize(inv.text(2)?, flags, inv.text(1)?)?;
    inv.with_results(tokens.into_iter().filter(|t| !t.is_empty()).map(string_value))
}
