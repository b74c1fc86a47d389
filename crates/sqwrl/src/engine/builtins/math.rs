//! `swrlb` arithmetic. The result occupies position 0; when that position
//! is already bound the computed value is checked against it instead.

use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::runtime::{CallCtx, Error};
use crate::literal::{ArithOp, Literal, UnaryOp, arithmetic, unary};

fn fold(inv: &Invocation<'_>, op: ArithOp) -> Result<Outcome, Error> {
    let mut acc = inv.numeric(1)?.clone();
    for i in 2..inv.arity() {
        acc = arithmetic(op, &acc, inv.numeric(i)?)?;
    }
    inv.with_result(acc)
}

fn binary(inv: &Invocation<'_>, op: ArithOp) -> Result<Outcome, Error> {
    inv.with_result(arithmetic(op, inv.numeric(1)?, inv.numeric(2)?)?)
}

fn unary_op(inv: &Invocation<'_>, op: UnaryOp) -> Result<Outcome, Error> {
    inv.with_result(unary(op, inv.numeric(1)?)?)
}

fn trig(inv: &Invocation<'_>, f: fn(f64) -> f64) -> Result<Outcome, Error> {
    let x = inv.numeric(1)?.as_f64().unwrap_or(f64::NAN);
    inv.with_result(Literal::Double(f(x)))
}

pub(super) fn add_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    fold(inv, ArithOp::Add)
}

pub(super) fn multiply_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    fold(inv, ArithOp::Multiply)
}

pub(super) fn subtract_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    binary(inv, ArithOp::Subtract)
}

pub(super) fn divide_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    binary(inv, ArithOp::Divide)
}

pub(super) fn integer_divide_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    binary(inv, ArithOp::IntegerDivide)
}

pub(super) fn mod_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    binary(inv, ArithOp::Mod)
}

pub(super) fn pow_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    binary(inv, ArithOp::Pow)
}

pub(super) fn unary_plus_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    unary_op(inv, UnaryOp::Plus)
}

pub(super) fn unary_minus_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    unary_op(inv, UnaryOp::Minus)
}

pub(super) fn abs_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    unary_op(inv, UnaryOp::Abs)
}

pub(super) fn ceiling_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    unary_op(inv, UnaryOp::Ceiling)
}

pub(super) fn floor_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    unary_op(inv, UnaryOp::Floor)
}

pub(super) fn round_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    unary_op(inv, UnaryOp::Round)
}

pub(super) fn round_half_to_even_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    unary_op(inv, UnaryOp::RoundHalfToEven)
}

pub(super) fn sin_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    trig(inv, f64::sin)
}

pub(super) fn cos_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    trig(inv, f64::cos)
}

pub(super) fn tan_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    trig(inv, f64::tan)
}
