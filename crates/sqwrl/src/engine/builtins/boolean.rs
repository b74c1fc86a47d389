use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::runtime::{CallCtx, Error};
use crate::literal::Literal;

pub(super) fn boolean_not_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(Literal::Boolean(!inv.boolean(1)?))
}
