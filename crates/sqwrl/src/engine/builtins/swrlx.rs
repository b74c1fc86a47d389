use crate::consts::MINTED_PREFIX;
use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::runtime::{CallCtx, Error};
use crate::model::{Entity, Value};

/// `makeOWLThing(?x, ?a1, ...)` binds a fresh individual. The same argument
/// tuple yields the same individual for the rest of the evaluation.
pub(super) fn make_owl_thing_fn(ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let key: Vec<Value> = (1..inv.arity()).map(|i| inv.value(i).cloned()).collect::<Result<_, _>>()?;
    let minted = &mut ctx.state.minted;
    let next = minted.len() + 1;
    let entity = minted
        .entry(key)
        .or_insert_with(|| Entity::individual(format!("{MINTED_PREFIX}{next}")))
        .clone();
    tracing::trace!(individual = %entity, "minted individual");
    inv.with_result(entity)
}
