//! `abox`, `tbox` and `rbox` built-ins. Each one enumerates the matching
//! axioms of the ontology as solution tuples; bound positions filter them
//! through the usual unification.

use crate::engine::arguments::{Invocation, Outcome, Solution};
use crate::engine::runtime::{CallCtx, Error};
use crate::model::{Axiom, Entity, EntityKind, Value};
use compact_str::CompactString;
use itertools::Itertools;

fn entity(kind: EntityKind, name: &CompactString) -> Value {
    Value::Entity(Entity::new(kind, name.clone()))
}

fn enumerate(ctx: &CallCtx<'_>, select: impl Fn(&Axiom) -> Vec<Solution>) -> Result<Outcome, Error> {
    Ok(Outcome::Solutions(ctx.ontology.axioms().flat_map(select).collect()))
}

/// Both orientations of a symmetric pair axiom.
fn symmetric(kind: EntityKind, a: &CompactString, b: &CompactString) -> Vec<Solution> {
    vec![vec![entity(kind, a), entity(kind, b)], vec![entity(kind, b), entity(kind, a)]]
}

/// Every distinct name used as an entity of `kind`.
fn declared(ctx: &CallCtx<'_>, kind: EntityKind) -> Result<Outcome, Error> {
    let names = ctx
        .ontology
        .axioms()
        .flat_map(Axiom::implied_kinds)
        .filter(|(_, k)| *k == kind)
        .map(|(name, _)| name)
        .unique()
        .map(|name| vec![entity(kind, name)])
        .collect();
    Ok(Outcome::Solutions(names))
}

pub(super) fn caa_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::ClassAssertion { class, individual } => vec![vec![
            entity(EntityKind::Class, class),
            entity(EntityKind::NamedIndividual, individual),
        ]],
        _ => Vec::new(),
    })
}

pub(super) fn opaa_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::ObjectPropertyAssertion { property, subject, object } => vec![vec![
            entity(EntityKind::NamedIndividual, subject),
            entity(EntityKind::ObjectProperty, property),
            entity(EntityKind::NamedIndividual, object),
        ]],
        _ => Vec::new(),
    })
}

pub(super) fn dpaa_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::DataPropertyAssertion { property, subject, value } => vec![vec![
            entity(EntityKind::NamedIndividual, subject),
            entity(EntityKind::DataProperty, property),
            Value::Literal(value.clone()),
        ]],
        _ => Vec::new(),
    })
}

pub(super) fn sia_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::SameIndividual(a, b) => symmetric(EntityKind::NamedIndividual, a, b),
        _ => Vec::new(),
    })
}

pub(super) fn dia_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::DifferentIndividuals(a, b) => symmetric(EntityKind::NamedIndividual, a, b),
        _ => Vec::new(),
    })
}

pub(super) fn cd_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    declared(ctx, EntityKind::Class)
}

pub(super) fn opd_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    declared(ctx, EntityKind::ObjectProperty)
}

pub(super) fn dpd_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    declared(ctx, EntityKind::DataProperty)
}

pub(super) fn sca_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::SubClassOf { sub, sup } => {
            vec![vec![entity(EntityKind::Class, sub), entity(EntityKind::Class, sup)]]
        }
        _ => Vec::new(),
    })
}

pub(super) fn eca_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::EquivalentClasses(a, b) => symmetric(EntityKind::Class, a, b),
        _ => Vec::new(),
    })
}

pub(super) fn dca_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::DisjointClasses(a, b) => symmetric(EntityKind::Class, a, b),
        _ => Vec::new(),
    })
}

pub(super) fn sopa_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::SubObjectPropertyOf { sub, sup } => vec![vec![
            entity(EntityKind::ObjectProperty, sub),
            entity(EntityKind::ObjectProperty, sup),
        ]],
        _ => Vec::new(),
    })
}

pub(super) fn sdpa_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::SubDataPropertyOf { sub, sup } => vec![vec![
            entity(EntityKind::DataProperty, sub),
            entity(EntityKind::DataProperty, sup),
        ]],
        _ => Vec::new(),
    })
}

pub(super) fn fopa_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::FunctionalObjectProperty(p) => vec![vec![entity(EntityKind::ObjectProperty, p)]],
        _ => Vec::new(),
    })
}

pub(super) fn topa_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::TransitiveObjectProperty(p) => vec![vec![entity(EntityKind::ObjectProperty, p)]],
        _ => Vec::new(),
    })
}

pub(super) fn spa_fn(ctx: &mut CallCtx<'_>, _inv: &Invocation<'_>) -> Result<Outcome, Error> {
    enumerate(ctx, |axiom| match axiom {
        Axiom::SymmetricObjectProperty(p) => vec![vec![entity(EntityKind::ObjectProperty, p)]],
        _ => Vec::new(),
    })
}
