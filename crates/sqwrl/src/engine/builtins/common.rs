use crate::engine::arguments::Invocation;
use crate::engine::runtime::Error;
use crate::literal::{Datatype, Granularity, Literal};
use crate::model::Value;
use chrono::{NaiveDateTime, NaiveTime};

/// Lexical text of a literal argument, or the short name of an entity.
pub(super) fn lexical(inv: &Invocation<'_>, i: usize) -> Result<String, Error> {
    match inv.value(i)? {
        Value::Literal(l) => Ok(l.lexical()),
        Value::Entity(e) => Ok(e.name.to_string()),
        Value::Collection(c) => Err(Error::type_error(format!(
            "argument {} of {} must be a literal, got collection {}",
            i + 1,
            inv.name,
            c.name()
        ))),
    }
}

pub(super) fn string_value(s: impl Into<String>) -> Value {
    Value::Literal(Literal::String(s.into()))
}

pub(super) fn int_value(n: usize) -> Value {
    Value::Literal(i32::try_from(n).map_or(Literal::Long(n as i64), Literal::Int))
}

pub(super) fn granularity(inv: &Invocation<'_>, i: usize) -> Result<Granularity, Error> {
    inv.text(i)?.parse()
}

/// A point in time: a date (at midnight), a dateTime, or a string holding
/// either.
pub(super) fn instant(inv: &Invocation<'_>, i: usize) -> Result<NaiveDateTime, Error> {
    let lit = inv.literal(i)?;
    let lit = match lit {
        Literal::String(s) => Literal::parse(s, Datatype::DateTime)
            .or_else(|_| Literal::parse(s, Datatype::Date))?,
        other => other.clone(),
    };
    match lit {
        Literal::DateTime(dt) => Ok(dt),
        Literal::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
        other => Err(Error::type_error(format!(
            "argument {} of {} must be a date or dateTime, got {}",
            i + 1,
            inv.name,
            other.datatype()
        ))),
    }
}
