//! `swrlb` date, time and duration built-ins.
//!
//! The constructor built-ins (`date`, `time`, `dateTime`,
//! `yearMonthDuration`, `dayTimeDuration`) run in both directions: with
//! position 0 free they assemble a value from its components, with position
//! 0 bound they split it and let unification bind or check the components.

use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::literal::temporal::{add_duration, add_duration_to_date, add_duration_to_time, difference};
use crate::literal::{Datatype, Duration, Literal};
use crate::model::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    YearMonth,
    DayTime,
}

fn mismatch(inv: &Invocation<'_>, i: usize, datatype: Datatype, got: Datatype) -> Error {
    Error::type_error(format!("argument {} of {} must be {datatype}, got {got}", i + 1, inv.name))
}

/// Argument `i` as a literal of `datatype`; string arguments are parsed.
fn typed(inv: &Invocation<'_>, i: usize, datatype: Datatype) -> Result<Literal, Error> {
    let lit = inv.literal(i)?;
    if lit.datatype() == datatype {
        return Ok(lit.clone());
    }
    match lit {
        Literal::String(s) => Literal::parse(s, datatype),
        other => Err(mismatch(inv, i, datatype, other.datatype())),
    }
}

fn date_arg(inv: &Invocation<'_>, i: usize) -> Result<NaiveDate, Error> {
    match typed(inv, i, Datatype::Date)? {
        Literal::Date(d) => Ok(d),
        other => Err(mismatch(inv, i, Datatype::Date, other.datatype())),
    }
}

fn time_arg(inv: &Invocation<'_>, i: usize) -> Result<NaiveTime, Error> {
    match typed(inv, i, Datatype::Time)? {
        Literal::Time(t) => Ok(t),
        other => Err(mismatch(inv, i, Datatype::Time, other.datatype())),
    }
}

fn date_time_arg(inv: &Invocation<'_>, i: usize) -> Result<NaiveDateTime, Error> {
    match typed(inv, i, Datatype::DateTime)? {
        Literal::DateTime(dt) => Ok(dt),
        other => Err(mismatch(inv, i, Datatype::DateTime, other.datatype())),
    }
}

fn duration_arg(inv: &Invocation<'_>, i: usize, family: Family) -> Result<Duration, Error> {
    let d = match typed(inv, i, Datatype::Duration)? {
        Literal::Duration(d) => d,
        other => return Err(mismatch(inv, i, Datatype::Duration, other.datatype())),
    };
    let fits = match family {
        Family::YearMonth => d.millis() == 0,
        Family::DayTime => d.months() == 0,
    };
    if fits {
        Ok(d)
    } else {
        let expected = match family {
            Family::YearMonth => "a year-month duration",
            Family::DayTime => "a day-time duration",
        };
        Err(Error::type_error(format!(
            "argument {} of {} must be {expected}, got {d}",
            i + 1,
            inv.name
        )))
    }
}

fn int(v: i64) -> Value {
    Value::Literal(i32::try_from(v).map_or(Literal::Long(v), Literal::Int))
}

/// Seconds as `xsd:int` when whole, otherwise as `xsd:decimal`.
fn seconds(millis: i64) -> Value {
    if millis % MILLIS_PER_SECOND == 0 {
        int(millis / MILLIS_PER_SECOND)
    } else {
        Value::Literal(Literal::Decimal(Decimal::new(millis, 3)))
    }
}

fn seconds_to_millis(inv: &Invocation<'_>, i: usize) -> Result<i64, Error> {
    let secs = inv.numeric(i)?.as_f64().unwrap_or(f64::NAN);
    checked_millis(secs * MILLIS_PER_SECOND as f64, inv)
}

fn checked_millis(ms: f64, inv: &Invocation<'_>) -> Result<i64, Error> {
    let ms = ms.round();
    if ms.is_finite() && ms.abs() < i64::MAX as f64 {
        Ok(ms as i64)
    } else {
        Err(Error::overflow(format!("{} produced a duration out of range", inv.name)))
    }
}

fn component(inv: &Invocation<'_>, i: usize, what: &str) -> Result<u32, Error> {
    let v = inv.integer(i)?;
    u32::try_from(v).map_err(|_| Error::invalid_argument(format!("{what} {v} passed to {} is out of range", inv.name)))
}

fn overflow(inv: &Invocation<'_>) -> Error {
    Error::overflow(format!("{} overflowed", inv.name))
}

fn solution(inv: &Invocation<'_>, values: Vec<Value>) -> Result<Outcome, Error> {
    debug_assert_eq!(values.len(), inv.arity());
    Ok(Outcome::Solutions(vec![values]))
}

fn invalid_components(inv: &Invocation<'_>) -> Error {
    Error::invalid_argument(format!("{} received components that do not form a valid value", inv.name))
}

pub(super) fn year_month_duration_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    if inv.is_bound(0) {
        let d = duration_arg(inv, 0, Family::YearMonth)?;
        let total = d.months();
        return solution(inv, vec![Value::Literal(Literal::Duration(d)), int(total / 12), int(total % 12)]);
    }
    let (years, months) = (inv.integer(1)?, inv.integer(2)?);
    let months = years
        .checked_mul(12)
        .and_then(|m| m.checked_add(months))
        .ok_or_else(|| overflow(inv))?;
    inv.with_result(Literal::Duration(Duration::year_month(months)))
}

pub(super) fn day_time_duration_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    if inv.is_bound(0) {
        let d = duration_arg(inv, 0, Family::DayTime)?;
        let ms = d.millis();
        return solution(
            inv,
            vec![
                Value::Literal(Literal::Duration(d)),
                int(ms / MILLIS_PER_DAY),
                int(ms % MILLIS_PER_DAY / MILLIS_PER_HOUR),
                int(ms % MILLIS_PER_HOUR / MILLIS_PER_MINUTE),
                seconds(ms % MILLIS_PER_MINUTE),
            ],
        );
    }
    let parts = [
        (inv.integer(1)?, MILLIS_PER_DAY),
        (inv.integer(2)?, MILLIS_PER_HOUR),
        (inv.integer(3)?, MILLIS_PER_MINUTE),
    ];
    let mut total = seconds_to_millis(inv, 4)?;
    for (count, unit) in parts {
        total = count
            .checked_mul(unit)
            .and_then(|ms| total.checked_add(ms))
            .ok_or_else(|| overflow(inv))?;
    }
    inv.with_result(Literal::Duration(Duration::day_time(total)))
}

pub(super) fn date_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    if inv.is_bound(0) {
        let d = date_arg(inv, 0)?;
        return solution(
            inv,
            vec![
                Value::Literal(Literal::Date(d)),
                int(i64::from(d.year())),
                int(i64::from(d.month())),
                int(i64::from(d.day())),
            ],
        );
    }
    let year = i32::try_from(inv.integer(1)?).map_err(|_| invalid_components(inv))?;
    let date = NaiveDate::from_ymd_opt(year, component(inv, 2, "month")?, component(inv, 3, "day")?)
        .ok_or_else(|| invalid_components(inv))?;
    inv.with_result(Literal::Date(date))
}

fn time_of(inv: &Invocation<'_>, first: usize) -> Result<NaiveTime, Error> {
    let hour = component(inv, first, "hour")?;
    let minute = component(inv, first + 1, "minute")?;
    let ms = seconds_to_millis(inv, first + 2)?;
    let secs = u32::try_from(ms / MILLIS_PER_SECOND).map_err(|_| invalid_components(inv))?;
    let milli = u32::try_from(ms % MILLIS_PER_SECOND).map_err(|_| invalid_components(inv))?;
    NaiveTime::from_hms_milli_opt(hour, minute, secs, milli).ok_or_else(|| invalid_components(inv))
}

fn time_components(t: NaiveTime) -> [Value; 3] {
    let ms = i64::from(t.second()) * MILLIS_PER_SECOND + i64::from(t.nanosecond() / 1_000_000);
    [int(i64::from(t.hour())), int(i64::from(t.minute())), seconds(ms)]
}

pub(super) fn time_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    if inv.is_bound(0) {
        let t = time_arg(inv, 0)?;
        let mut values = vec![Value::Literal(Literal::Time(t))];
        values.extend(time_components(t));
        return solution(inv, values);
    }
    inv.with_result(Literal::Time(time_of(inv, 1)?))
}

pub(super) fn date_time_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    if inv.is_bound(0) {
        let dt = date_time_arg(inv, 0)?;
        let mut values = vec![
            Value::Literal(Literal::DateTime(dt)),
            int(i64::from(dt.year())),
            int(i64::from(dt.month())),
            int(i64::from(dt.day())),
        ];
        values.extend(time_components(dt.time()));
        return solution(inv, values);
    }
    let year = i32::try_from(inv.integer(1)?).map_err(|_| invalid_components(inv))?;
    let date = NaiveDate::from_ymd_opt(year, component(inv, 2, "month")?, component(inv, 3, "day")?)
        .ok_or_else(|| invalid_components(inv))?;
    inv.with_result(Literal::DateTime(date.and_time(time_of(inv, 4)?)))
}

fn fold_durations(inv: &Invocation<'_>, family: Family) -> Result<Outcome, Error> {
    let mut acc = duration_arg(inv, 1, family)?;
    for i in 2..inv.arity() {
        acc = acc.checked_add(duration_arg(inv, i, family)?).ok_or_else(|| overflow(inv))?;
    }
    inv.with_result(Literal::Duration(acc))
}

fn subtract_durations(inv: &Invocation<'_>, family: Family) -> Result<Outcome, Error> {
    let d = duration_arg(inv, 1, family)?
        .checked_sub(duration_arg(inv, 2, family)?)
        .ok_or_else(|| overflow(inv))?;
    inv.with_result(Literal::Duration(d))
}

pub(super) fn add_year_month_durations_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    fold_durations(inv, Family::YearMonth)
}

pub(super) fn subtract_year_month_durations_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    subtract_durations(inv, Family::YearMonth)
}

pub(super) fn add_day_time_durations_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    fold_durations(inv, Family::DayTime)
}

pub(super) fn subtract_day_time_durations_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    subtract_durations(inv, Family::DayTime)
}

pub(super) fn multiply_day_time_duration_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    let d = duration_arg(inv, 1, Family::DayTime)?;
    let factor = inv.numeric(2)?.as_f64().unwrap_or(f64::NAN);
    let ms = checked_millis(d.millis() as f64 * factor, inv)?;
    inv.with_result(Literal::Duration(Duration::day_time(ms)))
}

pub(super) fn divide_day_time_duration_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    let d = duration_arg(inv, 1, Family::DayTime)?;
    let divisor = inv.numeric(2)?.as_f64().unwrap_or(f64::NAN);
    if divisor == 0.0 {
        return Err(Error::from_code(ErrorCode::DivisionByZero, format!("{} by zero", inv.name)));
    }
    let ms = checked_millis(d.millis() as f64 / divisor, inv)?;
    inv.with_result(Literal::Duration(Duration::day_time(ms)))
}

pub(super) fn subtract_dates_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let (a, b) = (date_arg(inv, 1)?, date_arg(inv, 2)?);
    let d = difference(a.and_time(NaiveTime::MIN), b.and_time(NaiveTime::MIN));
    inv.with_result(Literal::Duration(d))
}

pub(super) fn subtract_times_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let day = NaiveDate::default();
    let d = difference(day.and_time(time_arg(inv, 1)?), day.and_time(time_arg(inv, 2)?));
    inv.with_result(Literal::Duration(d))
}

pub(super) fn subtract_date_times_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    let d = difference(date_time_arg(inv, 1)?, date_time_arg(inv, 2)?);
    inv.with_result(Literal::Duration(d))
}

fn shift_date(inv: &Invocation<'_>, family: Family, negate: bool) -> Result<Outcome, Error> {
    let mut d = duration_arg(inv, 2, family)?;
    if negate {
        d = d.checked_neg().ok_or_else(|| overflow(inv))?;
    }
    inv.with_result(Literal::Date(add_duration_to_date(date_arg(inv, 1)?, d)?))
}

fn shift_date_time(inv: &Invocation<'_>, family: Family, negate: bool) -> Result<Outcome, Error> {
    let mut d = duration_arg(inv, 2, family)?;
    if negate {
        d = d.checked_neg().ok_or_else(|| overflow(inv))?;
    }
    inv.with_result(Literal::DateTime(add_duration(date_time_arg(inv, 1)?, d)?))
}

fn shift_time(inv: &Invocation<'_>, negate: bool) -> Result<Outcome, Error> {
    let mut d = duration_arg(inv, 2, Family::DayTime)?;
    if negate {
        d = d.checked_neg().ok_or_else(|| overflow(inv))?;
    }
    inv.with_result(Literal::Time(add_duration_to_time(time_arg(inv, 1)?, d)?))
}

pub(super) fn add_year_month_duration_to_date_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_date(inv, Family::YearMonth, false)
}

pub(super) fn add_day_time_duration_to_date_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_date(inv, Family::DayTime, false)
}

pub(super) fn subtract_year_month_duration_from_date_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_date(inv, Family::YearMonth, true)
}

pub(super) fn subtract_day_time_duration_from_date_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_date(inv, Family::DayTime, true)
}

pub(super) fn add_year_month_duration_to_date_time_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_date_time(inv, Family::YearMonth, false)
}

pub(super) fn add_day_time_duration_to_date_time_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_date_time(inv, Family::DayTime, false)
}

pub(super) fn subtract_year_month_duration_from_date_time_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_date_time(inv, Family::YearMonth, true)
}

pub(super) fn subtract_day_time_duration_from_date_time_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_date_time(inv, Family::DayTime, true)
}

pub(super) fn add_day_time_duration_to_time_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_time(inv, false)
}

pub(super) fn subtract_day_time_duration_from_time_fn(
    _ctx: &mut CallCtx<'_>,
    inv: &Invocation<'_>,
) -> Result<Outcome, Error> {
    shift_time(inv, true)
}
