//! Durations, granularities and calendar arithmetic.

use crate::engine::runtime::Error;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use core::fmt;
use std::cmp::Ordering;
use std::str::FromStr;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// An `xsd:duration`: a month count plus a millisecond count, both carrying
/// the same sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    months: i64,
    millis: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { months: 0, millis: 0 };

    pub fn new(months: i64, millis: i64) -> Option<Self> {
        ((months >= 0 && millis >= 0) || (months <= 0 && millis <= 0))
            .then_some(Duration { months, millis })
    }

    pub fn year_month(months: i64) -> Self {
        Duration { months, millis: 0 }
    }

    pub fn day_time(millis: i64) -> Self {
        Duration { months: 0, millis }
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    pub fn is_negative(&self) -> bool {
        self.months < 0 || self.millis < 0
    }

    pub fn checked_add(self, other: Duration) -> Option<Duration> {
        Duration::new(
            self.months.checked_add(other.months)?,
            self.millis.checked_add(other.millis)?,
        )
    }

    pub fn checked_neg(self) -> Option<Duration> {
        Some(Duration { months: self.months.checked_neg()?, millis: self.millis.checked_neg()? })
    }

    pub fn checked_sub(self, other: Duration) -> Option<Duration> {
        self.checked_add(other.checked_neg()?)
    }

    /// Durations order only within one family: two year-month durations, two
    /// day-time durations, or equal values.
    pub fn compare(&self, other: &Duration) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match (self.millis == 0 && other.millis == 0, self.months == 0 && other.months == 0) {
            (true, _) => Some(self.months.cmp(&other.months)),
            (_, true) => Some(self.millis.cmp(&other.millis)),
            _ => None,
        }
    }

    /// Parse `-?P(nY)?(nM)?(nD)?(T(nH)?(nM)?(n(.n)?S)?)?`.
    pub fn parse(text: &str) -> Option<Duration> {
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let rest = rest.strip_prefix('P')?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((d, t)) => {
                if t.is_empty() {
                    return None;
                }
                (d, Some(t))
            }
            None => (rest, None),
        };
        let mut months = 0i64;
        let mut millis = 0i64;
        let mut seen_any = false;

        let mut order = 0;
        for (value, designator) in components(date_part)? {
            let (rank, factor_months, factor_millis) = match designator {
                'Y' => (1, 12, 0),
                'M' => (2, 1, 0),
                'D' => (3, 0, MILLIS_PER_DAY),
                _ => return None,
            };
            if rank <= order || value.contains('.') {
                return None;
            }
            order = rank;
            let n: i64 = value.parse().ok()?;
            months = months.checked_add(n.checked_mul(factor_months)?)?;
            millis = millis.checked_add(n.checked_mul(factor_millis)?)?;
            seen_any = true;
        }

        if let Some(time_part) = time_part {
            let mut order = 0;
            let mut seen_time = false;
            for (value, designator) in components(time_part)? {
                let rank = match designator {
                    'H' => 1,
                    'M' => 2,
                    'S' => 3,
                    _ => return None,
                };
                if rank <= order || (rank != 3 && value.contains('.')) {
                    return None;
                }
                order = rank;
                let add = match designator {
                    'H' => value.parse::<i64>().ok()?.checked_mul(MILLIS_PER_HOUR)?,
                    'M' => value.parse::<i64>().ok()?.checked_mul(MILLIS_PER_MINUTE)?,
                    _ => parse_seconds(value)?,
                };
                millis = millis.checked_add(add)?;
                seen_time = true;
            }
            if !seen_time {
                return None;
            }
            seen_any = true;
        }

        if !seen_any {
            return None;
        }
        if negative {
            Some(Duration { months: -months, millis: -millis })
        } else {
            Some(Duration { months, millis })
        }
    }
}

// Split "1Y2M" into [("1", 'Y'), ("2", 'M')].
fn components(s: &str) -> Option<Vec<(&str, char)>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() || c == '.' {
            continue;
        }
        let value = &s[start..i];
        if value.is_empty() || !value.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        out.push((value, c));
        start = i + c.len_utf8();
    }
    (start == s.len()).then_some(out)
}

// Fractions beyond milliseconds are truncated.
fn parse_seconds(value: &str) -> Option<i64> {
    let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
    if value.ends_with('.') || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seconds: i64 = whole.parse().ok()?;
    let mut ms = 0i64;
    for (i, b) in frac.bytes().take(3).enumerate() {
        ms += i64::from(b - b'0') * 10i64.pow(2 - i as u32);
    }
    seconds.checked_mul(MILLIS_PER_SECOND)?.checked_add(ms)
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months == 0 && self.millis == 0 {
            return f.write_str("PT0S");
        }
        if self.is_negative() {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        let months = self.months.unsigned_abs();
        let millis = self.millis.unsigned_abs();
        let (years, months) = (months / 12, months % 12);
        if years > 0 {
            write!(f, "{years}Y")?;
        }
        if months > 0 {
            write!(f, "{months}M")?;
        }
        let day = MILLIS_PER_DAY as u64;
        let days = millis / day;
        let rest = millis % day;
        if days > 0 {
            write!(f, "{days}D")?;
        }
        if rest > 0 {
            f.write_str("T")?;
            let hours = rest / MILLIS_PER_HOUR as u64;
            let minutes = rest % MILLIS_PER_HOUR as u64 / MILLIS_PER_MINUTE as u64;
            let ms = rest % MILLIS_PER_MINUTE as u64;
            if hours > 0 {
                write!(f, "{hours}H")?;
            }
            if minutes > 0 {
                write!(f, "{minutes}M")?;
            }
            if ms > 0 {
                let (s, frac) = (ms / 1000, ms % 1000);
                if frac == 0 {
                    write!(f, "{s}S")?;
                } else {
                    let frac = format!("{frac:03}");
                    write!(f, "{s}.{}S", frac.trim_end_matches('0'))?;
                }
            }
        }
        Ok(())
    }
}

/// Unit of temporal arithmetic for the `temporal:` library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Granularity {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl FromStr for Granularity {
    type Err = Error;

    /// Accepts `Days`, `days`, `day`, `temporal:Days` and full IRIs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let local = s.rsplit([':', '#']).next().unwrap_or(s).to_ascii_lowercase();
        let local = local.strip_suffix('s').unwrap_or(&local);
        Ok(match local {
            "year" => Granularity::Years,
            "month" => Granularity::Months,
            "day" => Granularity::Days,
            "hour" => Granularity::Hours,
            "minute" => Granularity::Minutes,
            "second" => Granularity::Seconds,
            "millisecond" => Granularity::Milliseconds,
            _ => return Err(Error::invalid_argument(format!("unknown granularity '{s}'"))),
        })
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Years => "Years",
            Granularity::Months => "Months",
            Granularity::Days => "Days",
            Granularity::Hours => "Hours",
            Granularity::Minutes => "Minutes",
            Granularity::Seconds => "Seconds",
            Granularity::Milliseconds => "Milliseconds",
        })
    }
}

fn out_of_range(what: impl fmt::Display) -> Error {
    Error::overflow(format!("{what} is out of the supported date range"))
}

/// Zero every field finer than `g`.
pub fn truncate(dt: NaiveDateTime, g: Granularity) -> NaiveDateTime {
    let date = dt.date();
    let time = dt.time();
    let (date, time) = match g {
        Granularity::Years => (date.with_ordinal(1).unwrap_or(date), NaiveTime::MIN),
        Granularity::Months => (date.with_day(1).unwrap_or(date), NaiveTime::MIN),
        Granularity::Days => (date, NaiveTime::MIN),
        Granularity::Hours => (date, NaiveTime::from_hms_opt(time.hour(), 0, 0).unwrap_or(time)),
        Granularity::Minutes => (
            date,
            NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time),
        ),
        Granularity::Seconds => (date, time.with_nanosecond(0).unwrap_or(time)),
        Granularity::Milliseconds => (
            date,
            time.with_nanosecond(time.nanosecond() / 1_000_000 * 1_000_000).unwrap_or(time),
        ),
    };
    date.and_time(time)
}

fn add_months(dt: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        dt.checked_add_months(magnitude)
    } else {
        dt.checked_sub_months(magnitude)
    }
}

/// Add `count` granules of `g`; month-based units clamp to the end of month.
pub fn add_granules(dt: NaiveDateTime, count: i64, g: Granularity) -> Result<NaiveDateTime, Error> {
    let millis_per = match g {
        Granularity::Years => {
            return count
                .checked_mul(12)
                .and_then(|m| add_months(dt, m))
                .ok_or_else(|| out_of_range(dt));
        }
        Granularity::Months => return add_months(dt, count).ok_or_else(|| out_of_range(dt)),
        Granularity::Days => MILLIS_PER_DAY,
        Granularity::Hours => MILLIS_PER_HOUR,
        Granularity::Minutes => MILLIS_PER_MINUTE,
        Granularity::Seconds => MILLIS_PER_SECOND,
        Granularity::Milliseconds => 1,
    };
    count
        .checked_mul(millis_per)
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|d| dt.checked_add_signed(d))
        .ok_or_else(|| out_of_range(dt))
}

/// Whole granules of `g` from `start` to `end` after truncating both to `g`.
pub fn granules_between(start: NaiveDateTime, end: NaiveDateTime, g: Granularity) -> i64 {
    let (s, e) = (truncate(start, g), truncate(end, g));
    let delta = e - s;
    match g {
        Granularity::Years => i64::from(e.year() - s.year()),
        Granularity::Months => {
            i64::from(e.year() - s.year()) * 12 + i64::from(e.month()) - i64::from(s.month())
        }
        Granularity::Days => delta.num_days(),
        Granularity::Hours => delta.num_hours(),
        Granularity::Minutes => delta.num_minutes(),
        Granularity::Seconds => delta.num_seconds(),
        Granularity::Milliseconds => delta.num_milliseconds(),
    }
}

pub fn add_duration(dt: NaiveDateTime, d: Duration) -> Result<NaiveDateTime, Error> {
    add_months(dt, d.months)
        .and_then(|dt| dt.checked_add_signed(TimeDelta::try_milliseconds(d.millis)?))
        .ok_or_else(|| out_of_range(dt))
}

/// Dates move by whole days; the sub-day remainder is dropped.
pub fn add_duration_to_date(date: NaiveDate, d: Duration) -> Result<NaiveDate, Error> {
    let days = Duration::day_time(d.millis / MILLIS_PER_DAY * MILLIS_PER_DAY);
    add_duration(date.and_time(NaiveTime::MIN), Duration { months: d.months, ..days })
        .map(|dt| dt.date())
}

/// Times wrap around midnight; only day-time durations apply.
pub fn add_duration_to_time(time: NaiveTime, d: Duration) -> Result<NaiveTime, Error> {
    if d.months != 0 {
        return Err(Error::type_error(format!(
            "cannot add year-month duration {d} to a time"
        )));
    }
    let delta = TimeDelta::try_milliseconds(d.millis % MILLIS_PER_DAY)
        .ok_or_else(|| out_of_range(time))?;
    Ok(time.overflowing_add_signed(delta).0)
}

/// Day-time duration between two instants.
pub fn difference(a: NaiveDateTime, b: NaiveDateTime) -> Duration {
    Duration::day_time((a - b).num_milliseconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[rstest]
    #[case("P1Y2M", 14, 0)]
    #[case("P3DT4H", 0, 3 * MILLIS_PER_DAY + 4 * MILLIS_PER_HOUR)]
    #[case("-PT1.5S", 0, -1_500)]
    #[case("PT0S", 0, 0)]
    fn parses_durations(#[case] text: &str, #[case] months: i64, #[case] millis: i64) {
        let d = Duration::parse(text).unwrap();
        assert_eq!((d.months(), d.millis()), (months, millis));
    }

    #[rstest]
    #[case("P")]
    #[case("PT")]
    #[case("P1M2Y")]
    #[case("1Y")]
    #[case("P1.5Y")]
    fn rejects_malformed_durations(#[case] text: &str) {
        assert!(Duration::parse(text).is_none());
    }

    #[rstest]
    #[case("P1Y2M")]
    #[case("P3DT4H5M6.7S")]
    #[case("-P2D")]
    fn display_is_canonical(#[case] text: &str) {
        assert_eq!(Duration::parse(text).unwrap().to_string(), text);
    }

    #[rstest]
    fn mixed_family_durations_do_not_compare() {
        let ym = Duration::year_month(1);
        let dt = Duration::day_time(MILLIS_PER_DAY * 30);
        assert_eq!(ym.compare(&dt), None);
        assert_eq!(ym.compare(&Duration::year_month(2)), Some(Ordering::Less));
    }

    #[rstest]
    #[case("Days", Granularity::Days)]
    #[case("temporal:Months", Granularity::Months)]
    #[case("year", Granularity::Years)]
    fn granularity_names(#[case] text: &str, #[case] expected: Granularity) {
        assert_eq!(text.parse::<Granularity>().unwrap(), expected);
    }

    #[rstest]
    fn month_arithmetic_clamps() {
        let start = dt("2024-01-31T10:00:00");
        assert_eq!(
            add_granules(start, 1, Granularity::Months).unwrap(),
            dt("2024-02-29T10:00:00")
        );
        assert_eq!(
            granules_between(dt("2024-01-31T23:00:00"), dt("2024-02-01T01:00:00"), Granularity::Days),
            1
        );
    }
}
