//! Typed literals: an immutable value tagged with its XSD datatype.
//!
//! Every [`Literal`] variant stores a Rust value that is valid for its
//! datatype by construction; textual forms are validated in
//! [`Literal::parse`] and rejected rather than coerced.

use crate::consts::XSD;
use crate::engine::runtime::{Error, ErrorCode};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use core::fmt;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

pub mod numeric;
pub mod temporal;

pub use numeric::{ArithOp, UnaryOp, arithmetic, unary, widen};
pub use temporal::{Duration, Granularity};

macro_rules! xsd {
    ($local:literal) => {
        concat!("http://www.w3.org/2001/XMLSchema#", $local)
    };
}

/// The closed set of datatypes a literal can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Datatype {
    Boolean,
    String,
    AnyUri,
    Byte,
    Short,
    Int,
    Long,
    Integer,
    Decimal,
    Float,
    Double,
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
    UnsignedLong,
    Date,
    Time,
    DateTime,
    Duration,
}

impl Datatype {
    pub const ALL: [Datatype; 19] = [
        Datatype::Boolean,
        Datatype::String,
        Datatype::AnyUri,
        Datatype::Byte,
        Datatype::Short,
        Datatype::Int,
        Datatype::Long,
        Datatype::Integer,
        Datatype::Decimal,
        Datatype::Float,
        Datatype::Double,
        Datatype::UnsignedByte,
        Datatype::UnsignedShort,
        Datatype::UnsignedInt,
        Datatype::UnsignedLong,
        Datatype::Date,
        Datatype::Time,
        Datatype::DateTime,
        Datatype::Duration,
    ];

    pub fn local_name(self) -> &'static str {
        match self {
            Datatype::Boolean => "boolean",
            Datatype::String => "string",
            Datatype::AnyUri => "anyURI",
            Datatype::Byte => "byte",
            Datatype::Short => "short",
            Datatype::Int => "int",
            Datatype::Long => "long",
            Datatype::Integer => "integer",
            Datatype::Decimal => "decimal",
            Datatype::Float => "float",
            Datatype::Double => "double",
            Datatype::UnsignedByte => "unsignedByte",
            Datatype::UnsignedShort => "unsignedShort",
            Datatype::UnsignedInt => "unsignedInt",
            Datatype::UnsignedLong => "unsignedLong",
            Datatype::Date => "date",
            Datatype::Time => "time",
            Datatype::DateTime => "dateTime",
            Datatype::Duration => "duration",
        }
    }

    pub fn iri(self) -> &'static str {
        match self {
            Datatype::Boolean => xsd!("boolean"),
            Datatype::String => xsd!("string"),
            Datatype::AnyUri => xsd!("anyURI"),
            Datatype::Byte => xsd!("byte"),
            Datatype::Short => xsd!("short"),
            Datatype::Int => xsd!("int"),
            Datatype::Long => xsd!("long"),
            Datatype::Integer => xsd!("integer"),
            Datatype::Decimal => xsd!("decimal"),
            Datatype::Float => xsd!("float"),
            Datatype::Double => xsd!("double"),
            Datatype::UnsignedByte => xsd!("unsignedByte"),
            Datatype::UnsignedShort => xsd!("unsignedShort"),
            Datatype::UnsignedInt => xsd!("unsignedInt"),
            Datatype::UnsignedLong => xsd!("unsignedLong"),
            Datatype::Date => xsd!("date"),
            Datatype::Time => xsd!("time"),
            Datatype::DateTime => xsd!("dateTime"),
            Datatype::Duration => xsd!("duration"),
        }
    }

    pub fn from_local_name(local: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.local_name() == local)
    }

    pub fn from_iri(iri: &str) -> Option<Self> {
        iri.strip_prefix(XSD).and_then(Self::from_local_name)
    }

    /// `xsd:int` style names as they appear in rule text.
    pub fn from_short_name(name: &str) -> Option<Self> {
        name.strip_prefix("xsd:").and_then(Self::from_local_name)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || matches!(self, Datatype::Decimal | Datatype::Float | Datatype::Double)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Datatype::Byte
                | Datatype::Short
                | Datatype::Int
                | Datatype::Long
                | Datatype::Integer
                | Datatype::UnsignedByte
                | Datatype::UnsignedShort
                | Datatype::UnsignedInt
                | Datatype::UnsignedLong
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Datatype::UnsignedByte
                | Datatype::UnsignedShort
                | Datatype::UnsignedInt
                | Datatype::UnsignedLong
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, Datatype::Float | Datatype::Double)
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Datatype::Date | Datatype::Time | Datatype::DateTime | Datatype::Duration
        )
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xsd:{}", self.local_name())
    }
}

#[derive(Debug, Clone)]
pub enum Literal {
    Boolean(bool),
    String(String),
    AnyUri(String),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    // xsd:integer is unbounded in XSD; i128 is the supported range.
    Integer(i128),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
    UnsignedByte(u8),
    UnsignedShort(u16),
    UnsignedInt(u32),
    UnsignedLong(u64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Duration(Duration),
}

pub(crate) fn invalid_literal(text: &str, datatype: Datatype) -> Error {
    Error::from_code(
        ErrorCode::InvalidLiteral,
        format!("literal value '{text}' is not a valid {}", datatype.iri()),
    )
}

impl Literal {
    pub fn datatype(&self) -> Datatype {
        match self {
            Literal::Boolean(_) => Datatype::Boolean,
            Literal::String(_) => Datatype::String,
            Literal::AnyUri(_) => Datatype::AnyUri,
            Literal::Byte(_) => Datatype::Byte,
            Literal::Short(_) => Datatype::Short,
            Literal::Int(_) => Datatype::Int,
            Literal::Long(_) => Datatype::Long,
            Literal::Integer(_) => Datatype::Integer,
            Literal::Decimal(_) => Datatype::Decimal,
            Literal::Float(_) => Datatype::Float,
            Literal::Double(_) => Datatype::Double,
            Literal::UnsignedByte(_) => Datatype::UnsignedByte,
            Literal::UnsignedShort(_) => Datatype::UnsignedShort,
            Literal::UnsignedInt(_) => Datatype::UnsignedInt,
            Literal::UnsignedLong(_) => Datatype::UnsignedLong,
            Literal::Date(_) => Datatype::Date,
            Literal::Time(_) => Datatype::Time,
            Literal::DateTime(_) => Datatype::DateTime,
            Literal::Duration(_) => Datatype::Duration,
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Literal::String(s.into())
    }

    /// Parse the lexical form `text` as a value of `datatype`.
    pub fn parse(text: &str, datatype: Datatype) -> Result<Literal, Error> {
        let invalid = || invalid_literal(text, datatype);
        // XSD collapses whitespace for every non-string datatype.
        let t = text.trim();
        if datatype.is_integral() {
            let v = parse_integer_lexical(t).ok_or_else(invalid)?;
            return numeric::integral_literal(v, datatype).ok_or_else(invalid);
        }
        match datatype {
            Datatype::String => Ok(Literal::String(text.to_string())),
            Datatype::AnyUri => {
                if is_valid_any_uri(t) {
                    Ok(Literal::AnyUri(t.to_string()))
                } else {
                    Err(invalid())
                }
            }
            Datatype::Boolean => match t {
                "true" | "1" => Ok(Literal::Boolean(true)),
                "false" | "0" => Ok(Literal::Boolean(false)),
                _ => Err(invalid()),
            },
            Datatype::Decimal => {
                if !is_decimal_lexical(t) {
                    return Err(invalid());
                }
                Decimal::from_str_exact(t.strip_prefix('+').unwrap_or(t))
                    .map(Literal::Decimal)
                    .map_err(|_| invalid())
            }
            // Finite text must stay finite once narrowed to single precision.
            Datatype::Float => parse_floating_lexical(t)
                .filter(|v| !v.is_finite() || (*v as f32).is_finite())
                .map(|v| Literal::Float(v as f32))
                .ok_or_else(invalid),
            Datatype::Double => parse_floating_lexical(t)
                .map(Literal::Double)
                .ok_or_else(invalid),
            Datatype::Date => NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .map(Literal::Date)
                .map_err(|_| invalid()),
            Datatype::Time => NaiveTime::parse_from_str(t, "%H:%M:%S%.f")
                .map(Literal::Time)
                .map_err(|_| invalid()),
            Datatype::DateTime => NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f")
                .map(Literal::DateTime)
                .map_err(|_| invalid()),
            Datatype::Duration => Duration::parse(t).map(Literal::Duration).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }

    /// Type a bare token from rule text: `true`/`false` are booleans, numbers
    /// with a fraction or exponent are `xsd:float`, other numbers are
    /// `xsd:int` when they fit and `xsd:integer` otherwise.
    pub fn infer(token: &str) -> Result<Literal, Error> {
        match token {
            "true" => return Ok(Literal::Boolean(true)),
            "false" => return Ok(Literal::Boolean(false)),
            _ => {}
        }
        if token.contains(['.', 'e', 'E']) {
            return Literal::parse(token, Datatype::Float);
        }
        let v = parse_integer_lexical(token).ok_or_else(|| invalid_literal(token, Datatype::Integer))?;
        Ok(i32::try_from(v).map_or(Literal::Integer(v), Literal::Int))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) | Literal::AnyUri(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral value of any integral literal.
    pub fn as_i128(&self) -> Option<i128> {
        match numeric::classify(self) {
            Some(numeric::NumKind::Int(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        numeric::classify(self).map(numeric::NumKind::to_f64)
    }

    pub fn is_numeric(&self) -> bool {
        self.datatype().is_numeric()
    }

    /// Canonical lexical form (what `Display` prints).
    pub fn lexical(&self) -> String {
        self.to_string()
    }

    /// The form used in rule text. Values whose bare token would be typed
    /// back to the same datatype are written bare, everything else as
    /// `"lexical"^^xsd:type`.
    pub fn render(&self) -> String {
        match self {
            Literal::Boolean(b) => b.to_string(),
            Literal::String(s) => quote(s),
            Literal::Int(v) => v.to_string(),
            Literal::Integer(v) if i32::try_from(*v).is_err() => v.to_string(),
            Literal::Float(v) if v.is_finite() => self.lexical(),
            other => format!("{}^^{}", quote(&other.lexical()), other.datatype()),
        }
    }

    /// Total comparison for ordered datatypes. Numbers compare across the
    /// promotion lattice, dates compare with dateTimes at midnight; any other
    /// cross-type comparison is a type error.
    pub fn compare(&self, other: &Literal) -> Result<Ordering, Error> {
        if let (Some(a), Some(b)) = (numeric::classify(self), numeric::classify(other)) {
            return Ok(numeric::compare_numeric(a, b));
        }
        let midnight = NaiveTime::MIN;
        match (self, other) {
            (
                Literal::String(a) | Literal::AnyUri(a),
                Literal::String(b) | Literal::AnyUri(b),
            ) => Ok(a.cmp(b)),
            (Literal::Boolean(a), Literal::Boolean(b)) => Ok(a.cmp(b)),
            (Literal::Date(a), Literal::Date(b)) => Ok(a.cmp(b)),
            (Literal::Time(a), Literal::Time(b)) => Ok(a.cmp(b)),
            (Literal::DateTime(a), Literal::DateTime(b)) => Ok(a.cmp(b)),
            (Literal::Date(a), Literal::DateTime(b)) => Ok(a.and_time(midnight).cmp(b)),
            (Literal::DateTime(a), Literal::Date(b)) => Ok(a.cmp(&b.and_time(midnight))),
            (Literal::Duration(a), Literal::Duration(b)) => a.compare(b).ok_or_else(|| {
                Error::type_error(format!("durations {a} and {b} are not comparable"))
            }),
            _ => Err(Error::type_error(format!(
                "cannot compare {} with {}",
                self.datatype(),
                other.datatype()
            ))),
        }
    }

    /// Value equality: numeric across the lattice, structural otherwise.
    pub fn value_eq(&self, other: &Literal) -> bool {
        match self.compare(other) {
            Ok(ord) => ord == Ordering::Equal,
            Err(_) => self == other,
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn parse_integer_lexical(t: &str) -> Option<i128> {
    let digits = t.strip_prefix(['+', '-']).unwrap_or(t);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    i128::from_str(t).ok()
}

fn is_decimal_lexical(t: &str) -> bool {
    let body = t.strip_prefix(['+', '-']).unwrap_or(t);
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    (!int_part.is_empty() || !frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

fn parse_floating_lexical(t: &str) -> Option<f64> {
    match t {
        "INF" | "+INF" => return Some(f64::INFINITY),
        "-INF" => return Some(f64::NEG_INFINITY),
        "NaN" => return Some(f64::NAN),
        _ => {}
    }
    let (mantissa, exponent) = match t.find(['e', 'E']) {
        Some(i) => (&t[..i], Some(&t[i + 1..])),
        None => (t, None),
    };
    if !is_decimal_lexical(mantissa) {
        return None;
    }
    if let Some(exp) = exponent {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    f64::from_str(t).ok().filter(|v| v.is_finite())
}

fn is_valid_any_uri(t: &str) -> bool {
    if t.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`')) {
        return false;
    }
    // Something that claims a scheme must parse as an absolute IRI.
    match t.find(':') {
        Some(colon) if !t[..colon].contains(['/', '?', '#']) => url::Url::parse(t).is_ok(),
        _ => true,
    }
}

macro_rules! floating_formatter {
    ($name:ident, $t:ty) => {
        fn $name(v: $t) -> String {
            if v.is_nan() {
                "NaN".to_string()
            } else if v.is_infinite() {
                if v > 0.0 { "INF" } else { "-INF" }.to_string()
            } else if v != 0.0 && (v.abs() >= 1e16 || v.abs() < 1e-6) {
                format!("{v:e}")
            } else if v.fract() == 0.0 {
                format!("{v:.1}")
            } else {
                format!("{v}")
            }
        }
    };
}

floating_formatter!(format_double, f64);
floating_formatter!(format_float, f32);

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::String(s) | Literal::AnyUri(s) => f.write_str(s),
            Literal::Byte(v) => write!(f, "{v}"),
            Literal::Short(v) => write!(f, "{v}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Long(v) => write!(f, "{v}"),
            Literal::Integer(v) => write!(f, "{v}"),
            Literal::Decimal(v) => write!(f, "{v}"),
            Literal::Float(v) => f.write_str(&format_float(*v)),
            Literal::Double(v) => f.write_str(&format_double(*v)),
            Literal::UnsignedByte(v) => write!(f, "{v}"),
            Literal::UnsignedShort(v) => write!(f, "{v}"),
            Literal::UnsignedInt(v) => write!(f, "{v}"),
            Literal::UnsignedLong(v) => write!(f, "{v}"),
            Literal::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Literal::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Literal::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Literal::Duration(d) => write!(f, "{d}"),
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        use Literal::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a == b,
            (String(a), String(b)) | (AnyUri(a), AnyUri(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Decimal(a), Decimal(b)) => a == b,
            (Float(a), Float(b)) => float_key(f64::from(*a)) == float_key(f64::from(*b)),
            (Double(a), Double(b)) => float_key(*a) == float_key(*b),
            (UnsignedByte(a), UnsignedByte(b)) => a == b,
            (UnsignedShort(a), UnsignedShort(b)) => a == b,
            (UnsignedInt(a), UnsignedInt(b)) => a == b,
            (UnsignedLong(a), UnsignedLong(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Duration(a), Duration(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

// NaN is one value for hashing and equality; -0.0 and 0.0 stay distinct.
fn float_key(v: f64) -> u64 {
    if v.is_nan() { f64::NAN.to_bits() } else { v.to_bits() }
}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Literal::Boolean(v) => v.hash(state),
            Literal::String(v) | Literal::AnyUri(v) => v.hash(state),
            Literal::Byte(v) => v.hash(state),
            Literal::Short(v) => v.hash(state),
            Literal::Int(v) => v.hash(state),
            Literal::Long(v) => v.hash(state),
            Literal::Integer(v) => v.hash(state),
            Literal::Decimal(v) => v.hash(state),
            Literal::Float(v) => float_key(f64::from(*v)).hash(state),
            Literal::Double(v) => float_key(*v).hash(state),
            Literal::UnsignedByte(v) => v.hash(state),
            Literal::UnsignedShort(v) => v.hash(state),
            Literal::UnsignedInt(v) => v.hash(state),
            Literal::UnsignedLong(v) => v.hash(state),
            Literal::Date(v) => v.hash(state),
            Literal::Time(v) => v.hash(state),
            Literal::DateTime(v) => v.hash(state),
            Literal::Duration(v) => v.hash(state),
        }
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Boolean(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Long(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Double(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", Datatype::Int, Literal::Int(42))]
    #[case(" -7 ", Datatype::Byte, Literal::Byte(-7))]
    #[case("255", Datatype::UnsignedByte, Literal::UnsignedByte(255))]
    #[case("1", Datatype::Boolean, Literal::Boolean(true))]
    #[case("INF", Datatype::Double, Literal::Double(f64::INFINITY))]
    #[case("-INF", Datatype::Float, Literal::Float(f32::NEG_INFINITY))]
    #[case("1.5e0", Datatype::Float, Literal::Float(1.5))]
    #[case("P1Y2M", Datatype::Duration, Literal::Duration(Duration::year_month(14)))]
    fn parses_valid_lexical_forms(
        #[case] text: &str,
        #[case] datatype: Datatype,
        #[case] expected: Literal,
    ) {
        assert_eq!(Literal::parse(text, datatype).unwrap(), expected);
    }

    #[rstest]
    #[case("128", Datatype::Byte)]
    #[case("-1", Datatype::UnsignedInt)]
    #[case("1.5", Datatype::Int)]
    #[case("1e3", Datatype::Decimal)]
    #[case("inf", Datatype::Double)]
    #[case("1e40", Datatype::Float)]
    #[case("1e400", Datatype::Double)]
    #[case("yes", Datatype::Boolean)]
    #[case("2024-13-01", Datatype::Date)]
    #[case("not a uri", Datatype::AnyUri)]
    fn rejects_invalid_lexical_forms(#[case] text: &str, #[case] datatype: Datatype) {
        let err = Literal::parse(text, datatype).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLiteral);
        assert_eq!(
            err.message,
            format!("literal value '{text}' is not a valid {}", datatype.iri())
        );
    }

    #[rstest]
    fn bare_tokens_pick_widest_fit() {
        assert_eq!(Literal::infer("23").unwrap(), Literal::Int(23));
        assert_eq!(
            Literal::infer("3000000000").unwrap(),
            Literal::Integer(3_000_000_000)
        );
        assert_eq!(Literal::infer("1.5").unwrap(), Literal::Float(1.5));
        assert_eq!(Literal::infer("false").unwrap(), Literal::Boolean(false));
    }

    #[rstest]
    fn render_prefers_bare_tokens() {
        assert_eq!(Literal::Int(23).render(), "23");
        assert_eq!(Literal::Float(2.0).render(), "2.0");
        assert_eq!(Literal::Integer(5).render(), "\"5\"^^xsd:integer");
        assert_eq!(Literal::Double(1.5).render(), "\"1.5\"^^xsd:double");
        assert_eq!(Literal::string("a\"b").render(), "\"a\\\"b\"");
    }

    #[rstest]
    fn compare_strings_and_dates() {
        let a = Literal::string("apple");
        let b = Literal::string("banana");
        assert_eq!(a.compare(&b).unwrap(), Ordering::Less);
        let d = Literal::parse("2024-01-02", Datatype::Date).unwrap();
        let dt = Literal::parse("2024-01-02T00:00:00", Datatype::DateTime).unwrap();
        assert!(d.value_eq(&dt));
        assert_eq!(
            a.compare(&Literal::Int(1)).unwrap_err().code,
            ErrorCode::TypeError
        );
    }
}
