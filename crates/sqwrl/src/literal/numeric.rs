//! Numeric classification, the promotion lattice and checked arithmetic.
//!
//! Every numeric literal classifies into a [`NumKind`] carrying its value in
//! the widest representation of its family. Arithmetic results are typed by
//! [`widen`]: the least datatype able to hold both operands.
//!
//! Signed chain: byte < short < int < long < integer < decimal < float < double.
//! Unsigned types join with each other by width; mixing an unsigned type with
//! a signed one first maps it to the next wider signed type
//! (unsignedByte→short, unsignedShort→int, unsignedInt→long,
//! unsignedLong→integer).

use super::{Datatype, Literal};
use crate::engine::runtime::{Error, ErrorCode};
use core::fmt;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;

/// Numeric classification carrying the value.
#[derive(Clone, Copy, Debug)]
pub(crate) enum NumKind {
    Int(i128),
    Dec(Decimal),
    Float(f32),
    Double(f64),
}

impl NumKind {
    /// Convert any numeric kind to f64 (lossy for Decimal and large integers).
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            NumKind::Int(i) => i as f64,
            NumKind::Dec(d) => d.to_f64().unwrap_or(f64::NAN),
            NumKind::Float(f) => f64::from(f),
            NumKind::Double(d) => d,
        }
    }

    fn to_decimal(self) -> Option<Decimal> {
        match self {
            NumKind::Int(i) => Decimal::from_i128(i),
            NumKind::Dec(d) => Some(d),
            NumKind::Float(f) => Decimal::from_f32(f),
            NumKind::Double(d) => Decimal::from_f64(d),
        }
    }
}

pub(crate) fn classify(v: &Literal) -> Option<NumKind> {
    Some(match v {
        Literal::Byte(i) => NumKind::Int(i128::from(*i)),
        Literal::Short(i) => NumKind::Int(i128::from(*i)),
        Literal::Int(i) => NumKind::Int(i128::from(*i)),
        Literal::Long(i) => NumKind::Int(i128::from(*i)),
        Literal::Integer(i) => NumKind::Int(*i),
        Literal::UnsignedByte(i) => NumKind::Int(i128::from(*i)),
        Literal::UnsignedShort(i) => NumKind::Int(i128::from(*i)),
        Literal::UnsignedInt(i) => NumKind::Int(i128::from(*i)),
        Literal::UnsignedLong(i) => NumKind::Int(i128::from(*i)),
        Literal::Decimal(d) => NumKind::Dec(*d),
        Literal::Float(f) => NumKind::Float(*f),
        Literal::Double(d) => NumKind::Double(*d),
        _ => return None,
    })
}

pub(crate) fn compare_numeric(a: NumKind, b: NumKind) -> Ordering {
    use NumKind::*;
    match (a, b) {
        (Int(x), Int(y)) => x.cmp(&y),
        (Int(_) | Dec(_), Int(_) | Dec(_)) => match (a.to_decimal(), b.to_decimal()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => float_cmp(a.to_f64(), b.to_f64()),
        },
        _ => float_cmp(a.to_f64(), b.to_f64()),
    }
}

// NaN sorts after everything and equals itself so sorting stays total.
fn float_cmp(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or_else(|| x.is_nan().cmp(&y.is_nan()))
}

fn signed_rank(d: Datatype) -> u8 {
    match d {
        Datatype::Byte => 1,
        Datatype::Short => 2,
        Datatype::Int => 3,
        Datatype::Long => 4,
        Datatype::Integer => 5,
        Datatype::Decimal => 6,
        Datatype::Float => 7,
        Datatype::Double => 8,
        _ => 0,
    }
}

fn unsigned_rank(d: Datatype) -> u8 {
    match d {
        Datatype::UnsignedByte => 1,
        Datatype::UnsignedShort => 2,
        Datatype::UnsignedInt => 3,
        Datatype::UnsignedLong => 4,
        _ => 0,
    }
}

fn signed_counterpart(d: Datatype) -> Datatype {
    match d {
        Datatype::UnsignedByte => Datatype::Short,
        Datatype::UnsignedShort => Datatype::Int,
        Datatype::UnsignedInt => Datatype::Long,
        Datatype::UnsignedLong => Datatype::Integer,
        other => other,
    }
}

/// Least upper bound of two datatypes, or a type error when they have none.
pub fn widen(a: Datatype, b: Datatype) -> Result<Datatype, Error> {
    if a == b {
        return Ok(a);
    }
    if a.is_numeric() && b.is_numeric() {
        let joined = match (a.is_unsigned(), b.is_unsigned()) {
            (true, true) => {
                if unsigned_rank(a) >= unsigned_rank(b) {
                    a
                } else {
                    b
                }
            }
            _ => {
                let (a, b) = (signed_counterpart(a), signed_counterpart(b));
                if signed_rank(a) >= signed_rank(b) { a } else { b }
            }
        };
        return Ok(joined);
    }
    match (a, b) {
        (Datatype::Date, Datatype::DateTime) | (Datatype::DateTime, Datatype::Date) => {
            Ok(Datatype::DateTime)
        }
        (Datatype::String, Datatype::AnyUri) | (Datatype::AnyUri, Datatype::String) => {
            Ok(Datatype::String)
        }
        _ => Err(Error::type_error(format!("no common datatype for {a} and {b}"))),
    }
}

/// Join of a non-empty sequence of datatypes.
pub(crate) fn widen_all(mut types: impl Iterator<Item = Datatype>) -> Result<Option<Datatype>, Error> {
    let Some(first) = types.next() else {
        return Ok(None);
    };
    types.try_fold(first, widen).map(Some)
}

/// Build an integral literal of `target` if `v` is in its range.
pub(crate) fn integral_literal(v: i128, target: Datatype) -> Option<Literal> {
    match target {
        Datatype::Byte => i8::try_from(v).ok().map(Literal::Byte),
        Datatype::Short => i16::try_from(v).ok().map(Literal::Short),
        Datatype::Int => i32::try_from(v).ok().map(Literal::Int),
        Datatype::Long => i64::try_from(v).ok().map(Literal::Long),
        Datatype::Integer => Some(Literal::Integer(v)),
        Datatype::UnsignedByte => u8::try_from(v).ok().map(Literal::UnsignedByte),
        Datatype::UnsignedShort => u16::try_from(v).ok().map(Literal::UnsignedShort),
        Datatype::UnsignedInt => u32::try_from(v).ok().map(Literal::UnsignedInt),
        Datatype::UnsignedLong => u64::try_from(v).ok().map(Literal::UnsignedLong),
        _ => None,
    }
}

fn exact_integer(v: f64) -> Option<i128> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < 1.0e38).then_some(v as i128)
}

impl Literal {
    /// Convert to `target` without losing the value. Integral targets accept
    /// only whole values in range; floating targets accept any number.
    pub fn cast_to(&self, target: Datatype) -> Result<Literal, Error> {
        if self.datatype() == target {
            return Ok(self.clone());
        }
        let not_representable = || {
            Error::from_code(
                ErrorCode::NotRepresentable,
                format!("value {self} is not representable as {}", target.iri()),
            )
        };
        let Some(n) = classify(self) else {
            return match (self, target) {
                (Literal::Date(d), Datatype::DateTime) => {
                    Ok(Literal::DateTime(d.and_time(chrono::NaiveTime::MIN)))
                }
                (Literal::AnyUri(s), Datatype::String) => Ok(Literal::String(s.clone())),
                (Literal::String(s), Datatype::AnyUri) => Literal::parse(s, Datatype::AnyUri)
                    .map_err(|_| not_representable()),
                _ => Err(not_representable()),
            };
        };
        match target {
            Datatype::Double => Ok(Literal::Double(n.to_f64())),
            Datatype::Float => Ok(Literal::Float(n.to_f64() as f32)),
            Datatype::Decimal => n
                .to_decimal()
                .map(Literal::Decimal)
                .ok_or_else(not_representable),
            t if t.is_integral() => {
                let whole = match n {
                    NumKind::Int(i) => Some(i),
                    NumKind::Dec(d) => d.fract().is_zero().then(|| d.to_i128()).flatten(),
                    NumKind::Float(f) => exact_integer(f64::from(f)),
                    NumKind::Double(d) => exact_integer(d),
                };
                whole
                    .and_then(|v| integral_literal(v, t))
                    .ok_or_else(not_representable)
            }
            _ => Err(not_representable()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Mod,
    Pow,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "add",
            ArithOp::Subtract => "subtract",
            ArithOp::Multiply => "multiply",
            ArithOp::Divide => "divide",
            ArithOp::IntegerDivide => "integerDivide",
            ArithOp::Mod => "mod",
            ArithOp::Pow => "pow",
        })
    }
}

fn division_by_zero(op: ArithOp) -> Error {
    Error::from_code(ErrorCode::DivisionByZero, format!("{op}: division by zero"))
}

/// `a op b` typed by the join of the operand datatypes.
///
/// Integral results are computed exactly and must fit the joined type;
/// `divide` on integral operands truncates toward zero.
pub fn arithmetic(op: ArithOp, a: &Literal, b: &Literal) -> Result<Literal, Error> {
    let (Some(x), Some(y)) = (classify(a), classify(b)) else {
        return Err(Error::type_error(format!(
            "{op} requires numeric operands, got {} and {}",
            a.datatype(),
            b.datatype()
        )));
    };
    let target = widen(a.datatype(), b.datatype())?;
    let overflow = || Error::overflow(format!("{op} of {a} and {b} overflows {}", target.iri()));
    match (x, y) {
        (NumKind::Int(x), NumKind::Int(y)) => {
            let r = match op {
                ArithOp::Add => x.checked_add(y),
                ArithOp::Subtract => x.checked_sub(y),
                ArithOp::Multiply => x.checked_mul(y),
                ArithOp::Divide | ArithOp::IntegerDivide => {
                    if y == 0 {
                        return Err(division_by_zero(op));
                    }
                    x.checked_div(y)
                }
                ArithOp::Mod => {
                    if y == 0 {
                        return Err(division_by_zero(op));
                    }
                    x.checked_rem(y)
                }
                ArithOp::Pow => {
                    let Ok(exp) = u32::try_from(y) else {
                        return Err(Error::invalid_argument(format!(
                            "pow: exponent {y} must be a non-negative integer"
                        )));
                    };
                    x.checked_pow(exp)
                }
            };
            r.and_then(|v| integral_literal(v, target)).ok_or_else(overflow)
        }
        _ if target == Datatype::Decimal => {
            let (Some(x), Some(y)) = (x.to_decimal(), y.to_decimal()) else {
                return Err(overflow());
            };
            let r = match op {
                ArithOp::Add => x.checked_add(y),
                ArithOp::Subtract => x.checked_sub(y),
                ArithOp::Multiply => x.checked_mul(y),
                ArithOp::Divide | ArithOp::IntegerDivide | ArithOp::Mod if y.is_zero() => {
                    return Err(division_by_zero(op));
                }
                ArithOp::Divide => x.checked_div(y),
                ArithOp::IntegerDivide => x.checked_div(y).map(|q| q.trunc()),
                ArithOp::Mod => x.checked_rem(y),
                ArithOp::Pow => match (x.to_f64(), y.to_f64()) {
                    (Some(x), Some(y)) => Decimal::from_f64(x.powf(y)),
                    _ => None,
                },
            };
            r.map(Literal::Decimal).ok_or_else(overflow)
        }
        _ => {
            let v = float_op(op, x.to_f64(), y.to_f64());
            Ok(if target == Datatype::Float {
                Literal::Float(v as f32)
            } else {
                Literal::Double(v)
            })
        }
    }
}

fn float_op(op: ArithOp, x: f64, y: f64) -> f64 {
    match op {
        ArithOp::Add => x + y,
        ArithOp::Subtract => x - y,
        ArithOp::Multiply => x * y,
        ArithOp::Divide => x / y,
        ArithOp::IntegerDivide => (x / y).trunc(),
        ArithOp::Mod => x % y,
        ArithOp::Pow => x.powf(y),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Abs,
    Ceiling,
    Floor,
    Round,
    RoundHalfToEven,
}

/// Unary numeric operation; the result keeps the operand's datatype.
pub fn unary(op: UnaryOp, a: &Literal) -> Result<Literal, Error> {
    let Some(n) = classify(a) else {
        return Err(Error::type_error(format!(
            "{op:?} requires a numeric operand, got {}",
            a.datatype()
        )));
    };
    let datatype = a.datatype();
    match n {
        NumKind::Int(i) => {
            let r = match op {
                UnaryOp::Minus => i.checked_neg(),
                UnaryOp::Abs => i.checked_abs(),
                _ => Some(i),
            };
            r.and_then(|v| integral_literal(v, datatype)).ok_or_else(|| {
                Error::overflow(format!("{op:?} of {a} overflows {}", datatype.iri()))
            })
        }
        NumKind::Dec(d) => Ok(Literal::Decimal(match op {
            UnaryOp::Plus => d,
            UnaryOp::Minus => -d,
            UnaryOp::Abs => d.abs(),
            UnaryOp::Ceiling => d.ceil(),
            UnaryOp::Floor => d.floor(),
            UnaryOp::Round => (d + Decimal::new(5, 1)).floor(),
            UnaryOp::RoundHalfToEven => {
                d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            }
        })),
        NumKind::Float(f) => Ok(Literal::Float(float_unary(op, f64::from(f)) as f32)),
        NumKind::Double(d) => Ok(Literal::Double(float_unary(op, d))),
    }
}

fn float_unary(op: UnaryOp, x: f64) -> f64 {
    match op {
        UnaryOp::Plus => x,
        UnaryOp::Minus => -x,
        UnaryOp::Abs => x.abs(),
        UnaryOp::Ceiling => x.ceil(),
        UnaryOp::Floor => x.floor(),
        // Halves round toward positive infinity.
        UnaryOp::Round if x.is_finite() => (x + 0.5).floor(),
        UnaryOp::Round => x,
        UnaryOp::RoundHalfToEven => x.round_ties_even(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Datatype::Byte, Datatype::Int, Datatype::Int)]
    #[case(Datatype::Int, Datatype::Float, Datatype::Float)]
    #[case(Datatype::Long, Datatype::Decimal, Datatype::Decimal)]
    #[case(Datatype::UnsignedByte, Datatype::UnsignedInt, Datatype::UnsignedInt)]
    #[case(Datatype::UnsignedByte, Datatype::Byte, Datatype::Short)]
    #[case(Datatype::UnsignedLong, Datatype::Long, Datatype::Integer)]
    #[case(Datatype::Date, Datatype::DateTime, Datatype::DateTime)]
    fn lattice_join(#[case] a: Datatype, #[case] b: Datatype, #[case] expected: Datatype) {
        assert_eq!(widen(a, b).unwrap(), expected);
        assert_eq!(widen(b, a).unwrap(), expected);
    }

    #[rstest]
    fn join_of_unrelated_types_is_type_error() {
        let err = widen(Datatype::String, Datatype::Int).unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeError);
    }

    #[rstest]
    fn integral_overflow_is_reported() {
        let err = arithmetic(ArithOp::Add, &Literal::Byte(100), &Literal::Byte(100)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Overflow);
        assert_eq!(
            arithmetic(ArithOp::Add, &Literal::Byte(100), &Literal::Short(100)).unwrap(),
            Literal::Short(200)
        );
    }

    #[rstest]
    fn integral_divide_truncates() {
        assert_eq!(
            arithmetic(ArithOp::Divide, &Literal::Int(7), &Literal::Int(2)).unwrap(),
            Literal::Int(3)
        );
        assert_eq!(
            arithmetic(ArithOp::Divide, &Literal::Int(1), &Literal::Int(0))
                .unwrap_err()
                .code,
            ErrorCode::DivisionByZero
        );
    }

    #[rstest]
    #[case(Literal::Double(3.0), Datatype::Int, Some(Literal::Int(3)))]
    #[case(Literal::Double(3.5), Datatype::Int, None)]
    #[case(Literal::Int(300), Datatype::Byte, None)]
    #[case(Literal::Int(3), Datatype::Double, Some(Literal::Double(3.0)))]
    fn cast_respects_representability(
        #[case] value: Literal,
        #[case] target: Datatype,
        #[case] expected: Option<Literal>,
    ) {
        assert_eq!(value.cast_to(target).ok(), expected);
    }

    #[rstest]
    fn decimal_rounding() {
        let d = |s: &str| Literal::parse(s, Datatype::Decimal).unwrap();
        assert_eq!(unary(UnaryOp::Round, &d("2.5")).unwrap(), d("3"));
        assert_eq!(unary(UnaryOp::Round, &d("-2.5")).unwrap(), d("-2"));
        assert_eq!(unary(UnaryOp::RoundHalfToEven, &d("2.5")).unwrap(), d("2"));
    }
}
