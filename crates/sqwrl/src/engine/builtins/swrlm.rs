//! `swrlm` mathematical built-ins. Every result is an `xsd:double`.

use crate::engine::arguments::{Invocation, Outcome};
use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::literal::Literal;
use pest::Parser;
use pest::iterators::Pair;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(pest_derive::Parser)]
#[grammar = "engine/builtins/expression.pest"]
struct ExpressionParser;

fn double_of(inv: &Invocation<'_>, i: usize) -> Result<f64, Error> {
    Ok(inv.numeric(i)?.as_f64().unwrap_or(f64::NAN))
}

pub(super) fn sqrt_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(Literal::Double(double_of(inv, 1)?.sqrt()))
}

pub(super) fn log_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(Literal::Double(double_of(inv, 1)?.ln()))
}

pub(super) fn exp_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    inv.with_result(Literal::Double(double_of(inv, 1)?.exp()))
}

/// `eval(?r, expression, ?v1, ...)`: the expression refers to the trailing
/// arguments by their variable names.
pub(super) fn eval_fn(_ctx: &mut CallCtx<'_>, inv: &Invocation<'_>) -> Result<Outcome, Error> {
    let source = inv.text(1)?;
    let mut scope = HashMap::new();
    for i in 2..inv.arity() {
        let value = double_of(inv, i)?;
        if let Some(var) = inv.args[i].variable() {
            scope.insert(var.name(), value);
        }
    }
    let value = evaluate(source, &scope)?;
    inv.with_result(Literal::Double(value))
}

fn expression_error(source: &str, message: impl std::fmt::Display) -> Error {
    Error::invalid_argument(format!("cannot evaluate expression '{source}': {message}"))
}

pub(crate) fn evaluate(source: &str, scope: &HashMap<&str, f64>) -> Result<f64, Error> {
    let mut pairs = ExpressionParser::parse(Rule::expression, source).map_err(|e| {
        Error::from_code(ErrorCode::InvalidArgument, format!("malformed expression '{source}'"))
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    })?;
    let sum = pairs
        .next()
        .and_then(|expr| expr.into_inner().next())
        .ok_or_else(|| expression_error(source, "empty expression"))?;
    Evaluator { source, scope }.eval(sum)
}

struct Evaluator<'a> {
    source: &'a str,
    scope: &'a HashMap<&'a str, f64>,
}

impl Evaluator<'_> {
    fn eval(&self, pair: Pair<'_, Rule>) -> Result<f64, Error> {
        match pair.as_rule() {
            Rule::sum | Rule::product => {
                let mut inner = pair.into_inner();
                let first = inner.next().ok_or_else(|| expression_error(self.source, "missing operand"))?;
                let mut acc = self.eval(first)?;
                while let (Some(op), Some(rhs)) = (inner.next(), inner.next()) {
                    let rhs = self.eval(rhs)?;
                    acc = match op.as_str() {
                        "+" => acc + rhs,
                        "-" => acc - rhs,
                        "*" => acc * rhs,
                        "/" => acc / rhs,
                        _ => acc % rhs,
                    };
                }
                Ok(acc)
            }
            Rule::power => {
                let mut inner = pair.into_inner();
                let base = inner.next().ok_or_else(|| expression_error(self.source, "missing operand"))?;
                let base = self.eval(base)?;
                match inner.next() {
                    Some(exponent) => Ok(base.powf(self.eval(exponent)?)),
                    None => Ok(base),
                }
            }
            Rule::unary => {
                let mut negations = 0;
                let mut value = None;
                for p in pair.into_inner() {
                    if p.as_rule() == Rule::negate {
                        negations += 1;
                    } else {
                        value = Some(self.eval(p)?);
                    }
                }
                let value = value.ok_or_else(|| expression_error(self.source, "missing operand"))?;
                Ok(if negations % 2 == 1 { -value } else { value })
            }
            Rule::number => pair
                .as_str()
                .parse::<f64>()
                .map_err(|e| expression_error(self.source, e)),
            Rule::identifier => self.lookup(pair.as_str()),
            Rule::call => self.call(pair),
            other => Err(expression_error(self.source, format!("unexpected {other:?}"))),
        }
    }

    fn lookup(&self, name: &str) -> Result<f64, Error> {
        if let Some(v) = self.scope.get(name) {
            return Ok(*v);
        }
        match name {
            "pi" | "PI" => Ok(std::f64::consts::PI),
            "e" | "E" => Ok(std::f64::consts::E),
            _ => Err(expression_error(self.source, format!("unknown variable '{name}'"))),
        }
    }

    fn call(&self, pair: Pair<'_, Rule>) -> Result<f64, Error> {
        let mut inner = pair.into_inner();
        let name = inner.next().map(|p| p.as_str()).unwrap_or_default();
        let args = inner.map(|p| self.eval(p)).collect::<Result<Vec<_>, _>>()?;
        let unary = |f: fn(f64) -> f64| match args.as_slice() {
            [x] => Ok(f(*x)),
            _ => Err(expression_error(self.source, format!("{name} takes one argument"))),
        };
        match name {
            "sqrt" => unary(f64::sqrt),
            "abs" => unary(f64::abs),
            "exp" => unary(f64::exp),
            "log" | "ln" => unary(f64::ln),
            "log10" => unary(f64::log10),
            "sin" => unary(f64::sin),
            "cos" => unary(f64::cos),
            "tan" => unary(f64::tan),
            "floor" => unary(f64::floor),
            "ceil" => unary(f64::ceil),
            "round" => unary(f64::round),
            "min" | "max" if !args.is_empty() => {
                let pick = if name == "min" { f64::min } else { f64::max };
                Ok(args.iter().copied().reduce(pick).unwrap_or(f64::NAN))
            }
            "pow" => match args.as_slice() {
                [b, e] => Ok(b.powf(*e)),
                _ => Err(expression_error(self.source, "pow takes two arguments")),
            },
            _ => Err(expression_error(self.source, format!("unknown function '{name}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1 + 2 * 3", 7.0)]
    #[case("(1 + 2) * 3", 9.0)]
    #[case("2 ^ 3 ^ 2", 512.0)]
    #[case("-x + y", 1.0)]
    #[case("sqrt(x * 8)", 4.0)]
    #[case("max(x, y, 1)", 3.0)]
    fn evaluates_with_scope(#[case] source: &str, #[case] expected: f64) {
        let scope = HashMap::from([("x", 2.0), ("y", 3.0)]);
        assert_eq!(evaluate(source, &scope).unwrap(), expected);
    }

    #[rstest]
    fn unknown_names_are_errors() {
        let err = evaluate("z + 1", &HashMap::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert!(err.message.contains("'z'"));
    }
}
