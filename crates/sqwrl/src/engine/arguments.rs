//! Argument binding protocol shared by every built-in.
//!
//! Each call site is resolved into a list of [`Argument`]s: positions whose
//! value is known (constants, or variables bound by earlier atoms) and
//! positions holding a still-free variable. Built-ins compute full argument
//! tuples; [`dispatch`] then unifies those tuples with the call site, which is
//! what makes the same built-in act as a filter when everything is bound and
//! as a generator when its output positions are free.

use super::bindings::Bindings;
use super::collections::Collection;
use super::runtime::{BuiltInOverload, CallCtx, Error, ErrorCode};
use crate::literal::Literal;
use crate::model::{BuiltInName, Value, Variable};
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A known value. `variable` names the variable it came from, if any.
    Bound { value: Value, variable: Option<Variable> },
    Unbound(Variable),
}

impl Argument {
    pub fn constant(value: impl Into<Value>) -> Self {
        Argument::Bound { value: value.into(), variable: None }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Argument::Bound { value, .. } => Some(value),
            Argument::Unbound(_) => None,
        }
    }

    pub fn variable(&self) -> Option<&Variable> {
        match self {
            Argument::Bound { variable, .. } => variable.as_ref(),
            Argument::Unbound(v) => Some(v),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Argument::Bound { .. })
    }
}

/// Which positions of a built-in may be left unbound at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Pure predicate: every argument must be bound.
    None,
    /// Position 0 is the result; the rest are inputs.
    First,
    /// The built-in decides per call (introspection, decomposition,
    /// collection construction).
    Any,
}

/// A full argument tuple produced by a built-in, one value per position.
pub type Solution = Vec<Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Predicate result; no new bindings.
    Holds(bool),
    /// Zero or more argument tuples, each unified with the call site.
    Solutions(Vec<Solution>),
}

impl Outcome {
    pub fn none() -> Self {
        Outcome::Solutions(Vec::new())
    }
}

/// Read-only view of one call handed to a built-in implementation.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub name: &'a BuiltInName,
    pub args: &'a [Argument],
}

impl<'a> Invocation<'a> {
    pub fn new(name: &'a BuiltInName, args: &'a [Argument]) -> Self {
        Self { name, args }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_bound(&self, i: usize) -> bool {
        self.args.get(i).is_some_and(Argument::is_bound)
    }

    pub fn unbound_positions(&self) -> SmallVec<[usize; 4]> {
        (0..self.args.len()).filter(|&i| !self.is_bound(i)).collect()
    }

    pub fn value(&self, i: usize) -> Result<&'a Value, Error> {
        match self.args.get(i) {
            Some(Argument::Bound { value, .. }) => Ok(value),
            Some(Argument::Unbound(var)) => Err(Error::from_code(
                ErrorCode::UnboundArgument,
                format!("built-in {} requires argument {} ({var}) to be bound", self.name, i + 1),
            )),
            None => Err(Error::from_code(
                ErrorCode::WrongArity,
                format!("built-in {} has no argument {}", self.name, i + 1),
            )),
        }
    }

    fn wrong_type(&self, i: usize, expected: &str, got: &Value) -> Error {
        Error::type_error(format!(
            "argument {} of {} must be {expected}, got {}",
            i + 1,
            self.name,
            got.kind_name()
        ))
    }

    pub fn literal(&self, i: usize) -> Result<&'a Literal, Error> {
        let v = self.value(i)?;
        v.as_literal().ok_or_else(|| self.wrong_type(i, "a literal", v))
    }

    pub fn numeric(&self, i: usize) -> Result<&'a Literal, Error> {
        let v = self.value(i)?;
        v.as_literal()
            .filter(|l| l.is_numeric())
            .ok_or_else(|| self.wrong_type(i, "numeric", v))
    }

    pub fn string(&self, i: usize) -> Result<&'a str, Error> {
        let v = self.value(i)?;
        v.as_literal()
            .and_then(Literal::as_str)
            .ok_or_else(|| self.wrong_type(i, "a string", v))
    }

    /// String literal or entity short name.
    pub fn text(&self, i: usize) -> Result<&'a str, Error> {
        let v = self.value(i)?;
        match v {
            Value::Entity(e) => Ok(&e.name),
            _ => v
                .as_literal()
                .and_then(Literal::as_str)
                .ok_or_else(|| self.wrong_type(i, "a string or name", v)),
        }
    }

    pub fn boolean(&self, i: usize) -> Result<bool, Error> {
        let v = self.value(i)?;
        v.as_literal()
            .and_then(Literal::as_bool)
            .ok_or_else(|| self.wrong_type(i, "a boolean", v))
    }

    /// Integral argument; whole-valued decimals and floats are accepted.
    pub fn integer(&self, i: usize) -> Result<i64, Error> {
        let lit = self.numeric(i)?;
        match lit.cast_to(crate::literal::Datatype::Long)? {
            Literal::Long(v) => Ok(v),
            _ => Err(self.wrong_type(i, "an integer", &Value::Literal(lit.clone()))),
        }
    }

    pub fn collection(&self, i: usize) -> Result<&'a Arc<Collection>, Error> {
        match self.args.get(i) {
            Some(Argument::Bound { value: Value::Collection(c), .. }) => Ok(c),
            Some(arg) => Err(Error::from_code(
                ErrorCode::UnknownCollection,
                format!(
                    "argument {} of {} is not a collection{}",
                    i + 1,
                    self.name,
                    arg.variable().map(|v| format!(" ({v})")).unwrap_or_default()
                ),
            )),
            None => Err(too_few_arguments(self.name)),
        }
    }

    /// Collection name at position `i`: the variable written there.
    pub fn collection_name(&self, i: usize) -> Result<&'a str, Error> {
        self.args
            .get(i)
            .and_then(Argument::variable)
            .map(Variable::name)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "argument {} of {} must be a collection variable",
                    i + 1,
                    self.name
                ))
            })
    }

    /// Build the solution tuple for a built-in whose result sits in
    /// position 0 and whose other positions are inputs.
    pub fn with_result(&self, result: impl Into<Value>) -> Result<Outcome, Error> {
        let mut tuple = Vec::with_capacity(self.args.len());
        tuple.push(result.into());
        for i in 1..self.args.len() {
            tuple.push(self.value(i)?.clone());
        }
        Ok(Outcome::Solutions(vec![tuple]))
    }

    /// Like [`Invocation::with_result`] with one tuple per result.
    pub fn with_results(
        &self,
        results: impl IntoIterator<Item = Value>,
    ) -> Result<Outcome, Error> {
        let rest: Vec<Value> = (1..self.args.len())
            .map(|i| self.value(i).cloned())
            .collect::<Result<_, _>>()?;
        Ok(Outcome::Solutions(
            results
                .into_iter()
                .map(|r| {
                    let mut tuple = Vec::with_capacity(rest.len() + 1);
                    tuple.push(r);
                    tuple.extend(rest.iter().cloned());
                    tuple
                })
                .collect(),
        ))
    }
}

fn too_few_arguments(name: &BuiltInName) -> Error {
    Error::from_code(ErrorCode::WrongArity, format!("built-in {name} called with too few arguments"))
}

fn check_policy(name: &BuiltInName, policy: OutputPolicy, args: &[Argument]) -> Result<(), Error> {
    let unbound: SmallVec<[(usize, &Variable); 4]> = args
        .iter()
        .enumerate()
        .filter_map(|(i, a)| match a {
            Argument::Unbound(v) => Some((i, v)),
            Argument::Bound { .. } => None,
        })
        .collect();
    match policy {
        OutputPolicy::Any => Ok(()),
        OutputPolicy::None => match unbound.first() {
            Some((i, var)) => Err(Error::from_code(
                ErrorCode::UnboundArgument,
                format!("built-in {name} requires argument {} ({var}) to be bound", i + 1),
            )),
            None => Ok(()),
        },
        OutputPolicy::First => {
            let inputs: Vec<String> = unbound
                .iter()
                .filter(|(i, _)| *i != 0)
                .map(|(_, v)| v.to_string())
                .collect();
            if inputs.is_empty() {
                Ok(())
            } else {
                Err(Error::from_code(
                    ErrorCode::UnresolvedArguments,
                    format!(
                        "built-in {name} cannot resolve unbound input argument(s) {}",
                        inputs.join(", ")
                    ),
                ))
            }
        }
    }
}

/// Compare a value already fixed at a position with the value a built-in
/// computed for it. A numeric result that does not fit the bound value's
/// datatype cannot equal it, so the match fails.
fn agrees(bound: &Value, computed: &Value) -> bool {
    match (bound, computed) {
        (Value::Literal(b), Value::Literal(c)) if b.is_numeric() && c.is_numeric() => {
            c.cast_to(b.datatype()).is_ok_and(|c| c.value_eq(b))
        }
        _ => bound.value_eq(computed),
    }
}

/// Unify one solution tuple with the call site under `env`. `None` means the
/// tuple contradicts a bound position.
pub(crate) fn unify(args: &[Argument], solution: &[Value], env: &Bindings) -> Option<Bindings> {
    let mut out = env.clone();
    for (arg, computed) in args.iter().zip(solution) {
        match arg {
            Argument::Bound { value, .. } => {
                if !agrees(value, computed) {
                    return None;
                }
            }
            // A variable repeated within one call binds at its first position
            // and filters at the others.
            Argument::Unbound(var) => match out.get(var) {
                Some(existing) => {
                    if !agrees(existing, computed) {
                        return None;
                    }
                }
                None => {
                    out.bind(var.clone(), computed.clone());
                }
            },
        }
    }
    Some(out)
}

/// Run one built-in call against `env`, returning every extended
/// environment it yields.
pub(crate) fn dispatch(
    ctx: &mut CallCtx<'_>,
    name: &BuiltInName,
    overload: &BuiltInOverload,
    args: &[Argument],
    env: &Bindings,
) -> Result<Vec<Bindings>, Error> {
    check_policy(name, overload.outputs, args)?;
    let invocation = Invocation::new(name, args);
    let outcome = (overload.func)(ctx, &invocation)?;
    let results = match outcome {
        Outcome::Holds(true) => vec![env.clone()],
        Outcome::Holds(false) => Vec::new(),
        Outcome::Solutions(solutions) => {
            let mut out = Vec::with_capacity(solutions.len());
            for solution in solutions {
                if solution.len() != args.len() {
                    return Err(Error::invalid_argument(format!(
                        "built-in {name} produced {} values for {} arguments",
                        solution.len(),
                        args.len()
                    )));
                }
                if let Some(extended) = unify(args, &solution, env) {
                    out.push(extended);
                }
            }
            out
        }
    };
    tracing::trace!(built_in = %name, arity = args.len(), solutions = results.len(), "dispatched");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Library;
    use rstest::rstest;

    fn int(v: i32) -> Value {
        Value::Literal(Literal::Int(v))
    }

    #[rstest]
    fn repeated_variable_must_agree() {
        let x = Variable::new("x");
        let args = vec![Argument::Unbound(x.clone()), Argument::Unbound(x.clone())];
        let env = Bindings::new();
        assert!(unify(&args, &[int(1), int(1)], &env).is_some());
        assert!(unify(&args, &[int(1), int(2)], &env).is_none());
    }

    #[rstest]
    fn bound_output_is_a_filter() {
        let args = vec![Argument::constant(Literal::Byte(4)), Argument::constant(Literal::Int(2))];
        let env = Bindings::new();
        assert!(unify(&args, &[int(4), int(2)], &env).is_some());
        assert!(unify(&args, &[int(5), int(2)], &env).is_none());
        assert!(unify(&args, &[int(400), int(2)], &env).is_none());
        let fraction = Value::Literal(Literal::Double(4.5));
        assert!(unify(&args, &[fraction, int(2)], &env).is_none());
    }

    #[rstest]
    fn unbound_inputs_are_rejected() {
        let name = BuiltInName::new(Library::Swrlb, "add");
        let args = vec![
            Argument::Unbound(Variable::new("r")),
            Argument::Unbound(Variable::new("a")),
        ];
        let err = check_policy(&name, OutputPolicy::First, &args).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnresolvedArguments);
        let err = check_policy(&name, OutputPolicy::None, &args).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnboundArgument);
    }
}
