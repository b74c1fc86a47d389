//! Matching driver for queries and rules.
//!
//! Atoms are matched depth-first, left to right. Class, property, `sameAs`
//! and `differentFrom` atoms enumerate candidate tuples from the ontology;
//! built-in atoms go through [`dispatch`]. Both paths share the same
//! unification step, so a bound argument always acts as a filter.

use super::arguments::{Argument, dispatch, unify};
use super::bindings::Bindings;
use super::collections::{CollectionKind, consumption_environments};
use super::options::EvaluationOptions;
use super::results::{QueryResult, assemble};
use super::runtime::{BuiltInOverload, CallCtx, Error, ErrorCode, ErrorKind, EvaluationState, Phase, RegexProvider};
use crate::consts::MINTED_PREFIX;
use crate::model::{Axiom, BuiltInName, Entity, EntityKind, Library, MemoryOntology, Ontology, Value, Variable};
use crate::parser::ast::{Atom, Query, Rule, Term};
use crate::parser::parse_query;
use compact_str::CompactString;

/// One argument position of a prepared atom.
#[derive(Debug, Clone)]
enum Slot {
    Const(Value),
    Var(Variable),
}

impl Slot {
    fn argument(&self, env: &Bindings) -> Argument {
        match self {
            Slot::Const(value) => Argument::Bound { value: value.clone(), variable: None },
            Slot::Var(var) => match env.get(var) {
                Some(value) => Argument::Bound { value: value.clone(), variable: Some(var.clone()) },
                None => Argument::Unbound(var.clone()),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum Goal {
    Class { class: CompactString, arg: Slot },
    Property { property: CompactString, subject: Slot, object: Slot },
    SameAs(Slot, Slot),
    DifferentFrom(Slot, Slot),
    BuiltIn { name: BuiltInName, overload: BuiltInOverload, args: Vec<Slot> },
}

fn syntax(message: impl Into<String>) -> Error {
    Error::from_code(ErrorCode::Syntax, message)
}

fn is_construction_atom(atom: &Atom) -> bool {
    atom.is_built_in(Library::Sqwrl, "makeBag")
        || atom.is_built_in(Library::Sqwrl, "makeSet")
        || atom.is_built_in(Library::Sqwrl, "groupBy")
}

/// Filters and generators first, then `make*`, then `groupBy`, so that a
/// match only contributes elements once it has survived every other atom
/// and `groupBy` sees the elements its own match added.
fn construction_order(atoms: &[Atom]) -> Vec<Atom> {
    let rank = |a: &Atom| {
        if a.is_built_in(Library::Sqwrl, "groupBy") {
            2
        } else if is_construction_atom(a) {
            1
        } else {
            0
        }
    };
    let mut ordered = atoms.to_vec();
    ordered.sort_by_key(rank);
    ordered
}

/// Collection variables introduced by `make*` atoms, in first-use order.
fn declared_collections(atoms: &[Atom]) -> Vec<(Variable, CollectionKind)> {
    let mut out: Vec<(Variable, CollectionKind)> = Vec::new();
    for atom in atoms {
        let kind = if atom.is_built_in(Library::Sqwrl, "makeBag") {
            CollectionKind::Bag
        } else if atom.is_built_in(Library::Sqwrl, "makeSet") {
            CollectionKind::Set
        } else {
            continue;
        };
        if let Some(var) = atom.terms().first().and_then(|t| t.as_variable())
            && !out.iter().any(|(v, _)| v == var)
        {
            out.push((var.clone(), kind));
        }
    }
    out
}

/// Collection variables named as the first argument of a `groupBy` atom.
fn grouped_collections(atoms: &[Atom]) -> Vec<Variable> {
    atoms
        .iter()
        .filter(|atom| atom.is_built_in(Library::Sqwrl, "groupBy"))
        .filter_map(|atom| atom.terms().first().and_then(|t| t.as_variable()).cloned())
        .collect()
}

/// Turns parsed atoms into goals: resolves built-ins and types names.
struct Preparer<'a> {
    ontology: &'a dyn Ontology,
    options: &'a EvaluationOptions,
}

impl Preparer<'_> {
    fn slot(&self, term: &Term) -> Slot {
        match term {
            Term::Variable(v) => Slot::Var(v.clone()),
            Term::Literal(l) => Slot::Const(Value::Literal(l.clone())),
            Term::Name(n) => {
                let kind = self.ontology.entity_kind(n).unwrap_or(EntityKind::NamedIndividual);
                Slot::Const(Value::Entity(Entity::new(kind, n.clone())))
            }
        }
    }

    fn goal(&self, atom: &Atom) -> Result<Goal, Error> {
        Ok(match atom {
            Atom::Class { class, arg } => Goal::Class { class: class.clone(), arg: self.slot(arg) },
            Atom::Property { property, subject, object } => Goal::Property {
                property: property.clone(),
                subject: self.slot(subject),
                object: self.slot(object),
            },
            Atom::SameAs(a, b) => Goal::SameAs(self.slot(a), self.slot(b)),
            Atom::DifferentFrom(a, b) => Goal::DifferentFrom(self.slot(a), self.slot(b)),
            Atom::BuiltIn { name, args } => {
                let overload = self.options.registry.resolve(name, args.len())?.clone();
                Goal::BuiltIn {
                    name: name.clone(),
                    overload,
                    args: args.iter().map(|t| self.slot(t)).collect(),
                }
            }
        })
    }

    /// Prepare one clause. `make*`/`groupBy` are only accepted when
    /// `allow_construction` is set.
    fn clause(&self, atoms: &[Atom], allow_construction: bool) -> Result<Vec<Goal>, Error> {
        if !allow_construction && let Some(atom) = atoms.iter().find(|a| is_construction_atom(a)) {
            return Err(syntax(format!(
                "{atom} may only appear in the collection construction clause"
            )));
        }
        atoms.iter().map(|a| self.goal(a)).collect()
    }
}

/// Depth-first search over one clause.
struct Search<'a> {
    ontology: &'a dyn Ontology,
    regex: &'a dyn RegexProvider,
    state: &'a mut EvaluationState,
    phase: Phase,
    /// Complete matches. Construction keeps only the count.
    found: Vec<Bindings>,
    matched: usize,
    /// Binding-time errors that abandoned a rule match.
    abandoned: Vec<Error>,
}

impl<'a> Search<'a> {
    fn new(
        ontology: &'a dyn Ontology,
        options: &'a EvaluationOptions,
        state: &'a mut EvaluationState,
        phase: Phase,
    ) -> Self {
        Self {
            ontology,
            regex: &*options.regex,
            state,
            phase,
            found: Vec::new(),
            matched: 0,
            abandoned: Vec::new(),
        }
    }

    fn run(&mut self, goals: &[Goal], env: Bindings) -> Result<(), Error> {
        let Some((goal, rest)) = goals.split_first() else {
            self.matched += 1;
            if self.phase != Phase::Construction {
                self.found.push(env);
            }
            return Ok(());
        };
        let extended = match self.extend(goal, &env) {
            Ok(extended) => extended,
            // A failing built-in abandons only the current rule match.
            Err(e) if self.phase == Phase::Rule && e.kind() == ErrorKind::Binding => {
                tracing::warn!(error = %e, "rule match abandoned");
                self.abandoned.push(e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        for next in extended {
            self.run(rest, next)?;
        }
        Ok(())
    }

    fn extend(&mut self, goal: &Goal, env: &Bindings) -> Result<Vec<Bindings>, Error> {
        match goal {
            Goal::BuiltIn { name, overload, args } => {
                let args: Vec<Argument> = args.iter().map(|s| s.argument(env)).collect();
                let mut ctx = CallCtx {
                    ontology: self.ontology,
                    state: &mut *self.state,
                    regex: self.regex,
                    phase: self.phase,
                };
                dispatch(&mut ctx, name, overload, &args, env)
            }
            Goal::Class { class, arg } => {
                let candidates = self.ontology.axioms().filter_map(|axiom| match axiom {
                    Axiom::ClassAssertion { class: c, individual } if c == class => {
                        Some(vec![Value::Entity(Entity::individual(individual.clone()))])
                    }
                    _ => None,
                });
                Ok(unify_all(&[arg.argument(env)], candidates, env))
            }
            Goal::Property { property, subject, object } => {
                let candidates = self.ontology.axioms().filter_map(|axiom| match axiom {
                    Axiom::ObjectPropertyAssertion { property: p, subject: s, object: o } if p == property => {
                        Some(vec![
                            Value::Entity(Entity::individual(s.clone())),
                            Value::Entity(Entity::individual(o.clone())),
                        ])
                    }
                    Axiom::DataPropertyAssertion { property: p, subject: s, value } if p == property => {
                        Some(vec![Value::Entity(Entity::individual(s.clone())), Value::Literal(value.clone())])
                    }
                    _ => None,
                });
                Ok(unify_all(&[subject.argument(env), object.argument(env)], candidates, env))
            }
            Goal::SameAs(a, b) => {
                let args = [a.argument(env), b.argument(env)];
                let mut candidates = pairs(self.ontology, |axiom| match axiom {
                    Axiom::SameIndividual(x, y) => Some((x, y)),
                    _ => None,
                });
                // Every individual is the same as itself.
                for arg in &args {
                    if let Some(v @ Value::Entity(_)) = arg.value() {
                        candidates.push(vec![v.clone(), v.clone()]);
                    }
                }
                Ok(unify_all(&args, candidates, env))
            }
            Goal::DifferentFrom(a, b) => {
                let candidates = pairs(self.ontology, |axiom| match axiom {
                    Axiom::DifferentIndividuals(x, y) => Some((x, y)),
                    _ => None,
                });
                Ok(unify_all(&[a.argument(env), b.argument(env)], candidates, env))
            }
        }
    }
}

/// Both orientations of every symmetric individual pair selected by `pick`.
fn pairs<'o>(
    ontology: &'o dyn Ontology,
    pick: impl Fn(&'o Axiom) -> Option<(&'o CompactString, &'o CompactString)>,
) -> Vec<Vec<Value>> {
    let individual = |n: &CompactString| Value::Entity(Entity::individual(n.clone()));
    ontology
        .axioms()
        .filter_map(pick)
        .flat_map(|(x, y)| [vec![individual(x), individual(y)], vec![individual(y), individual(x)]])
        .collect()
}

fn unify_all(
    args: &[Argument],
    candidates: impl IntoIterator<Item = Vec<Value>>,
    env: &Bindings,
) -> Vec<Bindings> {
    candidates.into_iter().filter_map(|candidate| unify(args, &candidate, env)).collect()
}

/// Runs SQWRL queries against an ontology.
pub struct QueryEngine<'o> {
    ontology: &'o dyn Ontology,
    options: EvaluationOptions,
}

impl<'o> QueryEngine<'o> {
    pub fn new(ontology: &'o dyn Ontology) -> Self {
        Self::with_options(ontology, EvaluationOptions::default())
    }

    pub fn with_options(ontology: &'o dyn Ontology, options: EvaluationOptions) -> Self {
        Self { ontology, options }
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Parse and run a query.
    pub fn run_text(&self, text: &str) -> Result<QueryResult, Error> {
        self.run(&parse_query(text)?)
    }

    pub fn run(&self, query: &Query) -> Result<QueryResult, Error> {
        let prep = Preparer { ontology: self.ontology, options: &self.options };
        let antecedent = prep.clause(query.antecedent(), false)?;
        let construction = query
            .construction()
            .map(|atoms| prep.clause(&construction_order(atoms), true))
            .transpose()?;
        let consumption = query.consumption().map(|atoms| prep.clause(atoms, false)).transpose()?;

        let mut state = EvaluationState::new();
        let mut search = Search::new(self.ontology, &self.options, &mut state, Phase::Antecedent);
        search.run(&antecedent, Bindings::new())?;
        let mut envs = search.found;
        tracing::debug!(matches = envs.len(), "antecedent matched");

        if let (Some(goals), Some(atoms)) = (construction, query.construction()) {
            let mut search = Search::new(self.ontology, &self.options, &mut state, Phase::Construction);
            for env in envs {
                search.run(&goals, env)?;
            }
            tracing::debug!(matches = search.matched, "collections constructed");
            let sealed = state.collections.seal()?;
            envs = consumption_environments(&sealed, &declared_collections(atoms), &grouped_collections(atoms))?;
            tracing::debug!(groups = envs.len(), "collections sealed into groups");

            if let Some(goals) = consumption {
                let mut search = Search::new(self.ontology, &self.options, &mut state, Phase::Consumption);
                for env in envs {
                    search.run(&goals, env)?;
                }
                envs = search.found;
                tracing::debug!(matches = envs.len(), "collections consumed");
            }
        }

        let result = assemble(&query.head, envs, &self.options)?;
        tracing::debug!(rows = result.row_count(), "query evaluated");
        Ok(result)
    }
}

/// Outcome of [`RuleEngine::infer`].
#[derive(Debug, Clone, Default)]
pub struct InferenceReport {
    /// Rounds run, including the final one that found nothing new.
    pub iterations: usize,
    /// New axioms in the order they were added.
    pub inferred: Vec<Axiom>,
    /// `false` when the iteration bound stopped inference early.
    pub reached_fixpoint: bool,
    /// Binding-time errors that abandoned individual rule matches.
    pub abandoned: Vec<Error>,
}

/// Forward-chains SWRL rules into a [`MemoryOntology`].
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    options: EvaluationOptions,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EvaluationOptions) -> Self {
        Self { options }
    }

    /// Fire every rule once per match and add the instantiated head atoms,
    /// repeating until nothing new appears or the iteration bound is hit.
    pub fn infer(&self, ontology: &mut MemoryOntology, rules: &[Rule]) -> Result<InferenceReport, Error> {
        for rule in rules {
            if let Some(atom) = rule.head.iter().find(|a| a.built_in_name().is_some()) {
                return Err(syntax(format!("built-in {atom} cannot appear in a rule head")));
            }
        }
        // Shared across rounds so minted individuals stay stable.
        let mut state = EvaluationState::new();
        let mut report = InferenceReport::default();

        while report.iterations < self.options.max_rule_iterations {
            report.iterations += 1;
            let mut fresh: Vec<Axiom> = Vec::new();
            for rule in rules {
                let prep = Preparer { ontology: &*ontology, options: &self.options };
                let goals = prep.clause(&rule.body, false)?;
                let mut search = Search::new(&*ontology, &self.options, &mut state, Phase::Rule);
                search.run(&goals, Bindings::new())?;
                report.abandoned.append(&mut search.abandoned);
                for env in &search.found {
                    for atom in &rule.head {
                        for axiom in instantiate(atom, env)? {
                            if !ontology.contains(&axiom) && !fresh.contains(&axiom) {
                                fresh.push(axiom);
                            }
                        }
                    }
                }
            }
            tracing::debug!(iteration = report.iterations, inferred = fresh.len(), "rule round finished");
            if fresh.is_empty() {
                report.reached_fixpoint = true;
                return Ok(report);
            }
            for axiom in fresh {
                ontology.add(axiom.clone());
                report.inferred.push(axiom);
            }
        }
        tracing::warn!(
            iterations = report.iterations,
            "rule inference stopped at the iteration bound before reaching a fixpoint"
        );
        Ok(report)
    }
}

fn bound_value(term: &Term, env: &Bindings) -> Result<Value, Error> {
    match term {
        Term::Variable(v) => env.get(v).cloned().ok_or_else(|| {
            Error::from_code(ErrorCode::UnboundVariable, format!("head variable {v} is not bound by the body"))
        }),
        Term::Literal(l) => Ok(Value::Literal(l.clone())),
        Term::Name(n) => Ok(Value::Entity(Entity::individual(n.clone()))),
    }
}

fn individual_name(value: &Value, atom: &Atom) -> Result<CompactString, Error> {
    match value {
        Value::Entity(e) => Ok(e.name.clone()),
        other => Err(Error::type_error(format!(
            "head atom {atom} needs an individual, got {}",
            other.kind_name()
        ))),
    }
}

/// Axioms asserted by one head atom under `env`, plus a declaration for
/// every minted individual it mentions.
fn instantiate(atom: &Atom, env: &Bindings) -> Result<Vec<Axiom>, Error> {
    let mut axioms = Vec::with_capacity(1);
    let mut mentioned = Vec::new();
    match atom {
        Atom::Class { class, arg } => {
            let individual = individual_name(&bound_value(arg, env)?, atom)?;
            mentioned.push(individual.clone());
            axioms.push(Axiom::ClassAssertion { class: class.clone(), individual });
        }
        Atom::Property { property, subject, object } => {
            let subject = individual_name(&bound_value(subject, env)?, atom)?;
            mentioned.push(subject.clone());
            match bound_value(object, env)? {
                Value::Literal(value) => axioms.push(Axiom::DataPropertyAssertion {
                    property: property.clone(),
                    subject,
                    value,
                }),
                other => {
                    let object = individual_name(&other, atom)?;
                    mentioned.push(object.clone());
                    axioms.push(Axiom::ObjectPropertyAssertion { property: property.clone(), subject, object });
                }
            }
        }
        Atom::SameAs(a, b) | Atom::DifferentFrom(a, b) => {
            let a = individual_name(&bound_value(a, env)?, atom)?;
            let b = individual_name(&bound_value(b, env)?, atom)?;
            mentioned.extend([a.clone(), b.clone()]);
            axioms.push(if matches!(atom, Atom::SameAs(..)) {
                Axiom::SameIndividual(a, b)
            } else {
                Axiom::DifferentIndividuals(a, b)
            });
        }
        Atom::BuiltIn { .. } => return Err(syntax(format!("built-in {atom} cannot appear in a rule head"))),
    }
    for name in mentioned.into_iter().filter(|n| n.starts_with(MINTED_PREFIX)) {
        axioms.push(Axiom::Declaration(Entity::individual(name)));
    }
    Ok(axioms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_rule;
    use rstest::rstest;

    #[rstest]
    fn construction_atoms_move_to_the_end_in_order() {
        let q = parse_query(
            "A(?p) ˚ sqwrl:groupBy(?s, ?p) ^ sqwrl:makeBag(?s, ?p) ^ swrlb:equal(?p, ?p) -> sqwrl:select(?p)",
        )
        .unwrap();
        let ordered = construction_order(q.construction().unwrap());
        let names: Vec<String> = ordered.iter().map(|a| a.built_in_name().unwrap().to_string()).collect();
        assert_eq!(names, ["swrlb:equal", "sqwrl:makeBag", "sqwrl:groupBy"]);
    }

    #[rstest]
    #[case(Phase::Construction, 0)]
    #[case(Phase::Antecedent, 2)]
    fn construction_search_only_counts_matches(#[case] phase: Phase, #[case] kept: usize) {
        let onto = MemoryOntology::new();
        let options = EvaluationOptions::default();
        let mut state = EvaluationState::new();
        let mut search = Search::new(&onto, &options, &mut state, phase);
        search.run(&[], Bindings::new()).unwrap();
        search.run(&[], Bindings::new()).unwrap();
        assert_eq!(search.matched, 2);
        assert_eq!(search.found.len(), kept);
    }

    #[rstest]
    fn minted_individuals_are_declared() {
        let rule = parse_rule("A(?x) -> B(?x)").unwrap();
        let env: Bindings =
            [(Variable::new("x"), Value::Entity(Entity::individual(format!("{MINTED_PREFIX}1"))))]
                .into_iter()
                .collect();
        let axioms = instantiate(&rule.head[0], &env).unwrap();
        assert_eq!(axioms.len(), 2);
        assert!(matches!(axioms[1], Axiom::Declaration(_)));
    }

    #[rstest]
    fn unbound_head_variable_is_reported() {
        let rule = parse_rule("A(?x) -> B(?y)").unwrap();
        let err = instantiate(&rule.head[0], &Bindings::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnboundVariable);
    }
}
