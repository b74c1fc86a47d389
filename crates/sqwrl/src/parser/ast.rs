//! Parsed rules and queries. `Display` writes the text form the parser
//! accepts, so rendering and re-parsing yields an equal value.

use crate::consts::CLAUSE_SEPARATOR;
use crate::literal::Literal;
use crate::model::{BuiltInName, Library, Variable};
use compact_str::CompactString;
use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Variable(Variable),
    Literal(Literal),
    /// Short or prefixed name of an ontology entity.
    Name(CompactString),
}

impl Term {
    pub fn variable(name: &str) -> Self {
        Term::Variable(Variable::new(name))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{v}"),
            Term::Literal(l) => f.write_str(&l.render()),
            Term::Name(n) => f.write_str(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Class { class: CompactString, arg: Term },
    Property { property: CompactString, subject: Term, object: Term },
    SameAs(Term, Term),
    DifferentFrom(Term, Term),
    BuiltIn { name: BuiltInName, args: Vec<Term> },
}

impl Atom {
    pub fn built_in(library: Library, local: &str, args: Vec<Term>) -> Self {
        Atom::BuiltIn { name: BuiltInName::new(library, local), args }
    }

    pub fn built_in_name(&self) -> Option<&BuiltInName> {
        match self {
            Atom::BuiltIn { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_built_in(&self, library: Library, local: &str) -> bool {
        self.built_in_name().is_some_and(|n| n.is(library, local))
    }

    pub fn terms(&self) -> Vec<&Term> {
        match self {
            Atom::Class { arg, .. } => vec![arg],
            Atom::Property { subject, object, .. } => vec![subject, object],
            Atom::SameAs(a, b) | Atom::DifferentFrom(a, b) => vec![a, b],
            Atom::BuiltIn { args, .. } => args.iter().collect(),
        }
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.terms().into_iter().filter_map(Term::as_variable)
    }
}

fn write_args<'a>(f: &mut fmt::Formatter<'_>, args: impl IntoIterator<Item = &'a Term>) -> fmt::Result {
    f.write_str("(")?;
    for (i, t) in args.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{t}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Class { class, arg } => {
                f.write_str(class)?;
                write_args(f, [arg])
            }
            Atom::Property { property, subject, object } => {
                f.write_str(property)?;
                write_args(f, [subject, object])
            }
            Atom::SameAs(a, b) => {
                f.write_str("sameAs")?;
                write_args(f, [a, b])
            }
            Atom::DifferentFrom(a, b) => {
                f.write_str("differentFrom")?;
                write_args(f, [a, b])
            }
            Atom::BuiltIn { name, args } => {
                write!(f, "{name}")?;
                write_args(f, args)
            }
        }
    }
}

fn write_conjunction(f: &mut fmt::Formatter<'_>, atoms: &[Atom]) -> fmt::Result {
    for (i, a) in atoms.iter().enumerate() {
        if i > 0 {
            f.write_str(" ^ ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

/// A SWRL rule: one body clause implying head atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub body: Vec<Atom>,
    pub head: Vec<Atom>,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_conjunction(f, &self.body)?;
        f.write_str(" -> ")?;
        write_conjunction(f, &self.head)
    }
}

/// A SQWRL query. The body has up to three clauses: the antecedent, the
/// collection construction clause and the collection consumption clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub clauses: Vec<Vec<Atom>>,
    pub head: Vec<Atom>,
}

impl Query {
    pub fn antecedent(&self) -> &[Atom] {
        self.clauses.first().map_or(&[][..], Vec::as_slice)
    }

    pub fn construction(&self) -> Option<&[Atom]> {
        self.clauses.get(1).map(Vec::as_slice)
    }

    pub fn consumption(&self) -> Option<&[Atom]> {
        self.clauses.get(2).map(Vec::as_slice)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " {CLAUSE_SEPARATOR} ")?;
            }
            write_conjunction(f, clause)?;
        }
        f.write_str(" -> ")?;
        write_conjunction(f, &self.head)
    }
}
