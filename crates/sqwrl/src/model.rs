//! Ontology-side vocabulary: entities, axioms, values flowing through
//! bindings, and qualified built-in names.

use crate::consts;
use crate::engine::collections::Collection;
use crate::engine::runtime::Error;
use crate::literal::Literal;
use compact_str::CompactString;
use core::fmt;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Class,
    NamedIndividual,
    ObjectProperty,
    DataProperty,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Class => "class",
            EntityKind::NamedIndividual => "individual",
            EntityKind::ObjectProperty => "object property",
            EntityKind::DataProperty => "data property",
        })
    }
}

/// A named ontology entity referenced by its short name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub kind: EntityKind,
    pub name: CompactString,
}

impl Entity {
    pub fn new(kind: EntityKind, name: impl Into<CompactString>) -> Self {
        Self { kind, name: name.into() }
    }

    pub fn class(name: impl Into<CompactString>) -> Self {
        Self::new(EntityKind::Class, name)
    }

    pub fn individual(name: impl Into<CompactString>) -> Self {
        Self::new(EntityKind::NamedIndividual, name)
    }

    pub fn object_property(name: impl Into<CompactString>) -> Self {
        Self::new(EntityKind::ObjectProperty, name)
    }

    pub fn data_property(name: impl Into<CompactString>) -> Self {
        Self::new(EntityKind::DataProperty, name)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Ground facts and schema statements supplied by the ontology.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axiom {
    Declaration(Entity),
    ClassAssertion {
        class: CompactString,
        individual: CompactString,
    },
    ObjectPropertyAssertion {
        property: CompactString,
        subject: CompactString,
        object: CompactString,
    },
    DataPropertyAssertion {
        property: CompactString,
        subject: CompactString,
        value: Literal,
    },
    SameIndividual(CompactString, CompactString),
    DifferentIndividuals(CompactString, CompactString),
    SubClassOf {
        sub: CompactString,
        sup: CompactString,
    },
    EquivalentClasses(CompactString, CompactString),
    DisjointClasses(CompactString, CompactString),
    SubObjectPropertyOf {
        sub: CompactString,
        sup: CompactString,
    },
    SubDataPropertyOf {
        sub: CompactString,
        sup: CompactString,
    },
    FunctionalObjectProperty(CompactString),
    TransitiveObjectProperty(CompactString),
    SymmetricObjectProperty(CompactString),
}

impl Axiom {
    /// Entity kinds implied by the positions an axiom mentions names in.
    pub(crate) fn implied_kinds(&self) -> Vec<(&CompactString, EntityKind)> {
        use EntityKind::*;
        match self {
            Axiom::Declaration(e) => vec![(&e.name, e.kind)],
            Axiom::ClassAssertion { class, individual } => {
                vec![(class, Class), (individual, NamedIndividual)]
            }
            Axiom::ObjectPropertyAssertion { property, subject, object } => vec![
                (property, ObjectProperty),
                (subject, NamedIndividual),
                (object, NamedIndividual),
            ],
            Axiom::DataPropertyAssertion { property, subject, .. } => {
                vec![(property, DataProperty), (subject, NamedIndividual)]
            }
            Axiom::SameIndividual(a, b) | Axiom::DifferentIndividuals(a, b) => {
                vec![(a, NamedIndividual), (b, NamedIndividual)]
            }
            Axiom::SubClassOf { sub: a, sup: b }
            | Axiom::EquivalentClasses(a, b)
            | Axiom::DisjointClasses(a, b) => vec![(a, Class), (b, Class)],
            Axiom::SubObjectPropertyOf { sub, sup } => {
                vec![(sub, ObjectProperty), (sup, ObjectProperty)]
            }
            Axiom::SubDataPropertyOf { sub, sup } => vec![(sub, DataProperty), (sup, DataProperty)],
            Axiom::FunctionalObjectProperty(p)
            | Axiom::TransitiveObjectProperty(p)
            | Axiom::SymmetricObjectProperty(p) => vec![(p, ObjectProperty)],
        }
    }
}

/// Narrow read interface onto the fact base.
pub trait Ontology: Send + Sync {
    fn axioms(&self) -> Box<dyn Iterator<Item = &Axiom> + '_>;

    /// Kind of a short name, if the ontology knows it.
    fn entity_kind(&self, name: &str) -> Option<EntityKind>;

    fn contains(&self, axiom: &Axiom) -> bool {
        self.axioms().any(|a| a == axiom)
    }
}

/// In-memory ontology: axioms in insertion order plus a membership index.
#[derive(Debug, Clone, Default)]
pub struct MemoryOntology {
    axioms: Vec<Axiom>,
    index: HashSet<Axiom>,
    kinds: HashMap<CompactString, EntityKind>,
}

impl MemoryOntology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axiom; returns `false` if it was already present.
    pub fn add(&mut self, axiom: Axiom) -> bool {
        if self.index.contains(&axiom) {
            return false;
        }
        for (name, kind) in axiom.implied_kinds() {
            // Explicit declarations win over kinds implied by usage.
            let explicit = matches!(axiom, Axiom::Declaration(_));
            match self.kinds.get(name) {
                Some(_) if !explicit => {}
                _ => {
                    self.kinds.insert(name.clone(), kind);
                }
            }
        }
        self.index.insert(axiom.clone());
        self.axioms.push(axiom);
        true
    }

    pub fn declare(&mut self, entity: Entity) -> bool {
        self.add(Axiom::Declaration(entity))
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axiom> {
        self.axioms.iter()
    }
}

impl Extend<Axiom> for MemoryOntology {
    fn extend<T: IntoIterator<Item = Axiom>>(&mut self, iter: T) {
        for axiom in iter {
            self.add(axiom);
        }
    }
}

impl FromIterator<Axiom> for MemoryOntology {
    fn from_iter<T: IntoIterator<Item = Axiom>>(iter: T) -> Self {
        let mut ontology = MemoryOntology::new();
        ontology.extend(iter);
        ontology
    }
}

impl Ontology for MemoryOntology {
    fn axioms(&self) -> Box<dyn Iterator<Item = &Axiom> + '_> {
        Box::new(self.axioms.iter())
    }

    fn entity_kind(&self, name: &str) -> Option<EntityKind> {
        self.kinds.get(name).copied()
    }

    fn contains(&self, axiom: &Axiom) -> bool {
        self.index.contains(axiom)
    }
}

/// A rule/query variable. Stored without the leading `?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(CompactString);

impl Variable {
    pub fn new(name: &str) -> Self {
        Variable(CompactString::from(name.strip_prefix('?').unwrap_or(name)))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// Anything a variable can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Literal(Literal),
    Entity(Entity),
    Collection(Arc<Collection>),
}

impl Value {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Arc<Collection>> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Short description used in error messages and column checks.
    pub fn kind_name(&self) -> String {
        match self {
            Value::Literal(l) => l.datatype().to_string(),
            Value::Entity(e) => e.kind.to_string(),
            Value::Collection(c) => c.kind().to_string(),
        }
    }

    /// Literals order by value, entities by name; mixing the two, or
    /// ordering collections, is a type error.
    pub fn compare(&self, other: &Value) -> Result<Ordering, Error> {
        match (self, other) {
            (Value::Literal(a), Value::Literal(b)) => a.compare(b),
            (Value::Entity(a), Value::Entity(b)) => Ok(a.name.cmp(&b.name)),
            _ => Err(Error::type_error(format!(
                "cannot order {} against {}",
                self.kind_name(),
                other.kind_name()
            ))),
        }
    }

    pub fn value_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Literal(a), Value::Literal(b)) => a.value_eq(b),
            (Value::Entity(a), Value::Entity(b)) => a.name == b.name,
            (Value::Collection(a), Value::Collection(b)) => a.same_contents(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(l) => f.write_str(&l.render()),
            Value::Entity(e) => write!(f, "{e}"),
            Value::Collection(c) => write!(f, "{c}"),
        }
    }
}

impl From<Literal> for Value {
    fn from(l: Literal) -> Self {
        Value::Literal(l)
    }
}

impl From<Entity> for Value {
    fn from(e: Entity) -> Self {
        Value::Entity(e)
    }
}

impl From<Collection> for Value {
    fn from(c: Collection) -> Self {
        Value::Collection(Arc::new(c))
    }
}

/// Built-in libraries and their conventional prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Library {
    Swrlb,
    Swrlm,
    Swrlx,
    Sqwrl,
    Temporal,
    Abox,
    Tbox,
    Rbox,
}

impl Library {
    pub const ALL: [Library; 8] = [
        Library::Swrlb,
        Library::Swrlm,
        Library::Swrlx,
        Library::Sqwrl,
        Library::Temporal,
        Library::Abox,
        Library::Tbox,
        Library::Rbox,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Library::Swrlb => "swrlb",
            Library::Swrlm => "swrlm",
            Library::Swrlx => "swrlx",
            Library::Sqwrl => "sqwrl",
            Library::Temporal => "temporal",
            Library::Abox => "abox",
            Library::Tbox => "tbox",
            Library::Rbox => "rbox",
        }
    }

    pub fn iri(self) -> &'static str {
        match self {
            Library::Swrlb => consts::SWRLB,
            Library::Swrlm => consts::SWRLM,
            Library::Swrlx => consts::SWRLX,
            Library::Sqwrl => consts::SQWRL,
            Library::Temporal => consts::TEMPORAL,
            Library::Abox => consts::ABOX,
            Library::Tbox => consts::TBOX,
            Library::Rbox => consts::RBOX,
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.prefix() == prefix)
    }

    pub fn from_iri(iri: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.iri() == iri)
    }
}

/// Qualified built-in name, displayed as `prefix:local`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuiltInName {
    pub library: Library,
    pub local: CompactString,
}

impl BuiltInName {
    pub fn new(library: Library, local: &str) -> Self {
        Self { library, local: CompactString::from(local) }
    }

    /// Parse `prefix:local` or a full `iri#local`.
    pub fn parse(qualified: &str) -> Option<Self> {
        if let Some((ns, local)) = qualified.rsplit_once('#') {
            let library = Library::from_iri(&qualified[..ns.len() + 1])?;
            return Some(Self::new(library, local));
        }
        let (prefix, local) = qualified.split_once(':')?;
        Some(Self::new(Library::from_prefix(prefix)?, local))
    }

    pub fn is(&self, library: Library, local: &str) -> bool {
        self.library == library && self.local == local
    }
}

impl fmt::Display for BuiltInName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.library.prefix(), self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn usage_implies_kinds_until_declared() {
        let mut onto = MemoryOntology::new();
        onto.add(Axiom::ClassAssertion { class: "Person".into(), individual: "p1".into() });
        assert_eq!(onto.entity_kind("Person"), Some(EntityKind::Class));
        assert_eq!(onto.entity_kind("p1"), Some(EntityKind::NamedIndividual));
        onto.declare(Entity::class("p1"));
        assert_eq!(onto.entity_kind("p1"), Some(EntityKind::Class));
        assert!(!onto.add(Axiom::ClassAssertion { class: "Person".into(), individual: "p1".into() }));
        assert_eq!(onto.len(), 2);
    }

    #[rstest]
    #[case("swrlb:add", Some(BuiltInName::new(Library::Swrlb, "add")))]
    #[case("http://sqwrl.stanford.edu/ontologies/built-ins/3.4/sqwrl.owl#makeBag", Some(BuiltInName::new(Library::Sqwrl, "makeBag")))]
    #[case("foo:add", None)]
    fn builtin_names(#[case] text: &str, #[case] expected: Option<BuiltInName>) {
        assert_eq!(BuiltInName::parse(text), expected);
    }
}
