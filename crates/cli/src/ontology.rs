//! JSON ontology documents.
//!
//! ```json
//! {
//!   "axioms": [
//!     { "type": "classAssertion", "class": "Person", "individual": "p1" },
//!     { "type": "dataPropertyAssertion", "property": "hasAge", "subject": "p1",
//!       "value": "20", "datatype": "xsd:byte" },
//!     { "type": "subClassOf", "sub": "Student", "sup": "Person" }
//!   ]
//! }
//! ```
//!
//! Data values may also be plain JSON numbers or booleans, typed the way a
//! bare token in rule text is typed.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use sqwrl::{Axiom, Datatype, Entity, EntityKind, Literal, MemoryOntology, Ontology};
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct OntologyDocument {
    #[serde(default)]
    pub axioms: Vec<AxiomDoc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KindDoc {
    Class,
    NamedIndividual,
    ObjectProperty,
    DataProperty,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AxiomDoc {
    Declaration { kind: KindDoc, name: String },
    ClassAssertion { class: String, individual: String },
    ObjectPropertyAssertion { property: String, subject: String, object: String },
    DataPropertyAssertion {
        property: String,
        subject: String,
        value: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
    SameIndividual { a: String, b: String },
    DifferentIndividuals { a: String, b: String },
    SubClassOf { sub: String, sup: String },
    EquivalentClasses { a: String, b: String },
    DisjointClasses { a: String, b: String },
    SubObjectPropertyOf { sub: String, sup: String },
    SubDataPropertyOf { sub: String, sup: String },
    FunctionalObjectProperty { property: String },
    TransitiveObjectProperty { property: String },
    SymmetricObjectProperty { property: String },
}

impl From<KindDoc> for EntityKind {
    fn from(kind: KindDoc) -> Self {
        match kind {
            KindDoc::Class => EntityKind::Class,
            KindDoc::NamedIndividual => EntityKind::NamedIndividual,
            KindDoc::ObjectProperty => EntityKind::ObjectProperty,
            KindDoc::DataProperty => EntityKind::DataProperty,
        }
    }
}

impl From<EntityKind> for KindDoc {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Class => KindDoc::Class,
            EntityKind::ObjectProperty => KindDoc::ObjectProperty,
            EntityKind::DataProperty => KindDoc::DataProperty,
            _ => KindDoc::NamedIndividual,
        }
    }
}

fn data_value(value: &serde_json::Value, datatype: Option<&str>) -> anyhow::Result<Literal> {
    let literal = match (value, datatype) {
        (serde_json::Value::String(text), Some(dt)) => {
            let dt = Datatype::from_short_name(dt).with_context(|| format!("unknown datatype {dt}"))?;
            Literal::parse(text, dt)?
        }
        (serde_json::Value::String(text), None) => Literal::string(text.as_str()),
        (serde_json::Value::Bool(b), None) => Literal::Boolean(*b),
        (serde_json::Value::Number(n), None) => Literal::infer(&n.to_string())?,
        (other, Some(dt)) => bail!("a value with datatype {dt} must be a JSON string, got {other}"),
        (other, None) => bail!("unsupported data value {other}"),
    };
    Ok(literal)
}

impl AxiomDoc {
    pub fn to_axiom(&self) -> anyhow::Result<Axiom> {
        Ok(match self {
            AxiomDoc::Declaration { kind, name } => Axiom::Declaration(Entity::new((*kind).into(), name.as_str())),
            AxiomDoc::ClassAssertion { class, individual } => {
                Axiom::ClassAssertion { class: class.as_str().into(), individual: individual.as_str().into() }
            }
            AxiomDoc::ObjectPropertyAssertion { property, subject, object } => Axiom::ObjectPropertyAssertion {
                property: property.as_str().into(),
                subject: subject.as_str().into(),
                object: object.as_str().into(),
            },
            AxiomDoc::DataPropertyAssertion { property, subject, value, datatype } => {
                let value = data_value(value, datatype.as_deref())
                    .with_context(|| format!("data value of {property}({subject}, ...)"))?;
                Axiom::DataPropertyAssertion { property: property.as_str().into(), subject: subject.as_str().into(), value }
            }
            AxiomDoc::SameIndividual { a, b } => Axiom::SameIndividual(a.as_str().into(), b.as_str().into()),
            AxiomDoc::DifferentIndividuals { a, b } => Axiom::DifferentIndividuals(a.as_str().into(), b.as_str().into()),
            AxiomDoc::SubClassOf { sub, sup } => Axiom::SubClassOf { sub: sub.as_str().into(), sup: sup.as_str().into() },
            AxiomDoc::EquivalentClasses { a, b } => Axiom::EquivalentClasses(a.as_str().into(), b.as_str().into()),
            AxiomDoc::DisjointClasses { a, b } => Axiom::DisjointClasses(a.as_str().into(), b.as_str().into()),
            AxiomDoc::SubObjectPropertyOf { sub, sup } => {
                Axiom::SubObjectPropertyOf { sub: sub.as_str().into(), sup: sup.as_str().into() }
            }
            AxiomDoc::SubDataPropertyOf { sub, sup } => Axiom::SubDataPropertyOf { sub: sub.as_str().into(), sup: sup.as_str().into() },
            AxiomDoc::FunctionalObjectProperty { property } => Axiom::FunctionalObjectProperty(property.as_str().into()),
            AxiomDoc::TransitiveObjectProperty { property } => Axiom::TransitiveObjectProperty(property.as_str().into()),
            AxiomDoc::SymmetricObjectProperty { property } => Axiom::SymmetricObjectProperty(property.as_str().into()),
        })
    }
}

impl From<&Axiom> for AxiomDoc {
    fn from(axiom: &Axiom) -> Self {
        fn s(name: &str) -> String {
            name.to_owned()
        }
        match axiom {
            Axiom::Declaration(e) => AxiomDoc::Declaration { kind: e.kind.into(), name: e.name.to_string() },
            Axiom::ClassAssertion { class, individual } => {
                AxiomDoc::ClassAssertion { class: s(class), individual: s(individual) }
            }
            Axiom::ObjectPropertyAssertion { property, subject, object } => AxiomDoc::ObjectPropertyAssertion {
                property: s(property),
                subject: s(subject),
                object: s(object),
            },
            Axiom::DataPropertyAssertion { property, subject, value } => AxiomDoc::DataPropertyAssertion {
                property: s(property),
                subject: s(subject),
                value: serde_json::Value::String(value.lexical()),
                datatype: Some(value.datatype().to_string()),
            },
            Axiom::SameIndividual(a, b) => AxiomDoc::SameIndividual { a: s(a), b: s(b) },
            Axiom::DifferentIndividuals(a, b) => AxiomDoc::DifferentIndividuals { a: s(a), b: s(b) },
            Axiom::SubClassOf { sub, sup } => AxiomDoc::SubClassOf { sub: s(sub), sup: s(sup) },
            Axiom::EquivalentClasses(a, b) => AxiomDoc::EquivalentClasses { a: s(a), b: s(b) },
            Axiom::DisjointClasses(a, b) => AxiomDoc::DisjointClasses { a: s(a), b: s(b) },
            Axiom::SubObjectPropertyOf { sub, sup } => AxiomDoc::SubObjectPropertyOf { sub: s(sub), sup: s(sup) },
            Axiom::SubDataPropertyOf { sub, sup } => AxiomDoc::SubDataPropertyOf { sub: s(sub), sup: s(sup) },
            Axiom::FunctionalObjectProperty(p) => AxiomDoc::FunctionalObjectProperty { property: s(p) },
            Axiom::TransitiveObjectProperty(p) => AxiomDoc::TransitiveObjectProperty { property: s(p) },
            Axiom::SymmetricObjectProperty(p) => AxiomDoc::SymmetricObjectProperty { property: s(p) },
        }
    }
}

impl OntologyDocument {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_ontology(&self) -> anyhow::Result<MemoryOntology> {
        let mut ontology = MemoryOntology::new();
        for (i, doc) in self.axioms.iter().enumerate() {
            ontology.add(doc.to_axiom().with_context(|| format!("axiom #{}", i + 1))?);
        }
        Ok(ontology)
    }

    pub fn from_ontology(ontology: &MemoryOntology) -> Self {
        Self { axioms: ontology.axioms().map(AxiomDoc::from).collect() }
    }
}

/// Read and convert an ontology file.
pub fn load(path: &Path) -> anyhow::Result<MemoryOntology> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read ontology {}", path.display()))?;
    let ontology = OntologyDocument::from_json(&text)
        .and_then(|doc| doc.to_ontology())
        .with_context(|| format!("invalid ontology {}", path.display()))?;
    tracing::debug!(axioms = ontology.len(), path = %path.display(), "ontology loaded");
    Ok(ontology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn data_values_are_typed() {
        let doc = OntologyDocument::from_json(
            r#"{"axioms": [
                {"type": "dataPropertyAssertion", "property": "hasAge", "subject": "p1", "value": "20", "datatype": "xsd:byte"},
                {"type": "dataPropertyAssertion", "property": "hasScore", "subject": "p1", "value": 7},
                {"type": "dataPropertyAssertion", "property": "active", "subject": "p1", "value": true}
            ]}"#,
        )
        .unwrap();
        let values: Vec<Literal> = doc
            .to_ontology()
            .unwrap()
            .axioms()
            .filter_map(|a| match a {
                Axiom::DataPropertyAssertion { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(values, [Literal::Byte(20), Literal::Int(7), Literal::Boolean(true)]);
    }

    #[rstest]
    #[case(r#"{"type": "dataPropertyAssertion", "property": "p", "subject": "s", "value": "x", "datatype": "xsd:int"}"#)]
    #[case(r#"{"type": "dataPropertyAssertion", "property": "p", "subject": "s", "value": 1, "datatype": "xsd:int"}"#)]
    #[case(r#"{"type": "dataPropertyAssertion", "property": "p", "subject": "s", "value": "1", "datatype": "xsd:nope"}"#)]
    fn bad_data_values_are_rejected(#[case] axiom: &str) {
        let doc = OntologyDocument::from_json(&format!(r#"{{"axioms": [{axiom}]}}"#)).unwrap();
        assert!(doc.to_ontology().is_err());
    }

    #[rstest]
    fn documents_survive_a_round_trip() {
        let doc = OntologyDocument::from_json(
            r#"{"axioms": [
                {"type": "classAssertion", "class": "Person", "individual": "p1"},
                {"type": "subClassOf", "sub": "Student", "sup": "Person"},
                {"type": "dataPropertyAssertion", "property": "hasAge", "subject": "p1", "value": "20", "datatype": "xsd:byte"}
            ]}"#,
        )
        .unwrap();
        let ontology = doc.to_ontology().unwrap();
        let again = OntologyDocument::from_ontology(&ontology).to_ontology().unwrap();
        assert_eq!(again.axioms().collect::<Vec<_>>(), ontology.axioms().collect::<Vec<_>>());
    }
}
