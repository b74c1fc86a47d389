//! Bags and sets built during the construction clause of a query and read
//! during the consumption clause.
//!
//! A [`CollectionStore`] lives for exactly one evaluation. `make*` calls
//! append entries per match; `groupBy` tags the entries of the current match
//! with a key. [`CollectionStore::seal`] then partitions every collection by
//! key, after which the store refuses further inserts.

use super::bindings::Bindings;
use super::runtime::{Error, ErrorCode};
use crate::model::{Value, Variable};
use compact_str::CompactString;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Bag,
    Set,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollectionKind::Bag => "bag",
            CollectionKind::Set => "set",
        })
    }
}

/// An immutable bag or set of values in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Collection {
    name: CompactString,
    kind: CollectionKind,
    elements: Vec<Value>,
}

impl Collection {
    pub fn new(name: &str, kind: CollectionKind) -> Self {
        Self { name: CompactString::from(name), kind, elements: Vec::new() }
    }

    pub fn from_values(name: &str, kind: CollectionKind, values: impl IntoIterator<Item = Value>) -> Self {
        let mut c = Self::new(name, kind);
        for v in values {
            c.push(v);
        }
        c
    }

    /// Sets ignore values already present.
    pub(crate) fn push(&mut self, value: Value) {
        if self.kind == CollectionKind::Set && self.elements.contains(&value) {
            return;
        }
        self.elements.push(value);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains_value(&self, value: &Value) -> bool {
        self.elements.iter().any(|e| e.value_eq(value))
    }

    /// Set equality for two sets, multiset equality otherwise. Construction
    /// order never matters.
    pub fn same_contents(&self, other: &Collection) -> bool {
        if self.kind == CollectionKind::Set && other.kind == CollectionKind::Set {
            return self.len() == other.len() && self.elements.iter().all(|e| other.elements.contains(e));
        }
        if self.len() != other.len() {
            return false;
        }
        let mut counts: HashMap<&Value, isize> = HashMap::new();
        for e in &self.elements {
            *counts.entry(e).or_default() += 1;
        }
        for e in &other.elements {
            *counts.entry(e).or_default() -= 1;
        }
        counts.values().all(|&n| n == 0)
    }

    /// Elements in the order used by `first`/`last`/`nth`: sorted by value
    /// when every element is a literal, insertion order otherwise.
    pub fn positional_order(&self) -> Vec<&Value> {
        let mut ordered: Vec<&Value> = self.elements.iter().collect();
        if ordered.iter().all(|v| v.as_literal().is_some()) {
            let mut failed = false;
            ordered.sort_by(|a, b| {
                a.compare(b).unwrap_or_else(|_| {
                    failed = true;
                    std::cmp::Ordering::Equal
                })
            });
            if failed {
                return self.elements.iter().collect();
            }
        }
        ordered
    }

    pub fn intersection(&self, other: &Collection, name: &str) -> Collection {
        Collection::from_values(
            name,
            self.kind,
            self.elements.iter().filter(|e| other.elements.contains(e)).cloned(),
        )
    }

    pub fn union(&self, other: &Collection, name: &str) -> Collection {
        Collection::from_values(
            name,
            self.kind,
            self.elements.iter().chain(other.elements.iter()).cloned(),
        )
    }

    pub fn difference(&self, other: &Collection, name: &str) -> Collection {
        Collection::from_values(
            name,
            self.kind,
            self.elements.iter().filter(|e| !other.elements.contains(e)).cloned(),
        )
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.kind {
            CollectionKind::Bag => ('[', ']'),
            CollectionKind::Set => ('{', '}'),
        };
        write!(f, "{open}")?;
        for (i, e) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, "{close}")
    }
}

pub type GroupKey = Vec<Value>;

#[derive(Debug)]
struct Builder {
    name: CompactString,
    kind: CollectionKind,
    entries: Vec<(Value, Option<GroupKey>)>,
    group_vars: Option<Vec<Variable>>,
}

/// A collection after construction, split into one partition per group key
/// (a single partition with an empty key when ungrouped).
#[derive(Debug, Clone)]
pub struct SealedCollection {
    pub name: CompactString,
    pub kind: CollectionKind,
    pub group_vars: Vec<Variable>,
    pub partitions: Vec<(GroupKey, Arc<Collection>)>,
}

#[derive(Debug, Default)]
pub struct CollectionStore {
    // First-creation order; collections per query are few.
    builders: Vec<Builder>,
    sealed: bool,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.iter().any(|b| b.name == name)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Append `element` to the collection `name`, creating it on first use.
    pub fn insert(&mut self, name: &str, kind: CollectionKind, element: Value) -> Result<(), Error> {
        if self.sealed {
            return Err(Error::from_code(
                ErrorCode::CollectionType,
                format!("collection {name} cannot be extended after construction has finished"),
            ));
        }
        let builder = match self.builders.iter_mut().position(|b| b.name == name) {
            Some(i) => &mut self.builders[i],
            None => {
                self.builders.push(Builder {
                    name: CompactString::from(name),
                    kind,
                    entries: Vec::new(),
                    group_vars: None,
                });
                let last = self.builders.len() - 1;
                &mut self.builders[last]
            }
        };
        if builder.kind != kind {
            return Err(Error::from_code(
                ErrorCode::CollectionType,
                format!("collection {name} was created as a {} and cannot be extended as a {kind}", builder.kind),
            ));
        }
        builder.entries.push((element, None));
        Ok(())
    }

    /// Assign `key` to every entry of `name` added since the last grouping.
    pub fn group_pending(&mut self, name: &str, vars: Vec<Variable>, key: GroupKey) -> Result<(), Error> {
        let Some(builder) = self.builders.iter_mut().find(|b| b.name == name) else {
            return Err(Error::from_code(
                ErrorCode::GroupBy,
                format!("groupBy applied to undefined collection {name}"),
            ));
        };
        match &builder.group_vars {
            Some(existing) if *existing != vars => {
                return Err(Error::from_code(
                    ErrorCode::GroupBy,
                    format!("collection {name} is grouped by inconsistent arguments"),
                ));
            }
            Some(_) => {}
            None => builder.group_vars = Some(vars),
        }
        for (_, group) in builder.entries.iter_mut().rev() {
            if group.is_some() {
                break;
            }
            *group = Some(key.clone());
        }
        Ok(())
    }

    /// Finish construction and partition every collection by group key.
    pub fn seal(&mut self) -> Result<Vec<SealedCollection>, Error> {
        self.sealed = true;
        let mut out = Vec::with_capacity(self.builders.len());
        for builder in &self.builders {
            let mut partitions: Vec<(GroupKey, Collection)> = Vec::new();
            for (value, group) in &builder.entries {
                let key = match (&builder.group_vars, group) {
                    (None, _) => GroupKey::new(),
                    (Some(_), Some(key)) => key.clone(),
                    (Some(_), None) => {
                        return Err(Error::from_code(
                            ErrorCode::GroupBy,
                            format!("collection {} has elements outside any group", builder.name),
                        ));
                    }
                };
                match partitions.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, c)) => c.push(value.clone()),
                    None => {
                        let mut c = Collection::new(&builder.name, builder.kind);
                        c.push(value.clone());
                        partitions.push((key, c));
                    }
                }
            }
            out.push(SealedCollection {
                name: builder.name.clone(),
                kind: builder.kind,
                group_vars: builder.group_vars.clone().unwrap_or_default(),
                partitions: partitions.into_iter().map(|(k, c)| (k, Arc::new(c))).collect(),
            });
        }
        tracing::debug!(collections = out.len(), "collections sealed");
        Ok(out)
    }
}

/// Binding environments for the consumption clause: one per group key (or a
/// single one when nothing is grouped), binding the group variables and
/// every declared collection variable. Collections without elements for a
/// key are bound empty.
///
/// `grouped_names` lists the collections the query groups. When none of them
/// received a group key there are no groups, hence no environments.
pub fn consumption_environments(
    sealed: &[SealedCollection],
    declared: &[(Variable, CollectionKind)],
    grouped_names: &[Variable],
) -> Result<Vec<Bindings>, Error> {
    let grouped: Vec<&SealedCollection> = sealed.iter().filter(|s| !s.group_vars.is_empty()).collect();
    if let Some(first) = grouped.first()
        && let Some(other) = grouped.iter().find(|s| s.group_vars != first.group_vars)
    {
        return Err(Error::from_code(
            ErrorCode::GroupBy,
            format!(
                "collections {} and {} are grouped by different variables",
                first.name, other.name
            ),
        ));
    }

    let bind_for_key = |key: &GroupKey, env: &mut Bindings| {
        for (var, kind) in declared {
            let found = sealed.iter().find(|s| s.name == var.name());
            let collection = match found {
                Some(s) if s.group_vars.is_empty() => s.partitions.first().map(|(_, c)| Arc::clone(c)),
                Some(s) => s.partitions.iter().find(|(k, _)| k == key).map(|(_, c)| Arc::clone(c)),
                None => None,
            };
            let collection = collection.unwrap_or_else(|| Arc::new(Collection::new(var.name(), *kind)));
            env.bind(var.clone(), Value::Collection(collection));
        }
    };

    let Some(first) = grouped.first() else {
        if !grouped_names.is_empty() {
            return Ok(Vec::new());
        }
        let mut env = Bindings::new();
        bind_for_key(&GroupKey::new(), &mut env);
        return Ok(vec![env]);
    };

    let mut keys: Vec<&GroupKey> = Vec::new();
    for s in &grouped {
        for (key, _) in &s.partitions {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    let mut envs = Vec::with_capacity(keys.len());
    for key in keys {
        let mut env: Bindings = first.group_vars.iter().cloned().zip(key.iter().cloned()).collect();
        bind_for_key(key, &mut env);
        envs.push(env);
    }
    Ok(envs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;
    use rstest::rstest;

    fn s(v: &str) -> Value {
        Value::Literal(Literal::string(v))
    }

    #[rstest]
    #[case(CollectionKind::Set, 2)]
    #[case(CollectionKind::Bag, 3)]
    fn set_dedups_bag_keeps(#[case] kind: CollectionKind, #[case] size: usize) {
        let mut store = CollectionStore::new();
        for v in ["A", "A", "B"] {
            store.insert("s", kind, s(v)).unwrap();
        }
        let sealed = store.seal().unwrap();
        assert_eq!(sealed[0].partitions[0].1.len(), size);
    }

    #[rstest]
    fn bag_equality_ignores_order() {
        let a = Collection::from_values("a", CollectionKind::Bag, [s("x"), s("y"), s("x")]);
        let b = Collection::from_values("b", CollectionKind::Bag, [s("y"), s("x"), s("x")]);
        let c = Collection::from_values("c", CollectionKind::Bag, [s("y"), s("y"), s("x")]);
        assert!(a.same_contents(&b));
        assert!(!a.same_contents(&c));
    }

    #[rstest]
    fn mixing_kinds_under_one_name_fails() {
        let mut store = CollectionStore::new();
        store.insert("s", CollectionKind::Bag, s("A")).unwrap();
        let err = store.insert("s", CollectionKind::Set, s("B")).unwrap_err();
        assert_eq!(err.code, ErrorCode::CollectionType);
    }

    #[rstest]
    fn grouping_partitions_in_first_seen_order() {
        let p = Variable::new("p");
        let mut store = CollectionStore::new();
        for (person, alias) in [("p1", "Bob"), ("p2", "Fred"), ("p2", "Freddy")] {
            store.insert("s", CollectionKind::Bag, s(alias)).unwrap();
            store.group_pending("s", vec![p.clone()], vec![s(person)]).unwrap();
        }
        let sealed = store.seal().unwrap();
        let envs = consumption_environments(&sealed, &[(Variable::new("s"), CollectionKind::Bag)], &[Variable::new("s")])
            .unwrap();
        assert_eq!(envs.len(), 2);
        let sizes: Vec<usize> = envs
            .iter()
            .map(|e| e.get_named("s").and_then(Value::as_collection).map_or(0, |c| c.len()))
            .collect();
        assert_eq!(sizes, vec![1, 2]);
        assert_eq!(envs[1].get(&p), Some(&s("p2")));
    }

    #[rstest]
    fn grouped_collection_without_groups_has_no_environments() {
        let mut store = CollectionStore::new();
        let sealed = store.seal().unwrap();
        let s = Variable::new("s");
        let declared = [(s.clone(), CollectionKind::Bag)];
        assert!(consumption_environments(&sealed, &declared, &[s]).unwrap().is_empty());
        assert_eq!(consumption_environments(&sealed, &declared, &[]).unwrap().len(), 1);
    }

    #[rstest]
    fn sealed_store_rejects_inserts() {
        let mut store = CollectionStore::new();
        store.seal().unwrap();
        assert!(store.insert("s", CollectionKind::Bag, s("A")).is_err());
    }

    #[rstest]
    fn positional_order_sorts_literals_only() {
        let lits = Collection::from_values(
            "a",
            CollectionKind::Bag,
            [Value::Literal(Literal::Int(3)), Value::Literal(Literal::Int(1))],
        );
        assert_eq!(lits.positional_order()[0], &Value::Literal(Literal::Int(1)));
        let ents = Collection::from_values(
            "b",
            CollectionKind::Bag,
            [
                Value::Entity(crate::model::Entity::individual("z")),
                Value::Entity(crate::model::Entity::individual("a")),
            ],
        );
        assert_eq!(ents.positional_order()[0].to_string(), "z");
    }
}
