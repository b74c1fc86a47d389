use crate::model::{Value, Variable};
use std::collections::HashMap;

/// One binding environment: the values fixed for variables by one match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<Variable, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &Variable) -> Option<&Value> {
        self.values.get(var)
    }

    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.values.get(&Variable::new(name))
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }

    /// Bind `var`, returning the value it previously had.
    pub fn bind(&mut self, var: Variable, value: Value) -> Option<Value> {
        self.values.insert(var, value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Value)> {
        self.values.iter()
    }
}

impl FromIterator<(Variable, Value)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (Variable, Value)>>(iter: T) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
