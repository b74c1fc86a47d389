pub mod consts;
pub mod engine;
pub mod literal;
pub mod model;
pub mod parser;

pub use engine::builtins::default_registry;
pub use engine::collections::{Collection, CollectionKind};
pub use engine::evaluator::{InferenceReport, QueryEngine, RuleEngine};
pub use engine::options::{EvaluationOptions, EvaluationOptionsBuilder, shared_registry};
pub use engine::results::{ColumnRef, QueryResult, ResultValue};
pub use engine::runtime::{BuiltInRegistry, Error, ErrorCode, ErrorKind, FancyRegexProvider, RegexProvider};
pub use literal::{Datatype, Duration, Granularity, Literal};
pub use model::{Axiom, BuiltInName, Entity, EntityKind, Library, MemoryOntology, Ontology, Value, Variable};
pub use parser::ast::{Atom, Query, Rule, Term};
pub use parser::{parse_query, parse_rule};
