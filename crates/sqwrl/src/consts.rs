//! Namespace IRIs used by literals and built-in libraries.

/// XML Schema datatypes namespace.
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

pub const SWRLB: &str = "http://www.w3.org/2003/11/swrlb#";
pub const SWRLM: &str = "http://swrl.stanford.edu/ontologies/built-ins/3.4/swrlm.owl#";
pub const SWRLX: &str = "http://swrl.stanford.edu/ontologies/built-ins/3.3/swrlx.owl#";
pub const SQWRL: &str = "http://sqwrl.stanford.edu/ontologies/built-ins/3.4/sqwrl.owl#";
pub const TEMPORAL: &str = "http://swrl.stanford.edu/ontologies/built-ins/3.3/temporal.owl#";
pub const ABOX: &str = "http://swrl.stanford.edu/ontologies/built-ins/3.3/abox.owl#";
pub const TBOX: &str = "http://swrl.stanford.edu/ontologies/built-ins/3.3/tbox.owl#";
pub const RBOX: &str = "http://swrl.stanford.edu/ontologies/built-ins/3.3/rbox.owl#";

/// Separator between the antecedent, collection construction and collection
/// consumption clauses of a query body.
pub const CLAUSE_SEPARATOR: char = '\u{02DA}';

/// Prefix of individuals minted by `swrlx:makeOWLThing`.
pub const MINTED_PREFIX: &str = "_sqwrl_thing_";
