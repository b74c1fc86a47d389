//! Evaluation: the built-in registry and argument protocol, the collection
//! engine, the matching driver and the result assembler.

pub mod aggregate;
pub mod arguments;
pub mod bindings;
pub mod builtins;
pub mod collections;
pub mod evaluator;
pub mod options;
pub mod results;
pub mod runtime;
