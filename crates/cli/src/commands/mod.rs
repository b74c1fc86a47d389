pub mod infer;
pub mod query;
