use super::builtins::default_registry;
use super::runtime::{BuiltInRegistry, FancyRegexProvider, RegexProvider};
use core::fmt;
use std::sync::{Arc, OnceLock};

pub const DEFAULT_MAX_RULE_ITERATIONS: usize = 64;

/// Process-wide default registry, built on first use and never mutated.
pub fn shared_registry() -> Arc<BuiltInRegistry> {
    static REGISTRY: OnceLock<Arc<BuiltInRegistry>> = OnceLock::new();
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(default_registry())))
}

/// Settings for one query or rule-set evaluation.
#[derive(Clone)]
pub struct EvaluationOptions {
    pub registry: Arc<BuiltInRegistry>,
    pub regex: Arc<dyn RegexProvider>,
    pub max_rule_iterations: usize,
    /// Upper bound on result rows, applied after `sqwrl:limit`.
    pub result_limit: Option<usize>,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            registry: shared_registry(),
            regex: Arc::new(FancyRegexProvider::default()),
            max_rule_iterations: DEFAULT_MAX_RULE_ITERATIONS,
            result_limit: None,
        }
    }
}

impl fmt::Debug for EvaluationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationOptions")
            .field("registry", &self.registry)
            .field("max_rule_iterations", &self.max_rule_iterations)
            .field("result_limit", &self.result_limit)
            .finish_non_exhaustive()
    }
}

pub struct EvaluationOptionsBuilder {
    options: EvaluationOptions,
}

impl Default for EvaluationOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationOptionsBuilder {
    pub fn new() -> Self {
        Self { options: EvaluationOptions::default() }
    }

    pub fn with_registry(mut self, registry: Arc<BuiltInRegistry>) -> Self {
        self.options.registry = registry;
        self
    }

    pub fn with_regex(mut self, provider: Arc<dyn RegexProvider>) -> Self {
        self.options.regex = provider;
        self
    }

    pub fn with_max_rule_iterations(mut self, iterations: usize) -> Self {
        self.options.max_rule_iterations = iterations;
        self
    }

    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.options.result_limit = Some(limit);
        self
    }

    pub fn build(self) -> EvaluationOptions {
        self.options
    }
}
