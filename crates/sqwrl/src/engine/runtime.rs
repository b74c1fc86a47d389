use crate::engine::arguments::{Invocation, OutputPolicy, Outcome};
use crate::engine::collections::CollectionStore;
use crate::model::{BuiltInName, Entity, Library, Ontology, Value};
use core::fmt;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

pub type Arity = usize;

/// Error type returned by built-in resolution.
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// No built-in with this qualified name exists.
    Unknown(BuiltInName),
    /// Built-in exists, but not for the requested argument count.
    WrongArity {
        name: BuiltInName,
        min: Arity,
        max: Option<Arity>,
        actual: Arity,
    },
}

impl From<ResolveError> for Error {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Unknown(name) => {
                Error::from_code(ErrorCode::UnknownBuiltIn, format!("unknown built-in {name}"))
            }
            ResolveError::WrongArity {
                name,
                min,
                max,
                actual,
            } => {
                let expected = match max {
                    Some(m) if m == min => format!("exactly {min}"),
                    Some(m) => format!("between {min} and {m}"),
                    None => format!("at least {min}"),
                };
                let plural = if actual == 1 { "" } else { "s" };
                Error::from_code(
                    ErrorCode::WrongArity,
                    format!(
                        "built-in {name} cannot be called with {actual} argument{plural} (expects {expected})"
                    ),
                )
            }
        }
    }
}

/// Per-evaluation mutable state reachable from built-ins. Nothing in here
/// outlives one query or rule evaluation.
#[derive(Debug, Default)]
pub struct EvaluationState {
    pub collections: CollectionStore,
    pub(crate) minted: HashMap<Vec<Value>, Entity>,
}

impl EvaluationState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Which clause of a query body is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Rule,
    Antecedent,
    Construction,
    Consumption,
}

/// Context passed into built-in implementations.
pub struct CallCtx<'a> {
    pub ontology: &'a dyn Ontology,
    pub state: &'a mut EvaluationState,
    pub regex: &'a dyn RegexProvider,
    pub phase: Phase,
}

pub type BuiltInImpl =
    Arc<dyn Fn(&mut CallCtx<'_>, &Invocation<'_>) -> Result<Outcome, Error> + Send + Sync>;

/// One registration of a built-in: accepted argument-count range, which
/// positions may be left unbound, and the implementation.
#[derive(Clone)]
pub struct BuiltInOverload {
    pub min_arity: Arity,
    pub max_arity: Option<Arity>,
    pub outputs: OutputPolicy,
    pub func: BuiltInImpl,
}

impl BuiltInOverload {
    fn accepts(&self, arity: Arity) -> bool {
        arity >= self.min_arity && self.max_arity.is_none_or(|m| arity <= m)
    }
}

impl fmt::Debug for BuiltInOverload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltInOverload")
            .field("min_arity", &self.min_arity)
            .field("max_arity", &self.max_arity)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// Maps qualified built-in names to implementations. Built once, then shared
/// read-only (behind an `Arc`) by every evaluation.
#[derive(Default)]
pub struct BuiltInRegistry {
    // Each name holds one or more arity ranges; the most specific range
    // (highest min, then smallest max) wins when ranges overlap.
    fns: HashMap<BuiltInName, Vec<BuiltInOverload>>,
}

impl BuiltInRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built-in with an arity range. `max_arity = None` makes it
    /// variadic from `min_arity` on.
    pub fn register_range(
        &mut self,
        name: BuiltInName,
        min_arity: Arity,
        max_arity: Option<Arity>,
        outputs: OutputPolicy,
        func: BuiltInImpl,
    ) {
        let overloads = self.fns.entry(name).or_default();
        overloads.push(BuiltInOverload {
            min_arity,
            max_arity,
            outputs,
            func,
        });
        overloads.sort_by(|a, b| {
            b.min_arity
                .cmp(&a.min_arity)
                .then_with(|| match (a.max_arity, b.max_arity) {
                    (Some(amax), Some(bmax)) => amax.cmp(&bmax),
                    (Some(_), None) => core::cmp::Ordering::Less,
                    (None, Some(_)) => core::cmp::Ordering::Greater,
                    (None, None) => core::cmp::Ordering::Equal,
                })
        });
    }

    /// Convenience: register a plain function under `library:local`.
    pub fn register<F>(
        &mut self,
        library: Library,
        local: &str,
        min_arity: Arity,
        max_arity: Option<Arity>,
        outputs: OutputPolicy,
        f: F,
    ) where
        F: 'static + Send + Sync + Fn(&mut CallCtx<'_>, &Invocation<'_>) -> Result<Outcome, Error>,
    {
        self.register_range(
            BuiltInName::new(library, local),
            min_arity,
            max_arity,
            outputs,
            Arc::new(f),
        );
    }

    pub fn contains(&self, name: &BuiltInName) -> bool {
        self.fns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &BuiltInName> {
        self.fns.keys()
    }

    /// Resolve a built-in by name and argument count. Distinguishes unknown
    /// names from known names called with the wrong number of arguments.
    pub fn resolve(
        &self,
        name: &BuiltInName,
        arity: Arity,
    ) -> Result<&BuiltInOverload, ResolveError> {
        let Some(cands) = self.fns.get(name) else {
            return Err(ResolveError::Unknown(name.clone()));
        };
        if let Some(found) = cands.iter().find(|o| o.accepts(arity)) {
            return Ok(found);
        }
        let min = cands.iter().map(|o| o.min_arity).min().unwrap_or(0);
        let max = cands
            .iter()
            .map(|o| o.max_arity)
            .try_fold(0, |acc, m| m.map(|m| acc.max(m)));
        Err(ResolveError::WrongArity {
            name: name.clone(),
            min,
            max,
            actual: arity,
        })
    }
}

impl fmt::Debug for BuiltInRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltInRegistry")
            .field("built_ins", &self.fns.len())
            .finish()
    }
}

pub trait RegexProvider: Send + Sync {
    fn matches(&self, pattern: &str, flags: &str, text: &str) -> Result<bool, Error>;
    fn replace(
        &self,
        pattern: &str,
        flags: &str,
        text: &str,
        replacement: &str,
    ) -> Result<String, Error>;
    fn tokenize(&self, pattern: &str, flags: &str, text: &str) -> Result<Vec<String>, Error>;
}

type RegexCache = lru::LruCache<(String, String), Arc<fancy_regex::Regex>>;

/// Backreference-capable regex provider based on fancy-regex, with a small
/// cache of compiled patterns (rules re-run the same pattern once per match).
pub struct FancyRegexProvider {
    cache: Mutex<RegexCache>,
}

impl Default for FancyRegexProvider {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl FancyRegexProvider {
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(lru::LruCache::new(cap)),
        }
    }

    fn build_with_flags(pattern: &str, flags: &str) -> Result<fancy_regex::Regex, Error> {
        let mut builder = fancy_regex::RegexBuilder::new(pattern);
        for ch in flags.chars() {
            match ch {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.verbose_mode(true);
                }
                _ => {
                    return Err(Error::from_code(
                        ErrorCode::Regex,
                        format!("unsupported regex flag: {ch}"),
                    ));
                }
            }
        }
        builder.build().map_err(|e| {
            Error::from_code(ErrorCode::Regex, format!("invalid regex pattern '{pattern}'"))
                .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
        })
    }

    fn compiled(&self, pattern: &str, flags: &str) -> Result<Arc<fancy_regex::Regex>, Error> {
        let key = (pattern.to_string(), flags.to_string());
        if let Ok(mut cache) = self.cache.lock()
            && let Some(re) = cache.get(&key)
        {
            return Ok(Arc::clone(re));
        }
        let re = Arc::new(Self::build_with_flags(pattern, flags)?);
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, Arc::clone(&re));
        }
        Ok(re)
    }
}

impl RegexProvider for FancyRegexProvider {
    fn matches(&self, pattern: &str, flags: &str, text: &str) -> Result<bool, Error> {
        let re = self.compiled(pattern, flags)?;
        Ok(re.is_match(text)?)
    }

    fn replace(
        &self,
        pattern: &str,
        flags: &str,
        text: &str,
        replacement: &str,
    ) -> Result<String, Error> {
        let re = self.compiled(pattern, flags)?;
        if let Err(e) = fancy_regex::Expander::default().check(replacement, &re) {
            return Err(
                Error::from_code(ErrorCode::Regex, "invalid replacement string")
                    .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>)),
            );
        }
        let mut out = String::new();
        let mut last = 0;
        for mc in re.captures_iter(text) {
            let cap = mc?;
            let m = cap
                .get(0)
                .ok_or_else(|| Error::from_code(ErrorCode::Regex, "no overall match"))?;
            if m.start() == m.end() {
                return Err(Error::from_code(
                    ErrorCode::Regex,
                    "pattern matches zero-length string in replace",
                ));
            }
            out.push_str(&text[last..m.start()]);
            fancy_regex::Expander::default().append_expansion(&mut out, replacement, &cap);
            last = m.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn tokenize(&self, pattern: &str, flags: &str, text: &str) -> Result<Vec<String>, Error> {
        let re = self.compiled(pattern, flags)?;
        let mut tokens = Vec::new();
        for part in re.split(text) {
            tokens.push(part?.to_string());
        }
        Ok(tokens)
    }
}

/// Error codes emitted by the core. Every code is either a parse-time or a
/// binding-time failure; computed-but-false built-ins are never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Parse-time
    InvalidLiteral,
    Syntax,
    UnknownBuiltIn,
    // Binding-time
    WrongArity,
    UnresolvedArguments,
    UnboundArgument,
    TypeError,
    Overflow,
    DivisionByZero,
    NotRepresentable,
    InvalidArgument,
    GroupBy,
    CollectionType,
    UnknownCollection,
    UnboundVariable,
    ResultStructure,
    Regex,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Evaluation never starts.
    Parse,
    /// Raised while a built-in runs against a binding environment.
    Binding,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidLiteral => "invalid-literal",
            ErrorCode::Syntax => "syntax",
            ErrorCode::UnknownBuiltIn => "unknown-built-in",
            ErrorCode::WrongArity => "wrong-arity",
            ErrorCode::UnresolvedArguments => "unresolved-arguments",
            ErrorCode::UnboundArgument => "unbound-argument",
            ErrorCode::TypeError => "type-error",
            ErrorCode::Overflow => "overflow",
            ErrorCode::DivisionByZero => "division-by-zero",
            ErrorCode::NotRepresentable => "not-representable",
            ErrorCode::InvalidArgument => "invalid-argument",
            ErrorCode::GroupBy => "group-by",
            ErrorCode::CollectionType => "collection-type",
            ErrorCode::UnknownCollection => "unknown-collection",
            ErrorCode::UnboundVariable => "unbound-variable",
            ErrorCode::ResultStructure => "result-structure",
            ErrorCode::Regex => "regex",
            ErrorCode::Io => "io",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::InvalidLiteral | ErrorCode::Syntax | ErrorCode::UnknownBuiltIn => {
                ErrorKind::Parse
            }
            _ => ErrorKind::Binding,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            source: None,
        }
    }

    /// Compose an error with a source cause.
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::TypeError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::InvalidArgument, msg)
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::Overflow, msg)
    }
}

impl From<fancy_regex::Error> for Error {
    fn from(e: fancy_regex::Error) -> Self {
        Error::from_code(ErrorCode::Regex, "regex evaluation error")
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::from_code(ErrorCode::Io, e.to_string())
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} ({})", self.message, self.code)
    }
}
