use thiserror::Error;

/// Primary error type for the SPA query pipeline.
///
/// Each variant maps to one subsystem and carries the human-readable
/// message prefix that subsystem has always used, so a batch driver can
/// identify the failing stage from the rendered string alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpaError {
    /// The tokenizer hit a character sequence it cannot form a token from.
    /// Fatal for the input being tokenized.
    #[error("[Tokeniser Parsing Error] {0}")]
    Lex(String),

    /// The PQL parser hit a malformed token stream. Fatal for the current
    /// query only; the driver moves on to the next query.
    #[error("[PQL Syntax Error] {0}")]
    PqlSyntax(String),

    /// A semantic rule violation in an otherwise well-formed query
    /// (undeclared synonym, bad attribute, ...). Recoverable: the parser
    /// accumulates these and the query evaluates to an empty result.
    #[error("[PQL Semantic Error] {0}")]
    PqlSemantic(String),

    /// The SIMPLE source program is malformed. Fatal for the whole run.
    #[error("[SPA Source Error] {0}")]
    Source(String),

    /// A PKB writer was handed data that violates a relation invariant
    /// (e.g. Follows(5, 3)). Indicates a bug in the upstream extractor.
    #[error("domain violation: {0}")]
    Domain(String),
}

impl SpaError {
    /// Create a tokenizer error.
    pub fn lex(msg: impl Into<String>) -> Self {
        Self::Lex(msg.into())
    }

    /// Create a PQL syntax error.
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::PqlSyntax(msg.into())
    }

    /// Create a PQL semantic error.
    pub fn semantic(msg: impl Into<String>) -> Self {
        Self::PqlSemantic(msg.into())
    }

    /// Create a SIMPLE source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a domain-violation error.
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    /// Whether the query pipeline may continue after this error.
    ///
    /// Only semantic errors are recoverable: the parser collects them and
    /// the evaluator answers with an empty result list.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::PqlSemantic(_))
    }

    /// Whether this error ends the whole run rather than one query.
    #[must_use]
    pub const fn is_fatal_for_run(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Domain(_))
    }
}

/// Result type alias using `SpaError`.
pub type Result<T> = std::result::Result<T, SpaError>;
