//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`FarmHubError`] at the port boundary.

/// Boxed error source used for adapter-originated failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum FarmHubError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The rule store or time-series store failed.
    #[error("storage error")]
    Storage(#[source] BoxError),

    /// The latest-value cache failed.
    #[error("cache error")]
    Cache(#[source] BoxError),

    /// A broker or network transport failed.
    #[error("transport error")]
    Transport(#[source] BoxError),

    /// A rule expression could not be evaluated.
    #[error("expression error")]
    Evaluation(#[from] EvalError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A rule's name is empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A rule's expression is empty.
    #[error("expression must not be empty")]
    EmptyExpression,

    /// A rule declares no actions.
    #[error("rule must declare at least one action")]
    NoActions,
}

/// A lookup failed to find the requested record.
#[derive(Debug, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Human-readable record kind (e.g. `"Rule"`).
    pub entity: &'static str,
    /// Stringified identifier that was looked up.
    pub id: String,
}

/// Failures reported by the pluggable expression evaluator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The expression does not parse.
    #[error("expression syntax error: {0}")]
    Syntax(String),

    /// The expression parsed but did not evaluate to a boolean, or
    /// referenced a variable with an incompatible type.
    #[error("expression type error: {0}")]
    Type(String),
}
