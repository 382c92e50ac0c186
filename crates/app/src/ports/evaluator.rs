//! Expression matcher port — pluggable boolean-expression evaluation.

use farmhub_domain::context::ScalarValue;
use farmhub_domain::error::EvalError;

/// Evaluates a rule expression against named variable bindings.
///
/// Implementations are pure and synchronous; parsing and evaluation
/// happen per call, so rules edited in storage take effect on the next
/// tick without any invalidation protocol.
pub trait ExpressionMatcher {
    /// Evaluate `expression` with the given bindings.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Syntax`] when the expression does not parse
    /// and [`EvalError::Type`] when it does not produce a boolean.
    fn matches(
        &self,
        expression: &str,
        bindings: &[(String, ScalarValue)],
    ) -> Result<bool, EvalError>;
}
