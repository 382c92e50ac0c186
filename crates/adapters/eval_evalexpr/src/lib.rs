//! # farmhub-adapter-eval-evalexpr
//!
//! Expression evaluation adapter — implements the `ExpressionMatcher`
//! port with [evalexpr](https://docs.rs/evalexpr).
//!
//! Expressions are parsed per evaluation. That keeps the adapter
//! stateless and means edited rules take effect on the next tick; rule
//! expressions are small enough that parse cost is irrelevant next to
//! the cache round-trip the engine just made.

use evalexpr::{ContextWithMutableVariables, HashMapContext, Value, build_operator_tree};

use farmhub_app::ports::ExpressionMatcher;
use farmhub_domain::context::ScalarValue;
use farmhub_domain::error::EvalError;

/// Stateless [`ExpressionMatcher`] backed by evalexpr.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvalexprMatcher;

impl ExpressionMatcher for EvalexprMatcher {
    fn matches(
        &self,
        expression: &str,
        bindings: &[(String, ScalarValue)],
    ) -> Result<bool, EvalError> {
        let tree = build_operator_tree(expression)
            .map_err(|err| EvalError::Syntax(err.to_string()))?;

        let mut context = HashMapContext::new();
        for (name, value) in bindings {
            context
                .set_value(name.clone(), to_value(value))
                .map_err(|err| EvalError::Type(err.to_string()))?;
        }

        match tree.eval_with_context(&context) {
            Ok(Value::Boolean(matched)) => Ok(matched),
            Ok(other) => Err(EvalError::Type(format!(
                "expression produced {other:?}, expected a boolean"
            ))),
            Err(err) => Err(EvalError::Type(err.to_string())),
        }
    }
}

fn to_value(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Float(v) => Value::Float(*v),
        ScalarValue::Int(v) => Value::Int(*v),
        ScalarValue::Text(v) => Value::String(v.clone()),
    }
}
