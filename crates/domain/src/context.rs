//! Evaluation contexts — the variable bindings a rule expression sees.
//!
//! Contexts are built fresh per rule per tick and discarded after one
//! evaluation. Each trigger kind gets its own typed context instead of
//! an untyped map; the evaluator port consumes the flattened bindings,
//! so any boolean-expression engine remains substitutable.

use chrono::{Datelike, Timelike};

use crate::id::RuleId;
use crate::time::Timestamp;

/// A scalar value exposed to the expression evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Float(f64),
    Int(i64),
    Text(String),
}

/// Bindings for a sensor-threshold rule: the live cached value.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdContext {
    pub sensor_id: String,
    pub value: f64,
}

/// Bindings for a time-based rule: calendar/clock fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeContext {
    pub hour: u32,
    pub minute: u32,
    /// Monday = 0 … Sunday = 6.
    pub day_of_week: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl TimeContext {
    /// Populate the calendar fields from a wall-clock timestamp.
    #[must_use]
    pub fn from_timestamp(ts: Timestamp) -> Self {
        Self {
            hour: ts.hour(),
            minute: ts.minute(),
            day_of_week: ts.weekday().num_days_from_monday(),
            day: ts.day(),
            month: ts.month(),
            year: ts.year(),
        }
    }
}

/// Trigger-specific part of an evaluation context.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextKind {
    Threshold(ThresholdContext),
    Time(TimeContext),
}

/// The full per-rule evaluation context.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalContext {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub current_time: Timestamp,
    pub kind: ContextKind,
}

impl EvalContext {
    /// Flatten into ordered `(name, value)` pairs for the evaluator.
    ///
    /// Shared fields (`rule_id`, `rule_name`, `current_time`) come
    /// first, then the trigger-specific variables.
    #[must_use]
    pub fn bindings(&self) -> Vec<(String, ScalarValue)> {
        let mut vars = vec![
            (
                "rule_id".to_string(),
                ScalarValue::Text(self.rule_id.to_string()),
            ),
            (
                "rule_name".to_string(),
                ScalarValue::Text(self.rule_name.clone()),
            ),
            (
                "current_time".to_string(),
                ScalarValue::Text(self.current_time.to_rfc3339()),
            ),
        ];

        match &self.kind {
            ContextKind::Threshold(ctx) => {
                vars.push((
                    "sensor_id".to_string(),
                    ScalarValue::Text(ctx.sensor_id.clone()),
                ));
                vars.push(("value".to_string(), ScalarValue::Float(ctx.value)));
            }
            ContextKind::Time(ctx) => {
                vars.push(("hour".to_string(), ScalarValue::Int(i64::from(ctx.hour))));
                vars.push((
                    "minute".to_string(),
                    ScalarValue::Int(i64::from(ctx.minute)),
                ));
                vars.push((
                    "day_of_week".to_string(),
                    ScalarValue::Int(i64::from(ctx.day_of_week)),
                ));
                vars.push(("day".to_string(), ScalarValue::Int(i64::from(ctx.day))));
                vars.push(("month".to_string(), ScalarValue::Int(i64::from(ctx.month))));
                vars.push(("year".to_string(), ScalarValue::Int(i64::from(ctx.year))));
            }
        }

        vars
    }
}
