//! Rule engine — one evaluation pass over all enabled rules.
//!
//! Per rule: cooldown guard, context construction, expression match,
//! action dispatch, trigger-time write-back. Rules are evaluated
//! concurrently within a pass and completely independently; one rule's
//! failure never affects another's outcome.

use farmhub_domain::context::{ContextKind, EvalContext, ThresholdContext, TimeContext};
use farmhub_domain::error::FarmHubError;
use farmhub_domain::rule::{Rule, TriggerType};
use farmhub_domain::time::{Timestamp, now};

use crate::dispatch::ActionDispatcher;
use crate::ports::{CommandSink, ExpressionMatcher, Notifier, ReadingCache, RuleRepository};

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub evaluated: usize,
    pub triggered: usize,
}

/// Evaluation use-case, generic over its ports.
pub struct RuleEngine<R, C, M, S, N> {
    rules: R,
    cache: C,
    matcher: M,
    dispatcher: ActionDispatcher<S, N>,
}

impl<R, C, M, S, N> RuleEngine<R, C, M, S, N>
where
    R: RuleRepository,
    C: ReadingCache,
    M: ExpressionMatcher,
    S: CommandSink,
    N: Notifier,
{
    pub fn new(rules: R, cache: C, matcher: M, dispatcher: ActionDispatcher<S, N>) -> Self {
        Self {
            rules,
            cache,
            matcher,
            dispatcher,
        }
    }

    /// Evaluate all enabled rules once.
    ///
    /// # Errors
    ///
    /// Returns a storage error only when the rule list itself cannot be
    /// loaded. Per-rule failures are absorbed and logged.
    pub async fn evaluate_all(&self) -> Result<CycleSummary, FarmHubError> {
        let rules = self.rules.get_enabled().await?;
        let evaluated = rules.len();

        let outcomes =
            futures::future::join_all(rules.iter().map(|rule| self.evaluate_rule(rule))).await;
        let triggered = outcomes.into_iter().filter(|fired| *fired).count();

        Ok(CycleSummary {
            evaluated,
            triggered,
        })
    }

    /// Evaluate one rule; returns whether it fired.
    async fn evaluate_rule(&self, rule: &Rule) -> bool {
        let current = now();
        if rule.is_on_cooldown(current) {
            tracing::debug!(rule = %rule.name, "on cooldown, skipped");
            return false;
        }

        let Some(context) = self.build_context(rule, current).await else {
            return false;
        };

        match self.matcher.matches(&rule.expression, &context.bindings()) {
            Ok(false) => false,
            Ok(true) => {
                tracing::info!(rule = %rule.name, rule_id = %rule.id, "rule matched");
                let results = self.dispatcher.dispatch(rule).await;
                let failed = results.iter().filter(|r| !r.success).count();
                if failed > 0 {
                    tracing::warn!(rule = %rule.name, failed, total = results.len(), "actions failed");
                }
                // The trigger time advances even when actions fail, so a
                // permanently failing action cannot re-fire every tick.
                if let Err(error) = self.rules.mark_triggered(rule.id, now()).await {
                    tracing::error!(rule_id = %rule.id, %error, "failed to record trigger time");
                }
                true
            }
            Err(error) => {
                tracing::warn!(rule = %rule.name, %error, "expression rejected");
                false
            }
        }
    }

    /// Build the evaluation context, or `None` when the rule cannot be
    /// evaluated this tick (no sensor id, no cached value, cache down).
    async fn build_context(&self, rule: &Rule, current: Timestamp) -> Option<EvalContext> {
        let kind = match rule.trigger {
            TriggerType::SensorThreshold => {
                let Some(sensor_id) = rule.sensor_id.as_deref() else {
                    tracing::warn!(rule = %rule.name, "threshold rule has no sensor_id");
                    return None;
                };
                let cached = match self.cache.get_latest(sensor_id).await {
                    Ok(cached) => cached,
                    Err(error) => {
                        tracing::warn!(sensor_id, %error, "cache read failed");
                        return None;
                    }
                };
                let Some(raw) = cached else {
                    tracing::debug!(rule = %rule.name, sensor_id, "no cached value yet");
                    return None;
                };
                let Some(value) = parse_cached_value(&raw) else {
                    tracing::warn!(sensor_id, raw, "cached value is not numeric");
                    return None;
                };
                ContextKind::Threshold(ThresholdContext {
                    sensor_id: sensor_id.to_string(),
                    value,
                })
            }
            TriggerType::TimeBased => ContextKind::Time(TimeContext::from_timestamp(current)),
        };

        Some(EvalContext {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            current_time: current,
            kind,
        })
    }
}

/// Interpret a cached entry as a number.
///
/// Accepts a JSON document with a numeric (or numeric-string) `value`
/// field, or a bare number, quoted or not.
fn parse_cached_value(raw: &str) -> Option<f64> {
    if let Ok(doc) = serde_json::from_str::<serde_json::Value>(raw) {
        if let Some(obj) = doc.as_object() {
            return match obj.get("value")? {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
        }
        if let Some(n) = doc.as_f64() {
            return Some(n);
        }
    }
    raw.trim().parse().ok()
}
