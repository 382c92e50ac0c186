//! Rule — trigger → expression → ordered actions.
//!
//! Rules are owned and mutated by the external rule-management service;
//! this system only reads them and writes back `last_triggered`. Each
//! rule has a [`TriggerType`] deciding what context its expression is
//! evaluated against, a cooldown that suppresses re-triggering, and one
//! or more [`RuleAction`]s executed in declared order on a match.

mod action;
mod trigger;

pub use action::{ActionKind, ActionResult, RuleAction};
pub use trigger::TriggerType;

use serde::{Deserialize, Serialize};

use crate::error::{FarmHubError, ValidationError};
use crate::id::{DeviceId, FarmId, RuleId, UserId};
use crate::time::Timestamp;

/// A user-defined automation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub owner_id: UserId,
    pub farm_id: FarmId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub trigger: TriggerType,
    /// Required for [`TriggerType::SensorThreshold`] rules; a threshold
    /// rule without it is skipped at evaluation time, never an error.
    #[serde(default)]
    pub sensor_id: Option<String>,
    #[serde(default)]
    pub device_id: Option<DeviceId>,
    /// Boolean expression over the evaluation context's variables.
    pub expression: String,
    /// Minimum quiescent period after a trigger before the rule may
    /// fire again, in seconds.
    pub cooldown_seconds: u32,
    #[serde(default)]
    pub last_triggered: Option<Timestamp>,
    pub enabled: bool,
    pub actions: Vec<RuleAction>,
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `expression` is empty ([`ValidationError::EmptyExpression`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    pub fn validate(&self) -> Result<(), FarmHubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.expression.trim().is_empty() {
            return Err(ValidationError::EmptyExpression.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        Ok(())
    }

    /// True iff the rule triggered within the last `cooldown_seconds`.
    ///
    /// A rule that never triggered is never on cooldown.
    #[must_use]
    pub fn is_on_cooldown(&self, now: Timestamp) -> bool {
        let Some(last) = self.last_triggered else {
            return false;
        };
        now.signed_duration_since(last)
            < chrono::Duration::seconds(i64::from(self.cooldown_seconds))
    }

    /// Actions stably sorted by `execution_order`; ties keep their
    /// declaration order.
    #[must_use]
    pub fn actions_in_order(&self) -> Vec<&RuleAction> {
        let mut ordered: Vec<&RuleAction> = self.actions.iter().collect();
        ordered.sort_by_key(|a| a.execution_order);
        ordered
    }
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    owner_id: Option<UserId>,
    farm_id: Option<FarmId>,
    name: Option<String>,
    description: Option<String>,
    trigger: Option<TriggerType>,
    sensor_id: Option<String>,
    device_id: Option<DeviceId>,
    expression: Option<String>,
    cooldown_seconds: Option<u32>,
    last_triggered: Option<Timestamp>,
    enabled: Option<bool>,
    actions: Vec<RuleAction>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn owner_id(mut self, id: UserId) -> Self {
        self.owner_id = Some(id);
        self
    }

    #[must_use]
    pub fn farm_id(mut self, id: FarmId) -> Self {
        self.farm_id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: TriggerType) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn sensor_id(mut self, sensor_id: impl Into<String>) -> Self {
        self.sensor_id = Some(sensor_id.into());
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn cooldown_seconds(mut self, seconds: u32) -> Self {
        self.cooldown_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn last_triggered(mut self, ts: Timestamp) -> Self {
        self.last_triggered = Some(ts);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn action(mut self, action: RuleAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::Validation`] if required fields are
    /// missing or empty.
    pub fn build(self) -> Result<Rule, FarmHubError> {
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            owner_id: self.owner_id.unwrap_or_default(),
            farm_id: self.farm_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            trigger: self.trigger.unwrap_or(TriggerType::SensorThreshold),
            sensor_id: self.sensor_id,
            device_id: self.device_id,
            expression: self.expression.unwrap_or_default(),
            cooldown_seconds: self.cooldown_seconds.unwrap_or(0),
            last_triggered: self.last_triggered,
            enabled: self.enabled.unwrap_or(true),
            actions: self.actions,
        };
        rule.validate()?;
        Ok(rule)
    }
}
