//! Trigger type — what a rule reacts to.

use serde::{Deserialize, Serialize};

/// Classification of what a rule reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// The rule's expression is tested against the latest cached value
    /// of the rule's sensor.
    SensorThreshold,
    /// The rule's expression is tested against calendar/clock fields.
    TimeBased,
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SensorThreshold => f.write_str("sensor_threshold"),
            Self::TimeBased => f.write_str("time_based"),
        }
    }
}
