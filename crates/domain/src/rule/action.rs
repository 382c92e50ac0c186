//! Rule actions — the effects performed when a rule matches.

use serde::{Deserialize, Serialize};

use crate::id::ActionId;

/// The kind of effect an action performs.
///
/// The enum is closed; rows with an unrecognized kind are rejected when
/// decoding stored rules rather than surfacing mid-dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Publish actuator commands over the broker.
    ControlDevice,
    /// Send a notification through the notifier integration.
    SendNotification,
    /// Emit a structured log line.
    LogEvent,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ControlDevice => f.write_str("control_device"),
            Self::SendNotification => f.write_str("send_notification"),
            Self::LogEvent => f.write_str("log_event"),
        }
    }
}

/// One effect within a rule's ordered action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub id: ActionId,
    pub kind: ActionKind,
    /// Kind-specific parameters; interpreted by the matching handler.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Ordering key within the rule; ties keep declaration order.
    #[serde(default)]
    pub execution_order: i32,
}

/// Outcome of executing one action.
///
/// Only used to decide whether to log a warning — it never gates the
/// rule's `last_triggered` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionResult {
    pub action_id: ActionId,
    pub success: bool,
}
