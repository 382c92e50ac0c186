//! Action dispatcher — runs a matched rule's actions in order.
//!
//! Actions run sequentially in `execution_order`. A failing action is
//! recorded and logged but never stops the rest of the list, and no
//! action outcome ever propagates as an error to the engine.

use farmhub_domain::rule::{ActionKind, ActionResult, Rule, RuleAction};

use crate::ports::{Command, CommandSink, Notifier};

/// Executes rule actions against the command sink and notifier.
pub struct ActionDispatcher<S, N> {
    commands: S,
    notifier: N,
}

impl<S, N> ActionDispatcher<S, N>
where
    S: CommandSink,
    N: Notifier,
{
    pub fn new(commands: S, notifier: N) -> Self {
        Self { commands, notifier }
    }

    /// Run all of `rule`'s actions in execution order.
    ///
    /// Returns one [`ActionResult`] per action, in the order they ran.
    pub async fn dispatch(&self, rule: &Rule) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(rule.actions.len());
        for action in rule.actions_in_order() {
            let success = match action.kind {
                ActionKind::ControlDevice => self.control_device(action),
                ActionKind::SendNotification => self.send_notification(rule, action).await,
                ActionKind::LogEvent => self.log_event(rule, action),
            };
            if !success {
                tracing::warn!(
                    rule = %rule.name,
                    action = %action.kind,
                    action_id = %action.id,
                    "action failed"
                );
            }
            results.push(ActionResult {
                action_id: action.id,
                success,
            });
        }
        results
    }

    /// Queue one command per entry in `devices_to_control`.
    ///
    /// Entries are queued independently: one bad entry or a full queue
    /// does not stop the remaining entries.
    fn control_device(&self, action: &RuleAction) -> bool {
        let Some(devices) = action
            .payload
            .get("devices_to_control")
            .and_then(serde_json::Value::as_array)
        else {
            tracing::warn!(action_id = %action.id, "control_device payload has no devices_to_control");
            return false;
        };

        let mut all_ok = true;
        for device in devices {
            let Some(actuator_id) = device.get("actuator_id").and_then(serde_json::Value::as_str)
            else {
                tracing::warn!(action_id = %action.id, "device entry missing actuator_id");
                all_ok = false;
                continue;
            };
            let payload = match device.get("command") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => {
                    tracing::warn!(action_id = %action.id, actuator_id, "device entry missing command");
                    all_ok = false;
                    continue;
                }
            };
            if let Err(error) = self.commands.enqueue(Command::for_actuator(actuator_id, payload)) {
                tracing::warn!(actuator_id, %error, "command not queued");
                all_ok = false;
            }
        }
        all_ok
    }

    async fn send_notification(&self, rule: &Rule, action: &RuleAction) -> bool {
        let Some(to) = action.payload.get("to").and_then(serde_json::Value::as_str) else {
            tracing::warn!(action_id = %action.id, "send_notification payload has no recipient");
            return false;
        };
        let subject = action
            .payload
            .get("subject")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("FarmHub alert");
        let body = action
            .payload
            .get("body")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(&rule.name);

        match self.notifier.notify(to, subject, body).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(to, %error, "notification failed");
                false
            }
        }
    }

    /// Emit a structured log line. Cannot fail.
    fn log_event(&self, rule: &Rule, action: &RuleAction) -> bool {
        let message = action
            .payload
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("rule triggered");
        let level = action
            .payload
            .get("level")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("info");

        match level {
            "error" => tracing::error!(rule = %rule.name, rule_id = %rule.id, message),
            "warn" | "warning" => tracing::warn!(rule = %rule.name, rule_id = %rule.id, message),
            "debug" => tracing::debug!(rule = %rule.name, rule_id = %rule.id, message),
            _ => tracing::info!(rule = %rule.name, rule_id = %rule.id, message),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmhub_domain::error::FarmHubError;
    use farmhub_domain::id::ActionId;
    use std::sync::Mutex;

    // ── Spy sink and notifier ──────────────────────────────────────

    #[derive(Default)]
    struct SpySink {
        queued: Mutex<Vec<Command>>,
        full: bool,
    }

    impl CommandSink for SpySink {
        fn enqueue(&self, command: Command) -> Result<(), FarmHubError> {
            if self.full {
                return Err(FarmHubError::Transport("queue full".into()));
            }
            self.queued.lock().unwrap().push(command);
            Ok(())
        }
    }

    #[derive(Default)]
    struct SpyNotifier {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl Notifier for SpyNotifier {
        async fn notify(&self, to: &str, subject: &str, body: &str) -> Result<(), FarmHubError> {
            if self.fail {
                return Err(FarmHubError::Transport("smtp down".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn action(kind: ActionKind, payload: serde_json::Value, order: i32) -> RuleAction {
        RuleAction {
            id: ActionId::new(),
            kind,
            payload,
            execution_order: order,
        }
    }

    fn rule_with(actions: Vec<RuleAction>) -> Rule {
        let mut builder = Rule::builder()
            .name("dispatch test")
            .expression("value > 1");
        for a in actions {
            builder = builder.action(a);
        }
        builder.build().unwrap()
    }

    fn control_payload(actuators: &[(&str, serde_json::Value)]) -> serde_json::Value {
        let devices: Vec<_> = actuators
            .iter()
            .map(|(id, command)| serde_json::json!({"actuator_id": id, "command": command}))
            .collect();
        serde_json::json!({"devices_to_control": devices})
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_queue_one_command_per_device_entry() {
        let dispatcher = ActionDispatcher::new(SpySink::default(), SpyNotifier::default());
        let rule = rule_with(vec![action(
            ActionKind::ControlDevice,
            control_payload(&[
                ("pump-1", serde_json::json!("on")),
                ("valve-2", serde_json::json!({"state": "open"})),
            ]),
            1,
        )]);

        let results = dispatcher.dispatch(&rule).await;

        assert!(results[0].success);
        let queued = dispatcher.commands.queued.lock().unwrap();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].topic, "actuator/pump-1/command");
        assert_eq!(queued[0].payload, "on");
        assert_eq!(queued[1].topic, "actuator/valve-2/command");
        assert_eq!(queued[1].payload, "{\"state\":\"open\"}");
    }

    #[tokio::test]
    async fn should_run_actions_in_execution_order() {
        let dispatcher = ActionDispatcher::new(SpySink::default(), SpyNotifier::default());
        let first = action(
            ActionKind::ControlDevice,
            control_payload(&[("second", serde_json::json!("x"))]),
            2,
        );
        let second = action(
            ActionKind::ControlDevice,
            control_payload(&[("first", serde_json::json!("x"))]),
            1,
        );
        let rule = rule_with(vec![first, second]);

        dispatcher.dispatch(&rule).await;

        let queued = dispatcher.commands.queued.lock().unwrap();
        assert_eq!(queued[0].topic, "actuator/first/command");
        assert_eq!(queued[1].topic, "actuator/second/command");
    }

    #[tokio::test]
    async fn should_fail_control_device_without_devices_list() {
        let dispatcher = ActionDispatcher::new(SpySink::default(), SpyNotifier::default());
        let rule = rule_with(vec![action(
            ActionKind::ControlDevice,
            serde_json::json!({"actuator_id": "pump-1"}),
            1,
        )]);

        let results = dispatcher.dispatch(&rule).await;
        assert!(!results[0].success);
        assert!(dispatcher.commands.queued.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_continue_past_failing_action() {
        let dispatcher = ActionDispatcher::new(
            SpySink {
                queued: Mutex::new(Vec::new()),
                full: true,
            },
            SpyNotifier::default(),
        );
        let rule = rule_with(vec![
            action(
                ActionKind::ControlDevice,
                control_payload(&[("pump-1", serde_json::json!("on"))]),
                1,
            ),
            action(ActionKind::LogEvent, serde_json::json!({}), 2),
        ]);

        let results = dispatcher.dispatch(&rule).await;

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[1].success);
    }

    #[tokio::test]
    async fn should_send_notification_with_defaults() {
        let dispatcher = ActionDispatcher::new(SpySink::default(), SpyNotifier::default());
        let rule = rule_with(vec![action(
            ActionKind::SendNotification,
            serde_json::json!({"to": "farmer@example.com"}),
            1,
        )]);

        let results = dispatcher.dispatch(&rule).await;

        assert!(results[0].success);
        let sent = dispatcher.notifier.sent.lock().unwrap();
        assert_eq!(sent[0].0, "farmer@example.com");
        assert_eq!(sent[0].1, "FarmHub alert");
        assert_eq!(sent[0].2, "dispatch test");
    }

    #[tokio::test]
    async fn should_fail_notification_without_recipient() {
        let dispatcher = ActionDispatcher::new(SpySink::default(), SpyNotifier::default());
        let rule = rule_with(vec![action(
            ActionKind::SendNotification,
            serde_json::json!({"subject": "no recipient"}),
            1,
        )]);

        let results = dispatcher.dispatch(&rule).await;
        assert!(!results[0].success);
    }

    #[tokio::test]
    async fn should_report_notifier_failure() {
        let dispatcher = ActionDispatcher::new(
            SpySink::default(),
            SpyNotifier {
                sent: Mutex::new(Vec::new()),
                fail: true,
            },
        );
        let rule = rule_with(vec![action(
            ActionKind::SendNotification,
            serde_json::json!({"to": "farmer@example.com"}),
            1,
        )]);

        let results = dispatcher.dispatch(&rule).await;
        assert!(!results[0].success);
    }

    #[tokio::test]
    async fn should_always_succeed_for_log_event() {
        let dispatcher = ActionDispatcher::new(SpySink::default(), SpyNotifier::default());
        let rule = rule_with(vec![action(
            ActionKind::LogEvent,
            serde_json::json!({"message": "greenhouse hot", "level": "warn"}),
            1,
        )]);

        let results = dispatcher.dispatch(&rule).await;
        assert!(results[0].success);
    }

    #[tokio::test]
    async fn should_skip_bad_device_entry_but_queue_the_rest() {
        let dispatcher = ActionDispatcher::new(SpySink::default(), SpyNotifier::default());
        let rule = rule_with(vec![action(
            ActionKind::ControlDevice,
            serde_json::json!({"devices_to_control": [
                {"command": "on"},
                {"actuator_id": "valve-2", "command": "open"}
            ]}),
            1,
        )]);

        let results = dispatcher.dispatch(&rule).await;

        assert!(!results[0].success);
        let queued = dispatcher.commands.queued.lock().unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].topic, "actuator/valve-2/command");
    }
}
