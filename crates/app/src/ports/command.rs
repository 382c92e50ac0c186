//! Command sink port — non-blocking handoff of actuator commands.

use farmhub_domain::error::FarmHubError;

/// An outbound actuator command, addressed by broker topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub topic: String,
    pub payload: String,
}

impl Command {
    /// Command for a specific actuator, on its per-device command topic.
    #[must_use]
    pub fn for_actuator(actuator_id: &str, payload: impl Into<String>) -> Self {
        Self {
            topic: format!("actuator/{actuator_id}/command"),
            payload: payload.into(),
        }
    }
}

/// Accepts commands for asynchronous delivery.
///
/// `enqueue` is synchronous and must never block: implementations hand
/// the command to a bounded queue and deliver in the background. A full
/// queue is reported as an error, not waited out.
pub trait CommandSink {
    /// Queue a command for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::Transport`] when the queue is full or the
    /// delivery side has shut down.
    fn enqueue(&self, command: Command) -> Result<(), FarmHubError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_actuator_command_topic() {
        let cmd = Command::for_actuator("pump-1", "{\"state\":\"on\"}");
        assert_eq!(cmd.topic, "actuator/pump-1/command");
        assert_eq!(cmd.payload, "{\"state\":\"on\"}");
    }
}
