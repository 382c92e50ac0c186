//! MQTT adapter error types.

use farmhub_domain::error::FarmHubError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client returned an error.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// The outbound command queue is full.
    #[error("command queue full")]
    QueueFull,

    /// The command publisher has shut down.
    #[error("command publisher stopped")]
    PublisherStopped,
}

impl From<MqttError> for FarmHubError {
    fn from(err: MqttError) -> Self {
        FarmHubError::Transport(Box::new(err))
    }
}
