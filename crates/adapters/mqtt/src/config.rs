//! MQTT adapter configuration.

use serde::Deserialize;

/// Configuration shared by the telemetry listener and the command
/// publisher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier prefix; listener and publisher append
    /// their own suffix so the broker sees two distinct sessions.
    pub client_id: String,
    /// Optional broker username.
    pub username: Option<String>,
    /// Optional broker password; ignored without a username.
    pub password: Option<String>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Delay before reconnecting after a dropped connection, in seconds.
    pub reconnect_delay_secs: u16,
    /// QoS level for published actuator commands (0, 1 or 2).
    pub command_qos: u8,
    /// Capacity of the outbound command queue.
    pub command_queue_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "farmhub".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 30,
            reconnect_delay_secs: 5,
            command_qos: 1,
            command_queue_capacity: 64,
        }
    }
}
