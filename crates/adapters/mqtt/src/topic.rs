//! Topic layout shared with devices.
//!
//! Devices publish telemetry on `device/{device_id}/data` and listen
//! for commands on `actuator/{actuator_id}/command`.

/// Subscription filter covering every device's telemetry topic.
pub const TELEMETRY_FILTER: &str = "device/+/data";

/// Extract the device id from a telemetry topic.
#[must_use]
pub fn device_id(topic: &str) -> Option<&str> {
    let mut parts = topic.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("device"), Some(id), Some("data"), None) if !id.is_empty() => Some(id),
        _ => None,
    }
}
