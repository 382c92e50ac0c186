//! Sensor readings and telemetry payload normalization.
//!
//! Device telemetry arrives in several shapes; everything converges to
//! the flat [`SensorReading`] form before reaching any sink.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One normalized telemetry sample.
///
/// Immutable; has no identity beyond its fields. It is written to the
/// sinks as a record, never persisted as an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub sensor_type: String,
    pub value: f64,
    pub observed_at: Timestamp,
}

/// Normalize the `sensors` section of a telemetry frame.
///
/// Accepted shapes:
/// 1. `{"temp": 25.0, "hum": 60}` — map from sensor key to scalar
/// 2. `{"temp": {"value": 25.0, "sensor_type": "temperature"}}` —
///    map from sensor key to object, `sensor_type` defaulting to the key
/// 3. `[{"sensor_id": "temp", "sensor_type": "temperature", "value": 25.0}]`
///    — already-flat list, passed through (idempotent)
///
/// Entries whose value is not numeric (or a numeric string) are dropped.
/// Unknown shapes yield an empty list; normalization never fails.
#[must_use]
pub fn normalize_sensors(sensors: &serde_json::Value, observed_at: Timestamp) -> Vec<SensorReading> {
    match sensors {
        serde_json::Value::Object(map) => map
            .iter()
            .filter_map(|(key, val)| normalize_entry(key, val, observed_at))
            .collect(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| normalize_flat_item(item, observed_at))
            .collect(),
        _ => Vec::new(),
    }
}

fn normalize_entry(
    key: &str,
    val: &serde_json::Value,
    observed_at: Timestamp,
) -> Option<SensorReading> {
    if let serde_json::Value::Object(obj) = val {
        let value = scalar_value(obj.get("value")?)?;
        let sensor_type = obj
            .get("sensor_type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(key);
        return Some(SensorReading {
            sensor_id: key.to_string(),
            sensor_type: sensor_type.to_string(),
            value,
            observed_at,
        });
    }

    Some(SensorReading {
        sensor_id: key.to_string(),
        sensor_type: key.to_string(),
        value: scalar_value(val)?,
        observed_at,
    })
}

fn normalize_flat_item(item: &serde_json::Value, observed_at: Timestamp) -> Option<SensorReading> {
    let obj = item.as_object()?;
    let sensor_id = obj.get("sensor_id")?.as_str()?;
    let value = scalar_value(obj.get("value")?)?;
    let sensor_type = obj
        .get("sensor_type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(sensor_id);
    Some(SensorReading {
        sensor_id: sensor_id.to_string(),
        sensor_type: sensor_type.to_string(),
        value,
        observed_at,
    })
}

/// Coerce a JSON scalar into `f64`. Numeric strings are accepted since
/// some firmware reports values as quoted text.
fn scalar_value(val: &serde_json::Value) -> Option<f64> {
    match val {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_normalize_scalar_map() {
        let sensors = serde_json::json!({"hum": 60, "temp": 25.5});
        let readings = normalize_sensors(&sensors, now());

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].sensor_id, "hum");
        assert_eq!(readings[0].sensor_type, "hum");
        assert!((readings[0].value - 60.0).abs() < f64::EPSILON);
        assert_eq!(readings[1].sensor_id, "temp");
        assert!((readings[1].value - 25.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_normalize_object_map_with_sensor_type() {
        let sensors = serde_json::json!({
            "temp": {"value": 22.0, "sensor_type": "temperature"}
        });
        let readings = normalize_sensors(&sensors, now());

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sensor_id, "temp");
        assert_eq!(readings[0].sensor_type, "temperature");
        assert!((readings[0].value - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_default_sensor_type_to_key_when_absent() {
        let sensors = serde_json::json!({"soil": {"value": 41}});
        let readings = normalize_sensors(&sensors, now());
        assert_eq!(readings[0].sensor_type, "soil");
    }

    #[test]
    fn should_pass_through_flat_list_unchanged() {
        let sensors = serde_json::json!([
            {"sensor_id": "temp", "sensor_type": "temperature", "value": 25.0},
            {"sensor_id": "hum", "sensor_type": "humidity", "value": 60.0}
        ]);
        let ts = now();
        let readings = normalize_sensors(&sensors, ts);

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].sensor_id, "temp");
        assert_eq!(readings[0].sensor_type, "temperature");
        assert_eq!(readings[1].sensor_id, "hum");

        // Idempotence: re-normalizing the flat form returns it unchanged.
        let reencoded = serde_json::to_value(&readings).unwrap();
        let again = normalize_sensors(&reencoded, ts);
        assert_eq!(again, readings);
    }

    #[test]
    fn should_default_flat_item_sensor_type_to_sensor_id() {
        let sensors = serde_json::json!([{"sensor_id": "temp", "value": 1.0}]);
        let readings = normalize_sensors(&sensors, now());
        assert_eq!(readings[0].sensor_type, "temp");
    }

    #[test]
    fn should_accept_numeric_strings() {
        let sensors = serde_json::json!({"temp": "42.5"});
        let readings = normalize_sensors(&sensors, now());
        assert_eq!(readings.len(), 1);
        assert!((readings[0].value - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_drop_non_numeric_entries() {
        let sensors = serde_json::json!({
            "temp": 21.0,
            "status": "online",
            "flags": [1, 2]
        });
        let readings = normalize_sensors(&sensors, now());
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sensor_id, "temp");
    }

    #[test]
    fn should_return_empty_list_for_unknown_shapes() {
        assert!(normalize_sensors(&serde_json::json!("not a map"), now()).is_empty());
        assert!(normalize_sensors(&serde_json::json!(42), now()).is_empty());
        assert!(normalize_sensors(&serde_json::json!(null), now()).is_empty());
    }

    #[test]
    fn should_drop_list_items_missing_sensor_id() {
        let sensors = serde_json::json!([
            {"value": 1.0},
            {"sensor_id": "ok", "value": 2.0}
        ]);
        let readings = normalize_sensors(&sensors, now());
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sensor_id, "ok");
    }
}
