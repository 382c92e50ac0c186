//! Reading pipeline — decode, normalize, fan out to both sinks.
//!
//! One telemetry frame in, zero or more [`SensorReading`]s out, written
//! concurrently to the latest-value cache and the time-series store. The
//! pipeline never returns an error to its caller: a bad frame or a
//! failing sink is logged and dropped, and ingestion keeps going.

use farmhub_domain::reading::{SensorReading, normalize_sensors};
use farmhub_domain::time::{Timestamp, now};

use crate::ports::{ReadingCache, TimeSeriesStore};

/// Ingestion use-case, generic over the two sinks.
pub struct ReadingPipeline<C, T> {
    cache: C,
    store: T,
}

impl<C, T> ReadingPipeline<C, T>
where
    C: ReadingCache,
    T: TimeSeriesStore,
{
    pub fn new(cache: C, store: T) -> Self {
        Self { cache, store }
    }

    /// Process one raw telemetry frame.
    ///
    /// The frame is decoded as JSON, its `sensors` section normalized,
    /// and the resulting readings written to both sinks concurrently.
    /// Sink failures are independent: the cache write still happens when
    /// the store write fails, and vice versa.
    pub async fn handle_frame(&self, topic: &str, payload: &[u8]) -> usize {
        let frame: serde_json::Value = match serde_json::from_slice(payload) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(topic, %error, "discarding malformed telemetry frame");
                return 0;
            }
        };

        let readings = readings_from_frame(&frame);
        if readings.is_empty() {
            tracing::debug!(topic, "frame contained no numeric sensor values");
            return 0;
        }

        let (cached, stored) = tokio::join!(
            self.cache.put_latest(&readings),
            self.store.append(&readings),
        );
        if let Err(error) = cached {
            tracing::warn!(topic, %error, "cache write failed");
        }
        if let Err(error) = stored {
            tracing::warn!(topic, %error, "time-series write failed");
        }

        tracing::debug!(topic, count = readings.len(), "frame ingested");
        readings.len()
    }
}

/// Normalize the frame into readings.
///
/// Frames usually carry a `sensors` section; frames that are themselves
/// a sensor map (older firmware) are normalized whole. A `timestamp`
/// field, when present and RFC 3339, stamps the readings; otherwise the
/// arrival time does.
fn readings_from_frame(frame: &serde_json::Value) -> Vec<SensorReading> {
    let observed_at = frame
        .get("timestamp")
        .and_then(serde_json::Value::as_str)
        .and_then(parse_rfc3339)
        .unwrap_or_else(now);

    let sensors = frame.get("sensors").unwrap_or(frame);
    normalize_sensors(sensors, observed_at)
}

fn parse_rfc3339(raw: &str) -> Option<Timestamp> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmhub_domain::error::FarmHubError;
    use std::future::Future;
    use std::sync::Mutex;

    // ── In-memory sinks ────────────────────────────────────────────

    #[derive(Default)]
    struct InMemoryCache {
        entries: Mutex<Vec<(String, String)>>,
    }

    impl ReadingCache for InMemoryCache {
        fn put_latest(
            &self,
            readings: &[SensorReading],
        ) -> impl Future<Output = Result<(), FarmHubError>> + Send {
            let mut entries = self.entries.lock().unwrap();
            for reading in readings {
                entries.push((reading.sensor_id.clone(), reading.value.to_string()));
            }
            async { Ok(()) }
        }
        fn get_latest(
            &self,
            sensor_id: &str,
        ) -> impl Future<Output = Result<Option<String>, FarmHubError>> + Send {
            let entries = self.entries.lock().unwrap();
            let r = entries
                .iter()
                .rev()
                .find(|(id, _)| id == sensor_id)
                .map(|(_, v)| v.clone());
            async { Ok(r) }
        }
    }

    #[derive(Default)]
    struct InMemoryStore {
        rows: Mutex<Vec<SensorReading>>,
        fail: bool,
    }

    impl TimeSeriesStore for InMemoryStore {
        fn append(
            &self,
            readings: &[SensorReading],
        ) -> impl Future<Output = Result<(), FarmHubError>> + Send {
            let result = if self.fail {
                Err(FarmHubError::Storage("disk full".into()))
            } else {
                self.rows.lock().unwrap().extend_from_slice(readings);
                Ok(())
            };
            async { result }
        }
        fn find_by_sensor_in_range(
            &self,
            sensor_id: &str,
            from: Timestamp,
            to: Timestamp,
        ) -> impl Future<Output = Result<Vec<SensorReading>, FarmHubError>> + Send {
            let rows = self.rows.lock().unwrap();
            let r: Vec<_> = rows
                .iter()
                .filter(|r| {
                    r.sensor_id == sensor_id && r.observed_at >= from && r.observed_at < to
                })
                .cloned()
                .collect();
            async { Ok(r) }
        }
        fn purge_before(
            &self,
            before: Timestamp,
        ) -> impl Future<Output = Result<u64, FarmHubError>> + Send {
            let mut rows = self.rows.lock().unwrap();
            let len = rows.len();
            rows.retain(|r| r.observed_at >= before);
            let removed = (len - rows.len()) as u64;
            async move { Ok(removed) }
        }
    }

    fn pipeline() -> ReadingPipeline<InMemoryCache, InMemoryStore> {
        ReadingPipeline::new(InMemoryCache::default(), InMemoryStore::default())
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_write_readings_to_both_sinks() {
        let pipeline = pipeline();
        let payload = serde_json::json!({
            "device_id": "greenhouse-1",
            "sensors": {"temp": 25.5, "hum": 60}
        });

        let count = pipeline
            .handle_frame("device/greenhouse-1/data", payload.to_string().as_bytes())
            .await;

        assert_eq!(count, 2);
        assert_eq!(pipeline.store.rows.lock().unwrap().len(), 2);
        let cached = pipeline.cache.get_latest("temp").await.unwrap();
        assert_eq!(cached.as_deref(), Some("25.5"));
    }

    #[tokio::test]
    async fn should_drop_malformed_frame_without_touching_sinks() {
        let pipeline = pipeline();
        let count = pipeline
            .handle_frame("device/x/data", b"{not json")
            .await;

        assert_eq!(count, 0);
        assert!(pipeline.store.rows.lock().unwrap().is_empty());
        assert!(pipeline.cache.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_still_cache_when_store_fails() {
        let pipeline = ReadingPipeline::new(
            InMemoryCache::default(),
            InMemoryStore {
                rows: Mutex::new(Vec::new()),
                fail: true,
            },
        );
        let payload = serde_json::json!({"sensors": {"temp": 21.0}});

        let count = pipeline
            .handle_frame("device/a/data", payload.to_string().as_bytes())
            .await;

        assert_eq!(count, 1);
        let cached = pipeline.cache.get_latest("temp").await.unwrap();
        assert_eq!(cached.as_deref(), Some("21"));
    }

    #[tokio::test]
    async fn should_normalize_frame_without_sensors_section() {
        let pipeline = pipeline();
        let payload = serde_json::json!({"soil": 41.5});

        let count = pipeline
            .handle_frame("device/a/data", payload.to_string().as_bytes())
            .await;

        assert_eq!(count, 1);
        assert_eq!(pipeline.store.rows.lock().unwrap()[0].sensor_id, "soil");
    }

    #[tokio::test]
    async fn should_use_frame_timestamp_when_present() {
        let pipeline = pipeline();
        let payload = serde_json::json!({
            "timestamp": "2026-08-26T07:45:00Z",
            "sensors": {"temp": 19.0}
        });

        pipeline
            .handle_frame("device/a/data", payload.to_string().as_bytes())
            .await;

        let rows = pipeline.store.rows.lock().unwrap();
        assert_eq!(rows[0].observed_at.to_rfc3339(), "2026-08-26T07:45:00+00:00");
    }

    #[tokio::test]
    async fn should_skip_sinks_when_no_numeric_values() {
        let pipeline = pipeline();
        let payload = serde_json::json!({"sensors": {"status": "online"}});

        let count = pipeline
            .handle_frame("device/a/data", payload.to_string().as_bytes())
            .await;

        assert_eq!(count, 0);
        assert!(pipeline.store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_report_purged_row_count() {
        let pipeline = pipeline();
        let payload = serde_json::json!({"sensors": {"temp": 1.0, "hum": 2.0}});
        pipeline
            .handle_frame("device/a/data", payload.to_string().as_bytes())
            .await;

        let purged = pipeline
            .store
            .purge_before(now() + chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(purged, 2);
    }
}
