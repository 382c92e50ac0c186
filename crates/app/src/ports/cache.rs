//! Reading cache port — latest-value store keyed by sensor id.

use std::future::Future;

use farmhub_domain::error::FarmHubError;
use farmhub_domain::reading::SensorReading;

/// Latest-value cache for sensor readings.
///
/// Writes overwrite; only the most recent value per sensor is kept. Reads
/// return the raw cached string so the engine can decide how to interpret
/// it (JSON document or bare number).
pub trait ReadingCache {
    /// Store the latest value for each reading, overwriting previous ones.
    fn put_latest(
        &self,
        readings: &[SensorReading],
    ) -> impl Future<Output = Result<(), FarmHubError>> + Send;

    /// Fetch the cached value for a sensor, if any.
    fn get_latest(
        &self,
        sensor_id: &str,
    ) -> impl Future<Output = Result<Option<String>, FarmHubError>> + Send;
}
