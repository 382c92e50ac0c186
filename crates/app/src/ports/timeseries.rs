//! Time-series store port — append-only history of readings.

use std::future::Future;

use farmhub_domain::error::FarmHubError;
use farmhub_domain::reading::SensorReading;
use farmhub_domain::time::Timestamp;

/// Append-only store of historical sensor readings.
pub trait TimeSeriesStore {
    /// Append a batch of readings. Appends are independent of the cache;
    /// a failure here must not prevent cache writes.
    fn append(
        &self,
        readings: &[SensorReading],
    ) -> impl Future<Output = Result<(), FarmHubError>> + Send;

    /// Readings for one sensor within `[from, to)`, oldest first.
    fn find_by_sensor_in_range(
        &self,
        sensor_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<SensorReading>, FarmHubError>> + Send;

    /// Delete readings observed before `before`; returns how many went.
    fn purge_before(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<u64, FarmHubError>> + Send;
}
