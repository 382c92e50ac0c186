//! `SQLite` implementation of [`TimeSeriesStore`].
//!
//! Readings are plain records, so rows map straight onto the domain
//! struct; timestamps are stored as RFC 3339 text, which sorts
//! correctly because every timestamp is UTC.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use farmhub_app::ports::TimeSeriesStore;
use farmhub_domain::error::FarmHubError;
use farmhub_domain::reading::SensorReading;
use farmhub_domain::time::Timestamp;

use crate::error::StorageError;

struct Wrapper(SensorReading);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let sensor_id: String = row.try_get("sensor_id")?;
        let sensor_type: String = row.try_get("sensor_type")?;
        let value: f64 = row.try_get("value")?;
        let observed_at_str: String = row.try_get("observed_at")?;

        let observed_at = chrono::DateTime::parse_from_rfc3339(&observed_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(SensorReading {
            sensor_id,
            sensor_type,
            value,
            observed_at,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO readings (sensor_id, sensor_type, value, observed_at)
    VALUES (?, ?, ?, ?)
";

const SELECT_BY_SENSOR_IN_RANGE: &str = r"
    SELECT sensor_id, sensor_type, value, observed_at FROM readings
    WHERE sensor_id = ? AND observed_at >= ? AND observed_at < ?
    ORDER BY observed_at ASC
";

const DELETE_BEFORE: &str = "DELETE FROM readings WHERE observed_at < ?";

/// `SQLite`-backed reading time-series store.
pub struct SqliteReadingStore {
    pool: SqlitePool,
}

impl SqliteReadingStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TimeSeriesStore for SqliteReadingStore {
    async fn append(&self, readings: &[SensorReading]) -> Result<(), FarmHubError> {
        if readings.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        for reading in readings {
            sqlx::query(INSERT)
                .bind(&reading.sensor_id)
                .bind(&reading.sensor_type)
                .bind(reading.value)
                .bind(reading.observed_at.to_rfc3339())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
        }
        tx.commit().await.map_err(StorageError::from)?;
        Ok(())
    }

    async fn find_by_sensor_in_range(
        &self,
        sensor_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<SensorReading>, FarmHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SENSOR_IN_RANGE)
            .bind(sensor_id)
            .bind(from.to_rfc3339())
            .bind(to.to_rfc3339())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn purge_before(&self, before: Timestamp) -> Result<u64, FarmHubError> {
        let result = sqlx::query(DELETE_BEFORE)
            .bind(before.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(result.rows_affected())
    }
}
