//! `ReadingCache` implementation backed by Redis.
//!
//! Each sensor's latest value is stored as a bare scalar string under
//! `{prefix}:{sensor_id}`, so `redis-cli GET sensor:temp` answers
//! `"25.5"` and any consumer can read it without extra context.

use redis::AsyncCommands;

use farmhub_app::ports::ReadingCache;
use farmhub_domain::error::FarmHubError;
use farmhub_domain::reading::SensorReading;

use crate::config::RedisConfig;
use crate::error::CacheError;

/// Latest-value cache on a Redis server.
#[derive(Debug, Clone)]
pub struct RedisReadingCache {
    client: redis::Client,
    key_prefix: String,
    ttl_secs: Option<u64>,
}

impl RedisReadingCache {
    /// Build the client. Does not touch the network; the first command
    /// establishes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] when the URL does not parse.
    pub fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.url.as_str()).map_err(CacheError::Config)?;
        Ok(Self {
            client,
            key_prefix: config.key_prefix.clone(),
            ttl_secs: config.ttl_secs,
        })
    }

    fn key(&self, sensor_id: &str) -> String {
        format!("{}:{}", self.key_prefix, sensor_id)
    }

    fn value_text(reading: &SensorReading) -> String {
        reading.value.to_string()
    }
}

impl ReadingCache for RedisReadingCache {
    /// All writes for one frame go out as a single pipeline round-trip.
    async fn put_latest(&self, readings: &[SensorReading]) -> Result<(), FarmHubError> {
        if readings.is_empty() {
            return Ok(());
        }

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(CacheError::Command)?;

        let mut pipe = redis::pipe();
        for reading in readings {
            let cmd = pipe
                .cmd("SET")
                .arg(self.key(&reading.sensor_id))
                .arg(Self::value_text(reading));
            if let Some(ttl) = self.ttl_secs {
                cmd.arg("EX").arg(ttl);
            }
        }
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .map_err(CacheError::Command)?;

        tracing::trace!(count = readings.len(), "cached latest values");
        Ok(())
    }

    async fn get_latest(&self, sensor_id: &str) -> Result<Option<String>, FarmHubError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(CacheError::Command)?;

        let value: Option<String> = conn
            .get(self.key(sensor_id))
            .await
            .map_err(CacheError::Command)?;
        Ok(value)
    }
}
