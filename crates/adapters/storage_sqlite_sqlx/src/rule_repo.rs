//! `SQLite` implementation of [`RuleRepository`].
//!
//! List queries decode rows one by one: a row that fails to decode
//! (unknown action kind, malformed actions JSON, bad timestamp) is
//! logged and skipped, so one corrupt rule never hides the others from
//! the engine. Single-row lookups surface the decode error instead.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use farmhub_app::ports::RuleRepository;
use farmhub_domain::error::FarmHubError;
use farmhub_domain::id::{DeviceId, FarmId, RuleId, UserId};
use farmhub_domain::rule::{Rule, RuleAction, TriggerType};
use farmhub_domain::time::Timestamp;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(Rule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Rule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let owner_id: uuid::Uuid = row.try_get("owner_id")?;
        let farm_id: uuid::Uuid = row.try_get("farm_id")?;
        let name: String = row.try_get("name")?;
        let description: Option<String> = row.try_get("description")?;
        let trigger_str: String = row.try_get("trigger_type")?;
        let sensor_id: Option<String> = row.try_get("sensor_id")?;
        let device_id: Option<uuid::Uuid> = row.try_get("device_id")?;
        let expression: String = row.try_get("expression")?;
        let cooldown_seconds: i64 = row.try_get("cooldown_seconds")?;
        let last_triggered_str: Option<String> = row.try_get("last_triggered")?;
        let enabled: bool = row.try_get("enabled")?;
        let actions_json: String = row.try_get("actions")?;

        let trigger: TriggerType = serde_json::from_str(&format!("\"{trigger_str}\""))
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let actions: Vec<RuleAction> = serde_json::from_str(&actions_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_triggered = last_triggered_str
            .map(|s| {
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.to_utc())
                    .map_err(|err| sqlx::Error::Decode(Box::new(err)))
            })
            .transpose()?;
        let cooldown_seconds =
            u32::try_from(cooldown_seconds).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Rule {
            id: RuleId::from_uuid(id),
            owner_id: UserId::from_uuid(owner_id),
            farm_id: FarmId::from_uuid(farm_id),
            name,
            description,
            trigger,
            sensor_id,
            device_id: device_id.map(DeviceId::from_uuid),
            expression,
            cooldown_seconds,
            last_triggered,
            enabled,
            actions,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO rules (id, owner_id, farm_id, name, description, trigger_type, sensor_id,
                       device_id, expression, cooldown_seconds, last_triggered, enabled, actions)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE: &str = r"
    UPDATE rules
    SET owner_id = ?, farm_id = ?, name = ?, description = ?, trigger_type = ?, sensor_id = ?,
        device_id = ?, expression = ?, cooldown_seconds = ?, last_triggered = ?, enabled = ?,
        actions = ?
    WHERE id = ?
";

/// Decode fetched rows individually, skipping the ones that fail.
fn decode_rows(rows: &[SqliteRow]) -> Vec<Rule> {
    rows.iter()
        .filter_map(|row| match Wrapper::from_row(row) {
            Ok(wrapper) => Some(wrapper.0),
            Err(error) => {
                let id = row
                    .try_get::<uuid::Uuid, _>("id")
                    .map_or_else(|_| "<unreadable>".to_string(), |u| u.to_string());
                tracing::warn!(rule_id = %id, %error, "skipping undecodable rule row");
                None
            }
        })
        .collect()
}

/// `SQLite`-backed rule repository.
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create(&self, rule: Rule) -> Result<Rule, FarmHubError> {
        let actions_json = serde_json::to_string(&rule.actions).map_err(StorageError::from)?;
        let last_triggered = rule.last_triggered.map(|ts| ts.to_rfc3339());

        sqlx::query(INSERT)
            .bind(rule.id.as_uuid())
            .bind(rule.owner_id.as_uuid())
            .bind(rule.farm_id.as_uuid())
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.trigger.to_string())
            .bind(&rule.sensor_id)
            .bind(rule.device_id.map(DeviceId::as_uuid))
            .bind(&rule.expression)
            .bind(i64::from(rule.cooldown_seconds))
            .bind(&last_triggered)
            .bind(rule.enabled)
            .bind(&actions_json)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<Rule>, FarmHubError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM rules WHERE id = ?")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Rule>, FarmHubError> {
        let rows = sqlx::query("SELECT * FROM rules ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(decode_rows(&rows))
    }

    async fn get_enabled(&self) -> Result<Vec<Rule>, FarmHubError> {
        let rows = sqlx::query("SELECT * FROM rules WHERE enabled = 1 ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(decode_rows(&rows))
    }

    async fn update(&self, rule: Rule) -> Result<Rule, FarmHubError> {
        let actions_json = serde_json::to_string(&rule.actions).map_err(StorageError::from)?;
        let last_triggered = rule.last_triggered.map(|ts| ts.to_rfc3339());

        sqlx::query(UPDATE)
            .bind(rule.owner_id.as_uuid())
            .bind(rule.farm_id.as_uuid())
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.trigger.to_string())
            .bind(&rule.sensor_id)
            .bind(rule.device_id.map(DeviceId::as_uuid))
            .bind(&rule.expression)
            .bind(i64::from(rule.cooldown_seconds))
            .bind(&last_triggered)
            .bind(rule.enabled)
            .bind(&actions_json)
            .bind(rule.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), FarmHubError> {
        sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn mark_triggered(&self, id: RuleId, at: Timestamp) -> Result<(), FarmHubError> {
        sqlx::query("UPDATE rules SET last_triggered = ? WHERE id = ?")
            .bind(at.to_rfc3339())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
