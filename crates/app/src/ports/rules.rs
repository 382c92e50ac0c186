//! Rule repository port — persistence for automation rules.
//!
//! Rules are authored elsewhere; this system reads them and writes back
//! only `last_triggered`.

use std::future::Future;

use farmhub_domain::error::FarmHubError;
use farmhub_domain::id::RuleId;
use farmhub_domain::rule::Rule;
use farmhub_domain::time::Timestamp;

/// Repository for persisting and querying [`Rule`]s.
pub trait RuleRepository {
    /// Create a new rule in storage.
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, FarmHubError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, FarmHubError>> + Send;

    /// Get all rules.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, FarmHubError>> + Send;

    /// Get all enabled rules.
    fn get_enabled(&self) -> impl Future<Output = Result<Vec<Rule>, FarmHubError>> + Send;

    /// Update an existing rule.
    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, FarmHubError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), FarmHubError>> + Send;

    /// Record that a rule triggered at `at`.
    fn mark_triggered(
        &self,
        id: RuleId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), FarmHubError>> + Send;
}
