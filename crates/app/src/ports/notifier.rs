//! Notifier port — outbound notifications for `send_notification` actions.

use std::future::Future;

use farmhub_domain::error::FarmHubError;

/// Delivers a notification to a recipient.
pub trait Notifier {
    fn notify(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), FarmHubError>> + Send;
}

/// Notifier that records deliveries in the log and always succeeds.
///
/// Stands in until a real mail or push integration is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, to: &str, subject: &str, body: &str) -> Result<(), FarmHubError> {
        tracing::info!(to, subject, body, "notification");
        Ok(())
    }
}
