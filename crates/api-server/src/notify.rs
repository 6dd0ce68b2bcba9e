//! Transactional notifications
//!
//! Fire-and-forget confirmations delivered through an external sender.
//! Delivery failure never fails the mutation that triggered it; callers
//! log and move on.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound notification sender.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Confirmation that a company listing was submitted for review.
    async fn company_submitted(&self, email: &str, company_name: &str)
        -> Result<(), NotifyError>;
}

/// Notifier that only logs. Stands in for the external email sender in
/// development and tests.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn company_submitted(
        &self,
        email: &str,
        company_name: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(email, company_name, "company submission confirmation");
        Ok(())
    }
}
