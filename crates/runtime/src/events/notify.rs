//! Notification sink that writes attack summaries to the log.

use async_trait::async_trait;

use horde_core::HordeAttackReport;

use crate::repository::{NotificationSink, Result};

/// Delivers reports by logging their human-readable summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn deliver(&self, report: &HordeAttackReport) -> Result<()> {
        tracing::info!(
            target: "runtime::notify",
            day = report.day,
            breached = report.breached,
            deaths = report.death_count(),
            "\n{}",
            report.summary()
        );
        Ok(())
    }
}
