// src/pipeline/dispatch.rs

//! Alert rendering and delivery.
//!
//! Records are rendered one message each and sent sequentially in
//! extraction order. A fingerprint is recorded only after its message
//! is confirmed sent, so a failed delivery leaves the record eligible
//! for the next run. Ephemeral expiry is a spawned timer per message
//! and never affects the run's own outcome.

use std::sync::Arc;
use std::time::Duration;

use crate::models::ListingRecord;
use crate::notify::{MessageId, Notifier, NotifyError};

use super::dedup::DeduplicationStore;
use super::fetch::FetchError;

/// One failed send, identified by the record it carried.
#[derive(Debug)]
pub struct DispatchFailure {
    pub organization: String,
    pub position: String,
    pub error: NotifyError,
}

/// Outcome of one pipeline run.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Records that passed the filters
    pub matched: usize,

    /// Messages confirmed sent
    pub sent: usize,

    /// Records suppressed as already announced
    pub suppressed: usize,

    /// Send failures, in dispatch order
    pub failures: Vec<DispatchFailure>,

    /// Fetch failure that emptied this run, when one occurred
    pub fetch_error: Option<FetchError>,
}

impl DispatchReport {
    /// Report for a run whose fetch failed: zero records, error kept
    /// for the caller to log or surface.
    pub fn fetch_failed(error: FetchError) -> Self {
        Self {
            fetch_error: Some(error),
            ..Self::default()
        }
    }

    /// Whether the run completed without any recorded failure.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.fetch_error.is_none()
    }
}

/// Renders records into alert messages and delivers them.
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    destination: String,
    delete_after: Option<Duration>,
    notify_when_empty: bool,
}

impl Dispatcher {
    /// Create a dispatcher delivering to one destination.
    pub fn new(notifier: Arc<dyn Notifier>, destination: impl Into<String>) -> Self {
        Self {
            notifier,
            destination: destination.into(),
            delete_after: None,
            notify_when_empty: true,
        }
    }

    /// Expire delivered messages after the given visibility window.
    pub fn with_delete_after(mut self, window: Duration) -> Self {
        self.delete_after = (!window.is_zero()).then_some(window);
        self
    }

    /// Control whether an empty run sends a "no results" message.
    pub fn with_empty_notice(mut self, enabled: bool) -> Self {
        self.notify_when_empty = enabled;
        self
    }

    /// Send one message per record, recording fingerprints after each
    /// confirmed send. Failures accumulate; dispatch never aborts
    /// early.
    pub async fn dispatch(
        &self,
        records: &[ListingRecord],
        category: &str,
        store: &mut DeduplicationStore,
    ) -> DispatchReport {
        let mut report = DispatchReport {
            matched: records.len(),
            ..DispatchReport::default()
        };

        if records.is_empty() {
            if self.notify_when_empty {
                let text = format!("No new {category} listings found.");
                match self.notifier.send_message(&self.destination, &text).await {
                    Ok(message_id) => self.schedule_expiry(message_id),
                    Err(error) => {
                        log::warn!("Failed to send empty-run notice: {error}");
                    }
                }
            }
            return report;
        }

        for record in records {
            let fingerprint = record.fingerprint();
            if store.seen(&fingerprint) {
                report.suppressed += 1;
                continue;
            }

            let text = render_alert(record, category);
            match self.notifier.send_message(&self.destination, &text).await {
                Ok(message_id) => {
                    store.record(fingerprint);
                    report.sent += 1;
                    self.schedule_expiry(message_id);
                }
                Err(error) => {
                    log::warn!(
                        "Failed to send alert for {} / {}: {error}",
                        record.organization,
                        record.position
                    );
                    report.failures.push(DispatchFailure {
                        organization: record.organization.clone(),
                        position: record.position.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Send a plain text message outside the record flow (error
    /// mirroring, driver announcements).
    pub async fn announce(&self, text: &str) -> Result<(), NotifyError> {
        let message_id = self.notifier.send_message(&self.destination, text).await?;
        self.schedule_expiry(message_id);
        Ok(())
    }

    /// Fire-and-forget expiry timer for a delivered message.
    fn schedule_expiry(&self, message_id: MessageId) {
        let Some(window) = self.delete_after else {
            return;
        };
        if !self.notifier.supports_deletion() {
            return;
        }

        let notifier = Arc::clone(&self.notifier);
        let destination = self.destination.clone();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Err(error) = notifier.delete_message(&destination, message_id).await {
                log::debug!("Failed to expire message {message_id}: {error}");
            }
        });
    }
}

/// Render a record into the alert message body.
fn render_alert(record: &ListingRecord, category: &str) -> String {
    let mut text = format!(
        "🚨 Job Alert: {category} 🚨\n\n\
         Organization: {}\n\
         Position: {}\n\
         Qualifications: {}\n\
         Posted Date: {}\n\
         Apply By: {}\n",
        record.organization,
        record.position,
        record.qualifications,
        record.posted_date,
        record.apply_by_date,
    );
    if let Some(link) = &record.apply_link {
        text.push_str(&format!("Apply Here: {link}"));
    }
    text
}
