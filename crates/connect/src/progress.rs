//! Progress reporting for export operations.
//!
//! The core never talks to a UI. The invoking collaborator implements
//! [`ProgressReporter`] to surface per-account progress however it likes;
//! headless callers use [`NullProgress`].

use serde::{Deserialize, Serialize};

/// Status of one account's export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    /// Pages are being drained from the institution.
    Fetching,
    /// Raw records are being classified.
    Classifying,
    /// The account's CSV blob is ready.
    Complete,
    /// The account's export was aborted by a fetch failure.
    Failed,
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportStatus::Fetching => write!(f, "fetching"),
            ExportStatus::Classifying => write!(f, "classifying"),
            ExportStatus::Complete => write!(f, "complete"),
            ExportStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Payload for export progress events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    /// The account being exported.
    pub account_id: String,
    /// Human-readable account nickname.
    pub account_name: String,
    pub status: ExportStatus,
    /// Raw records fetched so far.
    pub records_fetched: usize,
    /// Canonical rows that made it into the blob.
    pub rows_exported: usize,
    /// Optional status message.
    pub message: Option<String>,
}

impl ExportProgress {
    pub fn new(
        account_id: impl Into<String>,
        account_name: impl Into<String>,
        status: ExportStatus,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            account_name: account_name.into(),
            status,
            records_fetched: 0,
            rows_exported: 0,
            message: None,
        }
    }

    pub fn with_records_fetched(mut self, count: usize) -> Self {
        self.records_fetched = count;
        self
    }

    pub fn with_rows_exported(mut self, count: usize) -> Self {
        self.rows_exported = count;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Sink for export progress events.
pub trait ProgressReporter: Send + Sync {
    fn report_progress(&self, progress: ExportProgress);
}

/// Reporter that drops everything; the default for headless exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn report_progress(&self, _progress: ExportProgress) {}
}
