//! Export orchestration.
//!
//! Sequences account resolution, pagination, classification, and encoding,
//! producing one named CSV blob per selected account. A fetch failure loses
//! only the account it struck; blobs already produced stay in the output.
//! A second `export` call while one is running fails fast with
//! [`Error::Busy`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use log::{error, info, warn};
use serde::Serialize;

use ledgerport_core::csv_writer;
use ledgerport_core::errors::{Error, Result};
use ledgerport_core::ledger::{AccountInfo, ExportFile, QueryWindow};
use ledgerport_core::skip::{Outcome, SkipEvent};

use crate::institution::{ClassifyContext, Institution};
use crate::pagination::{fetch_all, FetchConfig};
use crate::progress::{ExportProgress, ExportStatus, NullProgress, ProgressReporter};

/// Configuration for one exporter.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// The viewer's time zone; drives calendar-day truncation and the
    /// "today" end of the query window.
    pub timezone: Tz,
    pub fetch: FetchConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            fetch: FetchConfig::default(),
        }
    }
}

/// A per-account failure that did not abort the rest of the export.
#[derive(Debug)]
pub struct AccountFailure {
    pub account_id: String,
    pub error: Error,
}

/// Counters for one export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub accounts_exported: usize,
    pub accounts_failed: usize,
    /// Raw records drained from the institution.
    pub fetched: usize,
    /// Canonical rows that made it into a blob.
    pub exported: usize,
    /// Records dropped with a diagnostic.
    pub skipped: usize,
}

/// Everything one export produced.
#[derive(Debug, Default)]
pub struct ExportOutput {
    /// One CSV blob per account that completed, keyed by account id.
    pub files: HashMap<String, ExportFile>,
    /// Skip diagnostics across all accounts, raw records attached.
    pub skips: Vec<SkipEvent>,
    /// Accounts whose export aborted mid-fetch.
    pub failures: Vec<AccountFailure>,
    pub summary: ExportSummary,
}

/// Drives one institution's full export pipeline.
pub struct Exporter<I: Institution> {
    institution: I,
    config: ExportConfig,
    reporter: Arc<dyn ProgressReporter>,
    busy: AtomicBool,
}

impl<I: Institution> Exporter<I> {
    pub fn new(institution: I, config: ExportConfig) -> Self {
        Self::with_reporter(institution, config, Arc::new(NullProgress))
    }

    pub fn with_reporter(
        institution: I,
        config: ExportConfig,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            institution,
            config,
            reporter,
            busy: AtomicBool::new(false),
        }
    }

    /// Export the selected accounts into one CSV blob each.
    ///
    /// `start_date` of `None` asks for all history the institution will
    /// serve. Account metadata is resolved once; a failure there aborts the
    /// whole call, while a fetch failure on one account only loses that
    /// account. Fails fast with [`Error::Busy`] while a previous call on
    /// this exporter is still running.
    pub async fn export(
        &self,
        account_ids: &[String],
        start_date: Option<NaiveDate>,
    ) -> Result<ExportOutput> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let today = Utc::now().with_timezone(&self.config.timezone).date_naive();
        let window = QueryWindow::new(start_date, today);
        let context = ClassifyContext::new(self.config.timezone);

        info!(
            "[{}] starting export of {} accounts ({} -> {})",
            self.institution.id(),
            account_ids.len(),
            start_date.map_or("ALL".to_string(), |d| d.to_string()),
            window.end
        );

        let known = self.institution.list_accounts().await?;

        let mut output = ExportOutput::default();
        for account_id in account_ids {
            let Some(account) = known.iter().find(|account| &account.id == account_id) else {
                warn!(
                    "[{}] requested account {} is not in the institution's listing",
                    self.institution.id(),
                    account_id
                );
                output.failures.push(AccountFailure {
                    account_id: account_id.clone(),
                    error: Error::Unexpected(format!("unknown account id {}", account_id)),
                });
                output.summary.accounts_failed += 1;
                continue;
            };

            match self
                .export_account(&context, account, &window, &mut output)
                .await
            {
                Ok(()) => output.summary.accounts_exported += 1,
                Err(err) => {
                    error!(
                        "[{}] export failed for '{}': {}",
                        self.institution.id(),
                        account.nickname,
                        err
                    );
                    self.reporter.report_progress(
                        ExportProgress::new(&account.id, &account.nickname, ExportStatus::Failed)
                            .with_message(err.to_string()),
                    );
                    output.failures.push(AccountFailure {
                        account_id: account.id.clone(),
                        error: err,
                    });
                    output.summary.accounts_failed += 1;
                }
            }
        }

        info!(
            "[{}] export finished: {} accounts, {} rows, {} skipped, {} failed",
            self.institution.id(),
            output.summary.accounts_exported,
            output.summary.exported,
            output.summary.skipped,
            output.summary.accounts_failed
        );
        Ok(output)
    }

    async fn export_account(
        &self,
        context: &ClassifyContext,
        account: &AccountInfo,
        window: &QueryWindow,
        output: &mut ExportOutput,
    ) -> Result<()> {
        self.reporter.report_progress(ExportProgress::new(
            &account.id,
            &account.nickname,
            ExportStatus::Fetching,
        ));

        let raw = fetch_all(&self.institution, &account.id, window, &self.config.fetch).await?;
        output.summary.fetched += raw.len();

        self.reporter.report_progress(
            ExportProgress::new(&account.id, &account.nickname, ExportStatus::Classifying)
                .with_records_fetched(raw.len()),
        );

        let mut rows = Vec::with_capacity(raw.len());
        for record in &raw {
            match self.institution.classify(context, record).await {
                Outcome::Ledger(row) => rows.push(row),
                Outcome::Skip(reason) => {
                    let event = SkipEvent::new(self.institution.id(), &account.id, reason, record);
                    warn!(
                        "[{}] skipping record for '{}': {} (raw: {})",
                        self.institution.id(),
                        account.nickname,
                        event.reason,
                        event.raw
                    );
                    output.skips.push(event);
                    output.summary.skipped += 1;
                }
            }
        }
        output.summary.exported += rows.len();

        let bytes = csv_writer::encode(&rows)?;
        self.reporter.report_progress(
            ExportProgress::new(&account.id, &account.nickname, ExportStatus::Complete)
                .with_records_fetched(raw.len())
                .with_rows_exported(rows.len()),
        );
        output.files.insert(
            account.id.clone(),
            ExportFile::csv(file_name(&account.nickname), bytes),
        );
        Ok(())
    }
}

/// RAII guard for the in-flight flag.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Turn an account nickname into a safe file name.
fn file_name(nickname: &str) -> String {
    let cleaned: String = nickname
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '\0') {
                '-'
            } else {
                c
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "account.csv".to_string()
    } else {
        format!("{}.csv", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_guard_is_exclusive_until_dropped() {
        let flag = AtomicBool::new(false);

        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(matches!(BusyGuard::acquire(&flag), Err(Error::Busy)));

        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(file_name("Everyday Checking"), "Everyday Checking.csv");
        assert_eq!(file_name("ops/payroll"), "ops-payroll.csv");
        assert_eq!(file_name("  "), "account.csv");
    }
}
