//! Canonical, institution-independent transaction model.
//!
//! Raw institution records are mapped onto [`LedgerTransaction`] by the
//! per-institution classifiers; everything downstream (grouping, CSV
//! encoding) only ever sees this shape.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// MIME type of every blob this library produces.
pub const CSV_MEDIA_TYPE: &str = "text/csv";

/// One normalized ledger row, ready for CSV encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Calendar day in the viewer's time zone.
    pub date: NaiveDate,
    /// Who the money went to or came from. Never empty; a record that
    /// cannot produce a payee is skipped instead.
    pub payee: String,
    /// Free-form memo: payment references, statement descriptions.
    pub notes: String,
    /// Budgeting category; empty when the institution gives no signal.
    pub category: String,
    /// Signed amount with exactly two fractional digits.
    /// Negative means money leaving the account.
    pub amount: Decimal,
}

/// An account as the institution reports it.
///
/// Used to resolve internal-transfer counterparties and to name output
/// files; never mutated by the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Opaque institution-side identifier.
    pub id: String,
    /// Human-readable name, e.g. "Everyday Checking".
    pub nickname: String,
}

/// Date range requested from an institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    /// Inclusive start. `None` asks for all history the API will serve,
    /// subject to the institution's own retention window.
    pub start: Option<NaiveDate>,
    /// Inclusive end.
    pub end: NaiveDate,
}

impl QueryWindow {
    pub fn new(start: Option<NaiveDate>, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// A named byte blob produced for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File name derived from the account nickname, e.g.
    /// `Everyday Checking.csv`.
    pub name: String,
    /// Always [`CSV_MEDIA_TYPE`].
    pub media_type: &'static str,
    /// UTF-8 CSV bytes, BOM-prefixed.
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Wrap encoded CSV bytes under a file name.
    pub fn csv(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: CSV_MEDIA_TYPE,
            bytes,
        }
    }
}
