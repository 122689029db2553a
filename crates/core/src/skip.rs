//! Non-fatal classification outcomes.
//!
//! Institutions add transaction shapes over time; a partial, best-effort
//! export beats aborting on the first unknown one. A skip omits a single
//! record from the output and carries the raw record with it, so the
//! operator can recognize new shapes and add support later.

use std::fmt;

use serde::Serialize;

use crate::ledger::LedgerTransaction;

/// Result of classifying one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The record maps onto the canonical schema.
    Ledger(LedgerTransaction),
    /// The record is excluded; the reason says why.
    Skip(SkipReason),
}

/// Why a record was excluded from the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// The discriminator value is not in the dispatch table.
    UnrecognizedKind { kind: String },
    /// The lifecycle status is not in the dispatch table. Surfaced rather
    /// than silently passed through, so hidden states become visible.
    UnrecognizedStatus { status: String },
    /// The record never affected the balance: still pending, declined,
    /// or reversed.
    NotSettled { status: String },
    /// A field the classification rule requires is absent or empty.
    MissingField { field: &'static str },
    /// A secondary lookup failed; only this record is lost.
    Resolver { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnrecognizedKind { kind } => {
                write!(f, "unrecognized transaction kind {:?}", kind)
            }
            SkipReason::UnrecognizedStatus { status } => {
                write!(f, "unrecognized lifecycle status {:?}", status)
            }
            SkipReason::NotSettled { status } => {
                write!(f, "never affected the balance (status {:?})", status)
            }
            SkipReason::MissingField { field } => {
                write!(f, "required field '{}' is missing or empty", field)
            }
            SkipReason::Resolver { message } => {
                write!(f, "secondary lookup failed: {}", message)
            }
        }
    }
}

/// A recorded skip, with the raw record attached for diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct SkipEvent {
    /// Institution identifier, e.g. `"meridian"`.
    pub institution: &'static str,
    /// The account whose listing contained the record.
    pub account_id: String,
    pub reason: SkipReason,
    /// The raw record as the institution sent it.
    pub raw: serde_json::Value,
}

impl SkipEvent {
    pub fn new(
        institution: &'static str,
        account_id: impl Into<String>,
        reason: SkipReason,
        raw: &impl Serialize,
    ) -> Self {
        Self {
            institution,
            account_id: account_id.into(),
            reason,
            raw: serde_json::to_value(raw).unwrap_or(serde_json::Value::Null),
        }
    }
}
