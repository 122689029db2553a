//! Ledgerport core: canonical ledger model and CSV encoding.
//!
//! This crate holds the institution-independent half of an export:
//!
//! - [`LedgerTransaction`]: the canonical transaction shape budgeting
//!   tools import, `{date, payee, notes, category, amount}`.
//! - [`amount`]: exact decimal amount construction; minor-unit integers
//!   never pass through binary floating point.
//! - [`skip`]: the non-fatal classification vocabulary; one bad record
//!   costs one row, never the batch.
//! - [`csv_writer`]: the BOM-prefixed, always-quoted CSV encoder.
//! - [`errors`]: the error taxonomy shared with the connect crate.
//!
//! Institution gateways, pagination, and orchestration live in
//! `ledgerport-connect`.

pub mod amount;
pub mod csv_writer;
pub mod errors;
pub mod ledger;
pub mod skip;

pub use errors::{Error, Result};
pub use ledger::{AccountInfo, ExportFile, LedgerTransaction, QueryWindow};
pub use skip::{Outcome, SkipEvent, SkipReason};
