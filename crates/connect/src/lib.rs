//! Ledgerport Connect: institution gateways and export orchestration.
//!
//! This crate drains a financial institution's private transaction API
//! into raw records, classifies each record into the canonical ledger
//! schema, and produces one CSV blob per exported account.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |     Exporter     |  (account selection + date window)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |    fetch_all     | --> |   Institution    |  (Meridian, Atlas, Pioneer)
//! |  (drain loop)    |     |   fetch_page     |
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |     classify     | --> |   LookupCache    |  (nicknames, transfer
//! | (dispatch table) |     | (secondary GETs) |   counterparts)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |   CSV encoder    |  (ledgerport-core)
//! +------------------+
//! ```
//!
//! Credentials are supplied by the invoking collaborator; this crate never
//! acquires or renews them. Nothing is persisted: the export terminates
//! once it hands back named byte blobs.

pub mod client;
pub mod exporter;
pub mod institution;
pub mod pagination;
pub mod progress;
pub mod resolver;

pub use client::{ApiClient, Credential};
pub use exporter::{
    AccountFailure, ExportConfig, ExportOutput, ExportSummary, Exporter,
};
pub use institution::atlas::AtlasTrust;
pub use institution::meridian::Meridian;
pub use institution::pioneer::PioneerCard;
pub use institution::{ClassifyContext, Institution, Wire};
pub use pagination::{fetch_all, FetchConfig, Page, PageRequest};
pub use progress::{ExportProgress, ExportStatus, NullProgress, ProgressReporter};
pub use resolver::{BankDescriptor, LookupCache};
