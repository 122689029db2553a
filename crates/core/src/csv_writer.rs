//! CSV encoding of canonical records.
//!
//! Output targets budgeting-tool importers: UTF-8 with a leading BOM so
//! spreadsheet software detects the encoding, every field quoted, `\n` row
//! terminators, dates as `YYYY-MM-DD`, amounts with two fractional digits.
//! Embedded double quotes are escaped by doubling per RFC 4180.

use csv::{QuoteStyle, WriterBuilder};

use crate::errors::{Error, Result};
use crate::ledger::LedgerTransaction;

/// UTF-8 byte-order mark.
const BOM: &[u8] = b"\xef\xbb\xbf";

/// Column headers in output order.
const HEADERS: [&str; 5] = ["Date", "Payee", "Notes", "Category", "Amount"];

/// Encode records into a BOM-prefixed CSV byte sequence.
pub fn encode(records: &[LedgerTransaction]) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(64 + records.len() * 64);
    buffer.extend_from_slice(BOM);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(buffer);

    writer
        .write_record(HEADERS)
        .map_err(|e| Error::Unexpected(format!("csv header write failed: {}", e)))?;

    for record in records {
        writer
            .write_record([
                record.date.format("%Y-%m-%d").to_string(),
                record.payee.clone(),
                record.notes.clone(),
                record.category.clone(),
                record.amount.to_string(),
            ])
            .map_err(|e| Error::Unexpected(format!("csv row write failed: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Unexpected(format!("csv flush failed: {}", e)))
}
