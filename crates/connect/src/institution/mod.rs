//! Institution gateway contract.
//!
//! One implementation per institution. A gateway knows how to list its
//! accounts, fetch one page of raw records, and classify a raw record into
//! the canonical schema, consulting its own secondary endpoints when a
//! record references another entity (a sibling account, a wire transfer's
//! other end).

pub mod atlas;
pub mod meridian;
pub mod pioneer;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use ledgerport_core::errors::Result;
use ledgerport_core::ledger::AccountInfo;
use ledgerport_core::skip::Outcome;

use crate::pagination::{Page, PageRequest};

/// A discriminator field as it appears on the wire.
///
/// Known values parse into the institution's closed enum, keeping the
/// classifier match exhaustive at compile time; anything the institution
/// adds later is preserved verbatim so the skip diagnostic can name it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Wire<K> {
    Known(K),
    Unrecognized(String),
}

/// Classification environment shared across one export.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext {
    /// The viewer's time zone. Record timestamps are truncated to a
    /// calendar day in this zone, matching how a human reconciles
    /// statements against the banking site.
    pub timezone: Tz,
}

impl ClassifyContext {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Truncate an instant to the viewer's calendar day.
    pub fn calendar_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }
}

/// A gateway to one institution's private API.
///
/// Implementations differ in how a page request is built, how the response
/// envelope is parsed, and how the next cursor is derived; the shared drain
/// loop in [`crate::pagination`] owns the termination policy.
#[async_trait]
pub trait Institution: Send + Sync {
    /// The institution's raw record shape. Opaque to the core except for
    /// classification; serializable so skip diagnostics can carry it.
    type Record: Serialize + Send + Sync;

    /// Short identifier used in logs and skip events, e.g. `"meridian"`.
    fn id(&self) -> &'static str;

    /// Fetch account metadata (ids and nicknames), once per export.
    async fn list_accounts(&self) -> Result<Vec<AccountInfo>>;

    /// Fetch one page of raw records for an account.
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Page<Self::Record>>;

    /// Map one raw record onto the canonical schema, or skip it.
    ///
    /// Infallible: a failed secondary lookup becomes a
    /// [`ledgerport_core::skip::SkipReason::Resolver`] skip for this record
    /// only, so one bad lookup never loses the batch.
    async fn classify(&self, context: &ClassifyContext, record: &Self::Record) -> Outcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    enum Sample {
        CardPayment,
        Fee,
    }

    #[test]
    fn wire_parses_known_values() {
        let kind: Wire<Sample> = serde_json::from_str("\"CARD_PAYMENT\"").unwrap();
        assert_eq!(kind, Wire::Known(Sample::CardPayment));
    }

    #[test]
    fn wire_preserves_unknown_values() {
        let kind: Wire<Sample> = serde_json::from_str("\"CRYPTO_REWARD\"").unwrap();
        assert_eq!(kind, Wire::Unrecognized("CRYPTO_REWARD".to_string()));
    }

    #[test]
    fn calendar_day_uses_the_viewer_zone() {
        let context = ClassifyContext::new(chrono_tz::America::New_York);
        // 02:30 UTC on March 1st is still the previous evening in New York.
        let instant = "2024-03-01T02:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            context.calendar_day(instant),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }
}
