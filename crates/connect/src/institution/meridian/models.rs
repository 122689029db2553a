//! Meridian API payload mirrors.
//!
//! Field names follow the institution's JSON. Discriminators are closed
//! enums behind [`Wire`], so the classifier match is exhaustive while wire
//! values Meridian adds later still land on a runtime fallback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::institution::Wire;

/// Request body for the transaction listing endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest<'a> {
    pub account_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<&'a str>,
}

/// Response envelope for the transaction listing endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub items: Vec<MeridianTransaction>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<MeridianAccount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeridianAccount {
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Transaction kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeridianKind {
    CardPayment,
    DirectDebit,
    StandingOrder,
    InternalTransfer,
    PaymentIn,
    PaymentOut,
    Fee,
    Interest,
}

/// Lifecycle status. Only `BOOKED` transactions have touched the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeridianStatus {
    Booked,
    Pending,
    Declined,
    Reversed,
}

impl MeridianStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MeridianStatus::Booked => "BOOKED",
            MeridianStatus::Pending => "PENDING",
            MeridianStatus::Declined => "DECLINED",
            MeridianStatus::Reversed => "REVERSED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    #[serde(default)]
    pub name: Option<String>,
    /// Meridian's own spending bucket, e.g. `"groceries"`.
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counterparty {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
}

/// One raw Meridian transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeridianTransaction {
    pub id: String,
    pub kind: Wire<MeridianKind>,
    pub status: Wire<MeridianStatus>,
    pub created_at: DateTime<Utc>,
    /// Signed minor units; negative means money out.
    pub amount_minor: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub merchant: Option<Merchant>,
    #[serde(default)]
    pub counterparty: Option<Counterparty>,
    /// Present on internal transfers: the sibling account's id.
    #[serde(default)]
    pub counterpart_account_id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}
