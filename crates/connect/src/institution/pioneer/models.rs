//! Pioneer Card API payload mirrors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::institution::Wire;

/// Request body for the transaction search endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub account_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    pub to_date: String,
    pub offset: u64,
    pub page_size: usize,
}

/// Response envelope for the transaction search endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Server-side count of everything the query matches, across pages.
    pub total_matches: u64,
    #[serde(default)]
    pub transactions: Vec<PioneerTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<PioneerAccount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PioneerAccount {
    pub account_token: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Transaction kind; the kind also implies the money's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PioneerKind {
    Purchase,
    CashAdvance,
    Fee,
    InterestCharge,
    Payment,
    Refund,
}

impl PioneerKind {
    /// Whether this kind moves money out of the account.
    pub fn is_outflow(self) -> bool {
        matches!(
            self,
            PioneerKind::Purchase
                | PioneerKind::CashAdvance
                | PioneerKind::Fee
                | PioneerKind::InterestCharge
        )
    }
}

/// Lifecycle state. Authorizations have not touched the balance yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PioneerState {
    Settled,
    Authorized,
    Declined,
}

impl PioneerState {
    pub fn as_str(self) -> &'static str {
        match self {
            PioneerState::Settled => "SETTLED",
            PioneerState::Authorized => "AUTHORIZED",
            PioneerState::Declined => "DECLINED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PioneerMerchant {
    #[serde(default)]
    pub name: Option<String>,
    /// ISO 18245 merchant category code as a 4-digit string.
    #[serde(default)]
    pub category_code: Option<String>,
}

/// One raw Pioneer transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PioneerTransaction {
    pub reference_id: String,
    pub kind: Wire<PioneerKind>,
    pub state: Wire<PioneerState>,
    pub posted_at: DateTime<Utc>,
    /// Magnitude only; the kind implies the direction.
    pub amount_cents: u64,
    #[serde(default)]
    pub merchant: Option<PioneerMerchant>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_deserializes_from_wire_json() {
        let record: PioneerTransaction = serde_json::from_value(serde_json::json!({
            "referenceId": "ref-91",
            "kind": "PURCHASE",
            "state": "SETTLED",
            "postedAt": "2025-04-02T16:05:00Z",
            "amountCents": 4217,
            "merchant": { "name": "Corner Grocer", "categoryCode": "5411" }
        }))
        .unwrap();
        assert_eq!(record.kind, Wire::Known(PioneerKind::Purchase));
        assert_eq!(record.amount_cents, 4217);
    }

    #[test]
    fn outflow_is_implied_by_kind() {
        assert!(PioneerKind::Purchase.is_outflow());
        assert!(PioneerKind::InterestCharge.is_outflow());
        assert!(!PioneerKind::Payment.is_outflow());
        assert!(!PioneerKind::Refund.is_outflow());
    }
}
