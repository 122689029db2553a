//! Pioneer Card issuer gateway.
//!
//! Pioneer's search endpoint reports a `totalMatches` count instead of a
//! has-more flag; the cursor is a plain numeric offset. Amounts are
//! unsigned cent magnitudes whose direction is implied by the transaction
//! kind: purchases, fees, interest, and cash advances leave the account,
//! payments and refunds come back in.

pub mod models;

use async_trait::async_trait;

use ledgerport_core::amount;
use ledgerport_core::errors::{Error, Result};
use ledgerport_core::ledger::{AccountInfo, LedgerTransaction};
use ledgerport_core::skip::{Outcome, SkipReason};

use crate::client::{ApiClient, Credential};
use crate::institution::{ClassifyContext, Institution, Wire};
use crate::pagination::{Page, PageRequest};

use models::{
    AccountsResponse, PioneerKind, PioneerState, PioneerTransaction, SearchRequest, SearchResponse,
};

const INSTITUTION_ID: &str = "pioneer";

/// Gateway to Pioneer Card's private web API.
pub struct PioneerCard {
    api: ApiClient,
}

impl PioneerCard {
    pub const DEFAULT_BASE_URL: &'static str = "https://online.pioneercard.com";

    pub fn new(base_url: &str, credential: &Credential) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, credential)?,
        })
    }
}

/// Bucket an ISO 18245 merchant category code into a budgeting category.
fn category_for_code(code: &str) -> &'static str {
    match code {
        "5411" | "5422" | "5451" | "5462" => "Groceries",
        "5541" | "5542" => "Fuel",
        c if c.starts_with("58") => "Dining Out",
        c if c.starts_with("45") || c.starts_with("70") => "Travel",
        c if c.starts_with("41") => "Transport",
        c if c.starts_with("78") || c.starts_with("79") => "Entertainment",
        "5912" => "Health",
        c if c.starts_with("80") => "Health",
        c if c.starts_with("49") => "Bills",
        c if c.starts_with("53") || c.starts_with("56") || c.starts_with("57") => "Shopping",
        _ => "",
    }
}

fn nonempty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Institution for PioneerCard {
    type Record = PioneerTransaction;

    fn id(&self) -> &'static str {
        INSTITUTION_ID
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>> {
        let response: AccountsResponse = self.api.get("/api/accounts", &[]).await?;
        Ok(response
            .accounts
            .into_iter()
            .map(|account| AccountInfo {
                nickname: account
                    .display_name
                    .unwrap_or_else(|| account.account_token.clone()),
                id: account.account_token,
            })
            .collect())
    }

    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Page<PioneerTransaction>> {
        let offset: u64 = match request.cursor {
            None => 0,
            Some(cursor) => cursor.parse().map_err(|_| {
                Error::Unexpected(format!("non-numeric pagination offset {:?}", cursor))
            })?,
        };

        let body = SearchRequest {
            account_token: request.account_id,
            from_date: request.window.start.map(|d| d.format("%Y-%m-%d").to_string()),
            to_date: request.window.end.format("%Y-%m-%d").to_string(),
            offset,
            page_size: request.page_size,
        };
        let response: SearchResponse = self.api.post("/api/transactions/search", &body).await?;

        Ok(Page {
            next_cursor: Some((offset + response.transactions.len() as u64).to_string()),
            has_more: None,
            total_matches: Some(response.total_matches),
            records: response.transactions,
        })
    }

    async fn classify(&self, context: &ClassifyContext, record: &PioneerTransaction) -> Outcome {
        let state = match &record.state {
            Wire::Known(state) => *state,
            Wire::Unrecognized(state) => {
                return Outcome::Skip(SkipReason::UnrecognizedStatus {
                    status: state.clone(),
                })
            }
        };
        match state {
            PioneerState::Settled => {}
            PioneerState::Authorized | PioneerState::Declined => {
                return Outcome::Skip(SkipReason::NotSettled {
                    status: state.as_str().to_string(),
                })
            }
        }

        let kind = match &record.kind {
            Wire::Known(kind) => *kind,
            Wire::Unrecognized(kind) => {
                return Outcome::Skip(SkipReason::UnrecognizedKind { kind: kind.clone() })
            }
        };

        let date = context.calendar_day(record.posted_at);
        let amount = amount::from_magnitude(record.amount_cents, kind.is_outflow());
        let notes = record.description.clone().unwrap_or_default();
        let merchant_name = nonempty(record.merchant.as_ref().and_then(|m| m.name.as_deref()));
        let merchant_bucket = record
            .merchant
            .as_ref()
            .and_then(|m| m.category_code.as_deref())
            .map(category_for_code)
            .unwrap_or("");

        let (payee, category) = match kind {
            PioneerKind::Purchase | PioneerKind::Refund => {
                let Some(name) = merchant_name else {
                    return Outcome::Skip(SkipReason::MissingField {
                        field: "merchant.name",
                    });
                };
                (name, merchant_bucket.to_string())
            }
            PioneerKind::CashAdvance => (
                merchant_name.unwrap_or_else(|| "Cash advance".to_string()),
                "Cash Withdrawal".to_string(),
            ),
            PioneerKind::Fee => ("Pioneer Card".to_string(), "Bank Fees".to_string()),
            PioneerKind::InterestCharge => ("Pioneer Card".to_string(), "Interest".to_string()),
            PioneerKind::Payment => ("Payment received".to_string(), String::new()),
        };

        Outcome::Ledger(LedgerTransaction {
            date,
            payee,
            notes,
            category,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn gateway() -> PioneerCard {
        PioneerCard::new(
            PioneerCard::DEFAULT_BASE_URL,
            &Credential::Bearer("test-token".to_string()),
        )
        .unwrap()
    }

    fn context() -> ClassifyContext {
        ClassifyContext::new(chrono_tz::America::New_York)
    }

    fn record(value: serde_json::Value) -> PioneerTransaction {
        serde_json::from_value(value).unwrap()
    }

    fn settled(kind: &str, extra: serde_json::Value) -> PioneerTransaction {
        let mut base = json!({
            "referenceId": "ref-91",
            "kind": kind,
            "state": "SETTLED",
            "postedAt": "2025-04-02T16:05:00Z",
            "amountCents": 4217
        });
        base.as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        record(base)
    }

    fn expect_ledger(outcome: Outcome) -> LedgerTransaction {
        match outcome {
            Outcome::Ledger(row) => row,
            Outcome::Skip(reason) => panic!("expected a ledger row, got skip: {}", reason),
        }
    }

    #[tokio::test]
    async fn purchases_are_negative_with_merchant_and_bucket() {
        let raw = settled(
            "PURCHASE",
            json!({ "merchant": { "name": "Corner Grocer", "categoryCode": "5411" } }),
        );
        let row = expect_ledger(gateway().classify(&context(), &raw).await);
        assert_eq!(row.payee, "Corner Grocer");
        assert_eq!(row.category, "Groceries");
        assert_eq!(row.amount, dec!(-42.17));
    }

    #[tokio::test]
    async fn refunds_come_back_positive() {
        let raw = settled(
            "REFUND",
            json!({ "merchant": { "name": "Corner Grocer", "categoryCode": "5411" } }),
        );
        let row = expect_ledger(gateway().classify(&context(), &raw).await);
        assert_eq!(row.amount, dec!(42.17));
    }

    #[tokio::test]
    async fn purchase_without_merchant_name_is_skipped() {
        let raw = settled("PURCHASE", json!({ "merchant": { "categoryCode": "5411" } }));
        assert_eq!(
            gateway().classify(&context(), &raw).await,
            Outcome::Skip(SkipReason::MissingField {
                field: "merchant.name"
            })
        );
    }

    #[tokio::test]
    async fn payments_reduce_the_card_balance() {
        let mut raw = settled("PAYMENT", json!({}));
        raw.amount_cents = 50_000;
        let row = expect_ledger(gateway().classify(&context(), &raw).await);
        assert_eq!(row.payee, "Payment received");
        assert_eq!(row.amount, dec!(500.00));
        assert_eq!(row.category, "");
    }

    #[tokio::test]
    async fn cash_advance_without_merchant_still_exports() {
        let row = expect_ledger(
            gateway()
                .classify(&context(), &settled("CASH_ADVANCE", json!({})))
                .await,
        );
        assert_eq!(row.payee, "Cash advance");
        assert_eq!(row.category, "Cash Withdrawal");
        assert_eq!(row.amount, dec!(-42.17));
    }

    #[tokio::test]
    async fn fees_and_interest_use_the_institution_name() {
        let fee = expect_ledger(gateway().classify(&context(), &settled("FEE", json!({}))).await);
        assert_eq!(fee.payee, "Pioneer Card");
        assert_eq!(fee.amount, dec!(-42.17));

        let interest = expect_ledger(
            gateway()
                .classify(&context(), &settled("INTEREST_CHARGE", json!({})))
                .await,
        );
        assert_eq!(interest.category, "Interest");
    }

    #[tokio::test]
    async fn authorizations_and_declines_never_reach_the_ledger() {
        for state in ["AUTHORIZED", "DECLINED"] {
            let raw = record(json!({
                "referenceId": "ref-91",
                "kind": "PURCHASE",
                "state": state,
                "postedAt": "2025-04-02T16:05:00Z",
                "amountCents": 4217,
                "merchant": { "name": "Corner Grocer" }
            }));
            assert_eq!(
                gateway().classify(&context(), &raw).await,
                Outcome::Skip(SkipReason::NotSettled {
                    status: state.to_string()
                })
            );
        }
    }

    #[tokio::test]
    async fn unknown_kind_and_state_are_skips() {
        let raw = settled("BALANCE_TRANSFER", json!({}));
        assert_eq!(
            gateway().classify(&context(), &raw).await,
            Outcome::Skip(SkipReason::UnrecognizedKind {
                kind: "BALANCE_TRANSFER".to_string()
            })
        );

        let raw = record(json!({
            "referenceId": "ref-91",
            "kind": "PURCHASE",
            "state": "DISPUTED",
            "postedAt": "2025-04-02T16:05:00Z",
            "amountCents": 4217
        }));
        assert_eq!(
            gateway().classify(&context(), &raw).await,
            Outcome::Skip(SkipReason::UnrecognizedStatus {
                status: "DISPUTED".to_string()
            })
        );
    }

    #[tokio::test]
    async fn dates_truncate_in_the_viewer_zone() {
        // 02:05 UTC is still the previous evening in New York.
        let raw = settled("FEE", json!({ "postedAt": "2025-04-02T02:05:00Z" }));
        let row = expect_ledger(gateway().classify(&context(), &raw).await);
        assert_eq!(row.date, chrono::NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }

    #[test]
    fn category_codes_bucket_sensibly() {
        assert_eq!(category_for_code("5411"), "Groceries");
        assert_eq!(category_for_code("5812"), "Dining Out");
        assert_eq!(category_for_code("4511"), "Travel");
        assert_eq!(category_for_code("4900"), "Bills");
        assert_eq!(category_for_code("9999"), "");
    }
}
