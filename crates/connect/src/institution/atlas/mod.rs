//! Atlas Trust commercial bank gateway.
//!
//! Atlas pages by replaying the last entry's `entryKey`; the envelope has
//! no has-more flag, so an empty or short page is the only stop signal.
//! Amounts arrive as unsigned decimal strings with a separate `direction`
//! field, and wires name their counterpart only through a transfer id that
//! must be resolved against a second endpoint.

pub mod models;

use async_trait::async_trait;
use log::warn;
use rust_decimal::Decimal;

use ledgerport_core::amount;
use ledgerport_core::errors::Result;
use ledgerport_core::ledger::{AccountInfo, LedgerTransaction};
use ledgerport_core::skip::{Outcome, SkipReason};

use crate::client::{ApiClient, Credential};
use crate::institution::{ClassifyContext, Institution, Wire};
use crate::pagination::{Page, PageRequest};
use crate::resolver::{BankDescriptor, LookupCache};

use models::{
    AccountsResponse, AtlasCategory, AtlasDirection, AtlasEntry, AtlasState, EntriesResponse,
    TransferResponse,
};

const INSTITUTION_ID: &str = "atlas";

/// Gateway to Atlas Trust's private web API.
pub struct AtlasTrust {
    api: ApiClient,
    transfers: LookupCache<String, BankDescriptor>,
}

impl AtlasTrust {
    pub const DEFAULT_BASE_URL: &'static str = "https://secure.atlastrust.com";

    pub fn new(base_url: &str, credential: &Credential) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, credential)?,
            transfers: LookupCache::new(),
        })
    }

    /// Bank details of the other end of a wire, memoized per transfer id.
    async fn resolve_transfer_counterpart(&self, transfer_id: &str) -> Result<BankDescriptor> {
        self.transfers
            .get_or_fetch(transfer_id.to_string(), || async {
                let path = format!("/api/v1/transfers/{}", transfer_id);
                let response: TransferResponse = self.api.get(&path, &[]).await?;
                Ok(BankDescriptor {
                    bank_name: response.bank_name,
                    beneficiary: response.beneficiary_name,
                    account_last4: response.account_number_masked,
                })
            })
            .await
    }

    /// Seed the transfer cache, e.g. in tests or from an earlier export.
    pub async fn prime_transfer(&self, transfer_id: impl Into<String>, descriptor: BankDescriptor) {
        self.transfers.prime(transfer_id.into(), descriptor).await;
    }

    fn signed_amount(entry: &AtlasEntry) -> std::result::Result<Decimal, SkipReason> {
        let direction = match &entry.direction {
            Wire::Known(direction) => *direction,
            Wire::Unrecognized(direction) => {
                return Err(SkipReason::UnrecognizedKind {
                    kind: format!("direction {}", direction),
                })
            }
        };
        let magnitude = amount::parse_major(&entry.amount)
            .map_err(|_| SkipReason::MissingField { field: "amount" })?;
        Ok(match direction {
            AtlasDirection::Debit => -magnitude,
            AtlasDirection::Credit => magnitude,
        })
    }
}

fn nonempty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Institution for AtlasTrust {
    type Record = AtlasEntry;

    fn id(&self) -> &'static str {
        INSTITUTION_ID
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>> {
        let response: AccountsResponse = self.api.get("/api/v1/accounts", &[]).await?;
        Ok(response
            .accounts
            .into_iter()
            .map(|account| AccountInfo {
                nickname: account.nickname.unwrap_or_else(|| account.id.clone()),
                id: account.id,
            })
            .collect())
    }

    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Page<AtlasEntry>> {
        let path = format!("/api/v1/accounts/{}/entries", request.account_id);
        let mut query: Vec<(&str, String)> = vec![
            ("limit", request.page_size.to_string()),
            ("to", request.window.end.format("%Y-%m-%d").to_string()),
        ];
        if let Some(start) = request.window.start {
            query.push(("from", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(cursor) = request.cursor {
            query.push(("afterKey", cursor.to_string()));
        }

        let response: EntriesResponse = self.api.get(&path, &query).await?;
        Ok(Page {
            next_cursor: response.entries.last().map(|e| e.entry_key.clone()),
            has_more: None,
            total_matches: None,
            records: response.entries,
        })
    }

    async fn classify(&self, _context: &ClassifyContext, entry: &AtlasEntry) -> Outcome {
        let state = match &entry.state {
            Wire::Known(state) => *state,
            Wire::Unrecognized(state) => {
                return Outcome::Skip(SkipReason::UnrecognizedStatus {
                    status: state.clone(),
                })
            }
        };
        match state {
            AtlasState::Posted => {}
            AtlasState::MemoHold | AtlasState::Returned => {
                return Outcome::Skip(SkipReason::NotSettled {
                    status: state.as_str().to_string(),
                })
            }
        }

        let category = match &entry.category {
            Wire::Known(category) => *category,
            Wire::Unrecognized(category) => {
                return Outcome::Skip(SkipReason::UnrecognizedKind {
                    kind: category.clone(),
                })
            }
        };

        let amount = match Self::signed_amount(entry) {
            Ok(amount) => amount,
            Err(reason) => return Outcome::Skip(reason),
        };

        // Atlas reports value dates as plain calendar days; there is no
        // timestamp to truncate.
        let date = entry.value_date;
        let notes = entry.description.clone().unwrap_or_default();

        let (payee, budget_category) = match category {
            AtlasCategory::WireIn | AtlasCategory::WireOut => {
                let Some(wire) = entry.wire.as_ref() else {
                    return Outcome::Skip(SkipReason::MissingField {
                        field: "wire.transferId",
                    });
                };
                match self.resolve_transfer_counterpart(&wire.transfer_id).await {
                    Ok(descriptor) => (descriptor.display_payee(), String::new()),
                    Err(error) => {
                        warn!(
                            "[{}] transfer lookup failed for {}: {}",
                            INSTITUTION_ID, wire.transfer_id, error
                        );
                        return Outcome::Skip(SkipReason::Resolver {
                            message: error.to_string(),
                        });
                    }
                }
            }
            AtlasCategory::AchCredit | AtlasCategory::AchDebit => {
                let Some(name) = nonempty(entry.originator_name.as_deref()) else {
                    return Outcome::Skip(SkipReason::MissingField {
                        field: "originatorName",
                    });
                };
                (name, String::new())
            }
            AtlasCategory::Check => {
                let Some(number) = nonempty(entry.check_number.as_deref()) else {
                    return Outcome::Skip(SkipReason::MissingField {
                        field: "checkNumber",
                    });
                };
                (format!("Check #{}", number), String::new())
            }
            AtlasCategory::ServiceFee => ("Atlas Trust".to_string(), "Bank Fees".to_string()),
            AtlasCategory::InterestPayment => ("Atlas Trust".to_string(), "Interest".to_string()),
        };

        Outcome::Ledger(LedgerTransaction {
            date,
            payee,
            notes,
            category: budget_category,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn gateway() -> AtlasTrust {
        AtlasTrust::new(
            AtlasTrust::DEFAULT_BASE_URL,
            &Credential::Cookie("session=abc".to_string()),
        )
        .unwrap()
    }

    fn context() -> ClassifyContext {
        ClassifyContext::new(chrono_tz::America::Chicago)
    }

    fn entry(value: serde_json::Value) -> AtlasEntry {
        serde_json::from_value(value).unwrap()
    }

    fn posted(category: &str, direction: &str, extra: serde_json::Value) -> AtlasEntry {
        let mut base = json!({
            "entryKey": "0001934",
            "category": category,
            "state": "POSTED",
            "valueDate": "2025-03-14",
            "amount": "1250.00",
            "direction": direction
        });
        base.as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        entry(base)
    }

    fn expect_ledger(outcome: Outcome) -> LedgerTransaction {
        match outcome {
            Outcome::Ledger(row) => row,
            Outcome::Skip(reason) => panic!("expected a ledger row, got skip: {}", reason),
        }
    }

    #[tokio::test]
    async fn outgoing_wire_resolves_the_counterpart() {
        let gateway = gateway();
        gateway
            .prime_transfer(
                "wt-556",
                BankDescriptor {
                    bank_name: "First Harbor Bank".to_string(),
                    beneficiary: Some("Northside Properties LLC".to_string()),
                    account_last4: None,
                },
            )
            .await;

        let raw = posted(
            "WIRE_OUT",
            "DEBIT",
            json!({ "description": "march rent", "wire": { "transferId": "wt-556" } }),
        );
        let row = expect_ledger(gateway.classify(&context(), &raw).await);
        assert_eq!(row.payee, "Northside Properties LLC");
        assert_eq!(row.notes, "march rent");
        assert_eq!(row.amount, dec!(-1250.00));
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[tokio::test]
    async fn incoming_wire_is_positive() {
        let gateway = gateway();
        gateway
            .prime_transfer(
                "wt-557",
                BankDescriptor {
                    bank_name: "First Harbor Bank".to_string(),
                    beneficiary: None,
                    account_last4: Some("****4821".to_string()),
                },
            )
            .await;

        let raw = posted(
            "WIRE_IN",
            "CREDIT",
            json!({ "wire": { "transferId": "wt-557" } }),
        );
        let row = expect_ledger(gateway.classify(&context(), &raw).await);
        assert_eq!(row.payee, "First Harbor Bank ****4821");
        assert_eq!(row.amount, dec!(1250.00));
    }

    #[tokio::test]
    async fn wire_without_transfer_id_is_skipped() {
        let raw = posted("WIRE_OUT", "DEBIT", json!({}));
        assert_eq!(
            gateway().classify(&context(), &raw).await,
            Outcome::Skip(SkipReason::MissingField {
                field: "wire.transferId"
            })
        );
    }

    #[tokio::test]
    async fn failed_counterpart_lookup_loses_only_this_record() {
        // Nothing listens on the discard port, so the lookup fails fast.
        let gateway = AtlasTrust::new(
            "http://127.0.0.1:9",
            &Credential::Cookie("session=abc".to_string()),
        )
        .unwrap();
        let raw = posted(
            "WIRE_OUT",
            "DEBIT",
            json!({ "wire": { "transferId": "wt-999" } }),
        );
        match gateway.classify(&context(), &raw).await {
            Outcome::Skip(SkipReason::Resolver { .. }) => {}
            other => panic!("expected a resolver skip, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn ach_entries_use_the_originator() {
        let raw = posted(
            "ACH_DEBIT",
            "DEBIT",
            json!({ "originatorName": "City Utilities" }),
        );
        let row = expect_ledger(gateway().classify(&context(), &raw).await);
        assert_eq!(row.payee, "City Utilities");

        let raw = posted(
            "ACH_CREDIT",
            "CREDIT",
            json!({ "originatorName": "Acme Payroll" }),
        );
        let row = expect_ledger(gateway().classify(&context(), &raw).await);
        assert_eq!(row.amount, dec!(1250.00));
    }

    #[tokio::test]
    async fn ach_without_originator_is_skipped() {
        let raw = posted("ACH_DEBIT", "DEBIT", json!({}));
        assert_eq!(
            gateway().classify(&context(), &raw).await,
            Outcome::Skip(SkipReason::MissingField {
                field: "originatorName"
            })
        );
    }

    #[tokio::test]
    async fn checks_render_their_number() {
        let raw = posted("CHECK", "DEBIT", json!({ "checkNumber": "1047" }));
        let row = expect_ledger(gateway().classify(&context(), &raw).await);
        assert_eq!(row.payee, "Check #1047");
        assert_eq!(row.amount, dec!(-1250.00));
    }

    #[tokio::test]
    async fn fees_and_interest_use_the_institution_name() {
        let fee = expect_ledger(
            gateway()
                .classify(&context(), &posted("SERVICE_FEE", "DEBIT", json!({})))
                .await,
        );
        assert_eq!(fee.payee, "Atlas Trust");
        assert_eq!(fee.category, "Bank Fees");

        let interest = expect_ledger(
            gateway()
                .classify(&context(), &posted("INTEREST_PAYMENT", "CREDIT", json!({})))
                .await,
        );
        assert_eq!(interest.category, "Interest");
        assert_eq!(interest.amount, dec!(1250.00));
    }

    #[tokio::test]
    async fn holds_and_returns_never_reach_the_ledger() {
        for state in ["MEMO_HOLD", "RETURNED"] {
            let raw = entry(json!({
                "entryKey": "0002001",
                "category": "ACH_DEBIT",
                "state": state,
                "valueDate": "2025-03-14",
                "amount": "10.00",
                "direction": "DEBIT",
                "originatorName": "City Utilities"
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
    async fn unknown_category_and_state_are_skips() {
        let raw = posted("ESCROW_SWEEP", "DEBIT", json!({}));
        assert_eq!(
            gateway().classify(&context(), &raw).await,
            Outcome::Skip(SkipReason::UnrecognizedKind {
                kind: "ESCROW_SWEEP".to_string()
            })
        );

        let raw = entry(json!({
            "entryKey": "0002002",
            "category": "CHECK",
            "state": "SUSPENSE",
            "valueDate": "2025-03-14",
            "amount": "10.00",
            "direction": "DEBIT"
        }));
        assert_eq!(
            gateway().classify(&context(), &raw).await,
            Outcome::Skip(SkipReason::UnrecognizedStatus {
                status: "SUSPENSE".to_string()
            })
        );
    }

    #[tokio::test]
    async fn malformed_amount_is_a_missing_field_skip() {
        let raw = posted("CHECK", "DEBIT", json!({ "amount": "12,50", "checkNumber": "9" }));
        assert_eq!(
            gateway().classify(&context(), &raw).await,
            Outcome::Skip(SkipReason::MissingField { field: "amount" })
        );
    }
}
