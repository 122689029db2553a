//! Meridian retail bank gateway.
//!
//! Meridian pages with an opaque continuation token plus an explicit
//! `hasNextPage` flag, reports amounts as signed minor units (negative
//! already means money out), and labels internal transfers with the sibling
//! account's id rather than a name. The nickname comes from a lazy account
//! lookup memoized across the export.

pub mod models;

use async_trait::async_trait;
use log::warn;

use ledgerport_core::amount;
use ledgerport_core::errors::Result;
use ledgerport_core::ledger::{AccountInfo, LedgerTransaction};
use ledgerport_core::skip::{Outcome, SkipReason};

use crate::client::{ApiClient, Credential};
use crate::institution::{ClassifyContext, Institution, Wire};
use crate::pagination::{Page, PageRequest};
use crate::resolver::LookupCache;

use models::{
    AccountsResponse, ListRequest, ListResponse, MeridianKind, MeridianStatus, MeridianTransaction,
};

const INSTITUTION_ID: &str = "meridian";

/// Gateway to Meridian's private web API.
pub struct Meridian {
    api: ApiClient,
    nicknames: LookupCache<String, String>,
}

impl Meridian {
    pub const DEFAULT_BASE_URL: &'static str = "https://app.meridianbank.com";

    pub fn new(base_url: &str, credential: &Credential) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, credential)?,
            nicknames: LookupCache::new(),
        })
    }

    /// Nickname for a sibling account, fetched lazily and memoized for the
    /// export. An account missing from the listing keeps its raw id.
    async fn resolve_account_nickname(&self, account_id: &str) -> Result<String> {
        self.nicknames
            .get_or_fetch(account_id.to_string(), || async {
                let response: AccountsResponse = self.api.get("/api/v2/accounts", &[]).await?;
                Ok(response
                    .accounts
                    .into_iter()
                    .find(|account| account.id == account_id)
                    .and_then(|account| account.nickname)
                    .unwrap_or_else(|| account_id.to_string()))
            })
            .await
    }

    /// Seed the nickname cache, e.g. from an account listing already in hand.
    pub async fn prime_nickname(&self, account_id: impl Into<String>, nickname: impl Into<String>) {
        self.nicknames.prime(account_id.into(), nickname.into()).await;
    }
}

/// Map Meridian's merchant bucket to a budgeting category.
fn merchant_category(raw: &str) -> &'static str {
    match raw {
        "groceries" => "Groceries",
        "eating_out" => "Dining Out",
        "transport" => "Transport",
        "shopping" => "Shopping",
        "entertainment" => "Entertainment",
        "travel" => "Travel",
        "bills" => "Bills",
        "cash" => "Cash Withdrawal",
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
impl Institution for Meridian {
    type Record = MeridianTransaction;

    fn id(&self) -> &'static str {
        INSTITUTION_ID
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>> {
        let response: AccountsResponse = self.api.get("/api/v2/accounts", &[]).await?;
        Ok(response
            .accounts
            .into_iter()
            .map(|account| AccountInfo {
                nickname: account.nickname.unwrap_or_else(|| account.id.clone()),
                id: account.id,
            })
            .collect())
    }

    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Page<MeridianTransaction>> {
        let body = ListRequest {
            account_id: request.account_id,
            from: request.window.start.map(|d| d.format("%Y-%m-%d").to_string()),
            to: request.window.end.format("%Y-%m-%d").to_string(),
            page_size: request.page_size,
            cursor: request.cursor,
        };
        let response: ListResponse = self.api.post("/api/v2/transactions/list", &body).await?;
        Ok(Page {
            records: response.items,
            next_cursor: response.page_info.end_cursor,
            has_more: Some(response.page_info.has_next_page),
            total_matches: None,
        })
    }

    async fn classify(&self, context: &ClassifyContext, record: &MeridianTransaction) -> Outcome {
        let status = match &record.status {
            Wire::Known(status) => *status,
            Wire::Unrecognized(status) => {
                return Outcome::Skip(SkipReason::UnrecognizedStatus {
                    status: status.clone(),
                })
            }
        };
        match status {
            MeridianStatus::Booked => {}
            MeridianStatus::Pending | MeridianStatus::Declined | MeridianStatus::Reversed => {
                return Outcome::Skip(SkipReason::NotSettled {
                    status: status.as_str().to_string(),
                })
            }
        }

        let kind = match &record.kind {
            Wire::Known(kind) => *kind,
            Wire::Unrecognized(kind) => {
                return Outcome::Skip(SkipReason::UnrecognizedKind { kind: kind.clone() })
            }
        };

        let date = context.calendar_day(record.created_at);
        let amount = amount::from_minor_units(record.amount_minor);
        let notes = record.reference.clone().unwrap_or_default();

        let (payee, category) = match kind {
            MeridianKind::CardPayment => {
                let Some(name) =
                    nonempty(record.merchant.as_ref().and_then(|m| m.name.as_deref()))
                else {
                    return Outcome::Skip(SkipReason::MissingField {
                        field: "merchant.name",
                    });
                };
                let category = record
                    .merchant
                    .as_ref()
                    .and_then(|m| m.category.as_deref())
                    .map(merchant_category)
                    .unwrap_or("");
                (name, category.to_string())
            }
            MeridianKind::DirectDebit | MeridianKind::StandingOrder => {
                let Some(name) =
                    nonempty(record.counterparty.as_ref().and_then(|c| c.name.as_deref()))
                else {
                    return Outcome::Skip(SkipReason::MissingField {
                        field: "counterparty.name",
                    });
                };
                (name, "Bills".to_string())
            }
            MeridianKind::PaymentIn | MeridianKind::PaymentOut => {
                let Some(name) =
                    nonempty(record.counterparty.as_ref().and_then(|c| c.name.as_deref()))
                else {
                    return Outcome::Skip(SkipReason::MissingField {
                        field: "counterparty.name",
                    });
                };
                (name, String::new())
            }
            MeridianKind::InternalTransfer => {
                let Some(sibling) = record.counterpart_account_id.as_deref() else {
                    return Outcome::Skip(SkipReason::MissingField {
                        field: "counterpartAccountId",
                    });
                };
                match self.resolve_account_nickname(sibling).await {
                    Ok(nickname) => {
                        let payee = if record.amount_minor < 0 {
                            format!("Transfer to {}", nickname)
                        } else {
                            format!("Transfer from {}", nickname)
                        };
                        (payee, "Transfers".to_string())
                    }
                    Err(error) => {
                        warn!(
                            "[{}] nickname lookup failed for {}: {}",
                            INSTITUTION_ID, sibling, error
                        );
                        return Outcome::Skip(SkipReason::Resolver {
                            message: error.to_string(),
                        });
                    }
                }
            }
            MeridianKind::Fee => ("Meridian".to_string(), "Bank Fees".to_string()),
            MeridianKind::Interest => ("Meridian".to_string(), "Interest".to_string()),
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
