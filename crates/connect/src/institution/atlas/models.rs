//! Atlas Trust API payload mirrors.
//!
//! Atlas is the only institution whose listing envelope carries no
//! continuation signal at all: the caller replays the last entry's
//! `entryKey` as `afterKey` and stops on an empty page.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::institution::Wire;

/// Response envelope for the entries listing endpoint.
#[derive(Debug, Deserialize)]
pub struct EntriesResponse {
    #[serde(default)]
    pub entries: Vec<AtlasEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<AtlasAccount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasAccount {
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Response from the transfer detail endpoint, the wire counterpart lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub bank_name: String,
    #[serde(default)]
    pub beneficiary_name: Option<String>,
    #[serde(default)]
    pub account_number_masked: Option<String>,
}

/// Ledger entry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtlasCategory {
    WireIn,
    WireOut,
    AchCredit,
    AchDebit,
    Check,
    ServiceFee,
    InterestPayment,
}

/// Entry state. Only `POSTED` entries have touched the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtlasState {
    Posted,
    MemoHold,
    Returned,
}

impl AtlasState {
    pub fn as_str(self) -> &'static str {
        match self {
            AtlasState::Posted => "POSTED",
            AtlasState::MemoHold => "MEMO_HOLD",
            AtlasState::Returned => "RETURNED",
        }
    }
}

/// Explicit sign field; the `amount` string itself is unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtlasDirection {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDetail {
    pub transfer_id: String,
}

/// One raw Atlas ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasEntry {
    /// Monotonic key, replayed as the pagination `afterKey`.
    pub entry_key: String,
    pub category: Wire<AtlasCategory>,
    pub state: Wire<AtlasState>,
    /// Bank-side posting date; already a calendar day.
    pub value_date: NaiveDate,
    /// Unsigned decimal string, e.g. `"1234.56"`.
    pub amount: String,
    pub direction: Wire<AtlasDirection>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub originator_name: Option<String>,
    #[serde(default)]
    pub check_number: Option<String>,
    #[serde(default)]
    pub wire: Option<WireDetail>,
}
