//! On-demand secondary lookups.
//!
//! Some records reference entities that live behind another endpoint: the
//! counterpart of a wire transfer, or a sibling account's nickname. Lookups
//! are lazy (only records whose discriminator needs one pay for one) and
//! memoized for the duration of an export, so classifying a hundred
//! transfers between the same two accounts costs two requests, not a
//! hundred. Failed lookups are not cached; the caller downgrades the
//! failure to a skip for the single affected record.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use ledgerport_core::errors::Result;

/// Bank-side description of a transfer counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BankDescriptor {
    /// Receiving or originating bank name.
    pub bank_name: String,
    /// Beneficiary or originator, when the institution exposes one.
    pub beneficiary: Option<String>,
    /// Masked account number, e.g. `****4821`.
    pub account_last4: Option<String>,
}

impl BankDescriptor {
    /// Render the best available payee text.
    pub fn display_payee(&self) -> String {
        match (&self.beneficiary, &self.account_last4) {
            (Some(name), _) => name.clone(),
            (None, Some(last4)) => format!("{} {}", self.bank_name, last4),
            (None, None) => self.bank_name.clone(),
        }
    }
}

/// Memoized async lookup keyed by an id embedded in a raw record.
///
/// The lock is held across the fetch, which also deduplicates lookups that
/// would otherwise race for the same key.
#[derive(Debug)]
pub struct LookupCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for LookupCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> LookupCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `fetch` and remember it.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let mut entries = self.entries.lock().await;
        if let Some(value) = entries.get(&key) {
            return Ok(value.clone());
        }
        let value = fetch().await?;
        entries.insert(key, value.clone());
        Ok(value)
    }

    /// Seed the cache with a known value.
    pub async fn prime(&self, key: K, value: V) {
        self.entries.lock().await.insert(key, value);
    }
}
