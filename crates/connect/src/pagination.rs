//! The paginated-fetch protocol.
//!
//! All three institutions share one drain loop; they differ only in how a
//! request is built, how a page is parsed, and how the next cursor is
//! derived. Those differences live behind [`Institution::fetch_page`]; the
//! termination policy lives here.

use log::{debug, info, warn};

use ledgerport_core::errors::{Error, Result};
use ledgerport_core::ledger::QueryWindow;

use crate::institution::Institution;

/// Tuning for the drain loop.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Records requested per page.
    pub page_size: usize,
    /// Safety limit on pages per account.
    pub max_pages: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 200,
            max_pages: 10_000,
        }
    }
}

/// One request for a page of records.
#[derive(Debug)]
pub struct PageRequest<'a> {
    pub account_id: &'a str,
    pub window: &'a QueryWindow,
    /// `None` on the first request: start from the beginning.
    pub cursor: Option<&'a str>,
    pub page_size: usize,
}

/// One parsed page, with whatever continuation signals the institution's
/// envelope carries. Signals the envelope lacks stay `None`.
#[derive(Debug, Clone)]
pub struct Page<R> {
    /// Records in server order; the drain loop never re-sorts.
    pub records: Vec<R>,
    /// Continuation token or offset key for the next request.
    pub next_cursor: Option<String>,
    /// Explicit has-more flag.
    pub has_more: Option<bool>,
    /// Server-reported total match count.
    pub total_matches: Option<u64>,
}

/// Drain every page of an account's transaction listing into a flat list.
///
/// Termination, checked in order after each page:
/// 1. an empty page always stops, even against a contrary has-more flag;
///    an empty page with "more available" would otherwise loop forever;
/// 2. the running total reaching the server-reported match count stops;
/// 3. `has_more == Some(false)` stops;
/// 4. `has_more == Some(true)` advances via the cursor; a missing cursor
///    stops rather than refetching the same page;
/// 5. with no flag at all, a short page stops, otherwise the cursor
///    advances; no cursor stops.
pub async fn fetch_all<I: Institution>(
    institution: &I,
    account_id: &str,
    window: &QueryWindow,
    config: &FetchConfig,
) -> Result<Vec<I::Record>> {
    let mut cursor: Option<String> = None;
    let mut records: Vec<I::Record> = Vec::new();
    let mut pages = 0usize;

    loop {
        if pages >= config.max_pages {
            return Err(Error::Unexpected(format!(
                "pagination exceeded {} pages for account {}",
                config.max_pages, account_id
            )));
        }

        let request = PageRequest {
            account_id,
            window,
            cursor: cursor.as_deref(),
            page_size: config.page_size,
        };
        let page = institution.fetch_page(&request).await?;
        pages += 1;

        let Page {
            records: fetched,
            next_cursor,
            has_more,
            total_matches,
        } = page;
        let count = fetched.len();
        records.extend(fetched);

        debug!(
            "[{}] page {}: {} records, running total {} (reported total {:?})",
            institution.id(),
            pages,
            count,
            records.len(),
            total_matches
        );

        if count == 0 {
            break;
        }
        if let Some(total) = total_matches {
            if records.len() as u64 >= total {
                break;
            }
        }
        match has_more {
            Some(false) => break,
            Some(true) => {
                let Some(next) = next_cursor else {
                    warn!(
                        "[{}] server claims more pages but sent no cursor; stopping",
                        institution.id()
                    );
                    break;
                };
                cursor = Some(next);
            }
            None => {
                if count < config.page_size {
                    break;
                }
                let Some(next) = next_cursor else {
                    break;
                };
                cursor = Some(next);
            }
        }
    }

    info!(
        "[{}] drained {} records in {} pages for account {}",
        institution.id(),
        records.len(),
        pages,
        account_id
    );
    Ok(records)
}
