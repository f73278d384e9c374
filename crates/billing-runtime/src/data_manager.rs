//! TTL-cached snapshot of the invoice listing.
//!
//! [`DataManager::get_data`] returns the current listing, fetching a fresh
//! copy from the source when the cached one is stale. A fetch is a single
//! attempt: on failure the error is recorded and the previous snapshot (if
//! any) keeps being served, so downstream views are simply not recomputed
//! for that cycle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use billing_core::error::{BillingError, Result};
use billing_core::models::InvoiceRecord;
use billing_data::reader::load_invoices;

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// An immutable listing shared with every view derived from it.
pub type Snapshot = Arc<Vec<InvoiceRecord>>;

/// TTL-cached owner of the latest invoice listing.
///
/// # Example
/// ```no_run
/// use billing_runtime::data_manager::DataManager;
///
/// # async fn run() {
/// let mut mgr = DataManager::new(30, "/srv/invoices.json");
/// if let Some(invoices) = mgr.get_data(false).await {
///     println!("{} invoices", invoices.len());
/// }
/// # }
/// ```
pub struct DataManager {
    cache_ttl: Duration,
    source: PathBuf,
    cache: Option<Snapshot>,
    cache_timestamp: Option<Instant>,
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(cache_ttl_secs: u64, source: impl Into<PathBuf>) -> Self {
        Self {
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            source: source.into(),
            cache: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the listing, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed. On fetch failure
    /// the previous snapshot (possibly stale, possibly `None`) is returned.
    pub async fn get_data(&mut self, force_refresh: bool) -> Option<Snapshot> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached invoice listing");
            return self.cache.clone();
        }

        match self.fetch().await {
            Ok(invoices) => {
                tracing::debug!(invoices = invoices.len(), "invoice listing refreshed");
                self.cache = Some(Arc::new(invoices));
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "listing fetch failed; keeping previous snapshot");
                self.last_error = Some(e.to_string());
            }
        }

        self.cache.clone()
    }

    /// Discard the current snapshot, forcing the next call to fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current snapshot, or `None` if nothing has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Description of the last fetch error, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    /// Load the listing on the blocking pool.
    async fn fetch(&self) -> Result<Vec<InvoiceRecord>> {
        let source = self.source.clone();
        tokio::task::spawn_blocking(move || load_invoices(&source))
            .await
            .map_err(|e| BillingError::Other(e.into()))?
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
