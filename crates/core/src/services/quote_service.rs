use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;
use crate::models::quote::Quote;
use crate::models::settings::Settings;
use crate::models::snapshot::{PortfolioTotals, Snapshot};
use crate::providers::traits::QuoteProvider;
use crate::storage::manager::StorageManager;

/// Code of the primary market index.
pub const KOSPI: &str = "KOSPI";
/// Code of the secondary market index.
pub const KOSDAQ: &str = "KOSDAQ";

/// Segment code an instrument falls back to when the provider omits one.
const DEFAULT_SEGMENT: &str = "KS";

/// The state-and-refresh engine.
///
/// Exclusively owns the in-memory quote list, the index list, the persisted
/// portfolio document, and the market-open flags. Every mutation happens on
/// one instance behind one lock, and a fresh `Snapshot` is published on the
/// watch channel after each visible change — so each merged quote becomes
/// visible as soon as its individual fetch completes.
pub struct QuoteService {
    portfolio: Portfolio,
    quotes: Vec<Quote>,
    indices: Vec<Quote>,
    is_main_market_open: bool,
    is_market_open: bool,
    last_updated: Option<DateTime<Utc>>,
    storage: StorageManager,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl QuoteService {
    /// Load the persisted portfolio (running the legacy migration if a
    /// legacy record exists) and seed the snapshot channel.
    ///
    /// Load and migration failures are logged and degrade to an empty
    /// portfolio — nothing here is fatal.
    pub fn new(storage: StorageManager) -> (Self, watch::Receiver<Snapshot>) {
        let mut portfolio = match storage.load() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Failed to load portfolio, starting empty: {e}");
                Portfolio::default()
            }
        };

        match storage.migrate_legacy() {
            Ok(Some(codes)) => {
                log::info!("Migrated {} watched codes from the legacy record", codes.len());
                portfolio.codes = codes;
                portfolio.holdings.clear();
                if let Err(e) = storage.save(&portfolio) {
                    log::warn!("Failed to persist migrated portfolio: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Legacy migration failed, keeping current document: {e}"),
        }

        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());

        let service = Self {
            portfolio,
            quotes: Vec::new(),
            indices: Vec::new(),
            is_main_market_open: false,
            is_market_open: false,
            last_updated: None,
            storage,
            snapshot_tx,
        };
        (service, snapshot_rx)
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// One full refresh cycle: both market indices, then every instrument in
    /// the order list, sequentially — one in-flight request at a time by
    /// design, to stay polite to the provider.
    ///
    /// A failure on one instrument is logged and does not abort the others;
    /// that instrument keeps its previously known quote (or stays absent if
    /// never fetched).
    pub async fn refresh_all(&mut self, provider: &dyn QuoteProvider) {
        for code in [KOSPI, KOSDAQ] {
            match provider.fetch_index(code).await {
                Ok(quote) => self.merge_index(quote),
                Err(e) => log::warn!("Index fetch for {code} failed: {e}"),
            }
        }

        let codes = self.portfolio.codes.clone();
        for code in codes {
            self.fetch_stock(provider, &code).await;
        }
    }

    /// Fetch a single instrument and merge the result into the visible list.
    /// Used by the refresh cycle and by the follow-up fetch after an add.
    pub async fn fetch_stock(&mut self, provider: &dyn QuoteProvider, code: &str) {
        match provider.fetch_stock(code).await {
            Ok(quote) => self.merge_stock(quote),
            Err(e) => log::warn!("Fetch for {code} failed, keeping last known quote: {e}"),
        }
    }

    fn merge_stock(&mut self, mut quote: Quote) {
        // Overall market-open state follows the most recently fetched
        // instrument; indices alone never set it. Observed quirk of the
        // source system, kept on purpose and pinned in the service tests.
        self.is_main_market_open = quote.is_main_open;
        self.is_market_open = quote.is_main_open || quote.is_nxt_open;

        if let Some(holding) = self.portfolio.holdings.get(&quote.code) {
            quote.quantity = Some(holding.quantity);
            quote.average_price = holding.average_price;
        }

        if let Some(existing) = self.quotes.iter_mut().find(|q| q.code == quote.code) {
            *existing = quote;
        } else {
            self.quotes.push(quote);
        }

        self.resort();
        self.last_updated = Some(Utc::now());
        self.publish();
    }

    fn merge_index(&mut self, quote: Quote) {
        if let Some(existing) = self.indices.iter_mut().find(|q| q.code == quote.code) {
            *existing = quote;
        } else {
            self.indices.push(quote);
        }
        // KOSPI first, KOSDAQ second.
        self.indices.sort_by_key(|q| usize::from(q.code != KOSPI));
        self.last_updated = Some(Utc::now());
        self.publish();
    }

    /// Re-sort the visible list to order-list order. The order list is
    /// authoritative: quotes for codes no longer in it are dropped, and
    /// fetch completion order never shows through.
    fn resort(&mut self) {
        let position: HashMap<&str, usize> = self
            .portfolio
            .codes
            .iter()
            .enumerate()
            .map(|(i, code)| (code.as_str(), i))
            .collect();
        self.quotes.retain(|q| position.contains_key(q.code.as_str()));
        self.quotes.sort_by_key(|q| position[q.code.as_str()]);
    }

    // ── Portfolio edits ─────────────────────────────────────────────

    /// Append an instrument to the order list and persist. A code already
    /// present is a no-op. Returns whether the code was actually added, so
    /// the caller knows to issue the follow-up fetch.
    pub fn add_stock(&mut self, code: &str) -> bool {
        if self.portfolio.codes.iter().any(|c| c == code) {
            return false;
        }
        self.portfolio.codes.push(code.to_string());
        self.persist();
        true
    }

    /// Remove an instrument from the order list, the holdings map, and the
    /// visible quote list in one step, then persist once. No partial removal
    /// is ever observable.
    pub fn remove_stock(&mut self, code: &str) {
        self.portfolio.codes.retain(|c| c != code);
        self.portfolio.holdings.remove(code);
        self.quotes.retain(|q| q.code != code);
        self.persist();
        self.publish();
    }

    /// Replace or delete the holding for an instrument.
    ///
    /// `Some(quantity)` replaces the holding entirely — quantity and cost
    /// basis together; `None` deletes it. The merged quote, if visible, is
    /// patched synchronously so derived figures update before the next fetch.
    pub fn update_holding(
        &mut self,
        code: &str,
        quantity: Option<u32>,
        average_price: Option<f64>,
    ) {
        match quantity {
            Some(q) => {
                self.portfolio
                    .holdings
                    .insert(code.to_string(), Holding { quantity: q, average_price });
            }
            None => {
                self.portfolio.holdings.remove(code);
            }
        }

        if let Some(quote) = self.quotes.iter_mut().find(|q| q.code == code) {
            quote.quantity = quantity;
            quote.average_price = average_price;
        }

        self.persist();
        self.publish();
    }

    /// Clear the order list, the holdings map, and the quote list, and
    /// persist the cleared document. The symbol directory is not touched;
    /// a subsequent add behaves like a fresh install.
    pub fn reset(&mut self) {
        self.portfolio.codes.clear();
        self.portfolio.holdings.clear();
        self.quotes.clear();
        self.persist();
        self.publish();
    }

    // ── Settings ────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Persist the new refresh interval. The caller restarts the scheduler.
    pub fn set_refresh_interval(&mut self, secs: u64) {
        self.portfolio.settings.refresh_interval_secs = secs;
        self.persist();
    }

    // ── Aggregates ──────────────────────────────────────────────────

    /// Sum of position values at effective prices.
    pub fn total_value(&self) -> f64 {
        self.quotes.iter().map(Quote::position_value).sum()
    }

    /// Sum of main-session daily gains.
    pub fn total_daily_gain(&self) -> f64 {
        self.quotes.iter().map(Quote::daily_gain).sum()
    }

    /// Sum of extended-session daily gains.
    pub fn total_nxt_daily_gain(&self) -> f64 {
        self.quotes.iter().map(Quote::nxt_daily_gain).sum()
    }

    /// Sum of lifetime gains at effective prices. Positions without a cost
    /// basis contribute nothing.
    pub fn total_lifetime_gain(&self) -> f64 {
        self.quotes.iter().filter_map(Quote::lifetime_gain).sum()
    }

    /// Sum of lifetime gains at main-session prices.
    pub fn total_main_lifetime_gain(&self) -> f64 {
        self.quotes.iter().filter_map(Quote::main_lifetime_gain).sum()
    }

    /// Value-weighted average of held instruments' effective change rates
    /// within a market segment. Instruments with no reported segment count
    /// as "KS". 0 when nothing is held in the segment.
    pub fn user_performance(&self, market: &str) -> f64 {
        let held: Vec<&Quote> = self
            .quotes
            .iter()
            .filter(|q| {
                q.market.as_deref().unwrap_or(DEFAULT_SEGMENT) == market
                    && q.quantity.unwrap_or(0) > 0
            })
            .collect();
        if held.is_empty() {
            return 0.0;
        }

        let total_value: f64 = held.iter().map(|q| q.position_value()).sum();
        if total_value <= 0.0 {
            return 0.0;
        }

        held.iter()
            .map(|q| q.current_change_rate() * (q.position_value() / total_value))
            .sum()
    }

    /// The matching index's effective change rate: KOSPI for "KS", KOSDAQ
    /// for "KQ". 0 when that index has not been fetched yet.
    pub fn market_performance(&self, market: &str) -> f64 {
        let index_code = if market == DEFAULT_SEGMENT { KOSPI } else { KOSDAQ };
        self.indices
            .iter()
            .find(|q| q.code == index_code)
            .map(Quote::current_change_rate)
            .unwrap_or(0.0)
    }

    // ── Read access ─────────────────────────────────────────────────

    /// Tracked instruments in order-list order.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Market indices, KOSPI first.
    pub fn indices(&self) -> &[Quote] {
        &self.indices
    }

    /// The user-controlled display order.
    pub fn order_list(&self) -> &[String] {
        &self.portfolio.codes
    }

    pub fn is_main_market_open(&self) -> bool {
        self.is_main_market_open
    }

    pub fn is_market_open(&self) -> bool {
        self.is_market_open
    }

    /// Assemble the read-only view model from the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            quotes: self.quotes.clone(),
            indices: self.indices.clone(),
            totals: PortfolioTotals {
                value: self.total_value(),
                daily_gain: self.total_daily_gain(),
                nxt_daily_gain: self.total_nxt_daily_gain(),
                lifetime_gain: self.total_lifetime_gain(),
                main_lifetime_gain: self.total_main_lifetime_gain(),
            },
            is_main_market_open: self.is_main_market_open,
            is_market_open: self.is_market_open,
            last_updated: self.last_updated,
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Persistence failures are logged and non-fatal; the in-memory state
    /// stays authoritative for the running session.
    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.portfolio) {
            log::warn!("Failed to persist portfolio: {e}");
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}
