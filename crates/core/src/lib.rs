pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use models::directory::DirectoryEntry;
use models::settings::Settings;
use models::snapshot::Snapshot;
use providers::traits::QuoteProvider;
use services::directory_service::DirectoryService;
use services::quote_service::QuoteService;
use services::scheduler::RefreshScheduler;
use storage::manager::StorageManager;

/// Main entry point for the stock-ticker core library.
///
/// Ties the state-and-refresh engine, the refresh scheduler, the symbol
/// directory, and the persisted portfolio together behind a snapshot surface
/// that any presentation layer — menu bar, terminal, web — can consume.
///
/// All mutable state lives behind a single lock, so mutations and reads
/// serialize on one logical owner; user-triggered actions that touch the
/// network are spawned fire-and-forget and never block the calling (UI)
/// context.
pub struct StockTicker {
    state: Arc<Mutex<QuoteService>>,
    directory: Arc<Mutex<DirectoryService>>,
    provider: Arc<dyn QuoteProvider>,
    scheduler: Mutex<RefreshScheduler>,
    snapshot_rx: watch::Receiver<Snapshot>,
}

impl StockTicker {
    /// Load the persisted portfolio (running the legacy migration if needed)
    /// and seed the snapshot channel. No network I/O happens until `start`
    /// or an explicit refresh.
    pub fn new(provider: Arc<dyn QuoteProvider>, storage: StorageManager) -> Self {
        let (service, snapshot_rx) = QuoteService::new(storage);
        Self {
            state: Arc::new(Mutex::new(service)),
            directory: Arc::new(Mutex::new(DirectoryService::new())),
            provider,
            scheduler: Mutex::new(RefreshScheduler::new()),
            snapshot_rx,
        }
    }

    /// Run the initial refresh, build the symbol directory, and start the
    /// periodic schedule at the persisted interval.
    pub async fn start(&self) {
        self.refresh_all().await;
        self.directory
            .lock()
            .await
            .build(self.provider.as_ref())
            .await;

        let interval = self.state.lock().await.settings().refresh_interval_secs;
        self.restart_scheduler(interval).await;
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// One full refresh cycle, awaited to completion.
    pub async fn refresh_all(&self) {
        self.state
            .lock()
            .await
            .refresh_all(self.provider.as_ref())
            .await;
    }

    /// Trigger a refresh without blocking the caller (refresh button,
    /// popover re-open). Does not alter the schedule.
    pub fn refresh_now(&self) {
        let state = Arc::clone(&self.state);
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            state.lock().await.refresh_all(provider.as_ref()).await;
        });
    }

    /// Persist a new refresh interval and restart the schedule — 0 cancels
    /// the pending task and switches to manual-only mode.
    pub async fn set_refresh_interval(&self, secs: u64) {
        self.state.lock().await.set_refresh_interval(secs);
        self.restart_scheduler(secs).await;
    }

    /// Stop the periodic schedule without touching the persisted setting.
    pub async fn stop(&self) {
        self.scheduler.lock().await.stop();
    }

    async fn restart_scheduler(&self, interval_secs: u64) {
        let state = Arc::clone(&self.state);
        let provider = Arc::clone(&self.provider);
        let mut scheduler = self.scheduler.lock().await;
        scheduler.start(interval_secs, move || {
            let state = Arc::clone(&state);
            let provider = Arc::clone(&provider);
            async move {
                state.lock().await.refresh_all(provider.as_ref()).await;
            }
        });
    }

    // ── Portfolio edits ─────────────────────────────────────────────

    /// Append an instrument to the portfolio. Already-tracked codes are a
    /// no-op; a new code is persisted immediately and its first quote is
    /// fetched in the background.
    pub async fn add_stock(&self, code: &str) {
        let added = self.state.lock().await.add_stock(code);
        if !added {
            return;
        }

        let state = Arc::clone(&self.state);
        let provider = Arc::clone(&self.provider);
        let code = code.to_string();
        tokio::spawn(async move {
            state.lock().await.fetch_stock(provider.as_ref(), &code).await;
        });
    }

    /// Remove an instrument from the order list, holdings, and visible list.
    pub async fn remove_stock(&self, code: &str) {
        self.state.lock().await.remove_stock(code);
    }

    /// Create, replace, or (with `quantity: None`) delete a holding.
    pub async fn update_holding(
        &self,
        code: &str,
        quantity: Option<u32>,
        average_price: Option<f64>,
    ) {
        self.state
            .lock()
            .await
            .update_holding(code, quantity, average_price);
    }

    /// Clear the whole portfolio. The symbol directory survives.
    pub async fn reset_portfolio(&self) {
        self.state.lock().await.reset();
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Search the symbol directory. Empty queries yield an empty result.
    pub async fn search(&self, query: &str) -> Vec<DirectoryEntry> {
        self.directory.lock().await.search(query)
    }

    // ── View-model surface ──────────────────────────────────────────

    /// Subscribe to snapshot pushes. Every published value is a complete,
    /// self-consistent view of the state as of one merge.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Value-weighted return of the user's holdings in a segment ("KS"/"KQ").
    pub async fn user_performance(&self, market: &str) -> f64 {
        self.state.lock().await.user_performance(market)
    }

    /// The matching market index's effective change rate for a segment.
    pub async fn market_performance(&self, market: &str) -> f64 {
        self.state.lock().await.market_performance(market)
    }

    pub async fn settings(&self) -> Settings {
        self.state.lock().await.settings().clone()
    }
}
