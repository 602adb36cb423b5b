use crate::models::directory::DirectoryEntry;
use crate::providers::traits::QuoteProvider;

/// Segments whose listing pages seed the catalog.
const MARKETS: [&str; 2] = ["KOSPI", "KOSDAQ"];

/// Pages fetched per segment. Listings are ordered by market value, so two
/// pages cover what users search for.
const PAGES_PER_MARKET: u32 = 2;

/// Searchable catalog of tradable instruments, built by paging the
/// market-listing endpoint once per process lifetime.
pub struct DirectoryService {
    entries: Vec<DirectoryEntry>,
    built: bool,
}

impl DirectoryService {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            built: false,
        }
    }

    /// Build the catalog. Runs once; later calls are no-ops. Page failures
    /// are logged and swallowed — that segment's entries are simply absent,
    /// never retried.
    pub async fn build(&mut self, provider: &dyn QuoteProvider) {
        if self.built {
            return;
        }

        let mut all = Vec::new();
        for market in MARKETS {
            for page in 1..=PAGES_PER_MARKET {
                match provider.fetch_market_page(market, page).await {
                    Ok(mut entries) => all.append(&mut entries),
                    Err(e) => {
                        log::warn!("Directory page {page} for {market} failed: {e}");
                    }
                }
            }
        }

        self.entries = all;
        self.built = true;
        log::debug!("Symbol directory built with {} entries", self.entries.len());
    }

    /// Case-insensitive substring match against the name, or substring match
    /// against the code. An empty query yields an empty result, not the
    /// whole catalog.
    pub fn search(&self, query: &str) -> Vec<DirectoryEntry> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle) || e.code.contains(query))
            .cloned()
            .collect()
    }

    /// True once `build` has completed, even if every page failed.
    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DirectoryService {
    fn default() -> Self {
        Self::new()
    }
}
