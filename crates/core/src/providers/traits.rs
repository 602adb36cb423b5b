use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::directory::DirectoryEntry;
use crate::models::quote::Quote;

/// Trait abstraction over the quote data source.
///
/// The aggregator and the symbol directory only ever talk to this trait, so
/// a provider outage or API change touches exactly one implementation — and
/// tests substitute mocks without any network.
///
/// No retries happen at this layer: a failed call surfaces as
/// `CoreError::FetchFailed` and the next scheduled or manual refresh cycle
/// is the retry policy.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch and normalize the quote for a single instrument.
    /// Never returns a partially populated record.
    async fn fetch_stock(&self, code: &str) -> Result<Quote, CoreError>;

    /// Fetch and normalize the quote for a market index.
    async fn fetch_index(&self, code: &str) -> Result<Quote, CoreError>;

    /// Fetch one page of the market-listing endpoint for a segment.
    /// `page` is 1-based.
    async fn fetch_market_page(
        &self,
        market: &str,
        page: u32,
    ) -> Result<Vec<DirectoryEntry>, CoreError>;
}
