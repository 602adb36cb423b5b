use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::directory::DirectoryEntry;
use crate::models::quote::Quote;

const BASE_URL: &str = "https://m.stock.naver.com/api";

/// Listing pages are requested at this size; two pages per segment cover the
/// large-cap names users actually search for.
const PAGE_SIZE: u32 = 100;

/// Direction code the API uses for "rising against previous close".
const DIRECTION_RISING: &str = "2";
/// Direction code for "falling against previous close".
const DIRECTION_FALLING: &str = "5";

/// Market-status string for an open session; anything else is treated as
/// closed.
const STATUS_OPEN: &str = "OPEN";

/// Naver mobile stock API provider.
///
/// - **Free**: no API key, no authentication.
/// - **Coverage**: KOSPI/KOSDAQ stocks, both market indices, and the NXT
///   extended-session feed where one exists.
/// - **Endpoints**: `stock/{code}/basic`, `index/{code}/basic`,
///   `stocks/marketValue/{market}`.
///
/// Prices arrive as strings with thousands separators and are kept that way
/// on the normalized record; see `Quote` for the numeric accessors.
pub struct NaverProvider {
    client: Client,
}

impl NaverProvider {
    pub fn new() -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    async fn get_envelope(&self, url: &str, code: &str) -> Result<QuoteEnvelope, CoreError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::fetch(code, e))?;

        response
            .json::<QuoteEnvelope>()
            .await
            .map_err(|e| CoreError::fetch(code, format!("decode failure: {e}")))
    }
}

impl Default for NaverProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Naver API response types ────────────────────────────────────────

/// JSON envelope shared by the stock and index basic endpoints.
/// Any schema deviation is a decode failure — a record is never partially
/// populated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEnvelope {
    pub item_code: String,
    pub stock_name: String,
    pub close_price: String,
    pub compare_to_previous_close_price: String,
    pub fluctuations_ratio: String,
    pub compare_to_previous_price: DirectionCode,
    #[serde(default)]
    pub stock_exchange_type: Option<ExchangeType>,
    /// "OPEN" while the primary session trades.
    #[serde(default)]
    pub market_status: Option<String>,
    #[serde(default)]
    pub over_market_price_info: Option<OverMarketInfo>,
}

/// Provider direction code: "2" rising, "5" falling, anything else flat.
#[derive(Debug, Deserialize)]
pub struct DirectionCode {
    pub code: String,
    pub text: String,
}

/// Exchange the instrument trades on: "KS" (KOSPI) or "KQ" (KOSDAQ).
#[derive(Debug, Deserialize)]
pub struct ExchangeType {
    pub code: String,
}

/// Extended-session (NXT) sub-object, same shape as the primary feed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverMarketInfo {
    #[serde(default)]
    pub over_market_status: Option<String>,
    #[serde(default)]
    pub over_price: Option<String>,
    #[serde(default)]
    pub fluctuations_ratio: Option<String>,
    #[serde(default)]
    pub compare_to_previous_close_price: Option<String>,
    #[serde(default)]
    pub compare_to_previous_price: Option<DirectionCode>,
}

#[derive(Debug, Deserialize)]
pub struct MarketValueResponse {
    pub stocks: Vec<MarketStock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStock {
    pub item_code: String,
    pub stock_name: String,
}

impl QuoteEnvelope {
    /// Normalize the envelope into a `Quote`. Holding fields start empty;
    /// the aggregator merges them in from the portfolio store.
    pub fn into_quote(self) -> Quote {
        let is_rising = self.compare_to_previous_price.code == DIRECTION_RISING;
        let is_falling = self.compare_to_previous_price.code == DIRECTION_FALLING;
        let is_main_open = self.market_status.as_deref() == Some(STATUS_OPEN);

        let over = self.over_market_price_info;
        let is_nxt_open = over
            .as_ref()
            .and_then(|o| o.over_market_status.as_deref())
            == Some(STATUS_OPEN);
        let nxt_direction = over
            .as_ref()
            .and_then(|o| o.compare_to_previous_price.as_ref())
            .map(|d| d.code.clone());

        Quote {
            code: self.item_code,
            name: self.stock_name,
            price: self.close_price,
            change_amount: self.compare_to_previous_close_price,
            change_rate: self.fluctuations_ratio,
            is_rising,
            is_falling,
            market: self.stock_exchange_type.map(|e| e.code),
            nxt_price: over.as_ref().and_then(|o| o.over_price.clone()),
            nxt_change_rate: over.as_ref().and_then(|o| o.fluctuations_ratio.clone()),
            nxt_change_amount: over
                .as_ref()
                .and_then(|o| o.compare_to_previous_close_price.clone()),
            is_nxt_rising: nxt_direction.as_deref() == Some(DIRECTION_RISING),
            is_nxt_falling: nxt_direction.as_deref() == Some(DIRECTION_FALLING),
            is_nxt_open,
            is_main_open,
            quantity: None,
            average_price: None,
        }
    }
}

/// Map a listing segment name to the exchange code carried on entries.
fn segment_code(market: &str) -> &'static str {
    if market == "KOSPI" {
        "KS"
    } else {
        "KQ"
    }
}

#[async_trait]
impl QuoteProvider for NaverProvider {
    fn name(&self) -> &str {
        "Naver"
    }

    async fn fetch_stock(&self, code: &str) -> Result<Quote, CoreError> {
        if code.is_empty() {
            return Err(CoreError::InvalidCode("empty instrument code".into()));
        }
        let url = format!("{BASE_URL}/stock/{code}/basic");
        Ok(self.get_envelope(&url, code).await?.into_quote())
    }

    async fn fetch_index(&self, code: &str) -> Result<Quote, CoreError> {
        if code.is_empty() {
            return Err(CoreError::InvalidCode("empty index code".into()));
        }
        let url = format!("{BASE_URL}/index/{code}/basic");
        let mut quote = self.get_envelope(&url, code).await?.into_quote();
        // Indices carry no exchange type; the index code itself is the segment.
        quote.market = Some(code.to_string());
        Ok(quote)
    }

    async fn fetch_market_page(
        &self,
        market: &str,
        page: u32,
    ) -> Result<Vec<DirectoryEntry>, CoreError> {
        if market.is_empty() {
            return Err(CoreError::InvalidCode("empty market segment".into()));
        }
        if page == 0 {
            return Err(CoreError::InvalidCode("page must be positive".into()));
        }

        let url = format!("{BASE_URL}/stocks/marketValue/{market}?page={page}&pageSize={PAGE_SIZE}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::fetch(market, e))?;

        let listing: MarketValueResponse = response
            .json()
            .await
            .map_err(|e| CoreError::fetch(market, format!("decode failure: {e}")))?;

        let segment = segment_code(market);
        Ok(listing
            .stocks
            .into_iter()
            .map(|s| DirectoryEntry {
                code: s.item_code,
                name: s.stock_name,
                market: segment.to_string(),
            })
            .collect())
    }
}
