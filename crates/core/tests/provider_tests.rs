// ═══════════════════════════════════════════════════════════════════
// Provider Tests — envelope decoding, normalization, request validation
// ═══════════════════════════════════════════════════════════════════

use stock_ticker_core::errors::CoreError;
use stock_ticker_core::providers::naver::{MarketValueResponse, NaverProvider, QuoteEnvelope};
use stock_ticker_core::providers::traits::QuoteProvider;

const STOCK_JSON: &str = r#"{
    "itemCode": "005930",
    "stockName": "Samsung Electronics",
    "closePrice": "71,200",
    "compareToPreviousClosePrice": "1,100",
    "fluctuationsRatio": "1.57",
    "compareToPreviousPrice": { "code": "2", "text": "rising" },
    "stockExchangeType": { "code": "KS" },
    "marketStatus": "OPEN",
    "overMarketPriceInfo": {
        "overMarketStatus": "CLOSE",
        "overPrice": "71,150",
        "fluctuationsRatio": "1.50",
        "compareToPreviousClosePrice": "1,050",
        "compareToPreviousPrice": { "code": "5", "text": "falling" }
    }
}"#;

const MINIMAL_JSON: &str = r#"{
    "itemCode": "035720",
    "stockName": "Kakao",
    "closePrice": "41,300",
    "compareToPreviousClosePrice": "250",
    "fluctuationsRatio": "0.61",
    "compareToPreviousPrice": { "code": "3", "text": "flat" }
}"#;

// ═══════════════════════════════════════════════════════════════════
//  Envelope decoding & normalization
// ═══════════════════════════════════════════════════════════════════

mod normalization {
    use super::*;

    #[test]
    fn full_envelope_maps_every_field() {
        let envelope: QuoteEnvelope = serde_json::from_str(STOCK_JSON).unwrap();
        let quote = envelope.into_quote();

        assert_eq!(quote.code, "005930");
        assert_eq!(quote.name, "Samsung Electronics");
        assert_eq!(quote.price, "71,200");
        assert_eq!(quote.change_amount, "1,100");
        assert_eq!(quote.change_rate, "1.57");
        assert_eq!(quote.market.as_deref(), Some("KS"));
        assert_eq!(quote.nxt_price.as_deref(), Some("71,150"));
        assert_eq!(quote.nxt_change_rate.as_deref(), Some("1.50"));
        assert_eq!(quote.nxt_change_amount.as_deref(), Some("1,050"));
    }

    #[test]
    fn direction_code_two_is_rising() {
        let envelope: QuoteEnvelope = serde_json::from_str(STOCK_JSON).unwrap();
        let quote = envelope.into_quote();
        assert!(quote.is_rising);
        assert!(!quote.is_falling);
    }

    #[test]
    fn nxt_direction_code_five_is_falling() {
        let envelope: QuoteEnvelope = serde_json::from_str(STOCK_JSON).unwrap();
        let quote = envelope.into_quote();
        assert!(quote.is_nxt_falling);
        assert!(!quote.is_nxt_rising);
    }

    #[test]
    fn other_direction_codes_are_flat() {
        let envelope: QuoteEnvelope = serde_json::from_str(MINIMAL_JSON).unwrap();
        let quote = envelope.into_quote();
        // Directional flags are mutually exclusive; an unknown code sets
        // neither.
        assert!(!quote.is_rising);
        assert!(!quote.is_falling);
    }

    #[test]
    fn open_status_sets_main_flag() {
        let envelope: QuoteEnvelope = serde_json::from_str(STOCK_JSON).unwrap();
        assert!(envelope.into_quote().is_main_open);
    }

    #[test]
    fn non_open_over_market_status_keeps_nxt_closed() {
        let envelope: QuoteEnvelope = serde_json::from_str(STOCK_JSON).unwrap();
        assert!(!envelope.into_quote().is_nxt_open);
    }

    #[test]
    fn open_over_market_status_sets_nxt_flag() {
        let json = STOCK_JSON.replace(r#""overMarketStatus": "CLOSE""#, r#""overMarketStatus": "OPEN""#);
        let envelope: QuoteEnvelope = serde_json::from_str(&json).unwrap();
        assert!(envelope.into_quote().is_nxt_open);
    }

    #[test]
    fn minimal_envelope_defaults_optional_fields() {
        let envelope: QuoteEnvelope = serde_json::from_str(MINIMAL_JSON).unwrap();
        let quote = envelope.into_quote();

        assert_eq!(quote.market, None);
        assert_eq!(quote.nxt_price, None);
        assert_eq!(quote.nxt_change_rate, None);
        assert_eq!(quote.nxt_change_amount, None);
        assert!(!quote.is_nxt_open);
        assert!(!quote.is_main_open);
    }

    #[test]
    fn holding_fields_start_empty() {
        let envelope: QuoteEnvelope = serde_json::from_str(STOCK_JSON).unwrap();
        let quote = envelope.into_quote();
        assert_eq!(quote.quantity, None);
        assert_eq!(quote.average_price, None);
    }

    #[test]
    fn missing_required_field_is_a_decode_failure() {
        let json = STOCK_JSON.replace(r#""closePrice": "71,200","#, "");
        let result: Result<QuoteEnvelope, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }

    #[test]
    fn market_listing_decodes_code_name_pairs() {
        let json = r#"{
            "stocks": [
                { "itemCode": "005930", "stockName": "Samsung Electronics" },
                { "itemCode": "000660", "stockName": "SK hynix" }
            ]
        }"#;
        let listing: MarketValueResponse = serde_json::from_str(json).unwrap();
        assert_eq!(listing.stocks.len(), 2);
        assert_eq!(listing.stocks[0].item_code, "005930");
        assert_eq!(listing.stocks[1].stock_name, "SK hynix");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Request validation (no network involved)
// ═══════════════════════════════════════════════════════════════════

mod validation {
    use super::*;

    #[test]
    fn provider_name() {
        assert_eq!(NaverProvider::new().name(), "Naver");
    }

    #[tokio::test]
    async fn empty_stock_code_is_rejected() {
        let provider = NaverProvider::new();
        let err = provider.fetch_stock("").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCode(_)));
    }

    #[tokio::test]
    async fn empty_index_code_is_rejected() {
        let provider = NaverProvider::new();
        let err = provider.fetch_index("").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCode(_)));
    }

    #[tokio::test]
    async fn empty_market_segment_is_rejected() {
        let provider = NaverProvider::new();
        let err = provider.fetch_market_page("", 1).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCode(_)));
    }

    #[tokio::test]
    async fn page_zero_is_rejected() {
        let provider = NaverProvider::new();
        let err = provider.fetch_market_page("KOSPI", 0).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCode(_)));
    }
}
