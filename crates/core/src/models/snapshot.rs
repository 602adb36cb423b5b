use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::quote::Quote;

/// Aggregate figures across every visible position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    /// Sum of position values at effective prices.
    pub value: f64,
    /// Sum of main-session daily gains.
    pub daily_gain: f64,
    /// Sum of extended-session daily gains.
    pub nxt_daily_gain: f64,
    /// Sum of lifetime gains at effective prices (positions without a cost
    /// basis contribute nothing).
    pub lifetime_gain: f64,
    /// Sum of lifetime gains at main-session prices, for display while the
    /// extended session is active.
    pub main_lifetime_gain: f64,
}

/// Read-only projection of the engine state, published on the snapshot
/// channel after every visible change.
///
/// Consumers must treat every field as valid until the next refresh
/// completes: merges replace one element at a time, and each published
/// snapshot is a complete, self-consistent view as of that merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tracked instruments in order-list order.
    pub quotes: Vec<Quote>,
    /// Market indices, KOSPI first.
    pub indices: Vec<Quote>,
    pub totals: PortfolioTotals,
    /// Primary session open, per the most recently fetched instrument.
    pub is_main_market_open: bool,
    /// Primary-or-extended session open.
    pub is_market_open: bool,
    /// When the last successful merge happened. None until the first one.
    pub last_updated: Option<DateTime<Utc>>,
}
