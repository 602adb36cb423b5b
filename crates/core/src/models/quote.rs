use serde::{Deserialize, Serialize};

/// Parse a provider price string ("71,200", "0.42") into a number.
/// Thousands separators are stripped; a missing or malformed value is 0.0,
/// so every derived price resolves to a non-negative figure for
/// provider-reported data.
fn parse_price(value: Option<&str>) -> f64 {
    match value {
        Some(s) => s.replace(',', "").parse().unwrap_or(0.0),
        None => 0.0,
    }
}

/// A normalized quote for a single instrument or market index, as merged
/// into the visible list.
///
/// Price fields keep the provider's string form (thousands separators and
/// all) so the presentation layer can show them verbatim; the numeric
/// accessors below parse on demand. The direction flags are mutually
/// exclusive — they come from a single provider code ("2" rising,
/// "5" falling, anything else flat).
///
/// `quantity` and `average_price` are not provider data: they are merged in
/// from the portfolio store at fetch time and patched synchronously when the
/// user edits a holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Exchange code — the identity of the instrument (e.g. "005930").
    pub code: String,
    pub name: String,
    /// Main-session price.
    pub price: String,
    pub change_amount: String,
    pub change_rate: String,
    pub is_rising: bool,
    pub is_falling: bool,
    /// Market segment: "KS" (KOSPI) or "KQ" (KOSDAQ) for stocks, the index
    /// code itself for indices. None when the provider omits it.
    pub market: Option<String>,
    // Extended-session (NXT) feed, when the venue reports one.
    pub nxt_price: Option<String>,
    pub nxt_change_rate: Option<String>,
    pub nxt_change_amount: Option<String>,
    pub is_nxt_rising: bool,
    pub is_nxt_falling: bool,
    pub is_nxt_open: bool,
    pub is_main_open: bool,
    // Holding fields, merged from the portfolio store.
    pub quantity: Option<u32>,
    pub average_price: Option<f64>,
}

impl Quote {
    /// Effective current price: the NXT price while the extended session is
    /// open and reported, otherwise the main-session price.
    pub fn current_price(&self) -> f64 {
        if self.is_nxt_open {
            if let Some(nxt) = self.nxt_price.as_deref() {
                return parse_price(Some(nxt));
            }
        }
        parse_price(Some(&self.price))
    }

    /// Effective change rate, selected with the same rule as `current_price`.
    pub fn current_change_rate(&self) -> f64 {
        if self.is_nxt_open {
            if let Some(rate) = self.nxt_change_rate.as_deref() {
                return parse_price(Some(rate));
            }
        }
        parse_price(Some(&self.change_rate))
    }

    /// Main-session change rate as a number, regardless of NXT state.
    pub fn change_rate_value(&self) -> f64 {
        parse_price(Some(&self.change_rate))
    }

    /// Main-session change amount as a number. Unsigned — the sign lives in
    /// the direction flags.
    pub fn change_amount_value(&self) -> f64 {
        parse_price(Some(&self.change_amount))
    }

    /// NXT change amount as a number, 0.0 when absent.
    pub fn nxt_change_amount_value(&self) -> f64 {
        parse_price(self.nxt_change_amount.as_deref())
    }

    /// Market value of the position: effective price × quantity.
    /// 0.0 without a quantity (watched, not owned).
    pub fn position_value(&self) -> f64 {
        match self.quantity {
            Some(q) => self.current_price() * f64::from(q),
            None => 0.0,
        }
    }

    /// Today's gain on the main session: the change amount, negated when the
    /// direction flag says falling, times the quantity held.
    pub fn daily_gain(&self) -> f64 {
        let Some(q) = self.quantity else { return 0.0 };
        let mut change = self.change_amount_value();
        if self.is_falling {
            change = -change;
        }
        change * f64::from(q)
    }

    /// Today's gain on the extended session, same formula as `daily_gain`
    /// using the NXT change amount and NXT direction flag.
    pub fn nxt_daily_gain(&self) -> f64 {
        let Some(q) = self.quantity else { return 0.0 };
        let mut change = self.nxt_change_amount_value();
        if self.is_nxt_falling {
            change = -change;
        }
        change * f64::from(q)
    }

    /// Lifetime gain against the recorded cost basis, at the effective price.
    /// None when no average cost is recorded.
    pub fn lifetime_gain(&self) -> Option<f64> {
        let q = self.quantity?;
        let avg = self.average_price?;
        Some((self.current_price() - avg) * f64::from(q))
    }

    /// Lifetime gain at the main-session price regardless of NXT state — the
    /// secondary figure shown while the extended session is active.
    pub fn main_lifetime_gain(&self) -> Option<f64> {
        let q = self.quantity?;
        let avg = self.average_price?;
        Some((parse_price(Some(&self.price)) - avg) * f64::from(q))
    }
}
