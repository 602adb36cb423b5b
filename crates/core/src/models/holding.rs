use serde::{Deserialize, Serialize};

/// A user-declared position in one instrument: how many units are owned and,
/// optionally, what they cost on average.
///
/// Presence in the holdings map is what means "owned" — a code that appears
/// in the order list without a holding is watched only. A quantity of 0 is a
/// valid holding (owned, zero position value); deleting the map entry is how
/// a holding is cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: u32,
    /// Average cost per unit. Positive when present.
    pub average_price: Option<f64>,
}
