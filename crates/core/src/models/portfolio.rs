use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::holding::Holding;
use super::settings::Settings;

/// The single persisted document. Loaded and saved as a whole, so the order
/// list and the holdings map can never get out of sync on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// User-controlled display order of tracked instruments. Authoritative:
    /// quotes are re-sorted to this list after every merge, never to API
    /// response order.
    pub codes: Vec<String>,

    /// Instrument code → holding. Codes in `codes` without an entry here are
    /// watched but not owned.
    pub holdings: HashMap<String, Holding>,

    #[serde(default)]
    pub settings: Settings,
}
