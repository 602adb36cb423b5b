use serde::{Deserialize, Serialize};

/// One entry in the searchable symbol catalog. Immutable once the catalog is
/// built; the catalog is rebuilt at most once per process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub code: String,
    pub name: String,
    /// Market segment the listing page came from: "KS" or "KQ".
    pub market: String,
}
