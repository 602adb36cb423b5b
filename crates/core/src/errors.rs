use thiserror::Error;

/// Unified error type for the entire stock-ticker-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// Nothing in here is fatal to the process: fetch failures leave the
/// previous quote in place, persistence failures leave the in-memory
/// state authoritative.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("Fetch failed for {code}: {message}")]
    FetchFailed { code: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidCode(String),

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Wrap a transport or decode failure as a per-instrument fetch error.
    /// The instrument keeps its last known quote; the next refresh cycle is
    /// the retry policy.
    pub fn fetch(code: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        CoreError::FetchFailed {
            code: code.into(),
            message: cause.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
