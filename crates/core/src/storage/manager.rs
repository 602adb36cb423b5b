use std::fs;
use std::path::PathBuf;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

/// File name of the current portfolio document.
const PORTFOLIO_FILE: &str = "portfolio.json";

/// Legacy record from the schema that predates holdings: a bare JSON array
/// of watched instrument codes.
const LEGACY_WATCHED_FILE: &str = "watched_codes.json";

/// High-level storage operations: the portfolio document is read and written
/// as a whole, so the order list and the holdings map can never get out of
/// sync on disk.
///
/// Callers treat every failure here as non-fatal — the in-memory state stays
/// authoritative for the running session and the error is logged.
pub struct StorageManager {
    dir: PathBuf,
}

impl StorageManager {
    /// `dir` is the state directory; it is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn portfolio_path(&self) -> PathBuf {
        self.dir.join(PORTFOLIO_FILE)
    }

    fn legacy_path(&self) -> PathBuf {
        self.dir.join(LEGACY_WATCHED_FILE)
    }

    /// Load the portfolio document. A missing file is a fresh install and
    /// yields the default (empty) document, not an error.
    pub fn load(&self) -> Result<Portfolio, CoreError> {
        let path = self.portfolio_path();
        if !path.exists() {
            return Ok(Portfolio::default());
        }
        let bytes = fs::read(&path)?;
        let portfolio = serde_json::from_slice(&bytes)?;
        Ok(portfolio)
    }

    /// Full overwrite of the portfolio document. There is no partial or
    /// merge write.
    pub fn save(&self, portfolio: &Portfolio) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec_pretty(portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))?;
        fs::write(self.portfolio_path(), json)?;
        Ok(())
    }

    /// One-shot migration from the legacy watched-codes record.
    ///
    /// If the legacy file exists, its list becomes the new order list (with
    /// no holdings) and the file is deleted. Running this twice has no
    /// additional effect because the file is absent after the first run.
    /// Returns the migrated codes, or None when there was nothing to migrate.
    pub fn migrate_legacy(&self) -> Result<Option<Vec<String>>, CoreError> {
        let path = self.legacy_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let codes: Vec<String> = serde_json::from_slice(&bytes)?;
        fs::remove_file(&path)?;
        Ok(Some(codes))
    }
}
