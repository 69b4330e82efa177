//! Runtime settings resolved from flags, environment and platform directories.
//!
//! `WISHLIST_FILE` and `WISHLIST_CURRENCY` are read by the CLI parser and arrive here as
//! overrides.

use crate::store::STORE_FILE_NAME;
use std::path::PathBuf;

/// Currency prefix used when none is configured.
pub const DEFAULT_CURRENCY: &str = "฿";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Settings {
    /// Build settings from optional overrides, falling back to defaults.
    pub fn resolve(file: Option<PathBuf>, currency: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            store_path: file.unwrap_or(defaults.store_path),
            currency: currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.currency),
        }
    }
}

/// `<data dir>/wishlist/wishlist_prefs.json`, or the current directory when the platform
/// has no data directory.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("wishlist").join(STORE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(STORE_FILE_NAME))
}
