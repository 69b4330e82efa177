//! Error types for wishlist.

use std::path::PathBuf;
use thiserror::Error;

/// A rejected user input. State is never changed when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill all info: name is empty")]
    EmptyName,

    #[error("Please fill all info: price is empty")]
    EmptyPrice,

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Amount exceeds remaining, remaining = {remaining:.2}")]
    ExceedsRemaining { remaining: f64 },

    #[error("Completed")]
    AlreadyComplete,

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// Main error type for wishlist operations.
#[derive(Error, Debug)]
pub enum WishlistError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Stored wishlist is corrupt: {0}")]
    CorruptSnapshot(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("No item at position {0}")]
    InvalidPosition(usize),

    #[error("Store file {path} is unreadable: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl WishlistError {
    /// True for errors caused by user input rather than storage.
    pub fn is_validation(&self) -> bool {
        matches!(self, WishlistError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, WishlistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceeds_remaining_message() {
        let err = ValidationError::ExceedsRemaining { remaining: 600.0 };
        assert_eq!(err.to_string(), "Amount exceeds remaining, remaining = 600.00");
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: WishlistError = ValidationError::InvalidAmount.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid amount");
        assert!(!WishlistError::InvalidPosition(1).is_validation());
    }
}
