//! Image references attached to items.
//!
//! A reference is an opaque URI string. Local files are turned into absolute `file://`
//! URIs so the reference keeps working from any working directory.

use crate::error::{Result, ValidationError};
use std::fs::File;
use std::path::Path;

/// File extensions accepted as pictures.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "heic"];

const OPAQUE_SCHEMES: &[&str] = &["content://", "file://", "http://", "https://"];

/// Turn user input into a durable image reference.
pub fn acquire(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::InvalidImage("empty path".to_string()).into());
    }

    if OPAQUE_SCHEMES.iter().any(|scheme| input.starts_with(scheme)) {
        return Ok(input.to_string());
    }

    let path = Path::new(input);
    let has_image_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !has_image_extension {
        return Err(ValidationError::InvalidImage(format!("{input} is not an image file")).into());
    }

    let canonical = path
        .canonicalize()
        .map_err(|e| ValidationError::InvalidImage(format!("{input}: {e}")))?;
    if !canonical.is_file() {
        return Err(ValidationError::InvalidImage(format!("{input} is not a file")).into());
    }
    File::open(&canonical).map_err(|e| ValidationError::InvalidImage(format!("{input}: {e}")))?;

    let uri = format!("file://{}", canonical.display());
    log::debug!("Acquired image {uri}");
    Ok(uri)
}

/// Whether a stored reference still points at a readable local file.
///
/// Non-file URIs cannot be checked and are assumed available.
pub fn is_available(uri: &str) -> bool {
    match uri.strip_prefix("file://") {
        Some(path) => Path::new(path).is_file(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WishlistError;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_local_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.PNG");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let uri = acquire(path.to_str().unwrap()).unwrap();
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("photo.PNG"));
        assert!(is_available(&uri));
    }

    #[test]
    fn test_acquire_passes_uris_through() {
        assert_eq!(
            acquire("content://media/external/images/1").unwrap(),
            "content://media/external/images/1"
        );
        assert!(is_available("content://media/external/images/1"));
    }

    #[test]
    fn test_acquire_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "hi").unwrap();

        for input in [
            "".to_string(),
            text.display().to_string(),
            dir.path().join("missing.jpg").display().to_string(),
        ] {
            assert!(matches!(
                acquire(&input),
                Err(WishlistError::Validation(ValidationError::InvalidImage(_)))
            ));
        }
    }
}
