//! Image uploads for products, categories and carousel slides.
//!
//! Files land in `UPLOAD_DIR/<folder>/<uuid>.<ext>` and the relative path
//! (`products/<uuid>.jpg`) is what gets stored in the database. The admin
//! server serves the directory at `/uploads`.

use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Largest accepted image.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted file extensions (lowercase).
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Multipart field carrying the file.
pub const IMAGE_FIELD: &str = "image";

/// Errors that can occur while accepting an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported image type; allowed: jpg, jpeg, png, webp, gif")]
    UnsupportedType,

    #[error("image exceeds the {max} byte limit")]
    TooLarge { max: usize },

    #[error("uploaded image is empty")]
    Empty,

    #[error("missing `image` field")]
    Missing,

    #[error("malformed upload: {0}")]
    Malformed(String),

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an image belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    Products,
    Categories,
    Carousels,
}

impl UploadFolder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Carousels => "carousels",
        }
    }
}

/// Lowercased extension of `filename` if it is an accepted image type.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedType` for anything else.
pub fn image_extension(filename: &str) -> Result<&'static str, UploadError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(UploadError::UnsupportedType)?;

    ALLOWED_EXTENSIONS
        .into_iter()
        .find(|allowed| *allowed == ext)
        .ok_or(UploadError::UnsupportedType)
}

/// Check an upload's size and type before it touches disk.
///
/// # Errors
///
/// Returns `UploadError` when the file is empty, too large or not an image.
pub fn validate(filename: &str, len: usize) -> Result<&'static str, UploadError> {
    if len == 0 {
        return Err(UploadError::Empty);
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            max: MAX_UPLOAD_BYTES,
        });
    }
    image_extension(filename)
}

/// Pull the `image` field out of a multipart body.
///
/// # Errors
///
/// Returns `UploadError::Missing` if no `image` field is present, or
/// `UploadError::TooLarge` if the body limit was hit while reading.
pub async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Bytes), UploadError> {
    while let Some(field) = multipart.next_field().await.map_err(map_multipart)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(map_multipart)?;
        return Ok((filename, bytes));
    }
    Err(UploadError::Missing)
}

fn map_multipart(err: axum::extract::multipart::MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge {
            max: MAX_UPLOAD_BYTES,
        }
    } else {
        UploadError::Malformed(err.body_text())
    }
}

/// Validate and write an image, returning its stored relative path.
///
/// # Errors
///
/// Returns `UploadError` on validation failure or if the write fails.
pub async fn store(
    root: &Path,
    folder: UploadFolder,
    filename: &str,
    bytes: &[u8],
) -> Result<String, UploadError> {
    let ext = validate(filename, bytes.len())?;

    let dir = root.join(folder.as_str());
    tokio::fs::create_dir_all(&dir).await?;

    let name = format!("{}.{ext}", Uuid::new_v4());
    tokio::fs::write(dir.join(&name), bytes).await?;

    let stored = format!("{}/{name}", folder.as_str());
    tracing::info!(path = %stored, size = bytes.len(), "Stored upload");
    Ok(stored)
}

/// Remove a previously stored image. Missing files and paths that would
/// escape `root` are ignored.
pub async fn remove(root: &Path, stored: &str) {
    let Some(path) = resolve(root, stored) else {
        tracing::warn!(path = %stored, "Refusing to remove upload outside upload dir");
        return;
    };
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::debug!(path = %stored, "Removed upload"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %stored, error = %e, "Failed to remove upload"),
    }
}

fn resolve(root: &Path, stored: &str) -> Option<PathBuf> {
    let relative = Path::new(stored);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    (safe && !stored.is_empty()).then(|| root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("rose.JPG").ok(), Some("jpg"));
        assert_eq!(image_extension("tulip.webp").ok(), Some("webp"));
        assert!(matches!(
            image_extension("bouquet.svg"),
            Err(UploadError::UnsupportedType)
        ));
        assert!(matches!(
            image_extension("noext"),
            Err(UploadError::UnsupportedType)
        ));
    }

    #[test]
    fn test_validate_size() {
        assert!(matches!(validate("a.png", 0), Err(UploadError::Empty)));
        assert!(matches!(
            validate("a.png", MAX_UPLOAD_BYTES + 1),
            Err(UploadError::TooLarge { .. })
        ));
        assert!(validate("a.png", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/uploads");
        assert_eq!(
            resolve(root, "products/a.png"),
            Some(PathBuf::from("/srv/uploads/products/a.png"))
        );
        assert!(resolve(root, "../etc/passwd").is_none());
        assert!(resolve(root, "/etc/passwd").is_none());
        assert!(resolve(root, "").is_none());
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let root = std::env::temp_dir().join(format!("bb-uploads-{}", Uuid::new_v4()));
        let stored = store(&root, UploadFolder::Products, "rose.png", b"\x89PNG")
            .await
            .expect("store");
        assert!(stored.starts_with("products/"));
        assert!(stored.ends_with(".png"));
        assert!(root.join(&stored).exists());

        remove(&root, &stored).await;
        assert!(!root.join(&stored).exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
