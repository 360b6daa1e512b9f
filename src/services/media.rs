//! Media storage for recipe images and avatars.
//!
//! Images arrive as base64 data URLs (`data:image/png;base64,...`), are
//! written under the media root as `{kind dir}/{uuid}.{ext}` and referenced
//! by that relative path. Public URLs are `{public_url}/media/{path}`.

use std::path::{Component, Path, PathBuf};

use base64::Engine;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{Error, Result};

/// Where an uploaded image belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    RecipeImage,
    Avatar,
}

impl MediaKind {
    fn dir(&self) -> &'static str {
        match self {
            Self::RecipeImage => "recipes/images",
            Self::Avatar => "users",
        }
    }
}

/// A decoded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Filesystem-backed image store.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    public_url: String,
    max_size: usize,
}

impl MediaStorage {
    pub fn new(config: &StorageConfig, public_url: &str) -> Self {
        Self {
            root: config.media_root.clone(),
            public_url: public_url.trim_end_matches('/').to_string(),
            max_size: config.max_image_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode a data URL, enforcing the size cap and an `image/*` MIME type.
    pub fn decode(&self, data_url: &str) -> Result<DecodedImage> {
        let (header, payload) = data_url
            .trim()
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .ok_or_else(|| Error::InvalidInput("Image must be a base64 data URL".to_string()))?;

        let mime = header.to_ascii_lowercase();
        let subtype = mime
            .strip_prefix("image/")
            .ok_or_else(|| Error::InvalidFileType(mime.clone()))?;
        let extension = image_extension(&mime, subtype)
            .ok_or_else(|| Error::InvalidFileType(mime.clone()))?;

        // Reject oversized payloads before decoding them.
        if payload.len() / 4 * 3 > self.max_size + 3 {
            return Err(Error::FileTooLarge {
                max_size: self.max_size,
            });
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidInput(format!("Failed to decode image: {}", e)))?;

        if bytes.is_empty() {
            return Err(Error::InvalidInput("Image is empty".to_string()));
        }
        if bytes.len() > self.max_size {
            return Err(Error::FileTooLarge {
                max_size: self.max_size,
            });
        }

        Ok(DecodedImage {
            mime,
            extension,
            bytes,
        })
    }

    /// Decode and store a data URL, returning the media-relative path.
    pub async fn save_data_url(&self, kind: MediaKind, data_url: &str) -> Result<String> {
        let image = self.decode(data_url)?;
        let relative = format!("{}/{}.{}", kind.dir(), Uuid::new_v4(), image.extension);
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Internal(format!("Failed to create media directory: {}", e)))?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &image.bytes)
            .await
            .map_err(|e| Error::Internal(format!("Failed to write image: {}", e)))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| Error::Internal(format!("Failed to rename image: {}", e)))?;

        debug!(path = %relative, mime = %image.mime, size = image.bytes.len(), "Stored image");
        Ok(relative)
    }

    /// Delete a stored file. Failures are logged, never returned.
    pub async fn remove(&self, relative: &str) {
        let Some(path) = self.resolve(relative) else {
            warn!(path = %relative, "Refusing to remove media outside the media root");
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => debug!(path = %relative, "Removed image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %relative, error = %e, "Failed to remove image"),
        }
    }

    /// Absolute URL for a media-relative path.
    pub fn url(&self, relative: &str) -> String {
        format!("{}/media/{}", self.public_url, relative.trim_start_matches('/'))
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}

fn image_extension(mime: &str, subtype: &str) -> Option<String> {
    if subtype == "jpeg" {
        return Some("jpg".to_string());
    }
    if let Some(ext) = mime_guess::get_mime_extensions_str(mime).and_then(|exts| exts.first()) {
        return Some(ext.to_string());
    }
    (!subtype.is_empty() && subtype.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| subtype.to_string())
}
