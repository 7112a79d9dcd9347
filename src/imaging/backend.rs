//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations that touch the
//! filesystem: loading a source photograph and saving an encoded image.
//! Everything between those two points is pure pixel math on in-memory
//! buffers, so the exporter can be tested against a recording mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), backed by the `image`
//! crate's pure-Rust codecs.

use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {format}: {message}")]
    Encode {
        format: OutputFormat,
        message: String,
    },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Encodings the exporter knows how to write, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Ico,
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// Infer the format from a destination's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, BackendError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "ico" => Ok(Self::Ico),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::WebP),
            other => Err(BackendError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Ico => "ico",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Png => "PNG",
            Self::Ico => "ICO",
            Self::Jpeg => "JPEG",
            Self::WebP => "WebP",
        })
    }
}

/// Trait for image I/O backends.
///
/// `Sync` so the exporter can share one backend across rayon workers.
pub trait ImageBackend: Sync {
    /// Decode an image file into a straight-alpha RGBA buffer.
    fn load(&self, path: &Path) -> Result<RgbaImage, BackendError>;

    /// Encode `image` in `format` and write it to `path`.
    ///
    /// The parent directory must already exist.
    fn save(&self, image: &RgbaImage, path: &Path, format: OutputFormat)
    -> Result<(), BackendError>;
}
