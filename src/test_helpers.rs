//! Shared test utilities for the iconsmith test suite.
//!
//! Synthetic sources stand in for photographs so tests never depend on
//! files in the repository.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let source = tmp.path().join("face.jpg");
//! write_test_jpeg(&source, 320, 200);
//!
//! let canvas = gradient_image(64, 64);
//! assert_png_size(&tmp.path().join("logo.png"), 16);
//! ```

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// Opaque RGBA gradient: red follows x, green follows y.
///
/// Small images get a distinct value per pixel, so crops and offsets are
/// visible in assertions.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    let span = |n: u32| n.saturating_sub(1).max(1);
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / span(width)).min(255) as u8,
            (y * 255 / span(height)).min(255) as u8,
            128,
            255,
        ])
    })
}

/// Bright spot on a dark field, a stand-in for an eye reflection.
pub fn highlight_image(size: u32) -> RgbaImage {
    let centre = size as f32 / 2.0;
    let radius = size as f32 / 8.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - centre;
        let dy = y as f32 + 0.5 - centre;
        if (dx * dx + dy * dy).sqrt() <= radius {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([30, 30, 30, 255])
        }
    })
}

// =========================================================================
// Files on disk
// =========================================================================

/// Encode an RGB gradient JPEG at `path`.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Assert that `path` decodes to a `size × size` image.
pub fn assert_png_size(path: &Path, size: u32) {
    let decoded = image::open(path)
        .unwrap_or_else(|e| panic!("{} does not decode: {e}", path.display()));
    assert_eq!(
        (decoded.width(), decoded.height()),
        (size, size),
        "{}",
        path.display()
    );
}
