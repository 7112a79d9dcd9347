//! Image processing in pure Rust on top of the `image` crate.
//!
//! | Stage | Module | Entry point |
//! |---|---|---|
//! | **Load** | [`rust_backend`] | [`ImageBackend::load`] |
//! | **Crop** | `calculations` | [`calculate_crop_rect`] |
//! | **Tone map** | [`tone`] | [`tone_map`] |
//! | **Mask** | [`mask`] | [`synthesize_mask`] |
//! | **Glow** | [`glow`] | [`apply_glow`] |
//! | **Rings / arcs / disks** | [`ring`] | [`render_ring`], [`render_disk`], [`render_line`] |
//! | **Composite** | [`compose`] | [`Compositor`] |
//!
//! The module is split into:
//! - **Calculations**: Pure crop geometry (unit testable, no pixels)
//! - **Pixel stages**: Pure functions from one buffer to the next
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`] for file I/O

pub mod backend;
pub mod blur;
mod calculations;
pub mod compose;
pub mod glow;
pub mod mask;
pub mod plane;
pub mod ring;
pub mod rust_backend;
pub mod tone;

pub use backend::{BackendError, ImageBackend, OutputFormat};
pub use calculations::{CropAnchor, CropRect, calculate_crop_rect, calculate_inset, fraction_to_px};
pub use compose::{Compositor, Layer, apply_scanlines, over};
pub use glow::{GlowParams, apply_glow};
pub use mask::{MaskPolicy, apply_mask, synthesize_mask};
pub use plane::Plane;
pub use ring::{
    Bounds, LineSpec, RingSpec, Sweep, render_disk, render_line, render_ring, render_ring_blurred,
};
pub use rust_backend::RustBackend;
pub use tone::{ColorRamp, Enhancement, ToneMapped, tone_map};

use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Crop `rect` out of `image` and resample it to `size × size` with Lanczos3.
pub fn crop_and_resize(image: &RgbaImage, rect: CropRect, size: u32) -> RgbaImage {
    let cropped = imageops::crop_imm(image, rect.left, rect.top, rect.size, rect.size).to_image();
    if rect.size == size {
        return cropped;
    }
    imageops::resize(&cropped, size, size, FilterType::Lanczos3)
}

/// Resample a square canvas to `size × size` with Lanczos3.
pub fn resize_square(image: &RgbaImage, size: u32) -> RgbaImage {
    if image.width() == size && image.height() == size {
        return image.clone();
    }
    imageops::resize(image, size, size, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_image;

    #[test]
    fn crop_and_resize_produces_working_square() {
        let source = gradient_image(300, 200);
        let rect = calculate_crop_rect((300, 200), 0.5, CropAnchor::Center);
        let out = crop_and_resize(&source, rect, 64);
        assert_eq!(out.dimensions(), (64, 64));
    }

    #[test]
    fn crop_without_resample_copies_pixels() {
        let source = gradient_image(40, 40);
        let rect = CropRect {
            left: 10,
            top: 5,
            size: 8,
        };
        let out = crop_and_resize(&source, rect, 8);
        assert_eq!(out.get_pixel(0, 0), source.get_pixel(10, 5));
        assert_eq!(out.get_pixel(7, 7), source.get_pixel(17, 12));
    }

    #[test]
    fn resize_square_hits_exact_size() {
        let canvas = gradient_image(1024, 1024);
        assert_eq!(resize_square(&canvas, 16).dimensions(), (16, 16));
        assert_eq!(resize_square(&canvas, 1024), canvas);
    }
}
