//! Circular alpha masks.
//!
//! Distances are measured from pixel centres to the canvas centre, so masks
//! are symmetric on every axis for both even and odd sizes.

use super::blur::blur_plane;
use super::plane::{Plane, to_u8};
use image::{GrayImage, RgbaImage};

/// How the subject's circular clip is generated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskPolicy {
    /// 255 inside the circle inscribed `margin` pixels from each edge, 0 outside.
    HardCircle { margin: u32 },
    /// 255 up to `inner_fraction × max_radius`, linear falloff to 0 at
    /// `max_radius` (half the short edge).
    RadialGradient { inner_fraction: f32 },
    /// [`MaskPolicy::HardCircle`] feathered by a Gaussian blur.
    BlurSoftened { margin: u32, blur_radius: f32 },
}

/// Distance from the centre of pixel `(x, y)` to the canvas centre.
pub fn center_distance(x: u32, y: u32, width: u32, height: u32) -> f32 {
    let dx = x as f32 + 0.5 - width as f32 / 2.0;
    let dy = y as f32 + 0.5 - height as f32 / 2.0;
    (dx * dx + dy * dy).sqrt()
}

fn hard_circle(size: u32, margin: u32) -> Plane {
    let radius = (size as f32 - 2.0 * margin as f32) / 2.0;
    Plane::from_fn(size, size, |x, y| {
        if radius > 0.0 && center_distance(x, y, size, size) <= radius {
            255.0
        } else {
            0.0
        }
    })
}

fn radial_gradient(size: u32, inner_fraction: f32) -> Plane {
    let max_radius = size as f32 / 2.0;
    let inner = max_radius * inner_fraction.clamp(0.0, 1.0);
    let falloff = max_radius - inner;
    Plane::from_fn(size, size, |x, y| {
        let dist = center_distance(x, y, size, size);
        if dist <= inner {
            255.0
        } else if dist >= max_radius {
            0.0
        } else {
            255.0 * (1.0 - (dist - inner) / falloff)
        }
    })
}

/// Build a `size × size` mask under `policy`.
pub fn synthesize_mask(size: u32, policy: MaskPolicy) -> GrayImage {
    let plane = match policy {
        MaskPolicy::HardCircle { margin } => hard_circle(size, margin),
        MaskPolicy::RadialGradient { inner_fraction } => radial_gradient(size, inner_fraction),
        MaskPolicy::BlurSoftened {
            margin,
            blur_radius,
        } => blur_plane(&hard_circle(size, margin), blur_radius),
    };
    plane.to_gray()
}

/// Multiply an image's alpha by `mask`. Dimensions must match.
pub fn apply_mask(image: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    debug_assert_eq!(image.dimensions(), mask.dimensions());
    let mut out = image.clone();
    for (pixel, m) in out.pixels_mut().zip(mask.pixels()) {
        pixel[3] = to_u8(pixel[3] as f32 * m[0] as f32 / 255.0);
    }
    out
}
