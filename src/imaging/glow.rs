//! Highlight bloom.
//!
//! The brightest parts of the enhanced luminance (usually eye reflections)
//! are isolated, blurred into a soft mask and used to wash a tint over the
//! colorized image.

use super::blur::blur_plane;
use super::plane::{Plane, to_u8};
use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowParams {
    /// Luminance strictly above this is a highlight.
    pub threshold: u8,
    /// Gaussian sigma applied to the binary highlight mask.
    pub blur_radius: f32,
    pub tint: [u8; 3],
    /// Blend strength in `[0, 1]`.
    pub strength: f32,
}

/// Binary highlight mask: 255 where `luminance > threshold`, else 0.
pub fn extract_highlights(luminance: &Plane, threshold: u8) -> Plane {
    let threshold = threshold as f32;
    luminance.map(|l| if l > threshold { 255.0 } else { 0.0 })
}

/// Blend `params.tint` over `base` through the blurred highlight mask.
///
/// `result = base × (1 − α·m/255) + tint × (α·m/255)`; the base alpha is kept.
pub fn apply_glow(base: &RgbaImage, luminance: &Plane, params: &GlowParams) -> RgbaImage {
    debug_assert_eq!(base.dimensions(), (luminance.width(), luminance.height()));
    let mask = blur_plane(&extract_highlights(luminance, params.threshold), params.blur_radius);
    let strength = params.strength.clamp(0.0, 1.0);

    RgbaImage::from_fn(base.width(), base.height(), |x, y| {
        let p = base.get_pixel(x, y);
        let a = strength * mask.get(x, y).clamp(0.0, 255.0) / 255.0;
        let mix = |c: usize| to_u8(p[c] as f32 * (1.0 - a) + params.tint[c] as f32 * a);
        Rgba([mix(0), mix(1), mix(2), p[3]])
    })
}
