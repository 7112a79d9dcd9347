//! Tone mapping: luminance, enhancement and the two-point color ramp.
//!
//! ```text
//! RGBA ──luminance──▶ Plane ──soften──▶ brightness ──▶ contrast ──▶ sharpness ──▶ ColorRamp ──▶ opaque RGBA
//! ```
//!
//! Every pass works on unrounded `f32` values; rounding happens once, when
//! the ramp writes the output bytes. A pass with factor `1.0` is skipped, so
//! the neutral [`Enhancement`] reproduces its input exactly.

use super::blur::blur_plane;
use super::plane::{Plane, to_u8};
use image::{Rgba, RgbaImage};

/// ITU-R 601-2 luma weights.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Pivot the contrast pass scales deviations around.
const CONTRAST_PIVOT: f32 = 128.0;

/// 3×3 smoothing kernel used as the "blurred" reference for sharpening.
const SMOOTH_KERNEL: [[f32; 3]; 3] = [[1.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 1.0]];
const SMOOTH_WEIGHT: f32 = 13.0;

/// Reduce an RGBA buffer to perceptual luminance. Alpha is ignored.
pub fn luminance(image: &RgbaImage) -> Plane {
    Plane::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        LUMA_WEIGHTS[0] * p[0] as f32 + LUMA_WEIGHTS[1] * p[1] as f32 + LUMA_WEIGHTS[2] * p[2] as f32
    })
}

/// Enhancement factors. `1.0` leaves a pass out; values below zero are
/// treated as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enhancement {
    /// Gaussian sigma (pixels) applied before the factor passes. `0.0` = off.
    pub soften: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub sharpness: f32,
}

impl Enhancement {
    pub const NEUTRAL: Self = Self {
        soften: 0.0,
        brightness: 1.0,
        contrast: 1.0,
        sharpness: 1.0,
    };

    /// Run every configured pass in order: soften, brightness, contrast, sharpness.
    pub fn apply(&self, plane: &Plane) -> Plane {
        let mut out = if self.soften > 0.0 {
            blur_plane(plane, self.soften)
        } else {
            plane.clone()
        };
        if self.brightness != 1.0 {
            out = brighten(&out, self.brightness.max(0.0));
        }
        if self.contrast != 1.0 {
            out = contrast(&out, self.contrast.max(0.0));
        }
        if self.sharpness != 1.0 {
            out = sharpen(&out, self.sharpness.max(0.0));
        }
        out
    }
}

impl Default for Enhancement {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn clamp_channel(v: f32) -> f32 {
    v.clamp(0.0, 255.0)
}

/// Per-pixel multiply.
pub fn brighten(plane: &Plane, factor: f32) -> Plane {
    plane.map(|v| clamp_channel(v * factor))
}

/// Scale each value's deviation from mid-gray.
pub fn contrast(plane: &Plane, factor: f32) -> Plane {
    plane.map(|v| clamp_channel(CONTRAST_PIVOT + (v - CONTRAST_PIVOT) * factor))
}

/// Extrapolate away from a 3×3 smoothed copy: `smooth + factor × (v − smooth)`.
///
/// Factor 0 returns the smoothed image, 1 the original, above 1 boosts local
/// contrast. Edge pixels sample clamped neighbours.
pub fn sharpen(plane: &Plane, factor: f32) -> Plane {
    Plane::from_fn(plane.width(), plane.height(), |x, y| {
        let mut smooth = 0.0;
        for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
            for (kx, &w) in row.iter().enumerate() {
                smooth += w * plane.get_clamped(x as i64 + kx as i64 - 1, y as i64 + ky as i64 - 1);
            }
        }
        let smooth = smooth / SMOOTH_WEIGHT;
        let v = plane.get(x, y);
        clamp_channel(smooth + factor * (v - smooth))
    })
}

/// Two-point color ramp: black-point → white-point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRamp {
    pub black: [u8; 3],
    pub white: [u8; 3],
}

impl ColorRamp {
    pub const GRAYSCALE: Self = Self {
        black: [0, 0, 0],
        white: [255, 255, 255],
    };

    pub const fn new(black: [u8; 3], white: [u8; 3]) -> Self {
        Self { black, white }
    }

    /// Interpolated color for luminance `l` (0–255), unrounded.
    pub fn color_at(&self, l: f32) -> [f32; 3] {
        let t = clamp_channel(l) / 255.0;
        std::array::from_fn(|c| {
            let black = self.black[c] as f32;
            black + (self.white[c] as f32 - black) * t
        })
    }

    /// Colorize a luminance plane into a fully opaque RGBA buffer.
    pub fn apply(&self, plane: &Plane) -> RgbaImage {
        RgbaImage::from_fn(plane.width(), plane.height(), |x, y| {
            let [r, g, b] = self.color_at(plane.get(x, y));
            Rgba([to_u8(r), to_u8(g), to_u8(b), 255])
        })
    }
}

/// Output of the tone stage.
pub struct ToneMapped {
    /// Enhanced luminance before the ramp; the glow stage thresholds this.
    pub luminance: Plane,
    /// Opaque colorized image.
    pub colored: RgbaImage,
}

/// Luminance → enhancement → ramp.
pub fn tone_map(image: &RgbaImage, enhancement: &Enhancement, ramp: &ColorRamp) -> ToneMapped {
    let luminance = enhancement.apply(&luminance(image));
    let colored = ramp.apply(&luminance);
    ToneMapped { luminance, colored }
}
