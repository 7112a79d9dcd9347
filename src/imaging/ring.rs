//! Anti-aliased ellipse outlines, arcs, filled disks and straight strokes.
//!
//! Shapes are described by a bounding box, the way a drawing API would take
//! them. Strokes grow inward from the box edge. Coverage is estimated with a
//! 4×4 grid of samples per pixel and multiplied into the color's alpha.

use super::blur::blur_rgba;
use super::plane::to_u8;
use image::{Rgba, RgbaImage};

/// Samples per pixel along each axis.
const SUPERSAMPLE: u32 = 4;

/// Axis-aligned bounding box in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    /// Square box centred on a `size` canvas with the given radius fraction.
    pub fn centered(size: u32, radius_fraction: f32) -> Self {
        let centre = size as f32 / 2.0;
        let radius = size as f32 * radius_fraction;
        Self {
            left: centre - radius,
            top: centre - radius,
            right: centre + radius,
            bottom: centre + radius,
        }
    }

    fn center(&self) -> (f32, f32) {
        ((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    fn radii(&self) -> (f32, f32) {
        ((self.right - self.left) / 2.0, (self.bottom - self.top) / 2.0)
    }
}

/// An angular range in degrees, clockwise from 3 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: f32,
    pub end: f32,
}

impl Sweep {
    fn contains(&self, degrees: f32) -> bool {
        let span = (self.end - self.start).rem_euclid(360.0);
        if self.end - self.start >= 360.0 {
            return true;
        }
        (degrees - self.start).rem_euclid(360.0) <= span
    }
}

/// A stroked ellipse (or arc of one).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSpec {
    pub bounds: Bounds,
    /// Stroke width in pixels, measured inward from `bounds`.
    pub stroke: f32,
    pub color: Rgba<u8>,
    /// `None` draws the full ellipse.
    pub sweep: Option<Sweep>,
}

fn inside_ellipse(px: f32, py: f32, (cx, cy): (f32, f32), (rx, ry): (f32, f32)) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let nx = (px - cx) / rx;
    let ny = (py - cy) / ry;
    nx * nx + ny * ny <= 1.0
}

/// Rasterize with `covers(sample_x, sample_y)` deciding each sample.
fn rasterize(size: u32, color: Rgba<u8>, covers: impl Fn(f32, f32) -> bool) -> RgbaImage {
    let step = 1.0 / SUPERSAMPLE as f32;
    let total = (SUPERSAMPLE * SUPERSAMPLE) as f32;
    RgbaImage::from_fn(size, size, |x, y| {
        let mut hits = 0u32;
        for sy in 0..SUPERSAMPLE {
            for sx in 0..SUPERSAMPLE {
                let px = x as f32 + (sx as f32 + 0.5) * step;
                let py = y as f32 + (sy as f32 + 0.5) * step;
                if covers(px, py) {
                    hits += 1;
                }
            }
        }
        if hits == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let coverage = hits as f32 / total;
        Rgba([
            color[0],
            color[1],
            color[2],
            to_u8(color[3] as f32 * coverage),
        ])
    })
}

/// Draw the outline described by `spec` on a transparent `size × size` layer.
pub fn render_ring(size: u32, spec: &RingSpec) -> RgbaImage {
    let centre = spec.bounds.center();
    let (rx, ry) = spec.bounds.radii();
    let stroke = spec.stroke.max(1.0);
    let inner = (rx - stroke, ry - stroke);

    rasterize(size, spec.color, |px, py| {
        if !inside_ellipse(px, py, centre, (rx, ry)) || inside_ellipse(px, py, centre, inner) {
            return false;
        }
        match spec.sweep {
            None => true,
            Some(sweep) => {
                let angle = (py - centre.1).atan2(px - centre.0).to_degrees();
                sweep.contains(angle)
            }
        }
    })
}

/// Draw `spec`, then blur it when `blur` is positive.
pub fn render_ring_blurred(size: u32, spec: &RingSpec, blur: f32) -> RgbaImage {
    let layer = render_ring(size, spec);
    if blur > 0.0 { blur_rgba(&layer, blur) } else { layer }
}

/// Fill the ellipse inside `bounds` on a transparent layer, optionally blurred.
pub fn render_disk(size: u32, bounds: Bounds, color: Rgba<u8>, blur: f32) -> RgbaImage {
    let centre = bounds.center();
    let radii = bounds.radii();
    let layer = rasterize(size, color, |px, py| inside_ellipse(px, py, centre, radii));
    if blur > 0.0 { blur_rgba(&layer, blur) } else { layer }
}

/// A straight stroke between two points in canvas pixels, flat at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpec {
    pub from: (f32, f32),
    pub to: (f32, f32),
    /// Full stroke width in pixels, at least 1.
    pub width: f32,
    pub color: Rgba<u8>,
}

/// Draw the segment described by `spec` on a transparent layer.
///
/// A sample is covered when its projection falls between the end points and it
/// lies within half the width of the segment. Zero-length lines draw nothing.
pub fn render_line(size: u32, spec: &LineSpec) -> RgbaImage {
    let (x0, y0) = spec.from;
    let (dx, dy) = (spec.to.0 - x0, spec.to.1 - y0);
    let length_sq = dx * dx + dy * dy;
    let half = spec.width.max(1.0) / 2.0;

    rasterize(size, spec.color, |px, py| {
        if length_sq <= 0.0 {
            return false;
        }
        let t = ((px - x0) * dx + (py - y0) * dy) / length_sq;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        let (ex, ey) = (px - (x0 + t * dx), py - (y0 + t * dy));
        ex * ex + ey * ey <= half * half
    })
}
