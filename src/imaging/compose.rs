//! Layer compositing with the straight-alpha "over" operator.
//!
//! Layers are stacked back to front onto a fully transparent canvas. The
//! order is part of the look: a blurred halo under a sharp rim reads as a
//! glow, the same two layers swapped read as a smudge.

use super::plane::to_u8;
use image::{Rgba, RgbaImage};

/// Composite `src` over `dst`, both straight alpha.
///
/// With alphas normalized to `[0, 1]`:
/// `out.a = src.a + dst.a × (1 − src.a)` and
/// `out.rgb = (src.rgb × src.a + dst.rgb × dst.a × (1 − src.a)) / out.a`.
/// The division brings the premultiplied sum back to straight alpha.
pub fn over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel =
        |c: usize| to_u8((src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a);
    Rgba([channel(0), channel(1), channel(2), to_u8(out_a * 255.0)])
}

/// An image placed on the canvas at a pixel offset.
#[derive(Debug, Clone)]
pub struct Layer {
    pub image: RgbaImage,
    pub offset: (i64, i64),
}

impl Layer {
    /// A layer covering the canvas from its top-left corner.
    pub fn full(image: RgbaImage) -> Self {
        Self {
            image,
            offset: (0, 0),
        }
    }

    pub fn at(image: RgbaImage, x: i64, y: i64) -> Self {
        Self {
            image,
            offset: (x, y),
        }
    }
}

/// Ordered stack of layers for one square canvas.
///
/// ```
/// # use iconsmith::imaging::{Compositor, Layer};
/// # use image::{Rgba, RgbaImage};
/// let canvas = Compositor::new(4)
///     .with_layer(Layer::full(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))))
///     .with_layer(Layer::at(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])), 1, 1))
///     .composite();
/// assert_eq!(canvas.get_pixel(0, 0).0, [255, 0, 0, 255]);
/// assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 255, 255]);
/// ```
#[derive(Debug, Clone)]
pub struct Compositor {
    size: u32,
    layers: Vec<Layer>,
}

impl Compositor {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            layers: Vec::new(),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.push(layer);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Flatten the stack, first pushed at the bottom.
    pub fn composite(self) -> RgbaImage {
        let mut canvas = RgbaImage::new(self.size, self.size);
        for layer in &self.layers {
            composite_onto(&mut canvas, layer);
        }
        canvas
    }
}

/// Composite one layer onto `canvas`, clipping anything off-canvas.
pub fn composite_onto(canvas: &mut RgbaImage, layer: &Layer) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let (ox, oy) = layer.offset;
    for (x, y, src) in layer.image.enumerate_pixels() {
        let (tx, ty) = (ox + x as i64, oy + y as i64);
        if tx < 0 || ty < 0 || tx >= cw || ty >= ch || src[3] == 0 {
            continue;
        }
        let dst = canvas.get_pixel_mut(tx as u32, ty as u32);
        *dst = over(*dst, *src);
    }
}

/// Darken every `spacing`-th row, starting at the top, with black at
/// `intensity` alpha.
pub fn apply_scanlines(image: &RgbaImage, spacing: u32, intensity: u8) -> RgbaImage {
    let mut out = image.clone();
    if spacing == 0 || intensity == 0 {
        return out;
    }
    let line = Rgba([0, 0, 0, intensity]);
    for (_, y, pixel) in out.enumerate_pixels_mut() {
        if y % spacing == 0 {
            *pixel = over(*pixel, line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_HALF: Rgba<u8> = Rgba([255, 0, 0, 128]);
    const BLUE_HALF: Rgba<u8> = Rgba([0, 0, 255, 128]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn solid(size: u32, color: Rgba<u8>) -> Layer {
        Layer::full(RgbaImage::from_pixel(size, size, color))
    }

    fn stack(size: u32, colors: &[Rgba<u8>]) -> RgbaImage {
        colors
            .iter()
            .fold(Compositor::new(size), |c, &color| c.with_layer(solid(size, color)))
            .composite()
    }

    // =========================================================================
    // over
    // =========================================================================

    #[test]
    fn over_opaque_source_wins() {
        assert_eq!(over(Rgba([1, 2, 3, 255]), GREEN), GREEN);
    }

    #[test]
    fn over_transparent_source_is_noop() {
        let dst = Rgba([10, 20, 30, 77]);
        assert_eq!(over(dst, CLEAR), dst);
    }

    #[test]
    fn over_onto_transparent_keeps_source() {
        assert_eq!(over(CLEAR, RED_HALF), RED_HALF);
    }

    #[test]
    fn over_half_on_half() {
        let out = over(RED_HALF, BLUE_HALF);
        // a = 0.502 + 0.502 × 0.498 ≈ 0.752
        assert_eq!(out[3], 192);
        assert!(out[2] > out[0], "blue on top dominates: {out:?}");
        assert_eq!(out[1], 0);
    }

    // =========================================================================
    // Compositor
    // =========================================================================

    #[test]
    fn empty_compositor_is_transparent() {
        let compositor = Compositor::new(8);
        assert!(compositor.is_empty());
        assert_eq!(compositor.size(), 8);
        let canvas = compositor.composite();
        assert_eq!(canvas.dimensions(), (8, 8));
        assert!(canvas.pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn swapping_translucent_layers_changes_output() {
        let a = stack(4, &[RED_HALF, BLUE_HALF]);
        let b = stack(4, &[BLUE_HALF, RED_HALF]);
        assert_ne!(a, b);
    }

    #[test]
    fn order_is_irrelevant_for_opaque_and_clear_layers() {
        let a = stack(4, &[GREEN, CLEAR]);
        let b = stack(4, &[CLEAR, GREEN]);
        assert_eq!(a, b);

        // Three-way regrouping of binary-alpha layers
        let left = stack(4, &[RED_HALF, GREEN, CLEAR]);
        let right = stack(4, &[RED_HALF, CLEAR, GREEN]);
        assert_eq!(left, right);
    }

    #[test]
    fn opaque_top_layer_hides_everything_below() {
        let canvas = stack(3, &[RED_HALF, BLUE_HALF, GREEN]);
        assert!(canvas.pixels().all(|p| *p == GREEN));
    }

    #[test]
    fn offset_layer_is_clipped_to_canvas() {
        let canvas = Compositor::new(4)
            .with_layer(Layer::at(RgbaImage::from_pixel(3, 3, GREEN), 2, -1))
            .composite();
        assert_eq!(*canvas.get_pixel(3, 0), GREEN);
        assert_eq!(*canvas.get_pixel(3, 1), GREEN);
        assert_eq!(*canvas.get_pixel(2, 2), CLEAR);
        assert_eq!(*canvas.get_pixel(1, 0), CLEAR);
    }

    #[test]
    fn blurred_halo_under_sharp_rim_differs_from_reverse() {
        use crate::imaging::ring::{Bounds, RingSpec, render_ring, render_ring_blurred};
        let halo_spec = RingSpec {
            bounds: Bounds::centered(48, 0.45),
            stroke: 4.0,
            color: Rgba([100, 200, 255, 150]),
            sweep: None,
        };
        let rim_spec = RingSpec {
            stroke: 2.0,
            color: Rgba([200, 230, 255, 255]),
            ..halo_spec
        };
        let halo = render_ring_blurred(48, &halo_spec, 3.0);
        let rim = render_ring(48, &rim_spec);
        let glow_first = Compositor::new(48)
            .with_layer(Layer::full(halo.clone()))
            .with_layer(Layer::full(rim.clone()))
            .composite();
        let rim_first = Compositor::new(48)
            .with_layer(Layer::full(rim))
            .with_layer(Layer::full(halo))
            .composite();
        assert_eq!(glow_first.dimensions(), rim_first.dimensions());
        assert_ne!(glow_first, rim_first);
    }

    // =========================================================================
    // Scanlines
    // =========================================================================

    #[test]
    fn scanlines_darken_every_nth_row() {
        let image = RgbaImage::from_pixel(4, 12, Rgba([200, 200, 200, 255]));
        let out = apply_scanlines(&image, 6, 80);
        assert!(out.get_pixel(0, 0)[0] < 200);
        assert!(out.get_pixel(0, 6)[0] < 200);
        assert_eq!(out.get_pixel(0, 1)[0], 200);
        assert_eq!(out.get_pixel(0, 11)[0], 200);
        assert_eq!(out.get_pixel(0, 6)[3], 255);
    }

    #[test]
    fn zero_spacing_leaves_image_untouched() {
        let image = RgbaImage::from_pixel(2, 2, RED_HALF);
        assert_eq!(apply_scanlines(&image, 0, 80), image);
    }
}
