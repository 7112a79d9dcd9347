//! Pure crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Where the square crop box sits inside the source photograph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropAnchor {
    /// Centered on both axes.
    Center,
    /// Bottom-right corner pulled inward by `padding × min(width, height)`.
    BottomRight { padding: f64 },
    /// Centered horizontally, top edge at 30% of the vertical slack.
    TopBiased,
}

/// Fraction of the vertical slack placed above a [`CropAnchor::TopBiased`] box.
const TOP_BIAS: f64 = 0.3;

/// A square crop box in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub size: u32,
}

/// Calculate the square crop box for a source image.
///
/// The side is `zoom × min(width, height)` (truncated, at least one pixel),
/// so it never exceeds the short edge. Anchor candidates that fall outside
/// the source are clamped to the nearest valid origin; callers cannot tell a
/// clamped box from an unclamped one.
///
/// # Arguments
/// * `source` - Source dimensions (width, height), both non-zero
/// * `zoom` - Fraction of the short edge to keep, clamped to `(0, 1]`
/// * `anchor` - Placement heuristic
///
/// # Examples
/// ```
/// # use iconsmith::imaging::{calculate_crop_rect, CropAnchor, CropRect};
/// // 60% of a 1000px short edge, pulled 100px in from the bottom-right
/// let rect = calculate_crop_rect((2000, 1000), 0.6, CropAnchor::BottomRight { padding: 0.1 });
/// assert_eq!(rect, CropRect { left: 1300, top: 300, size: 600 });
/// ```
pub fn calculate_crop_rect(source: (u32, u32), zoom: f64, anchor: CropAnchor) -> CropRect {
    let (width, height) = source;
    let short_edge = width.min(height);
    let zoom = if zoom.is_finite() {
        zoom.clamp(f64::MIN_POSITIVE, 1.0)
    } else {
        1.0
    };
    let size = ((short_edge as f64 * zoom) as u32).clamp(1.min(short_edge), short_edge);

    let slack_x = (width - size) as f64;
    let slack_y = (height - size) as f64;

    let (left, top) = match anchor {
        CropAnchor::Center => (slack_x / 2.0, slack_y / 2.0),
        CropAnchor::TopBiased => (slack_x / 2.0, slack_y * TOP_BIAS),
        CropAnchor::BottomRight { padding } => {
            let pad = (short_edge as f64 * padding.max(0.0)).trunc();
            (slack_x - pad, slack_y - pad)
        }
    };

    CropRect {
        left: clamp_origin(left, width - size),
        top: clamp_origin(top, height - size),
        size,
    }
}

/// Truncate a candidate origin and clamp it into `[0, max]`.
fn clamp_origin(candidate: f64, max: u32) -> u32 {
    if candidate <= 0.0 {
        0
    } else {
        (candidate as u32).min(max)
    }
}

/// Side of a centered inset square, at least one pixel.
pub fn calculate_inset(canvas: u32, scale: f32) -> (u32, u32) {
    let inner = ((canvas as f32 * scale.clamp(0.0, 1.0)) as u32).clamp(1, canvas.max(1));
    (inner, (canvas - inner.min(canvas)) / 2)
}

/// Convert a canvas-relative fraction to pixels at `size`.
pub fn fraction_to_px(size: u32, fraction: f32) -> f32 {
    size as f32 * fraction
}
