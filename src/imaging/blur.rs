//! Separable Gaussian blur.
//!
//! The radius passed around the pipeline is the Gaussian's standard
//! deviation in pixels. The kernel extends to three sigmas and is sampled
//! with clamp-to-edge addressing. Each pass runs rows (or columns) in
//! parallel with rayon.
//!
//! RGBA buffers are blurred in premultiplied space and converted back to
//! straight alpha, so transparent pixels never bleed black into a halo.
//! `image::imageops::blur` filters straight-alpha channels independently and
//! cannot give that guarantee.

use super::plane::{Plane, to_u8};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Normalized 1-D Gaussian weights for `sigma`, centre at index `len / 2`.
///
/// Returns a single unit weight when `sigma` is not positive.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if sigma.is_nan() || sigma <= 0.0 {
        return vec![1.0];
    }
    let reach = (sigma * 3.0).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let mut weights: Vec<f32> = (-reach..=reach)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Blur a plane with a Gaussian of standard deviation `sigma`.
pub fn blur_plane(plane: &Plane, sigma: f32) -> Plane {
    let kernel = gaussian_kernel(sigma);
    if kernel.len() == 1 || plane.data().is_empty() {
        return plane.clone();
    }
    let horizontal = pass(plane, &kernel, Axis::Horizontal);
    pass(&horizontal, &kernel, Axis::Vertical)
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn pass(src: &Plane, kernel: &[f32], axis: Axis) -> Plane {
    let (width, height) = (src.width(), src.height());
    let reach = (kernel.len() / 2) as i64;
    let mut out = Plane::filled(width, height, 0.0);

    out.data_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for (x, value) in row.iter_mut().enumerate() {
                let x = x as i64;
                let mut acc = 0.0;
                for (k, &w) in kernel.iter().enumerate() {
                    let offset = k as i64 - reach;
                    acc += w * match axis {
                        Axis::Horizontal => src.get_clamped(x + offset, y),
                        Axis::Vertical => src.get_clamped(x, y + offset),
                    };
                }
                *value = acc;
            }
        });
    out
}

/// Blur a straight-alpha RGBA buffer.
pub fn blur_rgba(image: &RgbaImage, sigma: f32) -> RgbaImage {
    if gaussian_kernel(sigma).len() == 1 {
        return image.clone();
    }
    let (width, height) = image.dimensions();
    let alpha = Plane::from_fn(width, height, |x, y| image.get_pixel(x, y)[3] as f32);
    let premultiplied: Vec<Plane> = (0..3)
        .map(|c| {
            Plane::from_fn(width, height, |x, y| {
                let p = image.get_pixel(x, y);
                p[c] as f32 * p[3] as f32 / 255.0
            })
        })
        .collect();

    let alpha = blur_plane(&alpha, sigma);
    let channels: Vec<Plane> = premultiplied
        .iter()
        .map(|plane| blur_plane(plane, sigma))
        .collect();

    RgbaImage::from_fn(width, height, |x, y| {
        let a = alpha.get(x, y);
        if a <= f32::EPSILON {
            return Rgba([0, 0, 0, 0]);
        }
        let unmultiply = |c: usize| to_u8(channels[c].get(x, y) * 255.0 / a);
        Rgba([unmultiply(0), unmultiply(1), unmultiply(2), to_u8(a)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(2.0);
        assert_eq!(kernel.len(), 13);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-7);
            assert!(kernel[i] < kernel[i + 1], "weights rise toward the centre");
        }
    }

    #[test]
    fn zero_sigma_is_identity() {
        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
        assert_eq!(gaussian_kernel(-1.0), vec![1.0]);
        let plane = Plane::from_fn(5, 5, |x, y| (x * y) as f32);
        assert_eq!(blur_plane(&plane, 0.0), plane);
    }

    #[test]
    fn constant_plane_is_unchanged() {
        let plane = Plane::filled(12, 9, 200.0);
        let blurred = blur_plane(&plane, 3.0);
        for &v in blurred.data() {
            assert!((v - 200.0).abs() < 1e-3);
        }
    }

    #[test]
    fn impulse_spreads_as_weighted_average() {
        // Not a box blur: neighbours closer to the impulse get more weight
        let plane = Plane::from_fn(21, 21, |x, y| if x == 10 && y == 10 { 255.0 } else { 0.0 });
        let blurred = blur_plane(&plane, 2.0);
        let centre = blurred.get(10, 10);
        let near = blurred.get(11, 10);
        let far = blurred.get(13, 10);
        assert!(centre > near && near > far && far > 0.0);
        assert!((blurred.get(10, 12) - blurred.get(12, 10)).abs() < 1e-4);
        let total: f32 = blurred.data().iter().sum();
        assert!((total - 255.0).abs() < 0.01);
    }

    #[test]
    fn rgba_blur_does_not_darken_soft_edges() {
        // Opaque white square on a transparent background
        let image = RgbaImage::from_fn(20, 20, |x, y| {
            if (5..15).contains(&x) && (5..15).contains(&y) {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let blurred = blur_rgba(&image, 2.0);
        let edge = blurred.get_pixel(4, 10);
        assert!(edge[3] > 0 && edge[3] < 255);
        assert_eq!(&edge.0[..3], &[255, 255, 255]);
    }

    #[test]
    fn rgba_blur_keeps_fully_transparent_far_pixels() {
        let image = RgbaImage::from_fn(40, 40, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let blurred = blur_rgba(&image, 1.0);
        assert_eq!(blurred.get_pixel(39, 20).0, [0, 0, 0, 0]);
    }
}
