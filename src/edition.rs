//! Icon editions: one pipeline, many looks.
//!
//! An [`Edition`] is a plain configuration value. Every visual variant (the
//! clean silver crop, the violet "soul" aura, the cyan-eyed close-up, the
//! HUD color variants, the photo-free eye mark) is a different value fed
//! through the same [`render_edition`] function:
//!
//! ```text
//! source ─▶ crop ─▶ resize ─▶ tone map ─▶ glow? ─▶ scanlines? ─▶ mask ─┐
//!                                                                      ▼
//! canvas ◀─ compositor ◀── [Disk | Subject | Ring | Line]* in order ◀──┘
//! ```
//!
//! An edition without a [`LayerSpec::Subject`] layer is drawn from shapes
//! alone and never touches the source.
//!
//! All geometry is stored as a fraction of the working size, so an edition
//! renders the same composition at 1024px or at 96px in a test.

use crate::imaging::{
    Bounds, ColorRamp, Compositor, CropAnchor, Enhancement, GlowParams, Layer, MaskPolicy,
    LineSpec, RingSpec, Sweep, apply_glow, apply_mask, apply_scanlines, calculate_crop_rect,
    calculate_inset, crop_and_resize, fraction_to_px, render_disk, render_line, render_ring_blurred,
    synthesize_mask, tone_map,
};
use image::{Rgba, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Source image is empty")]
    EmptySource,
    #[error("Edition '{edition}' draws the photo but no source image was given")]
    MissingSource { edition: String },
    #[error("Edition '{edition}' is invalid: {reason}")]
    InvalidEdition { edition: String, reason: String },
    #[error("Unknown edition '{name}'. Available: {}", .available.join(", "))]
    UnknownEdition {
        name: String,
        available: Vec<&'static str>,
    },
}

/// Express a pixel length drawn on a 1024px canvas as a canvas fraction.
pub const fn at_1024(px: f32) -> f32 {
    px / 1024.0
}

/// Express a pixel length drawn on a 512px canvas as a canvas fraction.
pub const fn at_512(px: f32) -> f32 {
    px / 512.0
}

/// Square crop heuristic applied to the source photograph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPolicy {
    /// Fraction of the short edge kept, `(0, 1]`.
    pub zoom: f64,
    pub anchor: CropAnchor,
}

/// Circular clip for the subject, geometry in canvas fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubjectMask {
    HardCircle { margin: f32 },
    RadialGradient { inner_fraction: f32 },
    BlurSoftened { margin: f32, blur: f32 },
}

impl SubjectMask {
    /// Resolve to a pixel-space [`MaskPolicy`] for a `size` subject.
    pub fn policy(&self, size: u32) -> MaskPolicy {
        match *self {
            Self::HardCircle { margin } => MaskPolicy::HardCircle {
                margin: fraction_to_px(size, margin).round() as u32,
            },
            Self::RadialGradient { inner_fraction } => {
                MaskPolicy::RadialGradient { inner_fraction }
            }
            Self::BlurSoftened { margin, blur } => MaskPolicy::BlurSoftened {
                margin: fraction_to_px(size, margin).round() as u32,
                blur_radius: fraction_to_px(size, blur),
            },
        }
    }
}

/// Horizontal line overlay on the colorized subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scanlines {
    /// Row spacing as a canvas fraction.
    pub spacing: f32,
    pub intensity: u8,
}

/// Glow settings with the blur expressed as a canvas fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub threshold: u8,
    pub blur: f32,
    pub tint: [u8; 3],
    pub strength: f32,
}

impl Glow {
    fn params(&self, size: u32) -> GlowParams {
        GlowParams {
            threshold: self.threshold,
            blur_radius: fraction_to_px(size, self.blur),
            tint: self.tint,
            strength: self.strength,
        }
    }
}

/// One entry in an edition's back-to-front layer stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerSpec {
    /// Filled circle: background auras (blurred) and solid backdrops.
    Disk {
        radius: f32,
        color: [u8; 4],
        blur: f32,
    },
    /// The masked, tone-mapped photograph.
    Subject,
    /// Stroked circle or arc. `blur > 0` renders a soft halo.
    Ring {
        radius: f32,
        stroke: f32,
        color: [u8; 4],
        blur: f32,
        sweep: Option<(f32, f32)>,
    },
    /// Straight stroke between two canvas points, flat at both ends.
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: [u8; 4],
    },
}

/// Full description of one visual edition.
#[derive(Debug, Clone, PartialEq)]
pub struct Edition {
    pub name: &'static str,
    pub summary: &'static str,
    pub working_size: u32,
    pub crop: CropPolicy,
    /// Subject side as a fraction of the canvas; the subject is centred.
    pub subject_scale: f32,
    /// Tone passes; `soften` is a canvas fraction like the other geometry.
    pub enhancement: Enhancement,
    pub ramp: ColorRamp,
    pub glow: Option<Glow>,
    pub scanlines: Option<Scanlines>,
    pub mask: SubjectMask,
    pub layers: Vec<LayerSpec>,
}

impl Edition {
    /// Same edition rendered at a different working size.
    pub fn with_working_size(mut self, size: u32) -> Self {
        self.working_size = size;
        self
    }

    /// Whether any layer draws the source photograph.
    pub fn needs_source(&self) -> bool {
        self.layers.contains(&LayerSpec::Subject)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        let invalid = |reason: &str| {
            Err(RenderError::InvalidEdition {
                edition: self.name.to_string(),
                reason: reason.to_string(),
            })
        };
        if self.working_size == 0 {
            return invalid("working size must be positive");
        }
        if !(self.crop.zoom > 0.0 && self.crop.zoom <= 1.0) {
            return invalid("crop zoom must be in (0, 1]");
        }
        if matches!(self.crop.anchor, CropAnchor::BottomRight { padding } if !(padding >= 0.0)) {
            return invalid("crop padding must be non-negative");
        }
        if !(self.subject_scale > 0.0 && self.subject_scale <= 1.0) {
            return invalid("subject scale must be in (0, 1]");
        }
        if self
            .glow
            .is_some_and(|glow| !(0.0..=1.0).contains(&glow.strength))
        {
            return invalid("glow strength must be in [0, 1]");
        }
        if self.layers.is_empty() {
            return invalid("layer stack is empty");
        }
        if self
            .layers
            .iter()
            .any(|layer| matches!(layer, LayerSpec::Line { width, .. } if !(*width > 0.0)))
        {
            return invalid("line width must be positive");
        }
        Ok(())
    }
}

fn clean_rim(blur: f32) -> LayerSpec {
    LayerSpec::Ring {
        radius: 0.5 - at_1024(20.0),
        stroke: 0.02,
        color: [255, 255, 255, 200],
        blur,
        sweep: None,
    }
}

fn clean() -> Edition {
    Edition {
        name: "clean",
        summary: "Silver duotone close-up with a single glowing white rim",
        working_size: 1024,
        crop: CropPolicy {
            zoom: 0.6,
            anchor: CropAnchor::BottomRight { padding: 0.1 },
        },
        subject_scale: 1.0,
        enhancement: Enhancement {
            brightness: 1.2,
            sharpness: 1.5,
            ..Enhancement::NEUTRAL
        },
        ramp: ColorRamp::new([20, 20, 25], [240, 240, 250]),
        glow: None,
        scanlines: None,
        mask: SubjectMask::BlurSoftened {
            margin: at_1024(20.0),
            blur: at_1024(3.0),
        },
        layers: vec![
            LayerSpec::Subject,
            clean_rim(at_1024(15.0)),
            clean_rim(0.0),
        ],
    }
}

fn soul() -> Edition {
    Edition {
        name: "soul",
        summary: "Dreamy violet duotone inside a blurred purple aura and a soft orbit ring",
        working_size: 1024,
        crop: CropPolicy {
            zoom: 0.8,
            anchor: CropAnchor::Center,
        },
        subject_scale: 0.95,
        enhancement: Enhancement {
            soften: at_1024(1.0),
            contrast: 1.2,
            ..Enhancement::NEUTRAL
        },
        ramp: ColorRamp::new([20, 0, 40], [220, 200, 255]),
        glow: None,
        scanlines: None,
        mask: SubjectMask::BlurSoftened {
            margin: 0.0,
            blur: at_1024(10.0),
        },
        layers: vec![
            LayerSpec::Disk {
                radius: 0.48,
                color: [180, 100, 255, 200],
                blur: at_1024(40.0),
            },
            LayerSpec::Subject,
            LayerSpec::Ring {
                radius: 0.45,
                stroke: 0.01,
                color: [255, 255, 255, 180],
                blur: at_1024(2.0),
                sweep: None,
            },
        ],
    }
}

fn soul_eye() -> Edition {
    Edition {
        name: "soul-eye",
        summary: "High-contrast starlight duotone, upper crop, cyan bloom on the brightest highlights",
        working_size: 1024,
        crop: CropPolicy {
            zoom: 0.75,
            anchor: CropAnchor::TopBiased,
        },
        subject_scale: 1.0,
        enhancement: Enhancement {
            contrast: 1.4,
            sharpness: 2.0,
            ..Enhancement::NEUTRAL
        },
        ramp: ColorRamp::new([10, 5, 25], [180, 230, 255]),
        glow: Some(Glow {
            threshold: 200,
            blur: at_1024(10.0),
            tint: [0, 255, 255],
            strength: 0.3,
        }),
        scanlines: None,
        mask: SubjectMask::BlurSoftened {
            margin: at_1024(20.0),
            blur: at_1024(5.0),
        },
        layers: vec![
            LayerSpec::Subject,
            LayerSpec::Ring {
                radius: 0.5 - at_1024(20.0),
                stroke: 0.02,
                color: [150, 100, 255, 180],
                blur: at_1024(3.0),
                sweep: None,
            },
        ],
    }
}

fn soul_bright() -> Edition {
    let rim_radius = 0.5 - at_1024(20.0);
    Edition {
        name: "soul-bright",
        summary: "Bright luminous duotone on a dark disk with a blue halo under a sharp rim",
        working_size: 1024,
        crop: CropPolicy {
            zoom: 0.6,
            anchor: CropAnchor::BottomRight { padding: 0.1 },
        },
        subject_scale: 1.0,
        enhancement: Enhancement {
            brightness: 1.4,
            contrast: 1.2,
            ..Enhancement::NEUTRAL
        },
        ramp: ColorRamp::new([30, 20, 60], [230, 245, 255]),
        glow: Some(Glow {
            threshold: 210,
            blur: at_1024(3.0),
            tint: [150, 200, 255],
            strength: 0.5,
        }),
        scanlines: None,
        mask: SubjectMask::HardCircle {
            margin: at_1024(20.0),
        },
        layers: vec![
            LayerSpec::Disk {
                radius: rim_radius,
                color: [20, 10, 40, 255],
                blur: 0.0,
            },
            LayerSpec::Subject,
            LayerSpec::Ring {
                radius: rim_radius,
                stroke: 0.04,
                color: [100, 200, 255, 150],
                blur: at_1024(10.0),
                sweep: None,
            },
            LayerSpec::Ring {
                radius: rim_radius,
                stroke: 0.015,
                color: [200, 230, 255, 255],
                blur: 0.0,
                sweep: None,
            },
        ],
    }
}

/// HUD-style color variant: scanlined duotone, gradient-faded subject,
/// solid rim and two accent arcs.
fn variant(name: &'static str, primary: [u8; 3], accent: [u8; 3]) -> Edition {
    let [pr, pg, pb] = primary;
    let [ar, ag, ab] = accent;
    let rim_width = 0.03;
    Edition {
        name,
        summary: "HUD color variant with scanlines, faded edges and accent arcs",
        working_size: 512,
        crop: CropPolicy {
            zoom: 1.0,
            anchor: CropAnchor::Center,
        },
        subject_scale: 0.9,
        enhancement: Enhancement {
            contrast: 1.8,
            ..Enhancement::NEUTRAL
        },
        ramp: ColorRamp::new([5, 5, 10], primary),
        glow: None,
        scanlines: Some(Scanlines {
            spacing: at_512(6.0),
            intensity: 80,
        }),
        mask: SubjectMask::RadialGradient {
            inner_fraction: 0.7,
        },
        layers: vec![
            LayerSpec::Disk {
                radius: 0.48,
                color: [ar, ag, ab, 60],
                blur: at_512(20.0),
            },
            LayerSpec::Subject,
            LayerSpec::Ring {
                radius: 0.48,
                stroke: rim_width,
                color: [pr, pg, pb, 255],
                blur: 0.0,
                sweep: None,
            },
            LayerSpec::Ring {
                radius: 0.48 + at_512(15.0),
                stroke: rim_width / 2.0,
                color: [ar, ag, ab, 255],
                blur: 0.0,
                sweep: Some((180.0, 270.0)),
            },
            LayerSpec::Ring {
                radius: 0.48 + at_512(15.0),
                stroke: rim_width / 2.0,
                color: [ar, ag, ab, 255],
                blur: 0.0,
                sweep: Some((0.0, 90.0)),
            },
        ],
    }
}

/// The procedural eye mark: blue disk, white ring and pupil, four crosshair
/// strokes between the ring and the disk edge. Draws no photograph.
fn eye() -> Edition {
    const WHITE: [u8; 4] = [255, 255, 255, 255];
    let radius = 0.45;
    let ring = radius * 0.7;
    let reach = radius * 0.8;
    let hair = |from: (f32, f32), to: (f32, f32)| LayerSpec::Line {
        from: (0.5 + from.0, 0.5 + from.1),
        to: (0.5 + to.0, 0.5 + to.1),
        width: 0.04,
        color: WHITE,
    };
    Edition {
        name: "eye",
        summary: "Procedural blue eye with a white ring, pupil and crosshair, no photo needed",
        working_size: 1024,
        crop: CropPolicy {
            zoom: 1.0,
            anchor: CropAnchor::Center,
        },
        subject_scale: 1.0,
        enhancement: Enhancement::NEUTRAL,
        ramp: ColorRamp::new([0, 0, 0], [255, 255, 255]),
        glow: None,
        scanlines: None,
        mask: SubjectMask::HardCircle { margin: 0.0 },
        layers: vec![
            LayerSpec::Disk {
                radius,
                color: [0, 122, 255, 255],
                blur: 0.0,
            },
            LayerSpec::Ring {
                radius: ring,
                stroke: 0.05,
                color: WHITE,
                blur: 0.0,
                sweep: None,
            },
            LayerSpec::Disk {
                radius: radius * 0.3,
                color: WHITE,
                blur: 0.0,
            },
            hair((0.0, -reach), (0.0, -ring)),
            hair((0.0, ring), (0.0, reach)),
            hair((-reach, 0.0), (-ring, 0.0)),
            hair((ring, 0.0), (reach, 0.0)),
        ],
    }
}

/// Names of the color variants, in sheet order.
pub const VARIANT_COLORS: [&str; 4] = ["purple", "red", "gold", "teal"];

fn variant_by_color(color: &str) -> Option<Edition> {
    Some(match color {
        "purple" => variant("variant-purple", [180, 0, 255], [200, 100, 255]),
        "red" => variant("variant-red", [255, 20, 20], [255, 100, 100]),
        "gold" => variant("variant-gold", [255, 160, 0], [255, 220, 100]),
        "teal" => variant("variant-teal", [0, 255, 180], [100, 255, 220]),
        _ => return None,
    })
}

/// Every built-in edition name.
pub const EDITION_NAMES: [&str; 9] = [
    "clean",
    "soul",
    "soul-eye",
    "soul-bright",
    "variant-purple",
    "variant-red",
    "variant-gold",
    "variant-teal",
    "eye",
];

/// Look up a built-in edition by name.
pub fn named(name: &str) -> Result<Edition, RenderError> {
    let edition = match name {
        "clean" => Some(clean()),
        "soul" => Some(soul()),
        "soul-eye" => Some(soul_eye()),
        "soul-bright" => Some(soul_bright()),
        "eye" => Some(eye()),
        other => other.strip_prefix("variant-").and_then(variant_by_color),
    };
    edition.ok_or_else(|| RenderError::UnknownEdition {
        name: name.to_string(),
        available: EDITION_NAMES.to_vec(),
    })
}

/// All built-in editions in catalogue order.
pub fn catalogue() -> Vec<Edition> {
    EDITION_NAMES
        .iter()
        .filter_map(|name| named(name).ok())
        .collect()
}

/// The masked, tone-mapped subject at its inset size.
fn render_subject(edition: &Edition, source: &RgbaImage, inner: u32) -> RgbaImage {
    let rect = calculate_crop_rect(source.dimensions(), edition.crop.zoom, edition.crop.anchor);
    let working = crop_and_resize(source, rect, inner);

    let enhancement = Enhancement {
        soften: fraction_to_px(inner, edition.enhancement.soften),
        ..edition.enhancement
    };
    let toned = tone_map(&working, &enhancement, &edition.ramp);
    let mut subject = match &edition.glow {
        Some(glow) => apply_glow(&toned.colored, &toned.luminance, &glow.params(inner)),
        None => toned.colored,
    };
    if let Some(lines) = &edition.scanlines {
        let spacing = fraction_to_px(edition.working_size, lines.spacing).round().max(1.0) as u32;
        subject = apply_scanlines(&subject, spacing, lines.intensity);
    }

    let mask = synthesize_mask(inner, edition.mask.policy(inner));
    apply_mask(&subject, &mask)
}

/// Render `edition`, drawing the subject from `source` where the stack has one.
///
/// Returns the final `working_size × working_size` straight-alpha canvas.
/// Editions without a subject layer ignore `source`.
pub fn render_edition(
    edition: &Edition,
    source: Option<&RgbaImage>,
) -> Result<RgbaImage, RenderError> {
    edition.validate()?;
    let source = if edition.needs_source() {
        match source {
            None => {
                return Err(RenderError::MissingSource {
                    edition: edition.name.to_string(),
                });
            }
            Some(image) if image.width() == 0 || image.height() == 0 => {
                return Err(RenderError::EmptySource);
            }
            Some(image) => Some(image),
        }
    } else {
        None
    };

    let mut compositor = Compositor::new(edition.working_size);
    let size = compositor.size();
    let (inner, offset) = calculate_inset(size, edition.subject_scale);
    let point = |(x, y): (f32, f32)| (fraction_to_px(size, x), fraction_to_px(size, y));

    for spec in &edition.layers {
        let layer = match *spec {
            LayerSpec::Subject => {
                // needs_source() guarantees the image for a subject layer
                let Some(image) = source else { continue };
                let subject = render_subject(edition, image, inner);
                Layer::at(subject, offset as i64, offset as i64)
            }
            LayerSpec::Disk {
                radius,
                color,
                blur,
            } => Layer::full(render_disk(
                size,
                Bounds::centered(size, radius),
                Rgba(color),
                fraction_to_px(size, blur),
            )),
            LayerSpec::Ring {
                radius,
                stroke,
                color,
                blur,
                sweep,
            } => {
                let ring = RingSpec {
                    bounds: Bounds::centered(size, radius),
                    stroke: fraction_to_px(size, stroke),
                    color: Rgba(color),
                    sweep: sweep.map(|(start, end)| Sweep { start, end }),
                };
                Layer::full(render_ring_blurred(size, &ring, fraction_to_px(size, blur)))
            }
            LayerSpec::Line {
                from,
                to,
                width,
                color,
            } => Layer::full(render_line(
                size,
                &LineSpec {
                    from: point(from),
                    to: point(to),
                    width: fraction_to_px(size, width),
                    color: Rgba(color),
                },
            )),
        };
        compositor.push(layer);
    }

    Ok(compositor.composite())
}
