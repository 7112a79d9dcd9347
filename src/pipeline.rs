//! End-to-end runs: load a source, render, export.
//!
//! Each public entry point has a `*_with_backend` twin so tests can drive the
//! whole flow against the mock backend.
//!
//! Failures before export (unreadable source, invalid edition) abort the run
//! with a [`PipelineError`]. Failures during export are per target and live in
//! the returned [`ExportReport`].

use crate::edition::{self, Edition, RenderError, VARIANT_COLORS, render_edition};
use crate::export::{ExportEvent, ExportManifest, ExportReport, ExportTarget, export};
use crate::imaging::{
    BackendError, CropAnchor, ImageBackend, RustBackend, calculate_crop_rect, crop_and_resize,
};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cannot read source image {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// Decode the source photograph into RGBA.
pub fn load_source(backend: &impl ImageBackend, path: &Path) -> Result<RgbaImage, PipelineError> {
    backend
        .load(path)
        .map_err(|source| PipelineError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })
}

/// Render `edition` from `source` and export it to every target in `manifest`.
///
/// `source` may be `None` for editions drawn from shapes alone.
pub fn render(
    edition: &Edition,
    source: Option<&Path>,
    manifest: &ExportManifest,
    events: Option<Sender<ExportEvent>>,
) -> Result<ExportReport, PipelineError> {
    render_with_backend(&RustBackend::new(), edition, source, manifest, events)
}

/// Render and export using a specific backend (allows testing with mock).
pub fn render_with_backend(
    backend: &impl ImageBackend,
    edition: &Edition,
    source: Option<&Path>,
    manifest: &ExportManifest,
    events: Option<Sender<ExportEvent>>,
) -> Result<ExportReport, PipelineError> {
    edition.validate()?;
    let image = match source {
        Some(path) if edition.needs_source() => Some(load_source(backend, path)?),
        _ => None,
    };
    let canvas = render_edition(edition, image.as_ref())?;
    Ok(export(&canvas, manifest, backend, edition.name, events))
}

/// Re-export an existing master logo through `manifest` without rendering.
///
/// A non-square master is center-cropped to its short edge first.
pub fn propagate(
    master: &Path,
    manifest: &ExportManifest,
    events: Option<Sender<ExportEvent>>,
) -> Result<ExportReport, PipelineError> {
    propagate_with_backend(&RustBackend::new(), master, manifest, events)
}

pub fn propagate_with_backend(
    backend: &impl ImageBackend,
    master: &Path,
    manifest: &ExportManifest,
    events: Option<Sender<ExportEvent>>,
) -> Result<ExportReport, PipelineError> {
    let image = load_source(backend, master)?;
    let canvas = if image.width() == image.height() {
        image
    } else {
        let rect = calculate_crop_rect(image.dimensions(), 1.0, CropAnchor::Center);
        crop_and_resize(&image, rect, rect.size)
    };
    let label = master
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| master.display().to_string());
    Ok(export(&canvas, manifest, backend, &label, events))
}

/// File name of one color variant in the variant sheet.
pub fn variant_file_name(color: &str) -> String {
    format!("logo_variant_{color}.png")
}

/// Render every color variant into `out_dir` as `logo_variant_<color>.png`.
///
/// The source is decoded once. Each variant is written at its working size
/// (or `working_size` when given).
pub fn render_variants(
    source: &Path,
    out_dir: &Path,
    working_size: Option<u32>,
    events: Option<Sender<ExportEvent>>,
) -> Result<ExportReport, PipelineError> {
    render_variants_with_backend(&RustBackend::new(), source, out_dir, working_size, events)
}

pub fn render_variants_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    out_dir: &Path,
    working_size: Option<u32>,
    events: Option<Sender<ExportEvent>>,
) -> Result<ExportReport, PipelineError> {
    let image = load_source(backend, source)?;
    let mut report = ExportReport::default();
    for color in VARIANT_COLORS {
        let mut variant = edition::named(&format!("variant-{color}"))?;
        if let Some(size) = working_size {
            variant = variant.with_working_size(size);
        }
        let canvas = render_edition(&variant, Some(&image))?;
        let manifest = ExportManifest::new(vec![ExportTarget {
            destination: out_dir.join(variant_file_name(color)),
            size: variant.working_size,
        }]);
        report.merge(export(&canvas, &manifest, backend, variant.name, events.clone()));
    }
    Ok(report)
}
