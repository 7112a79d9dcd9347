//! Multi-target export.
//!
//! One finished canvas fans out to every product surface listed in the
//! [`ExportManifest`]: browser extension icons, editor extension icon,
//! desktop icon, web logo, favicons, touch icon and the `.ico` favicon.
//!
//! ## Failure Model
//!
//! Targets are independent. A target whose directory cannot be created or
//! whose file cannot be encoded is recorded as [`TargetOutcome::Failed`] and
//! the remaining targets still run. An `.ico` target whose encoder fails is
//! retried as a PNG beside it (`favicon.ico` → `favicon.png`) and reported as
//! [`TargetOutcome::PngFallback`].
//!
//! ## Parallel Export
//!
//! Targets are resized and written in parallel with rayon. The report keeps
//! manifest order regardless of completion order.

use crate::config::{IconConfig, TargetConfig};
use crate::imaging::{ImageBackend, OutputFormat, resize_square};
use image::RgbaImage;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// One output file: where it goes and its square pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTarget {
    pub destination: PathBuf,
    pub size: u32,
}

/// The list of files one export run writes. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportManifest {
    targets: Vec<ExportTarget>,
}

impl ExportManifest {
    pub fn new(targets: Vec<ExportTarget>) -> Self {
        Self { targets }
    }

    /// Resolve configured targets against `root`. Absolute paths are kept.
    pub fn from_targets(root: &Path, targets: &[TargetConfig]) -> Self {
        Self::new(
            targets
                .iter()
                .map(|t| ExportTarget {
                    destination: root.join(&t.path),
                    size: t.size,
                })
                .collect(),
        )
    }

    /// The configured product table under `root` (or `output_root` when `None`).
    pub fn from_config(config: &IconConfig, root: Option<&Path>) -> Self {
        let root = root.unwrap_or_else(|| Path::new(&config.output_root));
        Self::from_targets(root, &config.targets)
    }

    /// The stock product table under `root`.
    pub fn standard(root: &Path) -> Self {
        Self::from_config(&IconConfig::default(), Some(root))
    }

    pub fn targets(&self) -> &[ExportTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    Written,
    /// The icon encoder failed; a PNG of the same size was written instead.
    PngFallback { path: PathBuf, reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub destination: PathBuf,
    pub size: u32,
    #[serde(flatten)]
    pub outcome: TargetOutcome,
}

impl TargetReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, TargetOutcome::Failed { .. })
    }
}

/// Per-target results of one export run, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub targets: Vec<TargetReport>,
}

impl ExportReport {
    pub fn written(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.outcome == TargetOutcome::Written)
            .count()
    }

    pub fn fallbacks(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| matches!(t.outcome, TargetOutcome::PngFallback { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.targets.iter().filter(|t| t.is_failed()).count()
    }

    /// Paths of every file that exists after the run.
    pub fn produced_files(&self) -> Vec<&Path> {
        self.targets
            .iter()
            .filter_map(|t| match &t.outcome {
                TargetOutcome::Written => Some(t.destination.as_path()),
                TargetOutcome::PngFallback { path, .. } => Some(path.as_path()),
                TargetOutcome::Failed { .. } => None,
            })
            .collect()
    }

    pub fn merge(&mut self, other: ExportReport) {
        self.targets.extend(other.targets);
    }
}

/// Progress events sent to the CLI printer while exporting.
#[derive(Debug, Clone)]
pub enum ExportEvent {
    Started { label: String, target_count: usize },
    Target(TargetReport),
}

/// Resize `canvas` to every target in `manifest` and write it via `backend`.
///
/// Never fails as a whole: per-target problems are in the returned report.
/// `label` names the run in the `Started` event (an edition name, a master
/// file).
pub fn export(
    canvas: &RgbaImage,
    manifest: &ExportManifest,
    backend: &impl ImageBackend,
    label: &str,
    events: Option<Sender<ExportEvent>>,
) -> ExportReport {
    if let Some(tx) = &events {
        tx.send(ExportEvent::Started {
            label: label.to_string(),
            target_count: manifest.len(),
        })
        .ok();
    }

    let targets = manifest
        .targets()
        .par_iter()
        .map_with(events, |events, target| {
            let report = export_target(canvas, target, backend);
            if let Some(tx) = events {
                tx.send(ExportEvent::Target(report.clone())).ok();
            }
            report
        })
        .collect();

    ExportReport { targets }
}

fn export_target(
    canvas: &RgbaImage,
    target: &ExportTarget,
    backend: &impl ImageBackend,
) -> TargetReport {
    let report = |outcome| TargetReport {
        destination: target.destination.clone(),
        size: target.size,
        outcome,
    };
    let failed = |error: String| report(TargetOutcome::Failed { error });

    if target.size == 0 {
        return failed("target size must be positive".to_string());
    }
    let format = match OutputFormat::from_path(&target.destination) {
        Ok(format) => format,
        Err(e) => return failed(e.to_string()),
    };
    if let Some(parent) = target.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return failed(format!("cannot create {}: {e}", parent.display()));
        }
    }

    let resized = resize_square(canvas, target.size);
    match backend.save(&resized, &target.destination, format) {
        Ok(()) => report(TargetOutcome::Written),
        Err(ico_error) if format == OutputFormat::Ico => {
            let path = target.destination.with_extension(OutputFormat::Png.extension());
            match backend.save(&resized, &path, OutputFormat::Png) {
                Ok(()) => report(TargetOutcome::PngFallback {
                    path,
                    reason: ico_error.to_string(),
                }),
                Err(png_error) => failed(format!("{ico_error}; PNG fallback: {png_error}")),
            }
        }
        Err(e) => failed(e.to_string()),
    }
}
