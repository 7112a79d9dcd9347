//! # iconsmith
//!
//! Turns one source photograph into a family of stylized, circular icon
//! editions and exports each edition to every icon file a product ships:
//! browser extension, editor extension, desktop app, web favicons.
//!
//! # Architecture: Linear Pipeline, Fan-Out Export
//!
//! ```text
//! load ─▶ crop ─▶ tone map ─▶ glow? ─▶ mask ─▶ composite ─▶ export ─┬─▶ icon16.png
//!                                                                 ├─▶ ...
//!                                                                 └─▶ favicon.ico
//! ```
//!
//! Every stage is a pure function from one buffer to the next. Data only flows
//! forward, nothing is cached between runs, and the only side effects are the
//! reads in [`imaging::ImageBackend::load`] and the writes in [`export`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel stages: crop geometry, tone mapping, masks, blur, glow, rings, compositing, file I/O |
//! | [`edition`] | Named edition configurations and [`edition::render_edition`] |
//! | [`export`] | Export manifest, per-target resize and write, [`export::ExportReport`] |
//! | [`pipeline`] | End-to-end runs: render, propagate a master, render the variant sheet |
//! | [`config`] | `iconsmith.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Pipeline, Many Editions
//!
//! Editions differ only in parameters: crop anchor, color ramp, glow, mask and
//! layer stack. Each is a plain [`edition::Edition`] value, and all geometry
//! is stored as a fraction of the canvas, so the same edition renders
//! identically at 1024px for export or at 64px in a unit test.
//!
//! ## Straight Alpha Everywhere
//!
//! Buffers carry straight (not premultiplied) alpha between stages. Only the
//! blur premultiplies internally, so transparent pixels never bleed black into
//! a soft edge.
//!
//! ## Export Failures Are Values
//!
//! A failed target does not abort the run. It is a
//! [`export::TargetOutcome::Failed`] in the report, printed as a status line.
//! The process exits non-zero only when there is nothing to export: the
//! source cannot be read, the edition is invalid, or the config is broken.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling (Lanczos3) and encoding go through the `image` crate,
//! so the binary has no system dependencies.

pub mod config;
pub mod edition;
pub mod export;
pub mod imaging;
pub mod output;
pub mod pipeline;

pub use pipeline::PipelineError;

#[cfg(test)]
pub(crate) mod test_helpers;
