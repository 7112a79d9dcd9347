//! CLI output formatting.
//!
//! Every `format_*` function is pure and returns display lines, so the exact
//! text is unit tested without capturing stdout. `print_*` wrappers write the
//! lines out.
//!
//! # Output Format
//!
//! ## Export
//!
//! ```text
//! soul-bright (11 targets)
//!     Saved out/chrome-extension/public/icons/icon16.png (16px)
//!     Saved out/web/public/favicon.png (32px, PNG fallback: ICO encode failed: ...)
//!     Failed out/desktop/resources/icon.png (512px): IO error: permission denied
//! Exported 10 of 11 targets (1 PNG fallback, 1 failed)
//! ```
//!
//! ## Editions
//!
//! ```text
//! 001 clean (1024px)
//!     Silver duotone close-up with a single glowing white rim
//! ```

use crate::edition::Edition;
use crate::export::{ExportEvent, ExportReport, TargetOutcome, TargetReport};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Export output
// ============================================================================

/// One status line for a finished target.
pub fn format_target_report(report: &TargetReport) -> String {
    let size = report.size;
    match &report.outcome {
        TargetOutcome::Written => {
            format!("Saved {} ({size}px)", report.destination.display())
        }
        TargetOutcome::PngFallback { path, reason } => format!(
            "Saved {} ({size}px, PNG fallback: {reason})",
            path.display()
        ),
        TargetOutcome::Failed { error } => {
            format!("Failed {} ({size}px): {error}", report.destination.display())
        }
    }
}

/// Format a single export progress event as display lines.
pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Started {
            label,
            target_count,
        } => vec![format!("{label} ({})", plural(*target_count, "target"))],
        ExportEvent::Target(report) => {
            vec![format!("{}{}", indent(1), format_target_report(report))]
        }
    }
}

/// Closing summary for a whole run.
pub fn format_export_summary(report: &ExportReport) -> Vec<String> {
    let total = report.targets.len();
    let produced = report.written() + report.fallbacks();
    let mut details = Vec::new();
    if report.fallbacks() > 0 {
        details.push(plural(report.fallbacks(), "PNG fallback"));
    }
    if report.failed() > 0 {
        details.push(format!("{} failed", report.failed()));
    }
    let mut line = format!("Exported {produced} of {}", plural(total, "target"));
    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }
    vec![line]
}

/// Print the export summary to stdout.
pub fn print_export_summary(report: &ExportReport) {
    for line in format_export_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Editions listing
// ============================================================================

/// Format the edition catalogue: index, name and canvas size, then the summary.
pub fn format_editions(editions: &[Edition]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, edition) in editions.iter().enumerate() {
        lines.push(format!(
            "{} {} ({}px)",
            format_index(i + 1),
            edition.name,
            edition.working_size
        ));
        lines.push(format!("{}{}", indent(1), edition.summary));
    }
    lines
}

pub fn print_editions(editions: &[Edition]) {
    for line in format_editions(editions) {
        println!("{}", line);
    }
}
