use clap::{Parser, Subcommand};
use iconsmith::export::{ExportEvent, ExportManifest, ExportReport};
use iconsmith::{PipelineError, config, edition, output, pipeline};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// Shared flags for commands that export to the product manifest.
#[derive(clap::Args, Clone)]
struct ExportArgs {
    /// Directory relative target paths resolve against (overrides `output_root`)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Also write the per-target results as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "iconsmith")]
#[command(about = "Render stylized icon editions from a photograph and export them")]
#[command(long_about = "\
Render stylized icon editions from a photograph and export them

One source photo is cropped, tone mapped to a two-color ramp, clipped to a
circle, optionally given a highlight glow, and composited with auras and rings
into a square canvas. The canvas is then resized to every target in the export
manifest:

  chrome-extension/public/icons/icon{16,48,128}.png
  vscode-extension/images/icon.png
  desktop/resources/icon.png
  web/public/{logo.png, favicon-16x16.png, favicon-32x32.png,
              apple-touch-icon.png, favicon.ico}
  logo.png

Run 'iconsmith editions' to list the looks, and 'iconsmith gen-config' to
generate a documented iconsmith.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./iconsmith.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one edition and export it to every target
    Render {
        /// Edition name (see `iconsmith editions`)
        edition: String,
        /// Source photograph (not needed for shape-only editions such as `eye`)
        #[arg(long)]
        source: Option<PathBuf>,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Render every color variant as logo_variant_<color>.png
    Variants {
        /// Source photograph
        #[arg(long)]
        source: PathBuf,
        /// Directory the variant sheet is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Export an existing master logo to every target without re-rendering
    Propagate {
        /// Master logo image
        #[arg(long)]
        master: PathBuf,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// List the built-in editions
    Editions,
    /// Print a stock iconsmith.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Editions => {
            output::print_editions(&edition::catalogue());
            return Ok(());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        _ => {}
    }

    let config = config::load_config(Path::new("."), cli.config.as_deref())
        .map_err(PipelineError::from)?;
    init_thread_pool(&config.processing);

    match cli.command {
        Command::Render {
            edition: name,
            source,
            export,
        } => {
            let mut edition = edition::named(&name).map_err(PipelineError::from)?;
            if let Some(size) = config.render.working_size {
                edition = edition.with_working_size(size);
            }
            let manifest = ExportManifest::from_config(&config, export.root.as_deref());
            let report =
                run_with_printer(|tx| {
                pipeline::render(&edition, source.as_deref(), &manifest, Some(tx))
            })?;
            finish(&report, export.report.as_deref())?;
        }
        Command::Variants { source, out_dir } => {
            let size = config.render.working_size;
            let report = run_with_printer(|tx| {
                pipeline::render_variants(&source, &out_dir, size, Some(tx))
            })?;
            finish(&report, None)?;
        }
        Command::Propagate { master, export } => {
            let manifest = ExportManifest::from_config(&config, export.root.as_deref());
            let report =
                run_with_printer(|tx| pipeline::propagate(&master, &manifest, Some(tx)))?;
            finish(&report, export.report.as_deref())?;
        }
        Command::Editions | Command::GenConfig => {}
    }

    Ok(())
}

/// Run `job` while a printer thread turns its events into status lines.
fn run_with_printer<F>(job: F) -> Result<ExportReport, Box<dyn std::error::Error>>
where
    F: FnOnce(Sender<ExportEvent>) -> Result<ExportReport, PipelineError>,
{
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_export_event(&event) {
                println!("{}", line);
            }
        }
    });
    // `job` owns the only sender, so the printer ends once the job returns
    let result = job(tx);
    printer
        .join()
        .map_err(|_| "output printer thread panicked")?;
    Ok(result?)
}

/// Print the summary and write the optional JSON report.
fn finish(report: &ExportReport, report_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    output::print_export_summary(report);
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)?;
    }
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
