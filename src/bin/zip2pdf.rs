//! CLI binary for edgequake-zip2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig`, runs the batch and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_zip2pdf::{
    run_batch, BatchProgressCallback, BatchReport, ConversionConfig, ConversionOutcome,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the batch, one log line per archive.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} archives  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_archive_start(&self, _index: usize, _total: usize, path: &Path) {
        self.bar.set_message(display_name(path));
    }

    fn on_archive_complete(
        &self,
        index: usize,
        total: usize,
        path: &Path,
        outcome: &ConversionOutcome,
    ) {
        let line = match outcome {
            ConversionOutcome::Converted { pages, .. } => format!(
                "  {} {:>3}/{:<3}  {}  {}",
                green("✓"),
                index,
                total,
                display_name(path),
                dim(&format!("{pages} pages"))
            ),
            ConversionOutcome::BelowThreshold { found, required } => format!(
                "  {} {:>3}/{:<3}  {}  {}",
                yellow("⚠"),
                index,
                total,
                display_name(path),
                dim(&format!("{found} pages, {required} needed — skipped"))
            ),
            ConversionOutcome::NotAnArchive => format!(
                "  {} {:>3}/{:<3}  {}  {}",
                red("✗"),
                index,
                total,
                display_name(path),
                red("not an archive")
            ),
            ConversionOutcome::ExtractionFailed { reason }
            | ConversionOutcome::AssemblyFailed { reason } => {
                let msg = if reason.chars().count() > 80 {
                    format!("{}\u{2026}", reason.chars().take(79).collect::<String>())
                } else {
                    reason.clone()
                };
                format!(
                    "  {} {:>3}/{:<3}  {}  {}",
                    red("✗"),
                    index,
                    total,
                    display_name(path),
                    red(&msg)
                )
            }
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert specific archives (PDFs are written next to them)
  zip2pdf "Issue 01.cbz" "Issue 02.cbr"

  # Convert every archive below a directory that has no PDF yet
  zip2pdf comics/

  # Machine-readable summary
  zip2pdf --json comics/ > report.json

RULES:
  X.zip / X.cbz / X.rar / X.cbr  →  X.pdf in the same directory
  Archives whose PDF already exists are skipped.
  Images of 10 px or less on either side are ignored.
  Archives with fewer than --min-pages valid images produce no PDF.
"#;

/// Convert ZIP/CBZ/RAR/CBR archives to PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "zip2pdf",
    version,
    about = "Convert ZIP/CBZ/RAR/CBR archives to PDFs",
    long_about = "Extract the images from comic-book archives, drop thumbnails and broken \
files, flatten transparency, order the pages and write one PDF per archive.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Archives (or directories to search for archives).
    source_files: Vec<PathBuf>,

    /// Minimum valid pages for a PDF to be written.
    #[arg(long, default_value_t = 12,
          value_parser = clap::value_parser!(u64).range(1..))]
    min_pages: u64,

    /// JPEG quality (1–100) used when flattening transparent images.
    #[arg(long, default_value_t = 80,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Resolution used to size PDF pages (36–600).
    #[arg(long, default_value_t = 100,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = shows_progress(&cli);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(&cli))),
        )
        .with_writer(io::stderr)
        .init();

    if cli.source_files.is_empty() {
        info!("No files to process");
        return Ok(());
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let report = run_batch(&cli.source_files, &cwd, &config);

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    }

    if !cli.quiet {
        print_summary(&report);
    }
    Ok(())
}

fn shows_progress(cli: &Cli) -> bool {
    !cli.quiet && !cli.no_progress && !cli.json && !cli.source_files.is_empty()
}

/// Default log level. INFO-level library logs are suppressed while the
/// progress bar is active; the bar already reports every archive.
fn log_filter(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet || shows_progress(cli) {
        "error"
    } else {
        "info"
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .min_pages(usize::try_from(cli.min_pages).context("--min-pages is too large")?)
        .jpeg_quality(cli.quality)
        .dpi(cli.dpi);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &BatchReport) {
    for path in &report.ignored {
        eprintln!("{} {}  {}", dim("·"), path.display(), dim("not an archive, ignored"));
    }
    if !report.skipped_existing.is_empty() {
        eprintln!(
            "{} {} already converted",
            dim("·"),
            report.skipped_existing.len()
        );
    }

    let failed = report.failed();
    let icon = if failed == 0 { green("✔") } else { red("✘") };
    eprintln!(
        "{}  {} converted  /  {} below threshold  /  {} failed  {}",
        icon,
        bold(&report.converted().to_string()),
        report.below_threshold(),
        if failed == 0 {
            failed.to_string()
        } else {
            red(&failed.to_string())
        },
        dim(&format!("{}ms", report.total_duration_ms)),
    );
}
