//! Per-archive conversion: archive → scratch directory → pages → PDF.
//!
//! [`convert_archive`] never returns an error. Every failure (bad archive,
//! too few pages, encoder error, unwritable output) becomes a
//! [`ConversionOutcome`] plus a log line, so the batch runner can move on to
//! the next archive.
//!
//! The scratch directory is a [`tempfile::TempDir`] owned by a single
//! conversion. It is removed when the conversion returns, on every path.

use crate::config::ConversionConfig;
use crate::error::Zip2PdfError;
use crate::pipeline::classify::{archive_kind, output_path_for, ArchiveKind};
use crate::pipeline::validate::Normalization;
use crate::pipeline::walk::{scan_images, ImageScan};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, warn};

/// What happened to one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// PDF written.
    Converted { output: PathBuf, pages: usize },
    /// Not enough valid pages; nothing written.
    BelowThreshold { found: usize, required: usize },
    /// Name does not classify as a supported archive.
    NotAnArchive,
    /// Archive could not be unpacked.
    ExtractionFailed { reason: String },
    /// Pages were found but the PDF could not be produced or written.
    AssemblyFailed { reason: String },
}

impl ConversionOutcome {
    /// Path of the PDF, if one was produced.
    pub fn output(&self) -> Option<&Path> {
        match self {
            ConversionOutcome::Converted { output, .. } => Some(output),
            _ => None,
        }
    }

    fn from_error(e: Zip2PdfError) -> Self {
        match e {
            Zip2PdfError::TooFewPages { found, required } => {
                ConversionOutcome::BelowThreshold { found, required }
            }
            Zip2PdfError::NotAnArchive { .. } => ConversionOutcome::NotAnArchive,
            e @ (Zip2PdfError::FileNotFound { .. }
            | Zip2PdfError::ExtractionFailed { .. }
            | Zip2PdfError::RarSupportDisabled { .. }
            | Zip2PdfError::ScratchDirFailed(_)) => ConversionOutcome::ExtractionFailed {
                reason: e.to_string(),
            },
            e => ConversionOutcome::AssemblyFailed {
                reason: e.to_string(),
            },
        }
    }
}

/// Convert one archive, returning the PDF path on success.
pub fn convert(archive: impl AsRef<Path>, config: &ConversionConfig) -> Option<PathBuf> {
    match convert_archive(archive.as_ref(), config) {
        ConversionOutcome::Converted { output, .. } => Some(output),
        _ => None,
    }
}

/// Convert one archive and report exactly what happened.
pub fn convert_archive(archive: &Path, config: &ConversionConfig) -> ConversionOutcome {
    let start = Instant::now();
    let outcome = match archive_kind(archive) {
        Some(kind) => {
            let output = output_path_for(archive);
            info!("Converting {} → {}", archive.display(), output.display());
            match run(archive, kind, &output, config) {
                Ok(pages) => ConversionOutcome::Converted { output, pages },
                Err(e) => ConversionOutcome::from_error(e),
            }
        }
        None => ConversionOutcome::NotAnArchive,
    };

    match &outcome {
        ConversionOutcome::Converted { output, pages } => info!(
            "Wrote {} ({} pages) in {}ms",
            output.display(),
            pages,
            start.elapsed().as_millis()
        ),
        ConversionOutcome::BelowThreshold { found, required } => warn!(
            "{}: only {} valid pages (need {}), no PDF written",
            archive.display(),
            found,
            required
        ),
        ConversionOutcome::NotAnArchive => {
            warn!("{}: not a .zip/.cbz/.rar/.cbr archive", archive.display())
        }
        ConversionOutcome::ExtractionFailed { reason } => {
            warn!("{}: extraction failed: {}", archive.display(), reason)
        }
        ConversionOutcome::AssemblyFailed { reason } => {
            warn!("{}: PDF not written: {}", archive.display(), reason)
        }
    }
    outcome
}

fn run(
    archive: &Path,
    kind: ArchiveKind,
    output: &Path,
    config: &ConversionConfig,
) -> Result<usize, Zip2PdfError> {
    let scratch = tempfile::Builder::new()
        .prefix("zip2pdf-")
        .tempdir()
        .map_err(Zip2PdfError::ScratchDirFailed)?;
    debug!("Extracting {} into {}", archive.display(), scratch.path().display());

    config.extractor.extract(archive, kind, scratch.path())?;

    let scan = scan_images(scratch.path(), &config.image_policy());
    log_scan(&scratch, &scan);

    if scan.pages.len() < config.min_pages {
        return Err(Zip2PdfError::TooFewPages {
            found: scan.pages.len(),
            required: config.min_pages,
        });
    }

    let bytes = config.encoder.encode(&scan.pages, config.dpi)?;
    write_output(output, &bytes)?;
    Ok(scan.pages.len())
}

fn log_scan(scratch: &TempDir, scan: &ImageScan) {
    let rel = |p: &Path| {
        p.strip_prefix(scratch.path())
            .unwrap_or(p)
            .display()
            .to_string()
    };
    for (path, reason) in &scan.rejected {
        debug!("skip {}: {:?}", rel(path), reason);
    }
    for (path, n) in &scan.normalized {
        match n {
            Normalization::Failed(detail) => warn!("could not normalise {}: {}", rel(path), detail),
            other => debug!("normalised {}: {:?}", rel(path), other),
        }
    }
    info!(
        "{} valid pages, {} files skipped",
        scan.pages.len(),
        scan.rejected.len()
    );
}

/// Atomic write: temp file in the destination directory, then rename.
fn write_output(path: &Path, bytes: &[u8]) -> Result<(), Zip2PdfError> {
    let err = |source: std::io::Error| Zip2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(err)?;
    tmp.write_all(bytes).map_err(err)?;
    tmp.persist(path).map_err(|e| err(e.error))?;
    Ok(())
}
