//! Error types for the edgequake-zip2pdf library.
//!
//! [`Zip2PdfError`] describes why a single step (extraction, image decode,
//! PDF assembly, output write) failed. Nothing in the batch layer propagates
//! it upwards: the per-archive orchestrator folds every error into a
//! [`crate::convert::ConversionOutcome`] so one bad archive never stops the
//! rest of the batch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the edgequake-zip2pdf library.
#[derive(Debug, Error)]
pub enum Zip2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Archive not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The name does not end in .zip, .cbz, .rar or .cbr.
    #[error("Not a supported archive: '{path}'\nExpected a .zip, .cbz, .rar or .cbr file.")]
    NotAnArchive { path: PathBuf },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The archive is corrupt, encrypted or uses an unsupported method.
    #[error("Failed to extract '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// The crate was built without the `rar` feature.
    #[error("RAR support is disabled in this build; cannot extract '{path}'")]
    RarSupportDisabled { path: PathBuf },

    /// Could not create the per-archive scratch directory.
    #[error("Failed to create scratch directory: {0}")]
    ScratchDirFailed(#[source] std::io::Error),

    // ── Image errors ──────────────────────────────────────────────────────
    /// File could not be opened or decoded as an image.
    #[error("Failed to decode image '{path}': {detail}")]
    ImageDecodeFailed { path: PathBuf, detail: String },

    /// Normalised image could not be written back.
    #[error("Failed to rewrite image '{path}': {detail}")]
    ImageWriteFailed { path: PathBuf, detail: String },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// Not enough valid pages to be worth a PDF.
    #[error("Only {found} valid pages found, at least {required} required")]
    TooFewPages { found: usize, required: usize },

    /// lopdf failed to build or serialise the document.
    #[error("PDF assembly failed: {0}")]
    PdfAssemblyFailed(String),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Zip2PdfError {
    pub(crate) fn decode(path: impl Into<PathBuf>, e: impl std::fmt::Display) -> Self {
        Zip2PdfError::ImageDecodeFailed {
            path: path.into(),
            detail: e.to_string(),
        }
    }

    pub(crate) fn extraction(path: impl Into<PathBuf>, e: impl std::fmt::Display) -> Self {
        Zip2PdfError::ExtractionFailed {
            path: path.into(),
            detail: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_pages_display() {
        let e = Zip2PdfError::TooFewPages {
            found: 5,
            required: 12,
        };
        let msg = e.to_string();
        assert!(msg.contains("Only 5"), "got: {msg}");
        assert!(msg.contains("12"), "got: {msg}");
    }

    #[test]
    fn extraction_helper_keeps_path_and_detail() {
        let e = Zip2PdfError::extraction("/tmp/book.cbz", "invalid Zip archive");
        let msg = e.to_string();
        assert!(msg.contains("book.cbz"));
        assert!(msg.contains("invalid Zip archive"));
    }

    #[test]
    fn rar_disabled_display() {
        let e = Zip2PdfError::RarSupportDisabled {
            path: PathBuf::from("vol1.cbr"),
        };
        assert!(e.to_string().contains("vol1.cbr"));
    }

    #[test]
    fn output_write_failed_has_source() {
        use std::error::Error as _;
        let e = Zip2PdfError::OutputWriteFailed {
            path: PathBuf::from("out.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("out.pdf"));
    }
}
