//! # edgequake-zip2pdf
//!
//! Convert comic-book and image archives (ZIP, CBZ, RAR, CBR) into PDFs,
//! one PDF per archive, written next to the archive.
//!
//! ## Pipeline Overview
//!
//! ```text
//! archive.cbz
//!  │
//!  ├─ 1. Classify  .zip/.cbz → ZIP family, .rar/.cbr → RAR family
//!  ├─ 2. Extract   unpack into a scratch TempDir (removed afterwards)
//!  ├─ 3. Walk      recursive image discovery, hidden entries skipped
//!  ├─ 4. Validate  decode, drop images ≤ 10 px, flatten alpha, expand palettes
//!  ├─ 5. Order     longest path first, then lexicographic
//!  ├─ 6. Assemble  ≥ 12 pages → one PDF page per image at 100 DPI
//!  └─ 7. Output    archive.pdf, written atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_zip2pdf::{convert, run_batch, ConversionConfig};
//! use std::path::{Path, PathBuf};
//!
//! let config = ConversionConfig::default();
//!
//! // One archive
//! if let Some(pdf) = convert("Issue 01.cbz", &config) {
//!     println!("wrote {}", pdf.display());
//! }
//!
//! // Everything under a directory that has no PDF yet
//! let report = run_batch(&[PathBuf::from("comics")], Path::new("."), &config);
//! println!("{} converted, {} failed", report.converted(), report.failed());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `zip2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `rar`   | on      | RAR/CBR extraction through the `unrar` crate |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{plan_batch, run_batch, ArchiveReport, BatchPlan, BatchReport};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_archive, ConversionOutcome};
pub use error::Zip2PdfError;
pub use pipeline::assemble::{LopdfEncoder, PdfEncoder};
pub use pipeline::classify::{classify, is_image_name, output_path_for, ArchiveKind, Classification};
pub use pipeline::extract::{ArchiveExtractor, NativeExtractor};
pub use pipeline::order::order_pages;
pub use pipeline::validate::{validate_and_normalize, ImagePolicy, Normalization, RejectReason};
pub use pipeline::walk::{collect_archives, collect_images, scan_images, ImageScan};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
