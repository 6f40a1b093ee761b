//! Archive extraction into the per-archive scratch directory.
//!
//! Extraction is a seam: the orchestrator only talks to
//! [`ArchiveExtractor`], so tests (and callers with their own unpacker) can
//! swap in something else. [`NativeExtractor`] is the default and uses the
//! `zip` crate for the ZIP family and, with the `rar` feature, the `unrar`
//! crate for the RAR family.

use super::classify::ArchiveKind;
use crate::error::Zip2PdfError;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

/// Unpacks one archive into a destination directory.
///
/// Implementations must leave everything they write under `dest`; the
/// orchestrator deletes that directory when the conversion ends.
pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, archive: &Path, kind: ArchiveKind, dest: &Path) -> Result<(), Zip2PdfError>;
}

/// Default extractor backed by the `zip` and `unrar` crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeExtractor;

impl ArchiveExtractor for NativeExtractor {
    fn extract(&self, archive: &Path, kind: ArchiveKind, dest: &Path) -> Result<(), Zip2PdfError> {
        if !archive.is_file() {
            return Err(Zip2PdfError::FileNotFound {
                path: archive.to_path_buf(),
            });
        }
        match kind {
            ArchiveKind::Zip => extract_zip(archive, dest),
            ArchiveKind::Rar => extract_rar(archive, dest),
        }
    }
}

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Unpack regular files and directories only. Entries whose name would
/// land outside `dest` and symlink entries are skipped.
fn extract_zip(archive: &Path, dest: &Path) -> Result<(), Zip2PdfError> {
    let file = File::open(archive).map_err(|e| Zip2PdfError::extraction(archive, e))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| Zip2PdfError::extraction(archive, e))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| Zip2PdfError::extraction(archive, e))?;
        if entry.unix_mode().is_some_and(|m| m & S_IFMT == S_IFLNK) {
            continue;
        }
        let Some(rel) = entry.enclosed_name() else {
            continue;
        };
        let target = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Zip2PdfError::extraction(archive, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Zip2PdfError::extraction(archive, e))?;
        }
        let mut out = File::create(&target).map_err(|e| Zip2PdfError::extraction(archive, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| Zip2PdfError::extraction(archive, e))?;
    }
    Ok(())
}

#[cfg(feature = "rar")]
fn extract_rar(archive: &Path, dest: &Path) -> Result<(), Zip2PdfError> {
    let mut open = unrar::Archive::new(archive)
        .open_for_processing()
        .map_err(|e| Zip2PdfError::extraction(archive, e))?;

    while let Some(header) = open
        .read_header()
        .map_err(|e| Zip2PdfError::extraction(archive, e))?
    {
        open = if header.entry().is_file() {
            header.extract_with_base(dest)
        } else {
            header.skip()
        }
        .map_err(|e| Zip2PdfError::extraction(archive, e))?;
    }
    Ok(())
}

#[cfg(not(feature = "rar"))]
fn extract_rar(archive: &Path, _dest: &Path) -> Result<(), Zip2PdfError> {
    Err(Zip2PdfError::RarSupportDisabled {
        path: archive.to_path_buf(),
    })
}
