//! Name-based classification: archive family, image pre-filter, output name.
//!
//! Every decision here looks only at the **last four characters** of a name,
//! lower-cased. That keeps `.zip` / `.cbz` / `.rar` / `.cbr` and the image
//! suffixes on the same footing, and means `photo.jpeg` is caught by its
//! trailing `jpeg`. Content is never sniffed at this stage; whether a file
//! really is an image is decided later by [`super::validate`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Archive container family, selecting the extraction routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    /// `.zip` and `.cbz`.
    Zip,
    /// `.rar` and `.cbr`.
    Rar,
}

/// Result of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Archive(ArchiveKind),
    NotArchive,
}

impl Classification {
    pub fn kind(self) -> Option<ArchiveKind> {
        match self {
            Classification::Archive(kind) => Some(kind),
            Classification::NotArchive => None,
        }
    }
}

const IMAGE_SUFFIXES: [&str; 5] = [".jpg", "jpeg", ".gif", ".bmp", ".png"];

/// Last four characters of `name`, lower-cased, or `None` if shorter.
fn suffix4(name: &str) -> Option<String> {
    let count = name.chars().count();
    if count < 4 {
        return None;
    }
    Some(name.chars().skip(count - 4).collect::<String>().to_lowercase())
}

/// Classify a file name as a supported archive or not.
pub fn classify(name: &str) -> Classification {
    match suffix4(name).as_deref() {
        Some(".zip") | Some(".cbz") => Classification::Archive(ArchiveKind::Zip),
        Some(".rar") | Some(".cbr") => Classification::Archive(ArchiveKind::Rar),
        _ => Classification::NotArchive,
    }
}

/// [`classify`] for a path; non-UTF-8 components are replaced lossily.
pub fn archive_kind(path: &Path) -> Option<ArchiveKind> {
    classify(&path.to_string_lossy()).kind()
}

/// Cheap pre-filter applied before a file is opened as an image.
pub fn is_image_name(name: &str) -> bool {
    suffix4(name).is_some_and(|s| IMAGE_SUFFIXES.contains(&s.as_str()))
}

/// `X.cbz` → `X.pdf`, in the same directory.
///
/// Replaces the last four characters of the name, like the classifier reads
/// them, so `Book.CBZ` becomes `Book.pdf`.
pub fn output_path_for(archive: &Path) -> PathBuf {
    let name = archive.to_string_lossy();
    let count = name.chars().count();
    let stem: String = name.chars().take(count.saturating_sub(4)).collect();
    PathBuf::from(format!("{stem}.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_archive_suffixes_case_insensitive() {
        for name in ["a.zip", "a.ZIP", "b.cbz", "b.CbZ", "dir/x.Zip"] {
            assert_eq!(classify(name), Classification::Archive(ArchiveKind::Zip), "{name}");
        }
        for name in ["a.rar", "a.RAR", "b.cbr", "b.cBR"] {
            assert_eq!(classify(name), Classification::Archive(ArchiveKind::Rar), "{name}");
        }
    }

    #[test]
    fn classify_everything_else_is_not_archive() {
        for name in ["", "zip", ".7z", "a.tar", "a.zip.bak", "a.pdf", "a.cbz ", "cbz"] {
            assert_eq!(classify(name), Classification::NotArchive, "{name:?}");
        }
    }

    #[test]
    fn classify_is_suffix_only() {
        // No dot check beyond the 4-character window: a bare ".zip" counts.
        assert_eq!(classify(".zip").kind(), Some(ArchiveKind::Zip));
        assert_eq!(classify("notazip").kind(), None);
    }

    #[test]
    fn classify_counts_characters_not_bytes() {
        assert_eq!(classify("漫画.cbz").kind(), Some(ArchiveKind::Zip));
        assert_eq!(classify("éé").kind(), None);
    }

    #[test]
    fn image_name_filter() {
        for name in ["p.jpg", "p.JPG", "p.jpeg", "P.JPEG", "p.gif", "p.bmp", "p.PNG"] {
            assert!(is_image_name(name), "{name}");
        }
        for name in ["p.webp", "p.tif", "p.tiff", "p.txt", "jpg", ""] {
            assert!(!is_image_name(name), "{name}");
        }
    }

    #[test]
    fn image_name_filter_matches_dotless_jpeg_suffix() {
        // The 4-character window reads "jpeg" without a dot.
        assert!(is_image_name("coverjpeg"));
        assert!(!is_image_name("coverjpg"));
    }

    #[test]
    fn output_path_replaces_last_four_chars() {
        assert_eq!(output_path_for(Path::new("/c/Book 01.cbz")), PathBuf::from("/c/Book 01.pdf"));
        assert_eq!(output_path_for(Path::new("x.CBR")), PathBuf::from("x.pdf"));
        assert_eq!(output_path_for(Path::new("a.b.zip")), PathBuf::from("a.b.pdf"));
    }

    #[test]
    fn archive_kind_for_paths() {
        assert_eq!(archive_kind(Path::new("/tmp/vol.CBR")), Some(ArchiveKind::Rar));
        assert_eq!(archive_kind(Path::new("/tmp/vol.pdf")), None);
    }
}
