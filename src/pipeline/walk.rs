//! Recursive discovery of page images and archives.
//!
//! Both walks run on [`WalkDir`] without following symbolic links: a link
//! inside an extracted archive is neither descended into nor treated as a
//! page, so nothing outside the scratch directory is ever opened or
//! rewritten. Traversal order is not meaningful; pages are re-sorted by
//! [`super::order::order_pages`] and the batch planner sorts archives.
//!
//! The image walk skips hidden entries (leading `.`), which keeps macOS
//! `.DS_Store` / `._page01.jpg` resource forks out of the PDF. The archive
//! walk does not.
//!
//! Nothing here logs. Callers get an [`ImageScan`] and decide what to report.

use super::classify::{archive_kind, is_image_name};
use super::order::order_pages;
use super::validate::{validate_image, ImagePolicy, Normalization, RejectReason};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Outcome of [`scan_images`].
#[derive(Debug, Default, Clone)]
pub struct ImageScan {
    /// Accepted pages in final page order.
    pub pages: Vec<PathBuf>,
    /// Accepted pages that needed (or failed) a rewrite.
    pub normalized: Vec<(PathBuf, Normalization)>,
    /// Candidates that were turned away, in traversal order.
    pub rejected: Vec<(PathBuf, RejectReason)>,
}

/// The walk root itself is never hidden, whatever its name.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn test_image(path: &Path, policy: &ImagePolicy, scan: &mut ImageScan) {
    if !is_image_name(&path.to_string_lossy()) {
        scan.rejected
            .push((path.to_path_buf(), RejectReason::NotAnImageName));
        return;
    }
    match validate_image(path, policy) {
        Ok(Normalization::Unchanged) => scan.pages.push(path.to_path_buf()),
        Ok(n) => {
            scan.pages.push(path.to_path_buf());
            scan.normalized.push((path.to_path_buf(), n));
        }
        Err(reason) => scan.rejected.push((path.to_path_buf(), reason)),
    }
}

/// Walk `root`, validating and normalising every candidate image.
///
/// Only regular files are candidates; symlinks are skipped. `pages` in the
/// result is already in page order.
pub fn scan_images(root: &Path, policy: &ImagePolicy) -> ImageScan {
    let mut scan = ImageScan::default();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            test_image(entry.path(), policy, &mut scan);
        }
    }
    scan.pages = order_pages(scan.pages);
    scan
}

/// Ordered list of valid page images under `root`.
pub fn collect_images(root: &Path, policy: &ImagePolicy) -> Vec<PathBuf> {
    scan_images(root, policy).pages
}

/// Every supported archive under `root`, hidden entries included.
///
/// A non-directory `root` is returned on its own if it classifies as an
/// archive. Linked directories are not descended into.
pub fn collect_archives(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir() && e.path().is_file())
        .filter(|e| archive_kind(e.path()).is_some())
        .map(DirEntry::into_path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn page(path: &Path, w: u32, h: u32) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 100, 50])))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn collects_nested_images_in_page_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        page(&root.join("p1.png"), 20, 30);
        page(&root.join("chapter/p10.png"), 20, 30);
        page(&root.join("chapter/deeper/p2.png"), 20, 30);

        let got = collect_images(root, &ImagePolicy::default());
        assert_eq!(
            got,
            vec![
                root.join("chapter/deeper/p2.png"),
                root.join("chapter/p10.png"),
                root.join("p1.png"),
            ]
        );
    }

    #[test]
    fn hidden_entries_are_skipped_for_images() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        page(&root.join("visible.png"), 20, 20);
        page(&root.join("._visible.png"), 20, 20);
        page(&root.join(".thumbs/cover.png"), 20, 20);

        let scan = scan_images(root, &ImagePolicy::default());
        assert_eq!(scan.pages, vec![root.join("visible.png")]);
        // Hidden files are never even considered.
        assert!(scan.rejected.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_neither_followed_nor_rewritten() {
        use image::{Rgba, RgbaImage};
        use std::os::unix::fs::symlink;

        let outside = TempDir::new().unwrap();
        let victim = outside.path().join("victim.png");
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 100])))
            .save_with_format(&victim, ImageFormat::Png)
            .unwrap();
        let before = fs::read(&victim).unwrap();

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        page(&root.join("p1.png"), 20, 20);
        page(&root.join("sub/p2.png"), 20, 20);
        symlink(".", root.join("loop")).unwrap();
        symlink(outside.path(), root.join("ext")).unwrap();
        symlink(&victim, root.join("linked.png")).unwrap();

        let scan = scan_images(root, &ImagePolicy::default());
        assert_eq!(scan.pages, vec![root.join("sub/p2.png"), root.join("p1.png")]);
        assert!(scan.rejected.is_empty());
        assert_eq!(fs::read(&victim).unwrap(), before);
    }

    #[test]
    fn rejected_candidates_are_reported() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        page(&root.join("ok.png"), 20, 20);
        page(&root.join("icon.png"), 8, 8);
        touch(&root.join("notes.txt"));
        touch(&root.join("corrupt.jpg"));

        let scan = scan_images(root, &ImagePolicy::default());
        assert_eq!(scan.pages, vec![root.join("ok.png")]);
        assert_eq!(scan.rejected.len(), 3);
        let reason_for = |name: &str| {
            scan.rejected
                .iter()
                .find(|(p, _)| p.ends_with(name))
                .map(|(_, r)| r.clone())
                .unwrap()
        };
        assert_eq!(reason_for("notes.txt"), RejectReason::NotAnImageName);
        assert_eq!(
            reason_for("icon.png"),
            RejectReason::TooSmall { width: 8, height: 8 }
        );
        assert!(matches!(reason_for("corrupt.jpg"), RejectReason::Undecodable(_)));
    }

    #[test]
    fn single_file_root_is_tested_directly() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("solo.png");
        page(&file, 20, 20);
        assert_eq!(collect_images(&file, &ImagePolicy::default()), vec![file.clone()]);

        let tiny = dir.path().join("tiny.png");
        page(&tiny, 5, 5);
        assert!(collect_images(&tiny, &ImagePolicy::default()).is_empty());
    }

    #[test]
    fn archives_found_recursively_including_hidden() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("a.cbz"));
        touch(&root.join("sub/b.CBR"));
        touch(&root.join(".hidden/c.zip"));
        touch(&root.join(".d.rar"));
        touch(&root.join("readme.txt"));

        let mut got = collect_archives(root);
        got.sort();
        assert_eq!(
            got,
            vec![
                root.join(".d.rar"),
                root.join(".hidden/c.zip"),
                root.join("a.cbz"),
                root.join("sub/b.CBR"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn archive_walk_does_not_descend_linked_directories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("a.cbz"));
        std::os::unix::fs::symlink(".", root.join("loop")).unwrap();
        assert_eq!(collect_archives(root), vec![root.join("a.cbz")]);
    }

    #[test]
    fn archive_walk_single_file_root() {
        let dir = TempDir::new().unwrap();
        let cbz = dir.path().join("one.cbz");
        let txt = dir.path().join("one.txt");
        touch(&cbz);
        touch(&txt);
        assert_eq!(collect_archives(&cbz), vec![cbz.clone()]);
        assert!(collect_archives(&txt).is_empty());
    }

    #[test]
    fn missing_root_yields_nothing() {
        let missing = Path::new("/definitely/not/here");
        assert!(collect_archives(missing).is_empty());
        assert!(collect_images(missing, &ImagePolicy::default()).is_empty());
    }
}
