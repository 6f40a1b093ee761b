//! Page ordering.
//!
//! Pages are sorted by **descending path length**, then ascending
//! lexicographic order. The key depends only on the path strings, so the
//! result is the same whatever order the filesystem listed them in.
//!
//! This is a heuristic, not a numeric sort. It works for the common
//! "same prefix, zero-padded counter" layout, but an archive mixing 2- and
//! 3-digit unpadded names (`p99.jpg`, `p100.jpg`) puts the 3-digit pages
//! first.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

fn page_cmp(a: &Path, b: &Path) -> Ordering {
    let a = a.to_string_lossy();
    let b = b.to_string_lossy();
    b.chars()
        .count()
        .cmp(&a.chars().count())
        .then_with(|| a.cmp(&b))
}

/// Sort `paths` into page order.
pub fn order_pages(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| page_cmp(a, b));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strs(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| p.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn longer_names_first_then_lexicographic() {
        let got = order_pages(vec![
            PathBuf::from("a/p1.jpg"),
            PathBuf::from("a/page10.jpg"),
            PathBuf::from("a/p2.jpg"),
        ]);
        assert_eq!(strs(&got), ["a/page10.jpg", "a/p1.jpg", "a/p2.jpg"]);
    }

    #[test]
    fn zero_padded_pages_stay_in_sequence() {
        let got = order_pages(vec![
            PathBuf::from("x/003.jpg"),
            PathBuf::from("x/001.jpg"),
            PathBuf::from("x/002.jpg"),
        ]);
        assert_eq!(strs(&got), ["x/001.jpg", "x/002.jpg", "x/003.jpg"]);
    }

    #[test]
    fn unpadded_numbers_are_a_known_limitation() {
        let got = order_pages(vec![PathBuf::from("p99.jpg"), PathBuf::from("p100.jpg")]);
        assert_eq!(strs(&got), ["p100.jpg", "p99.jpg"]);
    }

    #[test]
    fn empty_input() {
        assert!(order_pages(Vec::new()).is_empty());
    }

    proptest! {
        #[test]
        fn independent_of_input_order(mut names in proptest::collection::vec("[a-z0-9/]{1,12}", 0..20)) {
            let forward = order_pages(names.iter().map(PathBuf::from).collect());
            names.reverse();
            let backward = order_pages(names.iter().map(PathBuf::from).collect());
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn lengths_never_increase(names in proptest::collection::vec("[a-z0-9]{1,12}", 0..20)) {
            let ordered = order_pages(names.iter().map(PathBuf::from).collect());
            for pair in ordered.windows(2) {
                let a = pair[0].to_string_lossy().len();
                let b = pair[1].to_string_lossy().len();
                prop_assert!(a >= b);
            }
        }
    }
}
