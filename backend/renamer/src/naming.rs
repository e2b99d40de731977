use std::path::Path;

use bibtag_core::{NumberSet, RenamePlan, SourceImage};

/// File name for a set of numbers: `n<a>_n<b>..._<ext>`, ascending.
///
/// `{5, 12, 200}` with `".jpg"` gives `"n5_n12_n200.jpg"`. The set must not be
/// empty; images without numbers are skipped before this is called.
pub fn derive_file_name(numbers: &NumberSet, extension: &str) -> String {
    debug_assert!(!numbers.is_empty(), "derive_file_name called with no numbers");
    let stem = numbers
        .iter()
        .map(|n| format!("n{n}"))
        .collect::<Vec<_>>()
        .join("_");
    format!("{stem}{extension}")
}

/// Plan the copy of `image` into `destination_dir` under its derived name.
///
/// Depends only on the image and its numbers, never on other images in the
/// batch: two images with the same numbers and extension map to the same file.
pub fn plan_rename(image: &SourceImage, numbers: &NumberSet, destination_dir: &Path) -> RenamePlan {
    RenamePlan {
        source: image.path().to_path_buf(),
        file_name: derive_file_name(numbers, image.extension()),
        destination_dir: destination_dir.to_path_buf(),
    }
}
