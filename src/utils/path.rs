//! Output path helpers

use std::path::{Path, PathBuf};

/// Suffix of the per-input directory that receives split parts
pub const SPLITS_DIR_SUFFIX: &str = "_splits";

/// Keep alphanumerics, space, `-` and `_`, then trim
pub fn safe_stem(stem: &str) -> String {
    stem.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Directory outputs for `input` are written to: the custom directory if
/// given, otherwise the input's parent
pub fn output_base(input: &Path, custom: Option<&Path>) -> PathBuf {
    match custom {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Isolated directory for the parts of one input: `<base>/<safe_stem>_splits`.
///
/// A stem with nothing safe left in it falls back to `video`.
pub fn split_output_dir(input: &Path, stem: &str, custom: Option<&Path>) -> PathBuf {
    let mut safe = safe_stem(stem);
    if safe.is_empty() {
        safe = "video".to_string();
    }
    output_base(input, custom).join(format!("{}{}", safe, SPLITS_DIR_SUFFIX))
}
