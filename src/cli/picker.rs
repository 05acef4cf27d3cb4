//! Catalog file discovery and path validation.
//!
//! The TUI import dialog cycles through `*.csv` files found under the current
//! working directory; both the TUI and `--*-catalog` flags validate paths here.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, EXIT_INPUT};

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 3;

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Catalog file not found: {}", path.display()),
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        != Some(true)
    {
        return Err(AppError::new(
            EXIT_INPUT,
            format!(
                "Expected a .csv catalog file (got: {}). Export the sheet as CSV first.",
                path.display()
            ),
        ));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
            continue;
        }

        if file_type.is_file() && validate_csv_path(&path).is_ok() {
            out.push(path);
        }
    }
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules" | "debug")
}

/// Path without a leading `./`, for display.
pub fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_and_non_csv_paths() {
        assert!(validate_csv_path(Path::new("no/such/catalog.csv")).is_err());
        assert!(validate_csv_path(Path::new("src")).is_err());
        assert!(validate_csv_path(Path::new("Cargo.toml")).is_err());
    }

    #[test]
    fn pretty_path_strips_dot_prefix() {
        assert_eq!(pretty_path(Path::new("./data/dip.csv")), "data/dip.csv");
        assert_eq!(pretty_path(Path::new("dip.csv")), "dip.csv");
    }
}
