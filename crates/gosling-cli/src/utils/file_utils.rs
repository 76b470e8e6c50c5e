//! File and path utilities

use crate::{CliError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Utilities for working with files and paths
pub struct FileUtils;

impl FileUtils {
    /// Find all files matching a pattern in a directory
    pub fn find_files(
        dir: &Path,
        include_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Result<Vec<PathBuf>> {
        let include_set = Self::build_glob_set(include_patterns)?;
        let exclude_set = Self::build_glob_set(exclude_patterns)?;

        let mut files = Vec::new();

        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|e| CliError::Io(e.into()))?;
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = path
                .strip_prefix(dir)
                .map_err(|_| CliError::InvalidInput("Invalid path structure".to_string()))?;

            if !include_patterns.is_empty() && !include_set.is_match(relative_path) {
                continue;
            }

            if !exclude_patterns.is_empty() && exclude_set.is_match(relative_path) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    /// Non-recursive listing of the input programs in a directory, filtered
    /// by extension. No ordering is imposed here.
    pub fn find_source_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(CliError::Io)?;
        let files = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().map_or(false, |e| e == ext))
            .collect();
        Ok(files)
    }

    /// Ensure a directory exists, creating it if necessary
    pub fn ensure_dir_exists(dir: &Path) -> Result<()> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(CliError::Io)?;
        }
        Ok(())
    }

    /// Build a GlobSet from a list of patterns
    fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                CliError::InvalidInput(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }

        builder
            .build()
            .map_err(|e| CliError::InvalidInput(format!("Failed to build glob set: {}", e)))
    }
}

/// Sort key for batch inputs: every digit character in the file name,
/// concatenated and parsed as one integer, so `test2.go` precedes
/// `test10.go`. Names without digits sort first.
pub fn numeric_sort_key(name: &str) -> u64 {
    let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_numeric_sort_key_ordering() {
        let mut names = vec!["test10.go", "test2.go", "test1.go"];
        names.sort_by_key(|name| numeric_sort_key(name));
        assert_eq!(names, vec!["test1.go", "test2.go", "test10.go"]);
    }

    #[test]
    fn test_numeric_sort_key_edge_cases() {
        assert_eq!(numeric_sort_key("nodigits.go"), 0);
        // Digits are concatenated across the whole name, extension included.
        assert_eq!(numeric_sort_key("a1b2.go"), 12);
        // Absurdly long digit runs saturate instead of panicking.
        assert_eq!(numeric_sort_key("99999999999999999999999.go"), u64::MAX);
    }

    #[test]
    fn test_find_source_files_filters_extension() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("test1.go"), "package main").unwrap();
        fs::write(root.join("test2.go"), "package main").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let files = FileUtils::find_source_files(root, "go").unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_find_files_with_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("test1.go"), "").unwrap();
        fs::write(root.join("test2.go"), "").unwrap();
        fs::write(root.join("helper.go"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let files = FileUtils::find_files(root, &["test*.go".to_string()], &[]).unwrap();
        assert_eq!(files.len(), 2);

        let files =
            FileUtils::find_files(root, &["*.go".to_string()], &["helper*".to_string()]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_ensure_dir_exists_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("outputs");

        FileUtils::ensure_dir_exists(&target).unwrap();
        assert!(target.is_dir());
        FileUtils::ensure_dir_exists(&target).unwrap();
        assert!(target.is_dir());
    }
}
