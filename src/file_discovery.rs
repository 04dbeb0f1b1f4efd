use crate::error::{Result, StoreError};
use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default extension of CDR export files
pub const DEFAULT_EXTENSION: &str = "csv";

/// Handles discovery of CDR source files inside a data directory
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    extension: String,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl FileDiscovery {
    pub fn new(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Find every source file directly inside `directory`, sorted by path.
    ///
    /// Subdirectories are not searched. A missing directory is an error; an
    /// existing directory without matching files yields an empty list.
    pub fn find_source_files(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        if !directory.exists() {
            return Err(StoreError::DirectoryNotFound {
                path: directory.to_path_buf(),
            });
        }
        if !directory.is_dir() {
            return Err(StoreError::NotADirectory {
                path: directory.to_path_buf(),
            });
        }

        // Only the `*` stem is a wildcard; brackets or stars in the directory
        // or extension match literally
        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&directory.to_string_lossy()),
            Pattern::escape(&self.extension)
        );
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let mut files = Vec::new();
        for entry in glob_with(&pattern, options)? {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        debug!(
            directory = %directory.display(),
            files = files.len(),
            "Discovered source files"
        );

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_only_matching_extension_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "h\n").unwrap();
        fs::write(dir.path().join("a.csv"), "h\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = FileDiscovery::default()
            .find_source_files(dir.path())
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_extension_match_ignores_case() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("UPPER.CSV"), "h\n").unwrap();

        let files = FileDiscovery::default()
            .find_source_files(dir.path())
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_does_not_recurse() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("deep.csv"), "h\n").unwrap();
        fs::create_dir(dir.path().join("folder.csv")).unwrap();

        let files = FileDiscovery::default()
            .find_source_files(dir.path())
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let err = FileDiscovery::default()
            .find_source_files(&missing)
            .unwrap_err();
        assert!(matches!(err, StoreError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_file_instead_of_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.csv");
        fs::write(&file, "h\n").unwrap();

        let err = FileDiscovery::default().find_source_files(&file).unwrap_err();
        assert!(matches!(err, StoreError::NotADirectory { .. }));
    }

    #[test]
    fn test_extension_metacharacters_match_literally() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "h\n").unwrap();
        fs::write(dir.path().join("b.c[sv"), "h\n").unwrap();

        let star = FileDiscovery::new("*").find_source_files(dir.path()).unwrap();
        assert!(star.is_empty());

        let bracket = FileDiscovery::new("c[sv")
            .find_source_files(dir.path())
            .unwrap();
        assert_eq!(bracket, vec![dir.path().join("b.c[sv")]);
    }

    #[test]
    fn test_custom_extension_strips_leading_dot() {
        let discovery = FileDiscovery::new(".cdr");
        assert_eq!(discovery.extension(), "cdr");
    }
}
