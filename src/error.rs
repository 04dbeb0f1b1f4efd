use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    // Discovery errors
    #[error("source directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("source path is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("invalid source file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to enumerate source files: {0}")]
    Glob(#[from] glob::GlobError),

    // IO errors
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// True for conditions caused by the configured path rather than file contents.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StoreError::DirectoryNotFound { .. }
                | StoreError::NotADirectory { .. }
                | StoreError::Pattern(_)
        )
    }
}
