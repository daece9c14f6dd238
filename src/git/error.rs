/*!
 * Error types for Git operations
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during Git operations
#[derive(Error, Debug)]
pub enum GitError {
    /// Error while looking for an enclosing repository
    #[error("Failed to discover repository: {0}")]
    DiscoverError(git2::Error),

    /// Repository has no working tree to pack
    #[error("Repository has no working directory: {0}")]
    Bare(PathBuf),

    /// IO error during Git operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Specialized Result type for Git operations
pub type GitResult<T> = Result<T, GitError>;
