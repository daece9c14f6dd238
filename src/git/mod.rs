/*!
 * Git repository discovery
 *
 * Ignore files are also picked up from the root of the repository that
 * contains the packed folder, so the folder's enclosing work tree has to be
 * located first.
 */

mod error;

pub use error::{GitError, GitResult};

use std::fs;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};

/// Find the work tree root of the repository containing `path`.
///
/// Returns `Ok(None)` when `path` is not inside a repository.
pub fn find_git_root(path: &Path) -> GitResult<Option<PathBuf>> {
    let path = fs::canonicalize(path)?;

    let repo = match Repository::discover(&path) {
        Ok(repo) => repo,
        Err(e) if e.code() == ErrorCode::NotFound => {
            log::debug!("Not a git repository: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiscoverError(e)),
    };

    let workdir = repo
        .workdir()
        .ok_or_else(|| GitError::Bare(repo.path().to_path_buf()))?;

    // git2 reports the work tree with a trailing separator
    let root = fs::canonicalize(workdir)?;
    log::debug!("Git root found: {}", root.display());

    Ok(Some(root))
}

/// Name used for `{repo_name}` in output names
pub fn repo_name(git_root: Option<&Path>, index_path: &Path) -> String {
    git_root
        .unwrap_or(index_path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string())
}
