use crate::config::GitConfig;
use crate::error::{GitError, GitResult};
use std::fs;
use std::path::{Path, PathBuf};

/// An absolute, filesystem-canonical directory known to contain a `.git`
/// metadata directory at the time it was resolved.
///
/// Handles are never constructed without passing the existence and
/// metadata-directory checks, and are recomputed per call rather than cached
/// across calls: the filesystem may change between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle(PathBuf);

impl RepoHandle {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Resolve and validate a repository path.
///
/// Canonicalization collapses `..` segments and symlinks; the authorization
/// boundary is "must exist and must be a repository", not a prefix check.
/// The resolver deliberately trusts any existing, externally-reachable
/// directory that looks like a repository — it does not sandbox to a single
/// root.
pub fn resolve_repo(repo_path: Option<&str>, config: &GitConfig) -> GitResult<RepoHandle> {
    let raw = repo_path.unwrap_or(&config.default_repo_path);

    let resolved = fs::canonicalize(raw).map_err(|_| GitError::InvalidPath(raw.to_string()))?;

    if !resolved.join(".git").exists() {
        return Err(GitError::RepoNotFound);
    }

    Ok(RepoHandle(resolved))
}

/// Check whether a directory is a git repo without surfacing the error.
pub fn is_repo(path: &str, config: &GitConfig) -> bool {
    resolve_repo(Some(path), config).is_ok()
}
