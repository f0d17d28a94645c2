//! Repository root discovery and index-directory layout.
//!
//! All persistent artifacts for a repository live under a single hidden
//! directory at its root: `<repo_root>/.tagdex/` containing the SQLite
//! store (`index.db`) and the scratch tags artifact (`tags`).  The layout
//! is held in an [`IndexPaths`] value constructed once per repository
//! root, so multiple repositories can be driven from one process (tests
//! rely on this).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Name of the hidden per-repository index directory.
pub const INDEX_DIR_NAME: &str = ".tagdex";
/// Database file name inside the index directory.
pub const DB_FILE_NAME: &str = "index.db";
/// Tags artifact file name inside the index directory.
pub const TAGS_FILE_NAME: &str = "tags";

/// Resolved filesystem layout for one repository's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    repo_root: PathBuf,
    index_dir: PathBuf,
    db_path: PathBuf,
    tags_path: PathBuf,
}

impl IndexPaths {
    /// Compute the index layout beneath the given repository root.
    ///
    /// Purely computational; nothing is created on disk until
    /// [`IndexPaths::ensure_index_dir`] is called.
    pub fn new<P: AsRef<Path>>(repo_root: P) -> Self {
        let repo_root = repo_root.as_ref().to_path_buf();
        let index_dir = repo_root.join(INDEX_DIR_NAME);
        let db_path = index_dir.join(DB_FILE_NAME);
        let tags_path = index_dir.join(TAGS_FILE_NAME);
        Self {
            repo_root,
            index_dir,
            db_path,
            tags_path,
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn tags_path(&self) -> &Path {
        &self.tags_path
    }

    /// Create the index directory (and parents) if it does not exist yet.
    /// Idempotent.
    pub fn ensure_index_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.index_dir)
            .with_context(|| format!("creating index directory {}", self.index_dir.display()))
    }

    /// Whether the store file exists (the index may still be empty).
    pub fn store_exists(&self) -> bool {
        self.db_path.exists()
    }
}

/// Walk upwards from `start` looking for a `.git` directory or `.tagdex`
/// directory.  Returns the directory that contains the marker.
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    // Canonicalize so we don't get stuck in symlink loops, but tolerate
    // failure (e.g. non-existent trailing component).
    if let Ok(canon) = fs::canonicalize(&current) {
        current = canon;
    }
    loop {
        if current.join(".git").exists() || current.join(INDEX_DIR_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            bail!(
                "could not find repository root (no .git or .tagdex) starting from {}",
                start.display()
            );
        }
    }
}
