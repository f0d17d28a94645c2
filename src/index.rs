//! Index building and the coarse incremental-update policy.
//!
//! `build` is the from-scratch path: extract tags, recreate the schema,
//! load.  A failed extraction still produces a valid (empty) store.
//!
//! `update` is deliberately coarse: it asks git which files changed since
//! the last commit and either reuses the existing count (no source files
//! touched) or delegates to a full rebuild.  There is no file-level
//! partial reindexing; the query layer assumes whole-store replace
//! semantics.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::errors::IndexError;
use crate::git;
use crate::paths::IndexPaths;
use crate::tags::TagExtractor;
use crate::walker::is_source_file;

/// Full rebuild: returns the number of symbols loaded.
///
/// Extraction failure (tool missing, timeout) is not an error: the store
/// is still created with an empty symbols table and 0 is returned.
pub fn build(paths: &IndexPaths, config: &Config) -> Result<u64> {
    build_with_extractor(paths, &TagExtractor::new(&config.index))
}

/// Full rebuild with a caller-supplied extractor (tests inject one
/// pointed at a nonexistent binary).
pub fn build_with_extractor(paths: &IndexPaths, extractor: &TagExtractor) -> Result<u64> {
    paths.ensure_index_dir()?;

    let extracted = extractor.extract(paths, None);

    let mut conn = db::open(paths.db_path())?;
    db::recreate_schema(&conn)?;

    if !extracted {
        return Ok(0);
    }

    let count = db::load_tags(&mut conn, paths.tags_path(), paths.repo_root())?;
    Ok(count as u64)
}

/// Incremental update: cheaper than a rebuild when nothing relevant
/// changed.  Returns the resulting symbol count.
pub fn update(paths: &IndexPaths, config: &Config) -> Result<u64> {
    let changes = git::changed_files(paths.repo_root()).ok();
    update_with_changes(paths, config, &TagExtractor::new(&config.index), changes)
}

/// The update decision, split from the git call so the policy is
/// testable without a repository:
/// - `None` (git unavailable): conservative full rebuild
/// - `Some` with no source files: reuse the existing count, no extraction
/// - `Some` with source files: full rebuild
fn update_with_changes(
    paths: &IndexPaths,
    config: &Config,
    extractor: &TagExtractor,
    changes: Option<Vec<String>>,
) -> Result<u64> {
    let Some(changed) = changes else {
        return build_with_extractor(paths, extractor);
    };

    let relevant = changed.iter().any(|p| {
        is_source_file(
            std::path::Path::new(p),
            &config.index.additional_extensions,
        )
    });

    if relevant {
        return build_with_extractor(paths, extractor);
    }

    current_count(paths)
}

/// Symbol count of the existing store; 0 when the store is absent.
pub fn current_count(paths: &IndexPaths) -> Result<u64> {
    match db::open_existing(paths.db_path()) {
        Ok(conn) => Ok(db::symbol_count(&conn)?),
        Err(IndexError::NoIndex) => Ok(0),
        Err(e) => Err(e.into()),
    }
}
