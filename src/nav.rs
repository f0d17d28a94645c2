//! Navigation lookup: free-text task descriptions to best-guess symbols.
//!
//! This is the one entry point other tools call in-process, as a
//! zero-cost first pass before any higher-cost reasoning step.  Task
//! descriptions are noisy prose, so matching is deliberately broader
//! than the query engine's: stop-words and short tokens are discarded
//! and the survivors are OR-joined for recall.

use anyhow::Result;
use serde::Serialize;

use crate::db;
use crate::paths::IndexPaths;

/// Common prose words that carry no signal for symbol lookup.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "from", "into", "when", "where", "what",
    "how", "why", "can", "should", "would", "will", "not", "are", "was", "were", "has",
    "have", "had", "does", "did", "then", "than", "all", "any", "each", "out", "about",
    "add", "fix", "make", "use", "using", "new", "get", "set", "need", "needs", "want",
    "code", "file", "files", "function", "method", "class",
];

/// Minimum token length kept after stop-word filtering.
const MIN_TOKEN_LEN: usize = 3;

/// One best-guess navigation hit, shaped for downstream task-routing
/// callers (same fields a reasoning-engine result carries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavHit {
    pub file: String,
    pub name: String,
    pub line: u64,
    pub kind: String,
}

/// Map a free-text task description to ranked symbol hits.
///
/// Returns `None` when no index store exists (callers may build one or
/// skip the fallback), when no discriminating tokens survive filtering,
/// or when the index has no matches.  The store-absent and no-hits cases
/// are distinct internally (early return vs post-query) even though
/// callers currently collapse both to `None`.
pub fn navigate(paths: &IndexPaths, task: &str, limit: usize) -> Result<Option<Vec<NavHit>>> {
    if !paths.store_exists() {
        return Ok(None);
    }

    let tokens = discriminating_tokens(task);
    if tokens.is_empty() {
        return Ok(None);
    }

    let expression = tokens
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(" OR ");

    let conn = db::open_existing(paths.db_path())?;
    let mut stmt = conn.prepare(
        "SELECT file, name, line, kind FROM symbols
         WHERE symbols MATCH ?1
         ORDER BY rank
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(rusqlite::params![expression, limit as i64], |row| {
        let line: String = row.get(2)?;
        Ok(NavHit {
            file: row.get(0)?,
            name: row.get(1)?,
            line: line.parse().unwrap_or(0),
            kind: row.get(3)?,
        })
    });

    // Relaxed OR expressions over filtered tokens are well-formed, but a
    // match failure still degrades to "no hits" rather than erroring.
    let hits: Vec<NavHit> = match rows {
        Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
        Err(_) => Vec::new(),
    };

    if hits.is_empty() {
        return Ok(None);
    }
    Ok(Some(hits))
}

/// Lowercased tokens with stop-words and short tokens removed.
fn discriminating_tokens(task: &str) -> Vec<String> {
    task.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .map(|t| t.to_lowercase())
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}
