//! Symbol query engine over the FTS5 store.
//!
//! Free-text queries are normalized into an AND-joined FTS5 boolean
//! expression (every token must match somewhere in the indexed columns)
//! and executed with relevance ranking.  A malformed expression never
//! surfaces to the caller: the engine retries once with a single bare
//! term, then gives up with an empty result.  Wall-clock elapsed time in
//! milliseconds is always reported, including on the empty paths.

use anyhow::Result;
use rusqlite::Connection;
use std::time::Instant;

use crate::db;
use crate::paths::IndexPaths;

/// One ranked symbol hit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct QueryHit {
    pub file: String,
    pub line: u64,
    pub kind: String,
    pub name: String,
}

/// Execute a free-text symbol query, returning ranked hits and elapsed
/// milliseconds.
///
/// An absent store returns `([], 0.0)` immediately; the caller decides
/// whether to prompt for a build.  Queries never mutate the store.
pub fn query_symbols(
    paths: &IndexPaths,
    text: &str,
    limit: usize,
) -> Result<(Vec<QueryHit>, f64)> {
    if !paths.store_exists() {
        return Ok((Vec::new(), 0.0));
    }
    let started = Instant::now();

    let conn = db::open_existing(paths.db_path())?;

    let expression = and_expression(text);
    if expression.is_empty() {
        return Ok((Vec::new(), elapsed_ms(started)));
    }

    let hits = match run_match(&conn, &expression, limit) {
        Ok(hits) => hits,
        // Malformed boolean expression: degrade to a single bare term.
        Err(rusqlite::Error::SqliteFailure(..)) => {
            match bare_term(text) {
                Some(term) => run_match(&conn, &term, limit).unwrap_or_default(),
                None => Vec::new(),
            }
        }
        Err(e) => return Err(e.into()),
    };

    Ok((hits, elapsed_ms(started)))
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

fn run_match(
    conn: &Connection,
    expression: &str,
    limit: usize,
) -> Result<Vec<QueryHit>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT file, line, kind, name FROM symbols
         WHERE symbols MATCH ?1
         ORDER BY rank
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(rusqlite::params![expression, limit as i64], |row| {
        let line: String = row.get(1)?;
        Ok(QueryHit {
            file: row.get(0)?,
            line: line.parse().unwrap_or(0),
            kind: row.get(2)?,
            name: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// Normalize a query into an AND-joined FTS5 expression.  Quote
/// characters are stripped; each surviving whitespace-separated token is
/// wrapped as a quoted phrase.  Returns the empty string when no tokens
/// survive (e.g. punctuation-only input).
fn and_expression(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| *c != '"' && *c != '\'').collect();
    let phrases: Vec<String> = cleaned
        .split_whitespace()
        .map(|tok| format!("\"{tok}\""))
        .collect();
    phrases.join(" AND ")
}

/// Best-effort fallback term: the first token reduced to identifier
/// characters, quoted as a single phrase.
fn bare_term(text: &str) -> Option<String> {
    let first = text.split_whitespace().next()?;
    let stripped: String = first
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if stripped.is_empty() {
        None
    } else {
        Some(format!("\"{stripped}\""))
    }
}
