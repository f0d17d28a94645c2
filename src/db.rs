//! SQLite storage layer: connections, FTS5 schema, tag loading, stats.
//!
//! The store holds exactly one FTS5 virtual table, `symbols`, tokenized
//! with `porter unicode61` so queries match both literal and stemmed
//! terms.  The table is dropped and recreated on every build (full
//! replace, never upsert); the loader clears and bulk-inserts within a
//! single transaction.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::errors::IndexError;
use crate::tags::parse_tag_line;

const SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS symbols;
CREATE VIRTUAL TABLE symbols USING fts5(
    name, file, line, kind,
    tokenize = 'porter unicode61'
);
"#;

// ---------------------------------------------------------------------------
// Connection management
// ---------------------------------------------------------------------------

/// Open (or create) the store at `path` and set pragmas.  Creates the
/// parent directory as needed.  Does not touch the schema; builds call
/// [`recreate_schema`] explicitly because schema creation is destructive.
pub fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating index directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("opening database {}", path.display()))?;

    apply_pragmas(&conn).context("setting database pragmas")?;
    Ok(conn)
}

/// Open an **existing** store without creating anything.
pub fn open_existing(path: &Path) -> Result<Connection, IndexError> {
    if !path.exists() {
        return Err(IndexError::NoIndex);
    }
    let conn = Connection::open(path)?;
    apply_pragmas(&conn)?;
    Ok(conn)
}

fn apply_pragmas(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA busy_timeout = 5000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Destructively (re)create the symbols FTS table: drop-if-exists, then
/// create fresh.  Always called immediately before a load.
pub fn recreate_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)
        .context("creating symbols FTS5 table")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tag loading
// ---------------------------------------------------------------------------

/// Load the tags artifact into the symbols table, replacing all prior
/// rows.  Returns the number of records inserted.
///
/// An unreadable artifact yields `Ok(0)` (the table is still cleared):
/// a failed extraction produces a valid-but-empty index, never an error.
/// Individual malformed lines are skipped silently.
pub fn load_tags(conn: &mut Connection, tags_path: &Path, repo_root: &Path) -> Result<usize> {
    let tx = conn.transaction().context("starting load transaction")?;
    tx.execute("DELETE FROM symbols", [])
        .context("clearing symbols table")?;

    let text = match fs::read_to_string(tags_path) {
        Ok(text) => text,
        Err(_) => {
            tx.commit().context("committing empty load")?;
            return Ok(0);
        }
    };

    let mut count = 0usize;
    {
        let mut stmt = tx
            .prepare("INSERT INTO symbols (name, file, line, kind) VALUES (?1, ?2, ?3, ?4)")
            .context("preparing symbol insert")?;
        for line in text.lines() {
            let Some(record) = parse_tag_line(line) else {
                continue;
            };
            let file = normalize_file(&record.file, repo_root);
            stmt.execute(rusqlite::params![
                record.name,
                file,
                record.line.to_string(),
                record.kind.as_str(),
            ])
            .context("inserting symbol row")?;
            count += 1;
        }
    }

    tx.commit().context("committing symbol load")?;
    Ok(count)
}

/// Normalize a tags-file path to a repo-relative form with forward
/// slashes.  ctags emits `./`-prefixed or absolute paths depending on
/// how it was invoked.
fn normalize_file(file: &str, repo_root: &Path) -> String {
    let path = Path::new(file);
    let rel = path
        .strip_prefix(repo_root)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| file.to_string());
    let rel = rel.strip_prefix("./").unwrap_or(&rel);
    rel.replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Number of symbol rows in the store.
pub fn symbol_count(conn: &Connection) -> Result<u64, IndexError> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))?;
    Ok(n.max(0) as u64)
}

/// Number of distinct files with at least one symbol.
pub fn file_count(conn: &Connection) -> Result<u64, IndexError> {
    let n: i64 = conn.query_row("SELECT COUNT(DISTINCT file) FROM symbols", [], |row| {
        row.get(0)
    })?;
    Ok(n.max(0) as u64)
}

/// Store size on disk in megabytes.
pub fn store_size_mb(db_path: &Path) -> f64 {
    fs::metadata(db_path)
        .map(|m| m.len() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}
