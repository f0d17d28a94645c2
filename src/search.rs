//! Content-search fallback via an external ripgrep-compatible tool.
//!
//! Symbol search only sees definitions; this secondary source greps file
//! contents for the literal query so callers can surface call sites and
//! string matches alongside symbol hits.  The tool is probed first and
//! every failure class (missing binary, timeout, non-zero exit,
//! unparsable output lines) degrades to an empty result list.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::exec::run_with_timeout;
use crate::walker;

/// Probe timeout for `rg --version`.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
/// Timeout for the search itself.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(2);

/// One matching content line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GrepHit {
    pub file: String,
    pub line: u64,
    pub snippet: String,
}

/// Grep the repository for the literal query string.
///
/// Restricted to source files, line-numbered, zero context lines,
/// truncated to `limit`.  Never errors: an unusable tool yields an empty
/// list.
pub fn content_search(repo_root: &Path, query: &str, limit: usize) -> Vec<GrepHit> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    if !rg_available() {
        return Vec::new();
    }

    let mut cmd = Command::new("rg");
    cmd.arg("--line-number")
        .arg("--no-heading")
        .arg("--with-filename")
        .arg("--fixed-strings");
    for glob in source_globs() {
        cmd.arg("--glob").arg(glob);
    }
    cmd.arg("--").arg(query).arg(".").current_dir(repo_root);

    let out = match run_with_timeout(&mut cmd, SEARCH_TIMEOUT) {
        Ok(out) => out,
        Err(_) => return Vec::new(),
    };

    parse_grep_output(&out.stdout, limit)
}

fn rg_available() -> bool {
    run_with_timeout(Command::new("rg").arg("--version"), PROBE_TIMEOUT).is_ok()
}

/// Glob filters restricting the grep to indexable source files.
fn source_globs() -> Vec<String> {
    walker::source_extension_globs()
}

/// Parse `file:line:snippet` output lines.  Lines whose line-number
/// field is not an integer are skipped.
fn parse_grep_output(stdout: &str, limit: usize) -> Vec<GrepHit> {
    let mut hits = Vec::new();
    for raw in stdout.lines() {
        if hits.len() >= limit {
            break;
        }
        let mut parts = raw.splitn(3, ':');
        let (Some(file), Some(line), Some(snippet)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let Ok(line) = line.parse::<u64>() else {
            continue;
        };
        let file = file.strip_prefix("./").unwrap_or(file);
        hits.push(GrepHit {
            file: file.to_string(),
            line,
            snippet: snippet.to_string(),
        });
    }
    hits
}
