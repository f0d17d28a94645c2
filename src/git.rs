//! Version-control signals via the `git` subprocess.
//!
//! The engine asks git for exactly two things: the set of paths changed
//! since the last commit (drives the incremental-update decision) and the
//! current branch name (context for `stats`).  Both calls run under a
//! short timeout; any failure is surfaced as an error or `None` so the
//! caller can take the conservative path (full rebuild / "no info").

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::exec::{ExecError, run_with_timeout};

/// Timeout for all git queries.  These are cheap metadata calls.
const GIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Paths changed relative to the last commit (modified, added, renamed,
/// untracked), repo-relative with forward slashes.
pub fn changed_files(repo_root: &Path) -> Result<Vec<String>, ExecError> {
    let out = run_with_timeout(
        Command::new("git")
            .arg("status")
            .arg("--porcelain")
            .current_dir(repo_root),
        GIT_TIMEOUT,
    )?;
    Ok(parse_porcelain(&out.stdout))
}

/// Raw porcelain status output, used by watch mode as a change
/// fingerprint between polls.  `None` when git is unavailable.
pub fn status_fingerprint(repo_root: &Path) -> Option<String> {
    run_with_timeout(
        Command::new("git")
            .arg("status")
            .arg("--porcelain")
            .current_dir(repo_root),
        GIT_TIMEOUT,
    )
    .ok()
    .map(|out| out.stdout)
}

/// Current branch name, or `None` when it cannot be determined.
pub fn current_branch(repo_root: &Path) -> Option<String> {
    let out = run_with_timeout(
        Command::new("git")
            .arg("rev-parse")
            .arg("--abbrev-ref")
            .arg("HEAD")
            .current_dir(repo_root),
        GIT_TIMEOUT,
    )
    .ok()?;
    let branch = out.stdout.trim().to_string();
    if branch.is_empty() { None } else { Some(branch) }
}

/// Parse `git status --porcelain` output into a list of paths.
///
/// Each line is `XY <path>` with a two-character status code; renames
/// carry `old -> new` and only the new path is kept.
fn parse_porcelain(stdout: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for line in stdout.lines() {
        if line.len() < 4 {
            continue;
        }
        let path_part = line[3..].trim();
        let path = if let Some(idx) = path_part.find(" -> ") {
            &path_part[idx + 4..]
        } else {
            path_part
        };
        if path.is_empty() {
            continue;
        }
        paths.push(path.replace('\\', "/"));
    }
    paths
}
