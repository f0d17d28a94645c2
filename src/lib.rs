//! tagdex: a ctags-backed code index and search engine.
//!
//! Symbols are extracted by an external ctags-compatible tool, persisted
//! into a SQLite FTS5 store under `<repo>/.tagdex/`, kept coarsely in
//! sync with git, and queried with relevance ranking plus a
//! ripgrep-based content fallback.  [`nav::navigate`] is the in-process
//! entry point for other tools.

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod exec;
pub mod git;
pub mod index;
pub mod nav;
pub mod paths;
pub mod query;
pub mod router;
pub mod search;
pub mod tags;
pub mod walker;
pub mod watch;
