//! Command dispatch: the thin glue between the CLI and the engine.
//!
//! Each subcommand resolves the repository root, loads configuration and
//! calls into the engine; this layer owns all printing (grep-style lines
//! or `--json`) and converts engine outcomes into exit codes via
//! [`TagdexError`].

use std::collections::HashSet;

use serde::Serialize;

use crate::cli::{Cli, Command, QueryArgs};
use crate::config::{self, Config};
use crate::db;
use crate::errors::{IndexError, TagdexError};
use crate::git;
use crate::index;
use crate::paths::{IndexPaths, find_repo_root};
use crate::query::{QueryHit, query_symbols};
use crate::search::{GrepHit, content_search};
use crate::watch;

pub fn dispatch(cli: Cli) -> Result<(), TagdexError> {
    let cwd = std::env::current_dir()?;
    let root = find_repo_root(&cwd)?;
    let paths = IndexPaths::new(&root);
    let config = config::load(&root)?;

    match cli.command {
        Command::Build => run_build(&paths, &config, cli.json),
        Command::Update => run_update(&paths, &config, cli.json),
        Command::Query(args) => run_query(&paths, &args, cli.json),
        Command::Watch(args) => Ok(watch::watch(&paths, &config, args.interval)?),
        Command::Stats => run_stats(&paths, cli.json),
    }
}

// ---------------------------------------------------------------------------
// build / update
// ---------------------------------------------------------------------------

fn run_build(paths: &IndexPaths, config: &Config, json: bool) -> Result<(), TagdexError> {
    let count = index::build(paths, config)?;
    if json {
        print_json(&serde_json::json!({
            "symbols": count,
            "index_dir": paths.index_dir().display().to_string(),
        }));
    } else {
        println!(
            "indexed {count} symbols -> {}",
            paths.index_dir().display()
        );
    }
    Ok(())
}

fn run_update(paths: &IndexPaths, config: &Config, json: bool) -> Result<(), TagdexError> {
    let count = index::update(paths, config)?;
    if json {
        print_json(&serde_json::json!({ "symbols": count }));
    } else {
        println!("index up to date: {count} symbols");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

/// A query hit from either source, deduplicated by `(file, line)`.
#[derive(Debug, Serialize)]
struct MergedHit {
    file: String,
    line: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snippet: Option<String>,
}

fn run_query(paths: &IndexPaths, args: &QueryArgs, json: bool) -> Result<(), TagdexError> {
    if !paths.store_exists() {
        return Err(IndexError::NoIndex.into());
    }

    let (symbol_hits, elapsed_ms) = query_symbols(paths, &args.text, args.limit)?;
    let grep_hits = if args.no_grep {
        Vec::new()
    } else {
        content_search(paths.repo_root(), &args.text, args.limit)
    };

    let merged = merge_hits(symbol_hits, grep_hits, args.limit);

    if json {
        print_json(&serde_json::json!({
            "query": args.text,
            "elapsed_ms": elapsed_ms,
            "hits": merged,
        }));
        return Ok(());
    }

    if merged.is_empty() {
        println!("no matches ({elapsed_ms:.1} ms)");
        return Ok(());
    }
    for hit in &merged {
        match (&hit.kind, &hit.name, &hit.snippet) {
            (Some(kind), Some(name), _) => {
                println!("{}:{}: [{kind}] {name}", hit.file, hit.line)
            }
            (_, _, Some(snippet)) => println!("{}:{}: {}", hit.file, hit.line, snippet.trim()),
            _ => println!("{}:{}", hit.file, hit.line),
        }
    }
    println!("{} hits ({elapsed_ms:.1} ms)", merged.len());
    Ok(())
}

/// Merge symbol and grep hits, deduplicated by `(file, line)`.  Symbol
/// hits win: they carry kind and name.
fn merge_hits(symbols: Vec<QueryHit>, grep: Vec<GrepHit>, limit: usize) -> Vec<MergedHit> {
    let mut seen: HashSet<(String, u64)> = HashSet::new();
    let mut merged = Vec::new();

    for h in symbols {
        if merged.len() >= limit {
            break;
        }
        if seen.insert((h.file.clone(), h.line)) {
            merged.push(MergedHit {
                file: h.file,
                line: h.line,
                kind: Some(h.kind),
                name: Some(h.name),
                snippet: None,
            });
        }
    }
    for h in grep {
        if merged.len() >= limit {
            break;
        }
        if seen.insert((h.file.clone(), h.line)) {
            merged.push(MergedHit {
                file: h.file,
                line: h.line,
                kind: None,
                name: None,
                snippet: Some(h.snippet),
            });
        }
    }
    merged
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

fn run_stats(paths: &IndexPaths, json: bool) -> Result<(), TagdexError> {
    let conn = db::open_existing(paths.db_path())?;
    let symbols = db::symbol_count(&conn)?;
    let files = db::file_count(&conn)?;
    let size_mb = db::store_size_mb(paths.db_path());
    let branch = git::current_branch(paths.repo_root());

    if json {
        print_json(&serde_json::json!({
            "symbols": symbols,
            "files": files,
            "store_size_mb": size_mb,
            "branch": branch,
        }));
    } else {
        println!("symbols:    {symbols}");
        println!("files:      {files}");
        println!("store size: {size_mb:.2} MB");
        if let Some(branch) = branch {
            println!("branch:     {branch}");
        }
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}
