//! Configuration file parsing, defaults, and merging.
//!
//! Configuration is loaded in layers (last wins):
//! 1. Built-in defaults
//! 2. Global config from `~/.tagdex/config.toml`
//! 3. Per-repo config from `<repo_root>/.tagdex/config.toml`
//!
//! Each layer only overrides fields it explicitly sets; absent fields
//! are left at their previous value.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Public config types (fully resolved, no Options)
// ---------------------------------------------------------------------------

/// Top-level configuration, fully resolved with defaults applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub index: IndexConfig,
    pub watch: WatchConfig,
}

/// Indexing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Cap on the explicit file list handed to the legacy extraction
    /// strategy.  A performance safeguard, not a correctness invariant.
    pub max_files: usize,
    /// Timeout (seconds) for a full tag extraction run.
    pub extract_timeout_secs: u64,
    /// Extra file extensions to index beyond the built-in source set.
    pub additional_extensions: Vec<String>,
}

/// Watch-mode settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    /// Default polling interval in seconds (CLI `--interval` overrides).
    pub interval_secs: u64,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_files: 10_000,
            extract_timeout_secs: 120,
            additional_extensions: Vec::new(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

// ---------------------------------------------------------------------------
// Option-based overlay types (for partial deserialization)
// ---------------------------------------------------------------------------

/// Mirror of [`Config`] where every field is `Option`, so we can
/// deserialize a partial TOML file and overlay only the keys that are
/// present.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigOverlay {
    index: Option<IndexOverlay>,
    watch: Option<WatchOverlay>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct IndexOverlay {
    max_files: Option<usize>,
    extract_timeout_secs: Option<u64>,
    additional_extensions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WatchOverlay {
    interval_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Merge helpers
// ---------------------------------------------------------------------------

impl Config {
    /// Apply an overlay on top of this config, replacing only the fields
    /// that are `Some` in the overlay.
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(i) = overlay.index {
            if let Some(v) = i.max_files {
                self.index.max_files = v;
            }
            if let Some(v) = i.extract_timeout_secs {
                self.index.extract_timeout_secs = v;
            }
            if let Some(v) = i.additional_extensions {
                self.index.additional_extensions = v;
            }
        }
        if let Some(w) = overlay.watch {
            if let Some(v) = w.interval_secs {
                self.watch.interval_secs = v;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse a single TOML config file into an overlay.
fn parse_overlay(path: &Path) -> Result<ConfigOverlay> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".tagdex").join("config.toml"))
}

/// Load the fully resolved configuration for a repository.
///
/// Missing config files are normal (defaults apply); a file that exists
/// but fails to parse is an error so misconfiguration surfaces instead of
/// being silently ignored.
pub fn load(repo_root: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global) = global_config_path() {
        if global.exists() {
            config.apply_overlay(parse_overlay(&global)?);
        }
    }

    let repo = repo_root.join(".tagdex").join("config.toml");
    if repo.exists() {
        config.apply_overlay(parse_overlay(&repo)?);
    }

    Ok(config)
}
