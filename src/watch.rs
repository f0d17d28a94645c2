//! Watch mode: a fixed-interval polling loop over git status.
//!
//! Each tick takes a `git status --porcelain` fingerprint; when it
//! differs from the previous poll an incremental update runs.  SIGINT /
//! SIGTERM flip an atomic flag and the loop exits cleanly (success, not
//! an error).  Sleeping happens in sub-second slices so interrupts are
//! acted on promptly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};

use crate::config::Config;
use crate::git;
use crate::index;
use crate::paths::IndexPaths;

const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Run the polling loop until interrupted.  `interval` overrides the
/// configured default when set.
pub fn watch(paths: &IndexPaths, config: &Config, interval: Option<u64>) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&stop))
        .context("registering SIGINT handler")?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&stop))
        .context("registering SIGTERM handler")?;

    let interval = Duration::from_secs(interval.unwrap_or(config.watch.interval_secs));
    println!(
        "watching {} (interval {}s, ctrl-c to stop)",
        paths.repo_root().display(),
        interval.as_secs()
    );

    let mut last = git::status_fingerprint(paths.repo_root());
    while !stop.load(Ordering::Relaxed) {
        sleep_interruptibly(&stop, interval);
        if stop.load(Ordering::Relaxed) {
            break;
        }

        let current = git::status_fingerprint(paths.repo_root());
        if current != last {
            let count = index::update(paths, config)?;
            println!("change detected, index updated: {count} symbols");
            last = current;
        }
    }

    println!("watch stopped");
    Ok(())
}

/// Sleep for `total`, waking early when the stop flag is set.
fn sleep_interruptibly(stop: &AtomicBool, total: Duration) {
    let deadline = Instant::now() + total;
    while Instant::now() < deadline && !stop.load(Ordering::Relaxed) {
        std::thread::sleep(SLEEP_SLICE.min(deadline.saturating_duration_since(Instant::now())));
    }
}
