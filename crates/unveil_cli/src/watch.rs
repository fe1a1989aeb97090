//! Re-run on file changes

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

/// Changes arriving within this window trigger a single re-run
const DEBOUNCE: Duration = Duration::from_millis(150);

/// Call `on_change` once up front and again after every change to `paths`
///
/// Returns when the watcher channel closes.
pub fn watch_files(paths: &[&Path], mut on_change: impl FnMut() -> Result<()>) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher: RecommendedWatcher =
        notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })
        .context("failed to create file watcher")?;

    for path in paths {
        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", path.display()))?;
    }

    report_error(on_change());
    tracing::info!(files = paths.len(), "watching for changes");

    while let Ok(res) = rx.recv() {
        if !is_relevant(res) {
            continue;
        }
        // Editors often emit several events per save
        while rx.recv_timeout(DEBOUNCE).is_ok() {}
        tracing::info!("change detected, re-running");
        report_error(on_change());
    }
    Ok(())
}

fn is_relevant(res: notify::Result<Event>) -> bool {
    match res {
        Ok(event) => matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ),
        Err(err) => {
            tracing::warn!(%err, "watch error");
            false
        }
    }
}

fn report_error(result: Result<()>) {
    if let Err(err) = result {
        tracing::error!("{err:#}");
    }
}
