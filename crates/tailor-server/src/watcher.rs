//! File watching for rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period after the last change before a batch is emitted.
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// A batch of changed paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchEvent {
    pub paths: Vec<PathBuf>,
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `paths` recursively, ignoring changes beneath any of `ignored`.
    ///
    /// A path that does not exist yet is covered by watching its nearest
    /// existing ancestor, with events narrowed to the path itself. Returns the
    /// watcher and a channel that receives one event per burst of changes.
    pub fn new(
        paths: &[PathBuf],
        ignored: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        let mut scope = Scope {
            targets: Vec::new(),
            ignored: ignored.to_vec(),
        };
        let mut watched: Vec<PathBuf> = Vec::new();

        for path in paths {
            let root = if path.exists() {
                path.clone()
            } else {
                let Some(ancestor) = nearest_existing_ancestor(path) else {
                    tracing::debug!("Not watching {}: no existing parent", path.display());
                    continue;
                };
                tracing::debug!(
                    "{} does not exist yet, watching {}",
                    path.display(),
                    ancestor.display()
                );
                ancestor
            };
            scope.targets.push(path.clone());

            if watched.iter().any(|w| root.starts_with(w)) {
                continue;
            }
            watcher
                .watch(&root, RecursiveMode::Recursive)
                .map_err(std::io::Error::other)?;
            tracing::debug!("Watching {}", root.display());
            watched.push(root);
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                let mut batch = WatchEvent::default();
                collect(&mut batch, first, &scope);

                // Drain until the burst settles.
                while let Ok(event) = sync_rx.recv_timeout(DEBOUNCE) {
                    collect(&mut batch, event, &scope);
                }

                if batch.paths.is_empty() {
                    continue;
                }
                if async_tx.blocking_send(batch).is_err() {
                    break;
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Which changed paths are reported.
#[derive(Debug, Clone, Default)]
struct Scope {
    /// Declared paths; a change must fall beneath one of them
    targets: Vec<PathBuf>,
    ignored: Vec<PathBuf>,
}

impl Scope {
    fn accepts(&self, path: &Path) -> bool {
        !self.ignored.iter().any(|dir| path.starts_with(dir))
            && self.targets.iter().any(|target| path.starts_with(target))
    }
}

fn nearest_existing_ancestor(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .find(|dir| !dir.as_os_str().is_empty() && dir.is_dir())
        .map(Path::to_path_buf)
}

fn collect(batch: &mut WatchEvent, event: notify::Event, scope: &Scope) {
    if !is_change(&event.kind) {
        return;
    }

    for path in event.paths {
        if !scope.accepts(&path) || batch.paths.contains(&path) {
            continue;
        }
        batch.paths.push(path);
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
