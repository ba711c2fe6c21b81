//! Candidate document enumeration and change watching.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

/// Suffix glob that marks a file as an RCS document, applied recursively
/// from the workspace root.
pub const DOCUMENT_GLOB: &str = "**/*.rcs.json";
/// Enumeration cap; larger workspaces are truncated.
pub const MAX_MATCHES: usize = 1000;

/// A filesystem event on a watched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Deleted(PathBuf),
    Changed(PathBuf),
}

/// Enumerates the documents currently present under a workspace.
pub trait DocumentIndex: Send + Sync + 'static {
    /// All current matches, sorted, capped at [`MAX_MATCHES`].
    fn enumerate(&self) -> Vec<PathBuf>;
}

/// mtime + size pair used to detect content changes between scans.
type Fingerprint = (SystemTime, u64);

/// Index over the real filesystem, matching the fixed suffix glob.
pub struct WorkspaceIndex {
    root: PathBuf,
    matcher: globset::GlobSet,
}

impl WorkspaceIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let glob = globset::GlobBuilder::new(DOCUMENT_GLOB)
            .literal_separator(false)
            .build()
            .expect("document glob is valid");
        let mut builder = globset::GlobSetBuilder::new();
        builder.add(glob);
        Self {
            root: root.into(),
            matcher: builder.build().expect("document glob set is valid"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the workspace and fingerprint every match.
    fn scan(&self) -> Vec<(PathBuf, Fingerprint)> {
        let walker = ignore::WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        let mut matches: Vec<(PathBuf, Fingerprint)> = Vec::new();
        for entry in walker {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let Ok(rel) = path.strip_prefix(&self.root) else {
                continue;
            };
            if self.matcher.is_match(rel) {
                let meta = path.metadata().ok();
                let mtime = meta
                    .as_ref()
                    .and_then(|m| m.modified().ok())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                let len = meta.map(|m| m.len()).unwrap_or_default();
                matches.push((path.to_path_buf(), (mtime, len)));
            }
        }

        matches.sort_by(|a, b| a.0.cmp(&b.0));
        matches.truncate(MAX_MATCHES);
        matches
    }

    fn snapshot(&self) -> HashMap<PathBuf, Fingerprint> {
        self.scan().into_iter().collect()
    }
}

impl DocumentIndex for WorkspaceIndex {
    fn enumerate(&self) -> Vec<PathBuf> {
        self.scan().into_iter().map(|(p, _)| p).collect()
    }
}

/// Polls the index on an interval and emits create/delete/change events.
///
/// The poll loop is aborted when the watcher is dropped; receivers see the
/// channel close.
pub struct PollWatcher {
    handle: JoinHandle<()>,
}

impl PollWatcher {
    /// Spawn the poll loop. Events arrive on the returned receiver in
    /// sorted-path order within each tick.
    pub fn spawn(
        index: Arc<WorkspaceIndex>,
        interval: Duration,
    ) -> (Self, UnboundedReceiver<WatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        // Baseline before returning: everything mutated after spawn() is
        // guaranteed to be diffed against this snapshot.
        let mut seen = index.snapshot();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let current = index.snapshot();

                let mut paths: Vec<&PathBuf> = current.keys().collect();
                paths.sort();
                for path in paths {
                    let event = match seen.get(path) {
                        None => WatchEvent::Created(path.clone()),
                        Some(prev) if *prev != current[path] => {
                            WatchEvent::Changed(path.clone())
                        }
                        Some(_) => continue,
                    };
                    if tx.send(event).is_err() {
                        return;
                    }
                }

                let mut gone: Vec<&PathBuf> =
                    seen.keys().filter(|p| !current.contains_key(*p)).collect();
                gone.sort();
                for path in gone {
                    if tx.send(WatchEvent::Deleted(path.clone())).is_err() {
                        return;
                    }
                }

                seen = current;
            }
        });
        (Self { handle }, rx)
    }
}

impl Drop for PollWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const POLL: Duration = Duration::from_millis(20);
    const WAIT: Duration = Duration::from_secs(2);

    async fn next_event(rx: &mut UnboundedReceiver<WatchEvent>) -> WatchEvent {
        tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("watch event within timeout")
            .expect("watch channel open")
    }

    #[test]
    fn enumerate_matches_suffix_only() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.rcs.json"), "{}").unwrap();
        std::fs::write(dir.path().join("sub/b.rcs.json"), "{}").unwrap();
        std::fs::write(dir.path().join("plain.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let index = WorkspaceIndex::new(dir.path());
        let paths = index.enumerate();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.rcs.json"));
        assert!(paths[1].ends_with("sub/b.rcs.json"));
    }

    #[test]
    fn enumerate_is_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["c.rcs.json", "a.rcs.json", "b.rcs.json"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        let index = WorkspaceIndex::new(dir.path());
        let paths = index.enumerate();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[tokio::test]
    async fn poll_emits_created() {
        let dir = TempDir::new().unwrap();
        let index = Arc::new(WorkspaceIndex::new(dir.path()));
        let (_watcher, mut rx) = PollWatcher::spawn(index, POLL);

        let path = dir.path().join("new.rcs.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(next_event(&mut rx).await, WatchEvent::Created(path));
    }

    #[tokio::test]
    async fn poll_emits_changed_and_deleted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.rcs.json");
        std::fs::write(&path, "{}").unwrap();

        let index = Arc::new(WorkspaceIndex::new(dir.path()));
        let (_watcher, mut rx) = PollWatcher::spawn(index, POLL);

        // Different length guarantees a fingerprint change even on
        // coarse-grained mtime filesystems.
        std::fs::write(&path, "{\"text\":\"hi\"}").unwrap();
        assert_eq!(next_event(&mut rx).await, WatchEvent::Changed(path.clone()));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(next_event(&mut rx).await, WatchEvent::Deleted(path));
    }

    #[tokio::test]
    async fn poll_is_silent_for_unchanged_tree() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("doc.rcs.json"), "{}").unwrap();

        let index = Arc::new(WorkspaceIndex::new(dir.path()));
        let (_watcher, mut rx) = PollWatcher::spawn(index, POLL);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }
}
