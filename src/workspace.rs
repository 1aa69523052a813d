//! Run-scoped workspace artifacts.
//!
//! Every compile request owns one uniquely named directory under the scratch
//! root holding the grammar, the generated scanner source, the built
//! executable, and the optional stdin file. The directory's lifetime is
//! bounded by its request: created at request start, removed at request end
//! whether the pipeline succeeded or not. Cleanup is best-effort and
//! idempotent; a periodic sweep removes anything a crashed request left
//! behind.

use crate::types::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Grammar source file name inside a workspace.
pub const GRAMMAR_FILE: &str = "input.l";

/// Scanner source the generator emits into the workspace.
pub const GENERATED_FILE: &str = "lex.yy.c";

/// Optional stdin payload for the execute stage.
pub const INPUT_FILE: &str = "input.txt";

/// One request's isolated working directory.
///
/// Owned exclusively by the request that created it; never shared.
pub struct Workspace {
    id: String,
    dir: PathBuf,
}

impl Workspace {
    fn new(scratch_root: &Path) -> Result<Self> {
        let id = Uuid::new_v4().to_string();
        let dir = scratch_root.join(&id);

        fs::create_dir_all(&dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to create workspace {}: {}", dir.display(), e),
            )
        })?;

        Ok(Self { id, dir })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the submitted grammar into the workspace.
    pub fn write_grammar(&self, source: &str) -> Result<PathBuf> {
        self.write_file(GRAMMAR_FILE, source)
    }

    /// Write the optional stdin payload. Requests without input skip this
    /// and the execute stage runs with empty stdin.
    pub fn write_input(&self, input: &str) -> Result<PathBuf> {
        self.write_file(INPUT_FILE, input)
    }

    pub fn input_path(&self) -> PathBuf {
        self.dir.join(INPUT_FILE)
    }

    fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, content).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to write {}: {}", path.display(), e),
            )
        })?;
        Ok(path)
    }

    /// Remove the workspace directory. Idempotent, tolerates "already gone",
    /// and never fails the request.
    pub fn cleanup(&self) {
        if !self.dir.exists() {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            log::warn!("failed to remove workspace {}: {}", self.dir.display(), e);
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Allocates workspaces under a process-wide scratch root.
#[derive(Clone, Debug)]
pub struct WorkspaceManager {
    scratch_root: PathBuf,
}

impl WorkspaceManager {
    /// Create the manager, creating the scratch root if absent.
    pub fn new(scratch_root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&scratch_root).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "failed to create scratch root {}: {}",
                    scratch_root.display(),
                    e
                ),
            )
        })?;

        Ok(Self { scratch_root })
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Allocate a fresh workspace for one request.
    pub fn create(&self) -> Result<Workspace> {
        Workspace::new(&self.scratch_root)
    }

    /// Remove scratch-root entries whose modification time exceeds
    /// `max_age`. Per-entry failures are logged and do not abort the sweep.
    /// Returns the number of entries removed.
    ///
    /// The sweep may run concurrently with in-flight requests; `max_age` is
    /// far above the pipeline budget, so a live workspace is never old
    /// enough to match.
    pub fn sweep(&self, max_age: Duration) -> Result<usize> {
        let mut removed = 0;
        let now = SystemTime::now();

        if !self.scratch_root.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.scratch_root).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "failed to read scratch root {}: {}",
                    self.scratch_root.display(),
                    e
                ),
            )
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("failed to read scratch root entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("failed to stat {}: {}", path.display(), e);
                    continue;
                }
            };

            let age = match now.duration_since(modified) {
                Ok(d) => d,
                Err(_) => continue, // future timestamp, skip
            };
            if age <= max_age {
                continue;
            }

            log::info!("sweeping stale workspace {}", path.display());
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("failed to sweep {}: {}", path.display(), e),
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn test_manager(tag: &str) -> WorkspaceManager {
        let root = env::temp_dir().join(format!("lexbox-test-{}-{}", tag, Uuid::new_v4()));
        WorkspaceManager::new(root).unwrap()
    }

    #[test]
    fn test_create_and_cleanup() {
        let manager = test_manager("create");
        let workspace = manager.create().unwrap();
        assert!(workspace.dir().exists());
        assert!(workspace.dir().starts_with(manager.scratch_root()));

        workspace.cleanup();
        assert!(!workspace.dir().exists());

        // Idempotent: a second cleanup of a gone directory is a no-op.
        workspace.cleanup();

        let _ = fs::remove_dir_all(manager.scratch_root());
    }

    #[test]
    fn test_workspace_ids_are_unique() {
        let manager = test_manager("ids");
        let a = manager.create().unwrap();
        let b = manager.create().unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.dir(), b.dir());

        a.cleanup();
        b.cleanup();
        let _ = fs::remove_dir_all(manager.scratch_root());
    }

    #[test]
    fn test_write_request_files() {
        let manager = test_manager("files");
        let workspace = manager.create().unwrap();

        let grammar = workspace.write_grammar("%%\n%%\n").unwrap();
        assert_eq!(fs::read_to_string(&grammar).unwrap(), "%%\n%%\n");
        assert_eq!(grammar.file_name().unwrap(), GRAMMAR_FILE);

        let input = workspace.write_input("one two\n").unwrap();
        assert_eq!(input, workspace.input_path());
        assert_eq!(fs::read_to_string(&input).unwrap(), "one two\n");

        workspace.cleanup();
        assert!(!grammar.exists());
        let _ = fs::remove_dir_all(manager.scratch_root());
    }

    #[test]
    fn test_cleanup_on_drop() {
        let manager = test_manager("drop");
        let dir = {
            let workspace = manager.create().unwrap();
            workspace.dir().to_path_buf()
        };
        assert!(!dir.exists());
        let _ = fs::remove_dir_all(manager.scratch_root());
    }

    #[test]
    fn test_sweep_removes_only_stale_entries() {
        let manager = test_manager("sweep");
        let stale = manager.create().unwrap();
        let stale_dir = stale.dir().to_path_buf();
        std::mem::forget(stale); // simulate a crashed request that skipped teardown

        std::thread::sleep(Duration::from_millis(50));

        // Nothing is older than an hour yet.
        assert_eq!(manager.sweep(Duration::from_secs(3600)).unwrap(), 0);
        assert!(stale_dir.exists());

        // With a zero threshold the leftover is stale.
        assert_eq!(manager.sweep(Duration::ZERO).unwrap(), 1);
        assert!(!stale_dir.exists());

        let _ = fs::remove_dir_all(manager.scratch_root());
    }

    #[test]
    fn test_sweep_of_missing_root_is_empty() {
        let manager = test_manager("gone");
        fs::remove_dir_all(manager.scratch_root()).unwrap();
        assert_eq!(manager.sweep(Duration::ZERO).unwrap(), 0);
    }
}
