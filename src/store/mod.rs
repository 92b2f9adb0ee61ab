//! Transactional in-memory database with optional JSON persistence.
//!
//! Uses `arc-swap` for lock-free reads and atomic snapshot replacement:
//!
//! - Readers call [`Database::read`] and keep an `Arc<Snapshot>` for as
//!   long as they need a consistent view.
//! - Writers run inside [`Database::write`]. They are serialized by a
//!   mutex, mutate a private clone, and publish it only on success. An
//!   error anywhere in the closure (or while persisting) discards the
//!   clone, so no partial write is ever visible.

mod index;
mod persist;
mod snapshot;

pub use snapshot::Snapshot;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::debug;
use crate::error::Result;

pub struct Database {
    current: ArcSwap<Snapshot>,
    writer: Mutex<()>,
    path: Option<PathBuf>,
}

impl Database {
    /// A database that lives only in memory.
    pub fn in_memory() -> Self {
        Self::with_snapshot(Snapshot::new(), None)
    }

    /// Open the snapshot file at `path`, starting empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            let snapshot = persist::load(&path)?;
            debug!("store"; "loaded {} from {}", crate::utils::plural_count(snapshot.node_count(), "node"), path.display());
            snapshot
        } else {
            debug!("store"; "{} not found, starting empty", path.display());
            Snapshot::new()
        };
        Ok(Self::with_snapshot(snapshot, Some(path)))
    }

    pub fn with_snapshot(snapshot: Snapshot, path: Option<PathBuf>) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            writer: Mutex::new(()),
            path,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current published snapshot.
    #[inline]
    pub fn read(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Run `f` as one atomic write.
    ///
    /// Concurrent writers queue on the writer lock, so `f` always starts
    /// from the latest committed state and may re-check anything it read
    /// earlier through [`read`](Self::read).
    pub fn write<T>(&self, f: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let _guard = self.writer.lock();
        let mut next = Snapshot::clone(&self.current.load());
        let output = f(&mut next)?;
        if let Some(path) = &self.path {
            persist::save(path, &next)?;
        }
        self.current.store(Arc::new(next));
        Ok(output)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureError;
    use crate::model::NodeId;
    use crate::testing::node;
    use tempfile::TempDir;

    #[test]
    fn test_failed_write_publishes_nothing() {
        let db = Database::in_memory();
        let result: Result<()> = db.write(|snap| {
            snap.insert_node(node(1, 1, 2));
            Err(StructureError::Unsupported("abort".into()))
        });
        assert!(result.is_err());
        assert!(db.read().is_empty());
    }

    #[test]
    fn test_readers_keep_old_snapshot() {
        let db = Database::in_memory();
        let before = db.read();
        db.write(|snap| {
            snap.insert_node(node(1, 1, 2));
            Ok(())
        })
        .unwrap();
        assert!(before.is_empty());
        assert_eq!(db.read().node_count(), 1);
    }

    #[test]
    fn test_writes_are_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("structure.json");
        {
            let db = Database::open(&path).unwrap();
            db.write(|snap| {
                snap.insert_node(node(1, 1, 2));
                Ok(())
            })
            .unwrap();
        }
        let reopened = Database::open(&path).unwrap();
        assert!(reopened.read().node(NodeId(1)).is_some());
    }

    #[test]
    fn test_concurrent_writers_serialize() {
        let db = Database::in_memory();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..25 {
                        db.write(|snap| {
                            let id = snap.allocate_node_id();
                            snap.insert_node(node(id.0, 1, 2));
                            Ok(())
                        })
                        .unwrap();
                    }
                });
            }
        });
        assert_eq!(db.read().node_count(), 200);
    }
}
