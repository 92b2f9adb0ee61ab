//! JSON snapshot file.
//!
//! The file is rewritten after every committed write: serialized to a
//! sibling temp file first, then renamed over the old one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Snapshot;
use crate::error::{Result, StructureError};
use crate::log;
use crate::model::{ContentAssociation, Node, Translation};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    next_node: u64,
    next_content: u64,
    nodes: Vec<Node>,
    translations: Vec<Translation>,
    contents: Vec<ContentAssociation>,
}

impl From<&Snapshot> for SnapshotFile {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            version: FORMAT_VERSION,
            next_node: snapshot.next_node,
            next_content: snapshot.next_content,
            nodes: snapshot.nodes().cloned().collect(),
            translations: snapshot.translations().cloned().collect(),
            contents: snapshot.contents().cloned().collect(),
        }
    }
}

impl SnapshotFile {
    /// Rebuild a snapshot, dropping rows that point at missing nodes.
    fn into_snapshot(self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for node in self.nodes {
            snapshot.insert_node(node);
        }

        let mut orphans = 0usize;
        for translation in self.translations {
            if snapshot.node(translation.node).is_some() {
                snapshot.upsert_translation(translation);
            } else {
                orphans += 1;
            }
        }
        for content in self.contents {
            if snapshot.node(content.node).is_some() {
                snapshot.insert_content(content);
            } else {
                orphans += 1;
            }
        }
        if orphans > 0 {
            log!("store"; "dropped {} orphaned row{}", orphans, crate::utils::plural_s(orphans));
        }

        snapshot.next_node = snapshot.next_node.max(self.next_node);
        snapshot.next_content = snapshot.next_content.max(self.next_content);
        snapshot
    }
}

/// Read a snapshot file.
pub fn load(path: &Path) -> Result<Snapshot> {
    let content =
        fs::read_to_string(path).map_err(|err| StructureError::Io(path.to_path_buf(), err))?;
    let file: SnapshotFile = serde_json::from_str(&content)?;
    if file.version != FORMAT_VERSION {
        return Err(StructureError::Unsupported(format!(
            "snapshot format version {} (expected {FORMAT_VERSION})",
            file.version
        )));
    }
    Ok(file.into_snapshot())
}

/// Write a snapshot file atomically.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let io_err = |p: &Path| {
        let p = p.to_path_buf();
        move |err| StructureError::Io(p, err)
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let json = serde_json::to_vec_pretty(&SnapshotFile::from(snapshot))?;
    let tmp = temp_path(path);
    {
        let mut file = fs::File::create(&tmp).map_err(io_err(&tmp))?;
        file.write_all(&json).map_err(io_err(&tmp))?;
        file.sync_all().map_err(io_err(&tmp))?;
    }
    fs::rename(&tmp, path).map_err(io_err(path))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
