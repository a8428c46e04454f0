use crate::model::FlowGraph;
use crate::util;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const GRAPH_FILE: &str = "graph.json";

/// Single-file snapshot of the graph under the output directory. Writes
/// always replace the previous snapshot.
pub struct GraphStore {
    path: PathBuf,
}

impl GraphStore {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(GRAPH_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, graph: &FlowGraph) -> Result<()> {
        util::ensure_parent_dir(&self.path)?;
        let payload = serde_json::to_string_pretty(graph).context("serialize graph")?;
        fs::write(&self.path, payload).with_context(|| format!("write {}", self.path.display()))
    }

    /// `None` when no snapshot has been written yet.
    pub fn read(&self) -> Result<Option<FlowGraph>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = util::read_to_string(&self.path)?;
        let graph = serde_json::from_str(&raw)
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(Some(graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GraphNode, SymbolKind};

    fn graph(nodes: usize) -> FlowGraph {
        FlowGraph {
            version: "1.0".to_string(),
            generated_at: "2026-01-01T00:00:00.000Z".to_string(),
            nodes: (0..nodes)
                .map(|idx| GraphNode {
                    id: format!("src/a.ts:f{idx}"),
                    name: format!("f{idx}"),
                    kind: SymbolKind::Function,
                    file_path: "src/a.ts".to_string(),
                    is_async: false,
                    hash: "0".repeat(64),
                    line_range: (idx + 1, idx + 1),
                    entry_type: None,
                    metadata: None,
                })
                .collect(),
            edges: Vec::new(),
        }
    }

    #[test]
    fn read_before_write_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::new(&dir.path().join("_syncdocs"));
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn write_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::new(&dir.path().join("_syncdocs"));
        store.write(&graph(3)).unwrap();
        store.write(&graph(1)).unwrap();
        let loaded = store.read().unwrap().unwrap();
        assert_eq!(loaded, graph(1));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"lineRange\""));
        assert!(raw.contains("\"generatedAt\""));
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::new(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(store.read().is_err());
    }
}
