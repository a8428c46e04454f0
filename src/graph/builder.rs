use crate::extractor::Extractor;
use crate::hasher::hash_symbol;
use crate::matchers::{self, EntryPointMatcher};
use crate::model::{CallSite, FlowGraph, GraphEdge, GraphNode, NodeMetadata, SymbolInfo, symbol_key};
use crate::resolver::{VerifiedConnection, normalize_connection_type};
use crate::util;
use chrono::{SecondsFormat, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const GRAPH_VERSION: &str = "1.0";
pub const DIRECT_CALL: &str = "direct-call";

/// Builds a [`FlowGraph`] for a project from scratch.
///
/// Nodes are keyed `relative/file.ts:name`. Static edges only connect symbols
/// of the same file; calls whose callee is not declared in that file are
/// dropped rather than stored dangling.
pub struct GraphBuilder<'a> {
    project_root: PathBuf,
    extractor: &'a dyn Extractor,
    matchers: Vec<Box<dyn EntryPointMatcher>>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(project_root: &Path, extractor: &'a dyn Extractor) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            extractor,
            matchers: matchers::default_matchers(),
        }
    }

    pub fn with_matchers(mut self, matchers: Vec<Box<dyn EntryPointMatcher>>) -> Self {
        self.matchers = matchers;
        self
    }

    pub fn build(&self, files: &[PathBuf]) -> FlowGraph {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut seen_ids = HashSet::new();

        for file in files {
            let extraction = self.extractor.extract_file(file);
            if !extraction.errors.is_empty() {
                for err in &extraction.errors {
                    tracing::warn!("skip {}: {err}", file.display());
                }
                continue;
            }
            let rel_path = util::relative_path(&self.project_root, file);
            let mut local: HashMap<String, String> = HashMap::new();
            let mut declared = Vec::new();

            for (symbol, calls) in extraction.symbols.into_iter().zip(extraction.call_sites) {
                let symbol = SymbolInfo {
                    file_path: rel_path.clone(),
                    ..symbol
                };
                let id = symbol.key();
                if !seen_ids.insert(id.clone()) {
                    tracing::debug!("duplicate symbol {id}, keeping first");
                    continue;
                }
                local.insert(symbol.name.clone(), id.clone());
                nodes.push(self.node_for(&symbol, id.clone()));
                declared.push((id, calls));
            }

            for (source_id, calls) in &declared {
                edges.extend(static_edges(source_id, calls, &local));
            }
        }

        tracing::info!(
            "built graph: {} nodes, {} edges from {} files",
            nodes.len(),
            edges.len(),
            files.len()
        );
        FlowGraph {
            version: GRAPH_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            nodes,
            edges,
        }
    }

    fn node_for(&self, symbol: &SymbolInfo, id: String) -> GraphNode {
        let entry = matchers::match_entry_point(&self.matchers, symbol);
        let (entry_type, metadata) = match entry {
            Some(found) => {
                let metadata = if found.metadata == NodeMetadata::default() {
                    None
                } else {
                    Some(found.metadata)
                };
                (Some(found.entry_type), metadata)
            }
            None => (None, None),
        };
        GraphNode {
            id,
            name: symbol.name.clone(),
            kind: symbol.kind,
            file_path: symbol.file_path.clone(),
            is_async: symbol.is_async(),
            hash: hash_symbol(symbol),
            line_range: (symbol.start_line, symbol.end_line),
            entry_type,
            metadata,
        }
    }
}

/// `direct-call` edges from one symbol to the same-file symbols it calls.
fn static_edges(
    source_id: &str,
    calls: &[CallSite],
    local: &HashMap<String, String>,
) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    let mut targets = HashSet::new();
    for (order, call) in calls.iter().enumerate() {
        let Some(target_id) = local.get(&call.name) else {
            continue;
        };
        if target_id == source_id || !targets.insert(target_id.clone()) {
            continue;
        }
        edges.push(GraphEdge {
            id: edge_id(source_id, target_id, DIRECT_CALL),
            source: source_id.to_string(),
            target: target_id.clone(),
            edge_type: DIRECT_CALL.to_string(),
            label: None,
            condition: None,
            is_async: call.awaited,
            order: Some(order),
        });
    }
    edges
}

fn edge_id(source: &str, target: &str, edge_type: &str) -> String {
    format!("{source}->{target}#{edge_type}")
}

/// Adds one edge per verified runtime connection to a freshly built graph and
/// returns how many were added. Connections whose endpoints are not nodes of
/// the graph, or that duplicate an existing edge, are skipped.
pub fn merge_verified_connections(
    graph: &mut FlowGraph,
    connections: &[VerifiedConnection],
    project_root: &Path,
) -> usize {
    let node_ids: HashSet<String> = graph.nodes.iter().map(|node| node.id.clone()).collect();
    let mut edge_ids: HashSet<String> = graph.edges.iter().map(|edge| edge.id.clone()).collect();
    let mut added = 0;
    for conn in connections {
        let source = symbol_key(
            &util::relative_path(project_root, Path::new(&conn.source_symbol().file_path)),
            &conn.source_symbol().name,
        );
        let target = symbol_key(
            &util::relative_path(project_root, Path::new(conn.target_file_path())),
            &conn.target_symbol().name,
        );
        if !node_ids.contains(&source) || !node_ids.contains(&target) {
            tracing::debug!("drop runtime edge {source} -> {target}: endpoint not in graph");
            continue;
        }
        let edge_type = normalize_connection_type(&conn.connection().connection_type);
        let id = edge_id(&source, &target, &edge_type);
        if !edge_ids.insert(id.clone()) {
            continue;
        }
        graph.edges.push(GraphEdge {
            id,
            source,
            target,
            edge_type,
            label: Some(conn.connection().target_hint.clone()),
            condition: None,
            is_async: true,
            order: None,
        });
        added += 1;
    }
    added
}
