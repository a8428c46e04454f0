use crate::model::{FlowGraph, GraphEdge, GraphNode};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Subgraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusTargets {
    pub node_ids: Vec<String>,
    pub unresolved: Vec<String>,
}

pub fn entry_points(graph: &FlowGraph) -> Vec<&GraphNode> {
    graph
        .nodes
        .iter()
        .filter(|node| node.entry_type.is_some())
        .collect()
}

/// Everything reachable from `start` by following edges forward, plus the
/// edges whose both ends were reached. Nodes come back in visit order.
pub fn reachable_from(graph: &FlowGraph, start: &str) -> Subgraph {
    let adjacency = adjacency(graph);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut order: Vec<&str> = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(start);
    order.push(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for &next in adjacency.get(current).into_iter().flatten() {
            if visited.insert(next) {
                order.push(next);
                queue.push_back(next);
            }
        }
    }

    let by_id: HashMap<&str, &GraphNode> =
        graph.nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let nodes = order
        .iter()
        .filter_map(|id| by_id.get(id).map(|node| (*node).clone()))
        .collect();
    let edges = graph
        .edges
        .iter()
        .filter(|edge| visited.contains(edge.source.as_str()) && visited.contains(edge.target.as_str()))
        .cloned()
        .collect();
    Subgraph { nodes, edges }
}

/// Simple paths from `from` to `to` (node ids, both ends included), at most
/// `max_paths` of them, in depth-first discovery order.
pub fn paths_between(graph: &FlowGraph, from: &str, to: &str, max_paths: usize) -> Vec<Vec<String>> {
    let adjacency = adjacency(graph);
    let mut results = Vec::new();
    let mut path = vec![from];
    let mut on_path: HashSet<&str> = HashSet::from([from]);
    walk_paths(&adjacency, from, to, max_paths, &mut path, &mut on_path, &mut results);
    results
}

fn walk_paths<'g>(
    adjacency: &HashMap<&'g str, Vec<&'g str>>,
    current: &'g str,
    to: &str,
    max_paths: usize,
    path: &mut Vec<&'g str>,
    on_path: &mut HashSet<&'g str>,
    results: &mut Vec<Vec<String>>,
) {
    if results.len() >= max_paths {
        return;
    }
    if current == to {
        results.push(path.iter().map(|id| id.to_string()).collect());
        return;
    }
    for &next in adjacency.get(current).into_iter().flatten() {
        if !on_path.insert(next) {
            continue;
        }
        path.push(next);
        walk_paths(adjacency, next, to, max_paths, path, on_path, results);
        path.pop();
        on_path.remove(next);
    }
}

pub fn edge_type_counts(graph: &FlowGraph) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for edge in &graph.edges {
        *counts.entry(edge.edge_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Resolves comma-separated targets: an exact node id first, then every node
/// of a file path. Anything else is reported as unresolved.
pub fn resolve_focus_targets(graph: &FlowGraph, targets: &str) -> FocusTargets {
    let mut out = FocusTargets::default();
    for target in targets.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if graph.node(target).is_some() {
            out.node_ids.push(target.to_string());
            continue;
        }
        let in_file: Vec<String> = graph
            .nodes
            .iter()
            .filter(|node| node.file_path == target)
            .map(|node| node.id.clone())
            .collect();
        if in_file.is_empty() {
            out.unresolved.push(target.to_string());
        } else {
            out.node_ids.extend(in_file);
        }
    }
    out
}

fn adjacency(graph: &FlowGraph) -> HashMap<&str, Vec<&str>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }
    adjacency
}
