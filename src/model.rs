use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Const,
    Method,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Const => "const",
            SymbolKind::Method => "method",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A documentable symbol sliced out of a source file by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub params: String,
    pub body: String,
    pub full_text: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl SymbolInfo {
    /// `filePath:name`, the identity used for visited sets and dedup.
    pub fn key(&self) -> String {
        symbol_key(&self.file_path, &self.name)
    }

    /// True when the declaration head (everything before the body) carries
    /// the `async` keyword.
    pub fn is_async(&self) -> bool {
        let head = match self.full_text.find(self.body.as_str()) {
            Some(idx) if !self.body.is_empty() => &self.full_text[..idx],
            _ => self.full_text.as_str(),
        };
        head.split(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == '$'))
            .any(|word| word == "async")
    }
}

pub fn symbol_key(file_path: &str, name: &str) -> String {
    format!("{file_path}:{name}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSite {
    pub name: String,
    pub expression: String,
    pub awaited: bool,
}

#[derive(Debug, Default)]
pub struct ExtractionResult {
    pub symbols: Vec<SymbolInfo>,
    pub errors: Vec<String>,
}

/// Symbols of one file together with the calls made inside each of them,
/// produced from a single parse.
#[derive(Debug, Default)]
pub struct FileExtraction {
    pub symbols: Vec<SymbolInfo>,
    /// `call_sites[i]` belongs to `symbols[i]`.
    pub call_sites: Vec<Vec<CallSite>>,
    pub errors: Vec<String>,
}

impl FileExtraction {
    /// First symbol declared under `name`.
    pub fn symbol(&self, name: &str) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }

    /// Call sites of the first symbol declared under `name`.
    pub fn calls_of(&self, name: &str) -> &[CallSite] {
        self.symbols
            .iter()
            .position(|symbol| symbol.name == name)
            .and_then(|idx| self.call_sites.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    ApiRoute,
    Page,
    EventFunction,
    Task,
    Middleware,
    ServerAction,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::ApiRoute => "api-route",
            EntryType::Page => "page",
            EntryType::EventFunction => "event-function",
            EntryType::Task => "task",
            EntryType::Middleware => "middleware",
            EntryType::ServerAction => "server-action",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub http_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub event_trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub task_id: Option<String>,
}

impl NodeMetadata {
    /// One-line description used in CLI summaries.
    pub fn summary(&self) -> Option<String> {
        if let Some(method) = &self.http_method {
            return Some(format!("{method} {}", self.route.as_deref().unwrap_or("")).trim().to_string());
        }
        self.route
            .clone()
            .or_else(|| self.event_trigger.clone())
            .or_else(|| self.task_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub is_async: bool,
    pub hash: String,
    pub line_range: (usize, usize),
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub entry_type: Option<EntryType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<NodeMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub condition: Option<String>,
    pub is_async: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub order: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    pub version: String,
    pub generated_at: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

/// One `{path, symbol, hash}` entry recorded in a generated document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocDependency {
    pub path: String,
    pub symbol: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub as_of: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StaleReason {
    Changed,
    NotFound,
    FileNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleDependency {
    pub path: String,
    pub symbol: String,
    pub reason: StaleReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleDoc {
    pub doc_path: String,
    pub stale_dependencies: Vec<StaleDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StalenessReport {
    pub total_docs: usize,
    pub stale_docs: Vec<StaleDoc>,
    pub errors: Vec<String>,
    /// The docs directory itself does not exist. Also reported in `errors`.
    #[serde(skip)]
    pub docs_dir_missing: bool,
}

impl StalenessReport {
    pub fn is_fresh(&self) -> bool {
        self.stale_docs.is_empty()
    }

    /// Fresh docs in a directory that exists. A missing directory usually
    /// means a misconfigured output dir, which must not pass a check.
    pub fn passes(&self) -> bool {
        !self.docs_dir_missing && self.is_fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(full_text: &str, body: &str) -> SymbolInfo {
        SymbolInfo {
            name: "f".to_string(),
            kind: SymbolKind::Function,
            file_path: "src/a.ts".to_string(),
            params: "()".to_string(),
            body: body.to_string(),
            full_text: full_text.to_string(),
            start_line: 1,
            end_line: 1,
        }
    }

    #[test]
    fn async_detection_only_looks_at_declaration_head() {
        assert!(symbol("export async function f() { return 1; }", "{ return 1; }").is_async());
        assert!(symbol("const f = async () => { go(); }", "{ go(); }").is_async());
        assert!(!symbol("function f() { const x = async () => 1; }", "{ const x = async () => 1; }").is_async());
        assert!(!symbol("function asyncish() {}", "{}").is_async());
    }

    #[test]
    fn graph_edge_serializes_type_field() {
        let edge = GraphEdge {
            id: "a->b#direct-call".to_string(),
            source: "a".to_string(),
            target: "b".to_string(),
            edge_type: "direct-call".to_string(),
            label: None,
            condition: None,
            is_async: false,
            order: Some(0),
        };
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value["type"], "direct-call");
        assert_eq!(value["isAsync"], false);
        assert!(value.get("label").is_none());
    }

    #[test]
    fn entry_types_use_kebab_case() {
        let value = serde_json::to_value(EntryType::EventFunction).unwrap();
        assert_eq!(value, "event-function");
        let parsed: EntryType = serde_json::from_str("\"server-action\"").unwrap();
        assert_eq!(parsed, EntryType::ServerAction);
    }
}
