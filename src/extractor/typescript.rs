use crate::extractor::Extractor;
use crate::model::{CallSite, ExtractionResult, FileExtraction, SymbolInfo, SymbolKind};
use crate::util;
use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

const FUNCTION_VALUE_KINDS: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

/// Tree-sitter backed extractor for TypeScript, TSX and JavaScript sources.
///
/// Documentable symbols are the top-level functions, classes (plus their
/// methods) and `const` declarations of a file. A parser is created per call,
/// so one extractor can be shared freely.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptExtractor;

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, path: &Path) -> Result<ParsedFile> {
        let source = util::read_to_string(path)?;
        let mut parser = Parser::new();
        parser
            .set_language(&language_for(path))
            .with_context(|| format!("load grammar for {}", path.display()))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| anyhow!("parse {}", path.display()))?;
        Ok(ParsedFile {
            file_path: path.to_string_lossy().to_string(),
            source,
            tree,
        })
    }
}

impl Extractor for TypeScriptExtractor {
    fn extract_symbols(&self, path: &Path) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        match self.parse(path) {
            Ok(parsed) => {
                if parsed.tree.root_node().has_error() {
                    tracing::debug!("syntax errors in {}", path.display());
                }
                result.symbols = parsed
                    .declarations()
                    .into_iter()
                    .map(|decl| decl.info)
                    .collect();
            }
            Err(err) => result.errors.push(format!("{err:#}")),
        }
        result
    }

    fn extract_call_sites(&self, path: &Path, name: &str) -> Vec<CallSite> {
        let parsed = match self.parse(path) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!("call sites unavailable: {err:#}");
                return Vec::new();
            }
        };
        let declarations = parsed.declarations();
        let Some(decl) = declarations.iter().find(|decl| decl.info.name == name) else {
            return Vec::new();
        };
        collect_call_sites(decl.scope, &parsed.source)
    }

    fn extract_file(&self, path: &Path) -> FileExtraction {
        let mut result = FileExtraction::default();
        match self.parse(path) {
            Ok(parsed) => {
                for decl in parsed.declarations() {
                    result
                        .call_sites
                        .push(collect_call_sites(decl.scope, &parsed.source));
                    result.symbols.push(decl.info);
                }
            }
            Err(err) => result.errors.push(format!("{err:#}")),
        }
        result
    }
}

fn language_for(path: &Path) -> Language {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsx") => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Some("ts" | "mts" | "cts") => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        _ => tree_sitter_javascript::LANGUAGE.into(),
    }
}

struct ParsedFile {
    file_path: String,
    source: String,
    tree: Tree,
}

struct Declaration<'tree> {
    info: SymbolInfo,
    /// Node searched for call sites.
    scope: Node<'tree>,
}

impl ParsedFile {
    fn declarations(&self) -> Vec<Declaration<'_>> {
        let root = self.tree.root_node();
        let mut out = Vec::new();
        let mut cursor = root.walk();
        for stmt in root.named_children(&mut cursor) {
            if stmt.kind() == "export_statement" {
                if let Some(decl) = stmt.child_by_field_name("declaration") {
                    self.push_declaration(decl, stmt, &mut out);
                }
                continue;
            }
            self.push_declaration(stmt, stmt, &mut out);
        }
        out
    }

    /// `decl` is the declaration itself, `outer` the statement that owns it
    /// (the export statement for exported declarations).
    fn push_declaration<'tree>(
        &self,
        decl: Node<'tree>,
        outer: Node<'tree>,
        out: &mut Vec<Declaration<'tree>>,
    ) {
        match decl.kind() {
            "function_declaration" | "generator_function_declaration" => {
                let Some(name) = self.field_text(decl, "name") else {
                    return;
                };
                out.push(Declaration {
                    info: self.symbol(
                        name,
                        SymbolKind::Function,
                        self.field_text(decl, "parameters").unwrap_or_default(),
                        self.field_text(decl, "body").unwrap_or_default(),
                        outer,
                    ),
                    scope: decl,
                });
            }
            "class_declaration" | "abstract_class_declaration" => {
                let Some(name) = self.field_text(decl, "name") else {
                    return;
                };
                out.push(Declaration {
                    info: self.symbol(
                        name,
                        SymbolKind::Class,
                        String::new(),
                        self.field_text(decl, "body").unwrap_or_default(),
                        outer,
                    ),
                    scope: decl,
                });
                if let Some(body) = decl.child_by_field_name("body") {
                    self.push_methods(body, out);
                }
            }
            "lexical_declaration" => {
                let is_const = decl.child(0).map(|kw| kw.kind() == "const").unwrap_or(false);
                if !is_const {
                    return;
                }
                let mut cursor = decl.walk();
                let declarators: Vec<Node<'tree>> = decl
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() == "variable_declarator")
                    .collect();
                let single = declarators.len() == 1;
                for declarator in declarators {
                    let Some(name_node) = declarator.child_by_field_name("name") else {
                        continue;
                    };
                    if name_node.kind() != "identifier" {
                        continue;
                    }
                    let name = node_text(name_node, &self.source);
                    let (params, body) = match declarator.child_by_field_name("value") {
                        Some(value) if FUNCTION_VALUE_KINDS.contains(&value.kind()) => (
                            self.field_text(value, "parameters")
                                .or_else(|| self.field_text(value, "parameter"))
                                .unwrap_or_default(),
                            self.field_text(value, "body").unwrap_or_default(),
                        ),
                        Some(value) => (String::new(), node_text(value, &self.source)),
                        None => (String::new(), String::new()),
                    };
                    let span_node = if single { outer } else { declarator };
                    out.push(Declaration {
                        info: self.symbol(name, SymbolKind::Const, params, body, span_node),
                        scope: declarator,
                    });
                }
            }
            _ => {}
        }
    }

    fn push_methods<'tree>(&self, class_body: Node<'tree>, out: &mut Vec<Declaration<'tree>>) {
        let mut cursor = class_body.walk();
        for member in class_body.named_children(&mut cursor) {
            if member.kind() != "method_definition" {
                continue;
            }
            let Some(name) = self.field_text(member, "name") else {
                continue;
            };
            if name == "constructor" {
                continue;
            }
            let Some(body) = self.field_text(member, "body") else {
                continue;
            };
            out.push(Declaration {
                info: self.symbol(
                    name,
                    SymbolKind::Method,
                    self.field_text(member, "parameters").unwrap_or_default(),
                    body,
                    member,
                ),
                scope: member,
            });
        }
    }

    fn symbol(
        &self,
        name: String,
        kind: SymbolKind,
        params: String,
        body: String,
        span_node: Node<'_>,
    ) -> SymbolInfo {
        SymbolInfo {
            name,
            kind,
            file_path: self.file_path.clone(),
            params,
            body,
            full_text: node_text(span_node, &self.source),
            start_line: span_node.start_position().row + 1,
            end_line: span_node.end_position().row + 1,
        }
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|child| node_text(child, &self.source))
            .filter(|text| !text.is_empty())
    }
}

fn collect_call_sites(scope: Node<'_>, source: &str) -> Vec<CallSite> {
    let mut calls = Vec::new();
    let mut stack = vec![scope];
    while let Some(node) = stack.pop() {
        if node.kind() == "call_expression" {
            if let Some(name) = call_target_name(node, source) {
                let awaited = node
                    .parent()
                    .map(|parent| parent.kind() == "await_expression")
                    .unwrap_or(false);
                calls.push(CallSite {
                    name,
                    expression: node_text(node, source),
                    awaited,
                });
            }
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    calls
}

/// Bare identifier for `foo()`, property name for `obj.foo()`.
fn call_target_name(call: Node<'_>, source: &str) -> Option<String> {
    let target = call.child_by_field_name("function")?;
    let name_node = match target.kind() {
        "identifier" => target,
        "member_expression" => target.child_by_field_name("property")?,
        _ => return None,
    };
    let name = node_text(name_node, source);
    if name.is_empty() { None } else { Some(name) }
}

fn node_text(node: Node<'_>, source: &str) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    source.get(start..end).unwrap_or("").trim().to_string()
}
