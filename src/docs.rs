use crate::frontmatter::{self, DocFrontmatter};
use crate::hasher::hash_symbol;
use crate::model::{DocDependency, SymbolInfo};
use crate::util;
use anyhow::{Context, Result, anyhow};
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Maps symbols to their document paths:
/// `<output>/<source dir>/<source file stem>/<kebab-name>.md`.
#[derive(Debug, Clone)]
pub struct DocLayout {
    project_root: PathBuf,
    output_dir: PathBuf,
}

impl DocLayout {
    pub fn new(project_root: &Path, output_dir: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Project-relative, `/`-separated form of a symbol's file path.
    pub fn relative_source(&self, symbol: &SymbolInfo) -> String {
        util::relative_path(&self.project_root, Path::new(&symbol.file_path))
    }

    /// Project-relative source path, rejecting symbols whose file lies outside
    /// the project root.
    pub fn contained_source(&self, symbol: &SymbolInfo) -> Result<String> {
        util::contained_rel_path(&self.project_root, Path::new(&symbol.file_path)).ok_or_else(|| {
            anyhow!(
                "{} is outside the project root {}",
                symbol.file_path,
                self.project_root.display()
            )
        })
    }

    /// Always inside the output directory.
    pub fn doc_path(&self, symbol: &SymbolInfo) -> Result<PathBuf> {
        let rel = self.contained_source(symbol)?;
        let rel = Path::new(&rel);
        let mut path = self.output_dir.clone();
        if let Some(parent) = rel.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            path.push(parent);
        }
        if let Some(stem) = rel.file_stem() {
            path.push(stem);
        }
        path.push(format!("{}.md", kebab_case(&symbol.name)));
        Ok(path)
    }
}

/// `processImage` -> `process-image`, `HTTPServer` -> `h-t-t-p-server`.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
        }
        out.extend(ch.to_lowercase());
    }
    match out.strip_prefix('-') {
        Some(rest) => rest.to_string(),
        None => out,
    }
}

/// A document ready to be written: header dependencies are the documented
/// symbol followed by its related symbols, hashed as they are now.
#[derive(Debug, Clone)]
pub struct GeneratedDoc {
    pub path: PathBuf,
    pub title: String,
    pub body: String,
    pub dependencies: Vec<DocDependency>,
}

impl GeneratedDoc {
    pub fn new(
        layout: &DocLayout,
        symbol: &SymbolInfo,
        related: &[SymbolInfo],
        body: String,
    ) -> Result<Self> {
        let dependencies = std::iter::once(symbol)
            .chain(related.iter())
            .map(|sym| {
                Ok(DocDependency {
                    path: layout.contained_source(sym)?,
                    symbol: sym.name.clone(),
                    hash: hash_symbol(sym),
                    as_of: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let title = extract_title(&body).unwrap_or_else(|| symbol.name.clone());
        Ok(Self {
            path: layout.doc_path(symbol)?,
            title,
            body,
            dependencies,
        })
    }

    pub fn render(&self) -> Result<String> {
        let header = DocFrontmatter {
            title: self.title.clone(),
            generated: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            dependencies: self.dependencies.clone(),
        };
        frontmatter::render_document(&header, &self.body)
    }

    pub fn write(&self) -> Result<()> {
        let content = self.render()?;
        util::ensure_parent_dir(&self.path)?;
        fs::write(&self.path, content).with_context(|| format!("write {}", self.path.display()))
    }
}

/// Text of the first `# ` heading.
pub fn extract_title(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Placeholder body for a symbol: heading, location and source.
pub fn skeleton_body(layout: &DocLayout, symbol: &SymbolInfo) -> String {
    format!(
        "# {name}\n\n`{kind}` in `{path}` (lines {start}-{end})\n\n```typescript\n{text}\n```\n",
        name = symbol.name,
        kind = symbol.kind,
        path = layout.relative_source(symbol),
        start = symbol.start_line,
        end = symbol.end_line,
        text = symbol.full_text,
    )
}
