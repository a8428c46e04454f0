use crate::docs::DocLayout;
use crate::extractor::Extractor;
use crate::frontmatter;
use crate::hasher::hash_symbol;
use crate::model::{FileExtraction, SymbolInfo};
use crate::util;
use anyhow::{Result, bail};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Call-site hops followed from each root. 0 documents the roots only.
    pub depth: usize,
    /// Regenerate callees even when their document is current.
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanRole {
    Root,
    Callee,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    /// Write the document; `related` symbols are recorded as extra
    /// dependencies.
    Generate { related: Vec<SymbolInfo> },
    /// The existing document already records the symbol's current hash.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDoc {
    pub symbol: SymbolInfo,
    pub doc_path: PathBuf,
    pub role: PlanRole,
    pub action: PlanAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPlan {
    /// Roots first, in declaration order, then callees in discovery order.
    pub items: Vec<PlannedDoc>,
}

impl GenerationPlan {
    pub fn to_generate(&self) -> impl Iterator<Item = &PlannedDoc> {
        self.items
            .iter()
            .filter(|item| matches!(item.action, PlanAction::Generate { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &PlannedDoc> {
        self.items
            .iter()
            .filter(|item| item.action == PlanAction::Skip)
    }
}

/// Expands documentation targets into roots plus the callees reachable within
/// a depth budget.
pub struct CallTreePlanner<'a> {
    extractor: &'a dyn Extractor,
    layout: DocLayout,
}

/// Files touched by one expansion, each extracted once.
struct CallTreeWalk<'a> {
    extractor: &'a dyn Extractor,
    files: HashMap<String, FileExtraction>,
}

impl<'a> CallTreeWalk<'a> {
    fn new(extractor: &'a dyn Extractor) -> Self {
        Self {
            extractor,
            files: HashMap::new(),
        }
    }

    fn file(&mut self, path: &str) -> &FileExtraction {
        let extractor = self.extractor;
        self.files
            .entry(path.to_string())
            .or_insert_with(|| extractor.extract_file(Path::new(path)))
    }

    fn expand(
        &mut self,
        symbol: &SymbolInfo,
        depth: usize,
        visited: &mut HashSet<String>,
    ) -> Vec<SymbolInfo> {
        if depth == 0 {
            return Vec::new();
        }
        visited.insert(symbol.key());

        let file = self.file(&symbol.file_path);
        let candidates: Vec<SymbolInfo> = file
            .calls_of(&symbol.name)
            .iter()
            .filter_map(|call| file.symbol(&call.name))
            .cloned()
            .collect();

        let mut found = Vec::new();
        for callee in candidates {
            if callee.name == symbol.name || !visited.insert(callee.key()) {
                continue;
            }
            let nested = self.expand(&callee, depth - 1, visited);
            found.push(callee);
            found.extend(nested);
        }
        found
    }
}

impl<'a> CallTreePlanner<'a> {
    pub fn new(extractor: &'a dyn Extractor, layout: DocLayout) -> Self {
        Self { extractor, layout }
    }

    pub fn layout(&self) -> &DocLayout {
        &self.layout
    }

    /// Same-file callees of `symbol` up to `depth` hops, depth first.
    ///
    /// `visited` is shared by the whole expansion: a symbol already in it is
    /// never returned or expanded again, which bounds the walk on cyclic call
    /// graphs. Each file is parsed once per call.
    pub fn resolve_call_tree(
        &self,
        symbol: &SymbolInfo,
        depth: usize,
        visited: &mut HashSet<String>,
    ) -> Vec<SymbolInfo> {
        CallTreeWalk::new(self.extractor).expand(symbol, depth, visited)
    }

    /// Plans a whole file, or one symbol of it when `symbol_name` is given.
    /// Files outside the project root are rejected.
    pub fn plan(
        &self,
        file: &Path,
        symbol_name: Option<&str>,
        options: PlanOptions,
    ) -> Result<GenerationPlan> {
        let root_dir = self.layout.project_root();
        if util::contained_rel_path(root_dir, file).is_none() {
            bail!(
                "{} is outside the project root {}",
                file.display(),
                root_dir.display()
            );
        }

        let mut walk = CallTreeWalk::new(self.extractor);
        let extraction = walk.file(&file.to_string_lossy());
        let roots = match symbol_name {
            Some(name) => match extraction.symbol(name) {
                Some(symbol) => vec![symbol.clone()],
                None => bail!("Symbol \"{name}\" not found in {}", file.display()),
            },
            None => {
                if let Some(err) = extraction.errors.first() {
                    bail!("{err}");
                }
                if extraction.symbols.is_empty() {
                    bail!("No symbols found in {}", file.display());
                }
                extraction.symbols.clone()
            }
        };
        self.plan_with(&mut walk, &roots, options)
    }

    /// Roots are always generated, each with its own call tree as related
    /// symbols. The callees are those trees merged and deduplicated by key;
    /// they never include a root and are skipped when their document is
    /// current unless `force` is set.
    pub fn plan_symbols(&self, roots: &[SymbolInfo], options: PlanOptions) -> Result<GenerationPlan> {
        self.plan_with(&mut CallTreeWalk::new(self.extractor), roots, options)
    }

    fn plan_with(
        &self,
        walk: &mut CallTreeWalk<'_>,
        roots: &[SymbolInfo],
        options: PlanOptions,
    ) -> Result<GenerationPlan> {
        let trees: Vec<Vec<SymbolInfo>> = roots
            .iter()
            .map(|root| walk.expand(root, options.depth, &mut HashSet::new()))
            .collect();

        let root_keys: HashSet<String> = roots.iter().map(SymbolInfo::key).collect();
        let mut seen = HashSet::new();
        let callees: Vec<SymbolInfo> = trees
            .iter()
            .flatten()
            .filter(|callee| {
                let key = callee.key();
                !root_keys.contains(&key) && seen.insert(key)
            })
            .cloned()
            .collect();

        let mut items = Vec::with_capacity(roots.len() + callees.len());
        for (root, related) in roots.iter().zip(trees) {
            items.push(PlannedDoc {
                doc_path: self.layout.doc_path(root)?,
                symbol: root.clone(),
                role: PlanRole::Root,
                action: PlanAction::Generate { related },
            });
        }
        for callee in callees {
            let action = if !options.force && self.is_doc_up_to_date(&callee) {
                PlanAction::Skip
            } else {
                PlanAction::Generate {
                    related: Vec::new(),
                }
            };
            items.push(PlannedDoc {
                doc_path: self.layout.doc_path(&callee)?,
                symbol: callee,
                role: PlanRole::Callee,
                action,
            });
        }
        Ok(GenerationPlan { items })
    }

    /// True when the symbol's document exists and its header records the
    /// symbol's current hash.
    pub fn is_doc_up_to_date(&self, symbol: &SymbolInfo) -> bool {
        let Ok(doc_path) = self.layout.doc_path(symbol) else {
            return false;
        };
        let Ok(content) = fs::read_to_string(&doc_path) else {
            return false;
        };
        match frontmatter::parse_frontmatter(&content) {
            Ok(Some(header)) => {
                let current = hash_symbol(symbol);
                header
                    .dependencies
                    .iter()
                    .any(|dep| dep.symbol == symbol.name && dep.hash == current)
            }
            Ok(None) => false,
            Err(err) => {
                tracing::debug!("unreadable header in {}: {err:#}", doc_path.display());
                false
            }
        }
    }
}
