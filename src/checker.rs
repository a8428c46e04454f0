use crate::extractor::Extractor;
use crate::frontmatter;
use crate::hasher::hash_symbol;
use crate::model::{DocDependency, StaleDependency, StaleDoc, StaleReason, StalenessReport};
use crate::scan;
use crate::util;
use std::path::{Path, PathBuf};

/// Compares the dependency hashes recorded in generated documents with the
/// current state of the source tree.
pub struct StaleChecker<'a> {
    project_root: PathBuf,
    extractor: &'a dyn Extractor,
}

impl<'a> StaleChecker<'a> {
    pub fn new(project_root: &Path, extractor: &'a dyn Extractor) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            extractor,
        }
    }

    /// Checks every generated document under `docs_dir`.
    ///
    /// Problems with individual documents (unreadable, malformed header) and a
    /// missing directory land in `errors`; they never stop the scan. Markdown
    /// files without a header are not generated documents and are skipped.
    pub fn check_docs(&self, docs_dir: &Path) -> StalenessReport {
        let mut report = StalenessReport::default();
        if !docs_dir.is_dir() {
            report.docs_dir_missing = true;
            report
                .errors
                .push(format!("docs directory not found: {}", docs_dir.display()));
            return report;
        }

        for doc_path in scan::find_markdown_files(docs_dir) {
            let content = match util::read_to_string(&doc_path) {
                Ok(content) => content,
                Err(err) => {
                    report.errors.push(format!("{err:#}"));
                    continue;
                }
            };
            let header = match frontmatter::parse_frontmatter(&content) {
                Ok(Some(header)) => header,
                Ok(None) => continue,
                Err(err) => {
                    report.errors.push(format!("{}: {err:#}", doc_path.display()));
                    continue;
                }
            };
            report.total_docs += 1;

            let stale_dependencies: Vec<StaleDependency> = header
                .dependencies
                .iter()
                .filter_map(|dep| self.check_dependency(dep))
                .collect();
            if !stale_dependencies.is_empty() {
                tracing::debug!(
                    "{} has {} stale dependencies",
                    doc_path.display(),
                    stale_dependencies.len()
                );
                report.stale_docs.push(StaleDoc {
                    doc_path: doc_path.to_string_lossy().to_string(),
                    stale_dependencies,
                });
            }
        }
        tracing::info!(
            "checked {} docs, {} stale",
            report.total_docs,
            report.stale_docs.len()
        );
        report
    }

    /// `None` when the dependency is fresh.
    pub fn check_dependency(&self, dep: &DocDependency) -> Option<StaleDependency> {
        let source = self.project_root.join(&dep.path);
        let stale = |reason: StaleReason, new_hash: Option<String>| StaleDependency {
            path: dep.path.clone(),
            symbol: dep.symbol.clone(),
            reason,
            old_hash: Some(dep.hash.clone()),
            new_hash,
        };
        if !source.is_file() {
            return Some(stale(StaleReason::FileNotFound, None));
        }
        let Some(symbol) = self.extractor.extract_symbol(&source, &dep.symbol) else {
            return Some(stale(StaleReason::NotFound, None));
        };
        let current = hash_symbol(&symbol);
        if current == dep.hash {
            None
        } else {
            Some(stale(StaleReason::Changed, Some(current)))
        }
    }
}
