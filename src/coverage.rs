use crate::docs::DocLayout;
use crate::extractor::Extractor;
use crate::model::SymbolKind;
use crate::util;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolCoverage {
    pub file_path: String,
    pub name: String,
    pub kind: SymbolKind,
    pub doc_path: String,
    pub documented: bool,
    /// A `/** ... */` block sits directly above the declaration.
    pub has_doc_comment: bool,
}

/// Documentation coverage of a project. `coverage` is the rounded percentage
/// of symbols with a generated document, 100 for a project without symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub source_files: usize,
    pub total_symbols: usize,
    pub documented: usize,
    pub undocumented: usize,
    pub coverage: u32,
    pub with_doc_comment: usize,
    pub symbols: Vec<SymbolCoverage>,
    pub errors: Vec<String>,
}

impl CoverageReport {
    pub fn undocumented_symbols(&self) -> impl Iterator<Item = &SymbolCoverage> {
        self.symbols.iter().filter(|symbol| !symbol.documented)
    }
}

pub struct CoverageScanner<'a> {
    extractor: &'a dyn Extractor,
    layout: &'a DocLayout,
}

impl<'a> CoverageScanner<'a> {
    pub fn new(extractor: &'a dyn Extractor, layout: &'a DocLayout) -> Self {
        Self { extractor, layout }
    }

    /// Checks every symbol of `files` for a document at its layout path.
    /// Files that fail to read or parse are listed in `errors` and count
    /// toward `source_files` only.
    pub fn scan(&self, files: &[PathBuf]) -> CoverageReport {
        let mut report = CoverageReport {
            source_files: files.len(),
            ..CoverageReport::default()
        };

        for file in files {
            let source = match util::read_to_string(file) {
                Ok(source) => source,
                Err(err) => {
                    report.errors.push(format!("{err:#}"));
                    continue;
                }
            };
            let extraction = self.extractor.extract_symbols(file);
            if !extraction.errors.is_empty() {
                report.errors.extend(extraction.errors);
                continue;
            }
            for symbol in extraction.symbols {
                let doc_path = match self.layout.doc_path(&symbol) {
                    Ok(path) => path,
                    Err(err) => {
                        report.errors.push(format!("{err:#}"));
                        continue;
                    }
                };
                report.symbols.push(SymbolCoverage {
                    file_path: self.layout.relative_source(&symbol),
                    documented: doc_path.is_file(),
                    doc_path: doc_path.to_string_lossy().to_string(),
                    has_doc_comment: has_doc_comment(&source, symbol.start_line),
                    name: symbol.name,
                    kind: symbol.kind,
                });
            }
        }

        report.total_symbols = report.symbols.len();
        report.documented = report.symbols.iter().filter(|sym| sym.documented).count();
        report.undocumented = report.total_symbols - report.documented;
        report.with_doc_comment = report
            .symbols
            .iter()
            .filter(|sym| sym.has_doc_comment)
            .count();
        report.coverage = percentage(report.documented, report.total_symbols);
        tracing::info!(
            "coverage: {}/{} symbols documented",
            report.documented,
            report.total_symbols
        );
        report
    }
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    (part as f64 * 100.0 / total as f64).round() as u32
}

/// True when the last non-blank lines above `start_line` (1-based) form a
/// `/** ... */` block.
pub fn has_doc_comment(source: &str, start_line: usize) -> bool {
    let above: Vec<&str> = source
        .lines()
        .take(start_line.saturating_sub(1))
        .map(str::trim)
        .collect();
    let mut lines = above.iter().rev().skip_while(|line| line.is_empty());
    let Some(last) = lines.next() else {
        return false;
    };
    if !last.ends_with("*/") {
        return false;
    }
    if last.starts_with("/*") {
        return last.starts_with("/**");
    }
    for line in lines {
        if line.starts_with("/*") {
            return line.starts_with("/**");
        }
        if line.ends_with("*/") {
            return false;
        }
    }
    false
}
