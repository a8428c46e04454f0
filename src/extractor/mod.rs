pub mod typescript;

use crate::model::{CallSite, ExtractionResult, FileExtraction, SymbolInfo};
use std::path::Path;

pub use typescript::TypeScriptExtractor;

/// Turns a source file into symbol records and call sites.
///
/// Implementations never fail outright: unreadable or unparsable files show up
/// in `ExtractionResult::errors`, and lookups of missing symbols return
/// nothing.
pub trait Extractor {
    fn extract_symbols(&self, path: &Path) -> ExtractionResult;

    fn extract_symbol(&self, path: &Path, name: &str) -> Option<SymbolInfo> {
        self.extract_symbols(path)
            .symbols
            .into_iter()
            .find(|symbol| symbol.name == name)
    }

    /// Calls made from inside the named symbol, in source order.
    fn extract_call_sites(&self, path: &Path, name: &str) -> Vec<CallSite>;

    /// Symbols and their call sites in one pass. Implementations that parse
    /// should override this to parse the file once.
    fn extract_file(&self, path: &Path) -> FileExtraction {
        let ExtractionResult { symbols, errors } = self.extract_symbols(path);
        let call_sites = symbols
            .iter()
            .map(|symbol| self.extract_call_sites(path, &symbol.name))
            .collect();
        FileExtraction {
            symbols,
            call_sites,
            errors,
        }
    }
}
