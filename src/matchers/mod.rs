//! Framework entry-point recognition.
//!
//! Each matcher looks at one symbol (with a project-relative `file_path`) and
//! either claims it as an entry point or passes. Matchers are evaluated in the
//! order returned by [`default_matchers`] and the first claim wins; supporting
//! a new framework means adding a matcher to that list.

pub mod inngest;
pub mod nextjs;
pub mod trigger_dev;

use crate::model::{EntryType, NodeMetadata, SymbolInfo};
use regex::Regex;
use std::sync::LazyLock;

pub use inngest::InngestMatcher;
pub use nextjs::NextjsMatcher;
pub use trigger_dev::TriggerDevMatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointMatch {
    pub entry_type: EntryType,
    pub metadata: NodeMetadata,
}

pub trait EntryPointMatcher: Send + Sync {
    fn framework(&self) -> &'static str;

    fn match_symbol(&self, symbol: &SymbolInfo) -> Option<EntryPointMatch>;
}

pub fn default_matchers() -> Vec<Box<dyn EntryPointMatcher>> {
    vec![
        Box::new(NextjsMatcher),
        Box::new(InngestMatcher),
        Box::new(TriggerDevMatcher),
    ]
}

pub fn match_entry_point(
    matchers: &[Box<dyn EntryPointMatcher>],
    symbol: &SymbolInfo,
) -> Option<EntryPointMatch> {
    matchers.iter().find_map(|matcher| {
        let found = matcher.match_symbol(symbol)?;
        tracing::debug!(
            "{} matched {}:{} as {}",
            matcher.framework(),
            symbol.file_path,
            symbol.name,
            found.entry_type
        );
        Some(found)
    })
}

static STRING_PROPERTY: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"\b([A-Za-z_$][\w$]*)\s*:\s*["'`]([^"'`]+)["'`]"#));

/// Compiles one of the built-in patterns. A pattern that fails to compile
/// disables its matcher instead of aborting the build.
pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!("invalid matcher pattern {pattern}: {err}");
            None
        }
    }
}

/// Value of the first string-literal property named `key`, such as
/// `id: "send-email"`, any quote style.
pub(crate) fn string_property(text: &str, key: &str) -> Option<String> {
    let re = STRING_PROPERTY.as_ref()?;
    re.captures_iter(text)
        .find(|caps| caps.get(1).is_some_and(|name| name.as_str() == key))
        .and_then(|caps| caps.get(2))
        .map(|value| value.as_str().to_string())
}

pub(crate) fn is_default_export(symbol: &SymbolInfo) -> bool {
    symbol.full_text.starts_with("export default")
}

pub(crate) fn is_named_export(symbol: &SymbolInfo) -> bool {
    symbol.full_text.starts_with("export ") && !is_default_export(symbol)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::{SymbolInfo, SymbolKind};

    pub fn symbol(file_path: &str, name: &str, kind: SymbolKind, full_text: &str, body: &str) -> SymbolInfo {
        SymbolInfo {
            name: name.to_string(),
            kind,
            file_path: file_path.to_string(),
            params: String::new(),
            body: body.to_string(),
            full_text: full_text.to_string(),
            start_line: 1,
            end_line: 1,
        }
    }
}
