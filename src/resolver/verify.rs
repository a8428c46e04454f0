use crate::extractor::Extractor;
use crate::model::SymbolInfo;
use crate::resolver::types::{DiscoveredConnection, Verification, VerifiedTarget};
use crate::scan::{self, ScanOptions, TYPESCRIPT_EXTENSIONS};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Connection types, after normalization, that name a task or queue dispatch.
pub const TASK_DISPATCH_TYPES: &[&str] = &[
    "trigger-task",
    "task-dispatch",
    "task-trigger",
    "trigger-dev-task",
    "queue-dispatch",
];

/// Checks one family of connection types against the source tree.
trait ConnectionVerifier: Sync {
    fn name(&self) -> &'static str;

    fn handles(&self, normalized_type: &str) -> bool;

    fn verify(
        &self,
        connection: DiscoveredConnection,
        files: &[PathBuf],
        extractor: &dyn Extractor,
    ) -> Verification;
}

/// Every supported connection family. Types no verifier handles are rejected.
static VERIFIERS: &[&dyn ConnectionVerifier] = &[&TaskDispatchVerifier];

struct TaskDispatchVerifier;

impl ConnectionVerifier for TaskDispatchVerifier {
    fn name(&self) -> &'static str {
        "task-dispatch"
    }

    fn handles(&self, normalized_type: &str) -> bool {
        TASK_DISPATCH_TYPES.contains(&normalized_type)
    }

    fn verify(
        &self,
        connection: DiscoveredConnection,
        files: &[PathBuf],
        extractor: &dyn Extractor,
    ) -> Verification {
        let hint = connection.target_hint.clone();
        let Some(target_file) = find_task_definition(&hint, files) else {
            return Verification::Rejected {
                connection,
                reason: format!("no file defines id \"{hint}\""),
            };
        };
        let Some(target_symbol) = resolve_task_symbol(&target_file, &hint, extractor) else {
            return Verification::Rejected {
                connection,
                reason: format!(
                    "found id \"{hint}\" in {} but could not extract symbol",
                    target_file.display()
                ),
            };
        };
        Verification::Verified(VerifiedTarget::new(
            connection,
            target_symbol,
            target_file.to_string_lossy().to_string(),
        ))
    }
}

/// Lower-case with `_` folded to `-`, so `TRIGGER_TASK` reads as
/// `trigger-task`.
pub fn normalize_connection_type(connection_type: &str) -> String {
    connection_type.to_lowercase().replace('_', "-")
}

/// `.ts`/`.tsx` files under `root`, skipping dependency, build and VCS
/// directories. Ignore files are not consulted.
pub fn find_typescript_files(root: &Path) -> Vec<PathBuf> {
    scan::find_files(root, TYPESCRIPT_EXTENSIONS, ScanOptions::new(true))
}

/// `id: "<task_id>"` or `id: '<task_id>'`, where the closing quote must follow
/// the id directly.
fn task_id_pattern(task_id: &str) -> Option<Regex> {
    let pattern = format!(r#"id:\s*["']{}["']"#, regex::escape(task_id));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!("task id pattern for {task_id:?}: {err}");
            None
        }
    }
}

/// First file among `files` that declares `task_id`. Unreadable files are
/// skipped.
pub fn find_task_definition(task_id: &str, files: &[PathBuf]) -> Option<PathBuf> {
    let re = task_id_pattern(task_id)?;
    files.iter().find_map(|path| match fs::read_to_string(path) {
        Ok(content) if re.is_match(&content) => Some(path.clone()),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!("skip {}: {err}", path.display());
            None
        }
    })
}

/// The symbol of `path` whose text declares `task_id`.
pub fn resolve_task_symbol(
    path: &Path,
    task_id: &str,
    extractor: &dyn Extractor,
) -> Option<SymbolInfo> {
    let re = task_id_pattern(task_id)?;
    extractor
        .extract_symbols(path)
        .symbols
        .into_iter()
        .find(|symbol| re.is_match(&symbol.full_text))
}

/// Runs the verifier responsible for the connection's type.
pub fn verify_connection(
    connection: DiscoveredConnection,
    files: &[PathBuf],
    extractor: &dyn Extractor,
) -> Verification {
    let normalized = normalize_connection_type(&connection.connection_type);
    match VERIFIERS.iter().find(|verifier| verifier.handles(&normalized)) {
        Some(verifier) => {
            tracing::debug!(
                "verify {:?} with {}",
                connection.target_hint,
                verifier.name()
            );
            verifier.verify(connection, files, extractor)
        }
        None => {
            let reason = format!("unknown connection type \"{}\"", connection.connection_type);
            Verification::Rejected { connection, reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_underscores() {
        assert_eq!(normalize_connection_type("Trigger_Task"), "trigger-task");
        assert_eq!(normalize_connection_type("queue-dispatch"), "queue-dispatch");
    }

    #[test]
    fn task_id_pattern_escapes_metacharacters() {
        let re = task_id_pattern("a.b+c").unwrap();
        assert!(re.is_match(r#"id: "a.b+c""#));
        assert!(!re.is_match(r#"id: "axb+c""#));
    }
}
