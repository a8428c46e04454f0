//! Runtime connections: model-suggested dispatch edges and the checks that
//! decide whether they are real.

pub mod discover;
pub mod types;
pub mod verify;

use crate::ai::AiClient;
use crate::extractor::Extractor;
use crate::model::SymbolInfo;
use crate::util;
use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

pub use discover::{build_discovery_prompt, discover_connections, parse_discovery_response};
pub use types::{DiscoveredConnection, Verification, VerifiedConnection, VerifiedTarget};
pub use verify::{
    TASK_DISPATCH_TYPES, find_task_definition, find_typescript_files, normalize_connection_type,
    resolve_task_symbol, verify_connection,
};

const DETAIL_REASON_MAX_BYTES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressLevel {
    /// Coarse status, suitable for a spinner.
    Progress,
    Info,
    /// Per-candidate lines for verbose output.
    Detail,
}

impl fmt::Display for ProgressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProgressLevel::Progress => "progress",
            ProgressLevel::Info => "info",
            ProgressLevel::Detail => "detail",
        })
    }
}

/// Discovers and verifies runtime connections for a batch of root symbols.
pub struct ConnectionResolver<'a> {
    client: &'a dyn AiClient,
    extractor: &'a dyn Extractor,
    max_tokens: u32,
}

impl<'a> ConnectionResolver<'a> {
    pub fn new(client: &'a dyn AiClient, extractor: &'a dyn Extractor, max_tokens: u32) -> Self {
        Self {
            client,
            extractor,
            max_tokens,
        }
    }

    /// Scans `project_root` once, then for each symbol in order asks the model
    /// for candidates and verifies them. Targets are deduplicated by
    /// `filePath:name` across the whole batch.
    pub async fn resolve_connections(
        &self,
        symbols: &[SymbolInfo],
        project_root: &Path,
        progress: &mut dyn FnMut(ProgressLevel, &str),
    ) -> Result<Vec<VerifiedConnection>> {
        progress(ProgressLevel::Progress, "Scanning project for task definitions...");
        let files = find_typescript_files(project_root);
        progress(
            ProgressLevel::Info,
            &format!("Scanned {} TypeScript files", files.len()),
        );

        let mut verified = Vec::new();
        let mut seen_targets = HashSet::new();

        for symbol in symbols {
            progress(
                ProgressLevel::Progress,
                &format!("Discovering runtime connections in {}...", symbol.name),
            );
            let connections =
                discover_connections(self.client, symbol, self.max_tokens).await?;
            if connections.is_empty() {
                progress(
                    ProgressLevel::Info,
                    &format!("No runtime connections found in {}", symbol.name),
                );
                continue;
            }

            progress(
                ProgressLevel::Info,
                &format!(
                    "AI found {} potential connection(s) in {}",
                    connections.len(),
                    symbol.name
                ),
            );
            for conn in &connections {
                progress(
                    ProgressLevel::Detail,
                    &format!(
                        "\"{}\" ({}): {}",
                        conn.target_hint,
                        conn.connection_type,
                        util::truncate_str_bytes(&conn.reason, DETAIL_REASON_MAX_BYTES)
                    ),
                );
            }

            let mut discarded = Vec::new();
            for conn in connections {
                match verify_connection(conn, &files, self.extractor) {
                    Verification::Verified(target) => {
                        if seen_targets.insert(target.target_symbol().key()) {
                            verified.push(target.attach_source(symbol.clone()));
                        }
                    }
                    Verification::Rejected { connection, reason } => {
                        discarded.push(format!(
                            "  \"{}\" ({}): {reason}",
                            connection.target_hint, connection.connection_type
                        ));
                    }
                }
            }

            if !discarded.is_empty() {
                progress(
                    ProgressLevel::Info,
                    &format!(
                        "Discarded {} unverified connection(s) from {}",
                        discarded.len(),
                        symbol.name
                    ),
                );
                for line in &discarded {
                    progress(ProgressLevel::Detail, line);
                }
            }
        }

        if !verified.is_empty() {
            let names: Vec<&str> = verified
                .iter()
                .map(|conn| conn.target_symbol().name.as_str())
                .collect();
            progress(
                ProgressLevel::Info,
                &format!(
                    "Verified {} runtime connection(s): {}",
                    verified.len(),
                    names.join(", ")
                ),
            );
        }
        tracing::info!("resolved {} runtime connection(s)", verified.len());
        Ok(verified)
    }
}
