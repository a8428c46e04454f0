use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "syncdocs",
    version,
    about = "Keep generated docs in sync with the code they describe",
    after_help = r#"Examples:
  syncdocs graph --repo .
  syncdocs graph --resolve --verbose
  syncdocs check
  syncdocs status --repo .
  syncdocs plan src/api/users.ts:getUser --depth 2
  syncdocs plan src/api/users.ts --depth 1 --write
  syncdocs reachable --from 'app/api/upload/route.ts:POST'
  syncdocs paths --from 'app/api/upload/route.ts:POST' --to 'src/trigger/analyze.ts:analyzeTask'
  syncdocs focus 'src/api/users.ts:getUser,src/lib/db.ts'
  syncdocs discover src/api/upload.ts:handleUpload
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the project call graph and write it to the output directory.
    Graph {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
        /// Discover runtime connections from entry points and add the verified ones.
        #[arg(long)]
        resolve: bool,
        /// Print per-connection detail while resolving.
        #[arg(long)]
        verbose: bool,
    },
    /// Report generated docs whose dependencies changed. Exits 1 when any are
    /// stale or the docs directory is missing.
    Check {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Show documentation coverage.
    Status {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
    },
    /// Plan which docs to (re)generate for a file or `file:symbol` target.
    Plan {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        target: String,
        /// Call-site hops to follow from each target symbol.
        #[arg(long, default_value_t = 0)]
        depth: usize,
        /// Regenerate callee docs even when they are current.
        #[arg(long)]
        force: bool,
        /// Write skeleton docs for every planned generation.
        #[arg(long)]
        write: bool,
    },
    /// List entry-point nodes of the stored graph.
    EntryPoints {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Subgraph reachable from a node of the stored graph.
    Reachable {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        #[arg(long)]
        from: String,
    },
    /// Paths between two nodes of the stored graph.
    Paths {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Maximum number of paths (default from SYNCDOCS_MAX_PATHS).
        #[arg(long)]
        max_paths: Option<usize>,
    },
    /// Resolve comma-separated `file:symbol` or `file` targets to node ids.
    Focus {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        targets: String,
    },
    /// Discover and verify runtime connections for a file or `file:symbol`.
    Discover {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        target: String,
        /// Print per-connection detail.
        #[arg(long)]
        verbose: bool,
    },
}

/// Splits `path/to/file.ts:symbol` into file and symbol. A target without a
/// symbol suffix names the whole file.
pub fn parse_target(target: &str) -> (&str, Option<&str>) {
    match target.rsplit_once(':') {
        Some((file, symbol))
            if !file.is_empty()
                && !symbol.is_empty()
                && !symbol.contains(['/', '\\', '.']) =>
        {
            (file, Some(symbol))
        }
        _ => (target, None),
    }
}
