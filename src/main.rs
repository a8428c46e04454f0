use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use syncdocs::ai::{AnthropicClient, AnthropicConfig};
use syncdocs::checker::StaleChecker;
use syncdocs::cli;
use syncdocs::config::{Config, ProjectConfig};
use syncdocs::coverage::CoverageScanner;
use syncdocs::docs::{self, DocLayout, GeneratedDoc};
use syncdocs::extractor::{Extractor, TypeScriptExtractor};
use syncdocs::graph::{self, GraphBuilder, GraphStore, query};
use syncdocs::model::{FlowGraph, SymbolInfo};
use syncdocs::planner::{CallTreePlanner, PlanAction, PlanOptions, PlanRole};
use syncdocs::resolver::{ConnectionResolver, ProgressLevel, VerifiedConnection};
use syncdocs::scan::{self, ScanOptions};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SYNCDOCS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn project_root(repo: &Path) -> Result<PathBuf> {
    fs::canonicalize(repo).with_context(|| format!("resolve repo {}", repo.display()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = cli::Args::parse();

    match args.command {
        cli::Command::Graph {
            repo,
            no_ignore,
            resolve,
            verbose,
        } => {
            let root = project_root(&repo)?;
            let project = ProjectConfig::load(&root)?;
            let extractor = TypeScriptExtractor::new();
            let files = scan::find_source_files(&root, ScanOptions::new(no_ignore));
            let mut graph = GraphBuilder::new(&root, &extractor).build(&files);

            let mut runtime_edges = 0;
            if resolve {
                let roots = entry_point_symbols(&graph, &root, &extractor);
                let verified = resolve_runtime(&project, &extractor, &roots, &root, verbose)?;
                runtime_edges = graph::merge_verified_connections(&mut graph, &verified, &root);
            }

            let store = GraphStore::new(&project.output_dir(&root));
            store.write(&graph)?;
            print_json(&graph_summary(&graph, &files, runtime_edges, store.path()))
        }
        cli::Command::Check { repo } => {
            let root = project_root(&repo)?;
            let project = ProjectConfig::load(&root)?;
            let extractor = TypeScriptExtractor::new();
            let report = StaleChecker::new(&root, &extractor).check_docs(&project.output_dir(&root));
            print_json(&report)?;
            if !report.passes() {
                std::process::exit(1);
            }
            Ok(())
        }
        cli::Command::Status { repo, no_ignore } => {
            let root = project_root(&repo)?;
            let project = ProjectConfig::load(&root)?;
            let extractor = TypeScriptExtractor::new();
            let layout = DocLayout::new(&root, &project.output_dir(&root));
            let files = scan::find_source_files(&root, ScanOptions::new(no_ignore));
            print_json(&CoverageScanner::new(&extractor, &layout).scan(&files))
        }
        cli::Command::Plan {
            repo,
            target,
            depth,
            force,
            write,
        } => {
            let root = project_root(&repo)?;
            let project = ProjectConfig::load(&root)?;
            let extractor = TypeScriptExtractor::new();
            let layout = DocLayout::new(&root, &project.output_dir(&root));
            let planner = CallTreePlanner::new(&extractor, layout);
            let (file, symbol) = cli::parse_target(&target);
            let plan = planner.plan(&root.join(file), symbol, PlanOptions { depth, force })?;

            let mut written = 0;
            if write {
                for item in plan.to_generate() {
                    let PlanAction::Generate { related } = &item.action else {
                        continue;
                    };
                    let body = docs::skeleton_body(planner.layout(), &item.symbol);
                    GeneratedDoc::new(planner.layout(), &item.symbol, related, body)?.write()?;
                    written += 1;
                }
            }

            let items: Vec<Value> = plan
                .items
                .iter()
                .map(|item| {
                    let (action, related) = match &item.action {
                        PlanAction::Generate { related } => (
                            "generate",
                            related.iter().map(|sym| sym.name.clone()).collect::<Vec<_>>(),
                        ),
                        PlanAction::Skip => ("skip", Vec::new()),
                    };
                    json!({
                        "symbol": item.symbol.name,
                        "filePath": planner.layout().relative_source(&item.symbol),
                        "docPath": item.doc_path.to_string_lossy(),
                        "role": match item.role {
                            PlanRole::Root => "root",
                            PlanRole::Callee => "callee",
                        },
                        "action": action,
                        "related": related,
                    })
                })
                .collect();
            print_json(&json!({
                "items": items,
                "generate": plan.to_generate().count(),
                "skipped": plan.skipped().count(),
                "written": written,
            }))
        }
        cli::Command::EntryPoints { repo } => {
            let graph = load_graph(&repo)?;
            let entries: Vec<Value> = query::entry_points(&graph)
                .into_iter()
                .map(|node| {
                    json!({
                        "id": node.id,
                        "name": node.name,
                        "entryType": node.entry_type,
                        "detail": node.metadata.as_ref().and_then(|meta| meta.summary()),
                    })
                })
                .collect();
            print_json(&entries)
        }
        cli::Command::Reachable { repo, from } => {
            let graph = load_graph(&repo)?;
            if graph.node(&from).is_none() {
                bail!("unknown node {from}");
            }
            print_json(&query::reachable_from(&graph, &from))
        }
        cli::Command::Paths {
            repo,
            from,
            to,
            max_paths,
        } => {
            let graph = load_graph(&repo)?;
            let max_paths = max_paths.unwrap_or(Config::get().max_paths);
            print_json(&query::paths_between(&graph, &from, &to, max_paths))
        }
        cli::Command::Focus { repo, targets } => {
            let graph = load_graph(&repo)?;
            let focus = query::resolve_focus_targets(&graph, &targets);
            if !focus.unresolved.is_empty() {
                tracing::warn!("could not resolve: {}", focus.unresolved.join(", "));
            }
            print_json(&focus)
        }
        cli::Command::Discover {
            repo,
            target,
            verbose,
        } => {
            let root = project_root(&repo)?;
            let project = ProjectConfig::load(&root)?;
            let extractor = TypeScriptExtractor::new();
            let (file, symbol) = cli::parse_target(&target);
            let path = root.join(file);
            let symbols = match symbol {
                Some(name) => match extractor.extract_symbol(&path, name) {
                    Some(found) => vec![found],
                    None => bail!("Symbol \"{name}\" not found in {}", path.display()),
                },
                None => extractor.extract_symbols(&path).symbols,
            };
            let verified = resolve_runtime(&project, &extractor, &symbols, &root, verbose)?;
            let out: Vec<Value> = verified
                .iter()
                .map(|conn| connection_json(conn, &root))
                .collect();
            print_json(&out)
        }
    }
}

fn load_graph(repo: &Path) -> Result<FlowGraph> {
    let root = project_root(repo)?;
    let project = ProjectConfig::load(&root)?;
    let store = GraphStore::new(&project.output_dir(&root));
    match store.read()? {
        Some(graph) => Ok(graph),
        None => bail!(
            "no graph at {}; run `syncdocs graph` first",
            store.path().display()
        ),
    }
}

fn entry_point_symbols(graph: &FlowGraph, root: &Path, extractor: &dyn Extractor) -> Vec<SymbolInfo> {
    query::entry_points(graph)
        .into_iter()
        .filter_map(|node| extractor.extract_symbol(&root.join(&node.file_path), &node.name))
        .collect()
}

fn resolve_runtime(
    project: &ProjectConfig,
    extractor: &dyn Extractor,
    symbols: &[SymbolInfo],
    root: &Path,
    verbose: bool,
) -> Result<Vec<VerifiedConnection>> {
    let client = AnthropicClient::new(AnthropicConfig::from_env(Some(project.model())))?;
    tracing::info!("resolving {} symbols with {}", symbols.len(), client.model());
    let resolver = ConnectionResolver::new(&client, extractor, Config::get().discovery_max_tokens);
    let mut report = |level: ProgressLevel, message: &str| match level {
        ProgressLevel::Detail if !verbose => {}
        _ => eprintln!("{message}"),
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime.block_on(resolver.resolve_connections(symbols, root, &mut report))
}

fn connection_json(conn: &VerifiedConnection, root: &Path) -> Value {
    let source = conn.source_symbol();
    let target = conn.target_symbol();
    json!({
        "source": format!("{}:{}", syncdocs::util::relative_path(root, Path::new(&source.file_path)), source.name),
        "target": format!("{}:{}", syncdocs::util::relative_path(root, Path::new(conn.target_file_path())), target.name),
        "type": conn.connection().connection_type,
        "targetHint": conn.connection().target_hint,
        "reason": conn.connection().reason,
    })
}

fn graph_summary(graph: &FlowGraph, files: &[PathBuf], runtime_edges: usize, path: &Path) -> Value {
    let entries: Vec<Value> = query::entry_points(graph)
        .into_iter()
        .map(|node| {
            json!({
                "id": node.id,
                "entryType": node.entry_type,
                "detail": node.metadata.as_ref().and_then(|meta| meta.summary()),
            })
        })
        .collect();
    json!({
        "files": files.len(),
        "nodes": graph.nodes.len(),
        "edges": graph.edges.len(),
        "edgeTypes": query::edge_type_counts(graph),
        "runtimeEdges": runtime_edges,
        "entryPoints": entries,
        "graphPath": path.to_string_lossy(),
    })
}
