use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use syncdocs::checker::StaleChecker;
use syncdocs::docs::{DocLayout, GeneratedDoc};
use syncdocs::extractor::{Extractor, TypeScriptExtractor};
use syncdocs::graph::GraphBuilder;
use syncdocs::hasher::hash_symbol;
use syncdocs::scan::{self, ScanOptions};

const FILES: usize = 20;
const FUNCTIONS_PER_FILE: usize = 25;

fn module_source(index: usize) -> String {
    let mut out = String::new();
    for func in 0..FUNCTIONS_PER_FILE {
        let next = (func + 1) % FUNCTIONS_PER_FILE;
        writeln!(
            out,
            "export async function handler{index}_{func}(input: number) {{\n  const value = input * {func};\n  await handler{index}_{next}(value);\n  return value;\n}}\n"
        )
        .unwrap();
    }
    out
}

/// Temp project with `FILES` modules, each documented function by function.
fn setup_project() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    for index in 0..FILES {
        let path = root.join("src").join(format!("module{index}.ts"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, module_source(index)).unwrap();
    }

    let output = root.join("_syncdocs");
    let layout = DocLayout::new(&root, &output);
    let extractor = TypeScriptExtractor::new();
    for path in scan::find_source_files(&root, ScanOptions::default()) {
        for symbol in extractor.extract_symbols(&path).symbols {
            GeneratedDoc::new(&layout, &symbol, &[], format!("# {}\n", symbol.name))
                .unwrap()
                .write()
                .unwrap();
        }
    }
    (dir, output)
}

fn bench_hash_symbol(c: &mut Criterion) {
    let (dir, _) = setup_project();
    let extractor = TypeScriptExtractor::new();
    let symbols = extractor
        .extract_symbols(&dir.path().join("src/module0.ts"))
        .symbols;

    c.bench_function("hash_symbol_file", |b| {
        b.iter(|| {
            for symbol in &symbols {
                black_box(hash_symbol(black_box(symbol)));
            }
        })
    });
}

fn bench_check_docs(c: &mut Criterion) {
    let (dir, output) = setup_project();
    let extractor = TypeScriptExtractor::new();
    let checker = StaleChecker::new(dir.path(), &extractor);
    eprintln!(
        "Checking {} docs",
        checker.check_docs(&output).total_docs
    );

    c.bench_function("check_docs_fresh", |b| {
        b.iter(|| black_box(checker.check_docs(black_box(&output))))
    });
}

fn bench_graph_build(c: &mut Criterion) {
    let (dir, _) = setup_project();
    let root: &Path = dir.path();
    let extractor = TypeScriptExtractor::new();
    let files = scan::find_source_files(root, ScanOptions::default());

    c.bench_function("graph_build", |b| {
        b.iter(|| black_box(GraphBuilder::new(root, &extractor).build(black_box(&files))))
    });
}

criterion_group!(benches, bench_hash_symbol, bench_check_docs, bench_graph_build);
criterion_main!(benches);
