use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Directories that never hold project sources: dependencies, build output,
/// framework caches and version control.
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    ".git",
    ".next",
    "build",
    "coverage",
    ".turbo",
];

pub const TYPESCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx"];

pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub no_ignore: bool,
}

impl ScanOptions {
    pub fn new(no_ignore: bool) -> Self {
        Self { no_ignore }
    }
}

/// Every source file under `root` (absolute paths, sorted) whose extension is
/// in `extensions`. Type declaration files (`.d.ts`) are never returned.
pub fn find_files(root: &Path, extensions: &[&str], options: ScanOptions) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    if options.no_ignore {
        builder.standard_filters(false);
    } else {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    }
    let walker = builder
        .hidden(false)
        .filter_entry(|entry| !is_skipped_entry(entry))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if !has_extension(path, extensions) || is_declaration_file(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    files
}

pub fn find_source_files(root: &Path, options: ScanOptions) -> Vec<PathBuf> {
    find_files(root, SOURCE_EXTENSIONS, options)
}

/// Markdown files under `dir`, ignore files not honoured: generated output is
/// commonly git-ignored.
pub fn find_markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(dir).standard_filters(false).build() {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        if has_extension(entry.path(), &["md"]) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    files
}

fn is_skipped_entry(entry: &ignore::DirEntry) -> bool {
    if !entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
        return false;
    }
    let name = entry.file_name();
    SKIP_DIRS.iter().any(|dir| name == OsStr::new(dir))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext))
        .unwrap_or(false)
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(".d.ts"))
        .unwrap_or(false)
}
