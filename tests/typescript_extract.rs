use std::fs;
use std::path::PathBuf;
use syncdocs::extractor::{Extractor, TypeScriptExtractor};
use syncdocs::model::SymbolKind;

fn write_source(dir: &tempfile::TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

const SOURCE: &str = r#"import { db } from "./db";

let counter = 0;

export const MAX_RETRIES = 3;

export const fetchUser = async (id: string) => {
  return db.users.find(id);
};

const double = x => x * 2;

export async function loadProfile(id: string, opts?: { fresh: boolean }) {
  const user = await fetchUser(id);
  return formatName(user.name);
}

function formatName(name: string): string {
  return name.trim();
}

export class UserService {
  constructor(private readonly repo: Repo) {}

  async get(id: string) {
    return this.repo.load(id);
  }
}
"#;

#[test]
fn extracts_documentable_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "users.ts", SOURCE);
    let result = TypeScriptExtractor::new().extract_symbols(&path);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let names: Vec<_> = result
        .symbols
        .iter()
        .map(|s| (s.kind, s.name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            (SymbolKind::Const, "MAX_RETRIES"),
            (SymbolKind::Const, "fetchUser"),
            (SymbolKind::Const, "double"),
            (SymbolKind::Function, "loadProfile"),
            (SymbolKind::Function, "formatName"),
            (SymbolKind::Class, "UserService"),
            (SymbolKind::Method, "get"),
        ]
    );
}

#[test]
fn symbol_text_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "users.ts", SOURCE);
    let extractor = TypeScriptExtractor::new();

    let load = extractor.extract_symbol(&path, "loadProfile").unwrap();
    assert_eq!(load.params, "(id: string, opts?: { fresh: boolean })");
    assert!(load.body.starts_with('{') && load.body.ends_with('}'));
    assert!(load.full_text.starts_with("export async function loadProfile"));
    assert_eq!(load.start_line, 13);
    assert_eq!(load.end_line, 16);
    assert!(load.is_async());
    assert_eq!(load.file_path, path.to_string_lossy());

    let fetch = extractor.extract_symbol(&path, "fetchUser").unwrap();
    assert_eq!(fetch.params, "(id: string)");
    assert!(fetch.body.contains("db.users.find(id)"));
    assert!(fetch.full_text.starts_with("export const fetchUser"));
    assert!(fetch.is_async());

    let double = extractor.extract_symbol(&path, "double").unwrap();
    assert_eq!(double.params, "x");
    assert_eq!(double.body, "x * 2");

    let max = extractor.extract_symbol(&path, "MAX_RETRIES").unwrap();
    assert_eq!(max.params, "");
    assert_eq!(max.body, "3");

    assert!(extractor.extract_symbol(&path, "counter").is_none());
    assert!(extractor.extract_symbol(&path, "missing").is_none());
}

#[test]
fn call_sites_in_source_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "users.ts", SOURCE);
    let calls = TypeScriptExtractor::new().extract_call_sites(&path, "loadProfile");

    let names: Vec<_> = calls.iter().map(|c| (c.name.as_str(), c.awaited)).collect();
    assert_eq!(names, vec![("fetchUser", true), ("formatName", false)]);
    assert_eq!(calls[0].expression, "fetchUser(id)");
}

#[test]
fn tsx_and_javascript_sources() {
    let dir = tempfile::tempdir().unwrap();
    let tsx = write_source(
        &dir,
        "Card.tsx",
        "export default function Card({ title }: Props) {\n  return <h1>{format(title)}</h1>;\n}\nfunction format(t: string) { return t; }\n",
    );
    let js = write_source(
        &dir,
        "legacy.js",
        "function run() { return helper(); }\nfunction helper() { return 1; }\nmodule.exports = { run };\n",
    );
    let extractor = TypeScriptExtractor::new();

    let card = extractor.extract_symbol(&tsx, "Card").unwrap();
    assert!(card.full_text.starts_with("export default function Card"));
    let calls = extractor.extract_call_sites(&tsx, "Card");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "format");

    let names: Vec<_> = extractor
        .extract_symbols(&js)
        .symbols
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["run", "helper"]);
}
