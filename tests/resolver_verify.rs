use std::fs;
use std::path::{Path, PathBuf};
use syncdocs::extractor::TypeScriptExtractor;
use syncdocs::resolver::{
    DiscoveredConnection, Verification, find_task_definition, find_typescript_files,
    resolve_task_symbol, verify_connection,
};

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn connection(connection_type: &str, target_hint: &str) -> DiscoveredConnection {
    DiscoveredConnection {
        connection_type: connection_type.to_string(),
        target_hint: target_hint.to_string(),
        reason: "dispatched by id".to_string(),
    }
}

const ANALYZE_TASK: &str = r#"import { task } from "@trigger.dev/sdk/v3";

export const analyzeTask = task({
  id: "analyze-image",
  run: async (payload: { url: string }) => {
    await processImage(payload.url);
  },
});

async function processImage(url: string) {
  return url;
}
"#;

#[test]
fn task_definition_requires_exact_id() {
    let dir = tempfile::tempdir().unwrap();
    let full = write(
        dir.path(),
        "src/full.ts",
        "export const fullTask = task({ id: \"analyze-image-full\", run: async () => {} });\n",
    );
    let files = vec![full.clone()];
    assert_eq!(find_task_definition("analyze-image", &files), None);
    assert_eq!(find_task_definition("analyze-image-full", &files), Some(full));
}

#[test]
fn task_definition_accepts_either_quote_style() {
    let dir = tempfile::tempdir().unwrap();
    let double = write(dir.path(), "a.ts", "task({ id: \"send-email\" })\n");
    let single = write(dir.path(), "b.ts", "task({ id:'resize' })\n");
    let files = vec![double.clone(), single.clone()];
    assert_eq!(find_task_definition("send-email", &files), Some(double));
    assert_eq!(find_task_definition("resize", &files), Some(single));
}

#[test]
fn unreadable_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let real = write(dir.path(), "real.ts", "task({ id: \"x\" })\n");
    let files = vec![dir.path().join("gone.ts"), real.clone()];
    assert_eq!(find_task_definition("x", &files), Some(real));
}

#[test]
fn typescript_scan_skips_build_dirs() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.ts", "");
    write(dir.path(), "src/b.tsx", "");
    write(dir.path(), "src/c.js", "");
    for skipped in ["node_modules", "dist", ".git", ".next", "build", "coverage", ".turbo"] {
        write(dir.path(), &format!("{skipped}/x.ts"), "");
    }
    let files = find_typescript_files(dir.path());
    assert_eq!(
        files,
        vec![dir.path().join("src/a.ts"), dir.path().join("src/b.tsx")]
    );
}

#[test]
fn verifies_task_dispatch_to_defining_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "src/trigger/analyze.ts", ANALYZE_TASK);
    let files = find_typescript_files(dir.path());
    let extractor = TypeScriptExtractor::new();

    let symbol = resolve_task_symbol(&path, "analyze-image", &extractor).unwrap();
    assert_eq!(symbol.name, "analyzeTask");

    for connection_type in ["trigger-task", "TRIGGER_TASK", "queue_dispatch", "task-trigger"] {
        let result = verify_connection(connection(connection_type, "analyze-image"), &files, &extractor);
        match result {
            Verification::Verified(target) => {
                assert_eq!(target.target_symbol().name, "analyzeTask");
                assert_eq!(target.target_file_path(), path.to_string_lossy());
                assert_eq!(target.connection().connection_type, connection_type);
            }
            other => panic!("expected verified for {connection_type}, got {other:?}"),
        }
    }
}

#[test]
fn rejections_carry_reasons() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/trigger/analyze.ts", ANALYZE_TASK);
    // The id appears only inside a non-documentable `let`.
    let orphan = write(
        dir.path(),
        "src/orphan.ts",
        "let registry = { id: \"orphan-task\" };\n",
    );
    let files = find_typescript_files(dir.path());
    let extractor = TypeScriptExtractor::new();

    let unknown = verify_connection(connection("event-emit", "user.created"), &files, &extractor);
    assert!(!unknown.is_verified());
    assert_eq!(unknown.reason(), Some("unknown connection type \"event-emit\""));

    let missing = verify_connection(connection("trigger-task", "nope"), &files, &extractor);
    assert_eq!(missing.reason(), Some("no file defines id \"nope\""));

    let unextractable = verify_connection(connection("trigger-task", "orphan-task"), &files, &extractor);
    assert_eq!(
        unextractable.reason().map(str::to_string),
        Some(format!(
            "found id \"orphan-task\" in {} but could not extract symbol",
            orphan.display()
        ))
    );
    assert_eq!(unextractable.connection().target_hint, "orphan-task");
}
