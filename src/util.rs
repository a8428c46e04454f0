use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path};

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

pub fn normalize_rel_path(repo_root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(repo_root).with_context(|| {
        format!(
            "strip prefix {} from {}",
            repo_root.display(),
            path.display()
        )
    })?;
    Ok(normalize_path(rel))
}

/// Project-relative form of `path` when it lives under `repo_root`,
/// otherwise the normalized path itself.
pub fn relative_path(repo_root: &Path, path: &Path) -> String {
    if path.is_relative() {
        return normalize_path(path);
    }
    normalize_rel_path(repo_root, path).unwrap_or_else(|_| normalize_path(path))
}

/// Project-relative form of `path` with `.` and `..` resolved lexically, or
/// `None` when the result would leave `repo_root`.
pub fn contained_rel_path(repo_root: &Path, path: &Path) -> Option<String> {
    let rel = if path.is_absolute() {
        path.strip_prefix(repo_root).ok()?
    } else {
        path
    };
    let mut parts: Vec<String> = Vec::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(os) => parts.push(os.to_string_lossy().to_string()),
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

pub fn normalize_path(path: &Path) -> String {
    let mut parts = Vec::new();
    for comp in path.components() {
        match comp {
            Component::Normal(os) => parts.push(os.to_string_lossy().to_string()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::CurDir => {}
            _ => {}
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    Ok(())
}

pub fn truncate_str_bytes(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes.min(value.len());
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn relative_path_strips_root() {
        let root = PathBuf::from("/work/project");
        assert_eq!(
            relative_path(&root, &root.join("src").join("a.ts")),
            "src/a.ts"
        );
        assert_eq!(relative_path(&root, Path::new("./src/b.ts")), "src/b.ts");
    }

    #[test]
    fn relative_path_outside_root_is_normalized() {
        let root = PathBuf::from("/work/project");
        assert_eq!(relative_path(&root, Path::new("/elsewhere/c.ts")), "elsewhere/c.ts");
    }

    #[test]
    fn contained_rel_path_rejects_escapes() {
        let root = PathBuf::from("/work/project");
        assert_eq!(
            contained_rel_path(&root, &root.join("src/./lib/../a.ts")).as_deref(),
            Some("src/a.ts")
        );
        assert_eq!(contained_rel_path(&root, Path::new("src/a.ts")).as_deref(), Some("src/a.ts"));
        assert_eq!(contained_rel_path(&root, &root.join("../other/x.ts")), None);
        assert_eq!(contained_rel_path(&root, Path::new("src/../../x.ts")), None);
        assert_eq!(contained_rel_path(&root, Path::new("/elsewhere/c.ts")), None);
        assert_eq!(contained_rel_path(&root, &root), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_str_bytes("héllo", 2), "h");
        assert_eq!(truncate_str_bytes("abc", 10), "abc");
    }
}
