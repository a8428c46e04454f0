use crate::matchers::{EntryPointMatch, EntryPointMatcher, is_default_export, is_named_export};
use crate::model::{EntryType, NodeMetadata, SymbolInfo, SymbolKind};

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// App router route handlers and pages, pages router pages and API routes,
/// middleware and inline server actions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NextjsMatcher;

impl EntryPointMatcher for NextjsMatcher {
    fn framework(&self) -> &'static str {
        "nextjs"
    }

    fn match_symbol(&self, symbol: &SymbolInfo) -> Option<EntryPointMatch> {
        let module = module_path(&symbol.file_path);
        let parts: Vec<&str> = module.split('/').collect();

        if let Some(found) = match_route_file(&parts, symbol) {
            return Some(found);
        }
        if module == "middleware" && symbol.name == "middleware" {
            return Some(EntryPointMatch {
                entry_type: EntryType::Middleware,
                metadata: NodeMetadata::default(),
            });
        }
        if has_use_server_directive(symbol) {
            return Some(EntryPointMatch {
                entry_type: EntryType::ServerAction,
                metadata: NodeMetadata::default(),
            });
        }
        None
    }
}

fn match_route_file(parts: &[&str], symbol: &SymbolInfo) -> Option<EntryPointMatch> {
    let (root, rest) = parts.split_first()?;
    let (last, dirs) = rest.split_last()?;
    match *root {
        "app" if *last == "route" => {
            if !is_named_export(symbol) || !HTTP_METHODS.contains(&symbol.name.as_str()) {
                return None;
            }
            Some(EntryPointMatch {
                entry_type: EntryType::ApiRoute,
                metadata: NodeMetadata {
                    http_method: Some(symbol.name.clone()),
                    route: Some(route_from_segments(dirs)),
                    ..NodeMetadata::default()
                },
            })
        }
        "app" if *last == "page" => {
            if !is_default_export(symbol) {
                return None;
            }
            Some(EntryPointMatch {
                entry_type: EntryType::Page,
                metadata: route_metadata(route_from_segments(dirs)),
            })
        }
        "pages" => {
            if !is_default_export(symbol) || rest.iter().any(|seg| seg.starts_with('_')) {
                return None;
            }
            let entry_type = if rest.first() == Some(&"api") {
                EntryType::ApiRoute
            } else {
                EntryType::Page
            };
            Some(EntryPointMatch {
                entry_type,
                metadata: route_metadata(route_from_segments(rest)),
            })
        }
        _ => None,
    }
}

fn route_metadata(route: String) -> NodeMetadata {
    NodeMetadata {
        route: Some(route),
        ..NodeMetadata::default()
    }
}

/// Project-relative file path without extension or a leading `src/`.
fn module_path(file_path: &str) -> String {
    let without_src = file_path.strip_prefix("src/").unwrap_or(file_path);
    match without_src.rfind('.') {
        Some(idx) if !without_src[idx..].contains('/') => without_src[..idx].to_string(),
        _ => without_src.to_string(),
    }
}

fn route_from_segments(segments: &[&str]) -> String {
    let mut out = String::new();
    for seg in segments {
        if seg.is_empty() || *seg == "index" || (seg.starts_with('(') && seg.ends_with(')')) {
            continue;
        }
        out.push('/');
        if seg.starts_with('[') && seg.ends_with(']') {
            let name = seg
                .trim_start_matches('[')
                .trim_end_matches(']')
                .trim_start_matches("...");
            out.push(':');
            out.push_str(name);
        } else {
            out.push_str(seg);
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

fn has_use_server_directive(symbol: &SymbolInfo) -> bool {
    if !matches!(symbol.kind, SymbolKind::Function | SymbolKind::Const) {
        return false;
    }
    let inner = symbol.body.trim_start().trim_start_matches('{').trim_start();
    inner.starts_with("'use server'") || inner.starts_with("\"use server\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::symbol;

    fn matched(file_path: &str, name: &str, full_text: &str, body: &str) -> Option<EntryPointMatch> {
        NextjsMatcher.match_symbol(&symbol(file_path, name, SymbolKind::Function, full_text, body))
    }

    #[test]
    fn app_route_handlers() {
        let found = matched(
            "src/app/api/users/[id]/route.ts",
            "GET",
            "export async function GET(req) { return Response.json({}); }",
            "{ return Response.json({}); }",
        )
        .unwrap();
        assert_eq!(found.entry_type, EntryType::ApiRoute);
        assert_eq!(found.metadata.http_method.as_deref(), Some("GET"));
        assert_eq!(found.metadata.route.as_deref(), Some("/api/users/:id"));

        assert!(matched("app/api/users/route.ts", "helper", "export function helper() {}", "{}").is_none());
        assert!(matched("app/api/users/route.ts", "GET", "function GET() {}", "{}").is_none());
    }

    #[test]
    fn pages_and_groups() {
        let page = matched(
            "app/(marketing)/blog/[...slug]/page.tsx",
            "BlogPage",
            "export default function BlogPage() { return null; }",
            "{ return null; }",
        )
        .unwrap();
        assert_eq!(page.entry_type, EntryType::Page);
        assert_eq!(page.metadata.route.as_deref(), Some("/blog/:slug"));

        let home = matched("pages/index.tsx", "Home", "export default function Home() {}", "{}").unwrap();
        assert_eq!(home.metadata.route.as_deref(), Some("/"));

        let api = matched("pages/api/login.ts", "handler", "export default function handler() {}", "{}").unwrap();
        assert_eq!(api.entry_type, EntryType::ApiRoute);
        assert_eq!(api.metadata.route.as_deref(), Some("/api/login"));

        assert!(matched("pages/_app.tsx", "App", "export default function App() {}", "{}").is_none());
    }

    #[test]
    fn middleware_and_server_actions() {
        let mw = matched("middleware.ts", "middleware", "export function middleware() {}", "{}").unwrap();
        assert_eq!(mw.entry_type, EntryType::Middleware);

        let action = matched(
            "app/actions.ts",
            "save",
            "export async function save(data) {\n  'use server';\n  await db.put(data);\n}",
            "{\n  'use server';\n  await db.put(data);\n}",
        )
        .unwrap();
        assert_eq!(action.entry_type, EntryType::ServerAction);
    }
}
