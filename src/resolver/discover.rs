use crate::ai::AiClient;
use crate::model::SymbolInfo;
use crate::resolver::types::DiscoveredConnection;
use anyhow::Result;
use serde_json::Value;

/// Prompt asking the model for runtime dispatches (string-addressed calls) in
/// one symbol.
pub fn build_discovery_prompt(symbol: &SymbolInfo) -> String {
    format!(
        r#"Analyze this TypeScript code and identify runtime dispatch calls: connections to other code that are made via string identifiers rather than direct function imports.

Examples of what to look for:
- Task/job queue dispatches: tasks.trigger("task-id"), queue.add("job-name"), worker.dispatch(...)
- Event emissions: emit("event-name"), eventBus.publish("topic")
- Internal API calls: fetch("/api/..."), axios.post("/api/...")
- Dynamic routing: router.push("/path"), navigate("/path")

Do NOT include:
- Direct function/method calls (handled by static analysis)
- Calls to external third-party APIs (Stripe, Supabase, AWS, etc.)

Source code of `{name}` ({kind}) from `{file}`:

```typescript
{text}
```

Respond with ONLY a JSON array. Each item needs "type", "targetHint", and "reason".
Return [] if no runtime dispatches found."#,
        name = symbol.name,
        kind = symbol.kind,
        file = symbol.file_path,
        text = symbol.full_text,
    )
}

/// Parses a model answer into candidate connections.
///
/// Never fails: anything that is not a JSON array yields nothing, and array
/// items lacking a non-empty `type`, `targetHint` or `reason` string are
/// dropped.
pub fn parse_discovery_response(response: &str) -> Vec<DiscoveredConnection> {
    let cleaned = strip_code_fence(response.trim());
    let items = match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return Vec::new(),
        Err(err) => {
            tracing::debug!("discovery response is not JSON: {err}");
            return Vec::new();
        }
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<DiscoveredConnection>(item).ok())
        .filter(|conn| {
            !conn.connection_type.trim().is_empty()
                && !conn.target_hint.trim().is_empty()
                && !conn.reason.trim().is_empty()
        })
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.strip_suffix('\n').unwrap_or(rest)
}

/// Asks the model about one symbol. Transport failures propagate; a useless
/// answer is just an empty list.
pub async fn discover_connections(
    client: &dyn AiClient,
    symbol: &SymbolInfo,
    max_tokens: u32,
) -> Result<Vec<DiscoveredConnection>> {
    let prompt = build_discovery_prompt(symbol);
    let response = client.send_prompt(&prompt, max_tokens).await?;
    Ok(parse_discovery_response(&response))
}
