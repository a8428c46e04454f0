use crate::matchers::{EntryPointMatch, EntryPointMatcher, compile, string_property};
use crate::model::{EntryType, NodeMetadata, SymbolInfo};
use regex::Regex;
use std::sync::LazyLock;

static TASK_CALL: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?:^|[^\w.$])(?:schedules\.task|schemaTask|task)\s*\("));

/// Trigger.dev `task(...)`, `schemaTask(...)` and `schedules.task(...)`
/// definitions carrying a literal `id`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TriggerDevMatcher;

impl EntryPointMatcher for TriggerDevMatcher {
    fn framework(&self) -> &'static str {
        "trigger-dev"
    }

    fn match_symbol(&self, symbol: &SymbolInfo) -> Option<EntryPointMatch> {
        let re = TASK_CALL.as_ref()?;
        if !re.is_match(&symbol.body) {
            return None;
        }
        let task_id = string_property(&symbol.body, "id")?;
        Some(EntryPointMatch {
            entry_type: EntryType::Task,
            metadata: NodeMetadata {
                task_id: Some(task_id),
                ..NodeMetadata::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::symbol;
    use crate::model::SymbolKind;

    fn matched(body: &str) -> Option<EntryPointMatch> {
        TriggerDevMatcher.match_symbol(&symbol("src/trigger/jobs.ts", "job", SymbolKind::Const, body, body))
    }

    #[test]
    fn recognizes_task_flavours() {
        for body in [
            r#"task({ id: "analyze-image", run: async () => {} })"#,
            r#"schemaTask({ id: 'analyze-image', schema, run: async () => {} })"#,
            r#"schedules.task({ id: "analyze-image", cron: "0 * * * *", run: async () => {} })"#,
        ] {
            let found = matched(body).unwrap();
            assert_eq!(found.entry_type, EntryType::Task);
            assert_eq!(found.metadata.task_id.as_deref(), Some("analyze-image"));
        }
    }

    #[test]
    fn ignores_lookalikes() {
        assert!(matched(r#"createTask({ id: "x" })"#).is_none());
        assert!(matched(r#"queue.task({ id: "x" })"#).is_none());
        assert!(matched("task(() => 1)").is_none());
    }
}
