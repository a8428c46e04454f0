use crate::matchers::{EntryPointMatch, EntryPointMatcher, compile, string_property};
use crate::model::{EntryType, NodeMetadata, SymbolInfo};
use regex::Regex;
use std::sync::LazyLock;

static CREATE_FUNCTION: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"\binngest\s*\.\s*createFunction\s*\("));

/// `inngest.createFunction(...)` declarations, triggered by an event or a cron
/// schedule.
#[derive(Debug, Default, Clone, Copy)]
pub struct InngestMatcher;

impl EntryPointMatcher for InngestMatcher {
    fn framework(&self) -> &'static str {
        "inngest"
    }

    fn match_symbol(&self, symbol: &SymbolInfo) -> Option<EntryPointMatch> {
        if !CREATE_FUNCTION.as_ref()?.is_match(&symbol.body) {
            return None;
        }
        let event_trigger = string_property(&symbol.body, "event")
            .or_else(|| string_property(&symbol.body, "cron").map(|expr| format!("cron:{expr}")));
        Some(EntryPointMatch {
            entry_type: EntryType::EventFunction,
            metadata: NodeMetadata {
                event_trigger,
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

    #[test]
    fn event_and_cron_triggers() {
        let body = r#"inngest.createFunction({ id: "welcome" }, { event: "user/signup" }, async ({ step }) => {})"#;
        let found = InngestMatcher
            .match_symbol(&symbol("src/inngest/welcome.ts", "welcome", SymbolKind::Const, body, body))
            .unwrap();
        assert_eq!(found.entry_type, EntryType::EventFunction);
        assert_eq!(found.metadata.event_trigger.as_deref(), Some("user/signup"));

        let body = r#"inngest.createFunction({ id: "nightly" }, { cron: "0 0 * * *" }, async () => {})"#;
        let found = InngestMatcher
            .match_symbol(&symbol("src/inngest/nightly.ts", "nightly", SymbolKind::Const, body, body))
            .unwrap();
        assert_eq!(found.metadata.event_trigger.as_deref(), Some("cron:0 0 * * *"));
    }

    #[test]
    fn only_inngest_client_calls_count() {
        for body in [
            r#"workflows.createFunction({ id: "x" }, { event: "a/b" }, async () => {})"#,
            r#"createFunction({ id: "x" }, { event: "a/b" }, async () => {})"#,
            r#"myinngest.createFunction({ id: "x" }, { event: "a/b" }, async () => {})"#,
        ] {
            let sym = symbol("src/inngest/x.ts", "x", SymbolKind::Const, body, body);
            assert!(InngestMatcher.match_symbol(&sym).is_none(), "{body}");
        }

        let body = "inngest\n  .createFunction({ id: \"x\" }, { event: \"a/b\" }, async () => {})";
        let sym = symbol("src/inngest/x.ts", "x", SymbolKind::Const, body, body);
        assert!(InngestMatcher.match_symbol(&sym).is_some());
    }
}
