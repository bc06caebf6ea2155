/// Convenience helper for snapshotting parser output as pretty JSON.
pub fn snapshot_from_str(input: &str) -> String {
    serde_json::to_string_pretty(&crate::parse(input))
        .unwrap_or_else(|err| format!("failed to render JSON: {err}"))
}

/// Convenience helper for snapshotting lexer output as pretty JSON.
pub fn snapshot_tokens_from_str(input: &str) -> String {
    let tokens: Vec<_> = crate::lex(input).collect();
    serde_json::to_string_pretty(&tokens)
        .unwrap_or_else(|err| format!("failed to render JSON: {err}"))
}
