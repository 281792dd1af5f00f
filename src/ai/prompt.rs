/// Instruction placed ahead of the document text.
pub const SUMMARY_INSTRUCTION: &str = "Summarize this text clearly, concisely and point out key points from it like notable sections:";

/// Tokens reserved for the instruction and request framing.
pub const TOKEN_BUFFER: usize = 250;

/// Rough token estimate: one token per four characters.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Remove control characters, keeping line structure, and trim.
#[must_use]
pub fn sanitize_document_text(raw: &str) -> String {
    raw.chars()
        .filter(|&c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Cut `text` so its estimate fits in `max_tokens`. Returns the (possibly
/// shortened) text and whether anything was dropped.
#[must_use]
pub fn truncate_to_token_budget(text: &str, max_tokens: usize) -> (&str, bool) {
    if estimate_tokens(text) <= max_tokens {
        return (text, false);
    }
    let max_chars = max_tokens.saturating_sub(1).saturating_mul(4);
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Build the summarization prompt, truncating the document to the input budget.
#[must_use]
pub fn build_summary_prompt(document_text: &str, max_input_tokens: usize) -> String {
    let sanitized = sanitize_document_text(document_text);
    let budget = max_input_tokens
        .saturating_sub(TOKEN_BUFFER)
        .saturating_sub(estimate_tokens(SUMMARY_INSTRUCTION));
    let (body, truncated) = truncate_to_token_budget(&sanitized, budget);
    if truncated {
        tracing::warn!(
            "Document text truncated from ~{} to ~{} tokens",
            estimate_tokens(&sanitized),
            budget
        );
    }
    format!("{SUMMARY_INSTRUCTION}\n\n{body}")
}
