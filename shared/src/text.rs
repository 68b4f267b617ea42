pub const COMMIT_MESSAGE_BUDGET: usize = 110;
pub const EMPTY_COMMIT_MESSAGE: &str = "No commit message";

const ELLIPSIS: char = '…';

/// First line of a commit message, trimmed and capped at [`COMMIT_MESSAGE_BUDGET`] characters.
pub fn sanitize_commit_message(message: &str) -> String {
    let first_line = message.split('\n').next().unwrap_or_default().trim();
    if first_line.is_empty() {
        return EMPTY_COMMIT_MESSAGE.to_string();
    }

    truncate_with_ellipsis(first_line, COMMIT_MESSAGE_BUDGET)
}

/// Returns `text` unchanged if it fits in `budget` characters. Otherwise keeps
/// `budget - 3` characters and appends a single ellipsis glyph.
pub fn truncate_with_ellipsis(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let mut result: String = text.chars().take(budget.saturating_sub(3)).collect();
    result.push(ELLIPSIS);
    result
}

/// Minimal escaping for text interpolated into HTML bodies and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}
