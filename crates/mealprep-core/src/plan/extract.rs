//! Response extraction: strip code fences from model output.
//!
//! Models often wrap JSON in a Markdown fence even when told not to. This
//! module only removes that wrapping; it never validates what is inside.

const FENCE: &str = "```";

/// Return the content of `text` with a surrounding code fence removed.
///
/// Handles a leading fence with or without a language tag (```` ```json ````,
/// ```` ``` ````), and a trailing fence. Either fence may be missing, in which
/// case only what is present is stripped. Unfenced input comes back trimmed.
pub fn extract_json(text: &str) -> String {
    let mut cleaned = text.trim();

    if let Some(rest) = cleaned.strip_prefix(FENCE) {
        cleaned = strip_language_tag(rest);
    }

    if let Some(rest) = cleaned.strip_suffix(FENCE) {
        cleaned = rest;
    }

    cleaned.trim().to_string()
}

/// Drop a language tag (`json`, `JSON`, `jsonc`, ...) directly after the
/// opening fence.
///
/// The tag is only removed when it is followed by whitespace, the end of the
/// input, or the start of a JSON container, so a bare fence whose content
/// begins with a word is left intact.
fn strip_language_tag(rest: &str) -> &str {
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
        .unwrap_or(rest.len());
    if tag_len == 0 {
        return rest;
    }

    let after = &rest[tag_len..];
    let boundary = after.is_empty()
        || after.starts_with(char::is_whitespace)
        || after.starts_with('{')
        || after.starts_with('[');
    if boundary { after } else { rest }
}

/// Wrap `body` in a code fence, optionally tagged.
///
/// The inverse of [`extract_json`] for trimmed bodies.
pub fn fence_json(body: &str, tag: Option<&str>) -> String {
    format!("{FENCE}{}\n{body}\n{FENCE}", tag.unwrap_or(""))
}
