/// Returns the leading `max_chars` characters of `content`.
///
/// Lengths are counted in chars, not bytes, so the cut never lands inside a
/// multi-byte sequence.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((byte_pos, _)) => &content[..byte_pos],
        None => content,
    }
}

/// Caps `content` at `max_chars` characters, appending `...` when anything was cut.
pub fn truncate_with_ellipsis(content: &str, max_chars: usize) -> String {
    let truncated = truncate_chars(content, max_chars);
    if truncated.len() < content.len() {
        format!("{}...", truncated)
    } else {
        content.to_string()
    }
}
