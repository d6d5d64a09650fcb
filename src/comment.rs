/// Finds the trailing comment of a line.
///
/// Returns the text from the first `#` outside a double-quoted region to the
/// end of the line. Every `"` toggles the quoted state, escaped or not, so
/// `\"` inside a string closes it just like a bare quote would.
pub fn split_comment(content: &str) -> Option<&str> {
    let mut in_string = false;
    for (idx, ch) in content.char_indices() {
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if ch == '#' && !in_string {
            return Some(&content[idx..]);
        }
    }
    None
}

/// The code part of a line, i.e. everything before its trailing comment.
pub fn strip_comment(content: &str) -> &str {
    match split_comment(content) {
        Some(comment) => &content[..content.len() - comment.len()],
        None => content,
    }
}
