//! Shared utilities for channel implementations.

/// Largest prefix of `text` that is at most `max_len` bytes and ends on a char boundary
fn floor_boundary(text: &str, max_len: usize) -> usize {
    if text.len() <= max_len {
        return text.len();
    }
    let mut end = max_len;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Split a message into chunks respecting a platform's character limit.
/// Splits on line boundaries; lines exceeding `max_len` are hard-split.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if current.len() + line.len() + 1 > max_len {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut remaining = line;
            while remaining.len() > max_len {
                let mut end = floor_boundary(remaining, max_len);
                if end == 0 {
                    // a single char wider than the limit
                    end = remaining.chars().next().map_or(remaining.len(), char::len_utf8);
                }
                chunks.push(remaining[..end].to_string());
                remaining = &remaining[end..];
            }
            current = remaining.to_string();
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
