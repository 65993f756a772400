//! Formatting utilities (Telegram HTML escaping, message chunking).

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Wrap a value in `<code>` so Telegram renders it tap-to-copy monospace.
pub fn code(text: &str) -> String {
    format!("<code>{}</code>", escape_html(text))
}

/// Split a long message into chunks no longer than `limit` bytes.
///
/// Prefers line boundaries; falls back to char boundaries for a single
/// oversized line. Never splits inside a UTF-8 sequence.
pub fn split_chunks(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut chunk = String::new();

    for line in text.split_inclusive('\n') {
        if chunk.len() + line.len() > limit && !chunk.is_empty() {
            out.push(std::mem::take(&mut chunk));
        }

        if line.len() > limit {
            // A single line longer than the limit: hard-split on char boundaries.
            let mut rest = line;
            while rest.len() > limit {
                let cut = floor_char_boundary(rest, limit);
                out.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
            chunk.push_str(rest);
        } else {
            chunk.push_str(line);
        }
    }

    if !chunk.is_empty() {
        out.push(chunk);
    }
    out
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx.max(1)
}
