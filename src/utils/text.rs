/// Per-message character budget, below Telegram's 4096 hard limit.
pub const MESSAGE_CHUNK_LIMIT: usize = 3500;

pub const RULE: &str = "━━━━━━━━━━━━━━━━━━";

/// Splits `text` on line boundaries into chunks of at most `limit` characters.
///
/// Lines are never split; a single line longer than `limit` becomes its own chunk.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut length = 0usize;

    for line in text.split('\n') {
        let add_len = line.chars().count() + 1;
        if length + add_len > limit && !current.is_empty() {
            parts.push(current.join("\n"));
            current.clear();
            length = 0;
        }
        current.push(line);
        length += add_len;
    }
    if !current.is_empty() {
        parts.push(current.join("\n"));
    }
    parts
}

/// Renders `value` zero-padded to `width` using Khmer digits.
pub fn to_khmer_digits(value: u32, width: usize) -> String {
    format!("{value:0width$}")
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x17E0 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}
