pub const DEFAULT_CHUNK_LIMIT: usize = 1900;

/// Splits `text` into chunks of at most `limit` characters without
/// breaking lines. Each line is counted with its trailing newline. A
/// single line longer than the limit becomes its own chunk; chat relays
/// reject empty messages, so none are produced.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.len() + 1;
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(current.join("\n"));
            current = vec![line];
            current_len = line_len;
        } else {
            current.push(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("one\ntwo\nthree", 100);
        assert_eq!(chunks, vec!["one\ntwo\nthree"]);
    }

    #[test]
    fn lines_are_never_split() {
        let text = "aaaa\nbbbb\ncccc\ndddd";
        let chunks = chunk_text(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc\ndddd"]);
    }

    #[test]
    fn oversized_line_becomes_its_own_chunk() {
        let long = "x".repeat(50);
        let text = format!("short\n{}\ntail", long);
        let chunks = chunk_text(&text, 10);
        assert_eq!(chunks, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn no_empty_chunks_for_leading_long_line() {
        let long = "y".repeat(30);
        let chunks = chunk_text(&long, 10);
        assert_eq!(chunks, vec![long]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn chunk_length_counts_newlines() {
        // "ab\ncd" packs exactly into a 6-char budget (3 + 3).
        let chunks = chunk_text("ab\ncd\nef", 6);
        assert_eq!(chunks, vec!["ab\ncd", "ef"]);
    }
}
