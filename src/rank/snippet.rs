//! Sentence splitting and snippet trimming.

/// Sentence terminators, including full-width and Devanagari forms.
fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？' | '।')
}

/// Collapse all whitespace (including line breaks) to single spaces.
pub fn flatten_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into sentences.
///
/// A sentence ends at a terminator followed by whitespace or the end of the
/// text; full-width terminators end a sentence on their own.
pub fn split_sentences(text: &str) -> Vec<String> {
    let flat = flatten_whitespace(text);
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = flat.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if !is_terminator(c) {
            continue;
        }
        let full_width = !c.is_ascii();
        let at_boundary = match chars.peek() {
            None => true,
            Some(next) => next.is_whitespace() || full_width,
        };
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Cut `text` to at most `max_chars` characters at a word boundary, adding
/// an ellipsis when anything was removed.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end())
}

/// Bounded-length extract: leading whole sentences up to `max_sentences`
/// and `max_chars`. A first sentence longer than the limit is cut at a word
/// boundary.
pub fn refine_snippet(text: &str, max_chars: usize, max_sentences: usize) -> String {
    let sentences = split_sentences(text);
    let mut snippet = String::new();
    let mut length = 0;

    for sentence in sentences.iter().take(max_sentences.max(1)) {
        let sentence_len = sentence.chars().count();
        let added = if snippet.is_empty() { sentence_len } else { sentence_len + 1 };
        if length + added > max_chars {
            break;
        }
        if !snippet.is_empty() {
            snippet.push(' ');
        }
        snippet.push_str(sentence);
        length += added;
    }

    if snippet.is_empty() {
        if let Some(first) = sentences.first() {
            return truncate_chars(first, max_chars);
        }
    }
    snippet
}

/// Prefix of `text` of at most `max_chars` characters, on a char boundary.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
