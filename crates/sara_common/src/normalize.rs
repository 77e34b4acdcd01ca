//! Text normalization shared by the classifier and the retrieval engine.
//!
//! Every place that compares text or builds a cache key must go through
//! [`normalize_text`], or lexical matches silently fail.

/// Lowercase, replace every non-alphanumeric ASCII run with a single space,
/// trim. Idempotent.
pub fn normalize_text(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut pending_space = false;

    for c in lower.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            out.push(c);
            pending_space = false;
        } else {
            pending_space = true;
        }
    }

    out
}

/// Whitespace tokens of the normalized form.
pub fn tokens(s: &str) -> Vec<String> {
    normalize_text(s)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
