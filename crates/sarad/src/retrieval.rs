//! Lexical retrieval tiers and grounding-context assembly.
//!
//! Tiers are strictly ordered: exact substring, then person-query token
//! overlap, then (in the answerer) semantic search. Each tier runs only
//! when every tier above it came back empty.

use crate::corpus::KnowledgeBase;
use sara_common::normalize_text;

/// Question-side noise words ignored during person-name matching.
const PERSON_STOP_WORDS: [&str; 6] = ["who", "is", "whos", "dr", "doctor", "the"];

/// Tier 1: chunks whose normalized text contains the normalized question
/// as a substring. Zero tolerance for paraphrase, highest precision.
pub fn exact_matches(kb: &KnowledgeBase, normalized_question: &str) -> Vec<String> {
    if normalized_question.is_empty() {
        return Vec::new();
    }
    kb.iter_normalized()
        .filter(|(_, norm)| norm.contains(normalized_question))
        .map(|(chunk, _)| chunk.text.clone())
        .collect()
}

/// Does this look like a question about a person?
pub fn is_person_query(normalized_question: &str) -> bool {
    normalized_question.starts_with("who is")
        || normalized_question.starts_with("whos")
        || normalized_question.contains("hod")
}

/// Question tokens with person-query stop-words removed.
pub fn name_tokens(normalized_question: &str) -> Vec<&str> {
    normalized_question
        .split_whitespace()
        .filter(|t| !PERSON_STOP_WORDS.contains(t))
        .collect()
}

/// Tier 2: chunks containing every remaining name token.
pub fn person_matches(kb: &KnowledgeBase, normalized_question: &str) -> Vec<String> {
    let tokens = name_tokens(normalized_question);
    if tokens.is_empty() {
        return Vec::new();
    }
    kb.iter_normalized()
        .filter(|(_, norm)| tokens.iter().all(|t| norm.contains(t)))
        .map(|(chunk, _)| chunk.text.clone())
        .collect()
}

/// Take at most `max_chunks` contexts, then greedily accumulate whole
/// chunks up to `max_chars`. A chunk that would cross the budget is
/// dropped, never truncated mid-text.
pub fn assemble_context(contexts: Vec<String>, max_chunks: usize, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut total = 0usize;
    for c in contexts.into_iter().take(max_chunks) {
        if total + c.len() > max_chars {
            break;
        }
        total += c.len();
        out.push(c);
    }
    out
}

/// Convenience wrapper used by the answerer and by tests.
pub fn normalize_question(question: &str) -> String {
    normalize_text(question)
}
