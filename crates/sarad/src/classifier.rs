//! Rule classifier and slot extractor.
//!
//! Deterministic keyword matching, tested in a fixed priority order so the
//! most specific intent wins. Slot extraction runs independently of intent
//! detection; both accept any input without panicking.

use once_cell::sync::Lazy;
use regex::Regex;
use sara_common::{normalize_text, Intent, SlotSet};

/// Four-digit year, 1900-2099
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("year regex"));

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Classify an utterance to an intent by priority-ordered keyword sets.
/// Empty or unmatched input yields [`Intent::General`].
pub fn detect_intent(text: &str) -> Intent {
    let t = normalize_text(text);

    // Ownership before administration: "owner" outranks "director"
    if contains_any(&t, &["owner", "chairman", "malik", "boss"]) {
        return Intent::CollegeChairman;
    }
    if contains_any(&t, &["director", "principal"]) {
        return Intent::CollegeDirector;
    }
    if t.contains("hod") || t.contains("head of department") {
        return Intent::DepartmentHod;
    }
    if contains_any(&t, &["placement", "package", "ctc", "lpa"]) {
        return Intent::Placements;
    }
    if contains_any(&t, &["course", "branch", "degree"]) {
        return Intent::Courses;
    }
    if contains_any(&t, &["campus", "hostel", "library", "infrastructure"]) {
        return Intent::Campus;
    }

    Intent::General
}

/// Extract college, department, and year slots from the utterance.
pub fn extract_slots(text: &str) -> SlotSet {
    let t = normalize_text(text);
    let mut slots = SlotSet::new();

    // Institution hint
    if contains_any(&t, &["gitanjali", "gits", "geetanjali", "college", "institute"]) {
        slots.set("college", "GITS");
    }

    // Department detection is exclusive: first match wins
    if contains_any(&t, &["cse", "computer science", "computer", "cs"]) {
        slots.set("department", "CSE");
    } else if contains_any(&t, &["ai", "artificial intelligence"]) {
        slots.set("department", "AI");
    } else if t.contains("mechanical") {
        slots.set("department", "ME");
    } else if t.contains("civil") {
        slots.set("department", "CE");
    } else if t.contains("ece") || t.contains("electronics") {
        slots.set("department", "ECE");
    }

    if let Some(m) = YEAR_RE.find(&t) {
        slots.set("year", m.as_str());
    }

    slots
}
