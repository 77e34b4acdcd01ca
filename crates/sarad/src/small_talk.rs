//! Small-talk brain with canned, respectful replies.
//!
//! Handles greetings, thanks, jokes, and the clock before any model is
//! consulted. Patterns are scored per whole-phrase hit and the best
//! non-zero intent wins; no match hands the utterance back to the
//! pipeline. Every outgoing reply passes the respect filter.

use chrono::Local;
use rand::seq::SliceRandom;
use sara_common::normalize_text;

/// Over-familiar address words never allowed in a reply.
const FORBIDDEN_WORDS: [&str; 9] = [
    "beta", "bhai", "bro", "yaar", "dost", "dear", "boss", "buddy", "mate",
];

/// Hinglish keywords folded to English before pattern matching.
const HINGLISH_MAP: [(&str, &str); 9] = [
    ("kya", "what"),
    ("kaun", "who"),
    ("kaise", "how"),
    ("kyu", "why"),
    ("kab", "when"),
    ("haan", "yes"),
    ("nahi", "no"),
    ("namaste", "hello"),
    ("shukriya", "thanks"),
];

enum Reply {
    Canned(&'static [&'static str]),
    CurrentTime,
    CurrentDate,
}

struct Rule {
    patterns: &'static [&'static str],
    reply: Reply,
}

const RULES: [Rule; 9] = [
    Rule {
        patterns: &["hello", "hi", "hey", "namaste"],
        reply: Reply::Canned(&[
            "नमस्कार। कृपया बताइए, मैं आपकी किस प्रकार सहायता कर सकती हूँ?",
            "नमस्ते। मैं आपकी सहायता के लिए उपलब्ध हूँ।",
            "नमस्कार। आप क्या जानना चाहते हैं?",
        ]),
    },
    Rule {
        patterns: &["how are you", "what haal", "what scene"],
        reply: Reply::Canned(&[
            "धन्यवाद। मैं ठीक हूँ। कृपया बताइए, मैं आपकी कैसे सहायता कर सकती हूँ?",
            "सब ठीक है। आप अपना प्रश्न बताइए।",
        ]),
    },
    Rule {
        patterns: &["who are you", "tum who", "aap who"],
        reply: Reply::Canned(&[
            "मैं सारा हूँ, एक डिजिटल सहायक, जो आपकी सहायता के लिए बनाई गई है।",
            "मैं आपकी जानकारी और सहायता के लिए उपलब्ध एक एआई सहायक हूँ।",
        ]),
    },
    Rule {
        patterns: &["thanks", "thank you"],
        reply: Reply::Canned(&[
            "आपका धन्यवाद। यदि कोई और प्रश्न हो, तो कृपया बताइए।",
            "धन्यवाद। आपकी सहायता करना मेरा उद्देश्य है।",
        ]),
    },
    Rule {
        patterns: &["time", "samay", "kitna baje"],
        reply: Reply::CurrentTime,
    },
    Rule {
        patterns: &["date", "aaj ka din"],
        reply: Reply::CurrentDate,
    },
    Rule {
        patterns: &["stupid", "idiot", "bewakoof"],
        reply: Reply::Canned(&[
            "कृपया सम्मानजनक भाषा का प्रयोग करें।",
            "आइए शांति और सम्मान के साथ बातचीत करें।",
        ]),
    },
    Rule {
        patterns: &["joke", "mazaak", "hasao"],
        reply: Reply::Canned(&[
            "एक हल्का सा हास्य: शिक्षक पूछते हैं – देर से क्यों आए? उत्तर मिला – सर, समय प्रबंधन सीख रहा था।",
            "कभी-कभी मुस्कान भी ऊर्जा देती है।",
        ]),
    },
    Rule {
        patterns: &["motivate", "himmat", "confidence"],
        reply: Reply::Canned(&[
            "आपमें क्षमता है। निरंतर प्रयास करते रहिए।",
            "धैर्य और अनुशासन सफलता की कुंजी हैं।",
        ]),
    },
];

/// Remove forbidden address words from a reply.
pub fn enforce_respect(text: &str) -> String {
    text.split_whitespace()
        .filter(|w| !FORBIDDEN_WORDS.contains(&w.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize and fold Hinglish keywords to their English pattern forms.
fn fold_hinglish(text: &str) -> String {
    normalize_text(text)
        .split_whitespace()
        .map(|tok| {
            HINGLISH_MAP
                .iter()
                .find(|(k, _)| *k == tok)
                .map(|(_, v)| *v)
                .unwrap_or(tok)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-phrase containment over whitespace tokens.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let padded = format!(" {} ", text);
    padded.contains(&format!(" {} ", phrase))
}

fn score(text: &str, rule: &Rule) -> u32 {
    rule.patterns
        .iter()
        .filter(|p| contains_phrase(text, p))
        .count() as u32
        * 2
}

/// Try to answer with small talk. `None` means the pipeline continues.
pub fn reply(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let folded = fold_hinglish(text);
    let best = RULES
        .iter()
        .map(|r| (score(&folded, r), r))
        .max_by_key(|(s, _)| *s)
        .filter(|(s, _)| *s > 0)?
        .1;

    let raw = match &best.reply {
        Reply::Canned(options) => options
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default()
            .to_string(),
        Reply::CurrentTime => {
            format!("वर्तमान समय {} है।", Local::now().format("%I:%M %p"))
        }
        Reply::CurrentDate => {
            format!("आज की तिथि {} है।", Local::now().format("%d %B %Y"))
        }
    };

    Some(enforce_respect(&raw))
}
