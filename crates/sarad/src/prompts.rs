//! Prompt building for the arbiter, the grounded answerer, and the
//! conversational fallback.

use sara_common::{Intent, REFUSAL_REPLY};

/// Restricted classification prompt: the model must echo one allow-list
/// label and nothing else.
pub fn arbiter_prompt(text: &str) -> String {
    let labels: Vec<&str> = Intent::ALL.iter().map(|i| i.label()).collect();
    format!(
        "You are an intent classifier.\n\n\
         Allowed intents:\n{}\n\n\
         Rules:\n\
         - Respond with ONLY ONE intent name\n\
         - Do NOT explain\n\
         - Do NOT invent new intents\n\n\
         User text: {}\n\n\
         Intent:",
        labels.join(", "),
        text
    )
}

/// Grounded answer prompt: answer only from the supplied context, refuse
/// with the exact refusal string otherwise.
pub fn grounded_answer_prompt(question: &str, contexts: &[String]) -> String {
    format!(
        "Answer ONLY using the information present in the context below.\n\
         If the answer is not present, reply exactly:\n\
         '{}'\n\n\
         Context:\n{}\n\n\
         Question: {}\nAnswer:",
        REFUSAL_REPLY,
        contexts.join("\n\n"),
        question
    )
}

/// Open conversational prompt for non-knowledge queries.
pub fn conversational_prompt(text: &str) -> String {
    format!(
        "You are Sara, a friendly Indian voice assistant for Gitanjali Institute. \
         Always talk like a real human. Short, warm, respectful replies in simple \
         English or Hinglish.\n\n\
         User: {}\nSara:",
        text
    )
}
