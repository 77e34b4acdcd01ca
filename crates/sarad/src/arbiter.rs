//! Restricted intent arbiter.
//!
//! Consulted only when the confidence gate distrusts the rule classifier.
//! The external model is forced to pick one label from the closed allow-list;
//! anything else, including a failed call, resolves to GENERAL.

use crate::config::LlmConfig;
use crate::ollama::ModelBackend;
use crate::prompts;
use sara_common::Intent;
use std::time::Duration;
use tracing::{debug, warn};

/// Ask the external model for an intent label. Never fails: contract
/// violations and transport errors both collapse to [`Intent::General`].
pub async fn pick_intent(backend: &dyn ModelBackend, llm: &LlmConfig, text: &str) -> Intent {
    let prompt = prompts::arbiter_prompt(text);
    let timeout = Duration::from_secs(llm.arbiter_timeout_secs);

    let raw = match backend.generate(&llm.arbiter_model, &prompt, timeout).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Arbiter call failed, falling back to GENERAL: {}", e);
            return Intent::General;
        }
    };

    match parse_reply(&raw) {
        Some(intent) => {
            debug!("Arbiter picked {}", intent);
            intent
        }
        None => {
            warn!("Arbiter reply outside allow-list, falling back to GENERAL: {:?}", raw);
            Intent::General
        }
    }
}

/// Uppercase, strip everything outside [A-Z_], accept only allow-list members.
fn parse_reply(raw: &str) -> Option<Intent> {
    let cleaned: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || *c == '_')
        .collect();
    Intent::from_label(&cleaned)
}
