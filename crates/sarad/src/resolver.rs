//! Hybrid intent resolution.
//!
//! Rule classification with context merge and completeness check, then a
//! confidence gate that escalates doubtful results to the restricted
//! arbiter. Slots always come from the rule tier; the arbiter only ever
//! contributes the intent label.

use crate::arbiter;
use crate::classifier;
use crate::config::LlmConfig;
use crate::context::ContextStore;
use crate::ollama::ModelBackend;
use sara_common::{Intent, IntentState, Resolution, ResolutionSource, SlotSet};
use tracing::debug;

/// Every required slot present and non-empty.
pub fn is_complete(intent: Intent, slots: &SlotSet) -> bool {
    intent.required_slots().iter().all(|s| slots.is_filled(s))
}

/// Rule tier: classify, extract, merge stored context, check completeness.
/// A complete resolution updates the stored context; an incomplete one
/// leaves it untouched.
pub fn run_rules(text: &str, store: &ContextStore) -> (Intent, SlotSet, IntentState) {
    let intent = classifier::detect_intent(text);
    let mut slots = classifier::extract_slots(text);
    store.merge_into(&mut slots);

    if !is_complete(intent, &slots) {
        return (intent, slots, IntentState::Clarify);
    }

    store.remember(&slots);
    (intent, slots, IntentState::Ok)
}

/// When should we consult the arbiter?
///
/// Short GENERAL utterances are usually genuine chitchat; long ones are
/// often misclassified domain queries.
fn low_confidence(intent: Intent, state: IntentState, text: &str) -> bool {
    if state == IntentState::Clarify {
        return true;
    }
    intent == Intent::General && text.split_whitespace().count() > 4
}

/// Full hybrid resolution: rules first, arbiter only on low confidence.
pub async fn resolve_intent(
    text: &str,
    store: &ContextStore,
    backend: &dyn ModelBackend,
    llm: &LlmConfig,
) -> Resolution {
    let (intent, slots, state) = run_rules(text, store);

    if !low_confidence(intent, state, text) {
        debug!("Trusting rule classification: {}", intent);
        return Resolution {
            intent,
            slots,
            state,
            source: ResolutionSource::Rule,
        };
    }

    let arbiter_intent = arbiter::pick_intent(backend, llm, text).await;
    debug!("Escalated to arbiter: {} -> {}", intent, arbiter_intent);

    Resolution {
        intent: arbiter_intent,
        slots,
        state,
        source: ResolutionSource::Arbiter,
    }
}
