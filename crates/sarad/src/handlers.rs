//! Top-level request pipeline.
//!
//! Order is a safety ladder: movement guard first (no LLM may ever see a
//! movement command), then small talk, then hybrid intent resolution.
//! Knowledge intents are answered from the corpus only; everything else
//! falls through to open generation with a canned apology on failure.

use crate::config::Config;
use crate::context::ContextStore;
use crate::corpus::KnowledgeBase;
use crate::ollama::ModelBackend;
use crate::prompts;
use crate::rag_answerer::RagAnswerer;
use crate::resolver;
use crate::small_talk;
use chrono::Local;
use sara_common::{Intent, IntentState, ResolutionSource, SlotSet, KNOWLEDGE_UNAVAILABLE_REPLY};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Movement words short-circuit the whole pipeline.
const MOVEMENT_KEYWORDS: [&str; 10] = [
    "aage", "peeche", "baaye", "daaye", "forward", "backward", "left", "right", "move", "chal",
];

const MOVEMENT_CLARIFY_REPLY: &str =
    "Please provide complete movement command. Example: aage jao.";

const EMPTY_INPUT_REPLY: &str = "कृपया अपना प्रश्न बताइए।";

const FALLBACK_APOLOGY: &str = "Technical issue aa gaya hai. Please try again.";

/// Final reply with the resolved intent attached.
#[derive(Debug, Serialize)]
pub struct Reply {
    pub reply: String,
    pub intent: Intent,
    pub state: IntentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResolutionSource>,
    #[serde(skip_serializing_if = "SlotSet::is_empty")]
    pub slots: SlotSet,
}

impl Reply {
    fn simple(reply: impl Into<String>, intent: Intent, state: IntentState) -> Self {
        Self {
            reply: reply.into(),
            intent,
            state,
            source: None,
            slots: SlotSet::new(),
        }
    }
}

/// The assembled pipeline: explicit handles, caller-controlled lifetime.
pub struct Pipeline<B: ModelBackend> {
    config: Config,
    backend: B,
    context: ContextStore,
    rag: Option<RagAnswerer>,
}

impl<B: ModelBackend> Pipeline<B> {
    /// Construct from config. A missing corpus or index leaves the
    /// knowledge path unavailable but never fails construction.
    pub fn new(config: Config, backend: B) -> Self {
        let context = ContextStore::load(&config.data.context_path);

        let rag = match KnowledgeBase::load(&config.data.corpus_path, &config.data.index_path) {
            Ok(kb) => Some(RagAnswerer::new(
                kb,
                config.llm.clone(),
                config.retrieval.clone(),
            )),
            Err(e) => {
                warn!("Knowledge base unavailable: {}", e);
                None
            }
        };

        Self {
            config,
            backend,
            context,
            rag,
        }
    }

    /// Construct with an already-loaded knowledge base (tests, tools).
    pub fn with_knowledge_base(config: Config, backend: B, kb: Option<KnowledgeBase>) -> Self {
        let context = ContextStore::load(&config.data.context_path);
        let rag = kb.map(|kb| {
            RagAnswerer::new(kb, config.llm.clone(), config.retrieval.clone())
        });
        Self {
            config,
            backend,
            context,
            rag,
        }
    }

    /// Resolve one utterance to a reply. Never fails: every error path
    /// collapses to a natural-language fallback.
    pub async fn handle_text(&self, text: &str) -> Reply {
        let text = text.trim();
        if text.is_empty() {
            return Reply::simple(EMPTY_INPUT_REPLY, Intent::General, IntentState::Clarify);
        }

        // Movement safety: hard rule, no model involved
        let lowered = sara_common::normalize_text(text);
        if lowered
            .split_whitespace()
            .any(|w| MOVEMENT_KEYWORDS.contains(&w))
        {
            return Reply::simple(MOVEMENT_CLARIFY_REPLY, Intent::Movement, IntentState::Clarify);
        }

        // Small talk before any model call
        if let Some(reply) = small_talk::reply(text) {
            return Reply::simple(reply, Intent::SmallTalk, IntentState::Ok);
        }

        let resolution =
            resolver::resolve_intent(text, &self.context, &self.backend, &self.config.llm).await;
        info!("Intent {} via {:?}", resolution.intent, resolution.source);

        let reply = match resolution.intent {
            Intent::Time => format!("Current time {} hai", Local::now().format("%I:%M %p")),
            Intent::Movement => MOVEMENT_CLARIFY_REPLY.to_string(),
            intent if intent.is_knowledge() => self.answer_from_corpus(text).await,
            Intent::SmallTalk => match small_talk::reply(text) {
                Some(r) => r,
                None => self.conversational_fallback(text).await,
            },
            _ => self.conversational_fallback(text).await,
        };

        Reply {
            reply,
            intent: resolution.intent,
            state: IntentState::Ok,
            source: Some(resolution.source),
            slots: resolution.slots,
        }
    }

    /// Knowledge intents are corpus-grounded or refused, nothing else.
    async fn answer_from_corpus(&self, text: &str) -> String {
        match &self.rag {
            Some(rag) => rag.answer(&self.backend, text).await,
            None => KNOWLEDGE_UNAVAILABLE_REPLY.to_string(),
        }
    }

    /// Open generation for everything the corpus does not own.
    async fn conversational_fallback(&self, text: &str) -> String {
        let prompt = prompts::conversational_prompt(text);
        let timeout = Duration::from_secs(self.config.llm.generate_timeout_secs);

        match self
            .backend
            .generate(&self.config.llm.generate_model, &prompt, timeout)
            .await
        {
            Ok(reply) if !reply.trim().is_empty() => {
                small_talk::enforce_respect(reply.trim())
            }
            Ok(_) => FALLBACK_APOLOGY.to_string(),
            Err(e) => {
                warn!("Conversational fallback failed: {}", e);
                FALLBACK_APOLOGY.to_string()
            }
        }
    }
}
