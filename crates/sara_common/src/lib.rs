//! Shared data model for the Sara voice assistant pipeline.
//!
//! Holds the closed intent set, slot types, the text normalizer, and the
//! error taxonomy. Everything here is plain data used by both the daemon
//! and its tests.

pub mod error;
pub mod intent;
pub mod normalize;

pub use error::SaraError;
pub use intent::{Intent, IntentState, Resolution, ResolutionSource, SlotSet};
pub use normalize::normalize_text;

/// The only allowed "no answer" output of the grounded answer path.
/// Must match byte-for-byte across retrieval, synthesis, and caching.
pub const REFUSAL_REPLY: &str = "Information not available in the college document.";

/// Reply for knowledge queries when corpus or index failed to load.
pub const KNOWLEDGE_UNAVAILABLE_REPLY: &str = "College information system is not available.";
