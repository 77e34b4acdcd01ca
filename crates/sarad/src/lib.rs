//! Sara daemon library - exposes modules for testing.

pub mod arbiter;
pub mod classifier;
pub mod config;
pub mod context;
pub mod corpus;
pub mod handlers;
pub mod ollama;
pub mod prompts;
pub mod rag_answerer;
pub mod resolver;
pub mod retrieval;
pub mod small_talk;
