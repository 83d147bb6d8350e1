//! Business logic for opsdeck-portal

pub mod accomplishments;
pub mod llm;
pub mod summarizer;
