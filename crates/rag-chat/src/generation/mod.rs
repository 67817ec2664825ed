//! Answer generation: prompt templates and the retrieval-QA pipeline

pub mod prompt;
pub mod qa_chain;

pub use prompt::PromptBuilder;
pub use qa_chain::{QaOutput, QaPipeline, RetrievalQa};
