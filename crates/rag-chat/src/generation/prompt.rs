//! Prompt templates for RAG generation

use crate::types::ScoredDocument;

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Concatenate retrieved document texts, separated by a blank line
    pub fn build_context(documents: &[ScoredDocument]) -> String {
        documents
            .iter()
            .map(|d| d.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the question-answering prompt with all retrieved context stuffed in
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#,
            context = context,
            question = question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn scored(text: &str) -> ScoredDocument {
        ScoredDocument {
            text: text.to_string(),
            metadata: DocumentMetadata::for_user("u1"),
            score: 0.5,
        }
    }

    #[test]
    fn test_build_context_joins_texts() {
        let context = PromptBuilder::build_context(&[
            scored("Breathe in for four seconds."),
            scored("   "),
            scored("Hold for four seconds.\n"),
        ]);
        assert_eq!(
            context,
            "Breathe in for four seconds.\n\nHold for four seconds."
        );
    }

    #[test]
    fn test_qa_prompt_contains_context_and_question() {
        let prompt = PromptBuilder::build_qa_prompt("How do I calm down?", "Box breathing helps.");
        assert!(prompt.starts_with("Use the following pieces of context"));
        assert!(prompt.contains("\n\nBox breathing helps.\n\n"));
        assert!(prompt.ends_with("Question: How do I calm down?\nHelpful Answer:"));
    }
}
