//! Prompt templates for grounded generation

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the structured summarization prompt handed to the generation
    /// collaborator: retrieved context plus the original query.
    pub fn build_summary_prompt(query: &str, context: &str) -> String {
        format!(
            "Summarize the following context for the query: '{query}'\n\nContext:\n{context}\n\nSummary:"
        )
    }

    /// Build a plain question-answering prompt restricted to the context
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            "Based on the following context, answer the question. Only use information from the context.\n\nContext:\n{context}\n\nQuestion: {question}\n\nAnswer:"
        )
    }
}
